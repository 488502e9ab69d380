// handlers/traceability.rs - POST /traceability and GET /traceability/:hash

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::required_field;
use crate::database::repository::{NewTraceabilityRecord, TraceabilityRepository};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub product_id: Option<String>,
    pub farmer_id: Option<String>,
    pub aggregation_center_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateRecordResponse {
    pub traceability_hash: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub product_id: String,
    pub farmer_id: String,
    pub aggregation_center_id: String,
    pub timestamp: DateTime<Utc>,
}

/// POST /traceability - create a traceability record
///
/// The identifier is an opaque server-generated value; clients only supply
/// the three business fields and receive the hash and creation time back.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<CreateRecordResponse>), ApiError> {
    let product_id = required_field(payload.product_id)?;
    let farmer_id = required_field(payload.farmer_id)?;
    let aggregation_center_id = required_field(payload.aggregation_center_id)?;

    let record = TraceabilityRepository::new(state.db.clone())
        .insert(NewTraceabilityRecord {
            product_id,
            farmer_id,
            aggregation_center_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRecordResponse {
            traceability_hash: record.traceability_hash,
            timestamp: record.timestamp,
        }),
    ))
}

/// GET /traceability/:traceability_hash - show one record by its public key
pub async fn show(
    State(state): State<AppState>,
    Path(traceability_hash): Path<String>,
) -> Result<Json<RecordResponse>, ApiError> {
    let record = TraceabilityRepository::new(state.db.clone())
        .find_by_hash(&traceability_hash)
        .await?;

    Ok(Json(RecordResponse {
        product_id: record.product_id,
        farmer_id: record.farmer_id,
        aggregation_center_id: record.aggregation_center_id,
        timestamp: record.timestamp,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn create_rejects_missing_fields_before_touching_the_store() {
        let state = testing::state_with_auth("http://127.0.0.1:1");

        let err = create(
            State(state),
            Json(CreateRecordRequest {
                product_id: Some("P1".to_string()),
                farmer_id: None,
                aggregation_center_id: Some("A1".to_string()),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Missing required fields");
    }

    #[tokio::test]
    async fn create_rejects_empty_strings_like_missing_fields() {
        let state = testing::state_with_auth("http://127.0.0.1:1");

        let err = create(
            State(state),
            Json(CreateRecordRequest {
                product_id: Some(String::new()),
                farmer_id: Some("F1".to_string()),
                aggregation_center_id: Some("A1".to_string()),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), 400);
    }
}
