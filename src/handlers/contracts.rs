// handlers/contracts.rs - POST /smart-contract and PATCH /smart-contract/:id

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{required_amount, required_field};
use crate::database::models::ContractStatus;
use crate::database::repository::{ContractRepository, NewContract};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateContractRequest {
    pub buyer_id: Option<String>,
    pub seller_id: Option<String>,
    pub product_id: Option<String>,
    pub agreed_price: Option<f64>,
    pub delivery_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContractStatusResponse {
    pub contract_id: String,
    pub status: String,
}

/// POST /smart-contract - create a contract in the Pending state
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateContractRequest>,
) -> Result<(StatusCode, Json<ContractStatusResponse>), ApiError> {
    let buyer_id = required_field(payload.buyer_id)?;
    let seller_id = required_field(payload.seller_id)?;
    let product_id = required_field(payload.product_id)?;
    let agreed_price = required_amount(payload.agreed_price, "agreed_price")?;
    let delivery_date = required_delivery_date(payload.delivery_date)?;

    let contract = ContractRepository::new(state.db.clone())
        .insert(NewContract {
            buyer_id,
            seller_id,
            product_id,
            agreed_price,
            delivery_date,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ContractStatusResponse {
            contract_id: contract.contract_id,
            status: contract.status,
        }),
    ))
}

/// PATCH /smart-contract/:contract_id - transition the contract status
///
/// The requested status is checked against the enumeration before the store
/// is touched, so an unrecognized value can never overwrite a stored one.
pub async fn update_status(
    State(state): State<AppState>,
    Path(contract_id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ContractStatusResponse>, ApiError> {
    let status = payload
        .status
        .as_deref()
        .and_then(ContractStatus::parse)
        .ok_or_else(|| ApiError::bad_request("Invalid status"))?;

    let contract = ContractRepository::new(state.db.clone())
        .update_status(&contract_id, status)
        .await?;

    Ok(Json(ContractStatusResponse {
        contract_id: contract.contract_id,
        status: contract.status,
    }))
}

/// Delivery dates are ISO-8601 calendar dates (YYYY-MM-DD). The raw string is
/// persisted once it parses, keeping the wire format byte-stable.
fn required_delivery_date(value: Option<String>) -> Result<String, ApiError> {
    let raw = required_field(value)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("delivery_date must be an ISO-8601 date (YYYY-MM-DD)"))?;
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn delivery_date_must_be_a_calendar_date() {
        assert_eq!(required_delivery_date(Some("2026-09-01".to_string())).unwrap(), "2026-09-01");
        assert!(required_delivery_date(Some("01-09-2026".to_string())).is_err());
        assert!(required_delivery_date(Some("2026-02-30".to_string())).is_err());
        assert!(required_delivery_date(Some("next tuesday".to_string())).is_err());
        assert!(required_delivery_date(None).is_err());
    }

    #[tokio::test]
    async fn create_rejects_a_negative_price() {
        let state = testing::state_with_auth("http://127.0.0.1:1");

        let err = create(
            State(state),
            Json(CreateContractRequest {
                buyer_id: Some("B1".to_string()),
                seller_id: Some("S1".to_string()),
                product_id: Some("P1".to_string()),
                agreed_price: Some(-10.0),
                delivery_date: Some("2026-09-01".to_string()),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn update_rejects_an_unknown_status_before_touching_the_store() {
        let state = testing::state_with_auth("http://127.0.0.1:1");

        let err = update_status(
            State(state),
            Path("some-contract".to_string()),
            Json(UpdateStatusRequest {
                status: Some("Shipped".to_string()),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Invalid status");
    }

    #[tokio::test]
    async fn update_treats_a_missing_status_as_invalid() {
        let state = testing::state_with_auth("http://127.0.0.1:1");

        let err = update_status(
            State(state),
            Path("some-contract".to_string()),
            Json(UpdateStatusRequest { status: None }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), 400);
    }
}
