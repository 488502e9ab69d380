use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A product's link to its farmer and aggregation center. Created once,
/// never updated or deleted; `traceability_hash` is the only key clients see.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TraceabilityRecord {
    #[serde(skip_serializing)]
    pub id: i64,
    pub traceability_hash: String,
    pub product_id: String,
    pub farmer_id: String,
    pub aggregation_center_id: String,
    pub timestamp: DateTime<Utc>,
}
