// handlers/payments.rs - POST /payments/lock and POST /payments/release stubs

use axum::{http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{required_amount, required_field};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LockPaymentRequest {
    pub contract_id: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ReleasePaymentRequest {
    pub contract_id: Option<String>,
}

/**
 * POST /payments/lock - escrow a payment for a contract
 *
 * Settlement is not wired up. The handler validates input shape and answers
 * 501 so callers cannot mistake a canned response for a real escrow
 * operation; nothing is persisted.
 */
pub async fn lock(
    Json(payload): Json<LockPaymentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let contract_id = required_field(payload.contract_id)?;
    let _amount = required_amount(payload.amount, "amount")?;

    Ok((
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({
            "error": "Payment locking is not yet implemented",
            "message": "This will place the agreed amount in escrow until the contract completes",
            "contract_id": contract_id,
            "expected_input": {
                "contract_id": "string (required)",
                "amount": "number (required)"
            }
        })),
    ))
}

/**
 * POST /payments/release - release an escrowed payment to the seller
 *
 * Same placeholder contract as /payments/lock: shape validation only, then
 * an explicit 501.
 */
pub async fn release(
    Json(payload): Json<ReleasePaymentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let contract_id = required_field(payload.contract_id)?;

    Ok((
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({
            "error": "Payment release is not yet implemented",
            "message": "This will pay out the escrowed amount for a completed contract",
            "contract_id": contract_id,
            "expected_input": {
                "contract_id": "string (required)"
            }
        })),
    ))
}
