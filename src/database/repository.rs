// database/repository.rs - persistence operations for the two entity tables

use chrono::{DateTime, SubsecRound, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::database::manager::{is_unique_violation, DatabaseError};
use crate::database::models::{Contract, ContractStatus, TraceabilityRecord};

/// Postgres stores TIMESTAMPTZ at microsecond precision; truncating up front
/// keeps the value returned at creation identical to later reads.
fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[derive(Debug)]
pub struct NewTraceabilityRecord {
    pub product_id: String,
    pub farmer_id: String,
    pub aggregation_center_id: String,
}

pub struct TraceabilityRepository {
    pool: PgPool,
}

impl TraceabilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new record under a server-generated identifier. A collision
    /// on the generated value is retried once with a fresh identifier; a
    /// second collision surfaces as a conflict.
    pub async fn insert(&self, new: NewTraceabilityRecord) -> Result<TraceabilityRecord, DatabaseError> {
        let timestamp = now_micros();

        match self.try_insert(&new, timestamp).await {
            Err(DatabaseError::Sqlx(err)) if is_unique_violation(&err) => {
                warn!("Generated traceability hash collided, retrying with a fresh one");
                match self.try_insert(&new, timestamp).await {
                    Err(DatabaseError::Sqlx(err)) if is_unique_violation(&err) => Err(
                        DatabaseError::Conflict("traceability hash already exists".to_string()),
                    ),
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn try_insert(
        &self,
        new: &NewTraceabilityRecord,
        timestamp: DateTime<Utc>,
    ) -> Result<TraceabilityRecord, DatabaseError> {
        let traceability_hash = Uuid::new_v4().to_string();

        let record = sqlx::query_as::<_, TraceabilityRecord>(
            r#"
            INSERT INTO traceability_records
                (traceability_hash, product_id, farmer_id, aggregation_center_id, "timestamp")
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, traceability_hash, product_id, farmer_id, aggregation_center_id, "timestamp"
            "#,
        )
        .bind(&traceability_hash)
        .bind(&new.product_id)
        .bind(&new.farmer_id)
        .bind(&new.aggregation_center_id)
        .bind(timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn find_by_hash(&self, traceability_hash: &str) -> Result<TraceabilityRecord, DatabaseError> {
        sqlx::query_as::<_, TraceabilityRecord>(
            r#"
            SELECT id, traceability_hash, product_id, farmer_id, aggregation_center_id, "timestamp"
            FROM traceability_records
            WHERE traceability_hash = $1
            "#,
        )
        .bind(traceability_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Traceability record not found".to_string()))
    }
}

#[derive(Debug)]
pub struct NewContract {
    pub buyer_id: String,
    pub seller_id: String,
    pub product_id: String,
    pub agreed_price: f64,
    pub delivery_date: String,
}

pub struct ContractRepository {
    pool: PgPool,
}

impl ContractRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new contract with status Pending under a server-generated
    /// identifier, with the same retry-once collision policy as records.
    pub async fn insert(&self, new: NewContract) -> Result<Contract, DatabaseError> {
        match self.try_insert(&new).await {
            Err(DatabaseError::Sqlx(err)) if is_unique_violation(&err) => {
                warn!("Generated contract id collided, retrying with a fresh one");
                match self.try_insert(&new).await {
                    Err(DatabaseError::Sqlx(err)) if is_unique_violation(&err) => {
                        Err(DatabaseError::Conflict("contract id already exists".to_string()))
                    }
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn try_insert(&self, new: &NewContract) -> Result<Contract, DatabaseError> {
        let contract_id = Uuid::new_v4().to_string();

        let contract = sqlx::query_as::<_, Contract>(
            r#"
            INSERT INTO contracts
                (contract_id, buyer_id, seller_id, product_id, agreed_price, delivery_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, contract_id, buyer_id, seller_id, product_id, agreed_price, delivery_date, status
            "#,
        )
        .bind(&contract_id)
        .bind(&new.buyer_id)
        .bind(&new.seller_id)
        .bind(&new.product_id)
        .bind(new.agreed_price)
        .bind(&new.delivery_date)
        .bind(ContractStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(contract)
    }

    pub async fn find_by_contract_id(&self, contract_id: &str) -> Result<Contract, DatabaseError> {
        sqlx::query_as::<_, Contract>(
            r#"
            SELECT id, contract_id, buyer_id, seller_id, product_id, agreed_price, delivery_date, status
            FROM contracts
            WHERE contract_id = $1
            "#,
        )
        .bind(contract_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Contract not found".to_string()))
    }

    /// Single-statement status transition; the row either moves to the new
    /// status or is reported missing.
    pub async fn update_status(
        &self,
        contract_id: &str,
        status: ContractStatus,
    ) -> Result<Contract, DatabaseError> {
        sqlx::query_as::<_, Contract>(
            r#"
            UPDATE contracts
            SET status = $2
            WHERE contract_id = $1
            RETURNING id, contract_id, buyer_id, seller_id, product_id, agreed_price, delivery_date, status
            "#,
        )
        .bind(contract_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Contract not found".to_string()))
    }
}
