use serde::Serialize;
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Contract {
    #[serde(skip_serializing)]
    pub id: i64,
    pub contract_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub product_id: String,
    pub agreed_price: f64,
    pub delivery_date: String,
    pub status: String,
}

/// Contract lifecycle states. Stored as text; parsed at the API boundary so
/// an unrecognized value never reaches the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractStatus {
    Pending,
    Completed,
    Cancelled,
}

impl ContractStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(Self::Pending),
            "Completed" => Some(Self::Completed),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
