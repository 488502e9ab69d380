pub mod contract;
pub mod traceability_record;

pub use contract::{Contract, ContractStatus};
pub use traceability_record::TraceabilityRecord;
