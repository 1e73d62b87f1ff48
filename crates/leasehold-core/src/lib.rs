pub mod error;
pub mod escalation;
pub mod types;
pub mod valuation;

pub use error::LeaseholdError;
pub use escalation::{LeaseConfig, RentIncrease, ReviewSchedule};
pub use types::*;

/// Standard result type for all leasehold valuation operations
pub type LeaseholdResult<T> = Result<T, LeaseholdError>;
