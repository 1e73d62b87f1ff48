use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeaseholdError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Numeric overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LeaseholdError {
    fn from(e: serde_json::Error) -> Self {
        LeaseholdError::SerializationError(e.to_string())
    }
}
