use std::fmt;

/// Error types for plan ingestion
#[derive(Debug)]
pub enum PlanError {
    /// Input looked like a JSON plan but could not be parsed
    InvalidDocument(String),

    /// A resource change record is missing required fields
    MalformedRecord { address: String, reason: String },

    /// Ingestion stopped at a malformed record (abort policy)
    Aborted { address: String, reason: String },
}

impl PlanError {
    pub(crate) fn malformed(address: &str, reason: impl Into<String>) -> Self {
        PlanError::MalformedRecord {
            address: address.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::InvalidDocument(msg) => {
                write!(f, "Invalid plan document: {}", msg)
            }
            PlanError::MalformedRecord { address, reason } => {
                write!(f, "Malformed resource change '{}': {}", address, reason)
            }
            PlanError::Aborted { address, reason } => {
                write!(
                    f,
                    "Plan ingestion aborted at '{}': {} (set on_malformed_record: skip to continue past bad records)",
                    address, reason
                )
            }
        }
    }
}

impl std::error::Error for PlanError {}

impl From<serde_json::Error> for PlanError {
    fn from(err: serde_json::Error) -> Self {
        PlanError::InvalidDocument(err.to_string())
    }
}

/// Result type for plan operations
pub type PlanResult<T> = Result<T, PlanError>;
