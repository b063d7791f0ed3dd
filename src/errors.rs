use std::fmt;
use thiserror::Error;

/// Optional method groups an execution backend may or may not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Aggregate,
    Distinct,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aggregate => f.write_str("Aggregation"),
            Self::Distinct => f.write_str("Distinct"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GateError {
    #[error("filter validation failed: property '{0}' is not exposed for filtering")]
    UnknownProperty(String),

    #[error("filter validation failed: key '{0}' is not allowed for filtering")]
    DisallowedOperator(String),

    #[error("filter validation failed: {path}: {reason}")]
    SchemaViolation { path: String, reason: String },

    #[error("filter validation failed: property '{property}' has an invalid date value {value}")]
    InvalidDate { property: String, value: String },

    #[error("property '{0}' is not exposed for sorting")]
    UnsortableProperty(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("filter decode error: {0}")]
    Decode(String),

    #[error("{0} not supported by this model")]
    CapabilityUnsupported(Capability),

    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("config error: {0}")]
    Config(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl GateError {
    pub(crate) fn schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaViolation { path: path.into(), reason: reason.into() }
    }

    /// True for every error a caller should see as "filter validation failed".
    #[must_use]
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            Self::UnknownProperty(_)
                | Self::DisallowedOperator(_)
                | Self::SchemaViolation { .. }
                | Self::InvalidDate { .. }
        )
    }
}
