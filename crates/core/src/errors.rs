use rust_decimal::Decimal;
use thiserror::Error;

/// Input contract violations. Resolution gaps (no policy for a traveller,
/// empty country sets, zero effective policies) are representable results,
/// not errors, and never appear here.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("flight duration cannot be negative: {hours} hours")]
    NegativeDuration { hours: Decimal },
    #[error("fare amount cannot be negative: {amount}")]
    NegativeAmount { amount: Decimal },
    #[error("policy `{policy_id}` has a negative amount in `{field}`: {amount}")]
    NegativeThreshold { policy_id: String, field: &'static str, amount: Decimal },
    #[error("invalid currency code `{code}`: expected exactly 3 uppercase ASCII letters")]
    InvalidCurrency { code: String },
    #[error("unknown cabin class `{value}` (expected ECONOMY|PREMIUM_ECONOMY|BUSINESS|FIRST)")]
    UnknownCabinClass { value: String },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("snapshot failure: {0}")]
    Snapshot(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<crate::snapshot::SnapshotError> for ApplicationError {
    fn from(value: crate::snapshot::SnapshotError) -> Self {
        Self::Snapshot(value.to_string())
    }
}

impl From<crate::config::ConfigError> for ApplicationError {
    fn from(value: crate::config::ConfigError) -> Self {
        Self::Configuration(value.to_string())
    }
}
