use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// ISO-4217 style currency code, exactly three uppercase ASCII letters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
        let code = raw.into();
        let valid = code.len() == 3 && code.bytes().all(|byte| byte.is_ascii_uppercase());
        if !valid {
            return Err(DomainError::InvalidCurrency { code });
        }

        Ok(Self(code))
    }

    /// Currency applied to merged quotes when the organization has none configured.
    pub fn fallback() -> Self {
        Self("AUD".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::CurrencyCode;
    use crate::errors::DomainError;

    #[test]
    fn accepts_three_uppercase_ascii_letters() {
        let code = CurrencyCode::new("NZD").expect("NZD should be valid");
        assert_eq!(code.as_str(), "NZD");
    }

    #[test]
    fn rejects_lowercase_codes() {
        let error = CurrencyCode::new("usd").expect_err("lowercase should fail");
        assert_eq!(error, DomainError::InvalidCurrency { code: "usd".to_string() });
    }

    #[test]
    fn rejects_wrong_length_codes() {
        assert!(CurrencyCode::new("US").is_err());
        assert!(CurrencyCode::new("USDX").is_err());
        assert!(CurrencyCode::new("").is_err());
    }

    #[test]
    fn rejects_non_ascii_codes() {
        assert!(CurrencyCode::new("US€").is_err());
    }

    #[test]
    fn fallback_is_aud() {
        assert_eq!(CurrencyCode::fallback().as_str(), "AUD");
    }
}
