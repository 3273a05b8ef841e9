//! Wallet address type with `0x` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// An EVM-style wallet address, always prefixed with `0x`.
///
/// The original casing is preserved for display (checksummed addresses keep
/// their mixed case), but every comparison made during access resolution goes
/// through [`WalletAddress::matches`], which ignores case.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// The standard prefix for all wallet addresses.
    pub const PREFIX: &'static str = "0x";

    /// Parse a wallet address, rejecting anything that is not `0x` followed by
    /// at least one hex digit.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        let body = s
            .strip_prefix(Self::PREFIX)
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| TypesError::InvalidAddress(s.clone()))?;
        if body.is_empty() || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypesError::InvalidAddress(s));
        }
        Ok(Self(s))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive equality.
    pub fn matches(&self, other: &WalletAddress) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Lowercased form, used as a stable key in requests and logs.
    pub fn normalized(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WalletAddress {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<WalletAddress> for String {
    fn from(addr: WalletAddress) -> Self {
        addr.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_case_hex() {
        let addr = WalletAddress::new("0xABC123").unwrap();
        assert_eq!(addr.as_str(), "0xABC123");
        assert_eq!(addr.normalized(), "0xabc123");
    }

    #[test]
    fn rejects_missing_prefix_and_non_hex() {
        assert!(WalletAddress::new("abc123").is_err());
        assert!(WalletAddress::new("0x").is_err());
        assert!(WalletAddress::new("0xZZ").is_err());
    }

    #[test]
    fn matches_ignores_case() {
        let upper = WalletAddress::new("0xABC123").unwrap();
        let lower = WalletAddress::new("0xabc123").unwrap();
        assert!(upper.matches(&lower));
        assert_ne!(upper, lower);
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<WalletAddress, _> = serde_json::from_str(r#""0xdeadbeef""#);
        assert!(ok.is_ok());
        let bad: Result<WalletAddress, _> = serde_json::from_str(r#""nope""#);
        assert!(bad.is_err());
    }
}
