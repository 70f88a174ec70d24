//! Payload - Opaque call data attached to a proposed transaction

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Invalid payload hex: {0}")]
    InvalidHex(String),
}

/// Arbitrary bytes handed to the target when a transaction executes.
///
/// Serialized as `0x`-prefixed hex; the empty payload is `0x`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl FromStr for Payload {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        hex::decode(digits)
            .map(Self)
            .map_err(|_| PayloadError::InvalidHex(s.to_string()))
    }
}

impl TryFrom<String> for Payload {
    type Error = PayloadError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Payload> for String {
    fn from(payload: Payload) -> Self {
        payload.to_string()
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload() {
        let payload: Payload = "0x".parse().unwrap();
        assert!(payload.is_empty());
        assert_eq!(payload.to_string(), "0x");
        assert_eq!("".parse::<Payload>().unwrap(), Payload::empty());
    }

    #[test]
    fn test_parse_bytes() {
        let payload: Payload = "0xa9059cbb".parse().unwrap();
        assert_eq!(payload.as_bytes(), &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(payload.len(), 4);
    }

    #[test]
    fn test_odd_length_rejected() {
        assert!(matches!("0xabc".parse::<Payload>(), Err(PayloadError::InvalidHex(_))));
    }
}
