//! Core type definitions for the scoped execution relay.
//!
//! No business logic, just the vocabulary every relay crate shares:
//! address handles, operation selectors, action requests and the decision
//! taxonomy returned to callers.

pub mod action;
pub mod address;
pub mod decision;
pub mod selector;

pub use action::{ActionRequest, CallType};
pub use address::{Address, Principal, Target, ADDRESS_LEN};
pub use decision::{Decision, DenialReason, DenyCode};
pub use selector::{Selector, SELECTOR_LEN};

use thiserror::Error;

/// Errors parsing the hex text forms of relay types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Decode a hex string with an optional `0x` prefix.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, ParseError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(digits).map_err(|e| ParseError::InvalidHex(e.to_string()))
}

/// Encode bytes as a `0x`-prefixed lowercase hex string.
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Serde adapter for `Vec<u8>` fields carried as `0x`-hex strings.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_hex(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::decode_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_accepts_empty_payload() {
        assert_eq!(decode_hex("0x").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_hex("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decode_rejects_odd_length() {
        assert!(matches!(decode_hex("0xabc"), Err(ParseError::InvalidHex(_))));
    }

    #[test]
    fn encode_roundtrips_through_decode() {
        let bytes = vec![0x00, 0x7f, 0xff];
        assert_eq!(encode_hex(&bytes), "0x007fff");
        assert_eq!(decode_hex(&encode_hex(&bytes)).unwrap(), bytes);
    }
}
