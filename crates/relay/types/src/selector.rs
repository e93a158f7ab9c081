use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::ParseError;

/// Width of an operation selector in bytes.
pub const SELECTOR_LEN: usize = 4;

/// Fixed-width identifier of an operation kind.
///
/// Derived from the first four bytes of the Keccak-256 hash of the canonical
/// signature string. The relay never interprets a selector beyond equality,
/// so unknown selectors are as valid a key as any derived one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector([u8; SELECTOR_LEN]);

impl Selector {
    pub const fn new(bytes: [u8; SELECTOR_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive the selector for a signature such as `transfer(address,uint256)`.
    pub fn from_signature(signature: &str) -> Self {
        let digest = Keccak256::digest(signature.as_bytes());
        let mut out = [0u8; SELECTOR_LEN];
        out.copy_from_slice(&digest[..SELECTOR_LEN]);
        Self(out)
    }

    /// Read the selector prefix of a payload, if it is long enough.
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        let prefix = payload.get(..SELECTOR_LEN)?;
        let mut out = [0u8; SELECTOR_LEN];
        out.copy_from_slice(prefix);
        Some(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8; SELECTOR_LEN] {
        &self.0
    }

    /// Parse either a hex selector (`0xa9059cbb`) or a signature
    /// (`transfer(address,uint256)`).
    pub fn parse_or_derive(input: &str) -> Result<Self, ParseError> {
        if input.contains('(') {
            Ok(Self::from_signature(input.trim()))
        } else {
            input.parse()
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({})", self)
    }
}

impl FromStr for Selector {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = crate::decode_hex(s)?;
        let arr: [u8; SELECTOR_LEN] =
            bytes.as_slice().try_into().map_err(|_| ParseError::InvalidLength {
                expected: SELECTOR_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
