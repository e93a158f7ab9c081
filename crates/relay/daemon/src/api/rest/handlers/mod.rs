//! API request handlers

mod actions;
mod governance;
mod health;
mod inspect;

pub use actions::*;
pub use governance::*;
pub use health::*;
pub use inspect::*;

use relay_types::{Principal, Selector, Target};

use crate::error::ApiError;

pub(crate) fn parse_target(input: &str) -> Result<Target, ApiError> {
    input
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid target {}: {}", input, e)))
}

pub(crate) fn parse_principal(input: &str) -> Result<Principal, ApiError> {
    input
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid principal {}: {}", input, e)))
}

pub(crate) fn parse_selector(input: &str) -> Result<Selector, ApiError> {
    Selector::parse_or_derive(input)
        .map_err(|e| ApiError::BadRequest(format!("invalid selector {}: {}", input, e)))
}
