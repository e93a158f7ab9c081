//! HTTP API for relayd

pub mod rest;

pub use rest::router::create_router;
