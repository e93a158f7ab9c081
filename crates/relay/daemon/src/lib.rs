//! relayd library
//!
//! HTTP front end for the scoped execution relay:
//! - REST API for action submission, dry-run evaluation and governance
//! - Read-only inspection of executors, targets and the relay ledger
//! - Configuration loading and server lifecycle

pub mod api;
pub mod config;
pub mod error;
pub mod server;

pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError};
pub use server::Server;
