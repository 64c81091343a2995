//! Foundation types for the automation client workspace.
//!
//! This crate provides the shared foundation used by the other crates:
//! - Client configuration (server URL, credentials, response policy)
//! - Global error types covering all error categories
//! - Structured logging with tracing
//! - Wire-protocol constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;

// Re-export commonly used items at the crate root
pub use config::{ClientConfig, NonJsonPolicy};
pub use error::{NxError, NxResult};
pub use logging::{init_from_config, init_logging};
