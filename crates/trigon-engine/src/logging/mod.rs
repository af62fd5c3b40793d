//! Logging utilities.
//!
//! Centralizes logger initialization; the rest of the engine only speaks
//! through the `log` facade.

mod init;

pub use init::{init_logging, LoggingConfig};
