//! services/operator_app/src/error.rs
//!
//! Defines the primary error type for the operator app.

use crate::config::ConfigError;
use crate::session::AuthError;
use spio_core::ports::PortError;

/// The primary error type for the `operator_app` service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A login that could not complete.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}
