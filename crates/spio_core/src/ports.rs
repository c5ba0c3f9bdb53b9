//! crates/spio_core/src/ports.rs
//!
//! Defines the service contracts (traits) the operator app depends on.
//! These traits form the boundary of the hexagonal architecture, so the session
//! logic never knows whether it is talking to the demo fixtures or a real backend.

use async_trait::async_trait;
use crate::domain::{
    AuthGrant, Credentials, OperatorDocument, RedemptionOption, WalletSummary, WalletTransaction,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (storage, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    /// The backing medium is readable but its contents cannot be parsed.
    #[error("Storage corrupt: {0}")]
    Corrupt(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchanges credentials for a grant.
    /// Must return `PortError::InvalidCredentials` when the pair is rejected.
    async fn authenticate(&self, credentials: &Credentials) -> PortResult<AuthGrant>;

    /// Invalidates an access token on the provider side.
    async fn revoke(&self, access_token: &str) -> PortResult<()>;
}

/// A durable string key-value store (the browser's local storage, a file, ...).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PortResult<()>;

    /// Removing a key that does not exist is not an error.
    async fn remove(&self, key: &str) -> PortResult<()>;

    /// Drops every entry, including contents that no longer parse.
    async fn reset(&self) -> PortResult<()>;
}

#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetches every document of the operator owning `access_token`.
    /// Returns `PortError::Unauthorized` when the token is not accepted.
    async fn fetch_documents(&self, access_token: &str) -> PortResult<Vec<OperatorDocument>>;
}

/// The operator's points wallet. Every call is made on behalf of `access_token`
/// and returns `PortError::Unauthorized` when the token is not accepted.
#[async_trait]
pub trait WalletSource: Send + Sync {
    async fn fetch_summary(&self, access_token: &str) -> PortResult<WalletSummary>;

    /// The full history, in no particular order.
    async fn fetch_transactions(&self, access_token: &str) -> PortResult<Vec<WalletTransaction>>;

    async fn fetch_redemption_options(
        &self,
        access_token: &str,
    ) -> PortResult<Vec<RedemptionOption>>;
}
