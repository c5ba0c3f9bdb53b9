pub mod error;
pub mod manager;
pub mod persistence;

pub use error::AuthError;
pub use manager::SessionManager;
