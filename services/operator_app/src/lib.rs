pub mod adapters;
pub mod config;
pub mod documents;
pub mod error;
pub mod session;
pub mod wallet;
