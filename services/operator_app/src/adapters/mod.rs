pub mod demo_auth;
pub mod fixture_documents;
pub mod fixture_wallet;
pub mod storage;

pub use demo_auth::DemoAuthProvider;
pub use fixture_documents::FixtureDocumentSource;
pub use fixture_wallet::FixtureWalletSource;
pub use storage::{FileStore, MemoryStore};
