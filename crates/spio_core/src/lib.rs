pub mod domain;
pub mod ports;

pub use domain::{
    AuthGrant, Credentials, DocumentFilter, DocumentStatus, DocumentSummary, DocumentType,
    OperatorDocument, OperatorGamification, OperatorLevel, OperatorProfile, OperatorRole,
    OperatorStatus, PersistedRecord, RedemptionCategory, RedemptionOption, Session,
    TransactionCategory, TransactionFilter, TransactionPage, TransactionStatus, TransactionType,
    WalletSummary, WalletTransaction,
};
pub use ports::{
    AuthProvider, DocumentSource, KeyValueStore, PortError, PortResult, WalletSource,
};
