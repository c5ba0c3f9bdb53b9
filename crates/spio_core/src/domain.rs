//! crates/spio_core/src/domain.rs
//!
//! Defines the pure, core data structures for the operator app.
//! Profiles serialize with the camelCase field names the app has always
//! persisted; nothing here knows about storage or transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//=========================================================================================
// Operator Profile
//=========================================================================================

/// The role an operator holds in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorRole {
    Operator,
    Supervisor,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorStatus {
    Active,
    Inactive,
    OnLeave,
    Suspended,
}

/// Gamification tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorLevel {
    Rookie,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl OperatorLevel {
    /// The name shown to operators for this level.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Rookie => "Novato",
            Self::Bronze => "Piloto Bronce",
            Self::Silver => "Piloto Plata",
            Self::Gold => "Piloto Oro",
            Self::Platinum => "Piloto Platino",
            Self::Diamond => "Piloto Diamante",
        }
    }

    /// The level reached after this one, `None` at the top tier.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Rookie => Some(Self::Bronze),
            Self::Bronze => Some(Self::Silver),
            Self::Silver => Some(Self::Gold),
            Self::Gold => Some(Self::Platinum),
            Self::Platinum => Some(Self::Diamond),
            Self::Diamond => None,
        }
    }
}

/// Gamification snapshot embedded in every profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorGamification {
    pub total_points: u32,
    pub available_points: u32,
    pub level: OperatorLevel,
    pub level_name: String,
    /// Progress towards the next level, 0-100.
    pub progress_to_next_level: u8,
    pub points_to_next_level: u32,
    pub total_kilometers: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<u32>,
}

/// The authenticated operator. Replaced wholesale on login, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorProfile {
    pub id: Uuid,
    pub employee_number: String,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_last_name: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub role: OperatorRole,
    pub status: OperatorStatus,
    pub gamification: OperatorGamification,
    pub hire_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//=========================================================================================
// Authentication
//=========================================================================================

/// A username/password pair submitted at login.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Passwords never reach the logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What an authentication provider hands back on a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub operator: OperatorProfile,
}

/// The durable copy of a session, written on login and read back at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRecord {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub operator: OperatorProfile,
}

//=========================================================================================
// Session
//=========================================================================================

/// In-memory authentication state.
///
/// The session is authenticated exactly when both an access token and an
/// operator are present; the flag is derived rather than stored so the two
/// can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
    current_operator: Option<OperatorProfile>,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// An empty session, as created at process start.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_grant(grant: AuthGrant) -> Self {
        Self {
            access_token: Some(grant.access_token),
            refresh_token: grant.refresh_token,
            current_operator: Some(grant.operator),
            expires_at: grant.expires_at,
        }
    }

    /// Rebuilds a session from storage. The record does not carry an expiry.
    pub fn from_record(record: PersistedRecord) -> Self {
        Self {
            access_token: Some(record.access_token),
            refresh_token: record.refresh_token,
            current_operator: Some(record.operator),
            expires_at: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.current_operator.is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn current_operator(&self) -> Option<&OperatorProfile> {
        self.current_operator.as_ref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// The part of the session worth persisting, `None` when anonymous.
    pub fn to_record(&self) -> Option<PersistedRecord> {
        match (&self.access_token, &self.current_operator) {
            (Some(token), Some(operator)) => Some(PersistedRecord {
                access_token: token.clone(),
                refresh_token: self.refresh_token.clone(),
                operator: operator.clone(),
            }),
            _ => None,
        }
    }
}

//=========================================================================================
// Operator Documents
//=========================================================================================

/// Kinds of compliance documents an operator must keep current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    FederalLicense,
    StateLicense,
    MedicalExam,
    PsychometricExam,
    Curp,
    Ine,
    AddressProof,
    Rfc,
    Imss,
    BirthCertificate,
    CriminalRecord,
    TrainingCertificate,
    Other,
}

impl DocumentType {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::FederalLicense => "Licencia Federal",
            Self::StateLicense => "Licencia Estatal",
            Self::MedicalExam => "Examen Médico",
            Self::PsychometricExam => "Examen Psicométrico",
            Self::Curp => "CURP",
            Self::Ine => "INE/IFE",
            Self::AddressProof => "Comprobante de Domicilio",
            Self::Rfc => "RFC",
            Self::Imss => "IMSS",
            Self::BirthCertificate => "Acta de Nacimiento",
            Self::CriminalRecord => "Carta de No Antecedentes",
            Self::TrainingCertificate => "Certificado de Capacitación",
            Self::Other => "Otro",
        }
    }
}

/// Traffic-light status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Valid,
    ExpiringSoon,
    Expired,
    PendingVerification,
    Rejected,
}

impl DocumentStatus {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Valid => "Vigente",
            Self::ExpiringSoon => "Por Vencer",
            Self::Expired => "Vencido",
            Self::PendingVerification => "En Verificación",
            Self::Rejected => "Rechazado",
        }
    }

    /// Review states are set by a person and never derived from dates.
    pub fn is_review_state(self) -> bool {
        matches!(self, Self::PendingVerification | Self::Rejected)
    }
}

/// A single compliance document held by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorDocument {
    pub id: String,
    pub document_type: DocumentType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub document_number: String,
    pub issued_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub status: DocumentStatus,
    pub days_until_expiration: i64,
    pub requires_renewal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuing_authority: Option<String>,
}

/// Aggregate view of an operator's documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub total_documents: usize,
    pub valid_count: usize,
    pub expiring_soon_count: usize,
    pub expired_count: usize,
    pub pending_count: usize,
    pub next_to_expire: Option<OperatorDocument>,
    pub compliance_percent: u8,
}

/// Segments the document list can be narrowed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFilter {
    #[default]
    All,
    Valid,
    Expiring,
    /// Expired and rejected documents together.
    Expired,
}

//=========================================================================================
// Points Wallet
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Credit,
    Debit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionCategory {
    FuelBonus,
    TripBonus,
    PunctualityBonus,
    SafetyBonus,
    CashRedemption,
    ProductRedemption,
    ReferralBonus,
    SpecialBonus,
    Adjustment,
    Achievement,
}

impl TransactionCategory {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::FuelBonus => "Bono de Rendimiento",
            Self::TripBonus => "Bono de Viaje",
            Self::PunctualityBonus => "Bono de Puntualidad",
            Self::SafetyBonus => "Bono de Seguridad",
            Self::CashRedemption => "Canje a Efectivo",
            Self::ProductRedemption => "Canje de Producto",
            Self::ReferralBonus => "Bono por Referido",
            Self::SpecialBonus => "Bono Especial",
            Self::Adjustment => "Ajuste",
            Self::Achievement => "Logro Desbloqueado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedemptionCategory {
    Cash,
    GiftCard,
    Fuel,
    Services,
    Products,
}

/// Point balances of the operator's wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub wallet_id: String,
    pub total_points: i64,
    pub available_points: i64,
    /// Credited but not yet spendable.
    pub pending_points: i64,
    pub redeemed_points: i64,
    /// Value of `available_points` in MXN.
    pub equivalent_mxn: f64,
    pub conversion_rate: f64,
    pub last_updated_at: DateTime<Utc>,
}

/// One movement of points. Credits carry a positive amount, debits a negative one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: String,
    pub transaction_date: DateTime<Utc>,
    pub amount: i64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: TransactionCategory,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub status: TransactionStatus,
    pub balance_after: i64,
}

/// Something the operator can exchange points for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionOption {
    pub id: String,
    pub name: String,
    pub description: String,
    pub points_cost: i64,
    pub value_mxn: i64,
    pub category: RedemptionCategory,
    pub is_available: bool,
    /// `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

/// Narrows and pages the transaction history. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionFilter {
    pub transaction_type: Option<TransactionType>,
    pub category: Option<TransactionCategory>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            transaction_type: None,
            category: None,
            page: 1,
            page_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionPage {
    pub items: Vec<WalletTransaction>,
    pub total_count: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}
