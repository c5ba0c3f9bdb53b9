//! services/operator_app/src/adapters/fixture_documents.rs
//!
//! Implements the `DocumentSource` port with the demo operator's documents.
//! Dates are generated relative to the moment of the call so the fixture keeps
//! the same traffic-light mix no matter when it runs.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use spio_core::domain::{DocumentStatus, DocumentType, OperatorDocument};
use spio_core::ports::{DocumentSource, PortError, PortResult};

use crate::documents::{classify, days_until};

struct Row {
    id: &'static str,
    document_type: DocumentType,
    description: &'static str,
    number: &'static str,
    issued_days_ago: i64,
    expires_in_days: i64,
    updated_days_ago: i64,
    authority: &'static str,
    notes: Option<&'static str>,
}

const ROWS: &[Row] = &[
    Row {
        id: "doc-001",
        document_type: DocumentType::FederalLicense,
        description: "Licencia Federal de Conductor Tipo A",
        number: "LFC-2024-847291",
        issued_days_ago: 700,
        expires_in_days: 15,
        updated_days_ago: 30,
        authority: "SCT - Secretaría de Comunicaciones y Transportes",
        notes: None,
    },
    Row {
        id: "doc-002",
        document_type: DocumentType::MedicalExam,
        description: "Examen médico integral para operadores",
        number: "EXM-2024-4521",
        issued_days_ago: 180,
        expires_in_days: 185,
        updated_days_ago: 180,
        authority: "Clínica de Salud Ocupacional",
        notes: None,
    },
    Row {
        id: "doc-003",
        document_type: DocumentType::PsychometricExam,
        description: "Evaluación psicométrica para conductores",
        number: "PSI-2024-1892",
        issued_days_ago: 200,
        expires_in_days: 165,
        updated_days_ago: 200,
        authority: "Centro de Evaluación Psicológica",
        notes: None,
    },
    Row {
        id: "doc-004",
        document_type: DocumentType::Ine,
        description: "Identificación oficial vigente",
        number: "IDMEX1234567890",
        issued_days_ago: 1000,
        expires_in_days: 800,
        updated_days_ago: 365,
        authority: "INE - Instituto Nacional Electoral",
        notes: None,
    },
    Row {
        id: "doc-005",
        document_type: DocumentType::Curp,
        description: "Clave Única de Registro de Población",
        number: "RAGJ850315HDFRRL09",
        issued_days_ago: 2000,
        expires_in_days: 10_000,
        updated_days_ago: 500,
        authority: "RENAPO",
        notes: None,
    },
    Row {
        id: "doc-006",
        document_type: DocumentType::CriminalRecord,
        description: "Constancia de no antecedentes penales",
        number: "CANP-2024-78421",
        issued_days_ago: 400,
        expires_in_days: -35,
        updated_days_ago: 400,
        authority: "Procuraduría General de Justicia",
        notes: Some("Requiere renovación urgente"),
    },
    Row {
        id: "doc-007",
        document_type: DocumentType::TrainingCertificate,
        description: "Certificado de capacitación en manejo defensivo",
        number: "CERT-MD-2024-421",
        issued_days_ago: 90,
        expires_in_days: 275,
        updated_days_ago: 90,
        authority: "Centro de Capacitación TC",
        notes: None,
    },
    Row {
        id: "doc-008",
        document_type: DocumentType::Rfc,
        description: "Registro Federal de Contribuyentes",
        number: "RAGJ850315HD8",
        issued_days_ago: 1500,
        expires_in_days: 10_000,
        updated_days_ago: 365,
        authority: "SAT - Servicio de Administración Tributaria",
        notes: None,
    },
    Row {
        id: "doc-009",
        document_type: DocumentType::StateLicense,
        description: "Licencia de conducir estatal",
        number: "NL-2024-782451",
        issued_days_ago: 500,
        expires_in_days: 25,
        updated_days_ago: 500,
        authority: "Gobierno del Estado de Nuevo León",
        notes: None,
    },
];

/// An adapter that serves the demo operator's documents from memory.
#[derive(Clone, Default)]
pub struct FixtureDocumentSource {
    delay: std::time::Duration,
}

impl FixtureDocumentSource {
    pub fn new(delay: std::time::Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl DocumentSource for FixtureDocumentSource {
    async fn fetch_documents(&self, access_token: &str) -> PortResult<Vec<OperatorDocument>> {
        tokio::time::sleep(self.delay).await;
        if access_token.trim().is_empty() {
            return Err(PortError::Unauthorized);
        }
        Ok(fixture_documents(Utc::now()))
    }
}

/// The demo documents as they look at `now`.
pub fn fixture_documents(now: DateTime<Utc>) -> Vec<OperatorDocument> {
    ROWS.iter().map(|row| row.to_domain(now)).collect()
}

impl Row {
    fn to_domain(&self, now: DateTime<Utc>) -> OperatorDocument {
        let expiration_date = now + Duration::days(self.expires_in_days);
        let days_until_expiration = days_until(expiration_date, now);
        let status = classify(days_until_expiration);

        OperatorDocument {
            id: self.id.to_string(),
            document_type: self.document_type,
            name: self.document_type.display_name().to_string(),
            description: Some(self.description.to_string()),
            document_number: self.number.to_string(),
            issued_date: now - Duration::days(self.issued_days_ago),
            expiration_date,
            status,
            days_until_expiration,
            requires_renewal: status != DocumentStatus::Valid,
            notes: self.notes.map(str::to_string),
            updated_at: now - Duration::days(self.updated_days_ago),
            issuing_authority: Some(self.authority.to_string()),
        }
    }
}
