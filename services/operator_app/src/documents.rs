//! services/operator_app/src/documents.rs
//!
//! Document-compliance tracking: traffic-light classification, the summary
//! shown on the documents screen, and segment filtering. Reads go through the
//! signed-in session; a rejected token ends that session.

use chrono::{DateTime, Utc};
use spio_core::domain::{DocumentFilter, DocumentStatus, DocumentSummary, OperatorDocument};
use spio_core::ports::{DocumentSource, PortError, PortResult};
use std::sync::Arc;
use tracing::warn;

use crate::session::SessionManager;

/// Documents with this many days left or fewer are flagged as expiring soon.
pub const EXPIRING_SOON_DAYS: i64 = 30;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days from `now` until `expiration`, rounding partial days up.
pub fn days_until(expiration: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (expiration - now).num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) > 0 {
        days + 1
    } else {
        days
    }
}

/// Maps days remaining to a date-driven status.
pub fn classify(days_until_expiration: i64) -> DocumentStatus {
    if days_until_expiration < 1 {
        DocumentStatus::Expired
    } else if days_until_expiration <= EXPIRING_SOON_DAYS {
        DocumentStatus::ExpiringSoon
    } else {
        DocumentStatus::Valid
    }
}

/// Recomputes days remaining and, outside review states, the status.
pub fn refresh_status(document: &mut OperatorDocument, now: DateTime<Utc>) {
    document.days_until_expiration = days_until(document.expiration_date, now);
    if !document.status.is_review_state() {
        document.status = classify(document.days_until_expiration);
        document.requires_renewal = document.status != DocumentStatus::Valid;
    }
}

pub fn summarize(documents: &[OperatorDocument]) -> DocumentSummary {
    let count = |status| documents.iter().filter(|d| d.status == status).count();
    let valid_count = count(DocumentStatus::Valid);

    let next_to_expire = documents
        .iter()
        .filter(|d| d.status == DocumentStatus::ExpiringSoon)
        .min_by_key(|d| d.days_until_expiration)
        .cloned();

    let compliance_percent = if documents.is_empty() {
        0
    } else {
        ((valid_count as f64 / documents.len() as f64) * 100.0).round() as u8
    };

    DocumentSummary {
        total_documents: documents.len(),
        valid_count,
        expiring_soon_count: count(DocumentStatus::ExpiringSoon),
        expired_count: count(DocumentStatus::Expired),
        pending_count: count(DocumentStatus::PendingVerification),
        next_to_expire,
        compliance_percent,
    }
}

fn matches_filter(status: DocumentStatus, filter: DocumentFilter) -> bool {
    match filter {
        DocumentFilter::All => true,
        DocumentFilter::Valid => status == DocumentStatus::Valid,
        DocumentFilter::Expiring => status == DocumentStatus::ExpiringSoon,
        DocumentFilter::Expired => {
            matches!(status, DocumentStatus::Expired | DocumentStatus::Rejected)
        }
    }
}

fn urgency(status: DocumentStatus) -> u8 {
    match status {
        DocumentStatus::Expired => 0,
        DocumentStatus::Rejected => 1,
        DocumentStatus::ExpiringSoon => 2,
        DocumentStatus::PendingVerification => 3,
        DocumentStatus::Valid => 4,
    }
}

/// Keeps the documents in `filter`, most urgent first.
pub fn filter_and_sort(
    mut documents: Vec<OperatorDocument>,
    filter: DocumentFilter,
) -> Vec<OperatorDocument> {
    documents.retain(|d| matches_filter(d.status, filter));
    documents.sort_by_key(|d| (urgency(d.status), d.days_until_expiration));
    documents
}

//=========================================================================================
// DocumentService
//=========================================================================================

/// Reads the signed-in operator's documents.
#[derive(Clone)]
pub struct DocumentService {
    source: Arc<dyn DocumentSource>,
    session: Arc<SessionManager>,
}

impl DocumentService {
    pub fn new(source: Arc<dyn DocumentSource>, session: Arc<SessionManager>) -> Self {
        Self { source, session }
    }

    pub async fn list(&self, filter: DocumentFilter) -> PortResult<Vec<OperatorDocument>> {
        Ok(filter_and_sort(self.fetch().await?, filter))
    }

    pub async fn summary(&self) -> PortResult<DocumentSummary> {
        Ok(summarize(&self.fetch().await?))
    }

    pub async fn find(&self, id: &str) -> PortResult<OperatorDocument> {
        self.fetch()
            .await?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Document {} not found", id)))
    }

    async fn fetch(&self) -> PortResult<Vec<OperatorDocument>> {
        let token = self.session.current_token().ok_or(PortError::Unauthorized)?;

        let mut documents = match self.source.fetch_documents(&token).await {
            Ok(documents) => documents,
            Err(PortError::Unauthorized) => {
                warn!("Document source rejected the session token");
                self.session.handle_unauthorized(&token).await;
                return Err(PortError::Unauthorized);
            }
            Err(e) => return Err(e),
        };

        let now = Utc::now();
        for document in &mut documents {
            refresh_status(document, now);
        }
        Ok(documents)
    }
}
