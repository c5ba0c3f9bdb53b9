//! services/operator_app/src/wallet.rs
//!
//! The operator's points wallet: conversion to pesos, filtered and paged
//! transaction history, and redemption options.

use spio_core::domain::{
    RedemptionOption, TransactionFilter, TransactionPage, WalletSummary, WalletTransaction,
};
use spio_core::ports::{PortError, PortResult, WalletSource};
use std::sync::Arc;
use tracing::warn;

use crate::session::SessionManager;

/// Pesos per point.
pub const CONVERSION_RATE: f64 = 0.10;

pub fn points_to_mxn(points: i64) -> f64 {
    points as f64 * CONVERSION_RATE
}

pub fn matches_filter(transaction: &WalletTransaction, filter: &TransactionFilter) -> bool {
    filter
        .transaction_type
        .map_or(true, |t| transaction.transaction_type == t)
        && filter.category.map_or(true, |c| transaction.category == c)
}

/// Filters, orders newest first, and cuts out the requested page.
///
/// A page past the end comes back empty with the real totals. `page` and
/// `page_size` below 1 are treated as 1.
pub fn paginate(
    mut transactions: Vec<WalletTransaction>,
    filter: &TransactionFilter,
) -> TransactionPage {
    let page = filter.page.max(1);
    let page_size = filter.page_size.max(1);

    transactions.retain(|t| matches_filter(t, filter));
    transactions.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));

    let total_count = transactions.len();
    let total_pages = total_count.div_ceil(page_size);
    let items = transactions
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();

    TransactionPage {
        items,
        total_count,
        current_page: page,
        total_pages,
        has_next_page: page < total_pages,
        has_previous_page: page > 1,
    }
}

/// Reads the wallet on behalf of the signed-in operator.
pub struct WalletService {
    source: Arc<dyn WalletSource>,
    session: Arc<SessionManager>,
}

impl WalletService {
    pub fn new(source: Arc<dyn WalletSource>, session: Arc<SessionManager>) -> Self {
        Self { source, session }
    }

    /// Balances, with the peso value recomputed from the available points.
    pub async fn summary(&self) -> PortResult<WalletSummary> {
        let token = self.token()?;
        let mut summary = self.checked(&token, self.source.fetch_summary(&token).await).await?;
        summary.conversion_rate = CONVERSION_RATE;
        summary.equivalent_mxn = points_to_mxn(summary.available_points);
        Ok(summary)
    }

    pub async fn transactions(&self, filter: TransactionFilter) -> PortResult<TransactionPage> {
        let token = self.token()?;
        let history = self
            .checked(&token, self.source.fetch_transactions(&token).await)
            .await?;
        Ok(paginate(history, &filter))
    }

    pub async fn redemption_options(&self) -> PortResult<Vec<RedemptionOption>> {
        let token = self.token()?;
        self.checked(&token, self.source.fetch_redemption_options(&token).await)
            .await
    }

    fn token(&self) -> PortResult<String> {
        self.session.current_token().ok_or(PortError::Unauthorized)
    }

    async fn checked<T>(&self, token: &str, outcome: PortResult<T>) -> PortResult<T> {
        if let Err(PortError::Unauthorized) = outcome {
            warn!("Wallet source rejected the session token");
            self.session.handle_unauthorized(token).await;
        }
        outcome
    }
}
