//! services/operator_app/src/bin/spio_session.rs
//!
//! Process-start lifecycle for the operator app: load configuration, restore the
//! stored session, optionally sign in, and report what the operator would see.

use operator_app_lib::{
    adapters::{DemoAuthProvider, FileStore, FixtureDocumentSource, FixtureWalletSource},
    config::Config,
    documents::DocumentService,
    error::AppError,
    session::SessionManager,
    wallet::WalletService,
};
use spio_core::domain::TransactionFilter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Restoring session...");

    // --- 2. Build the Session Manager ---
    let store = Arc::new(FileStore::new(config.storage_path.clone()));
    let auth = Arc::new(DemoAuthProvider::from_config(&config)?);
    let session = Arc::new(SessionManager::new(auth, store));

    // --- 3. Restore, or Sign In ---
    let restored = session.restore().await;
    if !restored.is_authenticated() {
        match &config.login {
            Some(credentials) => {
                if let Err(e) = session
                    .login(&credentials.username, &credentials.password)
                    .await
                {
                    warn!("{}", e.user_message());
                    return Err(e.into());
                }
            }
            None => {
                info!(
                    username = %DemoAuthProvider::demo_credentials().username,
                    "No stored session. Set SPIO_USERNAME and SPIO_PASSWORD to sign in"
                );
                return Ok(());
            }
        }
    }

    // --- 4. Report ---
    if let Some(operator) = session.current_operator() {
        info!(
            "Hola, {} ({}) - {} con {} puntos disponibles",
            session.operator_first_name(),
            operator.employee_number,
            operator.gamification.level_name,
            operator.gamification.available_points
        );
    }

    let documents = DocumentService::new(
        Arc::new(FixtureDocumentSource::new(Duration::from_millis(100))),
        session.clone(),
    );
    let summary = documents.summary().await?;
    info!(
        "Documentos: {} vigentes, {} por vencer, {} vencidos ({}% de cumplimiento)",
        summary.valid_count,
        summary.expiring_soon_count,
        summary.expired_count,
        summary.compliance_percent
    );
    if let Some(next) = summary.next_to_expire {
        info!("Próximo a vencer: {} en {} días", next.name, next.days_until_expiration);
    }

    let wallet = WalletService::new(
        Arc::new(FixtureWalletSource::new(Duration::from_millis(100))),
        session.clone(),
    );
    let balance = wallet.summary().await?;
    info!(
        "Billetera: {} puntos disponibles (${:.2} MXN), {} pendientes",
        balance.available_points, balance.equivalent_mxn, balance.pending_points
    );
    let recent = wallet.transactions(TransactionFilter::default()).await?;
    for transaction in recent.items.iter().take(3) {
        info!(
            "  {:+} {} ({})",
            transaction.amount,
            transaction.description,
            transaction.category.display_name()
        );
    }

    Ok(())
}
