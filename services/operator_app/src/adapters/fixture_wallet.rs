//! services/operator_app/src/adapters/fixture_wallet.rs
//!
//! Implements the `WalletSource` port with the demo operator's wallet.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use spio_core::domain::{
    RedemptionCategory, RedemptionOption, TransactionCategory, TransactionStatus, TransactionType,
    WalletSummary, WalletTransaction,
};
use spio_core::ports::{PortError, PortResult, WalletSource};

use crate::wallet::{points_to_mxn, CONVERSION_RATE};

struct Row {
    id: &'static str,
    hours_ago: i64,
    amount: i64,
    category: TransactionCategory,
    description: &'static str,
    reference: &'static str,
    status: TransactionStatus,
    balance_after: i64,
}

const ROWS: &[Row] = &[
    Row {
        id: "txn-001",
        hours_ago: 24,
        amount: 500,
        category: TransactionCategory::FuelBonus,
        description: "Bono de Rendimiento",
        reference: "Rendimiento 3.4 km/L - Ruta MTY-GDL",
        status: TransactionStatus::Completed,
        balance_after: 8500,
    },
    Row {
        id: "txn-002",
        hours_ago: 48,
        amount: 350,
        category: TransactionCategory::TripBonus,
        description: "Bono por Viaje Completado",
        reference: "Viaje #VJ-2024-1847 completado",
        status: TransactionStatus::Completed,
        balance_after: 8000,
    },
    Row {
        id: "txn-003",
        hours_ago: 72,
        amount: -2000,
        category: TransactionCategory::CashRedemption,
        description: "Canje a Efectivo",
        reference: "Transferencia a cuenta *4532",
        status: TransactionStatus::Completed,
        balance_after: 7650,
    },
    Row {
        id: "txn-004",
        hours_ago: 5 * 24,
        amount: 200,
        category: TransactionCategory::PunctualityBonus,
        description: "Bono de Puntualidad",
        reference: "100% entregas a tiempo - Semana 4",
        status: TransactionStatus::Completed,
        balance_after: 9650,
    },
    Row {
        id: "txn-005",
        hours_ago: 7 * 24,
        amount: 1000,
        category: TransactionCategory::SafetyBonus,
        description: "Bono de Seguridad",
        reference: "30 días sin incidentes",
        status: TransactionStatus::Completed,
        balance_after: 9450,
    },
    Row {
        id: "txn-006",
        hours_ago: 10 * 24,
        amount: 750,
        category: TransactionCategory::Achievement,
        description: "Logro Desbloqueado",
        reference: "¡Piloto Veterano! - 50,000 km recorridos",
        status: TransactionStatus::Completed,
        balance_after: 8450,
    },
    Row {
        id: "txn-007",
        hours_ago: 12 * 24,
        amount: 300,
        category: TransactionCategory::TripBonus,
        description: "Bono por Viaje Completado",
        reference: "Viaje #VJ-2024-1798 completado",
        status: TransactionStatus::Completed,
        balance_after: 7700,
    },
    Row {
        id: "txn-008",
        hours_ago: 14 * 24,
        amount: -1500,
        category: TransactionCategory::ProductRedemption,
        description: "Canje de Producto",
        reference: "Tarjeta Amazon $150",
        status: TransactionStatus::Completed,
        balance_after: 7400,
    },
    Row {
        id: "txn-009",
        hours_ago: 18 * 24,
        amount: 450,
        category: TransactionCategory::FuelBonus,
        description: "Bono de Rendimiento",
        reference: "Rendimiento 3.2 km/L - Ruta CDMX-QRO",
        status: TransactionStatus::Completed,
        balance_after: 8900,
    },
    Row {
        id: "txn-010",
        hours_ago: 21 * 24,
        amount: 500,
        category: TransactionCategory::SpecialBonus,
        description: "Bono Especial",
        reference: "Programa Operador Estrella - Febrero",
        status: TransactionStatus::Completed,
        balance_after: 8450,
    },
    Row {
        id: "txn-011",
        hours_ago: 12,
        amount: 250,
        category: TransactionCategory::TripBonus,
        description: "Bono por Viaje",
        reference: "Viaje #VJ-2024-1892 - En proceso",
        status: TransactionStatus::Pending,
        balance_after: 8500,
    },
];

#[derive(Clone, Default)]
pub struct FixtureWalletSource {
    delay: std::time::Duration,
}

impl FixtureWalletSource {
    pub fn new(delay: std::time::Duration) -> Self {
        Self { delay }
    }

    async fn authorize(&self, access_token: &str) -> PortResult<()> {
        tokio::time::sleep(self.delay).await;
        if access_token.trim().is_empty() {
            return Err(PortError::Unauthorized);
        }
        Ok(())
    }
}

#[async_trait]
impl WalletSource for FixtureWalletSource {
    async fn fetch_summary(&self, access_token: &str) -> PortResult<WalletSummary> {
        self.authorize(access_token).await?;
        let available_points = 8500;
        Ok(WalletSummary {
            wallet_id: "wallet-001-jorge-ramirez".to_string(),
            total_points: 15750,
            available_points,
            pending_points: 750,
            redeemed_points: 6500,
            equivalent_mxn: points_to_mxn(available_points),
            conversion_rate: CONVERSION_RATE,
            last_updated_at: Utc::now(),
        })
    }

    async fn fetch_transactions(&self, access_token: &str) -> PortResult<Vec<WalletTransaction>> {
        self.authorize(access_token).await?;
        Ok(fixture_transactions(Utc::now()))
    }

    async fn fetch_redemption_options(
        &self,
        access_token: &str,
    ) -> PortResult<Vec<RedemptionOption>> {
        self.authorize(access_token).await?;
        Ok(redemption_options())
    }
}

/// The demo history as it looks at `now`, in table order.
pub fn fixture_transactions(now: DateTime<Utc>) -> Vec<WalletTransaction> {
    ROWS.iter().map(|row| row.to_domain(now)).collect()
}

impl Row {
    fn to_domain(&self, now: DateTime<Utc>) -> WalletTransaction {
        WalletTransaction {
            id: self.id.to_string(),
            transaction_date: now - Duration::hours(self.hours_ago),
            amount: self.amount,
            transaction_type: if self.amount < 0 {
                TransactionType::Debit
            } else {
                TransactionType::Credit
            },
            category: self.category,
            description: self.description.to_string(),
            reference: Some(self.reference.to_string()),
            status: self.status,
            balance_after: self.balance_after,
        }
    }
}

fn redemption_options() -> Vec<RedemptionOption> {
    let option = |id: &str, name: &str, description: &str, points_cost, value_mxn, category, stock| {
        RedemptionOption {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            points_cost,
            value_mxn,
            category,
            is_available: true,
            stock,
        }
    };
    vec![
        option(
            "redeem-001",
            "Transferencia Bancaria",
            "Recibe el equivalente en tu cuenta bancaria",
            1000,
            100,
            RedemptionCategory::Cash,
            None,
        ),
        option(
            "redeem-002",
            "Tarjeta Amazon $500",
            "Gift card para compras en Amazon México",
            5000,
            500,
            RedemptionCategory::GiftCard,
            Some(15),
        ),
        option(
            "redeem-003",
            "Vales de Gasolina",
            "500 pesos en vales de combustible",
            4500,
            500,
            RedemptionCategory::Fuel,
            None,
        ),
        option(
            "redeem-004",
            "Día de Descanso Extra",
            "Un día adicional de descanso pagado",
            10000,
            0,
            RedemptionCategory::Services,
            Some(5),
        ),
    ]
}
