//! One dashboard load: transactions plus summary, with synthetic fallbacks.
//!
//! A load always completes with data. Failures are logged and reported
//! through [`LoadOutcome::error`]; they never propagate.

use chrono::Utc;
use dashboard_core::models::{SummaryData, Transaction};
use dashboard_core::periods::PeriodStrategy;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::client::{summary_procedures, ProcedureClient, TransactionReply, TRANSACTION_LIMIT};
use crate::sample::generate_sample_data;

/// Result of a completed load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub strategy: PeriodStrategy,
    pub transactions: Vec<Transaction>,
    pub summary: SummaryData,
    /// Operator-facing message when the transaction fetch failed.
    pub error: Option<String>,
    /// `true` when `transactions` is synthetic.
    pub used_sample: bool,
}

/// Demo figures shown when the summary procedures fail.
pub fn fallback_summary(strategy: PeriodStrategy) -> SummaryData {
    let pairs: Vec<(&str, Value)> = match strategy {
        PeriodStrategy::Monthly => vec![
            ("this_month_transactions", json!(30)),
            ("this_month_total_amount", json!(720000)),
            ("last_month_transactions", json!(50)),
            ("last_month_total_amount", json!(1100000)),
            ("pct_change_transactions", json!("-40.00")),
            ("pct_change_amount", json!("-34.55")),
        ],
        PeriodStrategy::Quarterly => vec![
            ("this_quarter_transactions", json!(11)),
            ("this_quarter_total_amount", json!(62)),
            ("last_quarter_transactions", json!(236)),
            ("last_quarter_total_amount", json!(3347)),
            ("pct_change_transactions", json!("-95.34")),
            ("pct_change_amount", json!("-98.15")),
            ("this_month_transactions", json!(20)),
            ("this_month_total_amount", json!(1250000)),
            ("this_week_transactions", json!(20)),
            ("this_week_total_amount", json!(1250000)),
        ],
    };
    SummaryData::from_pairs(pairs)
}

fn sample_transactions(strategy: PeriodStrategy) -> Vec<Transaction> {
    generate_sample_data(strategy, Utc::now(), &mut rand::thread_rng())
}

// ── DataLoader ────────────────────────────────────────────────────────────────

/// Loads transactions and summary for one strategy.
///
/// Without a client (offline mode) every load is synthetic.
#[derive(Debug, Clone)]
pub struct DataLoader {
    client: Option<ProcedureClient>,
    strategy: PeriodStrategy,
}

impl DataLoader {
    pub fn new(client: ProcedureClient, strategy: PeriodStrategy) -> Self {
        Self {
            client: Some(client),
            strategy,
        }
    }

    pub fn offline(strategy: PeriodStrategy) -> Self {
        Self {
            client: None,
            strategy,
        }
    }

    pub fn strategy(&self) -> PeriodStrategy {
        self.strategy
    }

    pub fn is_offline(&self) -> bool {
        self.client.is_none()
    }

    /// Fetch transactions and summary concurrently.
    pub async fn load(&self) -> LoadOutcome {
        let ((transactions, error, used_sample), summary) =
            tokio::join!(self.load_transactions(), self.load_summary());

        LoadOutcome {
            strategy: self.strategy,
            transactions,
            summary,
            error,
            used_sample,
        }
    }

    /// Transactions, the error message if any, and whether they are synthetic.
    pub async fn load_transactions(&self) -> (Vec<Transaction>, Option<String>, bool) {
        let Some(client) = &self.client else {
            info!(strategy = %self.strategy, "offline mode, using sample data");
            return (sample_transactions(self.strategy), None, true);
        };

        match client.fetch_transactions(TRANSACTION_LIMIT).await {
            Ok(TransactionReply::Records(records)) => {
                info!(count = records.len(), "loaded transactions");
                (records, None, false)
            }
            Ok(TransactionReply::Unusable(reason)) => {
                warn!(%reason, "unexpected API response format, using sample data");
                (sample_transactions(self.strategy), None, true)
            }
            Err(e) => {
                warn!(error = %e, "transaction fetch failed, using sample data");
                (
                    sample_transactions(self.strategy),
                    Some(format!("Failed to fetch transactions: {e}")),
                    true,
                )
            }
        }
    }

    /// Summary figures overlaid in procedure order, or the fallback when any
    /// procedure fails.
    pub async fn load_summary(&self) -> SummaryData {
        let Some(client) = &self.client else {
            return fallback_summary(self.strategy);
        };

        let handles: Vec<_> = summary_procedures(self.strategy)
            .iter()
            .map(|&procedure| {
                let client = client.clone();
                tokio::spawn(async move { client.fetch_summary(procedure).await })
            })
            .collect();

        let mut summary = SummaryData::default();
        for handle in handles {
            match handle.await {
                Ok(Ok(part)) => summary.overlay(part),
                Ok(Err(e)) => {
                    warn!(error = %e, "summary fetch failed, using fallback summary");
                    return fallback_summary(self.strategy);
                }
                Err(e) => {
                    warn!(error = %e, "summary task failed, using fallback summary");
                    return fallback_summary(self.strategy);
                }
            }
        }
        info!(fields = summary.len(), "loaded summary");
        summary
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
