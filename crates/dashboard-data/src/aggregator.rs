//! Per-period totals and the drill-down selection.

use std::collections::HashMap;

use dashboard_core::models::Transaction;
use dashboard_core::periods::PeriodStrategy;
use dashboard_core::time_utils::TimezoneHandler;

// ── PeriodBucket ──────────────────────────────────────────────────────────────

/// Count and summed amount (kobo) of the transactions in one period.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PeriodBucket {
    pub label: String,
    pub count: u64,
    pub value: f64,
}

impl PeriodBucket {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            count: 0,
            value: 0.0,
        }
    }

    fn add(&mut self, tx: &Transaction) {
        self.count += 1;
        self.value += tx.amount;
    }
}

// ── PeriodAggregator ──────────────────────────────────────────────────────────

/// Stateless helper that buckets transactions into generated periods.
pub struct PeriodAggregator;

impl PeriodAggregator {
    /// One bucket per label in `periods`, in the same order.
    ///
    /// Transactions without a timestamp, or whose period is not among
    /// `periods`, are skipped. Empty periods still get a zero bucket.
    pub fn aggregate(
        transactions: &[Transaction],
        periods: &[String],
        strategy: PeriodStrategy,
        tz: &TimezoneHandler,
    ) -> Vec<PeriodBucket> {
        let mut buckets: Vec<PeriodBucket> = periods.iter().map(PeriodBucket::new).collect();
        let index: HashMap<&str, usize> = periods
            .iter()
            .enumerate()
            .map(|(i, label)| (label.as_str(), i))
            .collect();

        for tx in transactions {
            let Some(ts) = tx.timestamp() else {
                continue;
            };
            let label = strategy.classify(ts, tz);
            if let Some(&i) = index.get(label.as_str()) {
                buckets[i].add(tx);
            }
        }

        buckets
    }

    /// Sum of counts and values across `buckets`, labelled `"Total"`.
    pub fn totals(buckets: &[PeriodBucket]) -> PeriodBucket {
        buckets
            .iter()
            .fold(PeriodBucket::new("Total"), |mut acc, b| {
                acc.count += b.count;
                acc.value += b.value;
                acc
            })
    }
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// The transactions of one selected period with their derived figures.
///
/// Built in one step by [`Selection::select`]; the figures always describe
/// `transactions`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    label: String,
    transactions: Vec<Transaction>,
    total: f64,
    average: f64,
}

impl Selection {
    /// Transactions whose period label equals `label`, in input order.
    ///
    /// An empty label selects nothing.
    pub fn select(
        transactions: &[Transaction],
        label: &str,
        strategy: PeriodStrategy,
        tz: &TimezoneHandler,
    ) -> Self {
        let picked: Vec<Transaction> = if label.is_empty() {
            Vec::new()
        } else {
            transactions
                .iter()
                .filter(|tx| {
                    tx.timestamp()
                        .is_some_and(|ts| strategy.classify(ts, tz) == label)
                })
                .cloned()
                .collect()
        };

        let total: f64 = picked.iter().map(|tx| tx.amount).sum();
        let average = if picked.is_empty() {
            0.0
        } else {
            total / picked.len() as f64
        };

        Self {
            label: label.to_string(),
            transactions: picked,
            total,
            average,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Sum of amounts in kobo.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Mean amount in kobo, `0` when empty.
    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn count(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
