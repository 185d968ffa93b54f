//! Dashboard view state.
//!
//! Owns the loaded data and the operator's selections. Derived figures
//! (period buckets and the drill-down selection) are recomputed lazily: every
//! mutation that can change them clears a validity flag, and the next read
//! rebuilds them.

use chrono::{DateTime, Utc};
use dashboard_core::models::{ChartView, SummaryData, Transaction};
use dashboard_core::periods::PeriodStrategy;
use dashboard_core::time_utils::TimezoneHandler;
use dashboard_data::aggregator::{PeriodAggregator, PeriodBucket, Selection};
use dashboard_data::loader::LoadOutcome;
use tracing::debug;

/// Read-only snapshot handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct DashboardView<'a> {
    pub strategy: PeriodStrategy,
    pub periods: &'a [String],
    pub buckets: &'a [PeriodBucket],
    pub totals: &'a PeriodBucket,
    pub selection: &'a Selection,
    pub summary: &'a SummaryData,
    pub selected_period: &'a str,
    pub chart_view: ChartView,
    pub loading: bool,
    pub error: Option<&'a str>,
    pub used_sample: bool,
}

#[derive(Debug, Clone, Default)]
struct Derived {
    buckets: Vec<PeriodBucket>,
    totals: PeriodBucket,
    selection: Selection,
}

// ── DashboardState ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DashboardState {
    strategy: PeriodStrategy,
    tz: TimezoneHandler,
    periods: Vec<String>,
    transactions: Vec<Transaction>,
    summary: SummaryData,
    loading: bool,
    error: Option<String>,
    used_sample: bool,
    selected_period: String,
    chart_view: ChartView,
    derived: Derived,
    derived_valid: bool,
}

impl DashboardState {
    /// Periods end at the one containing `now` in the display timezone,
    /// which is also the initial selection.
    pub fn new(strategy: PeriodStrategy, tz: TimezoneHandler, now: DateTime<Utc>) -> Self {
        let local_now = tz.to_local(now);
        let periods = strategy.generate(&local_now);
        let selected_period = strategy.current_label(&local_now);

        Self {
            strategy,
            tz,
            periods,
            transactions: Vec::new(),
            summary: SummaryData::default(),
            loading: false,
            error: None,
            used_sample: false,
            selected_period,
            chart_view: ChartView::default(),
            derived: Derived::default(),
            derived_valid: false,
        }
    }

    // ── Loading ───────────────────────────────────────────────────────────

    /// Mark a load as in flight and clear the previous error.
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Install a completed load.
    pub fn apply_load(&mut self, outcome: LoadOutcome) {
        debug!(
            count = outcome.transactions.len(),
            used_sample = outcome.used_sample,
            "applying load outcome"
        );
        self.transactions = outcome.transactions;
        self.summary = outcome.summary;
        self.error = outcome.error;
        self.used_sample = outcome.used_sample;
        self.loading = false;
        self.invalidate();
    }

    /// End an in-flight load that produced no outcome, keeping the data
    /// already shown.
    pub fn fail_load(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    // ── Selection ─────────────────────────────────────────────────────────

    /// Select `label`. Any string is accepted; one that matches no period
    /// simply selects nothing.
    pub fn select_period(&mut self, label: &str) {
        if self.selected_period != label {
            self.selected_period = label.to_string();
            self.invalidate();
        }
    }

    /// Move the selection one period later, stopping at the newest.
    pub fn select_next(&mut self) {
        let next = match self.selected_index() {
            Some(i) => (i + 1).min(self.periods.len().saturating_sub(1)),
            None => self.periods.len().saturating_sub(1),
        };
        self.select_index(next);
    }

    /// Move the selection one period earlier, stopping at the oldest.
    pub fn select_previous(&mut self) {
        let prev = match self.selected_index() {
            Some(i) => i.saturating_sub(1),
            None => self.periods.len().saturating_sub(1),
        };
        self.select_index(prev);
    }

    pub fn toggle_chart_view(&mut self) {
        self.chart_view = self.chart_view.toggled();
    }

    fn selected_index(&self) -> Option<usize> {
        self.periods.iter().position(|p| *p == self.selected_period)
    }

    fn select_index(&mut self, index: usize) {
        if let Some(label) = self.periods.get(index).cloned() {
            self.select_period(&label);
        }
    }

    // ── Derived values ────────────────────────────────────────────────────

    fn invalidate(&mut self) {
        self.derived_valid = false;
    }

    fn ensure_derived(&mut self) {
        if self.derived_valid {
            return;
        }
        debug!(period = %self.selected_period, "recomputing derived values");
        let buckets =
            PeriodAggregator::aggregate(&self.transactions, &self.periods, self.strategy, &self.tz);
        let totals = PeriodAggregator::totals(&buckets);
        let selection = Selection::select(
            &self.transactions,
            &self.selected_period,
            self.strategy,
            &self.tz,
        );
        self.derived = Derived {
            buckets,
            totals,
            selection,
        };
        self.derived_valid = true;
    }

    pub fn buckets(&mut self) -> &[PeriodBucket] {
        self.ensure_derived();
        &self.derived.buckets
    }

    pub fn selection(&mut self) -> &Selection {
        self.ensure_derived();
        &self.derived.selection
    }

    /// Everything the renderer needs, derived values brought up to date.
    pub fn view(&mut self) -> DashboardView<'_> {
        self.ensure_derived();
        DashboardView {
            strategy: self.strategy,
            periods: &self.periods,
            buckets: &self.derived.buckets,
            totals: &self.derived.totals,
            selection: &self.derived.selection,
            summary: &self.summary,
            selected_period: &self.selected_period,
            chart_view: self.chart_view,
            loading: self.loading,
            error: self.error.as_deref(),
            used_sample: self.used_sample,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn strategy(&self) -> PeriodStrategy {
        self.strategy
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn summary(&self) -> &SummaryData {
        &self.summary
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_period(&self) -> &str {
        &self.selected_period
    }

    pub fn chart_view(&self) -> ChartView {
        self.chart_view
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
