//! Plain-text period report for the `report` subcommand.

use std::fmt;

use dashboard_core::formatting::{format_currency, format_number};
use dashboard_core::models::SummaryData;
use dashboard_core::periods::PeriodStrategy;
use dashboard_data::aggregator::PeriodBucket;
use dashboard_ui::components::summary_cards::build_cards;

const PERIOD_WIDTH: usize = 12;
const COUNT_WIDTH: usize = 14;
const VALUE_WIDTH: usize = 18;

/// Everything the report prints.
pub struct Report<'a> {
    pub strategy: PeriodStrategy,
    pub buckets: &'a [PeriodBucket],
    pub totals: &'a PeriodBucket,
    pub summary: &'a SummaryData,
    pub used_sample: bool,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(PERIOD_WIDTH + COUNT_WIDTH + VALUE_WIDTH);

        writeln!(
            f,
            "Successful transactions by {} (last {})",
            self.strategy.unit(),
            self.buckets.len()
        )?;
        if self.used_sample {
            writeln!(f, "(sample data: the API could not be used)")?;
        }
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:<PERIOD_WIDTH$}{:>COUNT_WIDTH$}{:>VALUE_WIDTH$}",
            "Period", "Transactions", "Value"
        )?;
        writeln!(f, "{rule}")?;
        for bucket in self.buckets {
            writeln!(f, "{}", row(bucket))?;
        }
        writeln!(f, "{rule}")?;
        writeln!(f, "{}", row(self.totals))?;

        writeln!(f)?;
        writeln!(f, "Summary")?;
        for card in build_cards(self.summary, self.strategy) {
            writeln!(f, "  {:<14}{} ({})", card.title, card.headline, card.detail)?;
        }
        Ok(())
    }
}

fn row(bucket: &PeriodBucket) -> String {
    format!(
        "{:<PERIOD_WIDTH$}{:>COUNT_WIDTH$}{:>VALUE_WIDTH$}",
        bucket.label,
        format_number(bucket.count as f64, 0),
        format_currency(bucket.value)
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bucket(label: &str, count: u64, value: f64) -> PeriodBucket {
        PeriodBucket {
            label: label.to_string(),
            count,
            value,
        }
    }

    #[test]
    fn test_report_rows_and_totals() {
        let buckets = vec![
            bucket("May 2025", 2, 100_000.0),
            bucket("Jun 2025", 1_200, 72_000_000.0),
        ];
        let totals = bucket("Total", 1_202, 72_100_000.0);
        let summary = SummaryData::from_pairs(vec![("this_month_transactions", json!(30))]);

        let text = Report {
            strategy: PeriodStrategy::Monthly,
            buckets: &buckets,
            totals: &totals,
            summary: &summary,
            used_sample: false,
        }
        .to_string();

        assert!(text.starts_with("Successful transactions by month (last 2)"));
        assert!(!text.contains("sample data"));
        assert!(text.contains(&format!("{:<12}{:>14}{:>18}", "Jun 2025", "1,200", "₦720,000")));
        assert!(text.contains(&format!("{:<12}{:>14}{:>18}", "Total", "1,202", "₦721,000")));
        assert!(text.contains("This Month"));
        assert!(text.contains("(30 txns)"));
    }

    #[test]
    fn test_report_marks_sample_data() {
        let totals = bucket("Total", 0, 0.0);
        let text = Report {
            strategy: PeriodStrategy::Quarterly,
            buckets: &[],
            totals: &totals,
            summary: &SummaryData::default(),
            used_sample: true,
        }
        .to_string();

        assert!(text.contains("by quarter"));
        assert!(text.contains("(sample data"));
        assert!(text.contains("This week"));
    }
}
