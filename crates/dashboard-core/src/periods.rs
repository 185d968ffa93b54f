//! Calendar period strategies (month / quarter).
//!
//! A [`PeriodStrategy`] supplies everything the aggregation engine needs to
//! bucket transactions: the label for a date, how many trailing periods to
//! generate, and how to step back one period across year boundaries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::time_utils::TimezoneHandler;

/// Label returned for timestamps that cannot be parsed. It never matches a
/// generated period, so such records simply drop out of every bucket.
pub const INVALID_DATE_LABEL: &str = "Invalid Date";

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar period: a year plus a zero-based month (0–11) or quarter (0–3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    pub year: i32,
    pub ordinal: u32,
}

// ── PeriodStrategy ────────────────────────────────────────────────────────────

/// Bucketing granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStrategy {
    /// Trailing 12 calendar months, labelled `"Jan 2025"`.
    #[default]
    Monthly,
    /// Trailing 8 calendar quarters, labelled `"Q1 2025"`.
    Quarterly,
}

impl PeriodStrategy {
    /// Number of trailing periods generated, current period included.
    pub fn count(self) -> usize {
        match self {
            PeriodStrategy::Monthly => 12,
            PeriodStrategy::Quarterly => 8,
        }
    }

    /// Periods per calendar year.
    fn per_year(self) -> u32 {
        match self {
            PeriodStrategy::Monthly => 12,
            PeriodStrategy::Quarterly => 4,
        }
    }

    /// The period containing `date`.
    pub fn key_for(self, date: &impl Datelike) -> PeriodKey {
        let month0 = date.month0();
        let ordinal = match self {
            PeriodStrategy::Monthly => month0,
            PeriodStrategy::Quarterly => month0 / 3,
        };
        PeriodKey {
            year: date.year(),
            ordinal,
        }
    }

    /// The period immediately before `key`, rolling the year over.
    pub fn previous(self, key: PeriodKey) -> PeriodKey {
        if key.ordinal == 0 {
            PeriodKey {
                year: key.year - 1,
                ordinal: self.per_year() - 1,
            }
        } else {
            PeriodKey {
                year: key.year,
                ordinal: key.ordinal - 1,
            }
        }
    }

    /// Render `key` as a display label.
    pub fn label(self, key: PeriodKey) -> String {
        match self {
            PeriodStrategy::Monthly => {
                format!("{} {}", MONTH_NAMES[key.ordinal as usize % 12], key.year)
            }
            PeriodStrategy::Quarterly => format!("Q{} {}", key.ordinal + 1, key.year),
        }
    }

    /// Label of the period containing `today`.
    pub fn current_label(self, today: &impl Datelike) -> String {
        self.label(self.key_for(today))
    }

    /// Trailing period labels ending at the period containing `today`,
    /// oldest first. Always returns exactly [`count`](Self::count) labels.
    pub fn generate(self, today: &impl Datelike) -> Vec<String> {
        let mut key = self.key_for(today);
        let mut labels = Vec::with_capacity(self.count());
        for _ in 0..self.count() {
            labels.push(self.label(key));
            key = self.previous(key);
        }
        labels.reverse();
        labels
    }

    /// Label for a UTC instant, taken in the handler's timezone.
    pub fn classify_datetime(self, dt: DateTime<Utc>, tz: &TimezoneHandler) -> String {
        self.label(self.key_for(&tz.to_local(dt)))
    }

    /// Label for an arbitrary timestamp string.
    ///
    /// Unparseable input yields [`INVALID_DATE_LABEL`].
    pub fn classify(self, timestamp: &str, tz: &TimezoneHandler) -> String {
        match tz.parse_timestamp(timestamp) {
            Some(dt) => self.classify_datetime(dt, tz),
            None => INVALID_DATE_LABEL.to_string(),
        }
    }

    /// Word used in summary keys and headings (`"month"` / `"quarter"`).
    pub fn unit(self) -> &'static str {
        match self {
            PeriodStrategy::Monthly => "month",
            PeriodStrategy::Quarterly => "quarter",
        }
    }

    /// Summary-field keys for this granularity.
    pub fn summary_keys(self) -> SummaryKeys {
        let unit = self.unit();
        SummaryKeys {
            this_transactions: format!("this_{unit}_transactions"),
            this_total_amount: format!("this_{unit}_total_amount"),
            last_transactions: format!("last_{unit}_transactions"),
            last_total_amount: format!("last_{unit}_total_amount"),
        }
    }
}

impl fmt::Display for PeriodStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodStrategy::Monthly => write!(f, "monthly"),
            PeriodStrategy::Quarterly => write!(f, "quarterly"),
        }
    }
}

impl FromStr for PeriodStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monthly" | "month" => Ok(PeriodStrategy::Monthly),
            "quarterly" | "quarter" => Ok(PeriodStrategy::Quarterly),
            other => Err(format!("unknown period strategy: {other}")),
        }
    }
}

/// Keys of the summary fields that depend on the granularity.
///
/// `pct_change_transactions` and `pct_change_amount` are shared and exposed
/// as constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryKeys {
    pub this_transactions: String,
    pub this_total_amount: String,
    pub last_transactions: String,
    pub last_total_amount: String,
}

impl SummaryKeys {
    pub const PCT_CHANGE_TRANSACTIONS: &'static str = "pct_change_transactions";
    pub const PCT_CHANGE_AMOUNT: &'static str = "pct_change_amount";
}

// ── Tests ──────────────────────────────────────────────────────────────────────
