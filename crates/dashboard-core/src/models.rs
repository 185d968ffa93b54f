use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single payment record returned by the transactions procedure.
///
/// Field names follow the API payload verbatim. All fields are lenient on
/// input: `null` strings become empty, `amount` may be a number or a numeric
/// string, and `jsondata` may arrive either JSON-encoded or as an object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, deserialize_with = "nullable_string")]
    pub merchantid: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub paymentid: String,
    #[serde(default, deserialize_with = "nullable_opt_string")]
    pub txid: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub paymentreference: String,
    /// Amount in kobo (minor units). Unparseable input is stored as `0`.
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "nullable_i64")]
    pub status: i64,
    /// ISO-8601 entry timestamp. `None` or empty means "no timestamp".
    #[serde(default, deserialize_with = "nullable_opt_string")]
    pub entrydt: Option<String>,
    #[serde(default, deserialize_with = "nullable_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "nullable_string")]
    pub channelid: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub apikey: String,
    #[serde(default, deserialize_with = "nullable_opt_string")]
    pub scheme: Option<String>,
    /// JSON-encoded card / customer details.
    #[serde(default, deserialize_with = "deserialize_jsondata")]
    pub jsondata: String,
    #[serde(default, deserialize_with = "nullable_i64")]
    pub payment_status: i64,
}

impl Transaction {
    /// The entry timestamp, or `None` when it is missing or empty.
    pub fn timestamp(&self) -> Option<&str> {
        self.entrydt.as_deref().filter(|s| !s.is_empty())
    }
}

// ── Amount parsing ────────────────────────────────────────────────────────────

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("regex is valid")
});

/// Parse an amount string by its leading numeric prefix.
///
/// Leading whitespace is ignored and trailing garbage is dropped, so
/// `"12.5abc"` parses as `12.5`. Returns `None` when no number starts the
/// string.
///
/// # Examples
///
/// ```
/// use dashboard_core::models::parse_amount;
///
/// assert_eq!(parse_amount("7200"), Some(7200.0));
/// assert_eq!(parse_amount("  12.5abc"), Some(12.5));
/// assert_eq!(parse_amount("abc"), None);
/// ```
pub fn parse_amount(s: &str) -> Option<f64> {
    let m = LEADING_NUMBER.find(s.trim_start())?;
    m.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Interpret an arbitrary JSON value as an amount, `0` when unparseable.
pub fn amount_from_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_amount(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(amount_from_value(&value))
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

fn nullable_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}

/// Integer flags and ids; anything that is not an integer reads as `0`.
fn nullable_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    })
}

/// `jsondata` is normally a JSON-encoded string; some procedures return the
/// object itself, which is re-encoded here.
fn deserialize_jsondata<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

// ── SummaryData ───────────────────────────────────────────────────────────────

/// Sparse summary figures returned by the `*txSummaryExtended_v2` procedures.
///
/// Keys such as `this_month_transactions` or `pct_change_amount` may be
/// absent; values may be numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryData {
    fields: Map<String, Value>,
}

impl SummaryData {
    /// Build a summary from `(key, value)` pairs.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Shallow key overlay: every key present in `other` replaces ours.
    pub fn overlay(&mut self, other: SummaryData) {
        for (key, value) in other.fields {
            self.fields.insert(key, value);
        }
    }

    /// Numeric view of `key`; numeric strings are parsed.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.fields.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_amount(s),
            _ => None,
        }
    }

    /// Textual view of `key`; numbers are rendered with their JSON spelling.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

// ── Payment details (jsondata payload) ────────────────────────────────────────

/// Card block of the `jsondata` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDetails {
    pub cardno: String,
    pub cvv: String,
    pub expirymonth: String,
    pub expiryyear: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardholder: Option<String>,
}

/// Customer block of the `jsondata` payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Decoded form of [`Transaction::jsondata`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_details: Option<CardDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_details: Option<CustomerDetails>,
}

// ── ChartView ─────────────────────────────────────────────────────────────────

/// Which series the period chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartView {
    /// Number of transactions per period.
    #[default]
    Count,
    /// Total transaction value per period.
    Value,
}

impl ChartView {
    /// The other view.
    pub fn toggled(self) -> Self {
        match self {
            ChartView::Count => ChartView::Value,
            ChartView::Value => ChartView::Count,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartView::Count => "count",
            ChartView::Value => "value",
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
