//! Synthetic transactions shown when the API is unavailable.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use dashboard_core::models::{CardDetails, CustomerDetails, PaymentDetails, Transaction};
use dashboard_core::periods::PeriodStrategy;
use rand::seq::SliceRandom;
use rand::Rng;

/// Number of records in a synthetic dataset.
pub const SAMPLE_SIZE: usize = 100;

const MERCHANTS: [&str; 3] = ["quidlydemo01", "testmerchant", "samplestore"];
const CHANNELS: [&str; 3] = ["card", "bank", "wallet"];

/// Per-strategy knobs of the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleProfile {
    /// Entries are dated up to this many days before `now`.
    pub lookback_days: i64,
    pub paymentid_prefix: &'static str,
    pub id_base: i64,
    pub apikey_base: i64,
}

impl SampleProfile {
    pub fn for_strategy(strategy: PeriodStrategy) -> Self {
        match strategy {
            PeriodStrategy::Monthly => Self {
                lookback_days: 365,
                paymentid_prefix: "QLYm",
                id_base: 1000,
                apikey_base: 54321,
            },
            PeriodStrategy::Quarterly => Self {
                lookback_days: 730,
                paymentid_prefix: "QLYd",
                id_base: 900,
                apikey_base: 12345,
            },
        }
    }
}

/// Card and customer payload embedded in every synthetic record.
pub fn sample_payment_details() -> PaymentDetails {
    PaymentDetails {
        card_details: Some(CardDetails {
            cardno: "4999082100029373".to_string(),
            cvv: "123".to_string(),
            expirymonth: "12".to_string(),
            expiryyear: "27".to_string(),
            cardholder: Some(String::new()),
        }),
        customer_details: Some(CustomerDetails {
            email: Some("test@yahoo.co.uk".to_string()),
            firstname: Some("Customer".to_string()),
            lastname: Some("Customer".to_string()),
            phone: Some(String::new()),
            country: Some("NG".to_string()),
        }),
    }
}

/// Build [`SAMPLE_SIZE`] synthetic transactions dated relative to `now`.
pub fn generate_sample_data<R: Rng + ?Sized>(
    strategy: PeriodStrategy,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Transaction> {
    let profile = SampleProfile::for_strategy(strategy);
    let jsondata = serde_json::to_string(&sample_payment_details()).unwrap_or_default();
    let stamp = now.timestamp_millis();

    (0..SAMPLE_SIZE)
        .map(|i| {
            let days_back = rng.gen_range(0..profile.lookback_days);
            let entrydt =
                (now - Duration::days(days_back)).to_rfc3339_opts(SecondsFormat::Millis, true);

            Transaction {
                merchantid: MERCHANTS.choose(rng).copied().unwrap_or(MERCHANTS[0]).to_string(),
                paymentid: format!("{}{}{}", profile.paymentid_prefix, stamp, i),
                txid: None,
                paymentreference: "payment via quidly".to_string(),
                amount: rng.gen_range(100..=10_099) as f64,
                status: if rng.gen_bool(0.9) { 0 } else { 6 },
                entrydt: Some(entrydt),
                id: profile.id_base + i as i64,
                channelid: CHANNELS.choose(rng).copied().unwrap_or(CHANNELS[0]).to_string(),
                apikey: format!("apikeydemo01-{}", profile.apikey_base + i as i64),
                scheme: None,
                jsondata: jsondata.clone(),
                payment_status: if rng.gen_bool(0.9) { 1 } else { 0 },
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
