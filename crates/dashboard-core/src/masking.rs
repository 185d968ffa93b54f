//! Redaction of card data inside a transaction's `jsondata` blob.
//!
//! [`mask_sensitive_data`] never fails. Well-formed JSON is edited
//! structurally and pretty-printed; anything else gets best-effort regex
//! substitution on the raw text.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

/// Replacement for any CVV value.
pub const MASKED_CVV: &str = "***";

/// Number of trailing card digits left visible.
const VISIBLE_DIGITS: usize = 4;

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("regex is valid"));

static CARDNO_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""cardno":\s*"([^"]*)""#).expect("regex is valid"));

static CVV_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""cvv":\s*"[^"]*""#).expect("regex is valid"));

/// Replace every digit that is followed by at least four more digits with `*`.
///
/// Only digits inside one contiguous run count, so a run shorter than five
/// digits is left alone.
///
/// # Examples
///
/// ```
/// use dashboard_core::masking::mask_card_number;
///
/// assert_eq!(mask_card_number("4999082100029373"), "************9373");
/// assert_eq!(mask_card_number("4999 0821"), "4999 0821");
/// ```
pub fn mask_card_number(cardno: &str) -> String {
    DIGIT_RUN
        .replace_all(cardno, |caps: &Captures| {
            let run = &caps[0];
            let len = run.len();
            if len <= VISIBLE_DIGITS {
                run.to_string()
            } else {
                format!("{}{}", "*".repeat(len - VISIBLE_DIGITS), &run[len - VISIBLE_DIGITS..])
            }
        })
        .into_owned()
}

/// Redact `cardDetails.cardno` and `cardDetails.cvv` in a JSON string.
///
/// Parsed documents are re-serialised with 2-space indentation and their
/// original key order. When parsing fails, the first `"cardno": "..."` and
/// `"cvv": "..."` pairs are rewritten in place and the rest of the text,
/// malformed or not, is returned untouched.
pub fn mask_sensitive_data(json: &str) -> String {
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Null) | Err(_) => {
            debug!("payment details are not a JSON object; masking raw text");
            mask_raw(json)
        }
        Ok(mut data) => {
            mask_value(&mut data);
            serde_json::to_string_pretty(&data).unwrap_or_else(|_| mask_raw(json))
        }
    }
}

/// Structural redaction of a parsed document.
fn mask_value(data: &mut Value) {
    let Some(card) = data.get_mut("cardDetails").filter(|c| is_truthy(c)) else {
        return;
    };
    let Some(card) = card.as_object_mut() else {
        return;
    };

    if let Some(cardno) = card.get_mut("cardno").filter(|v| is_truthy(v)) {
        let masked = match cardno {
            Value::String(s) => Some(mask_card_number(s)),
            Value::Number(n) => Some(mask_card_number(&n.to_string())),
            _ => None,
        };
        if let Some(masked) = masked {
            *cardno = Value::String(masked);
        }
    }

    if let Some(cvv) = card.get_mut("cvv").filter(|v| is_truthy(v)) {
        *cvv = Value::String(MASKED_CVV.to_string());
    }
}

/// Regex redaction of the first card-number and CVV pairs.
fn mask_raw(raw: &str) -> String {
    let with_card = CARDNO_PAIR.replace(raw, |caps: &Captures| {
        format!("\"cardno\": \"{}\"", mask_card_number(&caps[1]))
    });
    CVV_PAIR
        .replace(&with_card, format!("\"cvv\": \"{MASKED_CVV}\"").as_str())
        .into_owned()
}

/// JSON truthiness as a browser would judge it.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
