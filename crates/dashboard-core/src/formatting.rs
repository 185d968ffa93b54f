/// Naira sign used for every currency string.
pub const NAIRA: &str = "₦";

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a relative epsilon so exact binary midpoints round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` is "0.50"; keep ".50".
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && result.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format an amount in kobo as whole naira with thousands separators.
///
/// A zero amount renders as `"₦0"`.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_currency;
///
/// assert_eq!(format_currency(72_000_000.0), "₦720,000");
/// assert_eq!(format_currency(0.0), "₦0");
/// assert_eq!(format_currency(-150_000.0), "-₦1,500");
/// ```
pub fn format_currency(kobo: f64) -> String {
    if kobo == 0.0 || !kobo.is_finite() {
        return format!("{NAIRA}0");
    }
    let naira = kobo / 100.0;
    let digits = format_number(naira.abs(), 0);
    if naira < 0.0 && digits != "0" {
        format!("-{NAIRA}{digits}")
    } else {
        format!("{NAIRA}{digits}")
    }
}

/// Compact naira rendering for chart axes and cards.
///
/// * `≥ 1,000,000` naira → `"1.25m"`
/// * `≥ 1,000` naira → `"720k"`
/// * otherwise the plain naira figure, e.g. `"72"` or `"72.5"`
///
/// A zero amount renders as `"0"`.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_currency_short;
///
/// assert_eq!(format_currency_short(72_000_000.0), "720k");
/// assert_eq!(format_currency_short(125_000_000.0), "1.25m");
/// assert_eq!(format_currency_short(7_250.0), "72.5");
/// assert_eq!(format_currency_short(0.0), "0");
/// ```
pub fn format_currency_short(kobo: f64) -> String {
    if kobo == 0.0 || !kobo.is_finite() {
        return "0".to_string();
    }
    let naira = kobo / 100.0;
    if naira >= 1_000_000.0 {
        format!("{:.2}m", naira / 1_000_000.0)
    } else if naira >= 1_000.0 {
        format!("{}k", (naira / 1_000.0).round() as i64)
    } else {
        plain_number(naira)
    }
}

/// Render a number without trailing `.0` for integral values.
fn plain_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Render a percent-change string from the summary API (`"-34.55"`) with a
/// sign and `%` suffix (`"-34.55%"`, `"+12.00%"`).
pub fn format_pct_change(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v > 0.0 && !trimmed.starts_with('+') => format!("+{trimmed}%"),
        Ok(_) => format!("{trimmed}%"),
        Err(_) => trimmed.to_string(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
        assert_eq!(format_number(1_000.0, 0), "1,000");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
    }

    #[test]
    fn test_format_number_negative_rounding_to_zero() {
        assert_eq!(format_number(-0.2, 0), "0");
    }

    #[test]
    fn test_format_number_rounds_up() {
        assert_eq!(format_number(1.005, 2), "1.01");
    }

    // ── format_currency ──────────────────────────────────────────────────────

    #[test]
    fn test_format_currency_kobo_to_naira() {
        assert_eq!(format_currency(72_000_000.0), "₦720,000");
        assert_eq!(format_currency(110_000_000.0), "₦1,100,000");
    }

    #[test]
    fn test_format_currency_rounds_to_whole_naira() {
        assert_eq!(format_currency(12_350.0), "₦124");
        assert_eq!(format_currency(12_349.0), "₦123");
    }

    #[test]
    fn test_format_currency_zero() {
        assert_eq!(format_currency(0.0), "₦0");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(-150_000.0), "-₦1,500");
    }

    // ── format_currency_short ────────────────────────────────────────────────

    #[test]
    fn test_format_currency_short_thousands() {
        assert_eq!(format_currency_short(72_000_000.0), "720k");
        assert_eq!(format_currency_short(100_000.0), "1k");
    }

    #[test]
    fn test_format_currency_short_millions() {
        assert_eq!(format_currency_short(110_000_000.0), "1.10m");
        assert_eq!(format_currency_short(100_000_000.0), "1.00m");
    }

    #[test]
    fn test_format_currency_short_small() {
        assert_eq!(format_currency_short(6_200.0), "62");
        assert_eq!(format_currency_short(150.0), "1.5");
    }

    #[test]
    fn test_format_currency_short_zero() {
        assert_eq!(format_currency_short(0.0), "0");
    }

    // ── format_pct_change ────────────────────────────────────────────────────

    #[test]
    fn test_format_pct_change() {
        assert_eq!(format_pct_change("-34.55"), "-34.55%");
        assert_eq!(format_pct_change("12.00"), "+12.00%");
        assert_eq!(format_pct_change("0"), "0%");
        assert_eq!(format_pct_change("n/a"), "n/a");
    }

    // ── group_thousands ──────────────────────────────────────────────────────

    #[test]
    fn test_group_thousands_seven_digits() {
        assert_eq!(group_thousands("1234567"), "1,234,567");
        assert_eq!(group_thousands("123"), "123");
    }
}
