const CURRENCY_SYMBOLS: [char; 3] = ['£', '$', '€'];

/// Parses a currency-formatted string such as `"£42,134.00"`, `"-£45,809.00"`
/// or `"£-12.50"` into a number.
///
/// Malformed input yields `0.0`. Non-finite results (`"NaN"`, `"inf"`) are
/// treated as malformed so the canonical dataset never carries them.
pub fn clean_currency(text: &str) -> f64 {
    parse_amount(text).unwrap_or(0.0)
}

/// Fallible form of [`clean_currency`]; `None` marks a cell that had to be coerced.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();

    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Replaces NaN and infinities with zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Formats an amount as `£1,234.50` or `-£1,234.50`.
pub fn format_currency(amount: f64, symbol: &str) -> String {
    if !amount.is_finite() {
        return format!("{}0.00", symbol);
    }

    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // -0.001 rounds to 0.00 and should not print a sign
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, symbol, grouped, fraction)
}

pub fn format_percentage(value: f64, decimal_places: usize) -> String {
    let value = finite_or_zero(value);
    format!("{:.*}%", decimal_places, value)
}

/// Lowercases a column header and replaces spaces with underscores:
/// `"Budget 2025 26"` becomes `"budget_2025_26"`.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// `numerator / denominator * 100`, or zero when the denominator is zero.
pub fn percentage_of(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}
