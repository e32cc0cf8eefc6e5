//! Number formatting utilities for human-readable display.
//!
//! Handles f64 values with automatic decimal-place detection and comma separators.
//! Non-finite values (malformed upstream data parses to `NaN`) render as `"—"`.

const NOT_A_NUMBER: &str = "—";

/// Trims trailing zeros, adds thousands separators.
pub fn display_formatted_string(formatted: String) -> String {
    let trimmed = if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    };

    let (sign, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed.as_str()),
    };

    let mut parts = unsigned.splitn(2, '.');
    let integer = parts.next().unwrap_or_default();
    let fraction = parts.next();

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match fraction {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

fn get_decimal_places(value: f64) -> usize {
    let abs_value = value.abs();

    if abs_value >= 100.0 {
        return 0;
    }

    if abs_value >= 1.0 || abs_value == 0.0 {
        return 2;
    }

    let exponent = abs_value.log10().floor().abs() as usize;
    (exponent + 2).min(8)
}

/// Format an f64 for display with auto-detected decimal places.
pub fn display(amount: f64) -> String {
    display_with_decimals(amount, get_decimal_places(amount))
}

/// Format an f64 for display with explicit decimal places.
pub fn display_with_decimals(amount: f64, decimals: usize) -> String {
    if !amount.is_finite() {
        return NOT_A_NUMBER.to_string();
    }
    display_formatted_string(format!("{:.1$}", amount, decimals))
}

/// Dollar amount, whole dollars above $100: `$12,345`.
pub fn usd(amount: f64) -> String {
    if !amount.is_finite() {
        return NOT_A_NUMBER.to_string();
    }
    if amount < 0.0 {
        return format!("-${}", display(-amount));
    }
    format!("${}", display(amount))
}

/// Ratio in `[0, 1]` as a percentage with one decimal: `62.5%`.
pub fn percent(ratio: f64) -> String {
    if !ratio.is_finite() {
        return NOT_A_NUMBER.to_string();
    }
    format!("{:.1}%", ratio * 100.0)
}
