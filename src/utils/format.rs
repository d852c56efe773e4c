//! Number formatting shared by the CLI and the dashboard.

use crate::api::types::{CRORE, LAKH};

/// Format an integer with comma separators: `1234567` → `"1,234,567"`.
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Format a rupee amount rounded to whole rupees: `"₹9,500,432"`.
pub fn format_inr(amount: f64) -> String {
    if !amount.is_finite() || amount < 0.0 {
        return format!("₹{amount}");
    }
    format!("₹{}", format_number(amount.round() as u64))
}

/// Format a rupee amount in lakhs with two decimals: `"₹95.00 L"`.
pub fn format_lakhs(amount_inr: f64) -> String {
    format!("₹{:.2} L", amount_inr / LAKH)
}

/// Format a rupee amount in crores with one decimal: `"₹2.2 Cr"`.
pub fn format_crores(amount_inr: f64) -> String {
    format!("₹{:.1} Cr", amount_inr / CRORE)
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
