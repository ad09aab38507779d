//! Number and text formatting shared by the HTML and terminal reports.

use unicode_width::UnicodeWidthStr;

/// Format a count with thousands separators, rounding to the nearest integer.
///
/// `1234567.4` becomes `1,234,567`.
#[must_use]
pub fn format_count(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(rounded.len() + rounded.len() / 3 + 1);
    if value.is_sign_negative() && rounded != "0" {
        out.push('-');
    }
    let len = rounded.len();
    for (i, c) in rounded.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Two-decimal rendering used for throughput and latency cells.
#[must_use]
pub fn format_fixed(value: f64) -> String {
    format!("{value:.2}")
}

/// Like [`format_fixed`] but renders a missing value as `-`.
#[must_use]
pub fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), format_fixed)
}

/// Escape text for inclusion in HTML element content or attribute values.
#[must_use]
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Right-pad `text` to `width` terminal columns.
#[must_use]
pub fn pad_right(text: &str, width: usize) -> String {
    let visible = UnicodeWidthStr::width(text);
    if visible >= width {
        return text.to_string();
    }
    format!("{text}{}", " ".repeat(width - visible))
}

/// Left-pad `text` to `width` terminal columns.
#[must_use]
pub fn pad_left(text: &str, width: usize) -> String {
    let visible = UnicodeWidthStr::width(text);
    if visible >= width {
        return text.to_string();
    }
    format!("{}{text}", " ".repeat(width - visible))
}

/// Terminal width of `text`.
#[must_use]
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}
