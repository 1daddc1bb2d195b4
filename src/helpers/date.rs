//! Date helper functions

use chrono::NaiveDate;

/// Format a `YYYY-MM` or `YYYY-MM-DD` date for display
///
/// # Examples
/// ```ignore
/// format_date("2024-03")    // -> "March 2024"
/// format_date("2024-03-05") // -> "March 5, 2024"
/// ```
///
/// Empty input gives an empty string; anything unparseable is returned as is.
pub fn format_date(date: &str) -> String {
    let date = date.trim();
    if date.is_empty() {
        return String::new();
    }

    if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return d.format("%B %-d, %Y").to_string();
    }

    if let Ok(d) = NaiveDate::parse_from_str(&format!("{}-01", date), "%Y-%m-%d") {
        return d.format("%B %Y").to_string();
    }

    tracing::debug!("Unrecognised date {:?}", date);
    date.to_string()
}

/// Format an inclusive date range, with an open end shown as "Present"
pub fn format_range(start: &str, end: Option<&str>) -> String {
    let end = match end.map(str::trim).filter(|e| !e.is_empty()) {
        Some(end) => format_date(end),
        None => "Present".to_string(),
    };
    format!("{} - {}", format_date(start), end)
}
