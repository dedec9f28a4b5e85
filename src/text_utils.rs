use chrono::{DateTime, NaiveDate};

/// `2026-02-02T03:44:38Z` -> `Feb 2, 2026`. Anything unparsable is returned as given.
pub fn format_date(iso: &str) -> String {
    let iso = iso.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(iso) {
        return date_time.format("%b %-d, %Y").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        return date.format("%b %-d, %Y").to_string();
    }
    iso.to_string()
}

/// Card subtitle: both dates when they differ, otherwise whichever one exists.
pub fn format_date_range(created_at: Option<&str>, updated_at: Option<&str>) -> String {
    let created = created_at.map(format_date).filter(|s| !s.is_empty());
    let updated = updated_at.map(format_date).filter(|s| !s.is_empty());

    match (created, updated) {
        (Some(c), Some(u)) if c != u => format!("Created {} · Updated {}", c, u),
        (Some(c), _) => c,
        (None, Some(u)) => u,
        (None, None) => String::new(),
    }
}
