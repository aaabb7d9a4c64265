use chrono::{DateTime, NaiveDateTime, Utc};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Parses a backend timestamp.
///
/// The backend emits RFC 3339 for timezone-aware columns, but older rows come
/// back naive; those are read as UTC.
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Formats a backend timestamp for display, falling back to the raw value.
pub fn display(value: &str) -> String {
    match parse(value) {
        Some(dt) => dt.format(DISPLAY_FORMAT).to_string(),
        None => value.to_string(),
    }
}

/// Same as [`display`] but renders a missing value as an em placeholder.
pub fn display_opt(value: Option<&str>) -> String {
    value.map(display).unwrap_or_else(|| "—".to_string())
}
