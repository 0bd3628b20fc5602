use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses the `date` field of a post. Authors mostly write `2025-06-15`,
/// but full timestamps show up too.
pub fn parse_post_date(buf: &str) -> Option<NaiveDateTime> {
    let buf = buf.trim();
    if let Ok(date) = NaiveDate::parse_from_str(buf, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(buf) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(buf, fmt) {
            return Some(dt);
        }
    }
    None
}

pub fn format_day(date_time: &NaiveDateTime) -> String {
    date_time.format("%Y-%m-%d").to_string()
}

/// Calendar day used by `lastmod`: modification time first, then the post date.
pub fn last_modified_day(modified: Option<&DateTime<Utc>>, date: &str) -> Option<String> {
    if let Some(modified) = modified {
        return Some(format_day(&modified.naive_utc()));
    }
    parse_post_date(date).map(|d| format_day(&d))
}
