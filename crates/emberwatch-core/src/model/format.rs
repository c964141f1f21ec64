// ── Presentation helpers ──
//
// Pure formatting used by list and popup views.

use chrono::{DateTime, Utc};

/// Human age of a timestamp relative to `now`.
///
/// "Just now" under a minute, then minutes, then hours; anything a day or
/// older is shown as its calendar date.
pub fn relative_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - timestamp).num_minutes();
    if minutes < 1 {
        return "Just now".into();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    timestamp.format("%Y-%m-%d").to_string()
}

/// First 8 characters of an id, with an ellipsis when truncated.
pub fn short_id(id: &str) -> String {
    match id.char_indices().nth(8) {
        Some((cut, _)) => format!("{}...", &id[..cut]),
        None => id.to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn relative_age_buckets() {
        let now = now();
        assert_eq!(relative_age(now - Duration::seconds(30), now), "Just now");
        assert_eq!(relative_age(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(relative_age(now - Duration::minutes(59), now), "59m ago");
        assert_eq!(relative_age(now - Duration::minutes(61), now), "1h ago");
        assert_eq!(relative_age(now - Duration::hours(23), now), "23h ago");
        assert_eq!(relative_age(now - Duration::days(3), now), "2024-06-12");
    }

    #[test]
    fn future_timestamps_are_just_now() {
        let now = now();
        assert_eq!(relative_age(now + Duration::minutes(2), now), "Just now");
    }

    #[test]
    fn short_id_truncates_long_ids() {
        assert_eq!(short_id("Xy7pQ2mNa9"), "Xy7pQ2mN...");
        assert_eq!(short_id("mock-1"), "mock-1");
        assert_eq!(short_id("12345678"), "12345678");
    }
}
