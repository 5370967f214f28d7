use chrono::{SecondsFormat, Utc};

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// RFC3339 UTC timestamp, the format stored in the row's `updated_at` column.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Date-only string (YYYY-MM-DD) used by the default factories.
pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_ms_is_reasonable() {
        let a = now_ms();
        assert!(a > 1_500_000_000_000); // after 2017
        assert!(a < 4_100_000_000_000); // before year ~2100
    }

    #[test]
    fn iso_timestamps_sort_lexicographically() {
        let a = now_iso();
        let b = now_iso();
        assert!(a <= b);
        assert!(a.ends_with('Z'));
    }

    #[test]
    fn today_is_date_only() {
        let d = today();
        assert_eq!(d.len(), 10);
        assert_eq!(d.chars().filter(|c| *c == '-').count(), 2);
    }
}
