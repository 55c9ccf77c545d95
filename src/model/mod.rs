pub mod user;
pub mod property;
pub mod inquiry;
pub mod contact;
pub mod subscriber;

use chrono::{SecondsFormat, Utc};

/// Current UTC time as a fixed-width RFC 3339 string; stored timestamps sort lexicographically.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_fixed_width_utc() {
        let ts = timestamp_now();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2026-01-01T10:00:00.000Z".len());
    }
}
