pub mod chore;
pub mod config;
pub mod notify;
pub mod user;

use chrono::{DateTime, Utc};

/// `--at` value, or the current time.
pub fn parse_at(at: Option<&str>) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    match at {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .map_err(|e| format!("invalid timestamp '{s}': {e}"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_at_accepts_offsets() {
        let t = parse_at(Some("2024-03-01T09:00:00+09:00")).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parse_at_rejects_garbage() {
        assert!(parse_at(Some("yesterday")).is_err());
    }
}
