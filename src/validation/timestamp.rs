//! Timestamp normalisation.
//!
//! Every timestamp is held as a UTC instant. Inputs may carry an offset (it is
//! converted), be naive ISO-8601 (it is taken as UTC) or be a bare date
//! (midnight UTC). Output is always
//! RFC 3339 with a `Z` suffix, which is also the form fed to the hash engine.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an ISO-8601 timestamp into a UTC instant.
pub fn parse(input: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = input.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(at.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    // a bare date means midnight UTC
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(format!("invalid ISO-8601 datetime '{}'", input))
}

/// Render a UTC instant in its canonical ISO-8601 form.
pub fn render(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// `#[serde(with = "...")]` adapter using [`render`] and [`parse`].
pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&render(at))
}

/// Counterpart of [`serialize`].
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_offset_is_normalised_to_utc() {
        let at = parse("2031-05-01T14:00:00+02:00").unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2031, 5, 1, 12, 0, 0).unwrap());
        assert_eq!(render(&at), "2031-05-01T12:00:00Z");
    }

    #[test]
    fn test_date_only_input_is_midnight_utc() {
        let at = parse("2099-01-01").unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(render(&at), "2099-01-01T00:00:00Z");
        assert!(parse("2099-13-01").is_err());
    }

    #[test]
    fn test_naive_input_is_taken_as_utc() {
        let at = parse("2031-05-01T12:00:00.250000").unwrap();
        assert_eq!(at.hour(), 12);
        assert_eq!(at.nanosecond(), 250_000_000);
        assert_eq!(render(&at), "2031-05-01T12:00:00.250Z");
    }

    #[test]
    fn test_render_parse_is_stable() {
        let now = Utc::now();
        assert_eq!(parse(&render(&now)).unwrap(), now);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = parse("next tuesday").unwrap_err();
        assert!(err.contains("next tuesday"));
    }
}
