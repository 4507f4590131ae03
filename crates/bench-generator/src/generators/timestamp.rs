//! Timestamp value generators.

use crate::emitter::{Emitter, SeededRng};
use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;

/// Generate a random timestamp between `start` and `end` (inclusive).
pub fn generate_timestamp_range<R: Rng>(
    rng: &mut R,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DateTime<Utc> {
    let start_ts = start.timestamp();
    let end_ts = end.timestamp();

    if start_ts >= end_ts {
        return start;
    }
    let random_ts = rng.random_range(start_ts..=end_ts);
    DateTime::from_timestamp(random_ts, 0).unwrap_or(start)
}

/// Parse a timestamp string in various formats.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC 3339 / ISO 8601
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Try common date-only format
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

/// RFC 3339 timestamps (second precision, `Z` suffix) in a range.
#[derive(Debug, Clone)]
pub struct TimestampRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    rng: SeededRng,
}

impl TimestampRange {
    /// Create a range from two timestamp strings.
    ///
    /// An unparseable bound collapses the range onto the other bound; if
    /// neither parses the range is the Unix epoch.
    pub fn new(start: &str, end: &str, seed: Option<u64>) -> Self {
        let (start, end) = match (parse_timestamp(start), parse_timestamp(end)) {
            (Some(start), Some(end)) => (start, end),
            (Some(dt), None) | (None, Some(dt)) => (dt, dt),
            (None, None) => (DateTime::<Utc>::UNIX_EPOCH, DateTime::<Utc>::UNIX_EPOCH),
        };
        Self {
            start,
            end,
            rng: SeededRng::new(seed),
        }
    }
}

impl Emitter for TimestampRange {
    type Item = String;

    fn emit_one(&mut self) -> String {
        generate_timestamp_range(&mut self.rng, self.start, self.end)
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn max_unique(&self) -> Option<u64> {
        let span = (self.end.timestamp() - self.start.timestamp()).max(0);
        u64::try_from(span).ok().map(|s| s.saturating_add(1))
    }

    fn seed(&mut self, seed: Option<u64>) {
        self.rng.reseed(seed);
    }

    fn reset(&mut self) {
        self.rng.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_timestamp_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let start = parse_timestamp("2020-01-01T00:00:00Z").unwrap();
        let end = parse_timestamp("2024-12-31T23:59:59Z").unwrap();

        let dt = generate_timestamp_range(&mut rng, start, end);
        assert!(dt.year() >= 2020 && dt.year() <= 2024);
    }

    #[test]
    fn test_parse_dates_only() {
        let dt = parse_timestamp("2020-01-01").unwrap();
        assert_eq!(dt.year(), 2020);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_timestamp_emitter() {
        let mut a = TimestampRange::new("2020-01-01", "2020-01-02", Some(42));
        let mut b = TimestampRange::new("2020-01-01", "2020-01-02", Some(42));

        let value = a.emit_one();
        assert_eq!(value, b.emit_one());
        assert!(value.starts_with("2020-01-0"));
        assert!(value.ends_with('Z'));
        assert_eq!(a.max_unique(), Some(86_401));
    }

    #[test]
    fn test_timestamp_bad_bound_collapses() {
        let mut range = TimestampRange::new("2021-06-01", "not a date", Some(1));
        assert_eq!(range.emit_one(), "2021-06-01T00:00:00Z");
    }
}
