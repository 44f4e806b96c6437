//! Time periods accepted by the analytics endpoints
//!
//! Each endpoint has its own default, and unknown values fall back to
//! that default instead of erroring.

use chrono::{DateTime, Duration, Utc};

/// Trailing time window for analytics queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Hours24,
    Days7,
    Days30,
    Days90,
    All,
}

impl Period {
    /// Parse a period string; None for unknown input
    pub fn parse(value: &str) -> Option<Period> {
        match value {
            "24h" => Some(Period::Hours24),
            "7d" => Some(Period::Days7),
            "30d" => Some(Period::Days30),
            "90d" => Some(Period::Days90),
            "all" => Some(Period::All),
            _ => None,
        }
    }

    /// Parse an optional query value, falling back to `default` when the
    /// value is absent or unknown
    pub fn parse_or(value: Option<&str>, default: Period) -> Period {
        value.and_then(Period::parse).unwrap_or(default)
    }

    /// Inclusive lower bound of the window; None means unbounded
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Period::Hours24 => Some(now - Duration::hours(24)),
            Period::Days7 => Some(now - Duration::days(7)),
            Period::Days30 => Some(now - Duration::days(30)),
            Period::Days90 => Some(now - Duration::days(90)),
            Period::All => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Hours24 => "24h",
            Period::Days7 => "7d",
            Period::Days30 => "30d",
            Period::Days90 => "90d",
            Period::All => "all",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_periods_parse() {
        assert_eq!(Period::parse("24h"), Some(Period::Hours24));
        assert_eq!(Period::parse("7d"), Some(Period::Days7));
        assert_eq!(Period::parse("30d"), Some(Period::Days30));
        assert_eq!(Period::parse("90d"), Some(Period::Days90));
        assert_eq!(Period::parse("all"), Some(Period::All));
        assert_eq!(Period::parse("1y"), None);
    }

    #[test]
    fn unknown_values_fall_back_to_default() {
        assert_eq!(Period::parse_or(Some("1y"), Period::Hours24), Period::Hours24);
        assert_eq!(Period::parse_or(None, Period::Days7), Period::Days7);
        assert_eq!(Period::parse_or(Some("30d"), Period::Days7), Period::Days30);
    }

    #[test]
    fn cutoff_windows() {
        let now = Utc::now();
        assert_eq!(Period::All.cutoff(now), None);
        assert_eq!(Period::Hours24.cutoff(now), Some(now - Duration::hours(24)));
        assert_eq!(Period::Days90.cutoff(now), Some(now - Duration::days(90)));
    }
}
