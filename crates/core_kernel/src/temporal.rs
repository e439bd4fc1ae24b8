//! Temporal types for billing
//!
//! Two distinct time shapes live here:
//! - `BillingPeriod`: the closed `[start, end]` window an invoice covers
//! - `ActiveRange`: the date range over which a contract is in force,
//!   possibly open-ended

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Timezone wrapper for deriving period boundaries from calendar dates
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Gets the start of day (00:00:00) in this timezone as UTC
    ///
    /// Fails when local midnight falls inside a DST gap (some zones
    /// spring forward at 00:00). An ambiguous midnight on a fall-back
    /// day resolves to the earlier instant.
    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, TemporalError> {
        self.resolve_local(date.and_time(NaiveTime::MIN))
    }

    /// Gets the end of day (23:59:59.999999999) in this timezone as UTC
    pub fn end_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, TemporalError> {
        let end = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
            .expect("constant time is valid");
        self.resolve_local(date.and_time(end))
    }

    fn resolve_local(&self, local: NaiveDateTime) -> Result<DateTime<Utc>, TemporalError> {
        match local.and_local_timezone(self.0) {
            LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
            LocalResult::None => Err(TemporalError::NonexistentLocalTime {
                time: local.to_string(),
                timezone: self.0.name().to_string(),
            }),
        }
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must not be after end {end}")]
    InvalidPeriod {
        start: String,
        end: String,
    },

    #[error("Invalid span: from {from} must be strictly before to {to}")]
    InvalidSpan {
        from: String,
        to: String,
    },

    #[error("Local time {time} does not exist in timezone {timezone}")]
    NonexistentLocalTime {
        time: String,
        timezone: String,
    },
}

/// The closed `[start, end]` window an invoice covers
///
/// The period is supplied by the caller at invoice creation; it is never
/// re-derived inside the billing core. A logged span qualifies only when
/// fully contained: `from >= start && to <= end`, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    /// Start of the period (inclusive)
    pub start: DateTime<Utc>,
    /// End of the period (inclusive)
    pub end: DateTime<Utc>,
}

impl BillingPeriod {
    /// Creates a new billing period
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Builds a period covering whole calendar days in the given timezone
    pub fn from_dates(
        from: NaiveDate,
        to: NaiveDate,
        tz: &Timezone,
    ) -> Result<Self, TemporalError> {
        if from > to {
            return Err(TemporalError::InvalidPeriod {
                start: from.to_string(),
                end: to.to_string(),
            });
        }
        Ok(Self {
            start: tz.start_of_day(from)?,
            end: tz.end_of_day(to)?,
        })
    }

    /// Returns true if this period contains the given timestamp
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Returns true if the `[from, to]` span is fully contained in the period
    ///
    /// This is the qualification rule for invoicing: a span partially
    /// outside the period never qualifies.
    pub fn contains_span(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        from >= self.start && to <= self.end
    }

    /// Returns the duration of the period
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// The date range over which a contract is in force
///
/// `ends_at = None` means open-ended. Date granularity is deliberate:
/// contracts activate and expire on calendar days, not instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRange {
    /// First day the contract is active (inclusive)
    pub active_from: NaiveDate,
    /// Last day the contract is active (inclusive), None means open-ended
    pub ends_at: Option<NaiveDate>,
}

impl ActiveRange {
    /// Creates a new active range
    pub fn new(active_from: NaiveDate, ends_at: Option<NaiveDate>) -> Result<Self, TemporalError> {
        if let Some(ends_at) = ends_at {
            if active_from > ends_at {
                return Err(TemporalError::InvalidPeriod {
                    start: active_from.to_string(),
                    end: ends_at.to_string(),
                });
            }
        }
        Ok(Self { active_from, ends_at })
    }

    /// Creates an open-ended range starting from the given date
    pub fn from(active_from: NaiveDate) -> Self {
        Self {
            active_from,
            ends_at: None,
        }
    }

    /// Returns true if the range covers the given date
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        date >= self.active_from && self.ends_at.map_or(true, |e| date <= e)
    }

    /// Returns true if the range is open-ended
    pub fn is_open_ended(&self) -> bool {
        self.ends_at.is_none()
    }

    /// Returns true if the range intersects the billing period
    ///
    /// Compared at date granularity in UTC: the contract is relevant to a
    /// period if at least one day of the period falls inside the range.
    pub fn intersects(&self, period: &BillingPeriod) -> bool {
        let period_first = period.start.date_naive();
        let period_last = period.end.date_naive();

        self.active_from <= period_last
            && self.ends_at.map_or(true, |e| e >= period_first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_billing_period_rejects_inverted() {
        let result = BillingPeriod::new(ts(2024, 2, 1, 0), ts(2024, 1, 1, 0));
        assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_contains_span_fully_inside() {
        let period = BillingPeriod::new(ts(2024, 1, 1, 0), ts(2024, 1, 31, 23)).unwrap();
        assert!(period.contains_span(ts(2024, 1, 10, 9), ts(2024, 1, 10, 17)));
    }

    #[test]
    fn test_contains_span_boundaries_inclusive() {
        let period = BillingPeriod::new(ts(2024, 1, 1, 0), ts(2024, 1, 31, 23)).unwrap();
        assert!(period.contains_span(ts(2024, 1, 1, 0), ts(2024, 1, 31, 23)));
    }

    #[test]
    fn test_contains_span_partial_overlap_excluded() {
        let period = BillingPeriod::new(ts(2024, 1, 1, 0), ts(2024, 1, 31, 23)).unwrap();
        // Starts before the period
        assert!(!period.contains_span(ts(2023, 12, 31, 22), ts(2024, 1, 1, 6)));
        // Ends after the period
        assert!(!period.contains_span(ts(2024, 1, 31, 20), ts(2024, 2, 1, 2)));
    }

    #[test]
    fn test_active_range_rejects_inverted() {
        let result = ActiveRange::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_active_range_open_ended() {
        let range = ActiveRange::from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(range.is_open_ended());
        assert!(range.is_active_on(NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()));
        assert!(!range.is_active_on(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
    }

    #[test]
    fn test_active_range_intersects_period() {
        let range = ActiveRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Some(NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()),
        )
        .unwrap();

        let january = BillingPeriod::new(ts(2024, 1, 1, 0), ts(2024, 1, 31, 23)).unwrap();
        let march = BillingPeriod::new(ts(2024, 3, 1, 0), ts(2024, 3, 31, 23)).unwrap();

        assert!(range.intersects(&january));
        assert!(!range.intersects(&march));
    }

    #[test]
    fn test_period_from_dates() {
        let tz = Timezone::default();
        let period = BillingPeriod::from_dates(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            &tz,
        )
        .unwrap();

        assert!(period.contains(ts(2024, 1, 31, 23)));
        assert!(!period.contains(ts(2024, 2, 1, 0)));
    }
}
