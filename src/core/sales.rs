//! Windowed sales-rate average
//!
//! `average = units sold in [start, end] / days(start, end) * unit_days`,
//! where `days` rounds the window up to whole days and treats a zero-length
//! window as one day. Plain-date boundaries cover whole days, so
//! `2024-03-01..2024-03-08` spans 8 days and a single date spans 1.
//! Months are a fixed 30 days.

use crate::core::error::{ShopError, ShopResult, ValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Unit the average is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Day,
    Week,
    Month,
}

impl TimeUnit {
    /// Number of days one unit spans
    pub fn days(self) -> i64 {
        match self {
            TimeUnit::Day => 1,
            TimeUnit::Week => 7,
            TimeUnit::Month => 30,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(TimeUnit::Day),
            "week" => Ok(TimeUnit::Week),
            "month" => Ok(TimeUnit::Month),
            other => Err(ValidationError::InvalidParameter {
                name: "unit".to_string(),
                message: format!("expected day, week or month, got '{}'", other),
            }
            .into()),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
        };
        f.write_str(name)
    }
}

/// Query string of `GET /order/average`
#[derive(Debug, Clone, Deserialize)]
pub struct AverageQuery {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub unit: Option<String>,
}

impl AverageQuery {
    pub fn into_window(self) -> ShopResult<SalesWindow> {
        let start = parse_boundary("start", &self.start, Edge::Start)?;
        let end = parse_boundary("end", &self.end, Edge::End)?;
        let unit = match self.unit.as_deref() {
            Some(raw) => raw.parse()?,
            None => TimeUnit::default(),
        };
        SalesWindow::new(start, end, unit)
    }
}

/// Which side of the window a boundary sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date.
///
/// A plain date covers the whole UTC day: as a start it is that day's
/// midnight, as an end it is the last microsecond of the day (the finest
/// instant PostgreSQL stores).
pub fn parse_boundary(name: &str, raw: &str, edge: Edge) -> ShopResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| match edge {
            Edge::Start => date.and_hms_opt(0, 0, 0),
            Edge::End => date.and_hms_micro_opt(23, 59, 59, 999_999),
        })
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            ValidationError::InvalidParameter {
                name: name.to_string(),
                message: format!("'{}' is neither an RFC 3339 timestamp nor YYYY-MM-DD", raw),
            }
            .into()
        })
}

/// A closed interval `[start, end]` and the unit to report in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    unit: TimeUnit,
}

impl SalesWindow {
    /// Fails with [`ShopError::InvalidRange`] when `end` precedes `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, unit: TimeUnit) -> ShopResult<Self> {
        if end < start {
            return Err(ShopError::InvalidRange {
                message: format!("end {} precedes start {}", end, start),
            });
        }
        Ok(Self { start, end, unit })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Whole days covered by the window, never less than one
    pub fn days(&self) -> i64 {
        let millis = (self.end - self.start).num_milliseconds();
        let days = (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;
        days.max(1)
    }

    /// Average units sold per `unit` given the window's total
    pub fn average(&self, total_units: i64) -> f64 {
        total_units as f64 / self.days() as f64 * self.unit.days() as f64
    }

    pub fn report(&self, total_units: i64) -> SalesAverage {
        SalesAverage {
            average: self.average(total_units),
            total_units,
            days: self.days(),
            unit: self.unit,
        }
    }
}

/// Response body of `GET /order/average`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesAverage {
    pub average: f64,
    pub total_units: i64,
    pub days: i64,
    pub unit: TimeUnit,
}
