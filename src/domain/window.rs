//! Time windows for missions, assignments and maintenance
//!
//! A window is the half-open interval `[start, end)`. Windows that touch at a
//! single instant (`a.end == b.start`) do not overlap.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum WindowError {
    #[error("Window must end after it starts: {start} .. {end}")]
    Empty {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid date or time '{0}': expected RFC 3339, YYYY-MM-DD or DD/MM/YYYY")]
    InvalidInstant(String),
}

/// A half-open time interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = WindowError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeWindow {
    /// Creates a window, rejecting empty or inverted intervals
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        if end <= start {
            return Err(WindowError::Empty { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses a window from two user-supplied bounds
    ///
    /// A date-only end bound means the end of that day.
    pub fn parse(start: &str, end: &str) -> Result<Self, WindowError> {
        Self::new(parse_start(start)?, parse_end(end)?)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns true if the two windows share any instant
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns true if the instant falls inside the window
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Parses an instant; a date-only value is midnight UTC of that day
pub fn parse_start(s: &str) -> Result<DateTime<Utc>, WindowError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    parse_date(s)
        .map(midnight)
        .ok_or_else(|| WindowError::InvalidInstant(s.to_string()))
}

/// Parses an end instant; a date-only value is the end of that day
pub fn parse_end(s: &str) -> Result<DateTime<Utc>, WindowError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    parse_date(s)
        .and_then(|date| date.succ_opt())
        .map(midnight)
        .ok_or_else(|| WindowError::InvalidInstant(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    fn window(from: (u32, u32), to: (u32, u32)) -> TimeWindow {
        TimeWindow::new(at(from.0, from.1), at(to.0, to.1)).unwrap()
    }

    #[test]
    fn rejects_empty_window() {
        assert!(TimeWindow::new(at(9, 0), at(9, 0)).is_err());
        assert!(TimeWindow::new(at(10, 0), at(9, 0)).is_err());
    }

    #[test]
    fn overlapping_windows() {
        let a = window((9, 0), (10, 0));
        let b = window((9, 30), (10, 30));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_windows_do_not_overlap() {
        let a = window((9, 0), (10, 0));
        let b = window((10, 0), (11, 0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn nested_window_overlaps() {
        let outer = window((8, 0), (12, 0));
        let inner = window((9, 0), (9, 15));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn contains_is_half_open() {
        let w = window((9, 0), (10, 0));
        assert!(w.contains(at(9, 0)));
        assert!(!w.contains(at(10, 0)));
    }

    #[test]
    fn parse_date_only_bounds_cover_whole_days() {
        let w = TimeWindow::parse("2026-03-02", "2026-03-02").unwrap();
        assert_eq!(w.start(), at(0, 0));
        assert_eq!(w.end() - w.start(), Duration::days(1));

        let w = TimeWindow::parse("02/03/2026", "03/03/2026").unwrap();
        assert_eq!(w.end() - w.start(), Duration::days(2));
    }

    #[test]
    fn parse_rfc3339_bounds() {
        let w = TimeWindow::parse("2026-03-02T09:00:00Z", "2026-03-02T10:00:00+00:00").unwrap();
        assert_eq!(w, window((9, 0), (10, 0)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            parse_start("next tuesday"),
            Err(WindowError::InvalidInstant(_))
        ));
    }

    #[test]
    fn deserialize_validates() {
        let ok = r#"{"start":"2026-03-02T09:00:00Z","end":"2026-03-02T10:00:00Z"}"#;
        assert!(serde_json::from_str::<TimeWindow>(ok).is_ok());

        let inverted = r#"{"start":"2026-03-02T10:00:00Z","end":"2026-03-02T09:00:00Z"}"#;
        assert!(serde_json::from_str::<TimeWindow>(inverted).is_err());
    }
}
