//! Text forms of the domain types used on the command line.
//!
//! - Timestamps: `YYYY-MM-DDTHH:MM` or `YYYY-MM-DDTHH:MM:SS` (a space also
//!   separates date and time)
//! - Intervals: `START/END`
//! - Doses: `TIME@MG`

use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::{CaffeineDose, Error, Result, SleepPeriod, TimeWindow, Timestamp};

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a wall-clock timestamp
pub fn parse_timestamp(s: &str) -> Result<Timestamp> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| {
            Error::Parse(format!(
                "Invalid timestamp '{}', expected YYYY-MM-DDTHH:MM",
                s
            ))
        })
}

fn parse_interval(s: &str) -> Result<(Timestamp, Timestamp)> {
    let (start, end) = s
        .split_once('/')
        .ok_or_else(|| Error::Parse(format!("Invalid interval '{}', expected START/END", s)))?;
    Ok((parse_timestamp(start)?, parse_timestamp(end)?))
}

impl FromStr for SleepPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = parse_interval(s)?;
        let period = SleepPeriod::new(start, end);
        period.validate()?;
        Ok(period)
    }
}

impl FromStr for TimeWindow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = parse_interval(s)?;
        let window = TimeWindow::new(start, end);
        window.validate()?;
        Ok(window)
    }
}

impl FromStr for CaffeineDose {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (instant, mg) = s
            .split_once('@')
            .ok_or_else(|| Error::Parse(format!("Invalid dose '{}', expected TIME@MG", s)))?;
        let milligrams = mg
            .trim()
            .trim_end_matches("mg")
            .parse::<f64>()
            .map_err(|e| Error::Parse(format!("Invalid dose amount '{}': {}", mg, e)))?;
        let dose = CaffeineDose::new(parse_timestamp(instant)?, milligrams);
        dose.validate()?;
        Ok(dose)
    }
}
