//! Core domain types for the caffeine planner.
//!
//! This module defines the fundamental types used throughout the system:
//! - Sleep history and caffeine intake events
//! - Focus windows and optimizer parameters
//! - Dosing schedules returned by the optimizer

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_DOSE_GAP_HOURS;
use crate::{Error, Result};

/// A point on the single wall-clock axis every model invocation works on.
pub type Timestamp = NaiveDateTime;

/// Fractional hour of day (e.g. 07:30 → 7.5).
pub fn hour_of_day(t: Timestamp) -> f64 {
    t.hour() as f64 + t.minute() as f64 / 60.0 + t.second() as f64 / 3600.0
}

// ============================================================================
// History Types
// ============================================================================

/// One recorded sleep interval, half-open: `start <= t < end`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SleepPeriod {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl SleepPeriod {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Whether the subject is asleep at `t`
    pub fn contains(&self, t: Timestamp) -> bool {
        self.start <= t && t < self.end
    }

    pub fn validate(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(Error::InvalidInterval(format!(
                "sleep period must start before it ends ({} .. {})",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

/// A single planned or historical caffeine intake.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct CaffeineDose {
    pub instant: Timestamp,
    pub milligrams: f64,
}

impl CaffeineDose {
    pub fn new(instant: Timestamp, milligrams: f64) -> Self {
        Self {
            instant,
            milligrams,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.milligrams.is_finite() || self.milligrams <= 0.0 {
            return Err(Error::InvalidDose(format!(
                "dose at {} must be a positive amount, got {} mg",
                self.instant, self.milligrams
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Optimizer Input Types
// ============================================================================

/// A focus window during which performance must stay at or above target.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeWindow {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Zero-length windows are accepted; they are checked at a single instant.
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(Error::InvalidInterval(format!(
                "focus window must not end before it starts ({} .. {})",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

/// Parameters of a schedule search
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OptimizationParams {
    pub time_windows: Vec<TimeWindow>,
    pub target_performance: f64,
    pub max_dose_per_intake: f64,
    pub min_time_between_doses_hours: f64,
    pub dose_options: Vec<f64>,
    /// Suggested by callers when no schedule is found; unused by the search
    pub fallback_dose: Option<f64>,
}

impl OptimizationParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.target_performance) {
            return Err(Error::Config(format!(
                "target performance must be within [0, 1], got {}",
                self.target_performance
            )));
        }
        let gap = self.min_time_between_doses_hours;
        if !(gap > 0.0 && gap <= MAX_DOSE_GAP_HOURS) {
            return Err(Error::Config(format!(
                "minimum time between doses must be within (0, {}] h, got {} h",
                MAX_DOSE_GAP_HOURS, gap
            )));
        }
        if self.max_dose_per_intake.is_nan() || self.max_dose_per_intake <= 0.0 {
            return Err(Error::InvalidDose(format!(
                "max dose per intake must be positive, got {} mg",
                self.max_dose_per_intake
            )));
        }
        for window in &self.time_windows {
            window.validate()?;
        }
        for &mg in &self.dose_options {
            if !mg.is_finite() || mg <= 0.0 {
                return Err(Error::InvalidDose(format!(
                    "dose options must be positive amounts, got {} mg",
                    mg
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Schedule Type
// ============================================================================

/// A proposed set of caffeine doses, owned by whoever received it.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Schedule {
    doses: Vec<CaffeineDose>,
}

impl Schedule {
    pub fn new(doses: Vec<CaffeineDose>) -> Self {
        Self { doses }
    }

    pub fn doses(&self) -> &[CaffeineDose] {
        &self.doses
    }

    pub fn into_doses(self) -> Vec<CaffeineDose> {
        self.doses
    }

    pub fn total_mg(&self) -> f64 {
        self.doses.iter().map(|d| d.milligrams).sum()
    }

    pub fn len(&self) -> usize {
        self.doses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doses.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CaffeineDose> {
        self.doses.iter()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a CaffeineDose;
    type IntoIter = std::slice::Iter<'a, CaffeineDose>;

    fn into_iter(self) -> Self::IntoIter {
        self.doses.iter()
    }
}
