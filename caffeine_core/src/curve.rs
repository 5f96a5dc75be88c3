//! Comparison curves for display.
//!
//! Samples the performance model across a span of the day twice: once with
//! only the recorded caffeine intake, and once with a proposed schedule added
//! on top.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::constants::{CURVE_SAMPLE_MINUTES, CURVE_SPAN_HOURS};
use crate::model::{predict_many, wake_instant};
use crate::types::{CaffeineDose, Schedule, SleepPeriod, Timestamp};

/// One sample of a comparison curve
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct CurvePoint {
    pub instant: Timestamp,
    /// Performance with recorded intake only
    pub baseline: f64,
    /// Performance with the proposed schedule added
    pub with_schedule: f64,
}

/// Span and cadence of a comparison curve
#[derive(Clone, Copy, Debug)]
pub struct CurveSampling {
    pub from: Timestamp,
    pub span: Duration,
    pub every: Duration,
}

impl CurveSampling {
    /// Default display span: 18 hours from the wake instant in 15 minute steps.
    pub fn from_wake(sleep: &[SleepPeriod], at: Timestamp) -> Self {
        Self {
            from: wake_instant(sleep, at),
            span: Duration::hours(CURVE_SPAN_HOURS),
            every: Duration::minutes(CURVE_SAMPLE_MINUTES),
        }
    }

    /// Sample instants from `from` to `from + span`, inclusive.
    ///
    /// A span reaching past the representable calendar is cut at its end.
    pub fn instants(&self) -> Vec<Timestamp> {
        if self.every <= Duration::zero() {
            return vec![self.from];
        }
        let end = self
            .from
            .checked_add_signed(self.span)
            .unwrap_or(Timestamp::MAX);
        let mut instants = Vec::new();
        let mut next = Some(self.from);
        while let Some(t) = next.filter(|&t| t <= end) {
            instants.push(t);
            next = t.checked_add_signed(self.every);
        }
        instants
    }
}

/// Build a "with schedule" vs "without" curve.
pub fn comparison_curve(
    sleep: &[SleepPeriod],
    caffeine: &[CaffeineDose],
    schedule: &Schedule,
    sampling: &CurveSampling,
) -> Vec<CurvePoint> {
    let instants = sampling.instants();

    let mut combined = caffeine.to_vec();
    combined.extend(schedule.iter().copied());

    let baseline = predict_many(&instants, sleep, caffeine);
    let with_schedule = predict_many(&instants, sleep, &combined);

    tracing::debug!(
        "Built comparison curve with {} samples from {}",
        instants.len(),
        sampling.from
    );

    instants
        .into_iter()
        .zip(baseline)
        .zip(with_schedule)
        .map(|((instant, baseline), with_schedule)| CurvePoint {
            instant,
            baseline,
            with_schedule,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, h: u32, m: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_default_sampling_starts_at_wake() {
        let sleep = vec![SleepPeriod::new(at(3, 23, 0), at(4, 7, 0))];
        let sampling = CurveSampling::from_wake(&sleep, at(4, 12, 0));
        let instants = sampling.instants();

        assert_eq!(instants.first(), Some(&at(4, 7, 0)));
        assert_eq!(instants.last(), Some(&at(5, 1, 0)));
        assert_eq!(instants.len(), 18 * 4 + 1);
    }

    #[test]
    fn test_schedule_lifts_curve() {
        let sleep = vec![SleepPeriod::new(at(3, 23, 0), at(4, 7, 0))];
        let schedule = Schedule::new(vec![CaffeineDose::new(at(4, 8, 30), 100.0)]);
        let sampling = CurveSampling::from_wake(&sleep, at(4, 12, 0));

        let curve = comparison_curve(&sleep, &[], &schedule, &sampling);

        assert!(curve.iter().all(|p| p.with_schedule >= p.baseline));
        let lifted = curve
            .iter()
            .find(|p| p.instant == at(4, 10, 0))
            .unwrap();
        assert!(lifted.with_schedule > lifted.baseline);
        // Before the dose nothing changes
        let before = curve.iter().find(|p| p.instant == at(4, 8, 0)).unwrap();
        assert_eq!(before.baseline, before.with_schedule);
    }

    #[test]
    fn test_non_positive_cadence_yields_single_sample() {
        let sampling = CurveSampling {
            from: at(4, 7, 0),
            span: Duration::hours(2),
            every: Duration::zero(),
        };
        assert_eq!(sampling.instants(), vec![at(4, 7, 0)]);
    }

    #[test]
    fn test_sampling_stops_at_calendar_end() {
        let from = Timestamp::MAX - Duration::minutes(30);
        let sampling = CurveSampling {
            from,
            span: Duration::hours(5),
            every: Duration::minutes(15),
        };
        assert_eq!(
            sampling.instants(),
            vec![from, from + Duration::minutes(15), from + Duration::minutes(30)]
        );
    }
}
