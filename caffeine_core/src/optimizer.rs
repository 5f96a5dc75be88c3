//! Schedule search for caffeine dosing.
//!
//! This module implements a bounded exhaustive search:
//! - Place candidate dose instants ahead of and across each focus window
//! - Enumerate every schedule of up to `max_doses` doses over those instants
//! - Score each schedule against the performance model
//!
//! A schedule is better when more focus windows stay at or above the target
//! for their whole duration; ties go to the schedule using less caffeine.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DOSE_LEAD_MINUTES, MAX_CANDIDATE_INSTANTS, MAX_DOSES_PER_SCHEDULE, WINDOW_SAMPLE_MINUTES,
};
use crate::model::predict_many;
use crate::types::{
    CaffeineDose, OptimizationParams, Schedule, SleepPeriod, TimeWindow, Timestamp,
};

/// Bounds on the search space
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchLimits {
    /// Candidate dose instants kept, counted across all windows
    pub max_candidates: usize,
    /// Largest number of doses in one schedule
    pub max_doses: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_candidates: MAX_CANDIDATE_INSTANTS,
            max_doses: MAX_DOSES_PER_SCHEDULE,
        }
    }
}

/// How well a schedule serves the focus windows
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScheduleScore {
    pub successful_windows: usize,
    pub total_mg: f64,
}

impl ScheduleScore {
    /// Strictly better: more successful windows, or as many with less caffeine.
    pub fn beats(&self, other: &ScheduleScore) -> bool {
        self.successful_windows > other.successful_windows
            || (self.successful_windows == other.successful_windows
                && self.total_mg < other.total_mg)
    }
}

/// Find the best schedule using the default search limits.
///
/// Returns `None` when there are no windows or dose options, or when no
/// schedule keeps any window at target.
pub fn find_optimal_schedule(
    sleep: &[SleepPeriod],
    params: &OptimizationParams,
) -> Option<Schedule> {
    find_optimal_schedule_with(sleep, params, SearchLimits::default())
}

/// Find the best schedule within explicit search limits.
pub fn find_optimal_schedule_with(
    sleep: &[SleepPeriod],
    params: &OptimizationParams,
    limits: SearchLimits,
) -> Option<Schedule> {
    if params.time_windows.is_empty() {
        tracing::info!("No focus windows given, nothing to optimize");
        return None;
    }

    let options = usable_dose_options(params);
    if options.is_empty() {
        tracing::info!("No usable dose options, nothing to optimize");
        return None;
    }

    let candidates = candidate_instants(params, limits);
    tracing::debug!(
        "Searching {} candidate instants with {} dose options",
        candidates.len(),
        options.len()
    );

    let mut best: Option<(ScheduleScore, Schedule)> = None;
    let mut evaluated = 0usize;

    for k in 1..=limits.max_doses.min(candidates.len()) {
        for slots in combinations(candidates.len(), k) {
            for amounts in products(&options, k) {
                let schedule = Schedule::new(
                    slots
                        .iter()
                        .zip(&amounts)
                        .map(|(&slot, &mg)| CaffeineDose::new(candidates[slot], mg))
                        .collect(),
                );
                let score = evaluate(sleep, params, &schedule);
                evaluated += 1;

                if score.successful_windows == 0 {
                    continue;
                }
                if best.as_ref().map_or(true, |(top, _)| score.beats(top)) {
                    best = Some((score, schedule));
                }
            }
        }
    }

    match best {
        Some((score, schedule)) => {
            tracing::info!(
                "Best of {} schedules: {} dose(s), {} mg, {}/{} windows on target",
                evaluated,
                schedule.len(),
                score.total_mg,
                score.successful_windows,
                params.time_windows.len()
            );
            Some(schedule)
        }
        None => {
            tracing::info!(
                "None of {} schedules kept any window at {:.2}",
                evaluated,
                params.target_performance
            );
            None
        }
    }
}

/// Dose options not exceeding the per-intake maximum, in the given order.
fn usable_dose_options(params: &OptimizationParams) -> Vec<f64> {
    params
        .dose_options
        .iter()
        .copied()
        .filter(|&mg| {
            let usable = mg <= params.max_dose_per_intake;
            if !usable {
                tracing::warn!(
                    "Skipping {} mg option above the {} mg per-intake maximum",
                    mg,
                    params.max_dose_per_intake
                );
            }
            usable
        })
        .collect()
}

/// Candidate dose instants, in window order.
///
/// Each window contributes instants starting 30 minutes before it opens and
/// spaced by the minimum gap until it closes. Instants closer than the gap
/// to the previously accepted one (from any window) are skipped.
pub fn candidate_instants(params: &OptimizationParams, limits: SearchLimits) -> Vec<Timestamp> {
    let gap_ms = (params.min_time_between_doses_hours * 3_600_000.0).round();
    let gap = match Duration::try_milliseconds(gap_ms as i64) {
        Some(gap) if gap > Duration::zero() => gap,
        _ => {
            tracing::warn!(
                "Minimum time between doses must be a positive span, got {} h",
                params.min_time_between_doses_hours
            );
            return Vec::new();
        }
    };
    let lead = Duration::minutes(DOSE_LEAD_MINUTES);

    let mut instants: Vec<Timestamp> = Vec::new();
    'windows: for window in &params.time_windows {
        let mut next = window.start.checked_sub_signed(lead);
        while let Some(t) = next.filter(|&t| t < window.end) {
            let spaced = instants.last().map_or(true, |&last| t - last >= gap);
            if spaced {
                if instants.len() == limits.max_candidates {
                    break 'windows;
                }
                instants.push(t);
            }
            // Past the end of the calendar counts as past the window
            next = t.checked_add_signed(gap);
        }
    }
    instants
}

/// Instants at which a window is checked: every 30 minutes from its start,
/// including the end.
pub fn window_samples(window: &TimeWindow) -> Vec<Timestamp> {
    let step = Duration::minutes(WINDOW_SAMPLE_MINUTES);
    let mut samples = vec![window.start];
    let mut next = window.start.checked_add_signed(step);
    while let Some(t) = next.filter(|&t| t <= window.end) {
        samples.push(t);
        next = t.checked_add_signed(step);
    }
    samples
}

/// Score a schedule against every focus window.
pub fn evaluate(
    sleep: &[SleepPeriod],
    params: &OptimizationParams,
    schedule: &Schedule,
) -> ScheduleScore {
    let per_window: Vec<Vec<Timestamp>> =
        params.time_windows.iter().map(window_samples).collect();
    let instants: Vec<Timestamp> = per_window.iter().flatten().copied().collect();
    let predictions = predict_many(&instants, sleep, schedule.doses());

    let mut remaining = predictions.as_slice();
    let mut successful_windows = 0;
    for samples in &per_window {
        let (window, rest) = remaining.split_at(samples.len());
        remaining = rest;
        if window.iter().all(|&p| p >= params.target_performance) {
            successful_windows += 1;
        }
    }

    ScheduleScore {
        successful_windows,
        total_mg: schedule.total_mg(),
    }
}

/// All increasing index tuples of length `k` drawn from `0..n`
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    fn extend(
        start: usize,
        n: usize,
        k: usize,
        current: &mut Vec<usize>,
        out: &mut Vec<Vec<usize>>,
    ) {
        if current.len() == k {
            out.push(current.clone());
            return;
        }
        for i in start..n {
            current.push(i);
            extend(i + 1, n, k, current, out);
            current.pop();
        }
    }

    let mut out = Vec::new();
    extend(0, n, k, &mut Vec::with_capacity(k), &mut out);
    out
}

/// Every length-`k` sequence of dose amounts
fn products(options: &[f64], k: usize) -> Vec<Vec<f64>> {
    (0..k).fold(vec![Vec::with_capacity(k)], |acc, _| {
        acc.into_iter()
            .flat_map(|prefix| {
                options.iter().map(move |&mg| {
                    let mut next = prefix.clone();
                    next.push(mg);
                    next
                })
            })
            .collect()
    })
}
