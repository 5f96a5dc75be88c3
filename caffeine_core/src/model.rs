//! Performance model.
//!
//! Predicts cognitive performance at an instant by simulating forward from a
//! bootstrap point through the recorded sleep history and caffeine intake.
//!
//! Every prediction is a pure function of its inputs:
//! 1. Resolve the wake reference (latest sleep end at or before the target,
//!    else 06:00 on the target's day).
//! 2. Bootstrap sleep pressure by assuming 16 awake hours before the
//!    earliest recorded sleep, starting from a rested, caffeine-free state.
//!    With no sleep history, start at 06:00 with a moderate baseline instead.
//! 3. Step forward on the 5-minute grid to the target, ingesting doses and
//!    switching between sleep and wake as the history dictates.
//! 4. Score circadian alertness, sleep pressure and caffeine effect.

use chrono::{Duration, NaiveTime};

use crate::constants::{
    CAFFEINE_EC50_MG, DEFAULT_WAKE_HOUR, FALLBACK_SLEEP_PRESSURE, MAX_CAFFEINE_EFFECT,
    PRESSURE_WEIGHT, PRE_SIMULATION_LOOKBACK_HOURS, SCORING_PEAK_OFFSET_HOURS,
};
use crate::stepper::{circadian, step_size, SimulationState};
use crate::types::{hour_of_day, CaffeineDose, SleepPeriod, Timestamp};

/// Predict performance in `[0, 1]` at `target`.
pub fn predict(target: Timestamp, sleep: &[SleepPeriod], caffeine: &[CaffeineDose]) -> f64 {
    let wake = wake_instant(sleep, target);
    let origin = bootstrap(target, sleep, wake);
    let grid = run_grid(origin, target, sleep, caffeine, wake);
    let state = finish(grid, target, sleep, caffeine, wake);
    let performance = score(&state, target, wake);

    tracing::trace!(
        "predict {}: S={:.3} plasma={:.1} -> {:.3}",
        target,
        state.sleep_pressure,
        state.plasma_caffeine,
        performance
    );
    performance
}

/// Predict performance at many instants, reusing simulation progress.
///
/// Results are returned in the order of `targets` and match [`predict`]
/// exactly. Progress is shared between consecutive targets that resolve to
/// the same wake reference and are not earlier than the last one.
pub fn predict_many(
    targets: &[Timestamp],
    sleep: &[SleepPeriod],
    caffeine: &[CaffeineDose],
) -> Vec<f64> {
    let earliest_sleep = sleep.iter().map(|s| s.start).min();
    let mut cursor: Option<(Timestamp, SimulationState)> = None;
    let mut results = Vec::with_capacity(targets.len());

    for &target in targets {
        let wake = wake_instant(sleep, target);
        // Before the earliest sleep the bootstrap itself depends on the target
        let shareable = earliest_sleep.map_or(true, |first| target >= first);

        let grid = match cursor {
            Some((cached_wake, state))
                if shareable && cached_wake == wake && state.instant <= target =>
            {
                run_grid(state, target, sleep, caffeine, wake)
            }
            _ => run_grid(bootstrap(target, sleep, wake), target, sleep, caffeine, wake),
        };

        let state = finish(grid, target, sleep, caffeine, wake);
        results.push(score(&state, target, wake));
        cursor = shareable.then_some((wake, grid));
    }

    results
}

/// The wake reference used for `target`: the end of the latest sleep that
/// ended at or before it, or 06:00 on the target's day.
pub fn wake_instant(sleep: &[SleepPeriod], target: Timestamp) -> Timestamp {
    sleep
        .iter()
        .map(|s| s.end)
        .filter(|&end| end <= target)
        .max()
        .unwrap_or_else(|| default_wake(target))
}

fn default_wake(target: Timestamp) -> Timestamp {
    target.date().and_time(NaiveTime::MIN) + Duration::hours(DEFAULT_WAKE_HOUR as i64)
}

fn is_asleep(sleep: &[SleepPeriod], t: Timestamp) -> bool {
    sleep.iter().any(|s| s.contains(t))
}

/// Milligrams taken within `[from, to)`
fn intake_between(caffeine: &[CaffeineDose], from: Timestamp, to: Timestamp) -> f64 {
    caffeine
        .iter()
        .filter(|d| from <= d.instant && d.instant < to)
        .map(|d| d.milligrams)
        .sum()
}

/// Starting state for the main simulation loop.
fn bootstrap(target: Timestamp, sleep: &[SleepPeriod], wake: Timestamp) -> SimulationState {
    let Some(first_sleep) = sleep.iter().map(|s| s.start).min() else {
        return SimulationState::with_pressure(wake, FALLBACK_SLEEP_PRESSURE);
    };

    let stop = first_sleep.min(target);
    let mut state =
        SimulationState::rested(first_sleep - Duration::hours(PRE_SIMULATION_LOOKBACK_HOURS));
    while state.instant + step_size() <= stop {
        state = state.step(false, wake);
    }
    if state.instant < stop {
        state = state.advance(stop - state.instant, false, wake);
    }
    state
}

/// Take whole steps while the next grid point does not pass `target`.
fn run_grid(
    mut state: SimulationState,
    target: Timestamp,
    sleep: &[SleepPeriod],
    caffeine: &[CaffeineDose],
    wake: Timestamp,
) -> SimulationState {
    let dt = step_size();
    while state.instant + dt <= target {
        let now = state.instant;
        state = state
            .ingest(intake_between(caffeine, now, now + dt))
            .step(is_asleep(sleep, now), wake);
    }
    state
}

/// Close the gap between the last grid point and an off-grid `target`.
fn finish(
    state: SimulationState,
    target: Timestamp,
    sleep: &[SleepPeriod],
    caffeine: &[CaffeineDose],
    wake: Timestamp,
) -> SimulationState {
    if state.instant >= target {
        return state;
    }
    let now = state.instant;
    state
        .ingest(intake_between(caffeine, now, target))
        .advance(target - now, is_asleep(sleep, now), wake)
}

/// Saturating response to plasma caffeine.
pub fn caffeine_effect(plasma: f64) -> f64 {
    MAX_CAFFEINE_EFFECT * plasma / (CAFFEINE_EC50_MG + plasma)
}

fn score(state: &SimulationState, target: Timestamp, wake: Timestamp) -> f64 {
    let peak_hour = hour_of_day(wake) + SCORING_PEAK_OFFSET_HOURS;
    let process_c = circadian(hour_of_day(target), peak_hour);
    let performance =
        process_c - state.sleep_pressure * PRESSURE_WEIGHT + caffeine_effect(state.plasma_caffeine);
    performance.clamp(0.0, 1.0)
}
