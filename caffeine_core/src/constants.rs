//! Fixed physiological and search parameters.
//!
//! Rates are expressed per hour of simulated time.

/// Size of one simulation step, in minutes.
pub const STEP_MINUTES: i64 = 5;

/// Exponential decay rate of sleep pressure while asleep.
pub const SLEEP_DECAY_RATE: f64 = 0.25;

/// Base rate at which sleep pressure builds while awake, before circadian modulation.
pub const BASE_PRESSURE_RATE: f64 = 0.05;

/// Transfer rate from the gut compartment into plasma.
pub const ABSORPTION_RATE: f64 = 2.0;

/// Elimination rate from the plasma compartment.
pub const ELIMINATION_RATE: f64 = 0.14;

/// Ceiling of the saturating caffeine response.
pub const MAX_CAFFEINE_EFFECT: f64 = 0.35;

/// Plasma level (mg-equivalent) producing half of the maximum effect.
pub const CAFFEINE_EC50_MG: f64 = 60.0;

/// Circadian peak offset from wake time used while stepping.
pub const STEPPER_PEAK_OFFSET_HOURS: f64 = 2.0;

/// Circadian peak offset from wake time used when scoring performance.
pub const SCORING_PEAK_OFFSET_HOURS: f64 = 1.0;

/// Weight of sleep pressure in the performance score.
pub const PRESSURE_WEIGHT: f64 = 1.2;

/// Hours of assumed wakefulness before the earliest recorded sleep.
pub const PRE_SIMULATION_LOOKBACK_HOURS: i64 = 16;

/// Wake hour assumed when no recorded sleep has ended yet.
pub const DEFAULT_WAKE_HOUR: u32 = 6;

/// Sleep pressure assumed when there is no sleep history at all.
pub const FALLBACK_SLEEP_PRESSURE: f64 = 0.5;

/// How long before a focus window the first candidate dose is placed.
pub const DOSE_LEAD_MINUTES: i64 = 30;

/// Longest accepted minimum spacing between doses, in hours.
pub const MAX_DOSE_GAP_HOURS: f64 = 24.0 * 7.0;

/// Sampling interval used to check a focus window.
pub const WINDOW_SAMPLE_MINUTES: i64 = 30;

/// Upper bound on the number of candidate dose instants searched.
pub const MAX_CANDIDATE_INSTANTS: usize = 8;

/// Largest number of doses combined into one candidate schedule.
pub const MAX_DOSES_PER_SCHEDULE: usize = 2;

/// Default sampling cadence of comparison curves.
pub const CURVE_SAMPLE_MINUTES: i64 = 15;

/// Default span of comparison curves, measured from the wake instant.
pub const CURVE_SPAN_HOURS: i64 = 18;
