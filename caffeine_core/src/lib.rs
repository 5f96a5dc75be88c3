#![forbid(unsafe_code)]

//! Core domain model and planning logic for caffplan.
//!
//! This crate provides:
//! - Domain types (sleep periods, caffeine doses, focus windows, schedules)
//! - Physiological state stepper (sleep pressure, caffeine kinetics)
//! - Performance model and comparison curves
//! - Caffeine schedule optimizer
//! - Configuration and logging

pub mod types;
pub mod error;
pub mod constants;
pub mod config;
pub mod logging;
pub mod input;
pub mod stepper;
pub mod model;
pub mod curve;
pub mod optimizer;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use stepper::SimulationState;
pub use model::{predict, predict_many, wake_instant};
pub use curve::{comparison_curve, CurvePoint, CurveSampling};
pub use optimizer::{
    evaluate, find_optimal_schedule, find_optimal_schedule_with, ScheduleScore, SearchLimits,
};
