//! Configuration file support for caffplan.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/caffplan/config.toml`.

use crate::constants::{
    CURVE_SAMPLE_MINUTES, CURVE_SPAN_HOURS, MAX_CANDIDATE_INSTANTS, MAX_DOSES_PER_SCHEDULE,
};
use crate::optimizer::SearchLimits;
use crate::{Error, OptimizationParams, Result, TimeWindow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    #[serde(default)]
    pub curve: CurveConfig,
}

/// Default schedule search parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default = "default_target_performance")]
    pub target_performance: f64,

    #[serde(default = "default_max_dose_per_intake")]
    pub max_dose_per_intake: f64,

    #[serde(default = "default_min_time_between_doses_hours")]
    pub min_time_between_doses_hours: f64,

    #[serde(default = "default_dose_options")]
    pub dose_options: Vec<f64>,

    #[serde(default = "default_fallback_dose")]
    pub fallback_dose: f64,

    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    #[serde(default = "default_max_doses")]
    pub max_doses: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            target_performance: default_target_performance(),
            max_dose_per_intake: default_max_dose_per_intake(),
            min_time_between_doses_hours: default_min_time_between_doses_hours(),
            dose_options: default_dose_options(),
            fallback_dose: default_fallback_dose(),
            max_candidates: default_max_candidates(),
            max_doses: default_max_doses(),
        }
    }
}

/// Comparison curve sampling
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CurveConfig {
    #[serde(default = "default_sample_minutes")]
    pub sample_minutes: i64,

    #[serde(default = "default_span_hours")]
    pub span_hours: i64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            sample_minutes: default_sample_minutes(),
            span_hours: default_span_hours(),
        }
    }
}

// Default value functions
fn default_target_performance() -> f64 {
    0.7
}

fn default_max_dose_per_intake() -> f64 {
    200.0
}

fn default_min_time_between_doses_hours() -> f64 {
    4.0
}

fn default_dose_options() -> Vec<f64> {
    vec![50.0, 100.0, 150.0, 200.0]
}

fn default_fallback_dose() -> f64 {
    100.0
}

fn default_max_candidates() -> usize {
    MAX_CANDIDATE_INSTANTS
}

fn default_max_doses() -> usize {
    MAX_DOSES_PER_SCHEDULE
}

fn default_sample_minutes() -> i64 {
    CURVE_SAMPLE_MINUTES
}

fn default_span_hours() -> i64 {
    CURVE_SPAN_HOURS
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let Some(config_path) = Self::default_config_path() else {
            tracing::info!("No config directory available, using defaults");
            return Ok(Self::default());
        };
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("caffplan").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject settings the search or curve cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.optimizer.max_doses == 0 {
            return Err(Error::Config("optimizer.max_doses must be at least 1".into()));
        }
        if self.curve.sample_minutes <= 0 {
            return Err(Error::Config(
                "curve.sample_minutes must be positive".into(),
            ));
        }
        if self.curve.span_hours < 0 {
            return Err(Error::Config("curve.span_hours must not be negative".into()));
        }
        self.optimization_params(Vec::new()).validate()
    }

    /// Search parameters for the given focus windows
    pub fn optimization_params(&self, time_windows: Vec<TimeWindow>) -> OptimizationParams {
        OptimizationParams {
            time_windows,
            target_performance: self.optimizer.target_performance,
            max_dose_per_intake: self.optimizer.max_dose_per_intake,
            min_time_between_doses_hours: self.optimizer.min_time_between_doses_hours,
            dose_options: self.optimizer.dose_options.clone(),
            fallback_dose: Some(self.optimizer.fallback_dose),
        }
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_candidates: self.optimizer.max_candidates,
            max_doses: self.optimizer.max_doses,
        }
    }
}
