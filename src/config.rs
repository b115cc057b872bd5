//! Tuning knobs for a session: difficulty ramp and reject-control shrinking.
//!
//! Chaos-event thresholds are deliberately not configurable; they live in
//! [`crate::session::chaos`].

use serde::{Deserialize, Serialize, de};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Difficulty a fresh (or reset) session starts at.
    pub initial_difficulty: f64,
    pub difficulty_min: f64,
    pub difficulty_max: f64,
    /// Ramp per rejection while the count is at or below `steep_after`.
    pub gentle_step: f64,
    /// Ramp per rejection once the count exceeds `steep_after`.
    pub steep_step: f64,
    pub steep_after: u32,
    pub reject_shrink_step: f64,
    pub reject_min_scale: f64,
    /// Scale forced by the `tiny` chaos event.
    pub tiny_scale: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_difficulty: 5.0,
            difficulty_min: 1.0,
            difficulty_max: 10.0,
            gentle_step: 0.2,
            steep_step: 0.5,
            steep_after: 5,
            reject_shrink_step: 0.05,
            reject_min_scale: 0.3,
            tiny_scale: 0.15,
        }
    }
}

/// Errors raised when session configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("difficulty minimum {min:.2} exceeds maximum {max:.2}")]
    DifficultyBounds { min: f64, max: f64 },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("invalid session config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SessionConfig {
    /// Parse a (possibly partial) JSON object; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for malformed JSON or out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        // Derived Deserialize would also take a positional array.
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(ConfigError::Parse(de::Error::custom(
                "session config must be a JSON object",
            )));
        }
        let cfg: SessionConfig = serde_json::from_value(value)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.difficulty_min.is_nan()
            || self.difficulty_max.is_nan()
            || self.difficulty_min > self.difficulty_max
        {
            return Err(ConfigError::DifficultyBounds {
                min: self.difficulty_min,
                max: self.difficulty_max,
            });
        }
        check_range(
            "initial_difficulty",
            self.initial_difficulty,
            self.difficulty_min,
            self.difficulty_max,
        )?;
        check_range("gentle_step", self.gentle_step, 0.0, self.difficulty_max)?;
        check_range("steep_step", self.steep_step, 0.0, self.difficulty_max)?;
        check_range("reject_shrink_step", self.reject_shrink_step, 0.0, 1.0)?;
        check_range("reject_min_scale", self.reject_min_scale, 0.0, 1.0)?;
        check_range("tiny_scale", self.tiny_scale, 0.0, 1.0)?;
        Ok(())
    }

    /// Clamp a raw difficulty into the configured band.
    pub fn clamp_difficulty(&self, value: f64) -> f64 {
        // Not f64::clamp: an unvalidated config must not panic here.
        value.max(self.difficulty_min).min(self.difficulty_max)
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    // NaN fails both comparisons and is rejected here too.
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        })
    }
}
