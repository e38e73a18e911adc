use crate::{
    constants::{MAX_VELOCITY_RANGE, TIME_SCALE_RANGE, UNIT_RANGE},
    error::Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Operator tunables of the control loop.
///
/// Ranged fields are clamped into their domain whenever a config is built
/// through [`ControlConfig::new`], [`ControlConfig::clamped`] or one of the
/// loaders. Non-finite values fall back to the field default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Velocity reached at full forward input, in m/s. Range `[0, 200]`.
    pub max_velocity: f64,
    /// Simulation time scale. Range `[0.01, 10]`.
    pub time_scale: f64,
    /// Balance automatically instead of mixing operator and balance steer.
    pub full_auto: bool,
    /// Interpolation between operator steer (0) and balance steer (1).
    pub auto_balance_mix: f64,
    /// Scale of the damping term. Range `[0, 1]`.
    pub damper_gain: f64,
}

/// Moderate cruising speed, real time, full-auto balance and half-strength
/// mix and damping.
impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            max_velocity: 10.0,
            time_scale: 1.0,
            full_auto: true,
            auto_balance_mix: 0.5,
            damper_gain: 0.5,
        }
    }
}

impl ControlConfig {
    pub fn new(
        max_velocity: f64,
        time_scale: f64,
        full_auto: bool,
        auto_balance_mix: f64,
        damper_gain: f64,
    ) -> Self {
        Self {
            max_velocity,
            time_scale,
            full_auto,
            auto_balance_mix,
            damper_gain,
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        let Self {
            max_velocity,
            time_scale,
            full_auto,
            auto_balance_mix,
            damper_gain,
        } = self;

        Self {
            max_velocity: clamp_field(
                "max_velocity",
                max_velocity,
                MAX_VELOCITY_RANGE,
                defaults.max_velocity,
            ),
            time_scale: clamp_field(
                "time_scale",
                time_scale,
                TIME_SCALE_RANGE,
                defaults.time_scale,
            ),
            full_auto,
            auto_balance_mix: clamp_field(
                "auto_balance_mix",
                auto_balance_mix,
                UNIT_RANGE,
                defaults.auto_balance_mix,
            ),
            damper_gain: clamp_field(
                "damper_gain",
                damper_gain,
                UNIT_RANGE,
                defaults.damper_gain,
            ),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config.clamped())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

fn clamp_field(name: &str, value: f64, (min, max): (f64, f64), fallback: f64) -> f64 {
    if !value.is_finite() {
        warn!("{name} is not finite ({value}), using {fallback}");
        return fallback;
    }

    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!("{name} = {value} is outside [{min}, {max}], clamped to {clamped}");
    }
    clamped
}
