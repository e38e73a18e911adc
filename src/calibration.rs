use crate::{
    error::{Error, Result},
    vehicle::GeometrySolver,
};
use noisy_float::types::r64;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Sampling grid of the neutral speed search.
///
/// Speeds are `min_speed + i * speed_step` for `i` in `0..speed_samples`,
/// leans are `j * lean_step` for `j` in `0..lean_samples`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub min_speed: f64,
    pub speed_step: f64,
    pub speed_samples: usize,
    pub lean_step: f64,
    pub lean_samples: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            min_speed: 3.0,
            speed_step: 0.1,
            speed_samples: 30,
            lean_step: 1.0,
            lean_samples: 30,
        }
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> Result<()> {
        let Self {
            min_speed,
            speed_step,
            speed_samples,
            lean_step,
            lean_samples,
        } = *self;

        if !min_speed.is_finite() {
            return Err(Error::Calibration(format!(
                "min_speed must be finite, got {min_speed}"
            )));
        }
        if !(speed_step.is_finite() && speed_step > 0.0) {
            return Err(Error::Calibration(format!(
                "speed_step must be positive, got {speed_step}"
            )));
        }
        if !(lean_step.is_finite() && lean_step > 0.0) {
            return Err(Error::Calibration(format!(
                "lean_step must be positive, got {lean_step}"
            )));
        }
        if speed_samples == 0 || lean_samples == 0 {
            return Err(Error::Calibration("grid has no samples".to_string()));
        }
        Ok(())
    }

    pub fn speeds(&self) -> impl Iterator<Item = f64> {
        let Self {
            min_speed,
            speed_step,
            speed_samples,
            ..
        } = *self;
        (0..speed_samples).map(move |i| min_speed + i as f64 * speed_step)
    }

    pub fn leans(&self) -> impl Iterator<Item = f64> {
        let Self {
            lean_step,
            lean_samples,
            ..
        } = *self;
        (0..lean_samples).map(move |j| j as f64 * lean_step)
    }
}

/// Total disagreement between lean and the steer the geometry produces for
/// the mirrored lean, over the lean sweep.
pub fn steer_mismatch<G>(geometry: &G, calibration: &CalibrationConfig, speed: f64) -> f64
where
    G: GeometrySolver + ?Sized,
{
    calibration
        .leans()
        .map(|lean| (lean - geometry.steer_for_lean(-lean, speed)).abs())
        .sum()
}

/// Finds the sampled speed at which steer mirrors lean most closely.
///
/// Ties resolve to the smallest speed. Speeds whose mismatch is not finite
/// are skipped; if every speed is skipped, `min_speed` is returned.
pub fn compute_neutral_speed<G>(geometry: &G, calibration: &CalibrationConfig) -> Result<f64>
where
    G: GeometrySolver + ?Sized,
{
    calibration.validate()?;
    Ok(search_grid(geometry, calibration))
}

/// Runs the search over [`CalibrationConfig::default`].
pub fn compute_neutral_speed_default<G>(geometry: &G) -> f64
where
    G: GeometrySolver + ?Sized,
{
    search_grid(geometry, &CalibrationConfig::default())
}

fn search_grid<G>(geometry: &G, calibration: &CalibrationConfig) -> f64
where
    G: GeometrySolver + ?Sized,
{
    let best = calibration
        .speeds()
        .map(|speed| (speed, steer_mismatch(geometry, calibration, speed)))
        .filter(|&(_, mismatch)| mismatch.is_finite())
        .min_by_key(|&(_, mismatch)| r64(mismatch));

    match best {
        Some((speed, mismatch)) => {
            debug!("neutral speed {speed} with steer mismatch {mismatch}");
            speed
        }
        None => {
            warn!(
                "geometry produced no finite steer mismatch, falling back to {}",
                calibration.min_speed
            );
            calibration.min_speed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Steer equals lean exactly at 4.5 m/s and drifts linearly away from it.
    fn linear_geometry(lean: f64, speed: f64) -> f64 {
        -lean * (1.0 + (speed - 4.5).abs())
    }

    #[test]
    fn finds_speed_where_steer_mirrors_lean() {
        let speed = compute_neutral_speed(&linear_geometry, &CalibrationConfig::default()).unwrap();
        assert!((speed - 4.5).abs() < 1e-9, "got {speed}");
    }

    #[test]
    fn repeated_calls_agree() {
        let calibration = CalibrationConfig::default();
        let first = compute_neutral_speed(&linear_geometry, &calibration).unwrap();
        for _ in 0..5 {
            assert_eq!(
                compute_neutral_speed(&linear_geometry, &calibration).unwrap(),
                first
            );
        }
    }

    #[test]
    fn constant_mismatch_resolves_to_smallest_speed() {
        let geometry = |_lean: f64, _speed: f64| 7.0;
        let speed = compute_neutral_speed(&geometry, &CalibrationConfig::default()).unwrap();
        assert_eq!(speed, 3.0);
    }

    #[test]
    fn large_constant_mismatch_still_resolves_to_a_sample() {
        let geometry = |_lean: f64, _speed: f64| 1.0e6;
        assert_eq!(compute_neutral_speed_default(&geometry), 3.0);
    }

    #[test]
    fn non_finite_speeds_are_skipped() {
        let geometry = |lean: f64, speed: f64| {
            if speed < 4.0 {
                f64::NAN
            } else {
                -lean * speed
            }
        };
        let speed = compute_neutral_speed(&geometry, &CalibrationConfig::default()).unwrap();
        assert!((speed - 4.0).abs() < 1e-9, "got {speed}");
    }

    #[test]
    fn all_non_finite_falls_back_to_min_speed() {
        let geometry = |_lean: f64, _speed: f64| f64::INFINITY;
        assert_eq!(compute_neutral_speed_default(&geometry), 3.0);
    }

    #[test]
    fn default_grid_covers_three_to_six() {
        let calibration = CalibrationConfig::default();
        let speeds: Vec<f64> = calibration.speeds().collect();
        assert_eq!(speeds.len(), 30);
        assert_eq!(speeds[0], 3.0);
        assert!((speeds[29] - 5.9).abs() < 1e-9);
        assert_eq!(calibration.leans().last(), Some(29.0));
    }

    #[test]
    fn degenerate_grid_is_rejected() {
        let calibration = CalibrationConfig {
            speed_step: 0.0,
            ..CalibrationConfig::default()
        };
        assert!(matches!(
            compute_neutral_speed(&linear_geometry, &calibration),
            Err(Error::Calibration(_))
        ));

        let calibration = CalibrationConfig {
            lean_samples: 0,
            ..CalibrationConfig::default()
        };
        assert!(calibration.validate().is_err());
    }
}
