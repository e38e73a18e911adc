use crate::error::Result;
use nalgebra::{UnitQuaternion, Vector3};

/// Maps a lean angle and a speed to the steer angle the vehicle geometry
/// settles at. Must be side-effect free.
pub trait GeometrySolver {
    fn steer_for_lean(&self, lean_degrees: f64, speed: f64) -> f64;
}

impl<F> GeometrySolver for F
where
    F: Fn(f64, f64) -> f64,
{
    fn steer_for_lean(&self, lean_degrees: f64, speed: f64) -> f64 {
        self(lean_degrees, speed)
    }
}

/// The actuator side of the physics engine.
///
/// The controller only reads the vehicle through [`Vehicle::state`] and only
/// changes it through the `set_*` commands.
pub trait Vehicle {
    /// One-time setup before the first tick.
    fn init(&mut self) -> Result<()>;

    /// Restores the initial pose and zeroes all velocities.
    fn reset(&mut self);

    fn state(&self) -> VehicleState;

    fn set_acceleration(&mut self, value: f64);

    fn set_brake(&mut self, value: f64);

    /// Sets the steer angle immediately, in degrees.
    fn set_steer_directly(&mut self, angle: f64);

    /// Sets the steer angle the front wheel should turn toward, in degrees.
    fn set_steer_angle_target(&mut self, angle: f64);

    /// Hands steering to the vehicle's own balance law, which converts the
    /// desired steer angle into a lean-tracking correction.
    fn set_steer_by_lean_law(&mut self, target: f64);

    fn set_time_scale(&mut self, _scale: f64) {}

    fn set_paused(&mut self, _paused: bool) {}
}

/// Snapshot of the body state read once per tick.
///
/// Vectors are in world coordinates. The vehicle frame is `x` right, `y` up,
/// `z` forward.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    pub body_velocity: Vector3<f64>,
    pub body_angular_velocity: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    /// Roll angle from vertical, in degrees.
    pub current_lean: f64,
    pub current_steer_angle: f64,
    pub max_steer_angle: f64,
    pub max_lean_angle: f64,
    /// Steer angle currently recommended by the vehicle's balance law.
    pub balance_steer: f64,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            body_velocity: Vector3::zeros(),
            body_angular_velocity: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            current_lean: 0.0,
            current_steer_angle: 0.0,
            max_steer_angle: 30.0,
            max_lean_angle: 45.0,
            balance_steer: 0.0,
        }
    }
}

impl VehicleState {
    pub fn speed(&self) -> f64 {
        self.body_velocity.norm()
    }

    pub fn local_velocity(&self) -> Vector3<f64> {
        self.orientation.inverse_transform_vector(&self.body_velocity)
    }

    pub fn local_angular_velocity(&self) -> Vector3<f64> {
        self.orientation
            .inverse_transform_vector(&self.body_angular_velocity)
    }

    pub fn forward_speed(&self) -> f64 {
        self.local_velocity().z
    }

    /// Angular rate about the forward axis.
    pub fn roll_rate(&self) -> f64 {
        self.local_angular_velocity().z
    }

    pub fn steer_ratio(&self) -> f64 {
        if self.max_steer_angle == 0.0 {
            0.0
        } else {
            self.current_steer_angle / self.max_steer_angle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn forward_speed_follows_heading() {
        // Heading rotated 90 degrees about the up axis: world +x is now forward.
        let state = VehicleState {
            body_velocity: Vector3::new(4.0, 0.0, 0.0),
            orientation: UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2),
            ..VehicleState::default()
        };
        assert!((state.forward_speed() - 4.0).abs() < 1e-9);
        assert!((state.speed() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn roll_rate_is_local() {
        let state = VehicleState {
            body_angular_velocity: Vector3::new(0.0, 0.0, 0.2),
            ..VehicleState::default()
        };
        assert!((state.roll_rate() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn closures_are_geometry_solvers() {
        let geometry = |lean: f64, speed: f64| lean * speed;
        assert_eq!(geometry.steer_for_lean(2.0, 3.0), 6.0);
    }
}
