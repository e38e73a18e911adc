use crate::{
    constants::{MAX_PEDAL, SPEED_GAIN},
    vehicle::VehicleState,
};
use pid::Pid;

#[derive(Debug, Clone)]
pub struct SpeedControllerInit {
    /// Pedal per m/s of velocity error.
    pub gain: f64,
    pub max_pedal: f64,
}

impl Default for SpeedControllerInit {
    fn default() -> Self {
        Self {
            gain: SPEED_GAIN,
            max_pedal: MAX_PEDAL,
        }
    }
}

impl SpeedControllerInit {
    pub fn build(&self) -> SpeedController {
        let Self { gain, max_pedal } = *self;
        let max_pedal = max_pedal.abs();
        SpeedController {
            speed_pid: Pid::new(
                gain,
                0.0,
                0.0,
                f64::MAX,
                f64::MAX,
                f64::MAX,
                max_pedal,
                0.0,
            ),
            max_pedal,
        }
    }
}

/// Longitudinal control from target velocity to throttle or brake.
///
/// The law is proportional only, `clamp(gain * error, -max, max)`, so the
/// output depends only on the current target and body state.
#[derive(Debug)]
pub struct SpeedController {
    speed_pid: Pid<f64>,
    max_pedal: f64,
}

impl Default for SpeedController {
    fn default() -> Self {
        SpeedControllerInit::default().build()
    }
}

impl SpeedController {
    pub fn step(&mut self, target_velocity: f64, state: &VehicleState) -> SpeedControl {
        self.step_forward_speed(target_velocity, state.forward_speed())
    }

    pub fn step_forward_speed(&mut self, target_velocity: f64, forward_speed: f64) -> SpeedControl {
        let Self {
            ref mut speed_pid, ..
        } = *self;

        speed_pid.setpoint = target_velocity;
        let pedal = speed_pid.next_control_output(forward_speed).output;

        let (acceleration, brake) = if pedal > 0.0 {
            (pedal, 0.0)
        } else {
            (0.0, -pedal)
        };

        SpeedControl {
            target_velocity,
            forward_speed,
            pedal,
            acceleration,
            brake,
        }
    }

    pub fn max_pedal(&self) -> f64 {
        self.max_pedal
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedControl {
    pub target_velocity: f64,
    pub forward_speed: f64,
    /// Signed pedal: positive accelerates, negative brakes.
    pub pedal: f64,
    pub acceleration: f64,
    pub brake: f64,
}
