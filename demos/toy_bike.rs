use bike_balance::{Vehicle, VehicleState};
use nalgebra::{UnitQuaternion, Vector3};
use std::f64::consts::PI;
use tracing::info;

pub const GRAVITY: f64 = 9.81;
pub const WHEELBASE: f64 = 2.0;
pub const COM_HEIGHT: f64 = 1.0;
pub const MAX_STEER_DEGREES: f64 = 30.0;
pub const MAX_LEAN_DEGREES: f64 = 45.0;
/// Deepest lean the steer actuator will ask for when tracking a turn.
pub const MAX_TARGET_LEAN_DEGREES: f64 = 30.0;
pub const DRAG: f64 = 0.05;

/// Steer angle at which a bike leaning at `lean_degrees` holds a steady turn.
pub fn steady_turn_steer(lean_degrees: f64, speed: f64) -> f64 {
    let speed_squared = speed.powi(2).max(1e-6);
    let lean = lean_degrees.to_radians();
    -(GRAVITY * WHEELBASE * lean.tan() / speed_squared)
        .atan()
        .to_degrees()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SteerMode {
    Direct,
    /// Steer angle target and lean-law requests both go through the
    /// actuator's balance loop, which leans into the requested turn.
    Balanced(f64),
}

/// Point-mass bike with a rigid inverted-pendulum roll axis.
#[derive(Debug, Clone)]
pub struct ToyBike {
    pub heading: f64,
    pub speed: f64,
    pub lean: f64,
    pub lean_rate: f64,
    pub steer: f64,
    pub acceleration: f64,
    pub brake: f64,
    pub time: f64,
    pub steps: usize,
    steer_mode: SteerMode,
}

impl Default for ToyBike {
    fn default() -> Self {
        Self {
            heading: 0.0,
            speed: 0.0,
            lean: 0.0,
            lean_rate: 0.0,
            steer: 0.0,
            acceleration: 0.0,
            brake: 0.0,
            time: 0.0,
            steps: 0,
            steer_mode: SteerMode::Direct,
        }
    }
}

impl ToyBike {
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.heading)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.lean)
    }

    /// Steer (radians) that drives the lean toward `target_lean`.
    fn lean_law(&self, target_lean: f64) -> f64 {
        let steady = steady_turn_steer(self.lean.to_degrees(), self.speed).to_radians();
        let steer = steady + 1.5 * (target_lean - self.lean) - 0.3 * self.lean_rate;
        let max = MAX_STEER_DEGREES.to_radians();
        steer.clamp(-max, max)
    }

    /// Lean (radians) of a steady turn at `target_steer` and the current speed.
    fn turn_lean(&self, target_steer: f64) -> f64 {
        let max = MAX_TARGET_LEAN_DEGREES.to_radians();
        let lean = -(self.speed.powi(2) * target_steer.tan() / (GRAVITY * WHEELBASE)).atan();
        lean.clamp(-max, max)
    }

    pub fn integrate(&mut self, dt: f64) {
        let max_steer = MAX_STEER_DEGREES.to_radians();
        let max_lean = MAX_LEAN_DEGREES.to_radians();

        self.steer = match self.steer_mode {
            SteerMode::Direct => self.steer,
            SteerMode::Balanced(target_steer) => self.lean_law(self.turn_lean(target_steer)),
        }
        .clamp(-max_steer, max_steer);

        let braking = self.brake * self.speed.signum();
        let next_speed = self.speed + (self.acceleration - braking - DRAG * self.speed) * dt;
        self.speed = if braking != 0.0 && next_speed.signum() != self.speed.signum() {
            0.0
        } else {
            next_speed
        };

        let lean_accel = (GRAVITY * self.lean.sin()
            + self.speed.powi(2) / WHEELBASE * self.steer.tan() * self.lean.cos())
            / COM_HEIGHT;
        self.lean_rate += lean_accel * dt;
        self.lean += self.lean_rate * dt;
        if self.lean.abs() > max_lean {
            // Fallen over: rest on the stand.
            self.lean = self.lean.clamp(-max_lean, max_lean);
            self.lean_rate = 0.0;
        }

        self.heading += self.speed * self.steer.tan() / WHEELBASE * dt;
        self.heading = self.heading.rem_euclid(2.0 * PI);
        self.time += dt;
        self.steps += 1;
    }
}

impl Vehicle for ToyBike {
    fn init(&mut self) -> bike_balance::Result<()> {
        info!("toy bike ready: wheelbase {WHEELBASE} m, max steer {MAX_STEER_DEGREES} deg");
        Ok(())
    }

    fn reset(&mut self) {
        let Self { time, steps, .. } = *self;
        *self = Self {
            time,
            steps,
            ..Self::default()
        };
    }

    fn state(&self) -> VehicleState {
        let orientation = self.orientation();
        let yaw_rate = self.speed * self.steer.tan() / WHEELBASE;

        VehicleState {
            body_velocity: orientation * Vector3::new(0.0, 0.0, self.speed),
            body_angular_velocity: orientation * Vector3::new(0.0, 0.0, self.lean_rate)
                + Vector3::new(0.0, yaw_rate, 0.0),
            orientation,
            current_lean: self.lean.to_degrees(),
            current_steer_angle: self.steer.to_degrees(),
            max_steer_angle: MAX_STEER_DEGREES,
            max_lean_angle: MAX_LEAN_DEGREES,
            balance_steer: self.lean_law(0.0).to_degrees(),
        }
    }

    fn set_acceleration(&mut self, value: f64) {
        self.acceleration = value;
    }

    fn set_brake(&mut self, value: f64) {
        self.brake = value;
    }

    fn set_steer_directly(&mut self, angle: f64) {
        self.steer_mode = SteerMode::Direct;
        self.steer = angle.to_radians();
    }

    fn set_steer_angle_target(&mut self, angle: f64) {
        self.steer_mode = SteerMode::Balanced(angle.to_radians());
    }

    fn set_steer_by_lean_law(&mut self, target: f64) {
        self.steer_mode = SteerMode::Balanced(target.to_radians());
    }
}
