/// Magnitude limit of the acceleration and brake commands.
pub const MAX_PEDAL: f64 = 10.0;

/// Proportional gain from velocity error to pedal command.
pub const SPEED_GAIN: f64 = 1.0;

/// Below this speed (m/s) the vehicle cannot balance and steering assistance is locked.
pub const MIN_BALANCE_SPEED_MS: f64 = 1.0;

/// Magnitude limit of the damping term, in degrees.
pub const MAX_DAMPER_DEGREES: f64 = 20.0;
pub const DAMPER_ROLL_RATE_GAIN: f64 = 100.0;
pub const DAMPER_LEAN_GAIN: f64 = 1.3;

pub const MAX_VELOCITY_RANGE: (f64, f64) = (0.0, 200.0);
pub const TIME_SCALE_RANGE: (f64, f64) = (0.01, 10.0);
pub const UNIT_RANGE: (f64, f64) = (0.0, 1.0);

/// Offset applied to UI slider values so that a centered control reads 0.5.
pub const SLIDER_CENTER: f64 = 0.5;
