pub mod calibration;
pub mod config;
pub mod constants;
pub mod control;
pub mod error;
pub mod input;
pub mod speed_control;
pub mod steer_control;
pub mod vehicle;

#[cfg(test)]
mod testing;

pub use calibration::{compute_neutral_speed, compute_neutral_speed_default, CalibrationConfig};
pub use config::ControlConfig;
pub use control::{ControlCommand, Controller, ControllerBuilder, FrameReport, Info, TickReport};
pub use error::{Error, Result};
pub use input::{FrameEvents, InputSample, InputSource, Mirror};
pub use steer_control::{SteerCommand, SteerMode};
pub use vehicle::{GeometrySolver, Vehicle, VehicleState};
