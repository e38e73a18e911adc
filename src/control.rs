use crate::{
    calibration::{compute_neutral_speed, CalibrationConfig},
    config::ControlConfig,
    constants::SLIDER_CENTER,
    error::{Error, Result},
    input::{FrameEvents, InputSample, InputSource, Mirror},
    speed_control::{SpeedControl, SpeedController, SpeedControllerInit},
    steer_control::{SteerCommand, SteerControl, SteerController, SteerMode},
    vehicle::{GeometrySolver, Vehicle, VehicleState},
};
use tracing::{debug, info, trace};

/// Telemetry refreshed once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Info {
    pub target_steer: f64,
    pub current_steer: f64,
    pub target_lean: f64,
    pub current_lean: f64,
    pub target_velocity: f64,
    pub current_velocity: f64,
}

/// Actuator commands issued during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlCommand {
    pub acceleration: f64,
    pub brake: f64,
    pub steer: SteerCommand,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub command: ControlCommand,
    pub speed: SpeedControl,
    pub steer: SteerControl,
}

/// Result of the per-frame input pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub events: FrameEvents,
    pub paused: bool,
    pub x_slider: f64,
    pub steer_slider: f64,
}

pub struct ControllerBuilder<V, I> {
    config: ControlConfig,
    calibration: CalibrationConfig,
    speed_controller: SpeedControllerInit,
    vehicle: Option<V>,
    input: Option<I>,
    x_slider: Option<Box<dyn Mirror>>,
    steer_slider: Option<Box<dyn Mirror>>,
}

impl<V, I> Default for ControllerBuilder<V, I> {
    fn default() -> Self {
        Self {
            config: ControlConfig::default(),
            calibration: CalibrationConfig::default(),
            speed_controller: SpeedControllerInit::default(),
            vehicle: None,
            input: None,
            x_slider: None,
            steer_slider: None,
        }
    }
}

impl<V, I> ControllerBuilder<V, I>
where
    V: Vehicle,
    I: InputSource,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ControlConfig) -> Self {
        self.config = config.clamped();
        self
    }

    pub fn calibration(mut self, calibration: CalibrationConfig) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn speed_controller(mut self, speed_controller: SpeedControllerInit) -> Self {
        self.speed_controller = speed_controller;
        self
    }

    pub fn vehicle(mut self, vehicle: V) -> Self {
        self.vehicle = Some(vehicle);
        self
    }

    pub fn input(mut self, input: I) -> Self {
        self.input = Some(input);
        self
    }

    pub fn x_slider(mut self, mirror: impl Mirror + 'static) -> Self {
        self.x_slider = Some(Box::new(mirror));
        self
    }

    pub fn steer_slider(mut self, mirror: impl Mirror + 'static) -> Self {
        self.steer_slider = Some(Box::new(mirror));
        self
    }

    /// Initializes the vehicle and runs the neutral speed search.
    pub fn build<G>(self, geometry: &G) -> Result<Controller<V, I>>
    where
        G: GeometrySolver + ?Sized,
    {
        let Self {
            config,
            calibration,
            speed_controller,
            vehicle,
            input,
            x_slider,
            steer_slider,
        } = self;

        let mut vehicle = vehicle.ok_or(Error::MissingCollaborator("vehicle"))?;
        let input = input.ok_or(Error::MissingCollaborator("input"))?;

        vehicle.init()?;
        let neutral_speed = compute_neutral_speed(geometry, &calibration)?;
        info!("neutral speed calibrated at {neutral_speed:.2} m/s");

        Ok(Controller {
            config,
            neutral_speed,
            info: Info::default(),
            paused: false,
            last_mode: None,
            last_input: InputSample::default(),
            speed_controller: speed_controller.build(),
            steer_controller: SteerController,
            vehicle,
            input,
            x_slider,
            steer_slider,
        })
    }
}

/// Runs the control laws against a vehicle.
///
/// [`Controller::tick`] belongs to the fixed physics step and
/// [`Controller::frame`] to the render loop. Both run on the same thread.
pub struct Controller<V, I> {
    config: ControlConfig,
    neutral_speed: f64,
    info: Info,
    paused: bool,
    last_mode: Option<SteerMode>,
    last_input: InputSample,
    speed_controller: SpeedController,
    steer_controller: SteerController,
    vehicle: V,
    input: I,
    x_slider: Option<Box<dyn Mirror>>,
    steer_slider: Option<Box<dyn Mirror>>,
}

impl<V, I> Controller<V, I>
where
    V: Vehicle,
    I: InputSource,
{
    pub fn builder() -> ControllerBuilder<V, I> {
        ControllerBuilder::new()
    }

    /// One fixed physics step. Returns `None` while paused.
    pub fn tick(&mut self) -> Option<TickReport> {
        if self.paused {
            return None;
        }

        let config = self.config;
        let Self {
            neutral_speed,
            ref mut speed_controller,
            ref steer_controller,
            ref mut vehicle,
            ref mut input,
            ..
        } = *self;

        vehicle.set_time_scale(config.time_scale);

        // Sources may build samples without going through the clamp
        let sample = input.sample().normalized();
        let state = vehicle.state();

        // Longitudinal
        let target_velocity = sample.y_axis * config.max_velocity;
        let speed = speed_controller.step(target_velocity, &state);
        vehicle.set_acceleration(speed.acceleration);
        vehicle.set_brake(speed.brake);

        // Lateral
        let steer = steer_controller.step(&config, &sample, &state, neutral_speed);
        match steer.command {
            SteerCommand::Target(angle) => vehicle.set_steer_angle_target(angle),
            SteerCommand::Direct(angle) => vehicle.set_steer_directly(angle),
            SteerCommand::LeanLaw(target) => vehicle.set_steer_by_lean_law(target),
        }

        if self.last_mode != Some(steer.mode) {
            debug!(
                "steer mode {:?} -> {:?} at {:.2} m/s",
                self.last_mode,
                steer.mode,
                state.speed()
            );
            self.last_mode = Some(steer.mode);
        }

        self.last_input = sample;
        self.info = telemetry(&self.vehicle.state(), &speed, &steer);

        let command = ControlCommand {
            acceleration: speed.acceleration,
            brake: speed.brake,
            steer: steer.command,
        };
        trace!(?command, info = ?self.info, "tick");

        Some(TickReport {
            command,
            speed,
            steer,
        })
    }

    /// Per-frame pass: pause and reset buttons, then UI mirrors.
    pub fn frame(&mut self) -> FrameReport {
        let events = self.input.frame_events();

        if events.pause_toggle {
            self.set_paused(!self.paused);
        }
        if events.reset_request {
            self.reset();
        }

        let state = self.vehicle.state();
        let x_slider = self.last_input.x_axis + SLIDER_CENTER;
        let steer_slider = state.steer_ratio() + SLIDER_CENTER;

        if let Some(mirror) = self.x_slider.as_mut() {
            mirror.set_value(x_slider);
        }
        if let Some(mirror) = self.steer_slider.as_mut() {
            mirror.set_value(steer_slider);
        }

        FrameReport {
            events,
            paused: self.paused,
            x_slider,
            steer_slider,
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            info!("simulation {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
        self.vehicle.set_paused(paused);
    }

    /// Returns the vehicle to its initial state and clears telemetry.
    pub fn reset(&mut self) {
        info!("resetting vehicle");
        self.vehicle.reset();
        self.info = Info::default();
        self.last_mode = None;
        self.last_input = InputSample::default();
    }

    /// Replaces the tunables. Takes effect at the next tick.
    pub fn set_config(&mut self, config: ControlConfig) {
        self.config = config.clamped();
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn info(&self) -> &Info {
        &self.info
    }

    pub fn neutral_speed(&self) -> f64 {
        self.neutral_speed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn vehicle(&self) -> &V {
        &self.vehicle
    }

    pub fn vehicle_mut(&mut self) -> &mut V {
        &mut self.vehicle
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }
}

fn telemetry(state: &VehicleState, speed: &SpeedControl, steer: &SteerControl) -> Info {
    let target_lean = match steer.mode {
        SteerMode::LeanLaw if state.max_steer_angle != 0.0 => {
            -steer.target_steer / state.max_steer_angle * state.max_lean_angle
        }
        _ => 0.0,
    };

    Info {
        target_steer: steer.target_steer,
        current_steer: state.current_steer_angle,
        target_lean,
        current_lean: state.current_lean,
        target_velocity: speed.target_velocity,
        current_velocity: state.speed(),
    }
}
