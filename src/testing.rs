//! Test doubles for the vehicle and input collaborators.

use crate::{
    error::{Error, Result},
    input::{FrameEvents, InputSample, InputSource, Mirror},
    vehicle::{Vehicle, VehicleState},
};
use nalgebra::Vector3;
use std::{cell::Cell, collections::VecDeque, rc::Rc};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recorded {
    Acceleration(f64),
    Brake(f64),
    SteerDirectly(f64),
    SteerTarget(f64),
    SteerByLeanLaw(f64),
    TimeScale(f64),
    Paused(bool),
}

/// Vehicle whose state only changes on reset. Every command is recorded.
#[derive(Debug, Clone, Default)]
pub struct MockVehicle {
    pub state: VehicleState,
    pub initial: VehicleState,
    pub recorded: Vec<Recorded>,
    pub init_calls: usize,
    pub reset_calls: usize,
    pub fail_init: bool,
}

impl MockVehicle {
    pub fn moving(speed: f64) -> Self {
        Self {
            state: VehicleState {
                body_velocity: Vector3::new(0.0, 0.0, speed),
                ..VehicleState::default()
            },
            ..Self::default()
        }
    }

    pub fn with_balance_steer(mut self, balance_steer: f64) -> Self {
        self.state.balance_steer = balance_steer;
        self
    }
}

impl Vehicle for MockVehicle {
    fn init(&mut self) -> Result<()> {
        self.init_calls += 1;
        if self.fail_init {
            return Err(Error::VehicleInit("mock refused to start".to_string()));
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.reset_calls += 1;
        self.state = self.initial.clone();
    }

    fn state(&self) -> VehicleState {
        self.state.clone()
    }

    fn set_acceleration(&mut self, value: f64) {
        self.recorded.push(Recorded::Acceleration(value));
    }

    fn set_brake(&mut self, value: f64) {
        self.recorded.push(Recorded::Brake(value));
    }

    fn set_steer_directly(&mut self, angle: f64) {
        self.recorded.push(Recorded::SteerDirectly(angle));
    }

    fn set_steer_angle_target(&mut self, angle: f64) {
        self.recorded.push(Recorded::SteerTarget(angle));
    }

    fn set_steer_by_lean_law(&mut self, target: f64) {
        self.recorded.push(Recorded::SteerByLeanLaw(target));
    }

    fn set_time_scale(&mut self, scale: f64) {
        self.recorded.push(Recorded::TimeScale(scale));
    }

    fn set_paused(&mut self, paused: bool) {
        self.recorded.push(Recorded::Paused(paused));
    }
}

/// Input that repeats one sample and plays back queued frame events.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    pub sample: InputSample,
    pub frames: VecDeque<FrameEvents>,
}

impl ScriptedInput {
    pub fn constant(sample: InputSample) -> Self {
        Self {
            sample,
            frames: VecDeque::new(),
        }
    }

    pub fn with_frames(mut self, frames: Vec<FrameEvents>) -> Self {
        self.frames = frames.into();
        self
    }
}

impl InputSource for ScriptedInput {
    fn sample(&mut self) -> InputSample {
        self.sample
    }

    fn frame_events(&mut self) -> FrameEvents {
        self.frames.pop_front().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SharedMirror(Rc<Cell<Option<f64>>>);

impl SharedMirror {
    pub fn value(&self) -> Option<f64> {
        self.0.get()
    }
}

impl Mirror for SharedMirror {
    fn set_value(&mut self, value: f64) {
        self.0.set(Some(value));
    }
}
