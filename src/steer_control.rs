use crate::{
    config::ControlConfig,
    constants::{DAMPER_LEAN_GAIN, DAMPER_ROLL_RATE_GAIN, MAX_DAMPER_DEGREES, MIN_BALANCE_SPEED_MS},
    input::InputSample,
    vehicle::VehicleState,
};

/// Steering command issued to the vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SteerCommand {
    /// Absolute steer angle the wheel turns toward.
    Target(f64),
    /// Absolute steer angle applied immediately.
    Direct(f64),
    /// Desired steer handed to the vehicle's balance law.
    LeanLaw(f64),
}

impl SteerCommand {
    pub fn angle(&self) -> f64 {
        match *self {
            Self::Target(angle) | Self::Direct(angle) | Self::LeanLaw(angle) => angle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SteerMode {
    /// Full-auto above the neutral speed.
    LeanLaw,
    /// Full-auto between the balance speed and the neutral speed.
    OpenLoop,
    /// Full-auto below the balance speed.
    Locked,
    /// Operator steer blended with balance steer and damping.
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteerControl {
    pub mode: SteerMode,
    pub command: SteerCommand,
    pub target_steer: f64,
    /// Components of the mixed law. Zero in full-auto modes.
    pub balance_steer: f64,
    pub damper: f64,
    pub mix: f64,
}

/// Lateral control. Holds no state between steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SteerController;

impl SteerController {
    pub fn step(
        &self,
        config: &ControlConfig,
        input: &InputSample,
        state: &VehicleState,
        neutral_speed: f64,
    ) -> SteerControl {
        let target_steer = input.x_axis * state.max_steer_angle;

        if config.full_auto {
            auto_steer(target_steer, state.speed(), neutral_speed)
        } else {
            mixed_steer(config, target_steer, state)
        }
    }
}

fn auto_steer(target_steer: f64, speed: f64, neutral_speed: f64) -> SteerControl {
    let (mode, command) = if speed > neutral_speed {
        (SteerMode::LeanLaw, SteerCommand::LeanLaw(target_steer))
    } else if speed < MIN_BALANCE_SPEED_MS {
        (SteerMode::Locked, SteerCommand::Target(0.0))
    } else {
        (SteerMode::OpenLoop, SteerCommand::Target(target_steer))
    };

    SteerControl {
        mode,
        command,
        target_steer,
        balance_steer: 0.0,
        damper: 0.0,
        mix: 0.0,
    }
}

fn mixed_steer(config: &ControlConfig, target_steer: f64, state: &VehicleState) -> SteerControl {
    let balance_steer = if state.speed() < MIN_BALANCE_SPEED_MS {
        0.0
    } else {
        state.balance_steer
    };
    let damper = damper(state) * config.damper_gain;
    let mix = lerp(target_steer, balance_steer, config.auto_balance_mix);

    SteerControl {
        mode: SteerMode::Mixed,
        command: SteerCommand::Direct(mix + damper),
        target_steer,
        balance_steer,
        damper,
        mix,
    }
}

/// Counter-steer against roll rate and lean, weaker at speed.
pub fn damper(state: &VehicleState) -> f64 {
    let speed_factor = 1.0 / (state.speed() + 1.0);
    let raw = -(state.roll_rate() * DAMPER_ROLL_RATE_GAIN + state.current_lean * DAMPER_LEAN_GAIN)
        * speed_factor;
    raw.clamp(-MAX_DAMPER_DEGREES, MAX_DAMPER_DEGREES)
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    from + (to - from) * t
}
