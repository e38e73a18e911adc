mod toy_bike;

use anyhow::Result;
use bike_balance::{ControlConfig, Controller, FrameEvents, InputSample, InputSource};
use clap::Parser;
use rand::{prelude::*, rngs::StdRng};
use std::path::PathBuf;
use toy_bike::{steady_turn_steer, ToyBike, MAX_LEAN_DEGREES};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Opts {
    /// JSON file with control tunables.
    #[clap(long)]
    pub config: Option<PathBuf>,
    #[clap(long, default_value = "1500")]
    pub ticks: usize,
    #[clap(long, default_value = "0.02")]
    pub dt: f64,
    /// Forward input in [-1, 1].
    #[clap(long, default_value = "0.6")]
    pub throttle: f64,
    /// Balance manually with assistance instead of fully automatically.
    #[clap(long)]
    pub mixed: bool,
    #[clap(long, default_value = "42")]
    pub seed: u64,
    /// Tick at which the reset button is pressed.
    #[clap(long)]
    pub reset_at: Option<usize>,
}

fn main() -> Result<()> {
    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Opts {
        config,
        ticks,
        dt,
        throttle,
        mixed,
        seed,
        reset_at,
    } = Opts::parse();

    let mut config = match config {
        Some(path) => ControlConfig::from_json_file(path)?,
        None => ControlConfig::default(),
    };
    if mixed {
        config.full_auto = false;
    }

    let input = DemoInput {
        rng: StdRng::seed_from_u64(seed),
        x_axis: 0.0,
        throttle,
        frame: 0,
        reset_at,
    };

    // Create the controller; this also calibrates the neutral speed.
    let mut controller = Controller::builder()
        .config(config)
        .vehicle(ToyBike::default())
        .input(input)
        .build(&steady_turn_steer)?;

    let mut fallen = false;
    for _ in 0..ticks {
        // The render loop and the physics step run at the same rate here.
        controller.frame();
        let scaled_dt = dt * controller.config().time_scale;

        if controller.tick().is_none() {
            continue;
        }
        controller.vehicle_mut().integrate(scaled_dt);

        let bike = controller.vehicle();
        let lean = bike.lean.to_degrees();
        if lean.abs() >= MAX_LEAN_DEGREES && !fallen {
            warn!("bike fell over at t={:.2}s (lean {lean:.2})", bike.time);
        }
        fallen = lean.abs() >= MAX_LEAN_DEGREES;

        if bike.steps % 50 == 0 {
            let info = controller.info();
            info!(
                "t={:6.2}s v={:5.2}/{:5.2} steer={:6.2}/{:6.2} lean={:6.2}",
                bike.time,
                info.current_velocity,
                info.target_velocity,
                info.current_steer,
                info.target_steer,
                info.current_lean,
            );
        }
    }

    Ok(())
}

struct DemoInput {
    rng: StdRng,
    x_axis: f64,
    throttle: f64,
    frame: usize,
    reset_at: Option<usize>,
}

impl InputSource for DemoInput {
    fn sample(&mut self) -> InputSample {
        // Wandering steering input
        self.x_axis = (self.x_axis + self.rng.gen_range(-0.05..0.05)).clamp(-0.5, 0.5);
        InputSample::new(self.x_axis, self.throttle)
    }

    fn frame_events(&mut self) -> FrameEvents {
        self.frame += 1;
        FrameEvents {
            pause_toggle: false,
            reset_request: self.reset_at == Some(self.frame),
        }
    }
}
