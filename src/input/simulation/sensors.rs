//! Sensor and camera simulation for testing.
//!
//! Drives the security service with synthetic activity so the state machine
//! can be watched end to end without hardware.

use crate::input::camera::Snapshot;
use crate::security::SecurityService;
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};

/// Frame size fed to the classifier.
const FRAME_WIDTH: u32 = 64;
const FRAME_HEIGHT: u32 = 48;

/// Shortest tick the simulation runs at.
const MIN_TICK: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub tick: Duration,
    /// Classify a frame every `frame_every` ticks. Zero disables the camera.
    pub frame_every: u32,
    /// Chance per tick that the chosen sensor flips.
    pub toggle_probability: f64,
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(5),
            frame_every: 3,
            toggle_probability: 0.5,
            seed: None,
        }
    }
}

/// Run one simulation step: maybe flip a random sensor, maybe classify a frame.
///
/// Engine errors are logged and swallowed so the simulation keeps going.
pub fn simulate_tick(
    service: &SecurityService,
    rng: &mut impl Rng,
    tick: u64,
    settings: &SimulationSettings,
) {
    match service.sensors() {
        Ok(sensors) => {
            if let Some(sensor) = sensors.choose(rng)
                && rng.gen_bool(settings.toggle_probability)
            {
                let next = !sensor.is_active();
                info!(
                    "[Sim] {} -> {}",
                    sensor.name(),
                    if next { "open" } else { "closed" }
                );
                if let Err(e) = service.change_sensor_activation_status(sensor, next) {
                    error!("[Sim] Sensor update failed: {}", e);
                }
            }
        }
        Err(e) => error!("[Sim] Failed to read sensors: {}", e),
    }

    if settings.frame_every > 0 && tick % u64::from(settings.frame_every) == 0 {
        let result = Snapshot::noise(FRAME_WIDTH, FRAME_HEIGHT, rng)
            .and_then(|frame| service.process_image(&frame));
        if let Err(e) = result {
            error!("[Sim] Frame processing failed: {}", e);
        }
    }
}

/// Spawn a task that feeds simulated activity into the service.
///
/// A zero `tick` is raised to one millisecond.
///
/// # Returns
///
/// A `JoinHandle` that can be used to abort the simulation task.
pub fn run_security_simulation(
    service: Arc<SecurityService>,
    settings: SimulationSettings,
) -> JoinHandle<()> {
    let period = if settings.tick.is_zero() {
        warn!("[Sim] Zero tick requested, using {:?}", MIN_TICK);
        MIN_TICK
    } else {
        settings.tick
    };

    tokio::spawn(async move {
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut ticker = interval(period);
        let mut tick: u64 = 0;
        loop {
            ticker.tick().await;
            tick += 1;
            simulate_tick(&service, &mut rng, tick, &settings);
        }
    })
}
