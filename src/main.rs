use clap::Parser;
use home_security_monitor::config::{Config, load_dotenv};
use home_security_monitor::error::Result;
use home_security_monitor::input::FakeImageClassifier;
use home_security_monitor::input::simulation::{SimulationSettings, run_security_simulation};
use home_security_monitor::repository::StateStore;
use home_security_monitor::security::{AlarmPolicy, ArmingStatus, LogListener, SecurityService};
use home_security_monitor::sensors::{Sensor, SensorType};
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

/// Run the security monitor against simulated sensors and camera frames.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON file holding sensors and status
    #[arg(long, env = "SECURITY_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Keep state in memory only (overrides --state-file)
    #[arg(long)]
    in_memory: bool,

    /// Arming status to apply at startup (DISARMED, ARMED_HOME, ARMED_AWAY)
    #[arg(long)]
    arm: Option<ArmingStatus>,

    /// Seconds between simulation ticks
    #[arg(long)]
    tick_secs: Option<u64>,

    /// Seed for reproducible simulation and classifier runs
    #[arg(long)]
    seed: Option<u64>,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn default_sensors() -> Vec<Sensor> {
    vec![
        Sensor::new("Front Door", SensorType::Door),
        Sensor::new("Back Window", SensorType::Window),
        Sensor::new("Hallway Motion", SensorType::Motion),
    ]
}

fn build_service(config: &Config, store: Arc<StateStore>) -> Result<SecurityService> {
    let classifier = match config.classifier.seed {
        Some(seed) => FakeImageClassifier::with_seed(config.classifier.cat_probability, seed)?,
        None => FakeImageClassifier::new(config.classifier.cat_probability)?,
    };
    let policy = AlarmPolicy {
        image_clears_alarm: config.policy.image_clears_alarm,
    };
    Ok(SecurityService::with_policy(store, Arc::new(classifier), policy))
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_logger();
    info!("Starting home security monitor");

    let args = Args::parse();
    let mut config = Config::from_env();
    if args.in_memory {
        config.store.path = None;
    } else if let Some(path) = args.state_file {
        config.store.path = Some(path);
    }
    if let Some(arm) = args.arm {
        config.initial_arming = Some(arm);
    }
    if let Some(tick) = args.tick_secs {
        config.simulation.tick_secs = tick;
    }
    if let Some(seed) = args.seed {
        config.classifier.seed = Some(seed);
    }

    info!("Configuration loaded:");
    info!("  State file: {:?}", config.store.path);
    info!("  Image clears alarm: {}", config.policy.image_clears_alarm);
    info!("  Cat probability: {}", config.classifier.cat_probability);

    let store = Arc::new(match &config.store.path {
        Some(path) => StateStore::open(path),
        None => StateStore::in_memory(),
    });

    let service = match build_service(&config, store) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            error!("Failed to build security service: {}", e);
            std::process::exit(1);
        }
    };
    service.add_status_listener(Arc::new(LogListener));

    if let Err(e) = prepare(&service, config.initial_arming) {
        error!("Failed to prepare security state: {}", e);
        std::process::exit(1);
    }

    let settings = SimulationSettings {
        tick: Duration::from_secs(config.simulation.tick_secs.max(1)),
        frame_every: config.simulation.frame_every,
        seed: config.classifier.seed,
        ..Default::default()
    };
    let simulation = run_security_simulation(service.clone(), settings);

    info!("Home security monitor is running");
    info!("  - Press Ctrl+C to exit");

    match signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }

    simulation.abort();

    match (service.arming_status(), service.alarm_status()) {
        (Ok(arming), Ok(alarm)) => info!("Final state: {}, {}", arming, alarm),
        (Err(e), _) | (_, Err(e)) => error!("Failed to read final state: {}", e),
    }
    info!("Home security monitor stopped");
}

/// Register the default sensors on first run and apply the startup arming status.
fn prepare(service: &SecurityService, initial_arming: Option<ArmingStatus>) -> Result<()> {
    if service.sensors()?.is_empty() {
        info!("No sensors registered, adding defaults");
        for sensor in default_sensors() {
            service.add_sensor(sensor)?;
        }
    }

    let arming = match initial_arming {
        Some(arming) => arming,
        None => service.arming_status()?,
    };
    service.set_arming_status(arming)
}
