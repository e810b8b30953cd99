mod sensors;

pub use sensors::{SimulationSettings, run_security_simulation, simulate_tick};
