use crate::security::{ArmingStatus, IMAGE_CLEARS_ALARM};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Load environment variables from a .env file in the working directory.
/// Values may contain spaces and need not be quoted. Variables already set
/// in the environment win.
pub fn load_dotenv() {
    load_dotenv_from(Path::new(".env"));
}

fn load_dotenv_from(env_path: &Path) {
    let Ok(content) = fs::read_to_string(env_path) else {
        return;
    };

    for (key, value) in parse_dotenv(&content) {
        if std::env::var(key).is_err() {
            // SAFETY: called at startup before any other thread exists
            unsafe { std::env::set_var(key, value) };
        }
    }
}

fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let unquoted = ['"', '\'']
                .iter()
                .find_map(|q| value.strip_prefix(*q)?.strip_suffix(*q))
                .unwrap_or(value);
            (key.trim(), unquoted)
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub policy: PolicyConfig,
    pub classifier: ClassifierConfig,
    pub simulation: SimulationConfig,
    /// Arming status applied at startup; `None` keeps the persisted one.
    pub initial_arming: Option<ArmingStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON state file; `None` keeps state in memory only.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub image_clears_alarm: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub cat_probability: f64,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub tick_secs: u64,
    pub frame_every: u32,
}

/// Default location of the state file.
pub fn default_state_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("home-security-monitor").join("state.json"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                path: default_state_path(),
            },
            policy: PolicyConfig {
                image_clears_alarm: IMAGE_CLEARS_ALARM,
            },
            classifier: ClassifierConfig {
                cat_probability: 0.5,
                seed: None,
            },
            simulation: SimulationConfig {
                tick_secs: 5,
                frame_every: 3,
            },
            initial_arming: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from defaults overridden by `lookup`.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("SECURITY_STATE_FILE") {
            config.store.path = Some(PathBuf::from(path));
        }
        if let Some(v) = parsed(&lookup, "SECURITY_IMAGE_CLEARS_ALARM") {
            config.policy.image_clears_alarm = v;
        }
        if let Some(v) = parsed(&lookup, "SECURITY_ARMING_STATUS") {
            config.initial_arming = Some(v);
        }

        if let Some(v) = parsed::<f64>(&lookup, "CLASSIFIER_CAT_PROBABILITY") {
            if (0.0..=1.0).contains(&v) {
                config.classifier.cat_probability = v;
            } else {
                warn!("Ignoring CLASSIFIER_CAT_PROBABILITY={}: outside 0.0..=1.0", v);
            }
        }
        if let Some(v) = parsed(&lookup, "CLASSIFIER_SEED") {
            config.classifier.seed = Some(v);
        }

        if let Some(v) = parsed(&lookup, "SIMULATION_TICK_SECS") {
            config.simulation.tick_secs = v;
        }
        if let Some(v) = parsed(&lookup, "SIMULATION_FRAME_EVERY") {
            config.simulation.frame_every = v;
        }

        debug!("Resolved configuration: {:?}", config);
        config
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}
