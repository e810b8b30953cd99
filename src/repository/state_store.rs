//! In-memory state store with optional JSON file persistence.
//!
//! When opened on a path, the whole state is rewritten to disk after every
//! mutation, and a mutation whose save fails is not applied. A missing file
//! is a first run; an unreadable document is
//! logged and replaced by defaults so a corrupt file never keeps the
//! monitor from starting.

use super::SecurityRepository;
use crate::error::{Result, SecurityError};
use crate::security::{AlarmStatus, ArmingStatus};
use crate::sensors::Sensor;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted security state.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SecurityState {
    #[serde(default)]
    pub arming_status: ArmingStatus,
    #[serde(default)]
    pub alarm_status: AlarmStatus,
    #[serde(default)]
    pub sensors: BTreeSet<Sensor>,
    /// When the document was last written.
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl SecurityState {
    /// Load the state document at `path`, falling back to an empty disarmed
    /// state when it is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No security state at {:?}, starting disarmed", path);
                return Self::default();
            }
            Err(e) => {
                error!("Cannot read security state {:?}: {}; starting disarmed", path, e);
                return Self::default();
            }
        };

        match serde_json::from_slice::<SecurityState>(&bytes) {
            Ok(state) => {
                info!(
                    "Restored {} / {} with {} sensor(s) from {:?}",
                    state.arming_status,
                    state.alarm_status,
                    state.sensors.len(),
                    path
                );
                state
            }
            Err(e) => {
                warn!(
                    "Discarding corrupt security state {:?} ({}); sensors must be re-registered",
                    path, e
                );
                Self::default()
            }
        }
    }

    /// Save to file, stamping `saved_at`
    pub fn save(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.saved_at = Some(Utc::now());
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        debug!("Saved security state to {:?}", path);
        Ok(())
    }
}

/// Reference [`SecurityRepository`] implementation.
pub struct StateStore {
    path: Option<PathBuf>,
    state: RwLock<SecurityState>,
}

impl StateStore {
    /// Volatile store; nothing touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(SecurityState::default()),
        }
    }

    /// Store backed by a JSON document at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = SecurityState::load(&path);
        Self {
            path: Some(path),
            state: RwLock::new(state),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SecurityState {
        self.state.read().clone()
    }

    /// Apply `f` to a copy of the state and commit it only once it is saved.
    fn mutate<T>(&self, f: impl FnOnce(&mut SecurityState) -> Result<T>) -> Result<T> {
        let mut state = self.state.write();
        let mut next = state.clone();
        let out = f(&mut next)?;
        if let Some(path) = &self.path {
            next.save(path).map_err(|e| {
                SecurityError::Repository(format!("saving {}: {}", path.display(), e))
            })?;
        }
        *state = next;
        Ok(out)
    }
}

impl SecurityRepository for StateStore {
    fn arming_status(&self) -> Result<ArmingStatus> {
        Ok(self.state.read().arming_status)
    }

    fn set_arming_status(&self, status: ArmingStatus) -> Result<()> {
        self.mutate(|state| {
            state.arming_status = status;
            Ok(())
        })
    }

    fn alarm_status(&self) -> Result<AlarmStatus> {
        Ok(self.state.read().alarm_status)
    }

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<()> {
        self.mutate(|state| {
            state.alarm_status = status;
            Ok(())
        })
    }

    fn add_sensor(&self, sensor: Sensor) -> Result<()> {
        self.mutate(|state| {
            state.sensors.replace(sensor);
            Ok(())
        })
    }

    fn remove_sensor(&self, sensor: &Sensor) -> Result<()> {
        self.mutate(|state| {
            state.sensors.remove(sensor);
            Ok(())
        })
    }

    fn update_sensor(&self, sensor: &Sensor) -> Result<()> {
        self.mutate(|state| {
            if !state.sensors.contains(sensor) {
                return Err(SecurityError::UnknownSensor {
                    name: sensor.name().to_string(),
                    sensor_type: sensor.sensor_type(),
                });
            }
            state.sensors.replace(sensor.clone());
            Ok(())
        })
    }

    fn sensors(&self) -> Result<Vec<Sensor>> {
        Ok(self.state.read().sensors.iter().cloned().collect())
    }
}
