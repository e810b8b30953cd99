//! Durable storage for sensors, arming status and alarm status.
//!
//! The security service treats the repository as the single source of
//! truth: it keeps no copy of the sensor set and re-reads it before every
//! decision.

mod state_store;

pub use state_store::{SecurityState, StateStore};

use crate::error::Result;
use crate::security::{AlarmStatus, ArmingStatus};
use crate::sensors::Sensor;

/// Storage contract consumed by the security service.
///
/// Every call is synchronous and durable once it returns `Ok`.
pub trait SecurityRepository: Send + Sync {
    fn arming_status(&self) -> Result<ArmingStatus>;

    fn set_arming_status(&self, status: ArmingStatus) -> Result<()>;

    fn alarm_status(&self) -> Result<AlarmStatus>;

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<()>;

    /// Register a sensor. Re-adding an existing sensor replaces its stored state.
    fn add_sensor(&self, sensor: Sensor) -> Result<()>;

    /// Unregister a sensor. Removing an unknown sensor is not an error.
    fn remove_sensor(&self, sensor: &Sensor) -> Result<()>;

    /// Persist the activation flag of a registered sensor.
    ///
    /// Fails with [`SecurityError::UnknownSensor`](crate::error::SecurityError::UnknownSensor)
    /// if the sensor was never added.
    fn update_sensor(&self, sensor: &Sensor) -> Result<()>;

    /// All registered sensors, ordered by name then type.
    fn sensors(&self) -> Result<Vec<Sensor>>;
}
