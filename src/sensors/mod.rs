//! Sensors tracked by the security monitor.
//!
//! A sensor is a named door, window or motion device with a single boolean
//! activation flag. Identity is the `(name, type)` pair: two values with the
//! same name and type are the same sensor regardless of their `active` flag,
//! so sets and maps keyed by [`Sensor`] always hold one entry per device.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use strum::{Display, EnumIter, EnumString};

/// Kind of physical sensor.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SensorType {
    Door,
    Window,
    Motion,
}

/// A registered door, window or motion sensor.
///
/// The `active` flag is state, not identity; see the module docs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    name: String,
    sensor_type: SensorType,
    #[serde(default)]
    active: bool,
}

impl Sensor {
    /// Create an inactive sensor.
    pub fn new(name: impl Into<String>, sensor_type: SensorType) -> Self {
        Self {
            name: name.into(),
            sensor_type,
            active: false,
        }
    }

    /// Builder-style override of the activation flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns true if `other` refers to the same physical sensor.
    pub fn same_sensor(&self, other: &Sensor) -> bool {
        self.name == other.name && self.sensor_type == other.sensor_type
    }
}

impl PartialEq for Sensor {
    fn eq(&self, other: &Self) -> bool {
        self.same_sensor(other)
    }
}

impl Eq for Sensor {}

impl Hash for Sensor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.sensor_type.hash(state);
    }
}

impl PartialOrd for Sensor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sensor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.sensor_type.cmp(&other.sensor_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::str::FromStr;

    #[test]
    fn test_new_sensor_is_inactive() {
        let sensor = Sensor::new("Front Door", SensorType::Door);
        assert!(!sensor.is_active());
        assert_eq!(sensor.name(), "Front Door");
        assert_eq!(sensor.sensor_type(), SensorType::Door);
    }

    #[test]
    fn test_identity_ignores_active_flag() {
        let inactive = Sensor::new("Front Door", SensorType::Door);
        let active = Sensor::new("Front Door", SensorType::Door).with_active(true);
        assert_eq!(inactive, active);

        let mut set = HashSet::new();
        set.insert(inactive);
        assert!(!set.insert(active));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_same_name_different_type_is_distinct() {
        let door = Sensor::new("Kitchen", SensorType::Door);
        let window = Sensor::new("Kitchen", SensorType::Window);
        assert_ne!(door, window);
        assert!(door < window);
    }

    #[test]
    fn test_sensor_type_parsing() {
        assert_eq!(SensorType::from_str("MOTION").unwrap(), SensorType::Motion);
        assert_eq!(SensorType::from_str("window").unwrap(), SensorType::Window);
        assert!(SensorType::from_str("garage").is_err());
        assert_eq!(SensorType::Door.to_string(), "DOOR");
    }

    #[test]
    fn test_serde_format() {
        let sensor = Sensor::new("Hallway", SensorType::Motion).with_active(true);
        let json = serde_json::to_value(&sensor).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Hallway", "sensor_type": "MOTION", "active": true})
        );

        let parsed: Sensor =
            serde_json::from_str(r#"{"name":"Hallway","sensor_type":"MOTION"}"#).unwrap();
        assert!(!parsed.is_active());
    }
}
