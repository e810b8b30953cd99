//! Arming and alarm status values.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Operating mode of the system.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ArmingStatus {
    #[default]
    Disarmed,
    /// Armed while the premises are occupied. Camera escalation applies.
    ArmedHome,
    /// Armed while the premises are vacant.
    ArmedAway,
}

impl ArmingStatus {
    pub fn is_armed(self) -> bool {
        !matches!(self, ArmingStatus::Disarmed)
    }
}

/// Escalation level.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum AlarmStatus {
    #[default]
    NoAlarm,
    /// Something tripped; waiting for corroboration or for every sensor to clear.
    PendingAlarm,
    Alarm,
}
