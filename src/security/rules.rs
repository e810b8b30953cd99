//! Alarm escalation rules.
//!
//! Pure functions over the current [`AlarmStatus`] and an incoming event.
//! The service reads whatever inputs a rule needs from the repository and
//! applies the returned status; nothing here touches state.
//!
//! ```text
//!             activate                  activate
//!  NoAlarm ─────────────► PendingAlarm ─────────────► Alarm
//!     ▲                        │                        │
//!     │  last active sensor    │                        │
//!     │  deactivated           │                        │
//!     └────────────────────────┘                        │
//!     ▲                                                 │
//!     └──── disarm / no-cat frame with all sensors clear┘
//! ```

use super::status::{AlarmStatus, ArmingStatus};

/// Policy constant for the camera escape hatch out of [`AlarmStatus::Alarm`].
///
/// When true, a frame without a cat while every sensor is inactive clears a
/// confirmed alarm. When false only disarming clears it.
pub const IMAGE_CLEARS_ALARM: bool = true;

/// Tunable escalation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmPolicy {
    pub image_clears_alarm: bool,
}

impl Default for AlarmPolicy {
    fn default() -> Self {
        Self {
            image_clears_alarm: IMAGE_CLEARS_ALARM,
        }
    }
}

/// A sensor activation change that reached the decision table.
///
/// Deactivating a sensor that is already inactive never gets this far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorEvent {
    Activated,
    Deactivated {
        /// Whether any other registered sensor is still active.
        others_active: bool,
    },
}

/// Decide the alarm status after a sensor event.
///
/// Returns `None` when the alarm status must not be written.
pub fn on_sensor_event(current: AlarmStatus, event: SensorEvent) -> Option<AlarmStatus> {
    match (current, event) {
        // Confirmed alarm is sticky against sensor chatter.
        (AlarmStatus::Alarm, _) => None,
        (AlarmStatus::NoAlarm, SensorEvent::Activated) => Some(AlarmStatus::PendingAlarm),
        (AlarmStatus::PendingAlarm, SensorEvent::Activated) => Some(AlarmStatus::Alarm),
        (
            AlarmStatus::PendingAlarm,
            SensorEvent::Deactivated {
                others_active: false,
            },
        ) => Some(AlarmStatus::NoAlarm),
        (
            AlarmStatus::PendingAlarm,
            SensorEvent::Deactivated {
                others_active: true,
            },
        ) => None,
        (AlarmStatus::NoAlarm, SensorEvent::Deactivated { .. }) => None,
    }
}

/// Decide the alarm status after a classified camera frame.
///
/// A returned status is written even if it equals `current`.
pub fn on_classified_frame(
    current: AlarmStatus,
    arming: ArmingStatus,
    cat_detected: bool,
    any_sensor_active: bool,
    policy: AlarmPolicy,
) -> Option<AlarmStatus> {
    if cat_detected {
        return match arming {
            ArmingStatus::ArmedHome => Some(AlarmStatus::Alarm),
            ArmingStatus::ArmedAway | ArmingStatus::Disarmed => None,
        };
    }

    if any_sensor_active {
        return None;
    }

    match current {
        AlarmStatus::Alarm if !policy.image_clears_alarm => None,
        AlarmStatus::Alarm | AlarmStatus::PendingAlarm | AlarmStatus::NoAlarm => {
            Some(AlarmStatus::NoAlarm)
        }
    }
}

/// Decide the alarm status right after the arming status was written.
///
/// `None` means the current status stands; the caller still announces it.
pub fn on_arming_changed(arming: ArmingStatus, cat_detected: bool) -> Option<AlarmStatus> {
    match arming {
        ArmingStatus::Disarmed => Some(AlarmStatus::NoAlarm),
        ArmingStatus::ArmedHome if cat_detected => Some(AlarmStatus::Alarm),
        ArmingStatus::ArmedHome | ArmingStatus::ArmedAway => None,
    }
}
