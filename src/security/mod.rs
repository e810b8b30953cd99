//! Alarm state machine.
//!
//! [`SecurityService`] is the decision engine: it consumes sensor events,
//! arming commands and camera frames, applies the escalation [`rules`] and
//! fans the outcome out to registered [`StatusListener`]s.

pub mod listener;
pub mod rules;
pub mod service;
pub mod status;

#[cfg(test)]
pub(crate) mod test_support;

pub use listener::{ListenerRegistry, LogListener, StatusListener};
pub use rules::{AlarmPolicy, IMAGE_CLEARS_ALARM};
pub use service::SecurityService;
pub use status::{AlarmStatus, ArmingStatus};
