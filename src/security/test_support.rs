//! Test doubles for the security service collaborators.

use super::listener::StatusListener;
use super::status::{AlarmStatus, ArmingStatus};
use crate::error::{Result, SecurityError};
use crate::input::camera::{ImageClassifier, Snapshot};
use crate::repository::{SecurityRepository, StateStore};
use crate::sensors::Sensor;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory repository that records every write made through the trait.
///
/// `seed_*` methods set up state without being recorded. `pin_alarm` makes
/// `alarm_status()` return a fixed value no matter what gets written, for
/// exercising a rule repeatedly from the same starting point.
/// `fail_alarm_writes` and `fail_sensor_updates` make the matching writes
/// return [`SecurityError::Repository`] without recording or storing anything.
pub struct RecordingRepository {
    inner: StateStore,
    pinned_alarm: Mutex<Option<AlarmStatus>>,
    alarm_writes: Mutex<Vec<AlarmStatus>>,
    sensor_updates: Mutex<usize>,
    alarm_writes_fail: AtomicBool,
    sensor_updates_fail: AtomicBool,
}

impl RecordingRepository {
    pub fn new() -> Self {
        Self {
            inner: StateStore::in_memory(),
            pinned_alarm: Mutex::new(None),
            alarm_writes: Mutex::new(Vec::new()),
            sensor_updates: Mutex::new(0),
            alarm_writes_fail: AtomicBool::new(false),
            sensor_updates_fail: AtomicBool::new(false),
        }
    }

    pub fn seed_arming(&self, status: ArmingStatus) {
        self.inner.set_arming_status(status).unwrap();
    }

    pub fn seed_alarm(&self, status: AlarmStatus) {
        self.inner.set_alarm_status(status).unwrap();
    }

    pub fn seed_sensor(&self, sensor: Sensor) {
        self.inner.add_sensor(sensor).unwrap();
    }

    pub fn pin_alarm(&self, status: AlarmStatus) {
        *self.pinned_alarm.lock() = Some(status);
    }

    pub fn fail_alarm_writes(&self) {
        self.alarm_writes_fail.store(true, Ordering::SeqCst);
    }

    pub fn fail_sensor_updates(&self) {
        self.sensor_updates_fail.store(true, Ordering::SeqCst);
    }

    pub fn alarm_writes(&self) -> Vec<AlarmStatus> {
        self.alarm_writes.lock().clone()
    }

    pub fn sensor_updates(&self) -> usize {
        *self.sensor_updates.lock()
    }
}

impl SecurityRepository for RecordingRepository {
    fn arming_status(&self) -> Result<ArmingStatus> {
        self.inner.arming_status()
    }

    fn set_arming_status(&self, status: ArmingStatus) -> Result<()> {
        self.inner.set_arming_status(status)
    }

    fn alarm_status(&self) -> Result<AlarmStatus> {
        match *self.pinned_alarm.lock() {
            Some(status) => Ok(status),
            None => self.inner.alarm_status(),
        }
    }

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<()> {
        if self.alarm_writes_fail.load(Ordering::SeqCst) {
            return Err(SecurityError::Repository("alarm status write refused".to_string()));
        }
        self.alarm_writes.lock().push(status);
        self.inner.set_alarm_status(status)
    }

    fn add_sensor(&self, sensor: Sensor) -> Result<()> {
        self.inner.add_sensor(sensor)
    }

    fn remove_sensor(&self, sensor: &Sensor) -> Result<()> {
        self.inner.remove_sensor(sensor)
    }

    fn update_sensor(&self, sensor: &Sensor) -> Result<()> {
        if self.sensor_updates_fail.load(Ordering::SeqCst) {
            return Err(SecurityError::Repository("sensor update refused".to_string()));
        }
        *self.sensor_updates.lock() += 1;
        self.inner.update_sensor(sensor)
    }

    fn sensors(&self) -> Result<Vec<Sensor>> {
        self.inner.sensors()
    }
}

/// Classifier with a settable verdict that records the thresholds it saw.
pub struct FixedClassifier {
    verdict: AtomicBool,
    thresholds: Mutex<Vec<f32>>,
}

impl FixedClassifier {
    pub fn new(verdict: bool) -> Self {
        Self {
            verdict: AtomicBool::new(verdict),
            thresholds: Mutex::new(Vec::new()),
        }
    }

    pub fn set_verdict(&self, verdict: bool) {
        self.verdict.store(verdict, Ordering::SeqCst);
    }

    pub fn thresholds(&self) -> Vec<f32> {
        self.thresholds.lock().clone()
    }
}

impl ImageClassifier for FixedClassifier {
    fn contains_cat(&self, _image: &Snapshot, confidence_threshold: f32) -> Result<bool> {
        self.thresholds.lock().push(confidence_threshold);
        Ok(self.verdict.load(Ordering::SeqCst))
    }
}

pub struct FailingClassifier;

impl ImageClassifier for FailingClassifier {
    fn contains_cat(&self, _image: &Snapshot, _confidence_threshold: f32) -> Result<bool> {
        Err(SecurityError::Classifier("model unavailable".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    Alarm(AlarmStatus),
    Sensor(String, bool),
    Cat(bool),
}

/// Listener that records every callback in order.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<ListenerEvent>>,
}

impl RecordingListener {
    pub fn events(&self) -> Vec<ListenerEvent> {
        self.events.lock().clone()
    }
}

impl StatusListener for RecordingListener {
    fn on_alarm_status_changed(&self, status: AlarmStatus) {
        self.events.lock().push(ListenerEvent::Alarm(status));
    }

    fn on_sensor_activation_changed(&self, sensor: &Sensor, active: bool) {
        self.events
            .lock()
            .push(ListenerEvent::Sensor(sensor.name().to_string(), active));
    }

    fn on_cat_detected(&self, detected: bool) {
        self.events.lock().push(ListenerEvent::Cat(detected));
    }
}
