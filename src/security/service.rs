//! Alarm decision engine.
//!
//! Owns no durable state: arming status, alarm status and the sensor set all
//! live in the [`SecurityRepository`]. Each public operation takes the
//! engine lock, reads what it needs, applies the rules in
//! [`rules`](super::rules), writes the outcome and notifies listeners before
//! returning.
//!
//! There is no rollback. If a collaborator fails half way through an
//! operation, writes that already succeeded stay written and listeners that
//! were not yet called are skipped; the error is returned unchanged.

use super::listener::{ListenerRegistry, StatusListener};
use super::rules::{self, AlarmPolicy, SensorEvent};
use super::status::{AlarmStatus, ArmingStatus};
use crate::error::{Result, SecurityError};
use crate::input::camera::{CAT_CONFIDENCE_THRESHOLD, ImageClassifier, Snapshot};
use crate::repository::SecurityRepository;
use crate::sensors::Sensor;
use log::{debug, info};
use parking_lot::ReentrantMutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// The security service.
///
/// Safe to share across threads. Operations are serialized by a re-entrant
/// lock, so a listener may call back into the service from inside a
/// notification.
pub struct SecurityService {
    repository: Arc<dyn SecurityRepository>,
    classifier: Arc<dyn ImageClassifier>,
    listeners: ListenerRegistry,
    policy: AlarmPolicy,
    /// Verdict of the last classified frame.
    cat_detected: AtomicBool,
    op_lock: ReentrantMutex<()>,
}

impl SecurityService {
    pub fn new(
        repository: Arc<dyn SecurityRepository>,
        classifier: Arc<dyn ImageClassifier>,
    ) -> Self {
        Self::with_policy(repository, classifier, AlarmPolicy::default())
    }

    pub fn with_policy(
        repository: Arc<dyn SecurityRepository>,
        classifier: Arc<dyn ImageClassifier>,
        policy: AlarmPolicy,
    ) -> Self {
        Self {
            repository,
            classifier,
            listeners: ListenerRegistry::new(),
            policy,
            cat_detected: AtomicBool::new(false),
            op_lock: ReentrantMutex::new(()),
        }
    }

    /// Whether the last classified frame contained a cat.
    pub fn cat_detected(&self) -> bool {
        self.cat_detected.load(Ordering::SeqCst)
    }

    pub fn add_sensor(&self, sensor: Sensor) -> Result<()> {
        let _guard = self.op_lock.lock();
        debug!(
            "[Security] Adding sensor {} ({})",
            sensor.name(),
            sensor.sensor_type()
        );
        self.repository.add_sensor(sensor)
    }

    pub fn remove_sensor(&self, sensor: &Sensor) -> Result<()> {
        let _guard = self.op_lock.lock();
        debug!(
            "[Security] Removing sensor {} ({})",
            sensor.name(),
            sensor.sensor_type()
        );
        self.repository.remove_sensor(sensor)
    }

    pub fn sensors(&self) -> Result<Vec<Sensor>> {
        self.repository.sensors()
    }

    pub fn arming_status(&self) -> Result<ArmingStatus> {
        self.repository.arming_status()
    }

    pub fn alarm_status(&self) -> Result<AlarmStatus> {
        self.repository.alarm_status()
    }

    /// Write the alarm status and notify listeners, whether or not it changed.
    pub fn set_alarm_status(&self, status: AlarmStatus) -> Result<()> {
        let _guard = self.op_lock.lock();
        self.write_alarm_status(status)
    }

    /// Change the arming status.
    ///
    /// Disarming clears the alarm. Arming resets every active sensor to
    /// inactive without running the escalation rules, and arming home while
    /// the camera last saw a cat raises the alarm. Listeners always receive
    /// the resulting alarm status.
    pub fn set_arming_status(&self, status: ArmingStatus) -> Result<()> {
        let _guard = self.op_lock.lock();
        info!("[Security] Arming status -> {}", status);
        self.repository.set_arming_status(status)?;

        if status.is_armed() {
            self.reset_sensors()?;
        }

        match rules::on_arming_changed(status, self.cat_detected()) {
            Some(alarm) => self.write_alarm_status(alarm),
            None => {
                let current = self.repository.alarm_status()?;
                self.listeners.notify_alarm_status(current);
                Ok(())
            }
        }
    }

    /// Record a sensor activation change and run the escalation rules.
    ///
    /// Deactivating a sensor that is already inactive does nothing at all.
    /// Fails with [`SecurityError::UnknownSensor`] before touching any state
    /// if the sensor is not registered.
    pub fn change_sensor_activation_status(&self, sensor: &Sensor, active: bool) -> Result<()> {
        let _guard = self.op_lock.lock();

        let sensors = self.repository.sensors()?;
        let stored = sensors
            .iter()
            .find(|s| s.same_sensor(sensor))
            .ok_or_else(|| SecurityError::UnknownSensor {
                name: sensor.name().to_string(),
                sensor_type: sensor.sensor_type(),
            })?;

        if !active && !stored.is_active() {
            debug!(
                "[Security] Sensor {} already inactive, nothing to do",
                sensor.name()
            );
            return Ok(());
        }

        self.write_sensor_activation(stored, active)?;

        if !self.repository.arming_status()?.is_armed() {
            debug!("[Security] Disarmed, sensor change does not escalate");
            return Ok(());
        }

        let event = if active {
            SensorEvent::Activated
        } else {
            SensorEvent::Deactivated {
                others_active: sensors
                    .iter()
                    .any(|s| !s.same_sensor(sensor) && s.is_active()),
            }
        };

        let current = self.repository.alarm_status()?;
        match rules::on_sensor_event(current, event) {
            Some(next) => self.write_alarm_status(next),
            None => {
                debug!(
                    "[Security] Alarm stays {} after {:?} on {}",
                    current,
                    event,
                    sensor.name()
                );
                Ok(())
            }
        }
    }

    /// Classify a camera frame and react to the verdict.
    ///
    /// A cat while armed home raises the alarm. No cat while every sensor is
    /// inactive clears it. The status is written even if it does not change.
    pub fn process_image(&self, image: &Snapshot) -> Result<()> {
        let _guard = self.op_lock.lock();

        let cat = self
            .classifier
            .contains_cat(image, CAT_CONFIDENCE_THRESHOLD)?;
        self.cat_detected.store(cat, Ordering::SeqCst);
        self.listeners.notify_cat_detected(cat);

        let any_active = self.repository.sensors()?.iter().any(Sensor::is_active);
        let next = rules::on_classified_frame(
            self.repository.alarm_status()?,
            self.repository.arming_status()?,
            cat,
            any_active,
            self.policy,
        );

        match next {
            Some(status) => self.write_alarm_status(status),
            None => Ok(()),
        }
    }

    pub fn add_status_listener(&self, listener: Arc<dyn StatusListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_status_listener(&self, listener: &Arc<dyn StatusListener>) {
        self.listeners.remove(listener);
    }

    fn write_alarm_status(&self, status: AlarmStatus) -> Result<()> {
        info!("[Security] Alarm status -> {}", status);
        self.repository.set_alarm_status(status)?;
        self.listeners.notify_alarm_status(status);
        Ok(())
    }

    fn write_sensor_activation(&self, sensor: &Sensor, active: bool) -> Result<()> {
        let updated = sensor.clone().with_active(active);
        self.repository.update_sensor(&updated)?;
        info!(
            "[Security] Sensor {} ({}) -> {}",
            updated.name(),
            updated.sensor_type(),
            if active { "active" } else { "inactive" }
        );
        self.listeners.notify_sensor_activation(&updated, active);
        Ok(())
    }

    // Arming physically resets sensors; this must not escalate.
    fn reset_sensors(&self) -> Result<()> {
        for sensor in self.repository.sensors()? {
            if sensor.is_active() {
                self.write_sensor_activation(&sensor, false)?;
            }
        }
        Ok(())
    }
}
