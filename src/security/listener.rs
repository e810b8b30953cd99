//! Status listeners and the registry that fans events out to them.
//!
//! Listeners are called synchronously on the caller's thread, in
//! registration order. A slow listener stalls the operation that triggered
//! it.

use super::status::AlarmStatus;
use crate::sensors::Sensor;
use log::info;
use parking_lot::RwLock;
use std::sync::Arc;

/// Receives status events from the security service.
pub trait StatusListener: Send + Sync {
    /// Called with the alarm status every time it is set.
    fn on_alarm_status_changed(&self, status: AlarmStatus);

    /// Called when a sensor's activation flag was written.
    fn on_sensor_activation_changed(&self, sensor: &Sensor, active: bool);

    /// Called with the verdict for every classified camera frame.
    fn on_cat_detected(&self, _detected: bool) {}
}

/// Registry of listeners, keyed by `Arc` identity.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<Vec<Arc<dyn StatusListener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns false if it was already registered.
    pub fn add(&self, listener: Arc<dyn StatusListener>) -> bool {
        let mut listeners = self.listeners.write();
        if listeners.iter().any(|l| same_listener(l, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove(&self, listener: &Arc<dyn StatusListener>) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| !same_listener(l, listener));
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    pub fn notify_alarm_status(&self, status: AlarmStatus) {
        for listener in self.snapshot() {
            listener.on_alarm_status_changed(status);
        }
    }

    pub fn notify_sensor_activation(&self, sensor: &Sensor, active: bool) {
        for listener in self.snapshot() {
            listener.on_sensor_activation_changed(sensor, active);
        }
    }

    pub fn notify_cat_detected(&self, detected: bool) {
        for listener in self.snapshot() {
            listener.on_cat_detected(detected);
        }
    }

    // The lock is released before any listener runs, so listeners may
    // add or remove registrations (their own included) while notified.
    fn snapshot(&self) -> Vec<Arc<dyn StatusListener>> {
        self.listeners.read().clone()
    }
}

fn same_listener(a: &Arc<dyn StatusListener>, b: &Arc<dyn StatusListener>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Listener that writes every event to the log.
#[derive(Debug, Default)]
pub struct LogListener;

impl StatusListener for LogListener {
    fn on_alarm_status_changed(&self, status: AlarmStatus) {
        info!("[Status] Alarm status: {}", status);
    }

    fn on_sensor_activation_changed(&self, sensor: &Sensor, active: bool) {
        info!(
            "[Status] Sensor {} ({}) {}",
            sensor.name(),
            sensor.sensor_type(),
            if active { "active" } else { "inactive" }
        );
    }

    fn on_cat_detected(&self, detected: bool) {
        if detected {
            info!("[Status] Cat detected on camera");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SensorType;
    use parking_lot::Mutex;
    use std::sync::Weak;

    #[derive(Default)]
    struct Counter {
        alarms: Mutex<Vec<AlarmStatus>>,
        sensors: Mutex<Vec<(String, bool)>>,
    }

    impl StatusListener for Counter {
        fn on_alarm_status_changed(&self, status: AlarmStatus) {
            self.alarms.lock().push(status);
        }

        fn on_sensor_activation_changed(&self, sensor: &Sensor, active: bool) {
            self.sensors.lock().push((sensor.name().to_string(), active));
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let registry = ListenerRegistry::new();
        let listener: Arc<dyn StatusListener> = Arc::new(Counter::default());

        assert!(registry.add(listener.clone()));
        assert!(!registry.add(listener.clone()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = ListenerRegistry::new();
        let listener: Arc<dyn StatusListener> = Arc::new(Counter::default());
        registry.add(listener.clone());

        assert!(registry.remove(&listener));
        assert!(!registry.remove(&listener));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_notifies_every_listener() {
        let registry = ListenerRegistry::new();
        let first = Arc::new(Counter::default());
        let second = Arc::new(Counter::default());
        registry.add(first.clone());
        registry.add(second.clone());

        registry.notify_alarm_status(AlarmStatus::PendingAlarm);
        registry.notify_sensor_activation(&Sensor::new("Back Door", SensorType::Door), true);

        for counter in [&first, &second] {
            assert_eq!(*counter.alarms.lock(), vec![AlarmStatus::PendingAlarm]);
            assert_eq!(
                *counter.sensors.lock(),
                vec![("Back Door".to_string(), true)]
            );
        }
    }

    /// Unregisters itself on the first alarm event.
    struct OneShot {
        registry: Weak<ListenerRegistry>,
        this: Mutex<Option<Arc<dyn StatusListener>>>,
        calls: Mutex<usize>,
    }

    impl StatusListener for OneShot {
        fn on_alarm_status_changed(&self, _status: AlarmStatus) {
            *self.calls.lock() += 1;
            if let (Some(registry), Some(this)) = (self.registry.upgrade(), self.this.lock().take())
            {
                registry.remove(&this);
            }
        }

        fn on_sensor_activation_changed(&self, _sensor: &Sensor, _active: bool) {}
    }

    #[test]
    fn test_listener_can_remove_itself_during_notification() {
        let registry = Arc::new(ListenerRegistry::new());
        let one_shot = Arc::new(OneShot {
            registry: Arc::downgrade(&registry),
            this: Mutex::new(None),
            calls: Mutex::new(0),
        });
        let as_listener: Arc<dyn StatusListener> = one_shot.clone();
        *one_shot.this.lock() = Some(as_listener.clone());
        let counter = Arc::new(Counter::default());

        registry.add(as_listener);
        registry.add(counter.clone());

        registry.notify_alarm_status(AlarmStatus::Alarm);
        registry.notify_alarm_status(AlarmStatus::NoAlarm);

        assert_eq!(*one_shot.calls.lock(), 1);
        assert_eq!(
            *counter.alarms.lock(),
            vec![AlarmStatus::Alarm, AlarmStatus::NoAlarm]
        );
        assert_eq!(registry.len(), 1);
    }
}
