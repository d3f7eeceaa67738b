//! Error broadcast.
//!
//! A minimal publish/subscribe channel for [`ErrorEvent`]s. Listeners are
//! called synchronously, in registration order, once per registration.
//!
//! Listener identity is the allocation behind the `Arc`: to unsubscribe,
//! pass a clone of the same `Arc` that was subscribed. One `unsubscribe`
//! call removes every registration of that listener, so a listener that was
//! subscribed twice stops receiving events after a single call.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use portal_domain::ErrorEvent;

/// Receives error events.
pub trait ErrorListener: Send + Sync {
    /// Called once per published event.
    fn on_error(&self, event: &ErrorEvent);
}

impl<F> ErrorListener for F
where
    F: Fn(&ErrorEvent) + Send + Sync,
{
    fn on_error(&self, event: &ErrorEvent) {
        self(event);
    }
}

/// Registry of error listeners.
#[derive(Default)]
pub struct ErrorBus {
    listeners: RwLock<Vec<Arc<dyn ErrorListener>>>,
}

impl ErrorBus {
    /// Creates a bus with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. Registering the same listener twice makes it
    /// receive every event twice.
    pub fn subscribe(&self, listener: Arc<dyn ErrorListener>) {
        self.listeners.write().push(listener);
    }

    /// Removes every registration of `listener` and returns how many were
    /// removed.
    pub fn unsubscribe(&self, listener: &Arc<dyn ErrorListener>) -> usize {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|registered| !same_listener(registered, listener));
        before - listeners.len()
    }

    /// Delivers `event` to the listeners registered when the call began and
    /// returns how many were called.
    ///
    /// No lock is held while listeners run, so they may subscribe or
    /// unsubscribe; a listener added during delivery does not see this event.
    pub fn publish(&self, event: &ErrorEvent) -> usize {
        let snapshot = self.listeners.read().clone();
        for listener in &snapshot {
            listener.on_error(event);
        }
        snapshot.len()
    }

    /// Returns the number of registrations.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

fn same_listener(a: &Arc<dyn ErrorListener>, b: &Arc<dyn ErrorListener>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl fmt::Debug for ErrorBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> Arc<dyn ErrorListener> {
        let log = Arc::clone(log);
        Arc::new(move |event: &ErrorEvent| log.lock().push(format!("{name}:{}", event.message)))
    }

    #[test]
    fn delivers_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = ErrorBus::new();
        bus.subscribe(recorder(&log, "a"));
        bus.subscribe(recorder(&log, "b"));

        let delivered = bus.publish(&ErrorEvent::network("offline"));

        assert_eq!(delivered, 2);
        assert_eq!(*log.lock(), vec!["a:offline", "b:offline"]);
    }

    #[test]
    fn duplicate_registration_is_called_twice() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = ErrorBus::new();
        let listener = recorder(&log, "a");
        bus.subscribe(Arc::clone(&listener));
        bus.subscribe(Arc::clone(&listener));

        bus.publish(&ErrorEvent::api(500, "boom"));

        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn unsubscribe_removes_every_registration() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = ErrorBus::new();
        let listener = recorder(&log, "a");
        let other = recorder(&log, "b");
        bus.subscribe(Arc::clone(&listener));
        bus.subscribe(Arc::clone(&other));
        bus.subscribe(Arc::clone(&listener));

        assert_eq!(bus.unsubscribe(&listener), 2);
        bus.publish(&ErrorEvent::api(500, "boom"));

        assert_eq!(*log.lock(), vec!["b:boom"]);
        assert_eq!(bus.unsubscribe(&listener), 0);
    }

    #[test]
    fn listener_added_during_delivery_misses_current_event() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = Arc::new(ErrorBus::new());
        let late = recorder(&log, "late");

        let subscribing: Arc<dyn ErrorListener> = {
            let bus = Arc::downgrade(&bus);
            let late = Arc::clone(&late);
            Arc::new(move |_: &ErrorEvent| {
                if let Some(bus) = bus.upgrade() {
                    bus.subscribe(Arc::clone(&late));
                }
            })
        };
        bus.subscribe(subscribing);

        bus.publish(&ErrorEvent::network("first"));
        assert!(log.lock().is_empty());

        bus.publish(&ErrorEvent::network("second"));
        assert_eq!(*log.lock(), vec!["late:second"]);
    }
}
