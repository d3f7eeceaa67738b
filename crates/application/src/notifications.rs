//! In-memory toast queue.
//!
//! Holds the notifications a UI would render. Subscribed to the session's
//! error bus, it turns every [`ErrorEvent`] into an error toast.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use portal_domain::{ErrorEvent, Toast, ToastLevel};

use crate::events::ErrorListener;
use crate::ports::Clock;

/// Ordered queue of active toasts.
pub struct ToastQueue {
    toasts: Mutex<Vec<Toast>>,
    next_id: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl ToastQueue {
    /// Creates an empty queue.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            toasts: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            clock,
        }
    }

    /// Queues a toast and returns its id.
    ///
    /// `duration` defaults to the level's default.
    pub fn add(
        &self,
        message: impl Into<String>,
        level: ToastLevel,
        duration: Option<Duration>,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            message: message.into(),
            level,
            duration: duration.unwrap_or_else(|| level.default_duration()),
            created_at: self.clock.now(),
        };
        self.toasts.lock().push(toast);
        id
    }

    /// Queues a success toast.
    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.add(message, ToastLevel::Success, None)
    }

    /// Queues an error toast.
    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.add(message, ToastLevel::Error, None)
    }

    /// Queues a warning toast.
    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.add(message, ToastLevel::Warning, None)
    }

    /// Queues an info toast.
    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.add(message, ToastLevel::Info, None)
    }

    /// Removes a toast. Returns false if no toast had that id.
    pub fn remove(&self, id: u64) -> bool {
        let mut toasts = self.toasts.lock();
        let before = toasts.len();
        toasts.retain(|t| t.id != id);
        toasts.len() != before
    }

    /// Returns the queued toasts, oldest first.
    #[must_use]
    pub fn active(&self) -> Vec<Toast> {
        self.toasts.lock().clone()
    }

    /// Drops toasts whose visibility window has passed and returns how many
    /// were dropped.
    pub fn prune_expired(&self) -> usize {
        let now = self.clock.now();
        let mut toasts = self.toasts.lock();
        let before = toasts.len();
        toasts.retain(|t| !t.is_expired(now));
        before - toasts.len()
    }

    /// Returns the number of queued toasts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.toasts.lock().len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toasts.lock().is_empty()
    }
}

impl ErrorListener for ToastQueue {
    fn on_error(&self, event: &ErrorEvent) {
        self.error(event.message.clone());
    }
}

impl std::fmt::Debug for ToastQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastQueue")
            .field("toasts", &*self.toasts.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ErrorBus;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    /// Clock that only moves when told to.
    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn advance(&self, by: chrono::Duration) {
            let mut now = self.0.lock();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock()
        }
    }

    fn queue() -> (ToastQueue, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock(Mutex::new(Utc::now())));
        (ToastQueue::new(clock.clone()), clock)
    }

    #[test]
    fn ids_are_sequential_from_zero() {
        let (queue, _) = queue();
        assert_eq!(queue.info("a"), 0);
        assert_eq!(queue.success("b"), 1);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn levels_use_default_durations() {
        let (queue, _) = queue();
        queue.error("failed");
        queue.add("custom", ToastLevel::Warning, Some(Duration::from_secs(1)));

        let toasts = queue.active();
        assert_eq!(toasts[0].duration, Duration::from_secs(7));
        assert_eq!(toasts[1].duration, Duration::from_secs(1));
    }

    #[test]
    fn remove_by_id() {
        let (queue, _) = queue();
        let first = queue.info("a");
        queue.info("b");

        assert!(queue.remove(first));
        assert!(!queue.remove(first));
        assert_eq!(queue.active()[0].message, "b");
    }

    #[test]
    fn prune_drops_expired_toasts() {
        let (queue, clock) = queue();
        queue.success("saved");
        queue.error("failed");

        clock.advance(chrono::Duration::seconds(6));
        assert_eq!(queue.prune_expired(), 1);
        assert_eq!(queue.active()[0].level, ToastLevel::Error);

        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(queue.prune_expired(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn error_events_become_error_toasts() {
        let (queue, _) = queue();
        let queue = Arc::new(queue);
        let bus = ErrorBus::new();
        bus.subscribe(queue.clone());

        bus.publish(&ErrorEvent::api(404, "Article not found"));

        let toasts = queue.active();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].level, ToastLevel::Error);
        assert_eq!(toasts[0].message, "Article not found");
    }
}
