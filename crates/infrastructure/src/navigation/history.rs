//! In-memory history stack.
//!
//! Mirrors what a browser's history API gives a single-page app: pushing a
//! path changes the location without a reload, and observers learn about
//! the change through a navigation event.

use parking_lot::Mutex;
use portal_application::ports::{NavigationError, Navigator};
use portal_domain::NavigationEvent;
use tokio::sync::broadcast;
use tracing::debug;

const EVENT_CAPACITY: usize = 64;

/// `Navigator` backed by an in-memory history stack.
#[derive(Debug)]
pub struct HistoryNavigator {
    entries: Mutex<Vec<String>>,
    events: broadcast::Sender<NavigationEvent>,
}

impl HistoryNavigator {
    /// Creates a history whose only entry is `initial`.
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Mutex::new(vec![initial.into()]),
            events,
        }
    }

    /// Subscribes to navigation events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.events.subscribe()
    }

    /// Pops the current entry, as the browser's back button would.
    ///
    /// Returns the new current path, or `None` if there is nothing to go
    /// back to.
    pub fn back(&self) -> Option<String> {
        let event = {
            let mut entries = self.entries.lock();
            if entries.len() < 2 {
                return None;
            }
            let from = entries.pop()?;
            let to = entries.last()?.clone();
            NavigationEvent {
                from,
                to,
                synthetic: false,
            }
        };
        let to = event.to.clone();
        self.broadcast(event);
        Some(to)
    }

    /// Returns every entry, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    fn broadcast(&self, event: NavigationEvent) {
        debug!(from = %event.from, to = %event.to, synthetic = event.synthetic, "navigation");
        // No receivers is fine.
        let _ = self.events.send(event);
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for HistoryNavigator {
    fn current_path(&self) -> String {
        self.entries.lock().last().cloned().unwrap_or_default()
    }

    fn navigate(&self, path: &str) -> Result<(), NavigationError> {
        if !path.starts_with('/') {
            return Err(NavigationError::InvalidPath(path.to_string()));
        }
        let from = {
            let mut entries = self.entries.lock();
            let from = entries.last().cloned().unwrap_or_default();
            entries.push(path.to_string());
            from
        };
        self.broadcast(NavigationEvent {
            from,
            to: path.to_string(),
            synthetic: true,
        });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn navigate_pushes_and_broadcasts_synthetic_event() {
        let history = HistoryNavigator::new("/admin/users");
        let mut events = history.subscribe();

        history.navigate("/admin/login").unwrap();

        assert_eq!(history.current_path(), "/admin/login");
        assert_eq!(
            events.try_recv().unwrap(),
            NavigationEvent {
                from: "/admin/users".to_string(),
                to: "/admin/login".to_string(),
                synthetic: true,
            }
        );
    }

    #[test]
    fn back_returns_to_previous_entry() {
        let history = HistoryNavigator::default();
        history.navigate("/projects").unwrap();

        assert_eq!(history.back().as_deref(), Some("/"));
        assert_eq!(history.back(), None);
        assert_eq!(history.entries(), vec!["/".to_string()]);
    }

    #[test]
    fn relative_paths_are_rejected() {
        let history = HistoryNavigator::default();
        assert_eq!(
            history.navigate("admin"),
            Err(NavigationError::InvalidPath("admin".to_string()))
        );
        assert_eq!(history.entries().len(), 1);
    }
}
