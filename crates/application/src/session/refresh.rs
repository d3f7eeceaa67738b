//! Single-flight coordination of session invalidation.
//!
//! The in-progress flag and the queue of waiting requests live behind one
//! lock and are always changed together: the queue is only non-empty while
//! the flag is set.

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Token handed to queued requests when the invalidation finishes.
pub type Resolution = Option<String>;

/// What a request that observed a 401 should do next.
#[derive(Debug)]
pub enum Ticket {
    /// No invalidation was running; the caller now runs it.
    Lead,
    /// An invalidation is running; wait for its outcome.
    Wait(oneshot::Receiver<Resolution>),
}

#[derive(Debug, Default)]
struct RefreshState {
    refreshing: bool,
    pending: Vec<oneshot::Sender<Resolution>>,
}

/// Guards the invalidation sequence so at most one runs at a time.
#[derive(Debug, Default)]
pub struct RefreshGate {
    state: Mutex<RefreshState>,
}

impl RefreshGate {
    /// Either claims the invalidation or queues behind the running one.
    ///
    /// The flag is set before this returns, so any later caller queues.
    pub fn enter(&self) -> Ticket {
        let mut state = self.state.lock();
        if state.refreshing {
            let (sender, receiver) = oneshot::channel();
            state.pending.push(sender);
            Ticket::Wait(receiver)
        } else {
            state.refreshing = true;
            Ticket::Lead
        }
    }

    /// Claims the invalidation without queueing. Returns false if one is
    /// already running.
    pub fn try_begin(&self) -> bool {
        let mut state = self.state.lock();
        if state.refreshing {
            false
        } else {
            state.refreshing = true;
            true
        }
    }

    /// Ends the invalidation and resolves every queued request, oldest
    /// first, with `resolution`. Returns how many were resolved.
    ///
    /// Waiters that already gave up are skipped.
    pub fn release(&self, resolution: &Resolution) -> usize {
        let pending = {
            let mut state = self.state.lock();
            state.refreshing = false;
            std::mem::take(&mut state.pending)
        };

        pending
            .into_iter()
            .filter_map(|sender| sender.send(resolution.clone()).ok())
            .count()
    }

    /// Returns true while an invalidation is running.
    pub fn is_refreshing(&self) -> bool {
        self.state.lock().refreshing
    }

    /// Returns how many requests are queued.
    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }
}
