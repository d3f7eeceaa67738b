//! Navigation port

/// Errors raised when the location cannot be changed.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum NavigationError {
    /// The target path is not a valid client-side location.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The navigation could not be delivered.
    #[error("navigation failed: {0}")]
    Failed(String),
}

/// Client-side location control.
///
/// `navigate` changes the location without reloading anything and emits a
/// synthetic navigation event for whatever observes history changes.
pub trait Navigator: Send + Sync {
    /// Returns the current path.
    fn current_path(&self) -> String;

    /// Pushes `path` onto the history and notifies observers.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is rejected.
    fn navigate(&self, path: &str) -> Result<(), NavigationError>;
}
