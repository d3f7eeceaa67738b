//! Transient user notifications

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
    /// Something needs attention.
    Warning,
    /// Informational.
    #[default]
    Info,
}

impl ToastLevel {
    /// How long a toast of this level stays visible by default.
    #[must_use]
    pub const fn default_duration(self) -> Duration {
        match self {
            Self::Success | Self::Info => Duration::from_millis(5000),
            Self::Error => Duration::from_millis(7000),
            Self::Warning => Duration::from_millis(6000),
        }
    }

    /// Returns the level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queued notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    /// Queue-assigned identifier.
    pub id: u64,
    /// Text shown to the user.
    pub message: String,
    /// Severity.
    pub level: ToastLevel,
    /// Visibility window.
    pub duration: Duration,
    /// When the toast was queued.
    pub created_at: DateTime<Utc>,
}

impl Toast {
    /// Returns true once the visibility window has passed.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        chrono::Duration::from_std(self.duration)
            .is_ok_and(|window| now - self.created_at >= window)
    }
}
