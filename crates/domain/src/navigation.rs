//! Client-side navigation rules.
//!
//! Decides where the user context goes when the session is invalidated,
//! which routes need a stored token, and which visits are reported to
//! analytics.

use serde::{Deserialize, Serialize};

use crate::settings::ClientSettings;

/// Path fragment that identifies the login page.
const LOGIN_FRAGMENT: &str = "/login";

/// Outcome of checking a route before entering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The route may be entered.
    Proceed,
    /// The route requires credentials; go here instead.
    Redirect(String),
}

/// A change of location observed by navigation subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEvent {
    /// Location before the change.
    pub from: String,
    /// Location after the change.
    pub to: String,
    /// True when the change was made programmatically rather than by the user.
    pub synthetic: bool,
}

/// Route rules for the admin area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRules {
    login_path: String,
    admin_prefix: String,
}

impl NavigationRules {
    /// Creates rules from an explicit login path and admin prefix.
    #[must_use]
    pub fn new(login_path: impl Into<String>, admin_prefix: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            admin_prefix: admin_prefix.into(),
        }
    }

    /// Creates rules from client settings.
    #[must_use]
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::new(settings.login_path.clone(), settings.admin_prefix.clone())
    }

    /// Returns the login page path.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Returns true for paths inside the admin area.
    #[must_use]
    pub fn is_admin_path(&self, path: &str) -> bool {
        path.starts_with(&self.admin_prefix)
    }

    /// Returns true for the login page (or anything under it).
    #[must_use]
    pub fn is_login_path(&self, path: &str) -> bool {
        path == self.login_path || path.contains(LOGIN_FRAGMENT)
    }

    /// Returns true when an expired session should send the user to login.
    #[must_use]
    pub fn should_redirect_to_login(&self, current: &str) -> bool {
        self.is_admin_path(current) && !self.is_login_path(current)
    }

    /// Checks whether `target` can be entered with or without a token.
    #[must_use]
    pub fn guard(&self, target: &str, has_token: bool) -> GuardDecision {
        if has_token || !self.should_redirect_to_login(target) {
            GuardDecision::Proceed
        } else {
            GuardDecision::Redirect(self.login_path.clone())
        }
    }

    /// Returns true if a visit to `path` should be reported to analytics.
    #[must_use]
    pub fn should_log_visit(&self, path: &str) -> bool {
        !self.is_admin_path(path)
    }
}

impl Default for NavigationRules {
    fn default() -> Self {
        Self::from_settings(&ClientSettings::default())
    }
}
