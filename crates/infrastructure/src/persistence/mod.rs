//! File-backed persistence.

mod settings_loader;
mod token_file;

pub use settings_loader::{SettingsError, SettingsLoader};
pub use token_file::FileTokenStore;

use std::path::PathBuf;

/// Returns the portal config directory (e.g. `~/.config/portal`).
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("portal"))
}
