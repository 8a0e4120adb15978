//! Display preferences.

use crate::client::storage::{LocalStorage, DARK_MODE_KEY};

/// Dark mode flag; on unless explicitly turned off.
pub struct Preferences {
    storage: LocalStorage,
    dark_mode: bool,
}

impl Preferences {
    pub fn load(storage: LocalStorage) -> Self {
        let dark_mode = match storage.get_item(DARK_MODE_KEY) {
            Ok(Some(raw)) => raw.trim() == "true",
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read dark mode preference");
                true
            }
        };
        Self { storage, dark_mode }
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Flip and persist; returns the new value.
    pub fn toggle_dark_mode(&mut self) -> std::io::Result<bool> {
        self.dark_mode = !self.dark_mode;
        self.storage
            .set_item(DARK_MODE_KEY, if self.dark_mode { "true" } else { "false" })?;
        Ok(self.dark_mode)
    }
}
