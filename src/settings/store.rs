//! Settings store
//! Exclusive owner of the on-disk settings document. Reads are forgiving
//! (a missing or damaged file is the normal first-run state); writes are
//! atomic so a reader never observes a half-written document.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use super::schema::Settings;
use super::SettingsError;
use crate::paths;

pub const SETTINGS_FILE: &str = "settings.json";

pub struct SettingsStore {
    root: PathBuf,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    /// Store rooted at the quill home directory.
    pub fn new() -> Self {
        Self::with_root(paths::quill_home())
    }

    /// Store rooted at a custom directory, used by tests.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    /// Load the document and report whether it is complete.
    ///
    /// A missing, unreadable, unparsable, or invalid file yields the default
    /// document with `complete = false`; the damaged content stays on disk
    /// until the next successful write replaces it.
    pub fn load(&self) -> (Settings, bool) {
        let path = self.path();

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return (Settings::default(), false);
            }
            Err(err) => {
                warn!(path = ?path, error = %err, "failed to read settings");
                return (Settings::default(), false);
            }
        };

        let settings: Settings = match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(path = ?path, error = %err, "failed to parse settings, treating as unconfigured");
                return (Settings::default(), false);
            }
        };

        if let Err(err) = settings.validate() {
            warn!(path = ?path, error = %err, "settings failed validation, treating as unconfigured");
            return (Settings::default(), false);
        }

        let complete = settings.is_complete();
        debug!(path = ?path, complete, "loaded settings");
        (settings, complete)
    }

    /// Persist the full document atomically, creating the root if needed.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        fs::create_dir_all(&self.root)?;

        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;

        debug!(path = ?path, "saved settings");
        Ok(())
    }

    /// Read one field by name.
    pub fn get(&self, field: &str) -> Result<String, SettingsError> {
        let (settings, _) = self.load();
        settings.get(field)
    }

    /// Coerce and persist one field. Nothing is written on coercion failure.
    pub fn set(&self, field: &str, raw: &str) -> Result<(), SettingsError> {
        let (mut settings, _) = self.load();
        settings.apply(field, raw)?;
        self.save(&settings)
    }

    /// Clear every field back to its default and persist.
    pub fn reset(&self) -> Result<(), SettingsError> {
        self.save(&Settings::default())
    }
}
