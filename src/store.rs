//! Persisted widget data.
//!
//! The web layer saves check-in state here through the bridge, and the
//! widget surface reads it back on every redraw. One JSON file, camelCase
//! keys, platform config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

const DATA_FILE: &str = "widget-data.json";

/// The at-rest state the widget renders.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetData {
    /// Current check-in streak count.
    pub streak: u32,
    /// ISO timestamp of the last check-in, if any.
    pub last_check_in: Option<String>,
    pub has_checked_in_today: bool,
    /// Check-in window bounds in `HH:MM` form, when configured.
    pub check_in_window_start: Option<String>,
    pub check_in_window_end: Option<String>,
    pub is_on_vacation: bool,
}

/// File-backed store for [`WidgetData`].
///
/// The app shell saves data here after check-ins and on launch/resume; the
/// widget surface only ever reads.
pub struct WidgetDataStore {
    path: PathBuf,
}

impl WidgetDataStore {
    /// Store rooted at `dir`, writing `{dir}/widget-data.json`.
    pub fn new(dir: impl Into<PathBuf>) -> WidgetDataStore {
        WidgetDataStore {
            path: dir.into().join(DATA_FILE),
        }
    }

    /// Store at the platform config location:
    /// `{config_dir}/stillhere/widget-data.json`, falling back to
    /// `~/.stillhere/` when the platform dir is unavailable.
    pub fn at_default_location() -> WidgetDataStore {
        WidgetDataStore::new(data_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load widget data for display. Missing file returns defaults; a
    /// corrupt file returns defaults with a logged warning so the problem
    /// is visible instead of silently resetting state.
    pub fn load(&self) -> WidgetData {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return WidgetData::default();
            }
            Err(e) => {
                warn!("could not read {}: {e}", self.path.display());
                return WidgetData::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(data) => data,
            Err(e) => {
                warn!("corrupt widget data {}: {e}; using defaults", self.path.display());
                WidgetData::default()
            }
        }
    }

    /// Persist widget data, creating the parent directory on first write.
    pub fn save(&self, data: &WidgetData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Platform data directory for the app shell.
fn data_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("stillhere"))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".stillhere")
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
