//! Shared domain models.

use serde::{Deserialize, Serialize};

/// Where a catalog entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameSource {
    /// Owned on Steam and imported through the Web API.
    Steam,
    /// Added by hand with a local executable path.
    Manual,
}

/// A single entry of the unified game catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Steam application id, or the locally assigned id for manual entries.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Executable path; only manual entries carry one.
    pub install_path: Option<String>,
    /// Total playtime in minutes.
    pub playtime_minutes: u32,
}

impl GameRecord {
    /// Source of the record, implied by the presence of an install path.
    pub fn source(&self) -> GameSource {
        match self.install_path {
            Some(_) => GameSource::Manual,
            None => GameSource::Steam,
        }
    }

    /// Playtime rendered as `"12h 05m"`, or `"never played"` when zero.
    pub fn playtime_label(&self) -> String {
        if self.playtime_minutes == 0 {
            return "never played".to_string();
        }
        let hours = self.playtime_minutes / 60;
        let minutes = self.playtime_minutes % 60;
        if hours == 0 {
            format!("{minutes}m")
        } else {
            format!("{hours}h {minutes:02}m")
        }
    }
}
