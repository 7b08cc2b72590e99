//! Layered model settings.
//!
//! Four layers, later layers winning:
//! 1. Built-in defaults
//! 2. Host settings (`~/.config/bndedit/settings.toml`)
//! 3. Project settings (`.bndedit.toml`)
//! 4. Command-line overrides

mod defaults;
mod merge;
mod resolved;

use serde::{Deserialize, Serialize};

use crate::patch::StructurePolicy;

pub use merge::{deep_merge, merge_layers, overlay_at};
pub use resolved::{
    host_settings_path, ResolvedSettings, SettingsError, SettingsOrigin, SettingsSource,
    PROJECT_SETTINGS_FILE,
};

/// Log levels accepted by `log.level`.
pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Settings that change how an edit model behaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub save: SaveSettings,
    pub effective: EffectiveSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveSettings {
    /// Reaction to a document the scanner cannot read.
    pub structure_policy: StructurePolicy,

    /// Write characters outside ASCII as `\uXXXX` escapes.
    pub ascii_escape: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectiveSettings {
    /// Expand `${name}` references in effective reads.
    pub expand_macros: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
}
