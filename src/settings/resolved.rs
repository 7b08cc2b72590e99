//! Resolved settings with provenance.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::merge::merge_layers;
use super::{ModelSettings, LOG_LEVELS};
use crate::patch::StructurePolicy;

/// Project settings file, looked up in the working directory.
pub const PROJECT_SETTINGS_FILE: &str = ".bndedit.toml";

/// `$HOME/.config/bndedit/settings.toml`, if `HOME` is set.
pub fn host_settings_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".config/bndedit/settings.toml"))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Builtin,
    Host,
    Project,
    Cli,
}

/// One contributing layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettingsSource {
    pub origin: SettingsOrigin,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl SettingsSource {
    fn inline(origin: SettingsOrigin) -> Self {
        Self {
            origin,
            path: None,
            digest: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Merged settings plus the layers they came from.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSettings {
    pub created_at: DateTime<Utc>,

    /// Merged settings table
    pub settings: Value,

    /// Contributing layers, lowest precedence first
    pub sources: Vec<SettingsSource>,

    #[serde(skip)]
    model: ModelSettings,
}

impl ResolvedSettings {
    /// Merge the built-in layer, the host and project files (when they
    /// exist) and command-line overrides.
    pub fn build(
        host_path: Option<&Path>,
        project_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, SettingsError> {
        let mut layers = vec![ModelSettings::builtin_layer()];
        let mut sources = vec![SettingsSource::inline(SettingsOrigin::Builtin)];

        for (origin, path) in [
            (SettingsOrigin::Host, host_path),
            (SettingsOrigin::Project, project_path),
        ] {
            let Some(path) = path.filter(|p| p.exists()) else {
                continue;
            };
            let (value, digest) = load_toml_file(path)?;
            layers.push(value);
            sources.push(SettingsSource {
                origin,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(SettingsSource::inline(SettingsOrigin::Cli));
        }

        let settings = merge_layers(layers);
        validate(&settings)?;
        let model = serde_json::from_value(settings.clone())
            .map_err(|e| SettingsError::ValidationError(e.to_string()))?;

        Ok(Self {
            created_at: Utc::now(),
            settings,
            sources,
            model,
        })
    }

    pub fn model(&self) -> &ModelSettings {
        &self.model
    }

    pub fn into_model(self) -> ModelSettings {
        self.model
    }

    /// Setting at a dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.settings, |value, part| value.get(part))
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn load_toml_file(path: &Path) -> Result<(Value, String), SettingsError> {
    let bytes = fs::read(path)
        .map_err(|e| SettingsError::IoError(format!("{}: {}", path.display(), e)))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let text = String::from_utf8(bytes)
        .map_err(|e| SettingsError::ParseError(format!("Invalid UTF-8: {}", e)))?;
    let table: toml::Table = toml::from_str(&text)
        .map_err(|e| SettingsError::ParseError(format!("{}: {}", path.display(), e)))?;
    let value = serde_json::to_value(table)
        .map_err(|e| SettingsError::ParseError(format!("{}: {}", path.display(), e)))?;

    Ok((value, digest))
}

fn validate(settings: &Value) -> Result<(), SettingsError> {
    if let Some(policy) = settings.pointer("/save/structure_policy") {
        let known = policy
            .as_str()
            .is_some_and(|name| StructurePolicy::NAMES.contains(&name));
        if !known {
            return Err(SettingsError::ValidationError(format!(
                "save.structure_policy must be one of {}",
                StructurePolicy::NAMES.join(", ")
            )));
        }
    }

    if let Some(level) = settings.pointer("/log/level") {
        let known = level.as_str().is_some_and(|name| LOG_LEVELS.contains(&name));
        if !known {
            return Err(SettingsError::ValidationError(format!(
                "log.level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }
    }

    Ok(())
}
