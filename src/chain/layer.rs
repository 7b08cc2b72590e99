//! Parent configuration layers.

use std::fs;
use std::path::{Path, PathBuf};

use bndedit_properties::{decode_bytes, Properties};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::PropertySource;

/// Where a layer's properties came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LayerOrigin {
    Memory,
    File,
}

/// Provenance of a layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayerSource {
    pub name: String,
    pub origin: LayerOrigin,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A parent properties file (workspace `build.bnd`, an included file, ...).
#[derive(Debug, Clone)]
pub struct Layer {
    source: LayerSource,
    properties: Properties,
}

impl Layer {
    pub fn from_properties(name: impl Into<String>, properties: Properties) -> Self {
        Self {
            source: LayerSource {
                name: name.into(),
                origin: LayerOrigin::Memory,
                path: None,
                digest: None,
            },
            properties,
        }
    }

    pub fn parse(name: impl Into<String>, text: &str) -> Self {
        Self::from_properties(name, Properties::parse(text))
    }

    /// Load a properties file, recording its path and digest.
    pub fn load(path: &Path) -> Result<Self, LayerError> {
        let bytes = fs::read(path).map_err(|source| LayerError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        Ok(Self {
            source: LayerSource {
                name: display_name(path),
                origin: LayerOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            },
            properties: Properties::parse(&decode_bytes(&bytes)),
        })
    }

    pub fn source(&self) -> &LayerSource {
        &self.source
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.source.path.as_ref().map(PathBuf::from)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

impl PropertySource for Layer {
    fn name(&self) -> &str {
        &self.source.name
    }

    fn get(&self, key: &str) -> Option<String> {
        self.properties.get(key).map(str::to_string)
    }

    fn keys(&self) -> Vec<String> {
        self.properties.keys().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_layer() {
        let layer = Layer::parse("workspace", "-plugin.1.a: x\nfoo = bar\n");
        assert_eq!(layer.get("foo").as_deref(), Some("bar"));
        assert_eq!(layer.keys(), vec!["-plugin.1.a", "foo"]);
        assert_eq!(layer.source().origin, LayerOrigin::Memory);
    }

    #[test]
    fn test_load_records_digest() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "a: 1").unwrap();

        let layer = Layer::load(temp.path()).unwrap();
        assert_eq!(layer.get("a").as_deref(), Some("1"));
        assert_eq!(layer.source().origin, LayerOrigin::File);
        let digest = layer.source().digest.clone().unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Layer::load(Path::new("/nonexistent/build.bnd")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/build.bnd"));
    }
}
