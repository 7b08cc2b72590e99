//! Enumerated instruction values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How `-resolve` runs the resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    #[default]
    Manual,
    Auto,
    BeforeLaunch,
    Batch,
    Cache,
}

impl ResolveMode {
    pub const NAMES: &'static [&'static str] = &["manual", "auto", "beforelaunch", "batch", "cache"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveMode::Manual => "manual",
            ResolveMode::Auto => "auto",
            ResolveMode::BeforeLaunch => "beforelaunch",
            ResolveMode::Batch => "batch",
            ResolveMode::Cache => "cache",
        }
    }
}

impl fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resolve mode '{0}'")]
pub struct UnknownResolveMode(pub String);

impl FromStr for ResolveMode {
    type Err = UnknownResolveMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(ResolveMode::Manual),
            "auto" => Ok(ResolveMode::Auto),
            "beforelaunch" => Ok(ResolveMode::BeforeLaunch),
            "batch" => Ok(ResolveMode::Batch),
            "cache" => Ok(ResolveMode::Cache),
            _ => Err(UnknownResolveMode(s.to_string())),
        }
    }
}

/// Execution environment names accepted by `-runee`.
pub const EXECUTION_ENVIRONMENTS: &[&str] = &[
    "OSGi/Minimum-1.0",
    "OSGi/Minimum-1.1",
    "OSGi/Minimum-1.2",
    "JRE-1.1",
    "J2SE-1.2",
    "J2SE-1.3",
    "J2SE-1.4",
    "J2SE-1.5",
    "JavaSE-1.6",
    "JavaSE-1.7",
    "JavaSE/compact1-1.8",
    "JavaSE/compact2-1.8",
    "JavaSE/compact3-1.8",
    "JavaSE-1.8",
    "JavaSE-9",
    "JavaSE-10",
    "JavaSE-11",
    "JavaSE-12",
    "JavaSE-13",
    "JavaSE-14",
    "JavaSE-15",
    "JavaSE-16",
    "JavaSE-17",
    "JavaSE-18",
    "JavaSE-19",
    "JavaSE-20",
    "JavaSE-21",
    "JavaSE-22",
    "JavaSE-23",
];
