//! Built-in settings (layer 1).

use serde_json::{json, Value};

use super::{EffectiveSettings, LogSettings, ModelSettings, SaveSettings};
use crate::patch::StructurePolicy;

impl Default for SaveSettings {
    fn default() -> Self {
        Self {
            structure_policy: StructurePolicy::Append,
            ascii_escape: false,
        }
    }
}

impl Default for EffectiveSettings {
    fn default() -> Self {
        Self {
            expand_macros: true,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl ModelSettings {
    /// The built-in layer as a JSON object for merging.
    pub fn builtin_layer() -> Value {
        let defaults = Self::default();
        json!({
            "save": {
                "structure_policy": defaults.save.structure_policy,
                "ascii_escape": defaults.save.ascii_escape,
            },
            "effective": {
                "expand_macros": defaults.effective.expand_macros,
            },
            "log": {
                "level": defaults.log.level,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ModelSettings::default();
        assert_eq!(settings.save.structure_policy, StructurePolicy::Append);
        assert!(!settings.save.ascii_escape);
        assert!(settings.effective.expand_macros);
        assert_eq!(settings.log.level, "warn");
    }

    #[test]
    fn test_builtin_layer_matches_defaults() {
        let parsed: ModelSettings = serde_json::from_value(ModelSettings::builtin_layer()).unwrap();
        assert_eq!(parsed, ModelSettings::default());
    }
}
