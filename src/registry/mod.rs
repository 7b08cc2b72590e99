//! Key registry.
//!
//! Every instruction name maps to exactly one [`Codec`]. The table is built
//! once per process and only read afterwards. Keys that are not registered
//! use [`Codec::Identity`]; suffixed members of a merged instruction
//! (`-buildpath.extra`) use the codec of their stem.

mod codec;
mod enums;
pub mod keys;
mod value;

use std::collections::HashMap;
use std::sync::OnceLock;

pub use codec::{
    ClauseStyle, Codec, CodecError, EmptyOutput, EMPTY_HEADER, LIST_SEPARATOR,
    NEWLINE_LINE_SEPARATOR,
};
pub use enums::{ResolveMode, UnknownResolveMode, EXECUTION_ENVIRONMENTS};
pub use value::Value;

use keys::*;

/// Registration of one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    pub codec: Codec,
    /// Whether the instruction is assembled from a merge group
    /// (`stem`, `stem.a`, `stem.b`, ...).
    pub merged: bool,
}

static IDENTITY: KeySpec = KeySpec {
    codec: Codec::Identity,
    merged: false,
};

static REGISTRY: OnceLock<Registry> = OnceLock::new();

const TEXT: Codec = Codec::Text { escape_newlines: true };
const TOKEN: Codec = Codec::Text { escape_newlines: false };
const LIST: Codec = Codec::List {
    separator: LIST_SEPARATOR,
    empty: EmptyOutput::Remove,
};
const CLAUSES: Codec = Codec::Clauses {
    separator: LIST_SEPARATOR,
    style: ClauseStyle::Compact,
    empty: EmptyOutput::Remove,
};

/// Text before the first `.` of a key.
pub fn stem(key: &str) -> &str {
    key.split_once('.').map_or(key, |(stem, _)| stem)
}

/// Immutable key → codec table.
#[derive(Debug)]
pub struct Registry {
    specs: HashMap<&'static str, KeySpec>,
}

impl Registry {
    /// The process-wide registry.
    pub fn global() -> &'static Registry {
        REGISTRY.get_or_init(Registry::builtin)
    }

    /// Registrations of the known bnd instructions.
    pub fn builtin() -> Self {
        let mut specs = HashMap::new();
        let mut add = |key: &'static str, codec: Codec, merged: bool| {
            specs.insert(key, KeySpec { codec, merged });
        };

        for key in [
            BUNDLE_LICENSE,
            BUNDLE_CATEGORY,
            BUNDLE_NAME,
            BUNDLE_DESCRIPTION,
            BUNDLE_COPYRIGHT,
            BUNDLE_UPDATELOCATION,
            BUNDLE_VENDOR,
            BUNDLE_CONTACTADDRESS,
            BUNDLE_DOCURL,
            RUNVM,
            RUNPROGRAMARGS,
        ] {
            add(key, TEXT, false);
        }
        for key in [
            BUNDLE_SYMBOLICNAME,
            BUNDLE_VERSION,
            BUNDLE_ACTIVATOR,
            OUTPUT,
            RUNFRAMEWORK,
            RUNFW,
        ] {
            add(key, TOKEN, false);
        }
        for key in [
            PRIVATE_PACKAGE,
            PRIVATEPACKAGE,
            INCLUDE_RESOURCE,
            INCLUDERESOURCE,
            CLASSPATH,
            DSANNOTATIONS,
            SUB,
            TESTCASES,
            PLUGINPATH,
            DISTRO,
        ] {
            add(key, LIST, false);
        }
        for key in [EXPORT_PACKAGE, IMPORT_PACKAGE, SERVICE_COMPONENT, BUNDLE_BLUEPRINT, RUNSYSTEMPACKAGES] {
            add(key, CLAUSES, false);
        }
        for key in [BUILDPATH, TESTPATH, RUNBUNDLES, RUNBUNDLES_DECORATOR] {
            add(key, CLAUSES, true);
        }

        add(SOURCES, Codec::Bool { default: false }, false);
        add(
            RUNREPOS,
            Codec::List {
                separator: LIST_SEPARATOR,
                empty: EmptyOutput::Text(EMPTY_HEADER),
            },
            false,
        );
        for key in [STANDALONE, IGNORE_STANDALONE] {
            add(
                key,
                Codec::Clauses {
                    separator: LIST_SEPARATOR,
                    style: ClauseStyle::Compact,
                    empty: EmptyOutput::Text(""),
                },
                false,
            );
        }
        add(
            PLUGIN,
            Codec::Clauses {
                separator: LIST_SEPARATOR,
                style: ClauseStyle::Expanded,
                empty: EmptyOutput::Remove,
            },
            true,
        );
        add(RUNPROPERTIES, Codec::Map { separator: LIST_SEPARATOR }, true);
        for key in [RUNREQUIRES, RUNBLACKLIST] {
            add(key, Codec::Requirements { separator: LIST_SEPARATOR }, true);
        }
        add(
            RUNEE,
            Codec::Enum {
                members: EXECUTION_ENVIRONMENTS,
                default: None,
            },
            false,
        );
        add(
            RESOLVE,
            Codec::Enum {
                members: ResolveMode::NAMES,
                default: Some("manual"),
            },
            false,
        );

        Self { specs }
    }

    /// Registration used for `key`: the exact key, else the stem of a merged
    /// instruction, else identity.
    pub fn spec(&self, key: &str) -> &KeySpec {
        if let Some(spec) = self.specs.get(key) {
            return spec;
        }
        match self.specs.get(stem(key)) {
            Some(spec) if spec.merged => spec,
            _ => &IDENTITY,
        }
    }

    pub fn codec(&self, key: &str) -> &Codec {
        &self.spec(key).codec
    }

    /// Whether `key` itself is registered.
    pub fn is_registered(&self, key: &str) -> bool {
        self.specs.contains_key(key)
    }

    /// Whether `key` names a merged instruction.
    pub fn is_merged(&self, key: &str) -> bool {
        self.specs.get(key).is_some_and(|spec| spec.merged)
    }

    pub fn convert(&self, key: &str, raw: Option<&str>) -> Value {
        self.codec(key).convert(raw)
    }

    pub fn format_value(&self, key: &str, value: &Value) -> Result<Option<String>, CodecError> {
        self.codec(key).format(value)
    }

    /// Canonicalize logical `input` for `key`: convert, then format.
    ///
    /// The result is document-form text, `None` when the value formats to
    /// removal (an empty list, a default boolean).
    pub fn format(&self, key: &str, input: &str) -> Result<Option<String>, CodecError> {
        let codec = self.codec(key);
        codec.format(&codec.convert(Some(input)))
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.specs.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}
