//! Inheritance chain.
//!
//! A document inherits from parent configurations (the workspace
//! `build.bnd`, `cnf/ext/*.bnd`, ...). Each parent is a [`PropertySource`];
//! the chain lists them nearest first and answers lookups with the nearest
//! definition.

mod layer;
mod macros;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use bndedit_properties::Properties;

pub use layer::{Layer, LayerError, LayerOrigin, LayerSource};
pub use macros::{expand, has_macros, MAX_DEPTH};

/// A read-only key → logical value resolver.
pub trait PropertySource {
    /// Label used in diagnostics.
    fn name(&self) -> &str;

    /// Unexpanded value of `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Keys this source defines, in its own order.
    fn keys(&self) -> Vec<String>;
}

impl PropertySource for Properties {
    fn name(&self) -> &str {
        "document"
    }

    fn get(&self, key: &str) -> Option<String> {
        Properties::get(self, key).map(str::to_string)
    }

    fn keys(&self) -> Vec<String> {
        Properties::keys(self).map(str::to_string).collect()
    }
}

/// Parent sources, nearest first.
#[derive(Clone, Default)]
pub struct InheritanceChain {
    layers: Vec<Arc<dyn PropertySource + Send + Sync>>,
}

impl InheritanceChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source farther away than every source already in the chain.
    pub fn push<S>(&mut self, source: S)
    where
        S: PropertySource + Send + Sync + 'static,
    {
        self.layers.push(Arc::new(source));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with<S>(mut self, source: S) -> Self
    where
        S: PropertySource + Send + Sync + 'static,
    {
        self.push(source);
        self
    }

    pub fn push_shared(&mut self, source: Arc<dyn PropertySource + Send + Sync>) {
        self.layers.push(source);
    }

    pub fn layers(&self) -> impl Iterator<Item = &(dyn PropertySource + Send + Sync)> {
        self.layers.iter().map(|layer| layer.as_ref())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Nearest definition of `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }

    /// Every key defined anywhere in the chain, nearest layer's order first.
    pub fn keys(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for layer in &self.layers {
            for key in layer.keys() {
                if seen.insert(key.clone()) {
                    keys.push(key);
                }
            }
        }
        keys
    }
}

impl fmt::Debug for InheritanceChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.layers.iter().map(|layer| layer.name()))
            .finish()
    }
}
