//! bndedit - typed, format-preserving editing of bnd properties files
//!
//! An [`EditModel`] reads a bnd document into typed [`Value`]s, stages
//! edits, and writes them back by patching only the entries that changed.
//! Comments, blank lines, ordering and continuation layout of everything
//! else survive a save byte for byte.

pub mod bus;
pub mod chain;
pub mod error;
pub mod merge;
pub mod model;
pub mod patch;
pub mod registry;
pub mod settings;

pub use bndedit_header::{Clause, Requirement};
pub use bndedit_properties::{Document, Properties, TextBuffer};
pub use bus::{ChangeBus, ChangeEvent, SubscriptionId, Topic};
pub use chain::{InheritanceChain, Layer, PropertySource};
pub use error::ModelError;
pub use merge::{MergeEntry, MergeGroup};
pub use model::{EditModel, FileStorage, MemoryStorage, SaveReport, Storage};
pub use patch::{PatchOutcome, StructurePolicy};
pub use registry::{Registry, ResolveMode, Value};
pub use settings::{ModelSettings, ResolvedSettings, SettingsError};
