//! The edit model.
//!
//! An [`EditModel`] owns one properties document and answers typed reads
//! through three tiers: edits staged since the last save, the baseline
//! loaded from the document, and (for effective views) the inheritance
//! chain. Writes only stage text; [`EditModel::flush`] patches the staged
//! entries into the document one region at a time, and [`EditModel::save`]
//! also writes the document to storage.

mod accessors;
mod packages;
mod storage;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Read;
use std::path::Path;

use bndedit_properties::{
    decode_bytes, escape_non_ascii, escape_value, unescape_value, validate, Document, Properties,
    TextBuffer,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::bus::{ChangeBus, ChangeEvent, SubscriptionId, Topic};
use crate::chain::{expand, InheritanceChain, PropertySource};
use crate::error::ModelError;
use crate::merge::{self, MergeEntry, MergeGroup, MEMBER_CODEC};
use crate::patch::{
    append_entry, apply_patch, entry_text, remove_duplicates, PatchError, PatchOutcome,
    StructurePolicy,
};
use crate::registry::keys::KNOWN_PROPERTIES;
use crate::registry::{Registry, Value};
use crate::settings::ModelSettings;

pub use storage::{FileStorage, MemoryStorage, Storage};

/// What a save did to one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedEntry {
    pub key: String,
    pub outcome: PatchOutcome,
}

/// A structural problem met while saving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub key: String,
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub entries: Vec<SavedEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SaveReport {
    pub fn outcome(&self, key: &str) -> Option<PatchOutcome> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.outcome)
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Typed, format-preserving editor for one properties document.
pub struct EditModel {
    /// Logical values as last loaded or saved.
    baseline: Properties,
    /// Staged edits in document form; `None` removes the key.
    pending: BTreeMap<String, Option<String>>,
    cache: RefCell<HashMap<String, Value>>,
    document: Option<Box<dyn TextBuffer + Send>>,
    storage: Option<Box<dyn Storage>>,
    chain: InheritanceChain,
    settings: ModelSettings,
    effective: bool,
    bus: ChangeBus,
    last_changed_at: Option<DateTime<Utc>>,
}

impl Default for EditModel {
    fn default() -> Self {
        Self::new()
    }
}

impl EditModel {
    /// An empty model with no document.
    pub fn new() -> Self {
        Self {
            baseline: Properties::new(),
            pending: BTreeMap::new(),
            cache: RefCell::new(HashMap::new()),
            document: None,
            storage: None,
            chain: InheritanceChain::new(),
            settings: ModelSettings::default(),
            effective: false,
            bus: ChangeBus::new(),
            last_changed_at: None,
        }
    }

    /// A model editing `text` in an in-memory [`Document`].
    pub fn from_text(text: &str) -> Self {
        Self::with_document(Document::new(text))
    }

    /// A model editing `document`; the baseline is read from its text.
    pub fn with_document<B>(document: B) -> Self
    where
        B: TextBuffer + Send + 'static,
    {
        let baseline = Properties::parse(&document.text());
        Self {
            baseline,
            document: Some(Box::new(document)),
            ..Self::new()
        }
    }

    /// A model backed by `storage`, loaded immediately.
    pub fn open<S>(storage: S) -> Result<Self, ModelError>
    where
        S: Storage + 'static,
    {
        let mut model = Self::new();
        model.storage = Some(Box::new(storage));
        model.load()?;
        Ok(model)
    }

    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        Self::open(FileStorage::new(path.as_ref()))
    }

    pub fn with_chain(mut self, chain: InheritanceChain) -> Self {
        self.set_chain(chain);
        self
    }

    pub fn with_settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self.cache.get_mut().clear();
        self
    }

    pub fn set_chain(&mut self, chain: InheritanceChain) {
        self.chain = chain;
        self.cache.get_mut().clear();
    }

    pub fn chain(&self) -> &InheritanceChain {
        &self.chain
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// A read-only copy that resolves every read through the inheritance
    /// chain. Staged edits are carried over; subscriptions are not.
    pub fn effective(&self) -> EditModel {
        EditModel {
            baseline: self.baseline.clone(),
            pending: self.pending.clone(),
            chain: self.chain.clone(),
            settings: self.settings.clone(),
            effective: true,
            last_changed_at: self.last_changed_at,
            ..Self::new()
        }
    }

    pub fn is_effective(&self) -> bool {
        self.effective
    }

    pub fn document(&self) -> Option<&dyn TextBuffer> {
        self.document
            .as_deref()
            .map(|document| document as &dyn TextBuffer)
    }

    pub fn document_text(&self) -> Option<String> {
        self.document.as_ref().map(|document| document.text())
    }

    /// When the staged edits were last written into a document.
    pub fn last_changed_at(&self) -> Option<DateTime<Utc>> {
        self.last_changed_at
    }

    pub fn subscribe<F>(&mut self, topic: Topic, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChangeEvent) + Send + 'static,
    {
        self.bus.subscribe(topic, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Typed value of `key`. Never fails: text a codec cannot read yields
    /// the codec's fallback value.
    pub fn get(&self, key: &str) -> Value {
        if let Some(value) = self.cache.borrow().get(key) {
            return value.clone();
        }
        let value = Registry::global().convert(key, self.resolve_raw(key).as_deref());
        self.cache
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        value
    }

    /// Logical text behind `key`: the staged edit, else the inherited view
    /// (effective models), else the baseline.
    pub fn resolve_raw(&self, key: &str) -> Option<String> {
        if let Some(staged) = self.pending.get(key) {
            return staged.as_deref().map(unescape_value);
        }
        if self.effective {
            return self.inherited_raw(key);
        }
        self.baseline.get(key).map(str::to_string)
    }

    /// Untyped read of any key.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.resolve_raw(key)
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Staged edits in document form.
    pub fn document_changes(&self) -> &BTreeMap<String, Option<String>> {
        &self.pending
    }

    /// Keys of the document with staged edits applied.
    pub fn property_names(&self) -> Vec<String> {
        self.updated_properties()
            .keys()
            .map(str::to_string)
            .collect()
    }

    /// Stage `value` for `key`.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        self.ensure_writable()?;
        let value = value.into();
        let raw = Registry::global().format_value(key, &value)?;
        let old = self.get(key);

        self.stage(key, raw);
        self.cache
            .get_mut()
            .insert(key.to_string(), value.clone());
        self.bus.publish(&ChangeEvent::changed(key, old, value));
        Ok(())
    }

    /// Parse logical `text` with the key's codec and stage the result.
    pub fn set_text(&mut self, key: &str, text: &str) -> Result<(), ModelError> {
        let value = Registry::global().convert(key, Some(text));
        self.set(key, value)
    }

    /// Untyped write of any key; `None` removes it.
    pub fn set_string(&mut self, key: &str, text: Option<&str>) -> Result<(), ModelError> {
        self.ensure_writable()?;
        let old = self.get(key);
        self.stage(key, text.map(escape_value));
        self.cache.get_mut().remove(key);
        let new = self.get(key);
        self.bus.publish(&ChangeEvent::changed(key, old, new));
        Ok(())
    }

    /// Stage the removal of `key`.
    pub fn remove(&mut self, key: &str) -> Result<(), ModelError> {
        self.ensure_writable()?;
        let old = self.get(key);
        self.stage(key, None);
        self.cache.get_mut().remove(key);
        let new = self.get(key);
        self.bus.publish(&ChangeEvent::changed(key, old, new));
        Ok(())
    }

    /// Append `item` to a collection-valued key and return the resulting
    /// `key: value` entry text.
    pub fn add(&mut self, key: &str, item: &str) -> Result<String, ModelError> {
        self.ensure_writable()?;
        let codec = Registry::global().codec(key);
        if !codec.is_collection() {
            return Err(ModelError::NotACollection {
                key: key.to_string(),
            });
        }

        let mut value = self.get(key);
        if !value.extend_with(codec.convert(Some(item))) {
            return Err(ModelError::NotACollection {
                key: key.to_string(),
            });
        }
        let raw = codec.format(&value)?.unwrap_or_default();
        self.set(key, value)?;
        Ok(entry_text(key, &raw))
    }

    /// Canonical document form of `input` for `key`, without touching any
    /// model.
    pub fn format(key: &str, input: &str) -> Result<Option<String>, ModelError> {
        Ok(Registry::global().format(key, input)?)
    }

    /// Drop every staged edit.
    pub fn clear_dirty(&mut self) {
        let keys: Vec<String> = std::mem::take(&mut self.pending).into_keys().collect();
        let cache = self.cache.get_mut();
        for key in &keys {
            cache.remove(key);
        }
        for key in &keys {
            self.bus.publish(&ChangeEvent::reloaded(key));
        }
    }

    /// Replace the baseline with properties read from `reader`.
    pub fn reload<R: Read>(&mut self, reader: R) -> Result<(), ModelError> {
        let properties = Properties::load(reader)?;
        self.replace_baseline(properties);
        Ok(())
    }

    pub fn reload_str(&mut self, text: &str) {
        self.replace_baseline(Properties::parse(text));
    }

    /// Read storage into the document and the baseline.
    pub fn load(&mut self) -> Result<(), ModelError> {
        let storage = self.storage.as_ref().ok_or(ModelError::NoStorage)?;
        let text = decode_bytes(&storage.read()?);
        debug!(storage = %storage.describe(), chars = text.chars().count(), "loaded document");

        match self.document.as_mut() {
            Some(document) => {
                let len = document.len();
                document.replace(0, len, &text)?;
            }
            None => self.document = Some(Box::new(Document::new(&text))),
        }
        self.replace_baseline(Properties::parse(&text));
        Ok(())
    }

    /// Patch staged edits into the model's document.
    pub fn flush(&mut self) -> Result<SaveReport, ModelError> {
        self.ensure_writable()?;
        let policy = self.settings.save.structure_policy;
        let document = self.document.as_deref_mut().ok_or(ModelError::NoDocument)?;
        let report = write_pending(document, &mut self.pending, &mut self.baseline, policy)?;
        self.last_changed_at = Some(Utc::now());
        Ok(report)
    }

    /// Patch staged edits into an external buffer.
    pub fn flush_to<B>(&mut self, document: &mut B) -> Result<SaveReport, ModelError>
    where
        B: TextBuffer + ?Sized,
    {
        self.ensure_writable()?;
        let policy = self.settings.save.structure_policy;
        let report = write_pending(document, &mut self.pending, &mut self.baseline, policy)?;
        self.last_changed_at = Some(Utc::now());
        Ok(report)
    }

    /// Flush, then write the document to storage.
    pub fn save(&mut self) -> Result<SaveReport, ModelError> {
        self.ensure_writable()?;
        if self.storage.is_none() {
            return Err(ModelError::NoStorage);
        }
        let report = self.flush()?;

        let text = self.document_text().ok_or(ModelError::NoDocument)?;
        let text = if self.settings.save.ascii_escape {
            escape_non_ascii(&text)
        } else {
            text
        };
        let storage = self.storage.as_mut().ok_or(ModelError::NoStorage)?;
        storage.write(text.as_bytes())?;
        debug!(storage = %storage.describe(), entries = report.entries.len(), "saved document");
        Ok(report)
    }

    /// Flush, then return the document with non-ASCII characters escaped.
    pub fn to_ascii(&mut self) -> Result<String, ModelError> {
        self.flush()?;
        let text = self.document_text().ok_or(ModelError::NoDocument)?;
        Ok(escape_non_ascii(&text))
    }

    /// Members of the merge group of `stem`, subject document first.
    pub fn merge_group(&self, stem: &str) -> MergeGroup {
        let subject = self.updated_properties();
        merge::resolve(stem, &self.layers(&subject))
    }

    /// Write back the local members of `group` and remove `keys_to_remove`.
    ///
    /// Members that are currently inherited are left alone so that editing
    /// a group never copies parent definitions into the document.
    pub fn set_merge_group(
        &mut self,
        stem: &str,
        group: &MergeGroup,
        keys_to_remove: &[&str],
    ) -> Result<(), ModelError> {
        self.ensure_writable()?;
        let current = self.merge_group(stem);

        for entry in group.entries.values() {
            if !merge::in_group(stem, &entry.key) {
                continue;
            }
            let existing = current.get(&entry.key);
            if existing.is_some_and(|member| !member.local) {
                debug!(key = %entry.key, "inherited member left untouched");
                continue;
            }
            if entry.local {
                let raw = MEMBER_CODEC.format(&Value::Clauses(entry.clauses.clone()))?;
                self.stage_member(&entry.key, raw, entry.clauses.clone(), existing);
            } else if existing.is_some() {
                self.stage_member(&entry.key, None, Vec::new(), existing);
            }
        }

        for key in keys_to_remove {
            self.remove(key)?;
        }
        Ok(())
    }

    fn stage_member(
        &mut self,
        key: &str,
        raw: Option<String>,
        clauses: Vec<bndedit_header::Clause>,
        previous: Option<&MergeEntry>,
    ) {
        let old = Value::Clauses(previous.map(|member| member.clauses.clone()).unwrap_or_default());
        self.stage(key, raw);
        self.cache.get_mut().remove(key);
        self.bus
            .publish(&ChangeEvent::changed(key, old, Value::Clauses(clauses)));
    }

    fn stage(&mut self, key: &str, raw: Option<String>) {
        debug!(key, removal = raw.is_none(), "staged edit");
        self.pending.insert(key.to_string(), raw);
    }

    fn ensure_writable(&self) -> Result<(), ModelError> {
        if self.effective {
            Err(ModelError::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn replace_baseline(&mut self, properties: Properties) {
        self.pending.clear();
        self.cache.get_mut().clear();
        self.baseline = properties;
        for key in KNOWN_PROPERTIES {
            self.bus.publish(&ChangeEvent::reloaded(key));
        }
    }

    /// Baseline with staged edits applied.
    fn updated_properties(&self) -> Properties {
        let mut properties = self.baseline.clone();
        for (key, raw) in &self.pending {
            match raw {
                Some(raw) => properties.insert(key.clone(), unescape_value(raw)),
                None => {
                    properties.remove(key);
                }
            }
        }
        properties
    }

    fn layers<'a>(&'a self, subject: &'a Properties) -> Vec<&'a dyn PropertySource> {
        let mut layers = vec![subject as &dyn PropertySource];
        layers.extend(
            self.chain
                .layers()
                .map(|layer| layer as &dyn PropertySource),
        );
        layers
    }

    fn inherited_raw(&self, key: &str) -> Option<String> {
        let subject = self.updated_properties();
        let layers = self.layers(&subject);
        let lookup = |name: &str| layers.iter().find_map(|layer| layer.get(name));

        let raw = if Registry::global().is_merged(key) {
            merge::merged_value(key, &layers)
        } else {
            lookup(key)
        };
        let raw = match raw {
            Some(raw) if self.settings.effective.expand_macros => Some(expand(&raw, lookup)),
            other => other,
        };
        raw.filter(|value| !value.trim().is_empty())
    }
}

fn write_pending<B>(
    document: &mut B,
    pending: &mut BTreeMap<String, Option<String>>,
    baseline: &mut Properties,
    policy: StructurePolicy,
) -> Result<SaveReport, ModelError>
where
    B: TextBuffer + ?Sized,
{
    if policy == StructurePolicy::Abort {
        validate(&*document)?;
    }

    let mut report = SaveReport::default();
    let keys: Vec<String> = pending.keys().cloned().collect();
    for key in keys {
        let Some(raw) = pending.get(&key).cloned() else {
            continue;
        };

        let outcome = match apply_patch(&mut *document, &key, raw.as_deref()) {
            Ok(outcome) => outcome,
            Err(PatchError::Document(err)) => return Err(err.into()),
            Err(PatchError::Scan(err)) => {
                warn!(key = %key, line = err.line(), "cannot locate entry: {}", err);
                report.diagnostics.push(Diagnostic {
                    key: key.clone(),
                    line: err.line(),
                    message: err.to_string(),
                });
                match (policy, raw.as_deref()) {
                    (StructurePolicy::Skip, _) => {
                        report.entries.push(SavedEntry {
                            key,
                            outcome: PatchOutcome::Skipped,
                        });
                        continue;
                    }
                    (_, Some(raw)) => {
                        append_entry(&mut *document, &key, raw)?;
                        PatchOutcome::Appended
                    }
                    (_, None) => PatchOutcome::Unchanged,
                }
            }
        };
        debug!(key = %key, ?outcome, "patched entry");

        for duplicate in remove_duplicates(&mut *document, &key)? {
            warn!(key = %key, line = duplicate.line, "removed duplicate entry");
            report.diagnostics.push(Diagnostic {
                key: key.clone(),
                line: duplicate.line,
                message: format!("duplicate entry for '{}' removed", key),
            });
        }

        match raw {
            Some(raw) => baseline.insert(key.clone(), unescape_value(&raw)),
            None => {
                baseline.remove(&key);
            }
        }
        pending.remove(&key);
        report.entries.push(SavedEntry { key, outcome });
    }
    Ok(report)
}

impl fmt::Debug for EditModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditModel")
            .field("baseline", &self.baseline.len())
            .field("pending", &self.pending)
            .field("effective", &self.effective)
            .field("chain", &self.chain)
            .field("has_document", &self.document.is_some())
            .field("storage", &self.storage.as_ref().map(|s| s.describe()))
            .field("subscribers", &self.bus.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Layer;
    use crate::registry::keys::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_get_reads_baseline() {
        let model = EditModel::from_text("Bundle-Name: Demo\n-sources: true\n");
        assert_eq!(model.get(BUNDLE_NAME), Value::from("Demo"));
        assert_eq!(model.get(SOURCES), Value::Bool(true));
        assert_eq!(model.get(CLASSPATH), Value::List(Vec::new()));
        assert!(!model.is_dirty());
    }

    #[test]
    fn test_set_then_get_without_save() {
        let mut model = EditModel::from_text("a: 1\n");
        let paths = vec!["lib/a.jar".to_string(), "lib/b.jar".to_string()];
        model.set(CLASSPATH, paths.clone()).unwrap();

        assert!(model.is_dirty());
        assert_eq!(model.get(CLASSPATH), Value::List(paths));
        assert_eq!(
            model.document_changes().get(CLASSPATH).cloned().flatten().as_deref(),
            Some("lib/a.jar,\\\n\tlib/b.jar")
        );
        assert_eq!(model.document_text().as_deref(), Some("a: 1\n"));
    }

    #[test]
    fn test_pending_edit_is_reparsed_after_invalidation() {
        let mut model = EditModel::from_text("");
        model.set_string(BUNDLE_DESCRIPTION, Some("line one\nline two")).unwrap();
        assert_eq!(
            model.get(BUNDLE_DESCRIPTION),
            Value::from("line one\nline two")
        );
    }

    #[test]
    fn test_set_none_stages_removal() {
        let mut model = EditModel::from_text("Bundle-Name: Demo\nb: 2\n");
        model.set(BUNDLE_NAME, Value::None).unwrap();
        assert_eq!(model.document_changes().get(BUNDLE_NAME), Some(&None));

        model.flush().unwrap();
        assert_eq!(model.document_text().as_deref(), Some("b: 2\n"));
        assert_eq!(model.get_string(BUNDLE_NAME), None);
    }

    #[test]
    fn test_flush_patches_only_changed_entries() {
        let text = "# comment\nBundle-Name: Old\n\n-sub: *.bnd\n";
        let mut model = EditModel::from_text(text);
        model.set(BUNDLE_NAME, "New").unwrap();
        model.set(BUNDLE_VERSION, "1.2.3").unwrap();

        let report = model.flush().unwrap();
        assert_eq!(report.outcome(BUNDLE_NAME), Some(PatchOutcome::Replaced));
        assert_eq!(report.outcome(BUNDLE_VERSION), Some(PatchOutcome::Appended));
        assert_eq!(
            model.document_text().as_deref(),
            Some("# comment\nBundle-Name: New\n\n-sub: *.bnd\nBundle-Version: 1.2.3")
        );
        assert!(!model.is_dirty());
        assert!(model.last_changed_at().is_some());
    }

    #[test]
    fn test_effective_model_rejects_writes() {
        let model = EditModel::from_text("Bundle-Name: Demo\n");
        let mut view = model.effective();

        assert!(matches!(view.set(BUNDLE_NAME, "Other"), Err(ModelError::ReadOnly)));
        assert!(matches!(view.remove(BUNDLE_NAME), Err(ModelError::ReadOnly)));
        assert!(matches!(view.add(CLASSPATH, "x.jar"), Err(ModelError::ReadOnly)));
        assert!(!view.is_dirty());
        assert_eq!(view.get(BUNDLE_NAME), Value::from("Demo"));
    }

    #[test]
    fn test_effective_reads_inherit_and_expand() {
        let chain = InheritanceChain::new()
            .with(Layer::parse("workspace", "base.version: 2.1\nBundle-Vendor: ACME\n"));
        let model = EditModel::from_text("Bundle-Version: ${base.version}.0\n").with_chain(chain);

        assert_eq!(model.get(BUNDLE_VENDOR), Value::None);
        let view = model.effective();
        assert_eq!(view.get(BUNDLE_VENDOR), Value::from("ACME"));
        assert_eq!(view.get(BUNDLE_VERSION), Value::from("2.1.0"));
    }

    #[test]
    fn test_set_merge_group_ignores_keys_sharing_prefix() {
        use bndedit_header::Clause;

        let mut model = EditModel::from_text("-plugin.1.a: A\n-pluginpath: x.jar\n");
        let mut group = MergeGroup::new("-plugin");
        group.insert(MergeEntry::local("-plugin.1.a", vec![Clause::new("B")]));
        group.insert(MergeEntry::local("-pluginpath", vec![Clause::new("y.jar")]));
        model.set_merge_group("-plugin", &group, &[]).unwrap();

        let changes = model.document_changes();
        assert_eq!(changes.get("-plugin.1.a"), Some(&Some("B".to_string())));
        assert!(!changes.contains_key("-pluginpath"));
    }

    #[test]
    fn test_effective_merged_key_joins_members() {
        let chain =
            InheritanceChain::new().with(Layer::parse("workspace", "-buildpath.base: osgi.core\n"));
        let model = EditModel::from_text("-buildpath: junit\n").with_chain(chain);

        let names = |value: Value| -> Vec<String> {
            value
                .as_clauses()
                .unwrap_or_default()
                .iter()
                .map(|c| c.name.clone())
                .collect()
        };
        assert_eq!(names(model.get(BUILDPATH)), vec!["junit"]);
        assert_eq!(names(model.effective().get(BUILDPATH)), vec!["osgi.core", "junit"]);
    }

    #[test]
    fn test_effective_blank_value_is_absent() {
        let model = EditModel::from_text("Bundle-Name:   \n");
        assert_eq!(model.effective().get(BUNDLE_NAME), Value::None);
    }

    #[test]
    fn test_events_on_set_and_reload() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut model = EditModel::from_text("Bundle-Name: A\n");
        let sink = Arc::clone(&events);
        model.subscribe(Topic::key(BUNDLE_NAME), move |event| {
            sink.lock().unwrap().push(event.clone());
        });

        model.set(BUNDLE_NAME, "B").unwrap();
        model.set(BUNDLE_VENDOR, "ignored").unwrap();
        model.reload_str("Bundle-Name: C\n");

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ChangeEvent::changed(BUNDLE_NAME, "A".into(), "B".into()));
        assert!(events[1].is_reload());
    }

    #[test]
    fn test_reload_clears_pending_and_cache() {
        let mut model = EditModel::from_text("Bundle-Name: A\n");
        model.set(BUNDLE_NAME, "B").unwrap();
        model.reload("Bundle-Name: C\n".as_bytes()).unwrap();

        assert!(!model.is_dirty());
        assert_eq!(model.get(BUNDLE_NAME), Value::from("C"));
    }

    #[test]
    fn test_clear_dirty_reverts() {
        let mut model = EditModel::from_text("Bundle-Name: A\n");
        model.set(BUNDLE_NAME, "B").unwrap();
        model.clear_dirty();

        assert!(!model.is_dirty());
        assert_eq!(model.get(BUNDLE_NAME), Value::from("A"));
    }

    #[test]
    fn test_add_returns_entry_line() {
        let mut model = EditModel::from_text("-classpath: a.jar\n");
        let line = model.add(CLASSPATH, "b.jar").unwrap();
        assert_eq!(line, "-classpath: a.jar,\\\n\tb.jar");
        assert_eq!(
            model.get(CLASSPATH),
            Value::List(vec!["a.jar".to_string(), "b.jar".to_string()])
        );
    }

    #[test]
    fn test_add_rejects_scalar_keys() {
        let mut model = EditModel::from_text("");
        assert!(matches!(
            model.add(BUNDLE_NAME, "x"),
            Err(ModelError::NotACollection { .. })
        ));
    }

    #[test]
    fn test_structure_policies() {
        let text = "a: 1\njunk here\n";

        let mut model = EditModel::from_text(text);
        model.set_string("b", Some("2")).unwrap();
        let report = model.flush().unwrap();
        assert_eq!(report.outcome("b"), Some(PatchOutcome::Appended));
        assert_eq!(report.diagnostics[0].line, 2);
        assert_eq!(model.document_text().as_deref(), Some("a: 1\njunk here\nb: 2"));

        let mut settings = ModelSettings::default();
        settings.save.structure_policy = StructurePolicy::Skip;
        let mut model = EditModel::from_text(text).with_settings(settings.clone());
        model.set_string("b", Some("2")).unwrap();
        let report = model.flush().unwrap();
        assert_eq!(report.outcome("b"), Some(PatchOutcome::Skipped));
        assert!(model.is_dirty());
        assert_eq!(model.document_text().as_deref(), Some(text));

        settings.save.structure_policy = StructurePolicy::Abort;
        let mut model = EditModel::from_text(text).with_settings(settings);
        model.set_string("b", Some("2")).unwrap();
        assert!(matches!(model.flush(), Err(ModelError::MalformedDocument(_))));
        assert!(model.is_dirty());
    }

    #[test]
    fn test_save_writes_storage() {
        let storage = MemoryStorage::new("Bundle-Name: A\n");
        let mut model = EditModel::open(storage.clone()).unwrap();
        model.set(BUNDLE_NAME, "Zürich").unwrap();
        model.save().unwrap();
        assert_eq!(storage.contents_str(), "Bundle-Name: Zürich\n");

        let mut settings = ModelSettings::default();
        settings.save.ascii_escape = true;
        let mut model = EditModel::open(storage.clone()).unwrap().with_settings(settings);
        model.set(BUNDLE_VENDOR, "Ünited").unwrap();
        model.save().unwrap();
        assert_eq!(
            storage.contents_str(),
            "Bundle-Name: Z\\u00FCrich\nBundle-Vendor: \\u00DCnited"
        );
    }

    #[test]
    fn test_save_collapses_duplicate_keys() {
        let storage = MemoryStorage::new("Bundle-Name: one\n# keep\nBundle-Name: two\n");
        let mut model = EditModel::open(storage.clone()).unwrap();
        assert_eq!(model.get(BUNDLE_NAME), Value::from("two"));

        model.set(BUNDLE_NAME, "three").unwrap();
        let report = model.save().unwrap();
        assert_eq!(storage.contents_str(), "Bundle-Name: three\n# keep\n");
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].line, 3);

        let reopened = EditModel::open(storage).unwrap();
        assert_eq!(reopened.get(BUNDLE_NAME), Value::from("three"));
    }

    #[test]
    fn test_flush_cr_only_document() {
        let mut model = EditModel::from_text("a: 1\rb: 2\r");
        model.set_string("a", Some("3")).unwrap();
        model.flush().unwrap();
        assert_eq!(model.document_text().as_deref(), Some("a: 3\rb: 2\r"));
        assert_eq!(model.get_string("b").as_deref(), Some("2"));
    }

    #[test]
    fn test_save_without_storage() {
        let mut model = EditModel::from_text("");
        model.set(BUNDLE_NAME, "x").unwrap();
        assert!(matches!(model.save(), Err(ModelError::NoStorage)));
        assert!(model.is_dirty());
    }

    #[test]
    fn test_to_ascii() {
        let mut model = EditModel::from_text("");
        model.set(BUNDLE_VENDOR, "Ünited").unwrap();
        assert_eq!(model.to_ascii().unwrap(), "Bundle-Vendor: \\u00DCnited");
    }

    #[test]
    fn test_format_is_pure() {
        assert_eq!(
            EditModel::format(CLASSPATH, "a.jar , b.jar").unwrap().as_deref(),
            Some("a.jar,\\\n\tb.jar")
        );
        assert_eq!(EditModel::format(SOURCES, "false").unwrap(), None);
    }

    #[test]
    fn test_property_names_include_pending() {
        let mut model = EditModel::from_text("a: 1\nb: 2\n");
        model.remove("a").unwrap();
        model.set_string("c", Some("3")).unwrap();
        assert_eq!(model.property_names(), vec!["b", "c"]);
    }
}
