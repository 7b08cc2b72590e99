//! Package lists and resources.
//!
//! Private packages and included resources can each be written under two
//! keys (`Private-Package` / `-privatepackage`, `Include-Resource` /
//! `-includeresource`). Reads merge both; writes keep every entry under the
//! key it already lives in and put new entries under the preferred key.

use bndedit_header::Clause;

use super::EditModel;
use crate::error::ModelError;
use crate::registry::keys::*;

/// A list spread over two keys.
struct DualKey {
    /// Receives new entries when the document defines it.
    preferred: &'static str,
    fallback: &'static str,
}

const PRIVATE_PACKAGES: DualKey = DualKey {
    preferred: PRIVATEPACKAGE,
    fallback: PRIVATE_PACKAGE,
};

const INCLUDE_RESOURCES: DualKey = DualKey {
    preferred: INCLUDE_RESOURCE,
    fallback: INCLUDERESOURCE,
};

impl EditModel {
    pub fn private_packages(&self) -> Vec<String> {
        self.dual_list(&PRIVATE_PACKAGES)
    }

    pub fn set_private_packages(&mut self, packages: Vec<String>) -> Result<(), ModelError> {
        self.set_dual_list(&PRIVATE_PACKAGES, packages)
    }

    pub fn add_private_package(&mut self, package: &str) -> Result<(), ModelError> {
        self.add_dual_item(&PRIVATE_PACKAGES, package)
    }

    pub fn include_resource(&self) -> Vec<String> {
        self.dual_list(&INCLUDE_RESOURCES)
    }

    pub fn set_include_resource(&mut self, entries: Vec<String>) -> Result<(), ModelError> {
        self.set_dual_list(&INCLUDE_RESOURCES, entries)
    }

    pub fn add_include_resource(&mut self, entry: &str) -> Result<(), ModelError> {
        self.add_dual_item(&INCLUDE_RESOURCES, entry)
    }

    pub fn exported_packages(&self) -> Vec<Clause> {
        self.clause_value(EXPORT_PACKAGE)
    }

    /// Replace `Export-Package`. An export whose version follows
    /// `${Bundle-Version}` gets `Bundle-Version: 0.0.0` when the bundle has
    /// no version yet.
    pub fn set_exported_packages(&mut self, exports: Vec<Clause>) -> Result<(), ModelError> {
        let follows_bundle_version = exports.iter().any(|export| {
            export
                .version()
                .is_some_and(|version| version.contains(BUNDLE_VERSION_MACRO))
        });

        self.set_clause_value(EXPORT_PACKAGE, exports)?;

        if follows_bundle_version && self.text_value(BUNDLE_VERSION).is_none() {
            self.set_text_value(BUNDLE_VERSION, Some("0.0.0".to_string()))?;
        }
        Ok(())
    }

    pub fn add_exported_package(&mut self, export: Clause) -> Result<(), ModelError> {
        let mut exports = self.exported_packages();
        exports.push(export);
        self.set_exported_packages(exports)
    }

    /// Whether `package` is private or exported.
    pub fn is_included_package(&self, package: &str) -> bool {
        self.private_packages().iter().any(|p| p == package)
            || self
                .exported_packages()
                .iter()
                .any(|export| export.name == package)
    }

    fn dual_list(&self, keys: &DualKey) -> Vec<String> {
        let mut entries = self.list_value(keys.preferred);
        for entry in self.list_value(keys.fallback) {
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
        entries
    }

    fn set_dual_list(&mut self, keys: &DualKey, entries: Vec<String>) -> Result<(), ModelError> {
        let mut preferred = self.list_value(keys.preferred);
        let mut fallback = self.list_value(keys.fallback);

        let added: Vec<String> = entries
            .iter()
            .filter(|entry| !preferred.contains(entry) && !fallback.contains(entry))
            .cloned()
            .collect();

        preferred.retain(|entry| entries.contains(entry));
        fallback.retain(|entry| entries.contains(entry));
        self.write_list(keys.preferred, preferred.clone())?;
        self.write_list(keys.fallback, fallback.clone())?;

        if added.is_empty() {
            return Ok(());
        }
        if self.defines(keys.preferred) {
            preferred.extend(added);
            self.write_list(keys.preferred, preferred)
        } else {
            fallback.extend(added);
            self.write_list(keys.fallback, fallback)
        }
    }

    fn add_dual_item(&mut self, keys: &DualKey, item: &str) -> Result<(), ModelError> {
        let key = if self.defines(keys.preferred) {
            keys.preferred
        } else {
            keys.fallback
        };
        let mut entries = self.list_value(key);
        entries.push(item.to_string());
        self.write_list(key, entries)
    }

    /// Write `entries`, removing the key when the list is empty.
    fn write_list(&mut self, key: &str, entries: Vec<String>) -> Result<(), ModelError> {
        if entries.is_empty() {
            if self.defines(key) {
                self.remove(key)?;
            }
            Ok(())
        } else {
            self.set_list_value(key, entries)
        }
    }

    /// Whether the document (with staged edits) has `key`.
    fn defines(&self, key: &str) -> bool {
        self.resolve_raw(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Value;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_private_packages_merge_both_keys() {
        let model = EditModel::from_text("-privatepackage: a, b\nPrivate-Package: b, c\n");
        assert_eq!(model.private_packages(), strings(&["a", "b", "c"]));
    }

    #[test]
    fn test_set_private_packages_keeps_entries_in_place() {
        let mut model = EditModel::from_text("-privatepackage: a, b\nPrivate-Package: c\n");
        model.set_private_packages(strings(&["b", "c", "d"])).unwrap();

        assert_eq!(model.get(PRIVATEPACKAGE), Value::List(strings(&["b", "d"])));
        assert_eq!(model.get(PRIVATE_PACKAGE), Value::List(strings(&["c"])));
    }

    #[test]
    fn test_emptied_key_is_removed() {
        let mut model = EditModel::from_text("-privatepackage: a\nPrivate-Package: c\n");
        model.set_private_packages(strings(&["c", "e"])).unwrap();

        assert_eq!(model.document_changes().get(PRIVATEPACKAGE), Some(&None));
        assert_eq!(model.get(PRIVATE_PACKAGE), Value::List(strings(&["c", "e"])));
    }

    #[test]
    fn test_add_private_package_prefers_instruction() {
        let mut model = EditModel::from_text("-privatepackage: a\n");
        model.add_private_package("b").unwrap();
        assert_eq!(model.get(PRIVATEPACKAGE), Value::List(strings(&["a", "b"])));

        let mut model = EditModel::from_text("");
        model.add_private_package("b").unwrap();
        assert_eq!(model.get(PRIVATE_PACKAGE), Value::List(strings(&["b"])));
    }

    #[test]
    fn test_include_resource_prefers_header() {
        let mut model = EditModel::from_text("Include-Resource: a=b\n-includeresource: c\n");
        model.add_include_resource("d").unwrap();
        assert_eq!(model.get(INCLUDE_RESOURCE), Value::List(strings(&["a=b", "d"])));
        assert_eq!(model.include_resource(), strings(&["a=b", "d", "c"]));
    }

    #[test]
    fn test_exports_following_bundle_version() {
        let mut model = EditModel::from_text("");
        let export = Clause::new("org.example.api").attr("version", BUNDLE_VERSION_MACRO);
        model.set_exported_packages(vec![export]).unwrap();
        assert_eq!(model.bundle_version().as_deref(), Some("0.0.0"));

        let mut model = EditModel::from_text("Bundle-Version: 1.4.0\n");
        let export = Clause::new("org.example.api").attr("version", BUNDLE_VERSION_MACRO);
        model.add_exported_package(export).unwrap();
        assert_eq!(model.bundle_version().as_deref(), Some("1.4.0"));
    }

    #[test]
    fn test_is_included_package() {
        let model = EditModel::from_text(
            "Private-Package: org.example.impl\nExport-Package: org.example.api;version=1.0\n",
        );
        assert!(model.is_included_package("org.example.impl"));
        assert!(model.is_included_package("org.example.api"));
        assert!(!model.is_included_package("org.example.other"));
    }
}
