//! Typed accessors for the known bnd instructions.

use bndedit_header::{Clause, Requirement};
use indexmap::IndexMap;
use tracing::error;

use super::EditModel;
use crate::error::ModelError;
use crate::merge::MergeGroup;
use crate::registry::keys::*;
use crate::registry::{ResolveMode, Value};

macro_rules! accessors {
    ($read:ident, $write:ident, $ty:ty: $($get:ident, $set:ident => $key:expr;)*) => {
        impl EditModel {
            $(
                pub fn $get(&self) -> $ty {
                    self.$read($key)
                }

                pub fn $set(&mut self, value: $ty) -> Result<(), ModelError> {
                    self.$write($key, value)
                }
            )*
        }
    };
}

accessors! { text_value, set_text_value, Option<String>:
    bundle_license, set_bundle_license => BUNDLE_LICENSE;
    bundle_category, set_bundle_category => BUNDLE_CATEGORY;
    bundle_name, set_bundle_name => BUNDLE_NAME;
    bundle_description, set_bundle_description => BUNDLE_DESCRIPTION;
    bundle_copyright, set_bundle_copyright => BUNDLE_COPYRIGHT;
    bundle_update_location, set_bundle_update_location => BUNDLE_UPDATELOCATION;
    bundle_vendor, set_bundle_vendor => BUNDLE_VENDOR;
    bundle_contact_address, set_bundle_contact_address => BUNDLE_CONTACTADDRESS;
    bundle_doc_url, set_bundle_doc_url => BUNDLE_DOCURL;
    bundle_symbolic_name, set_bundle_symbolic_name => BUNDLE_SYMBOLICNAME;
    bundle_version, set_bundle_version => BUNDLE_VERSION;
    bundle_activator, set_bundle_activator => BUNDLE_ACTIVATOR;
    output_file, set_output_file => OUTPUT;
    run_framework, set_run_framework => RUNFRAMEWORK;
    run_fw, set_run_fw => RUNFW;
    run_vm_args, set_run_vm_args => RUNVM;
    run_program_args, set_run_program_args => RUNPROGRAMARGS;
}

accessors! { list_value, set_list_value, Vec<String>:
    class_path, set_class_path => CLASSPATH;
    ds_annotation_patterns, set_ds_annotation_patterns => DSANNOTATIONS;
    sub_bnd_files, set_sub_bnd_files => SUB;
    test_suites, set_test_suites => TESTCASES;
    plugin_path, set_plugin_path => PLUGINPATH;
    distro, set_distro => DISTRO;
    run_repos, set_run_repos => RUNREPOS;
}

accessors! { clause_value, set_clause_value, Vec<Clause>:
    imported_packages, set_imported_packages => IMPORT_PACKAGE;
    service_components, set_service_components => SERVICE_COMPONENT;
    system_packages, set_system_packages => RUNSYSTEMPACKAGES;
    bundle_blueprint, set_bundle_blueprint => BUNDLE_BLUEPRINT;
    build_path, set_build_path => BUILDPATH;
    test_path, set_test_path => TESTPATH;
    run_bundles, set_run_bundles => RUNBUNDLES;
    run_bundles_decorator, set_run_bundles_decorator => RUNBUNDLES_DECORATOR;
    standalone_links, set_standalone_links => STANDALONE;
    ignore_standalone, set_ignore_standalone => IGNORE_STANDALONE;
}

accessors! { requirement_value, set_requirement_value, Vec<Requirement>:
    run_requires, set_run_requires => RUNREQUIRES;
    run_blacklist, set_run_blacklist => RUNBLACKLIST;
}

impl EditModel {
    pub(crate) fn text_value(&self, key: &str) -> Option<String> {
        self.get(key).as_text().map(str::to_string)
    }

    pub(crate) fn set_text_value(&mut self, key: &str, value: Option<String>) -> Result<(), ModelError> {
        self.set(key, value)
    }

    pub(crate) fn list_value(&self, key: &str) -> Vec<String> {
        self.get(key).as_list().map(<[String]>::to_vec).unwrap_or_default()
    }

    pub(crate) fn set_list_value(&mut self, key: &str, value: Vec<String>) -> Result<(), ModelError> {
        self.set(key, value)
    }

    pub(crate) fn clause_value(&self, key: &str) -> Vec<Clause> {
        self.get(key).as_clauses().map(<[Clause]>::to_vec).unwrap_or_default()
    }

    pub(crate) fn set_clause_value(&mut self, key: &str, value: Vec<Clause>) -> Result<(), ModelError> {
        self.set(key, value)
    }

    fn requirement_value(&self, key: &str) -> Vec<Requirement> {
        self.get(key)
            .as_requirements()
            .map(<[Requirement]>::to_vec)
            .unwrap_or_default()
    }

    fn set_requirement_value(
        &mut self,
        key: &str,
        value: Vec<Requirement>,
    ) -> Result<(), ModelError> {
        self.set(key, value)
    }

    pub fn include_sources(&self) -> bool {
        self.get(SOURCES).as_bool().unwrap_or(false)
    }

    pub fn set_include_sources(&mut self, include: bool) -> Result<(), ModelError> {
        self.set(SOURCES, include)
    }

    pub fn run_properties(&self) -> IndexMap<String, String> {
        self.get(RUNPROPERTIES).as_map().cloned().unwrap_or_default()
    }

    pub fn set_run_properties(&mut self, properties: IndexMap<String, String>) -> Result<(), ModelError> {
        self.set(RUNPROPERTIES, properties)
    }

    /// `-runee`; `None` when unset or not a known execution environment.
    pub fn run_ee(&self) -> Option<String> {
        self.text_value(RUNEE)
    }

    pub fn set_run_ee(&mut self, ee: Option<&str>) -> Result<(), ModelError> {
        match ee {
            Some(ee) => self.set(RUNEE, Value::Enum(ee.to_string())),
            None => self.set(RUNEE, Value::None),
        }
    }

    /// `-resolve`; unknown values read as [`ResolveMode::Manual`].
    pub fn resolve_mode(&self) -> ResolveMode {
        let value = self.get(RESOLVE);
        let Some(name) = value.as_text() else {
            return ResolveMode::default();
        };
        name.parse().unwrap_or_else(|err| {
            error!("{}", err);
            ResolveMode::default()
        })
    }

    pub fn set_resolve_mode(&mut self, mode: ResolveMode) -> Result<(), ModelError> {
        self.set(RESOLVE, Value::Enum(mode.as_str().to_string()))
    }

    /// Every plugin clause visible through the `-plugin` merge group.
    pub fn plugins(&self) -> Vec<Clause> {
        self.merge_group(PLUGIN).clauses()
    }

    /// Replace the bare `-plugin` instruction.
    pub fn set_plugins(&mut self, plugins: Vec<Clause>) -> Result<(), ModelError> {
        self.set(PLUGIN, plugins)
    }

    /// `-plugin` members by key, each tagged local or inherited.
    pub fn plugin_properties(&self) -> MergeGroup {
        self.merge_group(PLUGIN)
    }

    pub fn set_plugin_properties(
        &mut self,
        group: &MergeGroup,
        keys_to_remove: &[&str],
    ) -> Result<(), ModelError> {
        self.set_merge_group(PLUGIN, group, keys_to_remove)
    }

    pub fn add_bundle_blueprint(&mut self, location: &str) -> Result<(), ModelError> {
        let mut locations = self.bundle_blueprint();
        locations.push(Clause::new(location));
        self.set_bundle_blueprint(locations)
    }
}
