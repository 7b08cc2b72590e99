//! Instruction and header names.

pub const BUNDLE_LICENSE: &str = "Bundle-License";
pub const BUNDLE_CATEGORY: &str = "Bundle-Category";
pub const BUNDLE_NAME: &str = "Bundle-Name";
pub const BUNDLE_DESCRIPTION: &str = "Bundle-Description";
pub const BUNDLE_COPYRIGHT: &str = "Bundle-Copyright";
pub const BUNDLE_UPDATELOCATION: &str = "Bundle-UpdateLocation";
pub const BUNDLE_VENDOR: &str = "Bundle-Vendor";
pub const BUNDLE_CONTACTADDRESS: &str = "Bundle-ContactAddress";
pub const BUNDLE_DOCURL: &str = "Bundle-DocURL";
pub const BUNDLE_SYMBOLICNAME: &str = "Bundle-SymbolicName";
pub const BUNDLE_VERSION: &str = "Bundle-Version";
pub const BUNDLE_ACTIVATOR: &str = "Bundle-Activator";
pub const BUNDLE_BLUEPRINT: &str = "Bundle-Blueprint";
pub const EXPORT_PACKAGE: &str = "Export-Package";
pub const IMPORT_PACKAGE: &str = "Import-Package";
pub const PRIVATE_PACKAGE: &str = "Private-Package";
pub const INCLUDE_RESOURCE: &str = "Include-Resource";
pub const SERVICE_COMPONENT: &str = "Service-Component";
pub const TESTCASES: &str = "Test-Cases";

pub const PRIVATEPACKAGE: &str = "-privatepackage";
pub const INCLUDERESOURCE: &str = "-includeresource";
pub const SOURCES: &str = "-sources";
pub const OUTPUT: &str = "-output";
pub const CLASSPATH: &str = "-classpath";
pub const BUILDPATH: &str = "-buildpath";
pub const TESTPATH: &str = "-testpath";
pub const DSANNOTATIONS: &str = "-dsannotations";
pub const SUB: &str = "-sub";
pub const PLUGIN: &str = "-plugin";
pub const PLUGINPATH: &str = "-pluginpath";
pub const DISTRO: &str = "-distro";
pub const STANDALONE: &str = "-standalone";
pub const IGNORE_STANDALONE: &str = "-ignorestandalone";
pub const RUNBUNDLES: &str = "-runbundles";
pub const RUNBUNDLES_DECORATOR: &str = "-runbundles+";
pub const RUNPROPERTIES: &str = "-runproperties";
pub const RUNFRAMEWORK: &str = "-runframework";
pub const RUNFW: &str = "-runfw";
pub const RUNVM: &str = "-runvm";
pub const RUNPROGRAMARGS: &str = "-runprogramargs";
pub const RUNREQUIRES: &str = "-runrequires";
pub const RUNBLACKLIST: &str = "-runblacklist";
pub const RUNEE: &str = "-runee";
pub const RUNREPOS: &str = "-runrepos";
pub const RUNSYSTEMPACKAGES: &str = "-runsystempackages";
pub const RESOLVE: &str = "-resolve";

/// Macro that export versions use to follow the bundle version.
pub const BUNDLE_VERSION_MACRO: &str = "${Bundle-Version}";

/// Keys announced on reload.
pub const KNOWN_PROPERTIES: &[&str] = &[
    BUNDLE_LICENSE,
    BUNDLE_CATEGORY,
    BUNDLE_NAME,
    BUNDLE_DESCRIPTION,
    BUNDLE_COPYRIGHT,
    BUNDLE_UPDATELOCATION,
    BUNDLE_VENDOR,
    BUNDLE_CONTACTADDRESS,
    BUNDLE_DOCURL,
    BUNDLE_SYMBOLICNAME,
    BUNDLE_VERSION,
    BUNDLE_ACTIVATOR,
    EXPORT_PACKAGE,
    IMPORT_PACKAGE,
    PRIVATE_PACKAGE,
    PRIVATEPACKAGE,
    SOURCES,
    SERVICE_COMPONENT,
    CLASSPATH,
    BUILDPATH,
    RUNBUNDLES,
    RUNPROPERTIES,
    SUB,
    RUNFRAMEWORK,
    RUNFW,
    RUNVM,
    RUNPROGRAMARGS,
    DISTRO,
    TESTCASES,
    PLUGIN,
    PLUGINPATH,
    RUNREPOS,
    RUNREQUIRES,
    RUNEE,
    RUNBLACKLIST,
    BUNDLE_BLUEPRINT,
    INCLUDE_RESOURCE,
    STANDALONE,
];
