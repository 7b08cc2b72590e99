//! Merge groups across the inheritance chain.

mod fixtures;

use bndedit::registry::keys::PLUGIN;
use bndedit::{Clause, EditModel, InheritanceChain, Layer, MergeEntry};
use fixtures::{fixture_path, Scratch};

fn with_workspace(model: EditModel) -> EditModel {
    let workspace = Layer::load(&fixture_path("workspace.bnd")).unwrap();
    model.with_chain(InheritanceChain::new().with(workspace))
}

#[test]
fn test_members_are_ordered_by_suffix() {
    let model = EditModel::from_text("instr: c\ninstr.2.y: b\ninstr.1.x: a\nother: z\n");
    let group = model.merge_group("instr");

    assert_eq!(
        group.keys().collect::<Vec<_>>(),
        vec!["instr.1.x", "instr.2.y", "instr"]
    );
    assert!(group.entries.values().all(|entry| entry.local));
}

#[test]
fn test_local_member_shadows_parent() {
    let model = with_workspace(EditModel::open_file(fixture_path("project.bnd")).unwrap());
    let group = model.plugin_properties();

    assert_eq!(group.keys().collect::<Vec<_>>(), vec!["-plugin.1.repo", "-plugin.2.local"]);

    let repo = group.get("-plugin.1.repo").unwrap();
    assert!(!repo.local);
    assert_eq!(repo.layer, 1);
    assert_eq!(
        repo.clauses[0].name,
        "aQute.bnd.repository.maven.provider.MavenBndRepository"
    );
    assert_eq!(repo.clauses[0].get_attr("name"), Some("Central"));
    assert_eq!(
        repo.clauses[0].get_attr("releaseUrl"),
        Some("https://repo.maven.apache.org/maven2/")
    );

    let local = group.get("-plugin.2.local").unwrap();
    assert!(local.local);
    assert_eq!(local.clauses[0].name, "org.example.LocalPlugin");
}

#[test]
fn test_plugins_flatten_visible_members() {
    let model = with_workspace(EditModel::open_file(fixture_path("project.bnd")).unwrap());
    let names: Vec<_> = model.plugins().into_iter().map(|clause| clause.name).collect();
    assert_eq!(
        names,
        vec![
            "aQute.bnd.repository.maven.provider.MavenBndRepository",
            "org.example.LocalPlugin"
        ]
    );
}

#[test]
fn test_writing_group_never_copies_inherited_members() {
    let scratch = Scratch::copy("project.bnd");
    let mut model = with_workspace(EditModel::open_file(&scratch.path).unwrap());

    let mut group = model.plugin_properties();
    for entry in group.entries.values_mut() {
        for clause in &mut entry.clauses {
            clause.attrs.insert("name".to_string(), "renamed".to_string());
        }
    }
    group.insert(MergeEntry::local(
        "-plugin.3.extra",
        vec![Clause::new("org.example.Extra")],
    ));
    model.set_plugin_properties(&group, &[]).unwrap();
    model.save().unwrap();

    let text = scratch.text();
    assert!(!text.contains("-plugin.1.repo"));
    assert!(text.contains("-plugin.2.local: org.example.LocalPlugin;\\\n\t\tname=renamed\n"));
    assert!(text.ends_with("-plugin.3.extra: org.example.Extra"));

    let reopened = with_workspace(EditModel::open_file(&scratch.path).unwrap());
    let group = reopened.merge_group(PLUGIN);
    assert_eq!(group.len(), 3);
    assert_eq!(
        group.get("-plugin.1.repo").unwrap().clauses[0].get_attr("name"),
        Some("Central")
    );
    assert_eq!(
        group.get("-plugin.2.local").unwrap().clauses[0].get_attr("name"),
        Some("renamed")
    );
}

#[test]
fn test_keys_to_remove() {
    let scratch = Scratch::copy("project.bnd");
    let mut model = with_workspace(EditModel::open_file(&scratch.path).unwrap());

    let group = model.plugin_properties();
    model
        .set_plugin_properties(&group, &["-plugin.2.local"])
        .unwrap();
    model.save().unwrap();

    assert!(!scratch.text().contains("-plugin.2.local"));
    let group = model.plugin_properties();
    let shadowed = group.get("-plugin.2.local").unwrap();
    assert!(!shadowed.local);
    assert_eq!(shadowed.clauses[0].name, "org.example.Shadowed");
}
