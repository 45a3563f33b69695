//! EditSession driven through the service container.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use formtree::config::{IdStrategy, Settings};
use formtree::domain::{CascadeDecision, CheckState, Forest, IconChoice, NodeSpec, SelectionPolicy};
use formtree::infrastructure::di::ServiceContainer;
use formtree::infrastructure::traits::RealFileSystem;

#[fixture]
fn container() -> ServiceContainer {
    let settings = Settings {
        id_prefix: "item".into(),
        id_strategy: IdStrategy::Sequential,
        ..Settings::default()
    };
    ServiceContainer::with_deps(settings, Arc::new(RealFileSystem))
}

// menu
// ├── drinks
// │   ├── tea
// │   └── coffee
// └── food
//     └── soup
#[fixture]
fn menu() -> Forest {
    Forest::from_nodes(vec![NodeSpec::branch(
        "menu",
        "Menu",
        vec![
            NodeSpec::branch(
                "drinks",
                "Drinks",
                vec![NodeSpec::leaf("tea", "Tea"), NodeSpec::leaf("coffee", "Coffee")],
            ),
            NodeSpec::branch("food", "Food", vec![NodeSpec::leaf("soup", "Soup")]),
        ],
    )])
    .unwrap()
}

#[rstest]
fn given_container_when_generating_ids_then_uses_configured_prefix(container: ServiceContainer, menu: Forest) {
    let mut session = container.session(menu);

    session.add_child("food", "Salad").unwrap();
    session.duplicate("drinks").unwrap();

    assert_eq!(session.tree().get("item-1").unwrap().data.name, "Salad");
    // duplicate ids are issued pre-order: drinks, tea, coffee
    assert_eq!(session.tree().get("item-2").unwrap().data.name, "Drinks");
    assert_eq!(session.tree().get("item-4").unwrap().data.name, "Coffee");
    assert_eq!(session.tree().path_to("item-3"), ["Menu", "Drinks", "Tea"]);
}

#[rstest]
fn given_branch_icon_when_cascading_then_every_branch_recoloured(container: ServiceContainer, menu: Forest) {
    let mut session = container.session(menu);

    session.pick_icon("food", IconChoice::new("folder", true));
    session.confirm_icon(CascadeDecision::Cascade).unwrap();

    for id in ["menu", "drinks", "food"] {
        assert_eq!(session.tree().get(id).unwrap().data.icon.as_deref(), Some("folder"), "{id}");
    }
    assert_eq!(session.tree().get("soup").unwrap().data.icon, None);
}

#[rstest]
fn given_dismissed_icon_when_confirming_then_tree_unchanged(container: ServiceContainer, menu: Forest) {
    let mut session = container.session(menu.clone());

    session.pick_icon("tea", IconChoice::new("cup", false));
    session.confirm_icon(CascadeDecision::from(None)).unwrap();

    assert_eq!(session.tree(), &menu);
}

#[rstest]
fn given_selection_when_deleting_branch_then_parent_state_follows(container: ServiceContainer, menu: Forest) {
    let mut session = container.session(menu);
    session.toggle("tea");
    session.toggle("soup");
    assert_eq!(session.state_of("menu"), CheckState::Indeterminate);

    session.delete("drinks").unwrap();

    assert_eq!(session.state_of("menu"), CheckState::Checked);
    assert_eq!(session.selection().selected().len(), 1);
}

#[rstest]
fn given_session_when_saving_then_document_reloads_equal(container: ServiceContainer, menu: Forest) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("menu.json");
    let mut session = container.session(menu);
    session.rename("soup", "Soup of the day").unwrap();
    session.collapse_all().unwrap();

    container.tree_service().save(&path, session.tree()).unwrap();
    let reloaded = container.tree_service().load(&path).unwrap();

    assert_eq!(&reloaded, session.tree());
    assert_eq!(reloaded.get("drinks").unwrap().data.expanded, Some(false));
}

#[rstest]
fn given_nested_node_when_asking_line_guides_then_root_to_parent(container: ServiceContainer, menu: Forest) {
    let session = container.session(menu);
    // menu is the only root, drinks is not the last child
    assert_eq!(session.line_guides("coffee"), [true, false]);
    assert_eq!(session.line_guides("soup"), [true, true]);
    assert!(session.line_guides("ghost").is_empty());
}

#[rstest]
fn given_branch_clicks_disabled_when_toggling_then_reports_acceptance(container: ServiceContainer, menu: Forest) {
    let mut session = container.session(menu);
    session.set_policy(SelectionPolicy {
        parent_selection: false,
        ..SelectionPolicy::default()
    });

    assert!(!session.toggle("drinks"));
    assert!(!session.toggle("ghost"));
    assert!(session.selection().selected().is_empty());

    // accepted clicks report true, including one that undoes the previous
    assert!(session.toggle("tea"));
    assert!(session.toggle("tea"));
    assert!(session.selection().selected().is_empty());
}
