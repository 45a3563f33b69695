//! Editing session
//!
//! Owns the current tree snapshot together with the selection and the
//! pending icon choice. Every edit replaces the snapshot with the result of
//! a pure domain operation; a failed edit leaves it untouched.

use std::borrow::Cow;

use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{
    add_child_node, add_sibling_node, delete_node, duplicate_node, filter_tree, set_all_expanded,
    set_expanded, update_node_custom_props, update_node_icon, update_node_name, CascadeDecision,
    CheckState, CustomProps, DomainResult, Forest, IconChoice, IconPicker, IdGenerator,
    SelectionPolicy, SelectionState,
};

pub struct EditSession {
    tree: Forest,
    selection: SelectionState,
    icon_picker: IconPicker,
    ids: Box<dyn IdGenerator + Send>,
}

impl EditSession {
    pub fn new(tree: Forest, policy: SelectionPolicy, ids: Box<dyn IdGenerator + Send>) -> Self {
        Self {
            tree,
            selection: SelectionState::new(policy),
            icon_picker: IconPicker::default(),
            ids,
        }
    }

    pub fn tree(&self) -> &Forest {
        &self.tree
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn icon_picker(&self) -> &IconPicker {
        &self.icon_picker
    }

    pub fn set_policy(&mut self, policy: SelectionPolicy) {
        self.selection.policy = policy;
    }

    pub fn into_tree(self) -> Forest {
        self.tree
    }

    fn apply(&mut self, next: DomainResult<Forest>) -> ApplicationResult<&Forest> {
        self.tree = next?;
        Ok(&self.tree)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn add_sibling(&mut self, target_id: &str, name: &str, is_leaf: bool) -> ApplicationResult<&Forest> {
        let next = add_sibling_node(&self.tree, target_id, name, is_leaf, self.ids.as_mut());
        self.apply(next)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn add_child(&mut self, parent_id: &str, name: &str) -> ApplicationResult<&Forest> {
        let next = add_child_node(&self.tree, parent_id, name, self.ids.as_mut());
        self.apply(next)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn duplicate(&mut self, id: &str) -> ApplicationResult<&Forest> {
        let next = duplicate_node(&self.tree, id, self.ids.as_mut());
        self.apply(next)
    }

    /// Deletes the subtree and forgets any selected ids inside it.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&mut self, id: &str) -> ApplicationResult<&Forest> {
        self.tree = delete_node(&self.tree, id)?;
        self.selection.retain_existing(&self.tree);
        Ok(&self.tree)
    }

    pub fn rename(&mut self, id: &str, name: &str) -> ApplicationResult<&Forest> {
        let next = update_node_name(&self.tree, id, name);
        self.apply(next)
    }

    /// Sets one node's icon directly, bypassing the picker.
    pub fn set_icon(&mut self, id: &str, icon: &str, is_user_icon: bool) -> ApplicationResult<&Forest> {
        let next = update_node_icon(&self.tree, id, icon, is_user_icon);
        self.apply(next)
    }

    pub fn set_custom_props(&mut self, id: &str, props: &CustomProps) -> ApplicationResult<&Forest> {
        let next = update_node_custom_props(&self.tree, id, props);
        self.apply(next)
    }

    pub fn set_expanded(&mut self, id: &str, expanded: bool) -> ApplicationResult<&Forest> {
        let next = set_expanded(&self.tree, id, expanded);
        self.apply(next)
    }

    pub fn expand_all(&mut self) -> ApplicationResult<&Forest> {
        let next = set_all_expanded(&self.tree, true);
        self.apply(next)
    }

    pub fn collapse_all(&mut self) -> ApplicationResult<&Forest> {
        let next = set_all_expanded(&self.tree, false);
        self.apply(next)
    }

    /// Click on a checkbox. Returns whether the click was accepted.
    pub fn toggle(&mut self, id: &str) -> bool {
        self.selection.toggle(&self.tree, id)
    }

    pub fn state_of(&self, id: &str) -> CheckState {
        self.selection.state_of(&self.tree, id)
    }

    /// First step of icon assignment; nothing changes until confirmed.
    pub fn pick_icon(&mut self, id: &str, choice: IconChoice) {
        debug!("icon {} picked for {id}", choice.icon);
        self.icon_picker.pick(id, choice);
    }

    #[instrument(level = "debug", skip(self))]
    pub fn confirm_icon(&mut self, decision: CascadeDecision) -> ApplicationResult<&Forest> {
        let next = self.icon_picker.resolve(&self.tree, decision);
        self.apply(next)
    }

    pub fn filtered(&self, term: &str) -> Cow<'_, Forest> {
        filter_tree(&self.tree, term)
    }

    pub fn line_guides(&self, id: &str) -> Vec<bool> {
        self.tree.build_ancestor_last_map(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeSpec, SequentialIdGenerator};
    use serde_json::json;

    fn session() -> EditSession {
        let tree = Forest::from_nodes(vec![NodeSpec::branch(
            "a",
            "A",
            vec![NodeSpec::leaf("a1", "A1"), NodeSpec::leaf("a2", "A2")],
        )])
        .unwrap();
        EditSession::new(
            tree,
            SelectionPolicy::default(),
            Box::new(SequentialIdGenerator::new("n")),
        )
    }

    #[test]
    fn given_session_when_adding_nodes_then_snapshot_advances() {
        let mut s = session();
        s.add_child("a", "Third").unwrap();
        s.add_sibling("a", "Root two", false).unwrap();

        let roots: Vec<_> = s.tree().to_nodes().into_iter().map(|n| n.name).collect();
        assert_eq!(roots, ["A", "Root two"]);
        assert_eq!(s.tree().get("n-1").unwrap().data.name, "Third");
        assert!(s.tree().get("n-2").unwrap().is_branch());
    }

    #[test]
    fn given_failed_edit_when_renaming_then_snapshot_kept() {
        let mut s = session();
        let before = s.tree().clone();
        assert!(s.rename("a1", "").is_err());
        assert_eq!(s.tree(), &before);
    }

    #[test]
    fn given_selected_subtree_when_deleting_then_selection_pruned() {
        let mut s = session();
        assert!(s.toggle("a"));
        assert_eq!(s.selection().selected().len(), 3);

        s.delete("a1").unwrap();

        assert!(!s.selection().is_selected("a1"));
        assert!(s.selection().is_selected("a"));
        assert_eq!(s.state_of("a"), CheckState::Checked);
    }

    #[test]
    fn given_pending_icon_when_confirming_then_picker_returns_idle() {
        let mut s = session();
        s.pick_icon("a1", IconChoice::new("star", false));
        assert!(s.icon_picker().pending().is_some());

        s.confirm_icon(CascadeDecision::Cascade).unwrap();

        assert_eq!(s.icon_picker(), &IconPicker::Idle);
        assert_eq!(s.tree().get("a2").unwrap().data.icon.as_deref(), Some("star"));
        assert_eq!(s.tree().get("a").unwrap().data.icon, None);
    }

    #[test]
    fn given_props_when_setting_then_stored_on_node() {
        let mut s = session();
        let mut props = CustomProps::new();
        props.insert("code".into(), json!("X-1"));
        s.set_custom_props("a2", &props).unwrap();
        assert_eq!(s.tree().get("a2").unwrap().data.extra.get("code"), Some(&json!("X-1")));
    }

    #[test]
    fn given_session_when_collapsing_all_then_branches_marked() {
        let mut s = session();
        s.collapse_all().unwrap();
        assert_eq!(s.tree().get("a").unwrap().data.expanded, Some(false));
        assert_eq!(s.tree().get("a1").unwrap().data.expanded, None);
        assert_eq!(s.line_guides("a2"), vec![true]);
        assert_eq!(s.filtered("a2").len(), 2);
    }
}
