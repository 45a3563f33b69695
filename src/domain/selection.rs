//! Tri-state selection derived from a set of selected ids.
//!
//! The tree never stores selection. Toggling returns a new id set, and the
//! per-node state is recomputed from the set and the tree shape.

use std::collections::BTreeSet;
use std::fmt;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::Forest;
use crate::domain::schema::NodeId;

/// Ids of selected nodes, ordered for stable output.
pub type SelectedIds = BTreeSet<NodeId>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Checked,
    Unchecked,
    Indeterminate,
}

impl CheckState {
    /// Glyph used by the terminal renderer.
    pub fn glyph(self) -> &'static str {
        match self {
            CheckState::Checked => "[x]",
            CheckState::Unchecked => "[ ]",
            CheckState::Indeterminate => "[-]",
        }
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckState::Checked => write!(f, "checked"),
            CheckState::Unchecked => write!(f, "unchecked"),
            CheckState::Indeterminate => write!(f, "indeterminate"),
        }
    }
}

/// Flips the check state of `node_id` and applies the new state to the whole
/// subtree.
///
/// In single-select mode at most one subtree stays selected: the click
/// clears the selection when it is exactly the target's subtree, otherwise
/// the selection becomes that subtree.
#[instrument(level = "debug", skip(tree, selected), fields(selected = selected.len()))]
pub fn toggle_node_selection(
    tree: &Forest,
    node_id: &str,
    selected: &SelectedIds,
    multiple: bool,
) -> SelectedIds {
    let Some(idx) = tree.index_of(node_id) else {
        debug!("node not found, selection unchanged");
        return selected.clone();
    };
    let subtree: SelectedIds = std::iter::once(idx)
        .chain(tree.descendants(idx))
        .filter_map(|i| tree.get_node(i).map(|n| n.id().clone()))
        .collect();

    if !multiple {
        return if *selected == subtree {
            SelectedIds::new()
        } else {
            subtree
        };
    }

    let select = get_selection_state(tree, node_id, selected) != CheckState::Checked;
    let mut next = selected.clone();
    if select {
        next.extend(subtree);
    } else {
        next.retain(|id| !subtree.contains(id));
    }
    next
}

/// State of `node_id`: membership for leaves and empty branches, otherwise
/// the combination of all children. Unknown ids are unchecked.
pub fn get_selection_state(tree: &Forest, node_id: &str, selected: &SelectedIds) -> CheckState {
    match tree.index_of(node_id) {
        Some(idx) => state_at(tree, idx, selected),
        None => CheckState::Unchecked,
    }
}

fn state_at(tree: &Forest, idx: Index, selected: &SelectedIds) -> CheckState {
    let Some(node) = tree.get_node(idx) else {
        return CheckState::Unchecked;
    };
    let children = node.child_indices();
    if children.is_empty() {
        return if selected.contains(node.id()) {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        };
    }

    // visit every child: a mixed state can sit anywhere below
    let states: Vec<CheckState> = children
        .iter()
        .map(|&child| state_at(tree, child, selected))
        .collect();
    if states.iter().all(|s| *s == CheckState::Checked) {
        CheckState::Checked
    } else if states.iter().all(|s| *s == CheckState::Unchecked) {
        CheckState::Unchecked
    } else {
        CheckState::Indeterminate
    }
}

/// Ids strictly below `node_id`, pre-order.
pub fn collect_descendants(tree: &Forest, node_id: &str) -> Vec<NodeId> {
    to_ids(tree, tree.index_of(node_id).map(|idx| tree.descendants(idx)))
}

/// Ids strictly above `node_id`, immediate parent first.
pub fn collect_ancestors(tree: &Forest, node_id: &str) -> Vec<NodeId> {
    to_ids(tree, tree.index_of(node_id).map(|idx| tree.ancestors(idx)))
}

fn to_ids(tree: &Forest, indices: Option<Vec<Index>>) -> Vec<NodeId> {
    indices
        .unwrap_or_default()
        .into_iter()
        .filter_map(|i| tree.get_node(i).map(|n| n.id().clone()))
        .collect()
}

/// Adds `node_id` and everything below it.
pub fn select_with_descendants(tree: &Forest, node_id: &str, selected: &SelectedIds) -> SelectedIds {
    extend_with(tree, node_id, selected, collect_descendants(tree, node_id))
}

/// Adds `node_id` and every ancestor up to its root.
pub fn select_with_ancestors(tree: &Forest, node_id: &str, selected: &SelectedIds) -> SelectedIds {
    extend_with(tree, node_id, selected, collect_ancestors(tree, node_id))
}

fn extend_with(tree: &Forest, node_id: &str, selected: &SelectedIds, more: Vec<NodeId>) -> SelectedIds {
    let mut next = selected.clone();
    if tree.contains(node_id) {
        next.insert(NodeId::from(node_id));
        next.extend(more);
    }
    next
}

/// Selection behaviour flags supplied by the hosting control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    /// Several subtrees may be selected at once
    pub multiple: bool,
    /// Branch nodes can be toggled themselves
    pub parent_selection: bool,
    /// Clicking a row highlights it; interpreted by the UI only
    pub highlight_on_click: bool,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            multiple: true,
            parent_selection: true,
            highlight_on_click: false,
        }
    }
}

/// Caller-owned selection: the id set plus its policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: SelectedIds,
    pub policy: SelectionPolicy,
}

impl SelectionState {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            selected: SelectedIds::new(),
            policy,
        }
    }

    pub fn with_selected(policy: SelectionPolicy, selected: SelectedIds) -> Self {
        Self { selected, policy }
    }

    pub fn selected(&self) -> &SelectedIds {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Applies a click on `node_id`. Returns false when the policy refuses
    /// it (branch toggles with `parent_selection` off) or the id is unknown.
    pub fn toggle(&mut self, tree: &Forest, node_id: &str) -> bool {
        let Some(node) = tree.get(node_id) else {
            return false;
        };
        if node.is_branch() && !self.policy.parent_selection {
            debug!("branch selection disabled, ignoring {node_id}");
            return false;
        }
        self.selected = toggle_node_selection(tree, node_id, &self.selected, self.policy.multiple);
        true
    }

    pub fn state_of(&self, tree: &Forest, node_id: &str) -> CheckState {
        get_selection_state(tree, node_id, &self.selected)
    }

    pub fn select_with_descendants(&mut self, tree: &Forest, node_id: &str) {
        self.selected = select_with_descendants(tree, node_id, &self.selected);
    }

    pub fn select_with_ancestors(&mut self, tree: &Forest, node_id: &str) {
        self.selected = select_with_ancestors(tree, node_id, &self.selected);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drops ids that no longer exist, e.g. after a delete.
    pub fn retain_existing(&mut self, tree: &Forest) {
        self.selected.retain(|id| tree.contains(id.as_str()));
    }
}
