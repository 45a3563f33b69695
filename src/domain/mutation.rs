//! Pure tree edits.
//!
//! Every operation copies the input forest, edits the copy and validates it
//! before returning. An unknown target id leaves the copy unchanged.

use tracing::{debug, instrument};

use crate::domain::arena::{Forest, NodeData};
use crate::domain::error::{DomainError, DomainResult, ValidationIssue};
use crate::domain::identity::{assign_new_ids, fresh_id, IdGenerator};
use crate::domain::schema::{CustomProps, RESERVED_KEYS};
use crate::domain::validate::validate_forest;

fn commit(next: Forest) -> DomainResult<Forest> {
    validate_forest(&next)?;
    Ok(next)
}

/// Inserts a new node right after `target_id`, at the same level.
/// Leaves carry no children key; branches start with an empty one.
#[instrument(level = "debug", skip(tree, ids))]
pub fn add_sibling_node(
    tree: &Forest,
    target_id: &str,
    name: &str,
    is_leaf: bool,
    ids: &mut dyn IdGenerator,
) -> DomainResult<Forest> {
    let mut next = tree.clone();
    let Some(loc) = tree.find_node_and_parent(target_id) else {
        debug!("sibling target not found, tree unchanged");
        return Ok(next);
    };
    let id = fresh_id(ids, |c| tree.contains(c));
    next.insert_node(
        NodeData::new(id, name),
        !is_leaf,
        loc.parent_index,
        Some(loc.index + 1),
    )?;
    commit(next)
}

/// Appends a new leaf to the end of `parent_id`'s children.
#[instrument(level = "debug", skip(tree, ids))]
pub fn add_child_node(
    tree: &Forest,
    parent_id: &str,
    name: &str,
    ids: &mut dyn IdGenerator,
) -> DomainResult<Forest> {
    let mut next = tree.clone();
    let Some(parent_idx) = tree.index_of(parent_id) else {
        debug!("parent not found, tree unchanged");
        return Ok(next);
    };
    let id = fresh_id(ids, |c| tree.contains(c));
    next.insert_node(NodeData::new(id, name), false, Some(parent_idx), None)?;
    commit(next)
}

/// Copies the subtree at `id` with fresh ids and places it right after the
/// original.
#[instrument(level = "debug", skip(tree, ids))]
pub fn duplicate_node(tree: &Forest, id: &str, ids: &mut dyn IdGenerator) -> DomainResult<Forest> {
    let mut next = tree.clone();
    let Some(loc) = tree.find_node_and_parent(id) else {
        debug!("node not found, tree unchanged");
        return Ok(next);
    };
    let Some(original) = tree.node_spec(loc.node_index) else {
        return Ok(next);
    };
    let copy = assign_new_ids(&original, ids, |c| tree.contains(c));
    next.insert_spec(&copy, loc.parent_index, Some(loc.index + 1))?;
    commit(next)
}

/// Removes `id` together with its subtree.
#[instrument(level = "debug", skip(tree))]
pub fn delete_node(tree: &Forest, id: &str) -> DomainResult<Forest> {
    let mut next = tree.clone();
    match tree.index_of(id) {
        Some(idx) => {
            next.remove_subtree(idx);
        }
        None => debug!("node not found, tree unchanged"),
    }
    commit(next)
}

#[instrument(level = "debug", skip(tree))]
pub fn update_node_name(tree: &Forest, id: &str, new_name: &str) -> DomainResult<Forest> {
    edit_one(tree, id, |data| data.name = new_name.to_string())
}

#[instrument(level = "debug", skip(tree))]
pub fn update_node_icon(tree: &Forest, id: &str, icon: &str, is_user_icon: bool) -> DomainResult<Forest> {
    edit_one(tree, id, |data| data.set_icon(icon, is_user_icon))
}

/// Sets the icon on every node of the forest.
#[instrument(level = "debug", skip(tree))]
pub fn update_all_nodes_icons(tree: &Forest, icon: &str, is_user_icon: bool) -> DomainResult<Forest> {
    let targets: Vec<_> = tree.iter().map(|(idx, _)| idx).collect();
    edit_many(tree, &targets, |data| data.set_icon(icon, is_user_icon))
}

/// Sets the icon on every branch node; leaves keep theirs.
#[instrument(level = "debug", skip(tree))]
pub fn update_all_parent_icons(tree: &Forest, icon: &str, is_user_icon: bool) -> DomainResult<Forest> {
    let targets: Vec<_> = tree
        .iter()
        .filter(|(_, node)| node.is_branch())
        .map(|(idx, _)| idx)
        .collect();
    edit_many(tree, &targets, |data| data.set_icon(icon, is_user_icon))
}

/// Sets the icon on every descendant of every branch node, never on the
/// branch itself unless it is a descendant of another branch.
#[instrument(level = "debug", skip(tree))]
pub fn update_all_children_icons(tree: &Forest, icon: &str, is_user_icon: bool) -> DomainResult<Forest> {
    let targets: Vec<_> = tree
        .roots()
        .iter()
        .flat_map(|&root| tree.descendants(root))
        .collect();
    edit_many(tree, &targets, |data| data.set_icon(icon, is_user_icon))
}

/// Merges extra key/value pairs onto one node. Keys that shadow built-in
/// fields are rejected.
#[instrument(level = "debug", skip(tree, props), fields(keys = props.len()))]
pub fn update_node_custom_props(tree: &Forest, id: &str, props: &CustomProps) -> DomainResult<Forest> {
    if let Some(key) = props.keys().find(|k| RESERVED_KEYS.contains(&k.as_str())) {
        return Err(DomainError::Validation {
            node: id.into(),
            issue: ValidationIssue::ReservedProperty(key.clone()),
        });
    }
    edit_one(tree, id, |data| {
        for (key, value) in props {
            data.extra.insert(key.clone(), value.clone());
        }
    })
}

/// Sets the expand/collapse hint on one node.
#[instrument(level = "debug", skip(tree))]
pub fn set_expanded(tree: &Forest, id: &str, expanded: bool) -> DomainResult<Forest> {
    edit_one(tree, id, |data| data.expanded = Some(expanded))
}

/// Sets the expand/collapse hint on every branch node.
#[instrument(level = "debug", skip(tree))]
pub fn set_all_expanded(tree: &Forest, expanded: bool) -> DomainResult<Forest> {
    let targets: Vec<_> = tree
        .iter()
        .filter(|(_, node)| node.is_branch())
        .map(|(idx, _)| idx)
        .collect();
    edit_many(tree, &targets, |data| data.expanded = Some(expanded))
}

fn edit_one(tree: &Forest, id: &str, edit: impl FnOnce(&mut NodeData)) -> DomainResult<Forest> {
    let mut next = tree.clone();
    match next.index_of(id).and_then(|idx| next.get_node_mut(idx)) {
        Some(node) => edit(&mut node.data),
        None => debug!("node {id} not found, tree unchanged"),
    }
    commit(next)
}

fn edit_many(
    tree: &Forest,
    targets: &[generational_arena::Index],
    mut edit: impl FnMut(&mut NodeData),
) -> DomainResult<Forest> {
    let mut next = tree.clone();
    for &idx in targets {
        if let Some(node) = next.get_node_mut(idx) {
            edit(&mut node.data);
        }
    }
    debug!("edited {} nodes", targets.len());
    commit(next)
}
