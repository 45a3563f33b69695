//! Whole-forest validation, run at the end of every mutating operation.

use std::collections::HashSet;

use tracing::{instrument, trace};

use crate::domain::arena::Forest;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::schema::{check_extra, check_id, check_name, NodeId};

/// Checks field rules on every node plus the structural invariants:
/// consistent parent links, no cycles, no unreachable nodes, unique ids.
#[instrument(level = "trace", skip(forest), fields(nodes = forest.len()))]
pub fn validate_forest(forest: &Forest) -> DomainResult<()> {
    for (_, node) in forest.arena_iter() {
        check_id(node.id())?;
        check_name(node.id(), &node.data.name)?;
        check_extra(node.id(), &node.data.extra)?;
    }

    let mut seen_ids: HashSet<&NodeId> = HashSet::with_capacity(forest.len());
    let mut visited = HashSet::with_capacity(forest.len());
    let mut stack: Vec<_> = forest.roots().iter().map(|&r| (r, None)).collect();

    while let Some((idx, expected_parent)) = stack.pop() {
        let Some(node) = forest.get_node(idx) else {
            return Err(DomainError::structure(
                &NodeId::from("?"),
                "child index points to a removed node",
            ));
        };
        if !visited.insert(idx) {
            return Err(DomainError::structure(node.id(), "node is reachable twice (cycle or shared child)"));
        }
        if node.parent != expected_parent {
            return Err(DomainError::structure(node.id(), "parent link does not match owner"));
        }
        if !seen_ids.insert(node.id()) {
            return Err(DomainError::DuplicateId(node.id().clone()));
        }
        if forest.id_index().get(node.id()) != Some(&idx) {
            return Err(DomainError::structure(node.id(), "id index is stale"));
        }
        for &child in node.child_indices() {
            stack.push((child, Some(idx)));
        }
    }

    if visited.len() != forest.arena_len() {
        let orphan = forest
            .arena_iter()
            .find(|(idx, _)| !visited.contains(idx))
            .map(|(_, n)| n.id().clone())
            .unwrap_or_else(|| NodeId::from("?"));
        return Err(DomainError::structure(&orphan, "node is not reachable from any root"));
    }
    if forest.id_index().len() != forest.arena_len() {
        return Err(DomainError::structure(&NodeId::from("?"), "id index size mismatch"));
    }
    trace!("forest valid");
    Ok(())
}
