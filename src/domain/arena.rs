//! Arena-backed forest and the shared lookup primitives.
//!
//! Nodes live in a generational arena; ownership is expressed by index lists
//! (`children`) plus a back-reference (`parent`). An `id -> Index` map gives
//! O(1) lookup by node id.

use std::collections::{HashMap, HashSet};

use generational_arena::{Arena, Index};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, instrument, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::schema::{CustomProps, NodeId, NodeSpec};

/// Data payload of a tree node (everything except structure).
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub id: NodeId,
    pub name: String,
    pub expanded: Option<bool>,
    pub icon: Option<String>,
    pub is_user_icon: Option<bool>,
    pub extra: CustomProps,
}

impl NodeData {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            expanded: None,
            icon: None,
            is_user_icon: None,
            extra: CustomProps::new(),
        }
    }

    fn from_spec(spec: &NodeSpec) -> Self {
        Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            expanded: spec.expanded,
            icon: spec.icon.clone(),
            is_user_icon: spec.is_user_icon,
            extra: spec.extra.clone(),
        }
    }

    pub fn set_icon(&mut self, icon: &str, is_user_icon: bool) {
        self.icon = Some(icon.to_string());
        self.is_user_icon = Some(is_user_icon);
    }
}

/// Tree node in the arena.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Child indices in order; None marks a leaf
    pub children: Option<Vec<Index>>,
}

impl TreeNode {
    pub fn id(&self) -> &NodeId {
        &self.data.id
    }

    pub fn is_branch(&self) -> bool {
        self.children.is_some()
    }

    pub fn child_indices(&self) -> &[Index] {
        self.children.as_deref().unwrap_or(&[])
    }
}

/// Result of `find_node_and_parent`.
#[derive(Debug, Clone, Copy)]
pub struct NodeLocation<'a> {
    pub node: &'a TreeNode,
    pub node_index: Index,
    pub parent: Option<&'a TreeNode>,
    pub parent_index: Option<Index>,
    /// Position among the parent's children (or among the roots)
    pub index: usize,
}

/// Ordered forest of rooted trees.
#[derive(Debug, Clone)]
pub struct Forest {
    arena: Arena<TreeNode>,
    roots: Vec<Index>,
    ids: HashMap<NodeId, Index>,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Forest {
    fn eq(&self, other: &Self) -> bool {
        self.to_nodes() == other.to_nodes()
    }
}

impl Forest {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
            ids: HashMap::new(),
        }
    }

    /// Builds a forest from wire nodes, rejecting duplicate ids and
    /// invalid nodes.
    #[instrument(level = "debug", skip(nodes), fields(roots = nodes.len()))]
    pub fn from_nodes(nodes: Vec<NodeSpec>) -> DomainResult<Self> {
        let mut forest = Self::new();
        for spec in &nodes {
            spec.validate()?;
            forest.insert_spec(spec, None, None)?;
        }
        crate::domain::validate::validate_forest(&forest)?;
        debug!("built forest with {} nodes", forest.len());
        Ok(forest)
    }

    /// Exports the forest in wire shape.
    pub fn to_nodes(&self) -> Vec<NodeSpec> {
        self.roots.iter().filter_map(|&idx| self.node_spec(idx)).collect()
    }

    /// Exports the subtree rooted at `idx` in wire shape.
    pub fn node_spec(&self, idx: Index) -> Option<NodeSpec> {
        let node = self.arena.get(idx)?;
        let children = node
            .children
            .as_ref()
            .map(|c| c.iter().filter_map(|&child| self.node_spec(child)).collect());
        Some(NodeSpec {
            id: node.data.id.clone(),
            name: node.data.name.clone(),
            expanded: node.data.expanded,
            icon: node.data.icon.clone(),
            is_user_icon: node.data.is_user_icon,
            children,
            extra: node.data.extra.clone(),
        })
    }

    /// Inserts one node. `position` defaults to appending; it is clamped to
    /// the sibling count. Inserting under a leaf turns it into a branch.
    #[instrument(level = "trace", skip(self, data), fields(id = %data.id))]
    pub fn insert_node(
        &mut self,
        data: NodeData,
        is_branch: bool,
        parent: Option<Index>,
        position: Option<usize>,
    ) -> DomainResult<Index> {
        if self.ids.contains_key(&data.id) {
            return Err(DomainError::DuplicateId(data.id));
        }
        if let Some(parent_idx) = parent {
            if !self.arena.contains(parent_idx) {
                return Err(DomainError::structure(&data.id, "parent is not in the forest"));
            }
        }
        let id = data.id.clone();
        let node = TreeNode {
            data,
            parent,
            children: is_branch.then(Vec::new),
        };
        let node_idx = self.arena.insert(node);

        let siblings = match parent {
            Some(parent_idx) => self
                .arena
                .get_mut(parent_idx)
                .map(|p| p.children.get_or_insert_with(Vec::new)),
            None => Some(&mut self.roots),
        };
        let Some(siblings) = siblings else {
            return Err(DomainError::structure(&id, "parent is not in the forest"));
        };
        let at = position.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(at, node_idx);
        self.ids.insert(id, node_idx);
        Ok(node_idx)
    }

    /// Inserts a whole wire subtree, preserving its shape.
    pub fn insert_spec(
        &mut self,
        spec: &NodeSpec,
        parent: Option<Index>,
        position: Option<usize>,
    ) -> DomainResult<Index> {
        let idx = self.insert_node(NodeData::from_spec(spec), spec.is_branch(), parent, position)?;
        for child in spec.children.iter().flatten() {
            self.insert_spec(child, Some(idx), None)?;
        }
        Ok(idx)
    }

    /// Detaches the node at `idx` and drops it with its whole subtree.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_subtree(&mut self, idx: Index) -> Option<NodeData> {
        let parent = self.arena.get(idx)?.parent;
        let siblings = match parent {
            Some(parent_idx) => self
                .arena
                .get_mut(parent_idx)
                .and_then(|p| p.children.as_mut()),
            None => Some(&mut self.roots),
        };
        if let Some(siblings) = siblings {
            siblings.retain(|&s| s != idx);
        }

        let mut stack = vec![idx];
        let mut removed = None;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current) {
                self.ids.remove(&node.data.id);
                stack.extend(node.child_indices().iter().copied());
                if current == idx {
                    removed = Some(node.data);
                }
            }
        }
        removed
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn index_of(&self, id: &str) -> Option<Index> {
        self.ids.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.index_of(id).and_then(|idx| self.arena.get(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Every id in the forest, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.ids.keys()
    }

    pub(crate) fn id_index(&self) -> &HashMap<NodeId, Index> {
        &self.ids
    }

    pub(crate) fn arena_len(&self) -> usize {
        self.arena.len()
    }

    pub(crate) fn arena_iter(&self) -> impl Iterator<Item = (Index, &TreeNode)> {
        self.arena.iter()
    }

    /// Children of `idx`, empty for leaves and unknown indices.
    pub fn children_of(&self, idx: Index) -> &[Index] {
        self.arena
            .get(idx)
            .map(|n| n.child_indices())
            .unwrap_or(&[])
    }

    /// Sibling list containing `idx` (the parent's children, or the roots).
    pub fn siblings_of(&self, idx: Index) -> &[Index] {
        match self.arena.get(idx).and_then(|n| n.parent) {
            Some(parent_idx) => self.children_of(parent_idx),
            None => &self.roots,
        }
    }

    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator {
        PostOrderIterator::new(self)
    }

    /// Pre-order indices of the subtree below `idx`, excluding `idx`.
    pub fn descendants(&self, idx: Index) -> Vec<Index> {
        let mut out = Vec::new();
        let mut stack: Vec<Index> = self.children_of(idx).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children_of(current).iter().rev().copied());
        }
        out
    }

    /// Ancestor indices of `idx`, immediate parent first.
    pub fn ancestors(&self, idx: Index) -> Vec<Index> {
        let mut out = Vec::new();
        let mut current = self.arena.get(idx).and_then(|n| n.parent);
        while let Some(parent_idx) = current {
            out.push(parent_idx);
            current = self.arena.get(parent_idx).and_then(|n| n.parent);
        }
        out
    }

    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        1 + self
            .children_of(node_idx)
            .iter()
            .map(|&child| self.calculate_depth(child))
            .max()
            .unwrap_or(0)
    }

    /// Ids of nodes without a children key, in render order.
    pub fn leaf_ids(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| !node.is_branch())
            .map(|(_, node)| node.id().clone())
            .collect()
    }

    /// Names along the path root -> `id` (inclusive); empty if absent.
    pub fn path_to(&self, id: &str) -> Vec<String> {
        let Some(idx) = self.index_of(id) else {
            return Vec::new();
        };
        self.ancestors(idx)
            .into_iter()
            .rev()
            .chain(std::iter::once(idx))
            .filter_map(|i| self.arena.get(i).map(|n| n.data.name.clone()))
            .collect()
    }

    /// Locates a node, its parent and its position among its siblings.
    #[instrument(level = "trace", skip(self))]
    pub fn find_node_and_parent(&self, id: &str) -> Option<NodeLocation<'_>> {
        let node_index = self.index_of(id)?;
        let node = self.arena.get(node_index)?;
        let parent_index = node.parent;
        let parent = parent_index.and_then(|p| self.arena.get(p));
        let index = self.siblings_of(node_index).iter().position(|&s| s == node_index)?;
        Some(NodeLocation {
            node,
            node_index,
            parent,
            parent_index,
            index,
        })
    }

    /// Copy of the forest without the given ids and their subtrees.
    #[instrument(level = "debug", skip(self, ids), fields(count = ids.len()))]
    pub fn remove_ids(&self, ids: &HashSet<NodeId>) -> Forest {
        let mut next = self.clone();
        for id in ids {
            if let Some(idx) = next.index_of(id.as_str()) {
                next.remove_subtree(idx);
            }
        }
        next
    }

    /// For every ancestor of `id`, whether it is the last child of its own
    /// parent (roots: last of the root list). Ordered root -> immediate parent.
    #[instrument(level = "trace", skip(self))]
    pub fn build_ancestor_last_map(&self, id: &str) -> Vec<bool> {
        let Some(idx) = self.index_of(id) else {
            trace!("unknown node, no guides");
            return Vec::new();
        };
        let mut flags: Vec<bool> = self
            .ancestors(idx)
            .into_iter()
            .map(|a| self.siblings_of(a).last() == Some(&a))
            .collect();
        flags.reverse();
        flags
    }
}

impl Serialize for Forest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_nodes().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Forest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let nodes = Vec::<NodeSpec>::deserialize(deserializer)?;
        Forest::from_nodes(nodes).map_err(D::Error::custom)
    }
}

/// Pre-order traversal over all roots, left to right.
pub struct TreeIterator<'a> {
    forest: &'a Forest,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(forest: &'a Forest) -> Self {
        let stack = forest.roots.iter().rev().copied().collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.child_indices().iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

/// Post-order traversal: children before their parent.
pub struct PostOrderIterator<'a> {
    forest: &'a Forest,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(forest: &'a Forest) -> Self {
        let stack = forest.roots.iter().rev().map(|&r| (r, false)).collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.child_indices().iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
