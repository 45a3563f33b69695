//! Node id generation and re-identification of subtrees.
//!
//! Ids look like `<prefix>-<base36 suffix>`. The random generator draws its
//! suffix from a v4 UUID; that is probabilistic, not a hard guarantee, so
//! every generator call is checked against ids already taken.

use std::collections::HashSet;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::arena::Forest;
use crate::domain::error::DomainResult;
use crate::domain::schema::{NodeId, NodeSpec};

pub const DEFAULT_ID_PREFIX: &str = "node";

/// 36^9: keeps random suffixes at nine base36 digits.
const RANDOM_SUFFIX_SPACE: u128 = 101_559_956_668_416;

/// Source of fresh node ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> NodeId;
}

/// `<prefix>-<9 random base36 digits>`.
#[derive(Debug, Clone)]
pub struct RandomIdGenerator {
    prefix: String,
}

impl RandomIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PREFIX)
    }
}

impl IdGenerator for RandomIdGenerator {
    fn next_id(&mut self) -> NodeId {
        let value = Uuid::new_v4().as_u128() % RANDOM_SUFFIX_SPACE;
        NodeId::new(format!("{}-{:0>9}", self.prefix, to_base36(value)))
    }
}

/// `<prefix>-<counter in base36>`, monotonic within one generator.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u128,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::starting_at(prefix, 1)
    }

    pub fn starting_at(prefix: impl Into<String>, start: u128) -> Self {
        Self {
            prefix: prefix.into(),
            next: start,
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> NodeId {
        let id = NodeId::new(format!("{}-{}", self.prefix, to_base36(self.next)));
        self.next += 1;
        id
    }
}

pub fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Draws ids until one is not taken.
pub fn fresh_id(ids: &mut dyn IdGenerator, is_taken: impl Fn(&str) -> bool) -> NodeId {
    loop {
        let candidate = ids.next_id();
        if !is_taken(candidate.as_str()) {
            return candidate;
        }
        debug!("id collision on {candidate}, drawing again");
    }
}

/// Deep copy of `spec` with every id (node and descendants) replaced,
/// top-down. New ids avoid `is_taken` and each other.
pub fn assign_new_ids(
    spec: &NodeSpec,
    ids: &mut dyn IdGenerator,
    is_taken: impl Fn(&str) -> bool,
) -> NodeSpec {
    let mut issued = HashSet::new();
    reassign(spec, ids, &is_taken, &mut issued)
}

fn reassign(
    spec: &NodeSpec,
    ids: &mut dyn IdGenerator,
    is_taken: &dyn Fn(&str) -> bool,
    issued: &mut HashSet<NodeId>,
) -> NodeSpec {
    let id = fresh_id(ids, |c| is_taken(c) || issued.contains(c));
    issued.insert(id.clone());
    let children = spec.children.as_ref().map(|children| {
        children
            .iter()
            .map(|child| reassign(child, ids, is_taken, issued))
            .collect()
    });
    NodeSpec {
        id,
        children,
        ..spec.clone()
    }
}

/// Seeds a forest from raw nodes, replacing every id. Input ids may be
/// missing or duplicated; names and extra fields must already be valid.
#[instrument(level = "debug", skip(nodes, ids), fields(roots = nodes.len()))]
pub fn generate_tree_with_ids(nodes: &[NodeSpec], ids: &mut dyn IdGenerator) -> DomainResult<Forest> {
    let mut issued = HashSet::new();
    let seeded = nodes
        .iter()
        .map(|spec| reassign(spec, ids, &|_: &str| false, &mut issued))
        .collect();
    Forest::from_nodes(seeded)
}
