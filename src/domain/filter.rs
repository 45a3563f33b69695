//! Structure-preserving search.

use std::borrow::Cow;
use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::domain::arena::Forest;

/// Keeps nodes whose name contains `term` (case-insensitive) plus every
/// ancestor of such a node. Children that neither match nor lead to a match
/// are dropped. A blank term returns the input itself; any other term is
/// matched as given, surrounding whitespace included.
#[instrument(level = "debug", skip(tree), fields(nodes = tree.len()))]
pub fn filter_tree<'a>(tree: &'a Forest, term: &str) -> Cow<'a, Forest> {
    if term.trim().is_empty() {
        return Cow::Borrowed(tree);
    }
    let needle = term.to_lowercase();

    let mut kept = HashSet::new();
    for (idx, node) in tree.iter_postorder() {
        let matches = node.data.name.to_lowercase().contains(&needle);
        let leads_to_match = node.child_indices().iter().any(|c| kept.contains(c));
        if matches || leads_to_match {
            kept.insert(idx);
        }
    }

    // kept is closed under parents, so pruning the topmost dropped nodes is enough
    let dropped: Vec<_> = tree
        .iter()
        .filter(|(idx, node)| {
            !kept.contains(idx) && node.parent.map_or(true, |p| kept.contains(&p))
        })
        .map(|(idx, _)| idx)
        .collect();

    let mut next = tree.clone();
    for idx in dropped {
        next.remove_subtree(idx);
    }
    debug!("filter '{}' kept {} of {} nodes", needle, next.len(), tree.len());
    Cow::Owned(next)
}
