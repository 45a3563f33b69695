//! Invariants that must hold for arbitrary trees.

use std::collections::HashSet;

use proptest::prelude::*;

use formtree::domain::{
    add_child_node, add_sibling_node, delete_node, duplicate_node, filter_tree, generate_tree_with_ids,
    validate_forest, Forest, NodeId, NodeSpec, SequentialIdGenerator,
};

fn name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,11}"
}

/// Id-less node shapes; ids are assigned by the engine.
fn shape() -> impl Strategy<Value = NodeSpec> {
    let leaf = name().prop_map(|n| NodeSpec::leaf("", n));
    leaf.prop_recursive(4, 40, 5, |inner| {
        (name(), prop::collection::vec(inner, 0..5)).prop_map(|(n, children)| NodeSpec::branch("", n, children))
    })
}

fn forest_shape() -> impl Strategy<Value = Vec<NodeSpec>> {
    prop::collection::vec(shape(), 1..4)
}

fn seeded(nodes: &[NodeSpec]) -> Forest {
    generate_tree_with_ids(nodes, &mut SequentialIdGenerator::new("p")).unwrap()
}

fn strip_ids(nodes: &[NodeSpec]) -> Vec<NodeSpec> {
    nodes
        .iter()
        .map(|n| NodeSpec {
            id: NodeId::default(),
            children: n.children.as_deref().map(strip_ids),
            ..n.clone()
        })
        .collect()
}

fn all_ids_unique(tree: &Forest) -> bool {
    let mut seen = HashSet::new();
    tree.iter().all(|(_, n)| seen.insert(n.id().clone()))
}

proptest! {
    #[test]
    fn seeded_tree_validates_and_keeps_shape(nodes in forest_shape()) {
        let tree = seeded(&nodes);
        prop_assert!(validate_forest(&tree).is_ok());
        prop_assert_eq!(strip_ids(&tree.to_nodes()), nodes);
    }

    #[test]
    fn empty_filter_is_identity(nodes in forest_shape()) {
        let tree = seeded(&nodes);
        let filtered = filter_tree(&tree, "");
        prop_assert_eq!(&*filtered, &tree);
    }

    #[test]
    fn mutations_keep_ids_unique(nodes in forest_shape(), pick in any::<prop::sample::Index>()) {
        let tree = seeded(&nodes);
        let all: Vec<NodeId> = tree.ids().cloned().collect();
        let target = pick.get(&all).as_str();
        let mut ids = SequentialIdGenerator::new("p");

        for next in [
            add_child_node(&tree, target, "child", &mut ids).unwrap(),
            add_sibling_node(&tree, target, "sibling", false, &mut ids).unwrap(),
            duplicate_node(&tree, target, &mut ids).unwrap(),
        ] {
            prop_assert!(validate_forest(&next).is_ok());
            prop_assert!(all_ids_unique(&next));
            prop_assert!(next.len() > tree.len());
        }
    }

    #[test]
    fn delete_removes_whole_subtree(nodes in forest_shape(), pick in any::<prop::sample::Index>()) {
        let tree = seeded(&nodes);
        let all: Vec<NodeId> = tree.ids().cloned().collect();
        let target = pick.get(&all).clone();
        let idx = tree.index_of(target.as_str()).unwrap();
        let gone: Vec<NodeId> = std::iter::once(idx)
            .chain(tree.descendants(idx))
            .map(|i| tree.get_node(i).unwrap().id().clone())
            .collect();

        let next = delete_node(&tree, target.as_str()).unwrap();

        prop_assert_eq!(next.len(), tree.len() - gone.len());
        for id in &gone {
            prop_assert!(!next.contains(id.as_str()));
        }
    }
}
