//! Conversion of a forest into a printable `termtree` tree.

use generational_arena::Index;
use termtree::Tree;

use crate::domain::arena::{Forest, TreeNode};

pub trait TreeRender {
    /// Plain rendering with node names and ids.
    fn to_tree_string(&self) -> Tree<String>;

    /// Rendering with a caller-supplied label per node.
    fn to_tree_with(&self, label: &dyn Fn(&TreeNode) -> String) -> Tree<String>;
}

pub fn default_label(node: &TreeNode) -> String {
    let mut label = format!("{} ({})", node.data.name, node.id());
    if let Some(icon) = &node.data.icon {
        label.push_str(&format!(" [{icon}]"));
    }
    label
}

impl TreeRender for Forest {
    fn to_tree_string(&self) -> Tree<String> {
        self.to_tree_with(&default_label)
    }

    fn to_tree_with(&self, label: &dyn Fn(&TreeNode) -> String) -> Tree<String> {
        fn build_tree(forest: &Forest, node_idx: Index, label: &dyn Fn(&TreeNode) -> String) -> Option<Tree<String>> {
            let node = forest.get_node(node_idx)?;
            let leaves: Vec<_> = node
                .child_indices()
                .iter()
                .filter_map(|&child| build_tree(forest, child, label))
                .collect();
            Some(Tree::new(label(node)).with_leaves(leaves))
        }

        let roots: Vec<_> = self
            .roots()
            .iter()
            .filter_map(|&root| build_tree(self, root, label))
            .collect();
        let title = if roots.is_empty() { "(empty tree)" } else { "." };
        Tree::new(title.to_string()).with_leaves(roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::NodeSpec;

    #[test]
    fn given_forest_when_rendering_then_draws_guides() {
        let forest = Forest::from_nodes(vec![
            NodeSpec::branch("a", "A", vec![NodeSpec::leaf("a1", "A1")]),
            NodeSpec::leaf("b", "B"),
        ])
        .unwrap();

        let out = forest.to_tree_string().to_string();

        assert!(out.starts_with(".\n"), "{out}");
        assert!(out.contains("├── A (a)"), "{out}");
        assert!(out.contains("│   └── A1 (a1)"), "{out}");
        assert!(out.contains("└── B (b)"), "{out}");
    }

    #[test]
    fn given_empty_forest_when_rendering_then_says_so() {
        assert_eq!(Forest::new().to_tree_string().to_string().trim(), "(empty tree)");
    }
}
