//! Structure-preserving search.

use std::borrow::Cow;

use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

use formtree::domain::{filter_tree, Forest, NodeSpec, TreeRender};

#[fixture]
fn catalog() -> Forest {
    Forest::from_nodes(vec![
        NodeSpec::branch(
            "fruit",
            "Fruit",
            vec![
                NodeSpec::leaf("apple", "Apple"),
                NodeSpec::branch("citrus", "Citrus", vec![NodeSpec::leaf("lemon", "Lemon")]),
            ],
        ),
        NodeSpec::branch("veg", "Vegetables", vec![NodeSpec::leaf("leek", "Leek")]),
    ])
    .unwrap()
}

fn kept(tree: &Forest) -> Vec<String> {
    tree.iter().map(|(_, n)| n.id().to_string()).collect()
}

#[rstest]
fn given_empty_term_when_filtering_then_identity(catalog: Forest) {
    let out = filter_tree(&catalog, "");
    assert!(matches!(out, Cow::Borrowed(_)));
    assert_eq!(*out, catalog);
}

#[rstest]
#[case("lemon", &["fruit", "citrus", "lemon"])]
#[case("LE", &["fruit", "apple", "citrus", "lemon", "veg", "leek"])]
#[case("  leek ", &[])]
#[case("leek", &["veg", "leek"])]
#[case("citrus", &["fruit", "citrus"])]
#[case("kiwi", &[])]
fn given_term_when_filtering_then_keeps_matches_and_ancestors(
    catalog: Forest,
    #[case] term: &str,
    #[case] expected: &[&str],
) {
    assert_eq!(kept(&filter_tree(&catalog, term)), expected);
}

#[rstest]
fn given_filtered_tree_when_rendering_then_only_path_drawn(catalog: Forest) {
    let out = filter_tree(&catalog, "lemon").to_tree_string().to_string();
    assert!(out.contains("Lemon (lemon)"), "{out}");
    assert!(!out.contains("Apple"), "{out}");
    assert!(!out.contains("Vegetables"), "{out}");
}

#[rstest]
fn given_filter_when_done_then_input_untouched(catalog: Forest) {
    let before = catalog.clone();
    let _ = filter_tree(&catalog, "apple");
    assert_eq!(catalog, before);
}
