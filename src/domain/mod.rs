//! Domain layer: the tree engine
//!
//! Pure functions over an in-memory forest. No I/O, no config loading.

pub mod arena;
pub mod error;
pub mod filter;
pub mod icon;
pub mod identity;
pub mod mutation;
pub mod render;
pub mod schema;
pub mod selection;
pub mod validate;

pub use arena::{Forest, NodeData, NodeLocation, TreeNode};
pub use error::{DomainError, DomainResult, ValidationIssue};
pub use filter::filter_tree;
pub use icon::{CascadeDecision, IconChoice, IconPicker};
pub use identity::{
    assign_new_ids, generate_tree_with_ids, IdGenerator, RandomIdGenerator, SequentialIdGenerator,
};
pub use mutation::{
    add_child_node, add_sibling_node, delete_node, duplicate_node, set_all_expanded, set_expanded,
    update_all_children_icons, update_all_nodes_icons, update_all_parent_icons,
    update_node_custom_props, update_node_icon, update_node_name,
};
pub use render::TreeRender;
pub use schema::{CustomProps, NodeId, NodeSpec, MAX_NAME_LEN};
pub use selection::{
    collect_ancestors, collect_descendants, get_selection_state, select_with_ancestors,
    select_with_descendants, toggle_node_selection, CheckState, SelectedIds, SelectionPolicy,
    SelectionState,
};
pub use validate::validate_forest;
