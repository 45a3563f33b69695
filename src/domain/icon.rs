//! Two-step icon assignment: pick an icon for a node, then decide whether
//! it cascades.
//!
//! `Idle -> IconPicked -> Idle`. Cascading from a leaf recolours every
//! child node of the forest, cascading from a branch recolours every
//! branch. A single apply touches only the target; dismissing applies
//! nothing.

use tracing::{debug, instrument};

use crate::domain::arena::Forest;
use crate::domain::error::DomainResult;
use crate::domain::mutation::{update_all_children_icons, update_all_parent_icons, update_node_icon};
use crate::domain::schema::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconChoice {
    pub icon: String,
    pub is_user_icon: bool,
}

impl IconChoice {
    pub fn new(icon: impl Into<String>, is_user_icon: bool) -> Self {
        Self {
            icon: icon.into(),
            is_user_icon,
        }
    }
}

/// Answer to the "apply to all?" confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeDecision {
    Cascade,
    Single,
    Dismiss,
}

impl From<Option<bool>> for CascadeDecision {
    /// `Some(true)` = confirm, `Some(false)` = cancel, `None` = dialog dismissed.
    fn from(answer: Option<bool>) -> Self {
        match answer {
            Some(true) => CascadeDecision::Cascade,
            Some(false) => CascadeDecision::Single,
            None => CascadeDecision::Dismiss,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IconPicker {
    #[default]
    Idle,
    IconPicked { choice: IconChoice, target: NodeId },
}

impl IconPicker {
    /// Records a pending choice, replacing any earlier one.
    pub fn pick(&mut self, target: impl Into<NodeId>, choice: IconChoice) {
        *self = IconPicker::IconPicked {
            choice,
            target: target.into(),
        };
    }

    pub fn pending(&self) -> Option<(&NodeId, &IconChoice)> {
        match self {
            IconPicker::Idle => None,
            IconPicker::IconPicked { choice, target } => Some((target, choice)),
        }
    }

    /// Applies the decision to `tree` and returns to `Idle`. With nothing
    /// pending, or on `Dismiss`, the result equals the input.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn resolve(&mut self, tree: &Forest, decision: CascadeDecision) -> DomainResult<Forest> {
        let IconPicker::IconPicked { choice, target } = std::mem::take(self) else {
            debug!("no icon pending");
            return Ok(tree.clone());
        };
        let IconChoice { icon, is_user_icon } = choice;

        match decision {
            CascadeDecision::Dismiss => Ok(tree.clone()),
            CascadeDecision::Single => update_node_icon(tree, target.as_str(), &icon, is_user_icon),
            CascadeDecision::Cascade => {
                let Some(node) = tree.get(target.as_str()) else {
                    debug!("icon target {target} vanished");
                    return Ok(tree.clone());
                };
                let is_branch = node.is_branch();
                let own = update_node_icon(tree, target.as_str(), &icon, is_user_icon)?;
                if is_branch {
                    update_all_parent_icons(&own, &icon, is_user_icon)
                } else {
                    update_all_children_icons(&own, &icon, is_user_icon)
                }
            }
        }
    }
}
