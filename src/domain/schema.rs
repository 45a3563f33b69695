//! Node schema: identifiers, the serializable node shape and field rules.
//!
//! `NodeSpec` is the interchange format: a JSON array of root nodes, each
//! optionally carrying nested `children`. Unknown keys are kept in `extra`
//! and written back unchanged.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::{DomainError, DomainResult, ValidationIssue};

/// Maximum node name length, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Keys owned by the schema; custom props must not shadow them.
pub const RESERVED_KEYS: [&str; 6] = ["id", "name", "expanded", "icon", "isUserIcon", "children"];

/// Free-form per-node metadata.
pub type CustomProps = Map<String, Value>;

/// Identifier of a node, unique across a forest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Wire shape of one tree entry.
///
/// `children: None` marks a leaf, `Some(vec![])` an empty branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    /// Missing ids deserialize as empty and fail validation unless the
    /// document is seeded with fresh ids first.
    #[serde(default)]
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_user_icon: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeSpec>>,
    #[serde(flatten)]
    pub extra: CustomProps,
}

impl NodeSpec {
    pub fn leaf(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            expanded: None,
            icon: None,
            is_user_icon: None,
            children: None,
            extra: CustomProps::new(),
        }
    }

    pub fn branch(id: impl Into<NodeId>, name: impl Into<String>, children: Vec<NodeSpec>) -> Self {
        Self {
            children: Some(children),
            ..Self::leaf(id, name)
        }
    }

    pub fn is_branch(&self) -> bool {
        self.children.is_some()
    }

    /// Ids of this node and all its descendants, pre-order.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut out = vec![self.id.clone()];
        for child in self.children.iter().flatten() {
            out.extend(child.ids());
        }
        out
    }

    /// Recursively checks field rules on this node and its descendants.
    pub fn validate(&self) -> DomainResult<()> {
        check_id(&self.id)?;
        check_name(&self.id, &self.name)?;
        check_extra(&self.id, &self.extra)?;
        for child in self.children.iter().flatten() {
            child.validate()?;
        }
        Ok(())
    }
}

pub(crate) fn check_id(id: &NodeId) -> DomainResult<()> {
    let raw = id.as_str();
    if raw.is_empty() {
        return Err(DomainError::invalid(id, ValidationIssue::EmptyId));
    }
    if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(DomainError::invalid(id, ValidationIssue::MalformedId));
    }
    Ok(())
}

pub(crate) fn check_name(id: &NodeId, name: &str) -> DomainResult<()> {
    let len = name.chars().count();
    if len == 0 {
        return Err(DomainError::invalid(id, ValidationIssue::EmptyName));
    }
    if len > MAX_NAME_LEN {
        return Err(DomainError::invalid(
            id,
            ValidationIssue::NameTooLong {
                len,
                max: MAX_NAME_LEN,
            },
        ));
    }
    Ok(())
}

pub(crate) fn check_extra(id: &NodeId, extra: &CustomProps) -> DomainResult<()> {
    match extra.keys().find(|k| RESERVED_KEYS.contains(&k.as_str())) {
        Some(key) => Err(DomainError::invalid(
            id,
            ValidationIssue::ReservedProperty(key.clone()),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_json_with_unknown_keys_when_deserializing_then_keeps_them_in_extra() {
        let raw = json!({
            "id": "a",
            "name": "A",
            "department": "sales",
            "headcount": 4,
            "children": [{"id": "a1", "name": "A1", "isUserIcon": true, "icon": "star"}]
        });

        let spec: NodeSpec = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(spec.extra.get("department"), Some(&json!("sales")));
        assert_eq!(spec.extra.get("headcount"), Some(&json!(4)));
        let child = &spec.children.as_ref().unwrap()[0];
        assert_eq!(child.icon.as_deref(), Some("star"));
        assert_eq!(child.is_user_icon, Some(true));
        assert!(!child.is_branch());
        assert_eq!(serde_json::to_value(&spec).unwrap(), raw);
    }

    #[test]
    fn given_empty_children_when_serializing_then_keeps_branch_marker() {
        let spec = NodeSpec::branch("a", "A", vec![]);
        let out = serde_json::to_string(&spec).unwrap();
        assert_eq!(out, r#"{"id":"a","name":"A","children":[]}"#);
    }

    #[test]
    fn given_name_of_101_chars_when_validating_then_reports_too_long() {
        let spec = NodeSpec::leaf("a", "x".repeat(101));
        let err = spec.validate().unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation {
                node: NodeId::from("a"),
                issue: ValidationIssue::NameTooLong { len: 101, max: 100 },
            }
        );
    }

    #[test]
    fn given_multibyte_name_of_100_chars_when_validating_then_accepts() {
        let spec = NodeSpec::leaf("a", "ü".repeat(100));
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn given_bad_child_when_validating_then_reports_child_id() {
        let spec = NodeSpec::branch("a", "A", vec![NodeSpec::leaf("a1", "")]);
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("'a1'"), "{err}");
    }

    #[test]
    fn given_malformed_ids_when_validating_then_rejects() {
        assert!(NodeSpec::leaf("", "A").validate().is_err());
        assert!(NodeSpec::leaf("a b", "A").validate().is_err());
        assert!(NodeSpec::leaf("node-1x9z", "A").validate().is_ok());
    }

    #[test]
    fn given_reserved_key_in_extra_when_validating_then_rejects() {
        let mut spec = NodeSpec::leaf("a", "A");
        spec.extra.insert("children".into(), json!([]));
        assert!(matches!(
            spec.validate(),
            Err(DomainError::Validation {
                issue: ValidationIssue::ReservedProperty(_),
                ..
            })
        ));
    }
}
