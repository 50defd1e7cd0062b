use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Classification of one tree change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffKind {
    /// Present only in the desired tree.
    #[serde(rename = "N")]
    New,
    /// Present only in the current tree.
    #[serde(rename = "D")]
    Deleted,
    /// Present in both with a different scalar value.
    #[serde(rename = "E")]
    Edited,
    /// An array value changed.
    #[serde(rename = "A")]
    Array,
}

impl Display for DiffKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let tag = match self {
            DiffKind::New => "N",
            DiffKind::Deleted => "D",
            DiffKind::Edited => "E",
            DiffKind::Array => "A",
        };
        f.write_str(tag)
    }
}

/// A single change between the current (left) and desired (right) tree.
///
/// `path[0]` is the resource path; deeper segments address a nested property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffEntry {
    pub kind: DiffKind,
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lhs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhs: Option<Value>,
    /// Resource type used for delete dispatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lhs_command: Option<String>,
    /// Resource type used for create dispatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhs_command: Option<String>,
}

impl DiffEntry {
    pub fn new(kind: DiffKind, path: Vec<String>) -> Self {
        Self {
            kind,
            path,
            lhs: None,
            rhs: None,
            lhs_command: None,
            rhs_command: None,
        }
    }

    /// The resource path this entry belongs to.
    pub fn resource(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }

    /// True when the change addresses a property below the resource itself.
    pub fn is_nested(&self) -> bool {
        self.path.len() > 1
    }

    /// True when any path segment equals `segment`.
    pub fn touches(&self, segment: &str) -> bool {
        self.path.iter().skip(1).any(|s| s == segment)
    }

    /// Path rendered with `/`-separated property segments after the resource.
    pub fn display_path(&self) -> String {
        let mut out = self.path.first().cloned().unwrap_or_default();
        for segment in self.path.iter().skip(1) {
            out.push_str(" > ");
            out.push_str(segment);
        }
        out
    }
}
