//! The specification tree and its JSON interchange form.
//!
//! The tree is written to disk between the generate and upload phases so
//! that a failed upload can be retried without generating again. The JSON
//! keys are `title`, `type`, `content` and `children`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{PreconditionError, SourceError};

/// One entry of the specification tree: a section, a page, or a type entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecNode {
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentPayload>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<SpecNode>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<SpecNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<SpecNode>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Informational node tag. It never changes how a node is materialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The spelling the generator emits for every node.
    #[default]
    Page,
    Container,
    Leaf,
    /// Any other tag; kept readable rather than rejecting the tree.
    #[serde(other)]
    Other,
}

/// Structured body of a page. Every field is optional; absent fields
/// produce no rendered section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<Argument>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Field>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ContentPayload {
    /// True when no field would render anything.
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.arguments.as_ref().map_or(true, Vec::is_empty)
            && self.returns.is_none()
            && self.security.as_ref().map_or(true, Vec::is_empty)
            && self.example.is_none()
            && self.fields.as_ref().map_or(true, Vec::is_empty)
            && self.description.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub description: String,
}

impl SpecNode {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: NodeKind::default(),
            content: None,
            children: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: ContentPayload) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_children(mut self, children: Vec<SpecNode>) -> Self {
        self.children = children;
        self
    }

    /// Number of nodes in this subtree, including this one.
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(SpecNode::subtree_size).sum::<usize>()
    }

    /// Checks the shape invariants that serde cannot: every title is non-empty.
    pub fn validate(&self) -> Result<(), String> {
        fn walk(node: &SpecNode, path: &mut Vec<String>) -> Result<(), String> {
            if node.title.trim().is_empty() {
                let location = if path.is_empty() {
                    "the root node".to_string()
                } else {
                    format!("a child of {}", path.join(" / "))
                };
                return Err(format!("{location} has an empty title"));
            }
            path.push(node.title.clone());
            for child in &node.children {
                walk(child, path)?;
            }
            path.pop();
            Ok(())
        }
        walk(self, &mut Vec::new())
    }

    /// Indented outline of all titles, one per line.
    pub fn outline(&self) -> String {
        fn walk(node: &SpecNode, depth: usize, out: &mut String) {
            if depth == 0 {
                out.push_str(&node.title);
            } else {
                out.push_str(&"    ".repeat(depth - 1));
                out.push_str("└── ");
                out.push_str(&node.title);
            }
            out.push('\n');
            for child in &node.children {
                walk(child, depth + 1, out);
            }
        }
        let mut out = String::new();
        walk(self, 0, &mut out);
        out
    }
}

/// Reads and validates the intermediate tree file.
pub fn load_tree(path: &Path) -> Result<SpecNode, PreconditionError> {
    if !path.exists() {
        return Err(PreconditionError::MissingTree(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| PreconditionError::UnreadableTree {
        path: path.to_path_buf(),
        source,
    })?;
    let tree: SpecNode =
        serde_json::from_str(&text).map_err(|source| PreconditionError::MalformedTree {
            path: path.to_path_buf(),
            source,
        })?;
    tree.validate()
        .map_err(|reason| PreconditionError::InvalidTree {
            path: path.to_path_buf(),
            reason,
        })?;
    info!(
        path = %path.display(),
        title = %tree.title,
        nodes = tree.subtree_size(),
        "Loaded specification tree"
    );
    Ok(tree)
}

/// Writes the tree as pretty-printed JSON, creating parent directories.
pub fn save_tree(path: &Path, tree: &SpecNode) -> Result<(), SourceError> {
    let write_err = |source| SourceError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let json = serde_json::to_string_pretty(tree).map_err(SourceError::Serialize)?;
    fs::write(path, json).map_err(write_err)?;
    debug!(path = %path.display(), "Wrote specification tree");
    Ok(())
}
