//! Tree builder: the nested tagged YAML emitted in full-tree mode to [`TreeNode`]s.
//!
//! An element is a leaf iff it is exactly `{Token, Line}`; otherwise it must be a map with a
//! single key naming the production, whose value is the list of children.

use log::debug;
use serde_yaml::{Mapping, Value};

use crate::defs::{dump, scalar_text, FILE_NAME_KEY};
use crate::model::{Leaf, TreeElement, TreeNode};
use crate::{Error, FileTree, Result};

pub const SYNTAX_TREE_KEY: &str = "syntax_tree";
pub const TOKEN_KEY: &str = "Token";
pub const LINE_KEY: &str = "Line";

/// Build the syntax tree of every file entry (`{file_name, syntax_tree}`) in order.
pub fn build_batch(entries: &[Value]) -> Result<Vec<FileTree>> {
    entries.iter().map(build_file).collect()
}

pub fn build_file(entry: &Value) -> Result<FileTree> {
    let mapping = entry.as_mapping().ok_or_else(|| {
        Error::malformed_tree(format!("expected a file entry, found:\n{}", dump(entry)))
    })?;
    let file_name = mapping
        .get(FILE_NAME_KEY)
        .and_then(scalar_text)
        .ok_or_else(|| {
            Error::malformed_tree(format!("file entry without {FILE_NAME_KEY}:\n{}", dump(entry)))
        })?;

    let roots = build_roots(mapping.get(SYNTAX_TREE_KEY).unwrap_or(&Value::Null))?;
    debug!("{}: {} root(s)", file_name, roots.len());
    Ok(FileTree { file_name, roots })
}

/// Build the top level of a tree. Leaves are not allowed at the root.
pub fn build_roots(value: &Value) -> Result<Vec<TreeNode>> {
    build_children(value)?
        .into_iter()
        .map(|element| match element {
            TreeElement::Node(node) => Ok(node),
            TreeElement::Leaf(leaf) => Err(Error::malformed_tree(format!(
                "token {:?} at line {} outside of any node",
                leaf.text, leaf.line
            ))),
        })
        .collect()
}

/// Build a list of children. `null` is an empty list.
pub fn build_children(value: &Value) -> Result<Vec<TreeElement>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(elements) => elements.iter().map(build_element).collect(),
        other => Err(Error::malformed_tree(format!(
            "expected a list of children, found:\n{}",
            dump(other)
        ))),
    }
}

pub fn build_element(value: &Value) -> Result<TreeElement> {
    let mapping = value.as_mapping().ok_or_else(|| {
        Error::malformed_tree(format!("expected a dictionary, found:\n{}", dump(value)))
    })?;

    if is_leaf(mapping) {
        return build_leaf(mapping, value).map(TreeElement::Leaf);
    }

    let mut entries = mapping.iter();
    match (entries.next(), entries.next()) {
        (Some((tag, children)), None) => {
            let tag = scalar_text(tag).ok_or_else(|| {
                Error::malformed_tree(format!("expected a tag name, found:\n{}", dump(value)))
            })?;
            Ok(TreeElement::Node(TreeNode::new(tag, build_children(children)?)))
        }
        _ => Err(Error::malformed_tree(format!(
            "expected dictionary of length 1, found:\n{}",
            dump(value)
        ))),
    }
}

fn is_leaf(mapping: &Mapping) -> bool {
    mapping.len() == 2 && mapping.contains_key(TOKEN_KEY) && mapping.contains_key(LINE_KEY)
}

fn build_leaf(mapping: &Mapping, value: &Value) -> Result<Leaf> {
    let text = mapping.get(TOKEN_KEY).and_then(scalar_text).ok_or_else(|| {
        Error::malformed_tree(format!("expected token text, found:\n{}", dump(value)))
    })?;
    // Lines are 1-based.
    let line = mapping
        .get(LINE_KEY)
        .and_then(Value::as_u64)
        .filter(|line| *line > 0)
        .ok_or_else(|| {
            Error::malformed_tree(format!("expected a line number, found:\n{}", dump(value)))
        })?;
    Ok(Leaf::new(text, line))
}
