//! Flat path listing
//!
//! Each element contributes its path, with its text when it has any:
//!
//! ```text
//! /config/devices/entry[@name='localhost.localdomain']
//! /config/devices/entry[@name='localhost.localdomain']/deviceconfig/system/hostname="fw01"
//! ```
//!
//! Multi-line text produces one numbered entry per line. Attribute
//! predicates are appended to the running path and inherited by the children.
//! Quotes inside values are written as-is.

use tracing::trace;

use crate::xml::model::Node;

/// Paths of a selection, `None` when `nodes` is empty
pub fn to_paths(nodes: &[&Node], prefix: &str) -> Option<Vec<String>> {
    if nodes.is_empty() {
        return None;
    }
    let mut paths = Vec::new();
    for node in nodes {
        walk(node, format!("{prefix}{}", node.tag), &mut paths);
    }
    Some(paths)
}

fn walk(node: &Node, mut path: String, paths: &mut Vec<String>) {
    trace!(tag = %node.tag, children = node.children.len(), %path, "flat node");

    match (node.stripped_text(), &node.text) {
        (Some(_), Some(text)) => {
            let lines: Vec<&str> = text.lines().collect();
            if lines.len() > 1 {
                for (n, line) in lines.iter().enumerate() {
                    paths.push(format!("{path}[{}]=\"{line}\"", n + 1));
                }
            } else {
                paths.push(format!("{path}=\"{text}\""));
            }
        }
        _ => paths.push(path.clone()),
    }

    for (name, value) in &node.attributes {
        path.push_str(&format!("[@{name}='{value}']"));
        paths.push(path.clone());
    }

    for child in &node.children {
        walk(child, format!("{path}/{}", child.tag), paths);
    }
}
