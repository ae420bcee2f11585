//! `set` style command listing
//!
//! Each leaf becomes one command made of the tags leading to it, the `name`
//! attribute of every named element on the way and the leaf text:
//!
//! ```text
//! set deviceconfig system hostname fw01
//! set rulebase security rules "allow dns" action allow
//! ```
//!
//! `entry` and `member` elements add no token of their own. With member
//! lists enabled, an element holding several `member` children is written as
//! a single `[ a b c ]` command.

use std::borrow::Cow;

use tracing::trace;

use crate::render::LIST_ITEM_TAGS;
use crate::xml::model::Node;

/// Commands of a selection, `None` when `nodes` is empty
pub fn to_commands(nodes: &[&Node], prefix: &str, member_list: bool) -> Option<Vec<String>> {
    if nodes.is_empty() {
        return None;
    }
    let mut commands = Vec::new();
    for node in nodes {
        walk(node, format!("{prefix}{}", node.tag), member_list, &mut commands);
    }
    Some(commands)
}

/// Wrap `s` in double quotes when it contains a space; embedded quotes are not escaped
pub fn quote_space(s: &str) -> Cow<'_, str> {
    if s.contains(' ') {
        Cow::Owned(format!("\"{s}\""))
    } else {
        Cow::Borrowed(s)
    }
}

fn walk(node: &Node, mut path: String, member_list: bool, commands: &mut Vec<String>) {
    if let Some(name) = node.attribute("name") {
        path.push(' ');
        path.push_str(&quote_space(name));
    }

    if member_list {
        let members: Vec<&Node> = node.children_named("member").collect();
        trace!(tag = %node.tag, members = members.len(), "command node");
        if members.len() > 1 {
            let items: Vec<Cow<'_, str>> = members
                .iter()
                .map(|member| quote_space(member.stripped_text().unwrap_or_default()))
                .collect();
            path.push_str(" [ ");
            path.push_str(&items.join(" "));
            path.push_str(" ]");
            commands.push(path);
            return;
        }
    }

    if !node.has_children() {
        if let Some(text) = node.stripped_text() {
            path.push(' ');
            path.push_str(&quote_space(text));
        }
        commands.push(path);
        return;
    }

    for child in &node.children {
        let child_path = if LIST_ITEM_TAGS.contains(&child.tag.as_str()) {
            path.clone()
        } else {
            format!("{path} {}", child.tag)
        };
        walk(child, child_path, member_list, commands);
    }
}
