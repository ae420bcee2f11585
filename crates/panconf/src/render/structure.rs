//! Nested key/value projection
//!
//! Every element becomes a key named after its tag. Leaves without attributes
//! collapse to scalars, everything else becomes an object holding the
//! attributes, the element's own text (under its tag) and its children.
//! A child tag is rendered as a list when the [`Forcelist`] names it or when
//! it occurs more than once among its siblings.

use std::collections::HashMap;

use tracing::trace;

use crate::render::Forcelist;
use crate::value::{Object, Value};
use crate::xml::model::Node;

/// Structure of a selection, `None` when `nodes` is empty.
///
/// A single node yields `{tag: value}`. Several nodes yield
/// `{tag: {tag: value}}` per node; nodes sharing a tag overwrite each other,
/// the last one wins.
pub fn to_value(nodes: &[&Node], forcelist: &Forcelist) -> Option<Value> {
    match nodes {
        [] => None,
        [node] => Some(Value::Object(single(node, forcelist))),
        _ => {
            let mut object = Object::new();
            for node in nodes {
                object.insert(node.tag.clone(), single(node, forcelist));
            }
            Some(Value::Object(object))
        }
    }
}

/// Coerce leaf text: `yes` and `no` (ignoring surrounding whitespace) become
/// booleans, anything else is kept verbatim
pub fn coerce(text: &str) -> Value {
    match text.trim() {
        "yes" => Value::Bool(true),
        "no" => Value::Bool(false),
        _ => Value::String(text.to_string()),
    }
}

fn single(node: &Node, forcelist: &Forcelist) -> Object {
    let mut object = Object::new();
    object.insert(node.tag.clone(), node_value(node, forcelist));
    object
}

/// Value of one element, without its key
pub fn node_value(node: &Node, forcelist: &Forcelist) -> Value {
    if !node.has_children() && node.attributes.is_empty() {
        return match (node.stripped_text(), &node.text) {
            (Some(_), Some(text)) => coerce(text),
            _ => Value::Null,
        };
    }

    let mut object = Object::new();
    for (name, value) in &node.attributes {
        object.insert(name.clone(), value.as_str());
    }
    if let (Some(_), Some(text)) = (node.stripped_text(), &node.text) {
        object.insert(node.tag.clone(), text.as_str());
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for child in &node.children {
        *counts.entry(child.tag.as_str()).or_default() += 1;
    }

    for child in &node.children {
        let repeated = counts.get(child.tag.as_str()).is_some_and(|&n| n > 1);
        let forced = repeated || forcelist.contains(&child.tag);
        trace!(tag = %child.tag, forced, "structure node");

        let value = node_value(child, forcelist);
        if forced {
            object.push_to(&child.tag, value);
        } else {
            object.insert(child.tag.clone(), value);
        }
    }

    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Array;

    fn structure(node: &Node) -> Option<Value> {
        to_value(&[node], &Forcelist::default())
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce("yes"), Value::Bool(true));
        assert_eq!(coerce(" no\n"), Value::Bool(false));
        assert_eq!(coerce("Yes"), Value::from("Yes"));
        assert_eq!(coerce(" fw01 "), Value::from(" fw01 "));
    }

    #[test]
    fn test_empty_leaf_is_null() {
        let node = Node::new("disabled");
        assert_eq!(
            structure(&node).and_then(|v| v.pointer(["disabled"]).cloned()),
            Some(Value::Null)
        );
    }

    #[test]
    fn test_scalar_leaf_child() {
        let node = Node::new("system")
            .with_child(Node::new("hostname").with_text("fw01"))
            .with_child(Node::new("dns-enabled").with_text("yes"));
        let value = structure(&node);
        let system = value.as_ref().and_then(|v| v.pointer(["system"]));
        assert_eq!(
            system.and_then(|s| s.pointer(["hostname"])),
            Some(&Value::from("fw01"))
        );
        assert_eq!(
            system.and_then(|s| s.pointer(["dns-enabled"])),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn test_forcelisted_tag_is_list_even_alone() {
        let node = Node::new("vsys").with_child(Node::new("entry").with_attribute("name", "vsys1"));
        let value = structure(&node);
        let entries = value
            .as_ref()
            .and_then(|v| v.pointer(["vsys", "entry"]))
            .and_then(Value::as_array);
        assert_eq!(entries.map(Array::len), Some(1));
        assert_eq!(
            entries
                .and_then(|e| e.get(0))
                .and_then(|e| e.pointer(["name"])),
            Some(&Value::from("vsys1"))
        );
    }

    #[test]
    fn test_repeated_sibling_becomes_list() {
        let node = Node::new("servers")
            .with_child(Node::new("server").with_text("10.0.0.1"))
            .with_child(Node::new("server").with_text("10.0.0.2"))
            .with_child(Node::new("port").with_text("53"));
        let value = structure(&node);
        assert_eq!(
            value.as_ref().and_then(|v| v.pointer(["servers", "server"])),
            Some(&Value::from(vec![
                Value::from("10.0.0.1"),
                Value::from("10.0.0.2")
            ]))
        );
        assert_eq!(
            value.as_ref().and_then(|v| v.pointer(["servers", "port"])),
            Some(&Value::from("53"))
        );
    }

    #[test]
    fn test_forcelisted_scalars_are_coerced() {
        let node = Node::new("flags")
            .with_child(Node::new("member").with_text("yes"))
            .with_child(Node::new("member"));
        assert_eq!(
            structure(&node).and_then(|v| v.pointer(["flags", "member"]).cloned()),
            Some(Value::from(vec![Value::Bool(true), Value::Null]))
        );
    }

    #[test]
    fn test_attributes_and_own_text() {
        let node = Node::new("description")
            .with_attribute("lang", "en")
            .with_text("  edge firewall ");
        let expected: Object = [
            ("lang".to_string(), Value::from("en")),
            ("description".to_string(), Value::from("  edge firewall ")),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            structure(&node).and_then(|v| v.pointer(["description"]).cloned()),
            Some(Value::Object(expected))
        );
    }

    #[test]
    fn test_custom_forcelist() {
        let node = Node::new("vsys").with_child(Node::new("entry"));
        let value = to_value(&[&node], &Forcelist::none());
        assert_eq!(
            value.and_then(|v| v.pointer(["vsys", "entry"]).cloned()),
            Some(Value::Null)
        );

        let node = Node::new("dns").with_child(Node::new("server").with_text("1.1.1.1"));
        let value = to_value(&[&node], &Forcelist::new(["server"]));
        assert!(value
            .as_ref()
            .and_then(|v| v.pointer(["dns", "server"]))
            .is_some_and(Value::is_array));
    }

    #[test]
    fn test_multiple_nodes_nest_and_last_wins() {
        let a = Node::new("hostname").with_text("fw01");
        let b = Node::new("hostname").with_text("fw02");
        let c = Node::new("timezone").with_text("UTC");
        let value = to_value(&[&a, &b, &c], &Forcelist::default());
        assert_eq!(
            value.as_ref().and_then(|v| v.pointer(["hostname", "hostname"])),
            Some(&Value::from("fw02"))
        );
        assert_eq!(
            value.as_ref().and_then(|v| v.pointer(["timezone", "timezone"])),
            Some(&Value::from("UTC"))
        );
        assert_eq!(value.as_ref().and_then(Value::as_object).map(Object::len), Some(2));
    }
}
