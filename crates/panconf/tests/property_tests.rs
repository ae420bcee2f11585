//! Property-based tests for the configuration renderers
//!
//! These tests use proptest to verify:
//! 1. Roundtrip property: render(tree) as XML -> parse == tree
//! 2. Forcelisted tags always render as lists in the structure
//! 3. Leaf text coercion only turns `yes`/`no` into booleans
//! 4. Flat paths emit one entry per text line and attribute
//! 5. Set commands emit exactly one command per leaf

use proptest::prelude::*;

use panconf::render::{commands, flat, structure, xml};
use panconf::{Document, Forcelist, Node, Value};

/// Strategy for XML tag names
fn arb_tag() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9.-]{0,6}"
}

/// Strategy for element text; never whitespace-only, never multi-line
fn arb_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of(r#"[a-zA-Z0-9&<>'"/.-][a-zA-Z0-9 &<>'"/.-]{0,11}"#)
}

/// Strategy for attribute maps with unique names
fn arb_attributes() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::btree_map("[a-z]{1,6}", r#"[a-zA-Z0-9 <>&"'\n\t]{0,10}"#, 0..3)
        .prop_map(|attrs| attrs.into_iter().collect())
}

fn build(tag: String, text: Option<String>, attrs: Vec<(String, String)>, children: Vec<Node>) -> Node {
    Node {
        tag,
        text,
        attributes: attrs.into_iter().collect(),
        children,
    }
}

/// Strategy for arbitrary configuration trees
fn arb_node() -> impl Strategy<Value = Node> {
    let leaf = (arb_tag(), arb_text(), arb_attributes())
        .prop_map(|(tag, text, attrs)| build(tag, text, attrs, Vec::new()));
    leaf.prop_recursive(4, 48, 4, |inner| {
        (
            arb_tag(),
            arb_text(),
            arb_attributes(),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, text, attrs, children)| build(tag, text, attrs, children))
    })
}

fn count_leaves(node: &Node) -> usize {
    if node.children.is_empty() {
        1
    } else {
        node.children.iter().map(count_leaves).sum()
    }
}

fn count_flat_entries(node: &Node) -> usize {
    let own = match (node.stripped_text(), &node.text) {
        (Some(_), Some(text)) => text.lines().count().max(1),
        _ => 1,
    };
    own + node.attributes.len() + node.children.iter().map(count_flat_entries).sum::<usize>()
}

proptest! {
    #[test]
    fn prop_xml_roundtrip(tree in arb_node()) {
        let rendered = xml::to_xml(&[&tree]).unwrap_or_default();
        let doc = Document::parse(&rendered);
        prop_assert!(doc.is_ok(), "failed to reparse {}", rendered);
        if let Ok(doc) = doc {
            prop_assert_eq!(doc.root(), &tree);
        }
    }

    #[test]
    fn prop_forcelisted_tag_is_always_a_list(tree in arb_node(), tag in prop::sample::select(vec!["entry", "member"])) {
        let mut item = tree;
        item.tag = tag.to_string();
        let wrapper = Node::new("wrapper").with_child(item);
        let value = structure::to_value(&[&wrapper], &Forcelist::default()).unwrap_or_default();
        let slot = value.pointer(["wrapper", tag]);
        prop_assert!(slot.is_some_and(Value::is_array));
    }

    #[test]
    fn prop_lone_leaf_is_scalar(tag in "[a-df-z][a-z0-9-]{0,6}", text in "[a-z0-9][a-z0-9 ]{0,8}") {
        prop_assume!(tag != "member");
        let parent = Node::new("parent").with_child(Node::new(tag.clone()).with_text(text.clone()));
        let value = structure::to_value(&[&parent], &Forcelist::default()).unwrap_or_default();
        prop_assert_eq!(value.pointer(["parent", tag.as_str()]), Some(&structure::coerce(&text)));
        prop_assert!(!value.pointer(["parent", tag.as_str()]).is_some_and(|v| v.is_array() || v.is_object()));
    }

    #[test]
    fn prop_coercion(text in ".{0,12}") {
        let value = structure::coerce(&text);
        match text.trim() {
            "yes" => prop_assert_eq!(value, Value::Bool(true)),
            "no" => prop_assert_eq!(value, Value::Bool(false)),
            _ => prop_assert_eq!(value, Value::String(text.clone())),
        }
    }

    #[test]
    fn prop_multiline_text_numbers_each_line(lines in prop::collection::vec("[a-z0-9]{1,8}", 2..6)) {
        let node = Node::new("banner").with_text(lines.join("\n"));
        let paths = flat::to_paths(&[&node], "/").unwrap_or_default();
        let expected: Vec<String> = lines
            .iter()
            .enumerate()
            .map(|(n, line)| format!("/banner[{}]=\"{line}\"", n + 1))
            .collect();
        prop_assert_eq!(paths, expected);
    }

    #[test]
    fn prop_flat_entry_count(tree in arb_node()) {
        let paths = flat::to_paths(&[&tree], "/").unwrap_or_default();
        prop_assert_eq!(paths.len(), count_flat_entries(&tree));
    }

    #[test]
    fn prop_one_command_per_leaf(tree in arb_node()) {
        let lines = commands::to_commands(&[&tree], "set ", false).unwrap_or_default();
        prop_assert_eq!(lines.len(), count_leaves(&tree));
        prop_assert!(lines.iter().all(|line| line.starts_with("set ")));
    }
}
