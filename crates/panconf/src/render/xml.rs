//! XML re-serialization

use crate::xml::model::Node;

/// Concatenate the serialized form of every node, `None` when `nodes` is empty
pub fn to_xml(nodes: &[&Node]) -> Option<String> {
    if nodes.is_empty() {
        return None;
    }
    let mut output = String::new();
    for node in nodes {
        write_node(node, &mut output);
    }
    Some(output)
}

/// Append the serialized form of `node` to `output`
pub fn write_node(node: &Node, output: &mut String) {
    output.push('<');
    output.push_str(&node.tag);

    for (key, value) in &node.attributes {
        output.push(' ');
        output.push_str(key);
        output.push_str("=\"");
        output.push_str(&escape_attribute(value));
        output.push('"');
    }

    if node.text.is_none() && node.children.is_empty() {
        output.push_str("/>");
        return;
    }

    output.push('>');
    if let Some(text) = &node.text {
        output.push_str(&escape_text(text));
    }
    for child in &node.children {
        write_node(child, output);
    }
    output.push_str("</");
    output.push_str(&node.tag);
    output.push('>');
}

fn escape_text(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\r' => escaped.push_str("&#13;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn escape_attribute(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
