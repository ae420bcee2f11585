//! Restricted path expressions over the configuration tree
//!
//! Supported forms, relative to the document root:
//!
//! - `devices/entry/vsys`: child steps separated by `/`
//! - `./devices`: an explicit self step (`.`) may appear anywhere
//! - `.//entry`: `//` selects descendants instead of children
//! - `entry[@name='vsys1']`: one attribute equality predicate per step,
//!   single or double quoted, with optional whitespace around its parts
//!
//! Absolute paths, wildcards, parent steps and multiple predicates are rejected.

use std::collections::HashSet;
use std::ptr;

use tracing::trace;

use crate::error::{Error, Result};
use crate::xml::model::Node;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Predicate {
    name: String,
    value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Step {
    axis: Axis,
    tag: String,
    predicate: Option<Predicate>,
}

impl Step {
    fn matches(&self, node: &Node) -> bool {
        node.tag == self.tag
            && self
                .predicate
                .as_ref()
                .is_none_or(|p| node.attribute(&p.name) == Some(p.value.as_str()))
    }
}

/// A compiled path expression
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    expression: String,
    steps: Vec<Step>,
}

impl Selector {
    /// Compile a path expression
    pub fn parse(expression: &str) -> Result<Self> {
        let steps = StepParser::new(expression).parse()?;
        Ok(Self {
            expression: expression.to_string(),
            steps,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Nodes designated by this expression, in document order
    pub fn select<'a>(&self, root: &'a Node) -> Vec<&'a Node> {
        let mut context = vec![root];
        for step in &self.steps {
            let mut next: Vec<&'a Node> = Vec::new();
            for node in context {
                match step.axis {
                    Axis::Child => {
                        next.extend(node.children.iter().filter(|child| step.matches(child)));
                    }
                    Axis::Descendant => {
                        next.extend(node.descendants().filter(|child| step.matches(child)));
                    }
                }
            }
            if step.axis == Axis::Descendant {
                let mut seen = HashSet::new();
                next.retain(|node| seen.insert(ptr::from_ref(*node)));
            }
            trace!(tag = %step.tag, matched = next.len(), "selector step");
            context = next;
        }
        context
    }
}

/// Resolve an optional expression against `root`.
///
/// No expression (or an empty one) designates the root itself.
pub fn select<'a>(root: &'a Node, expression: Option<&str>) -> Result<Vec<&'a Node>> {
    match expression {
        Some(expression) if !expression.is_empty() => {
            Ok(Selector::parse(expression)?.select(root))
        }
        _ => Ok(vec![root]),
    }
}

struct StepParser<'a> {
    expression: &'a str,
    rest: &'a str,
}

impl<'a> StepParser<'a> {
    fn new(expression: &'a str) -> Self {
        Self {
            expression,
            rest: expression,
        }
    }

    fn parse(mut self) -> Result<Vec<Step>> {
        if self.rest.starts_with('/') {
            return Err(self.error("absolute paths are not supported"));
        }

        let mut steps = Vec::new();
        let mut axis = Axis::Child;
        loop {
            if self.is_self_step() {
                if axis == Axis::Descendant {
                    return Err(self.error("expected tag name after '//'"));
                }
                self.bump(1);
            } else {
                let tag = self.name()?;
                let predicate = self.predicate()?;
                if self.rest.starts_with('[') {
                    return Err(self.error("only one predicate per step is supported"));
                }
                steps.push(Step {
                    axis,
                    tag,
                    predicate,
                });
            }

            if self.rest.is_empty() {
                return Ok(steps);
            }
            if !self.eat('/') {
                return Err(self.error("expected '/' between steps"));
            }
            axis = if self.eat('/') {
                Axis::Descendant
            } else {
                Axis::Child
            };
            if self.rest.is_empty() {
                return Err(self.error("trailing '/'"));
            }
        }
    }

    fn is_self_step(&self) -> bool {
        self.rest == "." || self.rest.starts_with("./")
    }

    fn name(&mut self) -> Result<String> {
        if self.rest.starts_with("..") {
            return Err(self.error("parent steps are not supported"));
        }
        if self.rest.starts_with('*') {
            return Err(self.error("wildcards are not supported"));
        }
        let end = self
            .rest
            .find(|c: char| !is_name_char(c))
            .unwrap_or(self.rest.len());
        if end == 0 {
            return Err(self.error("expected tag name"));
        }
        let (name, rest) = self.rest.split_at(end);
        self.rest = rest;
        Ok(name.to_string())
    }

    fn predicate(&mut self) -> Result<Option<Predicate>> {
        if !self.eat('[') {
            return Ok(None);
        }
        self.skip_whitespace();
        if !self.eat('@') {
            return Err(self.error("only attribute predicates are supported"));
        }
        let name = self.name()?;
        self.skip_whitespace();
        if !self.eat('=') {
            return Err(self.error("expected '=' in predicate"));
        }
        self.skip_whitespace();
        let quote = match self.rest.chars().next() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected quoted predicate value")),
        };
        self.bump(1);
        let Some(end) = self.rest.find(quote) else {
            return Err(self.error("unterminated predicate value"));
        };
        let (value, rest) = self.rest.split_at(end);
        let value = value.to_string();
        self.rest = rest;
        self.bump(1);
        self.skip_whitespace();
        if !self.eat(']') {
            return Err(self.error("expected ']' after predicate"));
        }
        Ok(Some(Predicate { name, value }))
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start_matches(|c: char| c.is_ascii_whitespace());
    }

    fn eat(&mut self, c: char) -> bool {
        match self.rest.strip_prefix(c) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn bump(&mut self, n: usize) {
        self.rest = self.rest.get(n..).unwrap_or_default();
    }

    fn error(&self, message: &str) -> Error {
        let offset = self.expression.len() - self.rest.len();
        Error::invalid_selector(self.expression, format!("{message} at offset {offset}"))
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Node {
        Node::new("config")
            .with_child(
                Node::new("devices").with_child(
                    Node::new("entry")
                        .with_attribute("name", "localhost.localdomain")
                        .with_child(
                            Node::new("vsys")
                                .with_child(Node::new("entry").with_attribute("name", "vsys1"))
                                .with_child(Node::new("entry").with_attribute("name", "vsys2")),
                        ),
                ),
            )
            .with_child(Node::new("shared"))
    }

    fn names<'a>(nodes: &[&'a Node]) -> Vec<&'a str> {
        nodes.iter().filter_map(|n| n.attribute("name")).collect()
    }

    #[test]
    fn test_no_expression_selects_root() -> Result<()> {
        let root = tree();
        let nodes = select(&root, None)?;
        assert_eq!(nodes.len(), 1);
        assert!(nodes.first().is_some_and(|n| ptr::eq(*n, &root)));
        assert_eq!(select(&root, Some(""))?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_child_steps_with_predicate() -> Result<()> {
        let root = tree();
        let nodes = select(
            &root,
            Some("./devices/entry[@name='localhost.localdomain']/vsys/entry"),
        )?;
        assert_eq!(names(&nodes), vec!["vsys1", "vsys2"]);

        let nodes = select(&root, Some("devices/entry/vsys/entry[@name=\"vsys2\"]"))?;
        assert_eq!(names(&nodes), vec!["vsys2"]);
        Ok(())
    }

    #[test]
    fn test_predicate_mismatch_selects_nothing() -> Result<()> {
        let root = tree();
        let nodes = select(&root, Some("devices/entry[@name='other']/vsys"))?;
        assert!(nodes.is_empty());
        Ok(())
    }

    #[test]
    fn test_predicate_value_may_contain_slash() -> Result<()> {
        let root = Node::new("address").with_child(
            Node::new("entry")
                .with_attribute("name", "10.0.0.0/8")
                .with_child(Node::new("ip-netmask").with_text("10.0.0.0/8")),
        );
        let nodes = select(&root, Some("entry[@name='10.0.0.0/8']/ip-netmask"))?;
        assert_eq!(nodes.len(), 1);
        Ok(())
    }

    #[test]
    fn test_predicate_allows_whitespace() -> Result<()> {
        let root = tree();
        let nodes = select(&root, Some("devices/entry/vsys/entry[ @name = 'vsys1' ]"))?;
        assert_eq!(names(&nodes), vec!["vsys1"]);
        let nodes = select(&root, Some("devices/entry/vsys/entry[@name=\t\"vsys2\"]"))?;
        assert_eq!(names(&nodes), vec!["vsys2"]);
        Ok(())
    }

    #[test]
    fn test_descendant_axis_is_deduplicated() -> Result<()> {
        let root = tree();
        let nodes = select(&root, Some(".//entry"))?;
        assert_eq!(
            names(&nodes),
            vec!["localhost.localdomain", "vsys1", "vsys2"]
        );
        let nodes = select(&root, Some(".//entry//entry"))?;
        assert_eq!(names(&nodes), vec!["vsys1", "vsys2"]);
        Ok(())
    }

    #[test]
    fn test_invalid_expressions() {
        for expression in [
            "/config",
            "devices/",
            "devices/*",
            "devices/..",
            "entry[@name='a'][@uuid='b']",
            "entry[@name='a'",
            "entry[@name=a]",
            "entry[name='a']",
            "entry[@name'a']",
            "entry]",
            ".//.",
        ] {
            let result = Selector::parse(expression);
            assert!(
                result.as_ref().is_err_and(Error::is_invalid_selector),
                "{expression} should be rejected"
            );
        }
    }

    #[test]
    fn test_expression_is_kept() -> Result<()> {
        let selector = Selector::parse("devices/entry")?;
        assert_eq!(selector.expression(), "devices/entry");
        Ok(())
    }
}
