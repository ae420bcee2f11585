//! Projections of a node selection into output formats

pub mod commands;
pub mod flat;
pub mod structure;
pub mod xml;

use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;

use crate::value::Value;
use crate::xml::model::Node;

/// Tags that stand for list items: `entry` elements are named by their `name`
/// attribute, `member` elements by their text.
pub const LIST_ITEM_TAGS: [&str; 2] = ["entry", "member"];

/// Output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Re-serialized XML fragment
    Xml,
    /// Nested key/value structure
    Structure,
    /// One fully qualified path per leaf value or attribute
    Flat,
    /// Hierarchical `set` command lines
    Commands,
}

impl Format {
    pub const ALL: [Self; 4] = [Self::Xml, Self::Structure, Self::Flat, Self::Commands];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Structure => "structure",
            Self::Flat => "flat",
            Self::Commands => "commands",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown format: {s}"))
    }
}

/// Tags always rendered as lists by the structural renderer, even when they
/// occur once among their siblings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Forcelist(IndexSet<String>);

impl Default for Forcelist {
    fn default() -> Self {
        Self::new(LIST_ITEM_TAGS)
    }
}

impl Forcelist {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tags.into_iter().map(Into::into).collect())
    }

    /// A policy that only pluralizes repeated siblings
    pub fn none() -> Self {
        Self(IndexSet::new())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Per-call options for the path and command renderers
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Prepended to the root tag of every path or command
    pub prefix: String,
    /// Collapse repeated `member` children into `[ a b ]` lists
    pub member_list: bool,
}

impl RenderOptions {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_member_list(mut self, member_list: bool) -> Self {
        self.member_list = member_list;
        self
    }
}

/// Output of one renderer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rendered {
    Xml(String),
    Structure(Value),
    Flat(Vec<String>),
    Commands(Vec<String>),
}

impl Rendered {
    pub const fn format(&self) -> Format {
        match self {
            Self::Xml(_) => Format::Xml,
            Self::Structure(_) => Format::Structure,
            Self::Flat(_) => Format::Flat,
            Self::Commands(_) => Format::Commands,
        }
    }

    /// Lines of a path or command listing, `None` for the other formats
    pub fn lines(&self) -> Option<&[String]> {
        match self {
            Self::Flat(lines) | Self::Commands(lines) => Some(lines),
            Self::Xml(_) | Self::Structure(_) => None,
        }
    }
}

/// Render `nodes` in `format`; `None` when the selection is empty
pub fn render(
    nodes: &[&Node],
    format: Format,
    options: &RenderOptions,
    forcelist: &Forcelist,
) -> Option<Rendered> {
    match format {
        Format::Xml => xml::to_xml(nodes).map(Rendered::Xml),
        Format::Structure => structure::to_value(nodes, forcelist).map(Rendered::Structure),
        Format::Flat => flat::to_paths(nodes, &options.prefix).map(Rendered::Flat),
        Format::Commands => {
            commands::to_commands(nodes, &options.prefix, options.member_list)
                .map(Rendered::Commands)
        }
    }
}
