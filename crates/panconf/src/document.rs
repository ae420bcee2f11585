//! Configuration document facade

use std::str::FromStr;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Error, Result};
use crate::render::{self, commands, flat, structure, xml, Forcelist, Format, RenderOptions, Rendered};
use crate::select;
use crate::value::Value;
use crate::xml::model::Node;
use crate::xml::parser::{Config as ParserConfig, Parser};

const CONFIG_TAG: &str = "config";
const LOCAL_DEVICE: &str = "localhost.localdomain";

/// A parsed configuration tree plus facts derived from it on first use.
///
/// The tree is never mutated after construction, so a `Document` can be
/// shared between threads; concurrent first reads of a fact may both
/// compute it and store the same value.
#[derive(Debug)]
pub struct Document {
    root: Node,
    forcelist: Forcelist,
    version: RwLock<Option<Option<String>>>,
    centralized: RwLock<Option<Option<bool>>>,
    multi_tenant: RwLock<Option<Option<bool>>>,
}

impl Document {
    /// Wrap an already built tree
    pub fn new(root: Node) -> Self {
        debug!(root = %root.tag, children = root.children.len(), "document created");
        Self {
            root,
            forcelist: Forcelist::default(),
            version: RwLock::new(None),
            centralized: RwLock::new(None),
            multi_tenant: RwLock::new(None),
        }
    }

    /// Parse an XML document
    pub fn parse(input: &str) -> Result<Self> {
        Self::parse_bytes(input.as_bytes())
    }

    /// Parse an XML document from bytes
    pub fn parse_bytes(input: &[u8]) -> Result<Self> {
        Self::parse_with_config(input, ParserConfig::default())
    }

    /// Parse an XML document with custom parser limits
    pub fn parse_with_config(input: &[u8], config: ParserConfig) -> Result<Self> {
        let root = Parser::with_config(input, config).parse()?;
        Ok(Self::new(root))
    }

    /// Replace the forcelist used by [`Document::structure`] and [`Document::render`]
    pub fn with_forcelist(mut self, forcelist: Forcelist) -> Self {
        self.forcelist = forcelist;
        self
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn forcelist(&self) -> &Forcelist {
        &self.forcelist
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    /// Nodes designated by `expression`, or the root when there is none
    pub fn select(&self, expression: Option<&str>) -> Result<Vec<&Node>> {
        let nodes = select::select(&self.root, expression)?;
        debug!(expression = expression.unwrap_or_default(), matched = nodes.len(), "selection");
        Ok(nodes)
    }

    /// `version` attribute of a `config` root
    pub fn version(&self) -> Option<String> {
        memoized(&self.version, || {
            if self.root.tag != CONFIG_TAG {
                return None;
            }
            self.root.attribute("version").map(str::to_string)
        })
    }

    /// Whether a `config` root describes a centrally managed deployment
    /// (a Panorama configuration or a local device with device groups).
    /// `None` when the root is not `config`.
    pub fn is_centralized_management(&self) -> Option<bool> {
        memoized(&self.centralized, || {
            if self.root.tag != CONFIG_TAG {
                return None;
            }
            let panorama = self.root.children_named("panorama").next().is_some();
            let device_group = self
                .local_devices()
                .any(|device| device.children_named("device-group").next().is_some());
            Some(panorama || device_group)
        })
    }

    /// Whether a `config` root holds more than one virtual system on the
    /// local device. `None` when the root is not `config`.
    pub fn is_multi_tenant(&self) -> Option<bool> {
        memoized(&self.multi_tenant, || {
            if self.root.tag != CONFIG_TAG {
                return None;
            }
            let vsys = self
                .local_devices()
                .flat_map(|device| device.children_named("vsys"))
                .flat_map(|vsys| vsys.children_named("entry"))
                .count();
            Some(vsys > 1)
        })
    }

    /// `devices/entry[@name='localhost.localdomain']`
    fn local_devices(&self) -> impl Iterator<Item = &Node> {
        self.root
            .children_named("devices")
            .flat_map(|devices| devices.children_named("entry"))
            .filter(|entry| entry.attribute("name") == Some(LOCAL_DEVICE))
    }

    /// Selection rendered as XML
    pub fn xml(&self, expression: Option<&str>) -> Result<Option<String>> {
        Ok(xml::to_xml(&self.select(expression)?))
    }

    /// Selection rendered as a nested structure
    pub fn structure(&self, expression: Option<&str>) -> Result<Option<Value>> {
        Ok(structure::to_value(&self.select(expression)?, &self.forcelist))
    }

    /// Selection rendered as flat paths starting with `prefix`
    pub fn flat(&self, prefix: &str, expression: Option<&str>) -> Result<Option<Vec<String>>> {
        Ok(flat::to_paths(&self.select(expression)?, prefix))
    }

    /// Selection rendered as `set` commands starting with `prefix`
    pub fn commands(
        &self,
        prefix: &str,
        expression: Option<&str>,
        member_list: bool,
    ) -> Result<Option<Vec<String>>> {
        Ok(commands::to_commands(
            &self.select(expression)?,
            prefix,
            member_list,
        ))
    }

    /// Selection rendered in `format`
    pub fn render(
        &self,
        format: Format,
        expression: Option<&str>,
        options: &RenderOptions,
    ) -> Result<Option<Rendered>> {
        let nodes = self.select(expression)?;
        Ok(render::render(&nodes, format, options, &self.forcelist))
    }
}

impl From<Node> for Document {
    fn from(root: Node) -> Self {
        Self::new(root)
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn memoized<T: Clone>(slot: &RwLock<Option<T>>, compute: impl FnOnce() -> T) -> T {
    let cached = slot.read().clone();
    if let Some(value) = cached {
        return value;
    }
    let value = compute();
    *slot.write() = Some(value.clone());
    value
}
