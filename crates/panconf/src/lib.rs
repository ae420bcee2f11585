//! panconf - re-project PAN-OS style XML configuration trees
//!
//! A configuration document is parsed once into an immutable tree and can be
//! rendered, in whole or through a path expression, as:
//!
//! - an XML fragment
//! - a nested key/value [`Value`]
//! - flat path strings (`/config/devices/entry[@name='…']/…="value"`)
//! - `set` command lines
//!
//! # Quick Start
//!
//! ```
//! use panconf::Document;
//! # fn main() -> Result<(), panconf::Error> {
//! let doc = Document::parse(
//!     "<config version=\"10.1.0\"><shared><address><entry name=\"web\">\
//!      <ip-netmask>10.0.0.1/32</ip-netmask></entry></address></shared></config>",
//! )?;
//! assert_eq!(doc.version().as_deref(), Some("10.1.0"));
//!
//! let commands = doc.commands("set ", Some("shared"), false)?.unwrap_or_default();
//! assert_eq!(commands, vec!["set shared address web ip-netmask 10.0.0.1/32"]);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod value;
pub use value::{Array, Object, Value};

pub mod xml;
pub use xml::{Node, Parser, ParserConfig};

pub mod select;
pub use select::Selector;

pub mod render;
pub use render::{Forcelist, Format, RenderOptions, Rendered};

pub mod document;
pub use document::Document;

/// Parse a document from a string
pub fn from_str(s: &str) -> Result<Document> {
    Document::parse(s)
}

/// Parse a document from bytes
pub fn from_bytes(bytes: &[u8]) -> Result<Document> {
    Document::parse_bytes(bytes)
}

/// Parse a document with custom parser limits
pub fn from_str_with_config(s: &str, config: ParserConfig) -> Result<Document> {
    Document::parse_with_config(s.as_bytes(), config)
}
