//! XML tree model and parser

pub mod cursor;
pub mod model;
pub mod parser;

pub use model::Node;
pub use parser::{Config as ParserConfig, Parser};
