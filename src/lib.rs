//! YAML 1.2 core-schema parsing and formatting over a dynamic [`Value`] tree.
//!
//! ```rust
//! use yaml12::{Value, parse};
//!
//! let doc = parse("? [a, b]\n: pair\ncount: 3\n").unwrap();
//! let key = Value::key(vec!["a", "b"]);
//! assert_eq!(doc[&key], Value::from("pair"));
//! assert_eq!(doc["count"].as_i64(), Some(3));
//!
//! let yaml = yaml12::format(&doc).unwrap();
//! assert_eq!(parse(&yaml).unwrap(), doc);
//! ```
//!
//! Tags outside the core schema are kept as [`Value::Tagged`] unless a handler for the
//! tag is registered in [`TagHandlers`]. Mappings whose keys are collections wrap those
//! keys in [`MappingKey`] so they stay hashable.

#[macro_use]
mod macros;

pub mod budget;
mod composer;
mod dispatch;
mod error;
mod fingerprint;
mod handlers;
mod location;
mod mapping_key;
mod node;
pub mod options;
mod parse;
mod parse_scalars;
mod scanner;
mod schema;
pub mod ser;
mod ser_error;
mod ser_quoting;
mod serializer_options;
mod snippet;
mod tags;
mod value;
mod zmij_format;

pub use budget::{Budget, BudgetBreach, BudgetReport, check_yaml_budget};
pub use error::{Error, FLOW_NESTING_LIMIT};
pub use fingerprint::Fingerprint;
pub use handlers::{TagHandler, TagHandlers};
pub use location::Location;
pub use mapping_key::MappingKey;
pub use node::{Document, Node, NodeId, NodeKind, ScalarStyle};
pub use options::{AliasLimits, DuplicateKeyPolicy, Options};
pub use parse::{
    compose, from_reader, parse, parse_multi, parse_multi_with_options, parse_with_handlers,
    parse_with_options, read,
};
pub use ser::{
    format, format_multi, format_multi_with_options, format_with_options, to_fmt_writer,
    to_fmt_writer_with_options, to_io_writer, to_io_writer_with_options, write,
};
pub use serializer_options::SerializerOptions;
pub use tags::normalize_tag;
pub use value::{Mapping, Opaque, Tagged, Value, ValueIndex};
