//! Parsing entry points: text to [`Value`], with optional tag handlers.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::composer::compose_stream;
use crate::dispatch::{DispatchError, dispatch_document};
use crate::error::Error;
use crate::handlers::TagHandlers;
use crate::node::Document;
use crate::options::Options;
use crate::value::Value;

/// Parse a single YAML document without handlers.
///
/// Tags outside the core schema come back as [`Value::Tagged`]. Empty input parses to
/// [`Value::Null`]; a stream with more than one document is an error.
///
/// ```rust
/// let value = yaml12::parse("name: app\nports: [80, 443]\n").unwrap();
/// assert_eq!(value["name"].as_str(), Some("app"));
/// assert_eq!(value["ports"][1].as_i64(), Some(443));
/// ```
pub fn parse(text: &str) -> Result<Value, Error> {
    parse_with_options(text, &TagHandlers::new(), Options::default())
}

/// Parse a single YAML document, running `handlers` on explicitly tagged nodes.
///
/// A handler error is returned exactly as the handler produced it; engine failures are
/// converted with `E::from`.
pub fn parse_with_handlers<E: From<Error>>(
    text: &str,
    handlers: &TagHandlers<'_, E>,
) -> Result<Value, E> {
    parse_with_options(text, handlers, Options::default())
}

/// Parse a single YAML document with handlers and configurable [`Options`].
pub fn parse_with_options<E: From<Error>>(
    text: &str,
    handlers: &TagHandlers<'_, E>,
    options: Options,
) -> Result<Value, E> {
    let docs = compose_stream(text, &options).map_err(|e| E::from(decorate(e, text, &options)))?;
    match docs.as_slice() {
        [] => Ok(Value::Null),
        [doc] => dispatch(doc, handlers, text, &options),
        docs => Err(E::from(Error::MultipleDocuments {
            documents: docs.len(),
        })),
    }
}

/// Parse every document of a YAML stream, one value per document.
///
/// ```rust
/// let values = yaml12::parse_multi("--- 1\n--- two\n").unwrap();
/// assert_eq!(values, vec![yaml12::Value::Int(1), yaml12::Value::from("two")]);
/// ```
pub fn parse_multi(text: &str) -> Result<Vec<Value>, Error> {
    parse_multi_with_options(text, &TagHandlers::new(), Options::default())
}

/// Parse every document of a YAML stream with handlers and configurable [`Options`].
pub fn parse_multi_with_options<E: From<Error>>(
    text: &str,
    handlers: &TagHandlers<'_, E>,
    options: Options,
) -> Result<Vec<Value>, E> {
    let docs = compose_stream(text, &options).map_err(|e| E::from(decorate(e, text, &options)))?;
    docs.iter()
        .map(|doc| dispatch(doc, handlers, text, &options))
        .collect()
}

/// Compose the node graphs of every document without building values.
///
/// Gives access to resolved tags, scalar styles, anchors and source locations.
///
/// ```rust
/// use yaml12::NodeKind;
///
/// let docs = yaml12::compose("a: !x 1\n", &yaml12::Options::default()).unwrap();
/// let doc = &docs[0];
/// let NodeKind::Mapping(entries) = &doc.node(doc.root()).kind else { unreachable!() };
/// let value = doc.node(entries[0].1);
/// assert_eq!(value.tag, "!x");
/// assert!(value.explicit_tag);
/// assert_eq!(value.location.line(), 1);
/// ```
pub fn compose(text: &str, options: &Options) -> Result<Vec<Document>, Error> {
    compose_stream(text, options).map_err(|e| decorate(e, text, options))
}

/// Parse a single document from a reader.
///
/// The byte stream is decoded with BOM sniffing (UTF-8 or UTF-16), then parsed as with
/// [`parse_with_handlers`].
pub fn from_reader<R: Read, E: From<Error>>(
    reader: R,
    handlers: &TagHandlers<'_, E>,
) -> Result<Value, E> {
    let text = read_text(reader).map_err(E::from)?;
    parse_with_handlers(&text, handlers)
}

/// Parse a single document from the file at `path`.
pub fn read<P: AsRef<Path>, E: From<Error>>(
    path: P,
    handlers: &TagHandlers<'_, E>,
) -> Result<Value, E> {
    let file = File::open(path).map_err(|e| E::from(Error::from(e)))?;
    from_reader(BufReader::new(file), handlers)
}

fn read_text<R: Read>(reader: R) -> Result<String, Error> {
    let mut decoded = DecodeReaderBytesBuilder::new().encoding(None).build(reader);
    let mut text = String::new();
    decoded.read_to_string(&mut text)?;
    Ok(text)
}

fn dispatch<E: From<Error>>(
    doc: &Document,
    handlers: &TagHandlers<'_, E>,
    text: &str,
    options: &Options,
) -> Result<Value, E> {
    dispatch_document(doc, handlers, options).map_err(|err| match err {
        DispatchError::Engine(err) => E::from(decorate(err, text, options)),
        DispatchError::Handler(err) => err,
    })
}

fn decorate(err: Error, text: &str, options: &Options) -> Error {
    if options.with_snippet {
        err.with_snippet(text, options.crop_radius)
    } else {
        err
    }
}
