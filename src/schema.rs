//! YAML 1.2 core schema: implicit tag resolution and construction of native scalars.
//!
//! Resolution only assigns identity. Scalar text is kept verbatim in the node; it is
//! converted when a value is built, and never for tags outside the core schema.

use crate::error::Error;
use crate::node::ScalarStyle;
use crate::parse_scalars::{IntParse, is_null, parse_bool, parse_float, parse_int};
use crate::tags::{CoreTag, TAG_BOOL, TAG_FLOAT, TAG_INT, TAG_MAP, TAG_NULL, TAG_SEQ, TAG_STR};
use crate::value::Value;

/// Implicit tag of an untagged scalar.
pub(crate) fn resolve_scalar(text: &str, style: ScalarStyle) -> &'static str {
    if style != ScalarStyle::Plain {
        return TAG_STR;
    }
    if is_null(text) {
        TAG_NULL
    } else if parse_bool(text).is_some() {
        TAG_BOOL
    } else if let Some(int) = parse_int(text) {
        match int {
            IntParse::Int(_) => TAG_INT,
            IntParse::Overflow(_) => TAG_FLOAT,
        }
    } else if parse_float(text).is_some() {
        TAG_FLOAT
    } else {
        TAG_STR
    }
}

/// Implicit tag of an untagged collection.
pub(crate) fn resolve_collection(is_sequence: bool) -> &'static str {
    if is_sequence { TAG_SEQ } else { TAG_MAP }
}

/// `true` if `text` written as a plain scalar would load back as this exact string.
pub(crate) fn plain_resolves_to_str(text: &str) -> bool {
    resolve_scalar(text, ScalarStyle::Plain) == TAG_STR
}

/// Build the native value of a scalar under a core-schema tag.
pub(crate) fn construct_scalar(text: &str, core: CoreTag) -> Result<Value, Error> {
    let invalid = || Error::compose(format!("invalid value `{text}` for tag `{}`", core.as_str()));
    match core {
        CoreTag::Null => {
            if is_null(text) {
                Ok(Value::Null)
            } else {
                Err(invalid())
            }
        }
        CoreTag::Bool => parse_bool(text).map(Value::Bool).ok_or_else(invalid),
        CoreTag::Int => match parse_int(text) {
            Some(IntParse::Int(v)) => Ok(Value::Int(v)),
            Some(IntParse::Overflow(_)) => Err(Error::compose(format!(
                "integer `{text}` is out of the 64-bit range"
            ))),
            None => Err(invalid()),
        },
        CoreTag::Float => parse_float(text)
            .or_else(|| match parse_int(text)? {
                IntParse::Int(v) => Some(v as f64),
                IntParse::Overflow(v) => Some(v),
            })
            .map(Value::Float)
            .ok_or_else(invalid),
        CoreTag::Str => Ok(Value::String(text.to_owned())),
        CoreTag::Seq | CoreTag::Map => Err(Error::compose(format!(
            "tag `{}` cannot be applied to a scalar",
            core.as_str()
        ))),
    }
}

/// Reject an explicit core tag that names a different node kind than the collection.
pub(crate) fn check_collection_tag(core: Option<CoreTag>, is_sequence: bool) -> Result<(), Error> {
    match core {
        None => Ok(()),
        Some(CoreTag::Seq) if is_sequence => Ok(()),
        Some(CoreTag::Map) if !is_sequence => Ok(()),
        Some(core) => Err(Error::compose(format!(
            "tag `{}` cannot be applied to a {}",
            core.as_str(),
            if is_sequence { "sequence" } else { "mapping" }
        ))),
    }
}
