//! Defines the parse-side error and helpers to attach locations and snippets.
use std::fmt;

use saphyr_parser::ScanError;

use crate::budget::BudgetBreach;
use crate::location::{Location, location_from_marker};
use crate::snippet::render_error_with_snippet;

/// Deepest flow collection nesting `saphyr_parser` accepts, independent of `max_depth`.
pub const FLOW_NESTING_LIMIT: usize = u8::MAX as usize;

/// Message of the scan error raised past [`FLOW_NESTING_LIMIT`].
const FLOW_NESTING_EXCEEDED: &str = "recursion limit exceeded";

/// Error returned by the parsing entry points.
///
/// Tag handler failures are not represented here: `parse_with_handlers` is generic over the
/// handler's error type and returns it untouched.
#[derive(Debug)]
pub enum Error {
    /// Lexical failure reported by the scanner (bad indentation, unterminated flow
    /// collection, invalid escape, undeclared tag handle, ...).
    Scan {
        msg: String,
        location: Location,
    },
    /// Structural failure while composing or resolving nodes: duplicate keys, alias to an
    /// undefined anchor, malformed collections, content invalid for an explicit core tag.
    Compose {
        msg: String,
        location: Location,
    },
    /// An alias graph forms a cycle that cannot be turned into a finite value.
    CyclicValue {
        location: Location,
    },
    /// Nesting went deeper than the configured limit.
    DepthExceeded {
        limit: usize,
        location: Location,
    },
    /// A YAML budget limit was exceeded.
    Budget {
        breach: BudgetBreach,
        location: Location,
    },
    /// A single-document entry point received a stream with more than one document.
    MultipleDocuments {
        documents: usize,
    },
    /// Reading the input failed.
    Io {
        cause: std::io::Error,
    },
    /// Wraps an error with a pre-rendered, rustc-like excerpt of the input.
    WithSnippet {
        /// Rendered snippet; the full input is not retained.
        text: String,
        crop_radius: usize,
        error: Box<Error>,
    },
}

impl Error {
    /// Construct a `Compose` error with no known location.
    pub(crate) fn compose<S: Into<String>>(msg: S) -> Self {
        Error::Compose {
            msg: msg.into(),
            location: Location::UNKNOWN,
        }
    }

    /// Construct a `DepthExceeded` error with no known location.
    pub(crate) fn depth(limit: usize) -> Self {
        Error::DepthExceeded {
            limit,
            location: Location::UNKNOWN,
        }
    }

    /// Construct a `CyclicValue` error with no known location.
    pub(crate) fn cyclic() -> Self {
        Error::CyclicValue {
            location: Location::UNKNOWN,
        }
    }

    /// Convert a budget breach into an error. Depth breaches surface as `DepthExceeded`.
    pub(crate) fn budget(breach: BudgetBreach, limit: usize) -> Self {
        match breach {
            BudgetBreach::Depth { .. } => Error::depth(limit),
            breach => Error::Budget {
                breach,
                location: Location::UNKNOWN,
            },
        }
    }

    /// Attach or override the location and return the error.
    ///
    /// Errors without a location slot are returned unchanged.
    pub(crate) fn with_location(mut self, set_location: Location) -> Self {
        match &mut self {
            Error::Scan { location, .. }
            | Error::Compose { location, .. }
            | Error::CyclicValue { location }
            | Error::DepthExceeded { location, .. }
            | Error::Budget { location, .. } => {
                *location = set_location;
            }
            Error::WithSnippet { error, .. } => {
                let inner = std::mem::replace(error.as_mut(), Error::cyclic());
                **error = inner.with_location(set_location);
            }
            Error::MultipleDocuments { .. } | Error::Io { .. } => {}
        }
        self
    }

    /// If the error has a known location, return it.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Scan { location, .. }
            | Error::Compose { location, .. }
            | Error::CyclicValue { location }
            | Error::DepthExceeded { location, .. }
            | Error::Budget { location, .. } => location.is_known().then_some(*location),
            Error::WithSnippet { error, .. } => error.location(),
            Error::MultipleDocuments { .. } | Error::Io { .. } => None,
        }
    }

    /// Peel off the snippet wrapper, if any.
    pub fn without_snippet(&self) -> &Error {
        match self {
            Error::WithSnippet { error, .. } => error.without_snippet(),
            other => other,
        }
    }

    /// Wrap this error with a rendered snippet of `text` around its location.
    pub(crate) fn with_snippet(self, text: &str, crop_radius: usize) -> Self {
        let inner = match self {
            Error::WithSnippet { error, .. } => *error,
            other => other,
        };
        if crop_radius == 0 || inner.location().is_none() {
            return inner;
        }
        let rendered = render_error_with_snippet(&inner, text, crop_radius);
        Error::WithSnippet {
            text: rendered,
            crop_radius,
            error: Box::new(inner),
        }
    }

    /// Map a `saphyr_parser::ScanError` into a `Scan` error with location.
    ///
    /// The parser's own flow nesting cap surfaces as [`Error::DepthExceeded`].
    pub(crate) fn from_scan_error(err: ScanError) -> Self {
        let location = location_from_marker(err.marker());
        if err.info() == FLOW_NESTING_EXCEEDED {
            return Error::DepthExceeded {
                limit: FLOW_NESTING_LIMIT,
                location,
            };
        }
        Error::Scan {
            msg: err.info().to_owned(),
            location,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Scan { msg, location } => fmt_with_location(f, msg, location),
            Error::Compose { msg, location } => fmt_with_location(f, msg, location),
            Error::CyclicValue { location } => {
                fmt_with_location(f, "cyclic alias cannot be represented as a value", location)
            }
            Error::DepthExceeded { limit, location } => fmt_with_location(
                f,
                &format!("nesting depth limit of {limit} exceeded"),
                location,
            ),
            Error::Budget { breach, location } => {
                fmt_with_location(f, &format!("YAML budget breached: {breach:?}"), location)
            }
            Error::MultipleDocuments { documents } => write!(
                f,
                "expected a single YAML document, found {documents}; use parse_multi"
            ),
            Error::Io { cause } => write!(f, "IO error: {cause}"),
            Error::WithSnippet {
                text,
                crop_radius,
                error,
            } => {
                if *crop_radius == 0 {
                    write!(f, "{error}")
                } else {
                    write!(f, "{text}")
                }
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { cause } => Some(cause),
            Error::WithSnippet { error, .. } => Some(error.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(cause: std::io::Error) -> Self {
        Error::Io { cause }
    }
}

/// Print a message optionally suffixed with "at line X, column Y".
pub(crate) fn fmt_with_location(
    f: &mut fmt::Formatter<'_>,
    msg: &str,
    location: &Location,
) -> fmt::Result {
    if location.is_known() {
        write!(
            f,
            "{msg} at line {}, column {}",
            location.row, location.column
        )
    } else {
        write!(f, "{msg}")
    }
}
