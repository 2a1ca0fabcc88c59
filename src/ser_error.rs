use std::{fmt, io};

/// Error type used by the YAML serializer.
///
/// This type is re-exported as `yaml12::ser::Error` and is returned by the formatting
/// APIs (for example `yaml12::format`).
///
/// - `Unserializable` reports a value that has no YAML text form: an opaque handler
///   object, a tag nested directly in another tag, or a tag with characters that cannot
///   be written in a tag.
/// - `Format` wraps a `std::fmt::Error` produced when writing to a `fmt::Write` target.
/// - `IO` wraps a `std::io::Error` produced when writing to an `io::Write` target.
#[derive(Debug)]
pub enum Error {
    /// The value cannot be written as YAML.
    Unserializable { msg: String },
    /// Nesting went deeper than [`SerializerOptions::max_depth`](crate::SerializerOptions).
    DepthExceeded { limit: usize },
    /// Options used would produce invalid YAML (0 indentation, etc)
    InvalidOptions(String),
    /// Wrapper for formatting errors.
    Format { error: fmt::Error },
    /// Wrapper for I/O errors.
    IO { error: io::Error },
}

impl Error {
    #[cold]
    pub(crate) fn unserializable(msg: impl Into<String>) -> Self {
        Error::Unserializable { msg: msg.into() }
    }
}

impl From<fmt::Error> for Error {
    fn from(error: fmt::Error) -> Self {
        Error::Format { error }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::IO { error }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unserializable { msg } => write!(f, "cannot serialize value: {msg}"),
            Error::DepthExceeded { limit } => {
                write!(f, "nesting depth limit of {limit} exceeded while serializing")
            }
            Error::InvalidOptions(msg) => write!(f, "invalid serialization options: {msg}"),
            Error::Format { error } => write!(f, "formatting error: {error}"),
            Error::IO { error } => write!(f, "I/O error: {error}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Format { error } => Some(error),
            Error::IO { error } => Some(error),
            Error::Unserializable { .. } | Error::DepthExceeded { .. } | Error::InvalidOptions(_) => {
                None
            }
        }
    }
}
