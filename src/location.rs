//! Source location utilities.

use saphyr_parser::{Marker, Span};
use serde::Serialize;

/// Row/column location within the source YAML text (1-indexed).
///
/// Columns count Unicode scalar values, matching what `saphyr-parser` reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// 1-indexed row number in the input stream.
    pub(crate) row: u32,
    /// 1-indexed column number in the input stream.
    pub(crate) column: u32,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    pub const UNKNOWN: Self = Self { row: 0, column: 0 };

    /// Create a new location record from 1-indexed coordinates.
    pub(crate) const fn new(row: usize, column: usize) -> Self {
        // Positions beyond 4G lines/columns are truncated; this is error reporting only.
        Self {
            row: row as u32,
            column: column as u32,
        }
    }

    /// 1-indexed line.
    pub fn line(&self) -> u64 {
        self.row as u64
    }

    /// 1-indexed column.
    pub fn column(&self) -> u64 {
        self.column as u64
    }

    /// `true` unless this is [`Location::UNKNOWN`].
    pub fn is_known(&self) -> bool {
        self != &Location::UNKNOWN
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::UNKNOWN
    }
}

/// Convert a parser marker (1-based line, 0-based column) to a [`Location`].
pub(crate) fn location_from_marker(marker: &Marker) -> Location {
    Location::new(marker.line(), marker.col() + 1)
}

/// Convert the start of a parser span to a [`Location`].
pub(crate) fn location_from_span(span: &Span) -> Location {
    location_from_marker(&span.start)
}
