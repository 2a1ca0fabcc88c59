//! Serializer options for YAML emission.
//!
//! Example: use 4-space indentation and quote every string.
//!
//! ```rust
//! let value = yaml12::parse("name: app\ntags: [a, b]\n").unwrap();
//! let opts = yaml12::serializer_options! {
//!     indent_step: 4,
//!     quote_all: true,
//! };
//! let yaml = yaml12::format_with_options(&value, opts).unwrap();
//! assert_eq!(yaml, "'name': 'app'\n'tags':\n    - 'a'\n    - 'b'\n");
//! ```

use serde::{Deserialize, Serialize};

use crate::ser_error::Error;

/// Serializer options for YAML emission.
///
/// Construct `SerializerOptions` using the [`serializer_options!`](crate::serializer_options!)
/// macro to stay compatible with fields added later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerOptions {
    /// Number of spaces to indent per nesting level of block collections (2 by default).
    /// 0 is rejected, because no indentation would produce invalid YAML.
    pub indent_step: usize,
    /// When enabled, quote all string scalars. Uses single quotes by default, but switches
    /// to double quotes when the string needs escape sequences (control characters,
    /// backslash) or contains single quotes. Off by default.
    pub quote_all: bool,
    /// Start every document with `---`. Documents after the first in
    /// [`format_multi`](crate::format_multi) always get the marker.
    pub explicit_start: bool,
    /// Maximum nesting depth of emitted collections. Default: 512.
    pub max_depth: usize,
}

impl SerializerOptions {
    pub(crate) fn consistent(&self) -> Result<(), Error> {
        if self.indent_step == 0 {
            return Err(Error::InvalidOptions(
                "Invalid indent step must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            indent_step: 2,
            quote_all: false,
            explicit_start: false,
            max_depth: 512,
        }
    }
}
