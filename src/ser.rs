//! YAML emitter for [`Value`] trees.
//!
//! Non-empty collections are written in block style, empty ones as `[]` / `{}`.
//! Strings are plain when they would load back as the same string, otherwise
//! double-quoted (or single-quoted under `quote_all`). Composite keys and keys too
//! long for an implicit key use the explicit `? key` / `: value` form.
//!
//! ```rust
//! let value = yaml12::parse("? [a, b]\n: !point {x: 1}\nname: '001'\n").unwrap();
//! let yaml = yaml12::format(&value).unwrap();
//! assert_eq!(yaml, "? - a\n  - b\n: !point\n  x: 1\nname: \"001\"\n");
//! assert_eq!(yaml12::parse(&yaml).unwrap(), value);
//! ```

use std::fmt::{self, Write};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use crate::ser_quoting::{is_plain_safe, needs_double_quotes, needs_quotes};
use crate::serializer_options::SerializerOptions;
use crate::tags::tag_to_source;
use crate::value::Value;
use crate::zmij_format::push_float_string;

pub use crate::ser_error::Error;

/// Result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Longest key text written as an implicit `key: value` entry.
const MAX_SIMPLE_KEY_CHARS: usize = 1024;

/// Serialize a value to a YAML string.
pub fn format(value: &Value) -> Result<String> {
    format_with_options(value, SerializerOptions::default())
}

/// Serialize a value to a YAML string with configurable options.
pub fn format_with_options(value: &Value, options: SerializerOptions) -> Result<String> {
    let mut out = String::new();
    to_fmt_writer_with_options(&mut out, value, options)?;
    Ok(out)
}

/// Serialize several values as a multi-document stream separated by `---`.
///
/// ```rust
/// use yaml12::Value;
///
/// let yaml = yaml12::format_multi(&[Value::Int(1), Value::from("two")]).unwrap();
/// assert_eq!(yaml, "1\n---\ntwo\n");
/// assert_eq!(yaml12::parse_multi(&yaml).unwrap(), vec![Value::Int(1), Value::from("two")]);
/// ```
pub fn format_multi(values: &[Value]) -> Result<String> {
    format_multi_with_options(values, SerializerOptions::default())
}

/// [`format_multi`] with configurable options.
pub fn format_multi_with_options(values: &[Value], options: SerializerOptions) -> Result<String> {
    options.consistent()?;
    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        Emitter::new(&mut out, options).emit_document(value, i > 0)?;
    }
    Ok(out)
}

/// Serialize a value into any `fmt::Write` target.
pub fn to_fmt_writer<W: Write>(out: &mut W, value: &Value) -> Result<()> {
    to_fmt_writer_with_options(out, value, SerializerOptions::default())
}

/// [`to_fmt_writer`] with configurable options.
pub fn to_fmt_writer_with_options<W: Write>(
    out: &mut W,
    value: &Value,
    options: SerializerOptions,
) -> Result<()> {
    options.consistent()?;
    Emitter::new(out, options).emit_document(value, false)
}

/// Serialize a value into any `io::Write` target.
pub fn to_io_writer<W: io::Write>(out: &mut W, value: &Value) -> Result<()> {
    to_io_writer_with_options(out, value, SerializerOptions::default())
}

/// [`to_io_writer`] with configurable options. I/O failures are reported as
/// [`Error::IO`] with the original `io::Error`.
pub fn to_io_writer_with_options<W: io::Write>(
    out: &mut W,
    value: &Value,
    options: SerializerOptions,
) -> Result<()> {
    let mut adapter = IoAdapter {
        inner: out,
        error: None,
    };
    let result = to_fmt_writer_with_options(&mut adapter, value, options);
    match (result, adapter.error.take()) {
        (Err(Error::Format { .. }), Some(error)) => Err(Error::IO { error }),
        (result, _) => result,
    }
}

/// Serialize a value into the file at `path`, creating or truncating it.
pub fn write<P: AsRef<Path>>(value: &Value, path: P) -> Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    to_io_writer(&mut out, value)?;
    io::Write::flush(&mut out)?;
    Ok(())
}

/// Bridges `io::Write` to `fmt::Write`, keeping the real I/O error.
struct IoAdapter<'a, W: io::Write> {
    inner: &'a mut W,
    error: Option<io::Error>,
}

impl<W: io::Write> Write for IoAdapter<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|e| {
            self.error = Some(e);
            fmt::Error
        })
    }
}

/// A value split into its optional tag and the untagged content.
struct Parts<'v> {
    tag: Option<String>,
    body: &'v Value,
}

impl<'v> Parts<'v> {
    fn of(value: &'v Value) -> Result<Parts<'v>> {
        match value.unkeyed() {
            Value::Tagged(tagged) => {
                let body = tagged.value.unkeyed();
                if let Value::Tagged(_) = body {
                    return Err(Error::unserializable(format!(
                        "tag `{}` is applied to a value that is already tagged",
                        tagged.tag()
                    )));
                }
                let tag = tag_to_source(tagged.tag()).ok_or_else(|| {
                    Error::unserializable(format!("tag `{}` cannot be written in YAML", tagged.tag()))
                })?;
                Ok(Parts {
                    tag: Some(tag),
                    body,
                })
            }
            body => Ok(Parts { tag: None, body }),
        }
    }

    /// Non-empty collections need block layout; everything else fits on one line.
    fn is_block(&self) -> bool {
        match self.body {
            Value::Sequence(items) => !items.is_empty(),
            Value::Mapping(map) => !map.is_empty(),
            _ => false,
        }
    }
}

struct Emitter<'w, W: Write> {
    out: &'w mut W,
    indent_step: usize,
    quote_all: bool,
    explicit_start: bool,
    max_depth: usize,
    /// Indentation is pending: nothing has been written on the current line yet.
    at_line_start: bool,
}

impl<'w, W: Write> Emitter<'w, W> {
    fn new(out: &'w mut W, options: SerializerOptions) -> Self {
        Self {
            out,
            indent_step: options.indent_step,
            quote_all: options.quote_all,
            explicit_start: options.explicit_start,
            max_depth: options.max_depth,
            at_line_start: true,
        }
    }

    fn emit_document(&mut self, value: &Value, separated: bool) -> Result<()> {
        let parts = Parts::of(value)?;
        if parts.is_block() {
            if separated || self.explicit_start || parts.tag.is_some() {
                self.out.write_str("---")?;
                if let Some(tag) = &parts.tag {
                    self.out.write_char(' ')?;
                    self.out.write_str(tag)?;
                }
                self.newline()?;
            }
            self.emit_block(parts.body, 0, 0)
        } else {
            if separated || self.explicit_start {
                self.out.write_str("---")?;
                self.newline()?;
            }
            let text = self.inline(&parts)?;
            self.out.write_str(&text)?;
            self.newline()
        }
    }

    /// Write a non-empty collection in block style. The first line continues the current
    /// line when something (`- `, `? `, `: `) was already written on it.
    fn emit_block(&mut self, body: &Value, indent: usize, depth: usize) -> Result<()> {
        if depth >= self.max_depth {
            return Err(Error::DepthExceeded {
                limit: self.max_depth,
            });
        }
        match body {
            Value::Sequence(items) => {
                for item in items {
                    self.write_indent(indent)?;
                    self.out.write_char('-')?;
                    self.emit_compact(item, indent + 2, depth)?;
                }
            }
            Value::Mapping(map) => {
                for (key, value) in map {
                    self.write_indent(indent)?;
                    self.emit_entry(key, value, indent, depth)?;
                }
            }
            other => {
                let text = self.inline(&Parts {
                    tag: None,
                    body: other,
                })?;
                self.write_indent(indent)?;
                self.out.write_str(&text)?;
                self.newline()?;
            }
        }
        Ok(())
    }

    /// Write `value` after an indicator (`-`, `?`, `:`) that is already on the line.
    /// Untagged block content starts on the same line at `indent`; tagged block content
    /// moves to the next line.
    fn emit_compact(&mut self, value: &Value, indent: usize, depth: usize) -> Result<()> {
        let parts = Parts::of(value)?;
        if !parts.is_block() {
            let text = self.inline(&parts)?;
            self.out.write_char(' ')?;
            self.out.write_str(&text)?;
            return self.newline();
        }
        match &parts.tag {
            Some(tag) => {
                self.out.write_char(' ')?;
                self.out.write_str(tag)?;
                self.newline()?;
            }
            None => self.out.write_char(' ')?,
        }
        self.emit_block(parts.body, indent, depth + 1)
    }

    fn emit_entry(&mut self, key: &Value, value: &Value, indent: usize, depth: usize) -> Result<()> {
        let key_parts = Parts::of(key)?;
        let simple_key = match (key, key_parts.is_block(), key_parts.body) {
            (Value::Key(_), _, _) | (_, true, _) => None,
            (_, false, Value::Sequence(_) | Value::Mapping(_)) => None,
            _ => Some(self.inline(&key_parts)?).filter(|text| text.chars().count() <= MAX_SIMPLE_KEY_CHARS),
        };

        match simple_key {
            Some(text) => {
                self.out.write_str(&text)?;
                self.out.write_char(':')?;
                let parts = Parts::of(value)?;
                if !parts.is_block() {
                    let text = self.inline(&parts)?;
                    self.out.write_char(' ')?;
                    self.out.write_str(&text)?;
                    return self.newline();
                }
                if let Some(tag) = &parts.tag {
                    self.out.write_char(' ')?;
                    self.out.write_str(tag)?;
                }
                self.newline()?;
                self.emit_block(parts.body, indent + self.indent_step, depth + 1)
            }
            None => {
                self.out.write_char('?')?;
                self.emit_compact(key, indent + 2, depth)?;
                self.write_indent(indent)?;
                self.out.write_char(':')?;
                self.emit_compact(value, indent + 2, depth)
            }
        }
    }

    /// One-line text of a scalar, an empty collection, or a tagged one of those.
    fn inline(&self, parts: &Parts<'_>) -> Result<String> {
        let mut text = String::new();
        if let Some(tag) = &parts.tag {
            text.push_str(tag);
            text.push(' ');
        }
        match parts.body {
            Value::Null => text.push_str("null"),
            Value::Bool(b) => text.push_str(if *b { "true" } else { "false" }),
            Value::Int(i) => write!(text, "{i}")?,
            Value::Float(f) => push_float_string(&mut text, *f),
            Value::String(s) => self.push_string(&mut text, s, parts.tag.is_some()),
            Value::Sequence(items) if items.is_empty() => text.push_str("[]"),
            Value::Mapping(map) if map.is_empty() => text.push_str("{}"),
            Value::Opaque(_) => {
                return Err(Error::unserializable(
                    "opaque handler value has no YAML representation",
                ));
            }
            Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) | Value::Key(_) => {
                return Err(Error::unserializable("collection cannot be written inline"));
            }
        }
        Ok(text)
    }

    /// Tagged strings never resolve implicitly, so they only need quoting for structure.
    fn push_string(&self, text: &mut String, s: &str, tagged: bool) {
        if self.quote_all {
            if needs_double_quotes(s) {
                push_double_quoted(text, s);
            } else {
                push_single_quoted(text, s);
            }
        } else if (tagged && is_plain_safe(s)) || (!tagged && !needs_quotes(s)) {
            text.push_str(s);
        } else {
            push_double_quoted(text, s);
        }
    }

    /// Ensure indentation is written if we are at the start of a line.
    #[inline]
    fn write_indent(&mut self, indent: usize) -> Result<()> {
        if self.at_line_start {
            for _ in 0..indent {
                self.out.write_char(' ')?;
            }
            self.at_line_start = false;
        }
        Ok(())
    }

    /// Emit a newline and mark the next write position as line start.
    #[inline]
    fn newline(&mut self) -> Result<()> {
        self.out.write_char('\n')?;
        self.at_line_start = true;
        Ok(())
    }
}

/// Write a single-quoted string. Single quotes inside the string are escaped by doubling them.
fn push_single_quoted(text: &mut String, s: &str) {
    text.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            text.push_str("''");
        } else {
            text.push(ch);
        }
    }
    text.push('\'');
}

/// Write a double-quoted string with necessary escapes.
fn push_double_quoted(text: &mut String, s: &str) {
    text.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => text.push_str("\\\\"),
            '"' => text.push_str("\\\""),
            // YAML named escapes for common control characters
            '\0' => text.push_str("\\0"),
            '\u{7}' => text.push_str("\\a"),
            '\u{8}' => text.push_str("\\b"),
            '\t' => text.push_str("\\t"),
            '\n' => text.push_str("\\n"),
            '\u{b}' => text.push_str("\\v"),
            '\u{c}' => text.push_str("\\f"),
            '\r' => text.push_str("\\r"),
            '\u{1b}' => text.push_str("\\e"),
            '\u{FEFF}' => text.push_str("\\uFEFF"),
            // YAML named escapes for Unicode separators
            '\u{0085}' => text.push_str("\\N"),
            '\u{2028}' => text.push_str("\\L"),
            '\u{2029}' => text.push_str("\\P"),
            c if c.is_control() && (c as u32) <= 0xFF => {
                let _ = write!(text, "\\x{:02X}", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(text, "\\u{:04X}", c as u32);
            }
            c => text.push(c),
        }
    }
    text.push('"');
}
