//! Rustc-like rendering of an error location inside the YAML input.

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet, renderer::DecorStyle};

use crate::error::Error;
use crate::location::Location;

/// Lines of context shown above and below the reported line.
const CONTEXT_LINES: usize = 2;

/// Render `err` (which must carry a location) against `text`.
///
/// Falls back to the plain `Display` output if the location does not map into `text`.
#[cold]
#[inline(never)]
pub(crate) fn render_error_with_snippet(err: &Error, text: &str, crop_radius: usize) -> String {
    let msg = error_message(err);
    let Some(location) = err.location() else {
        return err.to_string();
    };
    render_snippet(text, &location, &msg, crop_radius).unwrap_or_else(|| err.to_string())
}

/// The error text without the trailing "at line .., column .." suffix.
fn error_message(err: &Error) -> String {
    match err.without_snippet() {
        Error::Scan { msg, .. } | Error::Compose { msg, .. } => msg.clone(),
        Error::CyclicValue { .. } => "cyclic alias cannot be represented as a value".to_owned(),
        Error::DepthExceeded { limit, .. } => format!("nesting depth limit of {limit} exceeded"),
        Error::Budget { breach, .. } => format!("YAML budget breached: {breach:?}"),
        other => other.to_string(),
    }
}

fn render_snippet(text: &str, location: &Location, msg: &str, crop_radius: usize) -> Option<String> {
    // Parser columns ignore a leading BOM.
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let row = location.row as usize;
    let col = location.column as usize;

    let starts = line_starts(text);
    if row == 0 || row > starts.len() {
        return None;
    }
    let start = line_col_to_byte_offset(text, &starts, row, col)?;
    let end = match text.as_bytes().get(start) {
        Some(b'\n') | Some(b'\r') | None => start,
        Some(_) => next_char_boundary(text, start),
    };

    let total = starts.len();
    let first_row = row.saturating_sub(CONTEXT_LINES).max(1);
    let last_row = row.saturating_add(CONTEXT_LINES).min(total);
    let window_start = starts[first_row - 1];
    let window_end = if last_row < total { starts[last_row] } else { text.len() };

    let (window, local_start, local_end) = crop_window(
        &text[window_start..window_end],
        row - first_row,
        col,
        crop_radius,
        start - window_start,
        end - window_start,
    );

    let report = &[Level::ERROR
        .primary_title(format!("line {row} column {col}: {msg}"))
        .element(
            Snippet::source(&window)
                .line_start(first_row)
                .path("<input>")
                .fold(false)
                .annotation(AnnotationKind::Primary.span(local_start..local_end).label(msg)),
        )];
    let renderer = Renderer::plain().decor_style(DecorStyle::Ascii);
    Some(renderer.render(report).to_string())
}

/// Crop every line of `window` to the same column range around `col`.
///
/// Returns the cropped text together with the annotation span remapped into it.
fn crop_window(
    window: &str,
    error_line_idx: usize,
    col: usize,
    radius: usize,
    local_start: usize,
    local_end: usize,
) -> (String, usize, usize) {
    let widest = window.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    if radius == 0 || widest <= radius.saturating_mul(2) {
        return (window.to_owned(), local_start, local_end);
    }
    let left = col.saturating_sub(radius).max(1);
    let right = col.saturating_add(radius);

    let mut out = String::with_capacity(window.len());
    let mut new_start = 0;
    let mut new_end = 0;
    let mut consumed = 0;
    for (idx, line) in window.split_inclusive('\n').enumerate() {
        let body = line.trim_end_matches(['\n', '\r']);
        let cropped: String = body
            .chars()
            .skip(left - 1)
            .take(right + 1 - left)
            .collect();
        if idx == error_line_idx {
            let in_line_start = local_start - consumed;
            let in_line_end = local_end - consumed;
            let chars_before = body[..in_line_start.min(body.len())].chars().count();
            let chars_span = body[in_line_start.min(body.len())..in_line_end.min(body.len())]
                .chars()
                .count();
            let rel = chars_before.saturating_sub(left - 1);
            let byte_rel: usize = cropped.chars().take(rel).map(char::len_utf8).sum();
            let byte_span: usize = cropped.chars().skip(rel).take(chars_span).map(char::len_utf8).sum();
            new_start = out.len() + byte_rel;
            new_end = new_start + byte_span;
        }
        consumed += line.len();
        out.push_str(&cropped);
        if line.ends_with('\n') {
            out.push('\n');
        }
    }
    (out, new_start, new_end)
}

fn line_starts(source: &str) -> Vec<usize> {
    if source.is_empty() {
        return Vec::new();
    }
    let mut starts = vec![0usize];
    for (i, b) in source.as_bytes().iter().enumerate() {
        if *b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

fn line_col_to_byte_offset(source: &str, starts: &[usize], row: usize, col: usize) -> Option<usize> {
    if col == 0 {
        return None;
    }
    let line_start = *starts.get(row - 1)?;
    let mut line_end = match starts.get(row) {
        Some(next) => next.saturating_sub(1),
        None => source.len(),
    };
    if line_end > line_start && source.as_bytes().get(line_end - 1) == Some(&b'\r') {
        line_end -= 1;
    }
    let line = &source[line_start..line_end];
    // Column one past the last character points at the line end.
    let mut chars = line.char_indices();
    for _ in 1..col {
        if chars.next().is_none() {
            return None;
        }
    }
    let offset = chars.next().map(|(i, _)| i).unwrap_or(line.len());
    Some(line_start + offset)
}

fn next_char_boundary(source: &str, start: usize) -> usize {
    source[start..]
        .chars()
        .next()
        .map(|c| start + c.len_utf8())
        .unwrap_or(source.len())
}
