//! ui::output
//!
//! Result printing and diagnostics.
//!
//! # Design
//!
//! Backend results go to stdout as JSON, compact by default and two-space
//! indented with `--json`. Diagnostics go to stderr and are always a
//! single line: multi-line error descriptions are cut to their last line.

use std::fmt::Display;
use std::io::{self, Write};

use serde_json::{Map, Value};

/// How JSON results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonStyle {
    /// Two-space indentation instead of a single line
    pub pretty: bool,
    /// Sort object keys recursively instead of keeping backend order
    pub sort_keys: bool,
}

/// Render a JSON value.
///
/// Accepts anything the backend can return: objects, arrays, scalars and
/// null. Never fails.
pub fn render(value: &Value, style: JsonStyle) -> String {
    let sorted;
    let value = if style.sort_keys {
        sorted = sort_keys(value);
        &sorted
    } else {
        value
    };

    if style.pretty {
        format!("{:#}", value)
    } else {
        value.to_string()
    }
}

/// Print a rendered result followed by a newline.
pub fn print_result(out: &mut impl Write, value: &Value, style: JsonStyle) -> io::Result<()> {
    writeln!(out, "{}", render(value, style))
}

/// Copy of `value` with every object's keys in lexicographic order.
pub fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_keys(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Last non-empty line of a message, trimmed.
pub fn last_line(message: &str) -> &str {
    message
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .unwrap_or("")
}

/// Print a one-line error diagnostic.
pub fn error(err: &mut impl Write, message: impl Display) {
    let message = message.to_string();
    let _ = writeln!(err, "error: {}", last_line(&message));
}

/// Print a one-line usage message to stdout, indented by one space.
pub fn usage(out: &mut impl Write, message: impl Display) {
    let _ = writeln!(out, " {}", message);
}
