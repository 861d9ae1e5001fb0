use crate::{DataError, Result, separated_by, truncate_long};
use std::fmt::Write;

pub use serde_json::{Value as JsonValue, json};

/// Writes the canonical form of `value`: no whitespace, object keys sorted by their UTF-8
/// bytes at every nesting level, array order preserved.
///
/// Two structurally equal values always produce the same bytes, whatever the insertion order
/// of their objects was.
pub fn write_canonical_json(out: &mut String, value: &JsonValue) {
    match value {
        JsonValue::Null => out.push_str("null"),
        JsonValue::Bool(v) => out.push_str(["false", "true"][*v as usize]),
        JsonValue::Number(v) => {
            let _ = write!(out, "{}", v);
        }
        JsonValue::String(v) => write_json_string(out, v),
        JsonValue::Array(values) => {
            out.push('[');
            separated_by(out, values, |out, v| write_canonical_json(out, v), ",");
            out.push(']');
        }
        JsonValue::Object(map) => {
            let mut entries = map.iter().collect::<Vec<_>>();
            entries.sort_unstable_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
            out.push('{');
            separated_by(
                out,
                entries,
                |out, (k, v)| {
                    write_json_string(out, k);
                    out.push(':');
                    write_canonical_json(out, v);
                },
                ",",
            );
            out.push('}');
        }
    }
}

pub fn canonical_json(value: &JsonValue) -> String {
    let mut out = String::with_capacity(64);
    write_canonical_json(&mut out, value);
    out
}

/// Parses the wire form of a JSON value.
pub fn parse_json(input: &str) -> Result<JsonValue> {
    serde_json::from_str(input).map_err(|e| {
        DataError::type_mismatch(format!(
            "`{}` is not valid JSON: {}",
            truncate_long!(input),
            e
        ))
        .into()
    })
}

fn write_json_string(out: &mut String, value: &str) {
    out.push('"');
    let mut position = 0;
    for (i, c) in value.char_indices() {
        let escaped = match c {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            '\u{08}' => "\\b",
            '\u{0C}' => "\\f",
            c if (c as u32) < 0x20 => "",
            _ => continue,
        };
        out.push_str(&value[position..i]);
        if escaped.is_empty() {
            let _ = write!(out, "\\u{:04x}", c as u32);
        } else {
            out.push_str(escaped);
        }
        position = i + c.len_utf8();
    }
    out.push_str(&value[position..]);
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_characters() {
        let mut out = String::new();
        write_json_string(&mut out, "a\"b\\c\nd\u{01}é");
        assert_eq!(out, "\"a\\\"b\\\\c\\nd\\u0001é\"");
    }

    #[test]
    fn matches_serde_for_strings() {
        for s in ["plain", "tab\there", "quote\"", "\u{1f}", "ünïcödé ✓"] {
            let mut out = String::new();
            write_json_string(&mut out, s);
            assert_eq!(out, serde_json::to_string(s).unwrap());
        }
    }
}
