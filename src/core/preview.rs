//! Bounded, human-readable previews of decoded pickle values.
//!
//! Slicing follows Python's `value[0:n]`; rendering follows `pprint`:
//! a container whose one-line repr does not fit the width is broken
//! into one element per line, recursively.

use serde_pickle::{HashableValue, Value};
use thiserror::Error;

/// Errors building a preview
#[derive(Debug, Clone, Error)]
pub enum PreviewError {
    #[error("Cannot take a leading slice of a {kind} value")]
    NotSequence { kind: &'static str },
}

/// The first rows of a value, rendered
#[derive(Debug, Clone)]
pub struct Preview {
    /// Sliced value
    pub head: Value,

    /// Elements in the sliced value
    pub shown: usize,

    /// Elements in the original value
    pub total: usize,

    /// `pprint`-style rendering of `head`
    pub rendered: String,
}

impl Preview {
    /// Slice `value` to `limit` elements and render it at `width`
    pub fn build(value: &Value, limit: usize, width: usize) -> Result<Self, PreviewError> {
        let total = sequence_len(value)?;
        let head = head(value, limit)?;
        let shown = sequence_len(&head)?;
        let rendered = pformat(&head, width);

        Ok(Self {
            head,
            shown,
            total,
            rendered,
        })
    }
}

/// Python type name of a value
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::None => "NoneType",
        Value::Bool(_) => "bool",
        Value::I64(_) | Value::Int(_) => "int",
        Value::F64(_) => "float",
        Value::Bytes(_) => "bytes",
        Value::String(_) => "str",
        Value::List(_) => "list",
        Value::Tuple(_) => "tuple",
        Value::Set(_) => "set",
        Value::FrozenSet(_) => "frozenset",
        Value::Dict(_) => "dict",
    }
}

fn sequence_len(value: &Value) -> Result<usize, PreviewError> {
    match value {
        Value::List(items) | Value::Tuple(items) => Ok(items.len()),
        Value::String(s) => Ok(s.chars().count()),
        Value::Bytes(b) => Ok(b.len()),
        other => Err(PreviewError::NotSequence { kind: kind(other) }),
    }
}

/// Equivalent of `value[0:limit]`
pub fn head(value: &Value, limit: usize) -> Result<Value, PreviewError> {
    match value {
        Value::List(items) => Ok(Value::List(items.iter().take(limit).cloned().collect())),
        Value::Tuple(items) => Ok(Value::Tuple(items.iter().take(limit).cloned().collect())),
        Value::String(s) => Ok(Value::String(s.chars().take(limit).collect())),
        Value::Bytes(b) => Ok(Value::Bytes(b.iter().take(limit).copied().collect())),
        other => Err(PreviewError::NotSequence { kind: kind(other) }),
    }
}

/// Render `value` like `pprint.pformat(value, width=width)`
pub fn pformat(value: &Value, width: usize) -> String {
    let mut out = String::new();
    format_value(value, 0, 0, width, &mut out);
    out
}

/// Python `repr()` of a value on one line
pub fn repr(value: &Value) -> String {
    match value {
        Value::None => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::I64(n) => n.to_string(),
        Value::Int(n) => n.to_string(),
        Value::F64(f) => repr_float(*f),
        Value::Bytes(b) => repr_bytes(b),
        Value::String(s) => repr_str(s),
        Value::List(items) => format!("[{}]", join(items.iter().map(repr))),
        Value::Tuple(items) if items.len() == 1 => format!("({},)", repr(&items[0])),
        Value::Tuple(items) => format!("({})", join(items.iter().map(repr))),
        Value::Set(items) if items.is_empty() => "set()".to_string(),
        Value::Set(items) => format!("{{{}}}", join(items.iter().map(repr_hashable))),
        Value::FrozenSet(items) if items.is_empty() => "frozenset()".to_string(),
        Value::FrozenSet(items) => {
            format!("frozenset({{{}}})", join(items.iter().map(repr_hashable)))
        }
        Value::Dict(entries) => format!(
            "{{{}}}",
            join(
                entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", repr_hashable(k), repr(v)))
            )
        ),
    }
}

fn repr_hashable(value: &HashableValue) -> String {
    repr(&value.clone().into_value())
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(", ")
}

fn repr_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        // 1e20 -> 1e+20, 1.5e-7 -> 1.5e-07
        let sci = format!("{:e}", f);
        if let Some((mantissa, exp)) = sci.split_once('e') {
            if let Ok(exp) = exp.parse::<i32>() {
                let sign = if exp < 0 { '-' } else { '+' };
                return format!("{}e{}{:02}", mantissa, sign, exp.abs());
            }
        }
        return sci;
    }

    format!("{:?}", f)
}

fn repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn repr_bytes(b: &[u8]) -> String {
    let quote = if b.contains(&b'\'') && !b.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };

    let mut out = String::with_capacity(b.len() + 3);
    out.push('b');
    out.push(quote as char);
    for &byte in b {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            q if q == quote => {
                out.push('\\');
                out.push(q as char);
            }
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\x{:02x}", byte)),
        }
    }
    out.push(quote as char);
    out
}

/// `allowance` reserves room for the closing brackets and comma that
/// will follow this value on its last line.
fn format_value(value: &Value, indent: usize, allowance: usize, width: usize, out: &mut String) {
    let rep = repr(value);
    let available = width.saturating_sub(indent + allowance);
    if rep.chars().count() <= available {
        out.push_str(&rep);
        return;
    }

    match value {
        Value::List(items) if !items.is_empty() => {
            let children: Vec<&Value> = items.iter().collect();
            format_items(&children, "[", "]", false, indent, allowance, width, out);
        }
        Value::Tuple(items) if !items.is_empty() => {
            let children: Vec<&Value> = items.iter().collect();
            let trailing = items.len() == 1;
            format_items(&children, "(", ")", trailing, indent, allowance, width, out);
        }
        Value::Set(items) if !items.is_empty() => {
            let owned: Vec<Value> = items.iter().map(|v| v.clone().into_value()).collect();
            let children: Vec<&Value> = owned.iter().collect();
            format_items(&children, "{", "}", false, indent, allowance, width, out);
        }
        Value::FrozenSet(items) if !items.is_empty() => {
            let owned: Vec<Value> = items.iter().map(|v| v.clone().into_value()).collect();
            let children: Vec<&Value> = owned.iter().collect();
            format_items(
                &children,
                "frozenset({",
                "})",
                false,
                indent,
                allowance,
                width,
                out,
            );
        }
        Value::Dict(entries) if !entries.is_empty() => {
            out.push('{');
            let inner = indent + 1;
            let last = entries.len() - 1;
            for (i, (key, val)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                    out.push_str(&" ".repeat(inner));
                }
                let key_rep = repr_hashable(key);
                out.push_str(&key_rep);
                out.push_str(": ");
                let child_allowance = if i == last { allowance + 1 } else { 1 };
                format_value(
                    val,
                    inner + key_rep.chars().count() + 2,
                    child_allowance,
                    width,
                    out,
                );
            }
            out.push('}');
        }
        _ => out.push_str(&rep),
    }
}

#[allow(clippy::too_many_arguments)]
fn format_items(
    items: &[&Value],
    open: &str,
    close: &str,
    trailing_comma: bool,
    indent: usize,
    allowance: usize,
    width: usize,
    out: &mut String,
) {
    out.push_str(open);
    let inner = indent + open.chars().count();
    let last = items.len() - 1;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(",\n");
            out.push_str(&" ".repeat(inner));
        }
        let child_allowance = if i == last {
            allowance + close.chars().count()
        } else {
            1
        };
        format_value(item, inner, child_allowance, width, out);
    }
    if trailing_comma {
        out.push(',');
    }
    out.push_str(close);
}
