use std::fmt::{self, Write as _};

use crate::{MAX_SAFE_INTEGER, Value};

pub(crate) fn write_value(
    f: &mut fmt::Formatter<'_>,
    value: &Value,
    indent: Option<usize>,
) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Bool(v) => write!(f, "{v}"),
        Value::String(s) => write_str(f, s),
        Value::BigInt(v) => write!(f, "{v}"),
        Value::Number(v) => write_number(f, *v),
        Value::Array(items) => {
            if items.is_empty() {
                return f.write_str("[]");
            }
            f.write_char('[')?;
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    f.write_char(',')?;
                }
                newline(f, indent.map(|n| n + 1))?;
                write_value(f, item, indent.map(|n| n + 1))?;
            }
            newline(f, indent)?;
            f.write_char(']')
        }
        Value::Object(map) => {
            if map.is_empty() {
                return f.write_str("{}");
            }
            f.write_char('{')?;
            for (idx, (k, v)) in map.iter().enumerate() {
                if idx > 0 {
                    f.write_char(',')?;
                }
                newline(f, indent.map(|n| n + 1))?;
                write_str(f, k)?;
                f.write_str(if indent.is_some() { ": " } else { ":" })?;
                write_value(f, v, indent.map(|n| n + 1))?;
            }
            newline(f, indent)?;
            f.write_char('}')
        }
    }
}

fn newline(f: &mut fmt::Formatter<'_>, indent: Option<usize>) -> fmt::Result {
    let Some(level) = indent else {
        return Ok(());
    };
    f.write_char('\n')?;
    for _ in 0..level {
        f.write_str("  ")?;
    }
    Ok(())
}

fn write_str(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let escaped = serde_json::to_string(s).map_err(|_| fmt::Error)?;
    f.write_str(&escaped)
}

// Safe-range integral numbers print as plain integers; everything else keeps a fraction or an
// exponent, so the text decodes back to a `Number` rather than an integer literal.
fn write_number(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER as f64 {
        write!(f, "{}", v as i64)
    } else {
        write!(f, "{v:?}")
    }
}
