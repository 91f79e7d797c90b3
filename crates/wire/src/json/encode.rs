//! JSON encoding for FaunaDB values
//!
//! Implements encoding of Value to JSON strings with tagged wrappers:
//! - `@bytes` for binary data (url-safe base64)
//! - `@object` for literal mappings (see [`escape`](super::escape))
//! - `@ref`, `@ts`, `@date`, `@query`, `@set` for the special types

use super::escape::{write_object, ObjectForm};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::SecondsFormat;
use faunadb_core::{Object, RefV, Value, WireTag};

/// Encode a Value to JSON string
///
/// Total: every constructible value encodes. Non-finite doubles have no JSON
/// form and are written as `null`.
pub fn encode_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

pub(crate) fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Double(f) => write_double(out, *f),
        Value::String(s) => write_string(out, s),
        Value::Bytes(b) => {
            write_tagged(out, WireTag::Bytes, |out| {
                write_string(out, &URL_SAFE.encode(b.as_slice()))
            });
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(obj) => write_object(out, ObjectForm::Literal, obj),
        Value::Expr(obj) => write_object(out, ObjectForm::Call, obj),
        Value::Ref(r) => write_ref(out, r),
        Value::Timestamp(t) => {
            write_tagged(out, WireTag::Ts, |out| {
                write_string(out, &t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            });
        }
        Value::Date(d) => {
            write_tagged(out, WireTag::Date, |out| {
                write_string(out, &d.format("%Y-%m-%d").to_string())
            });
        }
        Value::Query(lambda) => write_tagged(out, WireTag::Query, |out| write_value(out, lambda)),
        Value::Set(obj) => write_tagged(out, WireTag::Set, |out| write_mapping(out, obj)),
    }
}

/// `{"<tag>":<payload>}`
fn write_tagged(out: &mut String, tag: WireTag, payload: impl FnOnce(&mut String)) {
    out.push('{');
    write_string(out, tag.as_str());
    out.push(':');
    payload(out);
    out.push('}');
}

/// Encode a double, ensuring a decimal point so it decodes as a double
fn write_double(out: &mut String, f: f64) {
    if !f.is_finite() {
        out.push_str("null");
        return;
    }
    let s = f.to_string();
    out.push_str(&s);
    if !(s.contains('.') || s.contains('e') || s.contains('E')) {
        out.push_str(".0");
    }
}

/// Encode a string with proper JSON escaping
pub fn encode_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    write_string(&mut out, s);
    out
}

pub(crate) fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Write a mapping bare, keys in insertion order
pub(crate) fn write_mapping(out: &mut String, obj: &Object) {
    out.push('{');
    for (i, (k, v)) in obj.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(out, k);
        out.push(':');
        write_value(out, v);
    }
    out.push('}');
}

/// `{"@ref":{"id":…,"collection":…,"database":…}}`
fn write_ref(out: &mut String, r: &RefV) {
    write_tagged(out, WireTag::Ref, |out| {
        out.push_str("{\"id\":");
        write_string(out, r.id());
        if let Some(collection) = r.collection_ref() {
            out.push_str(",\"collection\":");
            write_ref(out, collection);
        }
        if let Some(database) = r.database_ref() {
            out.push_str(",\"database\":");
            write_ref(out, database);
        }
        out.push('}');
    });
}
