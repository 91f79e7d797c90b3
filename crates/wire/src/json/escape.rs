//! Escaping of literal objects
//!
//! A function call and a literal mapping are both JSON objects on the wire,
//! and a literal may legitimately use a function name as a key. Every literal
//! mapping is therefore wrapped as `{"@object": {...}}`; function-form
//! mappings are written bare. Which of the two a node is comes from how it
//! was built ([`Value::Object`] vs [`Value::Expr`]), never from its keys.

use super::encode::write_mapping;
use faunadb_core::{Object, Value, WireTag};

/// How an object node is written on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectForm {
    /// Caller-authored or server-returned mapping: escaped
    Literal,
    /// Function invocation: written bare
    Call,
}

impl ObjectForm {
    /// Classify an object node; `None` for every other variant
    pub fn of(value: &Value) -> Option<(ObjectForm, &Object)> {
        match value {
            Value::Object(obj) => Some((ObjectForm::Literal, obj)),
            Value::Expr(obj) => Some((ObjectForm::Call, obj)),
            _ => None,
        }
    }
}

/// A literal mapping marked for escaping
///
/// Exists only while a value is being serialized.
#[derive(Debug, Clone, Copy)]
pub struct EscapedObject<'a>(&'a Object);

impl<'a> EscapedObject<'a> {
    /// Mark `obj` as a literal
    pub fn new(obj: &'a Object) -> Self {
        EscapedObject(obj)
    }

    /// The wrapped mapping
    pub fn inner(&self) -> &'a Object {
        self.0
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        out.push_str("{\"");
        out.push_str(WireTag::Object.as_str());
        out.push_str("\":");
        write_mapping(out, self.0);
        out.push('}');
    }
}

/// Write an object node in the given form
pub(crate) fn write_object(out: &mut String, form: ObjectForm, obj: &Object) {
    match form {
        ObjectForm::Literal => EscapedObject::new(obj).write_to(out),
        ObjectForm::Call => write_mapping(out, obj),
    }
}
