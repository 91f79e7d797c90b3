//! Value types for FaunaDB queries and results
//!
//! One closed enum serves both as the query AST the caller authors and as the
//! result tree the server returns. The only place where the two roles need to
//! be told apart is a mapping: a literal object written by the caller and a
//! function call (`{"map": ..., "collection": ...}`) are both JSON objects on
//! the wire. [`Value::Object`] is the literal, [`Value::Expr`] is the call;
//! the choice is made when the node is built and never re-derived from keys.
//!
//! ## Equality Rules
//!
//! - Different variants are NEVER equal (`Integer(1) != Double(1.0)`,
//!   `Object(m) != Expr(m)`)
//! - Object equality ignores insertion order
//! - Double uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`

use crate::{Bytes, RefV};
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;

/// String-keyed mapping of values
///
/// Iteration follows insertion order so that encoded output is stable;
/// equality does not depend on it.
pub type Object = IndexMap<String, Value>;

/// Reserved wire keys that mark a non-generic JSON object
///
/// This is the single table mapping tag strings to value variants. The
/// decoder resolves keys through [`WireTag::from_key`] and the encoder writes
/// [`WireTag::as_str`]; adding a tagged type touches this enum only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireTag {
    /// `@bytes`: url-safe base64 string
    Bytes,
    /// `@ref`: `{"id", "collection"?, "database"?}`
    Ref,
    /// `@ts`: RFC 3339 timestamp string
    Ts,
    /// `@date`: `YYYY-MM-DD` string
    Date,
    /// `@query`: lambda expression
    Query,
    /// `@set`: set expression mapping
    Set,
    /// `@object`: escaped literal mapping
    Object,
}

impl WireTag {
    /// Every tag, in no particular order
    pub const ALL: [WireTag; 7] = [
        WireTag::Bytes,
        WireTag::Ref,
        WireTag::Ts,
        WireTag::Date,
        WireTag::Query,
        WireTag::Set,
        WireTag::Object,
    ];

    /// The reserved key as written on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            WireTag::Bytes => "@bytes",
            WireTag::Ref => "@ref",
            WireTag::Ts => "@ts",
            WireTag::Date => "@date",
            WireTag::Query => "@query",
            WireTag::Set => "@set",
            WireTag::Object => "@object",
        }
    }

    /// Resolve an object key to a tag
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "@bytes" => Some(WireTag::Bytes),
            "@ref" => Some(WireTag::Ref),
            "@ts" => Some(WireTag::Ts),
            "@date" => Some(WireTag::Date),
            "@query" => Some(WireTag::Query),
            "@set" => Some(WireTag::Set),
            "@object" => Some(WireTag::Object),
            _ => None,
        }
    }
}

/// A FaunaDB value: query expression or query result
#[derive(Debug, Clone)]
pub enum Value {
    /// JSON null
    Null,

    /// Boolean
    Boolean(bool),

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit IEEE-754 floating point
    Double(f64),

    /// UTF-8 string
    String(String),

    /// Binary data, distinct from String
    Bytes(Bytes),

    /// Ordered sequence of values
    Array(Vec<Value>),

    /// Literal mapping authored by the caller or returned by the server
    Object(Object),

    /// Function-form mapping: its keys name a query function
    Expr(Object),

    /// Reference to a document or schema entity
    Ref(RefV),

    /// Point in time with nanosecond precision
    Timestamp(DateTime<Utc>),

    /// Calendar date
    Date(NaiveDate),

    /// Query literal wrapping a lambda expression
    Query(Box<Value>),

    /// Set expression
    Set(Object),
}

impl Value {
    /// JSON null
    pub fn null() -> Self {
        Value::Null
    }

    /// Boolean value
    pub fn boolean(b: bool) -> Self {
        Value::Boolean(b)
    }

    /// Integer value
    pub fn integer(i: i64) -> Self {
        Value::Integer(i)
    }

    /// Double value
    pub fn double(f: f64) -> Self {
        Value::Double(f)
    }

    /// String value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Bytes value; the input is copied
    pub fn bytes(b: impl AsRef<[u8]>) -> Self {
        Value::Bytes(Bytes::new(b))
    }

    /// Array value
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(items.into_iter().collect())
    }

    /// Literal object; always escaped on the wire
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(collect_entries(entries))
    }

    /// Function-form object; written bare on the wire
    pub fn expr<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Expr(collect_entries(entries))
    }

    /// Single-argument function call, e.g. `call("var", "x")` → `{"var": "x"}`
    pub fn call(name: impl Into<String>, arg: impl Into<Value>) -> Self {
        let mut obj = Object::with_capacity(1);
        obj.insert(name.into(), arg.into());
        Value::Expr(obj)
    }

    /// Query literal around a lambda expression
    pub fn query(lambda: Value) -> Self {
        Value::Query(Box::new(lambda))
    }

    /// Set expression
    pub fn set<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Set(collect_entries(entries))
    }

    /// Returns the type name as a string (for error messages)
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
            Value::Expr(_) => "Expr",
            Value::Ref(_) => "Ref",
            Value::Timestamp(_) => "Timestamp",
            Value::Date(_) => "Date",
            Value::Query(_) => "Query",
            Value::Set(_) => "Set",
        }
    }

    /// The canonical wire tag of this variant, if it has one
    pub fn wire_tag(&self) -> Option<WireTag> {
        match self {
            Value::Bytes(_) => Some(WireTag::Bytes),
            Value::Object(_) => Some(WireTag::Object),
            Value::Ref(_) => Some(WireTag::Ref),
            Value::Timestamp(_) => Some(WireTag::Ts),
            Value::Date(_) => Some(WireTag::Date),
            Value::Query(_) => Some(WireTag::Query),
            Value::Set(_) => Some(WireTag::Set),
            _ => None,
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f64
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as bytes slice
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    /// Try to get as array slice
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Try to get as a literal object
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Try to get as a function-form object
    pub fn as_expr(&self) -> Option<&Object> {
        match self {
            Value::Expr(o) => Some(o),
            _ => None,
        }
    }

    /// Try to get as a reference
    pub fn as_ref_v(&self) -> Option<&RefV> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    /// Try to get as a timestamp
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Try to get as a date
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Field of an object (literal or function-form)
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(o) | Value::Expr(o) | Value::Set(o) => o.get(key),
            _ => None,
        }
    }

    /// Follow a path of object keys and array indices
    ///
    /// Segments address object fields by name and array elements by decimal
    /// index. Returns `None` as soon as a segment does not resolve.
    ///
    /// ```
    /// use faunadb_core::Value;
    ///
    /// let event = Value::object([
    ///     ("type", Value::string("error")),
    ///     ("event", Value::object([("code", Value::string("invalid ref"))])),
    /// ]);
    /// assert_eq!(event.at(["event", "code"]).and_then(Value::as_str), Some("invalid ref"));
    /// ```
    pub fn at<I, S>(&self, path: I) -> Option<&Value>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut current = self;
        for segment in path {
            let segment = segment.as_ref();
            current = match current {
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                other => other.get(segment)?,
            };
        }
        Some(current)
    }
}

fn collect_entries<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Object {
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<RefV> for Value {
    fn from(r: RefV) -> Self {
        Value::Ref(r)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Array(iter.into_iter().collect())
    }
}

// ============================================================================
// Custom PartialEq Implementation (IEEE-754 semantics, no type coercion)
// ============================================================================

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Expr(a), Value::Expr(b)) => a == b,
            (Value::Ref(a), Value::Ref(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Query(a), Value::Query(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,

            // Different variants: NEVER equal
            _ => false,
        }
    }
}

// Eq is implemented even though Double(NaN) is not reflexive, so that values
// can key hash maps. Callers comparing NaN-carrying trees get IEEE-754 answers.
impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Double(f) => {
                // -0.0 and 0.0 are equal, so they must hash alike
                if *f == 0.0 {
                    0u64.hash(state);
                } else {
                    f.to_bits().hash(state);
                }
            }
            Value::String(s) => s.hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::Array(a) => {
                a.len().hash(state);
                for v in a {
                    v.hash(state);
                }
            }
            Value::Object(o) | Value::Expr(o) | Value::Set(o) => hash_object(o, state),
            Value::Ref(r) => r.hash(state),
            Value::Timestamp(t) => t.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Query(q) => q.hash(state),
        }
    }
}

/// Hash entries in sorted key order so equal objects hash alike
fn hash_object<H: std::hash::Hasher>(o: &Object, state: &mut H) {
    use std::hash::Hash;

    let mut entries: Vec<_> = o.iter().collect();
    entries.sort_by_key(|(k, _)| *k);
    entries.len().hash(state);
    for (k, v) in entries {
        k.hash(state);
        v.hash(state);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod construction_tests {
        use super::*;

        #[test]
        fn test_scalar_factories() {
            assert!(matches!(Value::null(), Value::Null));
            assert!(matches!(Value::boolean(true), Value::Boolean(true)));
            assert!(matches!(Value::integer(i64::MIN), Value::Integer(i64::MIN)));
            assert!(matches!(Value::double(1.5), Value::Double(f) if f == 1.5));
            assert!(matches!(Value::string("hi"), Value::String(ref s) if s == "hi"));
        }

        #[test]
        fn test_from_conversions() {
            assert_eq!(Value::from(10), Value::Integer(10));
            assert_eq!(Value::from(10i64), Value::Integer(10));
            assert_eq!(Value::from(true), Value::Boolean(true));
            assert_eq!(Value::from(2.5), Value::Double(2.5));
            assert_eq!(Value::from("a string"), Value::String("a string".into()));
            assert_eq!(Value::from(None::<i64>), Value::Null);
        }

        #[test]
        fn test_object_preserves_insertion_order() {
            let v = Value::object([("z", Value::from(1)), ("a", Value::from(2))]);
            let keys: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
            assert_eq!(keys, vec!["z".to_string(), "a".to_string()]);
        }

        #[test]
        fn test_call_builds_function_form() {
            let v = Value::call("var", "x");
            assert!(v.as_object().is_none());
            assert_eq!(v.as_expr().unwrap().get("var"), Some(&Value::from("x")));
        }

        #[test]
        fn test_array_from_iterator() {
            let v: Value = (1i64..=3).map(Value::from).collect();
            assert_eq!(v.as_array().map(<[Value]>::len), Some(3));
        }
    }

    mod wire_tag_tests {
        use super::*;

        #[test]
        fn test_tag_table_is_bijective() {
            for tag in WireTag::ALL {
                assert_eq!(WireTag::from_key(tag.as_str()), Some(tag));
            }
            let keys: std::collections::HashSet<_> = WireTag::ALL.iter().map(|t| t.as_str()).collect();
            assert_eq!(keys.len(), WireTag::ALL.len());
        }

        #[test]
        fn test_unknown_keys() {
            assert_eq!(WireTag::from_key("@obj"), None);
            assert_eq!(WireTag::from_key("object"), None);
            assert_eq!(WireTag::from_key("bytes"), None);
        }

        #[test]
        fn test_variant_tags() {
            assert_eq!(Value::bytes([1]).wire_tag(), Some(WireTag::Bytes));
            assert_eq!(Value::object::<&str>([]).wire_tag(), Some(WireTag::Object));
            assert_eq!(Value::expr::<&str>([]).wire_tag(), None);
            assert_eq!(Value::Ref(RefV::new("x")).wire_tag(), Some(WireTag::Ref));
            assert_eq!(Value::query(Value::Null).wire_tag(), Some(WireTag::Query));
            assert_eq!(Value::Array(vec![]).wire_tag(), None);
        }
    }

    mod accessor_tests {
        use super::*;

        #[test]
        fn test_typed_accessors() {
            assert_eq!(Value::Boolean(true).as_bool(), Some(true));
            assert_eq!(Value::Integer(1).as_bool(), None);
            assert_eq!(Value::Integer(42).as_integer(), Some(42));
            assert_eq!(Value::Double(42.0).as_integer(), None);
            assert_eq!(Value::Double(3.5).as_double(), Some(3.5));
            assert_eq!(Value::from("s").as_str(), Some("s"));
            assert_eq!(Value::bytes(b"s").as_str(), None);
            assert_eq!(Value::bytes([1, 2]).as_bytes(), Some(&[1u8, 2][..]));
        }

        #[test]
        fn test_at_follows_objects_and_arrays() {
            let v = Value::object([(
                "data",
                Value::array([Value::object([("id", Value::from("7"))])]),
            )]);
            assert_eq!(v.at(["data", "0", "id"]), Some(&Value::from("7")));
            assert_eq!(v.at(["data", "1", "id"]), None);
            assert_eq!(v.at(["data", "x"]), None);
            assert_eq!(v.at(Vec::<&str>::new()), Some(&v));
        }

        #[test]
        fn test_get_on_non_object() {
            assert_eq!(Value::Integer(1).get("a"), None);
        }
    }

    mod equality_tests {
        use super::*;

        #[test]
        fn test_object_equality_ignores_order() {
            let a = Value::object([("a", Value::from(1)), ("b", Value::from(2))]);
            let b = Value::object([("b", Value::from(2)), ("a", Value::from(1))]);
            assert_eq!(a, b);
        }

        #[test]
        fn test_array_order_matters() {
            let a = Value::array([Value::from(1), Value::from(2)]);
            let b = Value::array([Value::from(2), Value::from(1)]);
            assert_ne!(a, b);
        }

        #[test]
        fn test_literal_never_equals_function_form() {
            let literal = Value::object([("map", Value::from(1))]);
            let call = Value::expr([("map", Value::from(1))]);
            assert_ne!(literal, call);
        }

        #[test]
        fn test_no_coercion() {
            assert_ne!(Value::Integer(1), Value::Double(1.0));
            assert_ne!(Value::Null, Value::Boolean(false));
            assert_ne!(Value::from("abc"), Value::bytes(b"abc"));
            assert_ne!(Value::Array(vec![]), Value::Null);
        }

        #[test]
        fn test_ieee_float_equality() {
            assert_ne!(Value::Double(f64::NAN), Value::Double(f64::NAN));
            assert_eq!(Value::Double(-0.0), Value::Double(0.0));
        }

        #[test]
        fn test_deep_equality() {
            let build = || {
                Value::array([Value::object([(
                    "nested",
                    Value::array([Value::bytes([1, 2]), Value::Ref(RefV::collection("c"))]),
                )])])
            };
            assert_eq!(build(), build());
        }
    }

    mod hash_tests {
        use super::*;
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        fn hash_value(v: &Value) -> u64 {
            let mut hasher = DefaultHasher::new();
            v.hash(&mut hasher);
            hasher.finish()
        }

        #[test]
        fn test_object_hash_order_independent() {
            let a = Value::object([("x", Value::from(1)), ("y", Value::from(2))]);
            let b = Value::object([("y", Value::from(2)), ("x", Value::from(1))]);
            assert_eq!(hash_value(&a), hash_value(&b));
        }

        #[test]
        fn test_negative_zero_positive_zero_same_hash() {
            assert_eq!(hash_value(&Value::Double(-0.0)), hash_value(&Value::Double(0.0)));
        }

        #[test]
        fn test_literal_and_call_hash_differently() {
            let literal = Value::object([("map", Value::from(1))]);
            let call = Value::expr([("map", Value::from(1))]);
            assert_ne!(hash_value(&literal), hash_value(&call));
        }
    }
}
