//! Wire encoding for FaunaDB
//!
//! This crate implements the JSON wire contract for FaunaDB values. Types
//! JSON cannot carry natively are written as single-key tagged objects:
//!
//! | Value | JSON Encoding |
//! |-------|---------------|
//! | Null | `null` |
//! | Boolean | `true`/`false` |
//! | Integer | number without fraction |
//! | Double | number with `.` or exponent |
//! | String | `"..."` |
//! | Bytes | `{"@bytes": "<url-safe base64>"}` |
//! | Array | `[...]` |
//! | Object (literal) | `{"@object": {...}}` |
//! | Expr (function call) | `{...}` |
//! | Ref | `{"@ref": {"id": ..., "collection": ..., "database": ...}}` |
//! | Timestamp | `{"@ts": "1970-01-01T00:00:05Z"}` |
//! | Date | `{"@date": "1970-01-03"}` |
//! | Query | `{"@query": <lambda>}` |
//! | Set | `{"@set": {...}}` |
//!
//! ## Examples
//!
//! ```
//! use faunadb_wire::{encode_json, decode_json};
//! use faunadb_core::Value;
//!
//! let value = Value::object([("map", Value::integer(1))]);
//! let json = encode_json(&value);
//! assert_eq!(json, r#"{"@object":{"map":1}}"#);
//!
//! let decoded = decode_json(&json).unwrap();
//! assert_eq!(decoded, value);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod json;

// Re-export main types
pub use json::{
    decode_error_response, decode_expr, decode_json, encode_error_response, encode_json,
    encode_query_error, encode_string, query_error_from_event, DecodeError, EscapedObject,
    ObjectForm,
};
