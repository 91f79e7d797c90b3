//! JSON wire encoding for FaunaDB values
//!
//! Tagged wrappers carry the types JSON has no native form for:
//!
//! - `{"@bytes": "<base64>"}` for binary data
//! - `{"@ref": {...}}`, `{"@ts": "..."}`, `{"@date": "..."}`
//! - `{"@query": ...}` and `{"@set": {...}}` for expression payloads
//! - `{"@object": {...}}` for literal mappings inside expressions

mod decode;
mod encode;
mod error;
mod escape;

pub use decode::{decode_expr, decode_json, DecodeError};
pub use encode::{encode_json, encode_string};
pub use error::{
    decode_error_response, encode_error_response, encode_query_error, query_error_from_event,
};
pub use escape::{EscapedObject, ObjectForm};
