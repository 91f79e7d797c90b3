//! Core value model for the FaunaDB client
//!
//! A query and its result share one recursive type, [`Value`]. Expressions are
//! built bottom-up by the caller, results are built by the wire decoder, and
//! neither is mutated after construction.
//!
//! - [`Value`]: the closed sum type for expressions and results
//! - [`WireTag`]: the reserved `@`-keys that mark non-generic wire shapes
//! - [`Bytes`], [`RefV`]: payloads of the tagged variants
//! - [`Page`], [`Cursor`]: typed projection of a paginated result
//! - [`QueryError`]: errors reported by the remote evaluator

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bytes;
pub mod error;
pub mod page;
pub mod query_error;
pub mod reference;
pub mod value;

pub use bytes::Bytes;
pub use error::ValueError;
pub use page::{Cursor, Page};
pub use query_error::{QueryError, QueryErrorResponse, ValidationFailure, INTERNAL_EXCEPTION};
pub use reference::RefV;
pub use value::{Object, Value, WireTag};
