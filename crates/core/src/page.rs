//! Typed projection of a paginated result
//!
//! A page is an ordinary object on the wire:
//! ```json
//! {"data": [...], "before": [...], "after": [...]}
//! ```
//! `before` and `after` are opaque cursors. They are plain arrays and are
//! submitted back verbatim to fetch the neighbouring page.

use crate::{Value, ValueError};

/// An opaque position marker for resuming a paginated read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(Vec<Value>);

impl Cursor {
    /// Wrap the raw cursor array
    pub fn new(values: Vec<Value>) -> Self {
        Cursor(values)
    }

    /// The raw cursor elements
    pub fn values(&self) -> &[Value] {
        &self.0
    }
}

impl From<Cursor> for Value {
    fn from(c: Cursor) -> Self {
        Value::Array(c.0)
    }
}

/// A single page of results
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Page {
    /// Page contents; what these are depends on the query
    pub data: Vec<Value>,
    /// Cursor to the previous page
    pub before: Option<Cursor>,
    /// Cursor to the next page
    pub after: Option<Cursor>,
}

impl Page {
    /// A page with no neighbours
    pub fn new(data: Vec<Value>) -> Self {
        Page {
            data,
            before: None,
            after: None,
        }
    }
}

impl TryFrom<&Value> for Page {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let obj = value.as_object().ok_or(ValueError::WrongType {
            expected: "Object",
            actual: value.type_name(),
        })?;

        let data = match obj.get("data") {
            Some(Value::Array(items)) => items.clone(),
            Some(other) => {
                return Err(ValueError::WrongType {
                    expected: "Array",
                    actual: other.type_name(),
                })
            }
            None => return Err(ValueError::MissingField("data".to_string())),
        };

        Ok(Page {
            data,
            before: cursor_field(value, "before")?,
            after: cursor_field(value, "after")?,
        })
    }
}

impl TryFrom<Value> for Page {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Page::try_from(&value)
    }
}

fn cursor_field(page: &Value, direction: &str) -> Result<Option<Cursor>, ValueError> {
    match page.get(direction) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(Cursor(items.clone()))),
        Some(other) => Err(ValueError::WrongType {
            expected: "Array",
            actual: other.type_name(),
        }),
    }
}

impl From<Page> for Value {
    fn from(page: Page) -> Self {
        let mut entries = vec![("data", Value::Array(page.data))];
        if let Some(before) = page.before {
            entries.push(("before", before.into()));
        }
        if let Some(after) = page.after {
            entries.push(("after", after.into()));
        }
        Value::object(entries)
    }
}
