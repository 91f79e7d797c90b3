//! JSON decoding for FaunaDB values
//!
//! Implements decoding of JSON strings to Value, recognizing tagged wrappers.
//! A JSON object whose only key is a [`WireTag`] decodes into the matching
//! variant; every other object decodes to a plain mapping.
//!
//! Decoding runs in one of two contexts. Results are data: a bare mapping is
//! a literal [`Value::Object`]. Expressions (the payload of `@query` and
//! `@set`, or a whole document passed to [`decode_expr`]) treat a bare
//! mapping as a function call, [`Value::Expr`], and only `@object` yields a
//! literal.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use faunadb_core::{Object, RefV, Value, WireTag};
use std::ops::Range;
use thiserror::Error;

/// Longest excerpt of the input quoted in a syntax error
const FRAGMENT_CHARS: usize = 32;

/// Deepest array/object nesting accepted
const MAX_DEPTH: usize = 512;

/// Url-safe alphabet, padding optional
const BASE64_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Input ended inside a document
    #[error("Unexpected end of input")]
    UnexpectedEnd,

    /// Invalid JSON syntax
    #[error("Invalid JSON at offset {offset}: {message} (near `{fragment}`)")]
    Syntax {
        /// Byte offset of the failure
        offset: usize,
        /// What was expected
        message: &'static str,
        /// Input starting at the offset
        fragment: String,
    },

    /// Malformed number, or an integral literal outside the i64 range
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    /// Invalid base64 in an `@bytes` wrapper
    #[error("Invalid base64 `{fragment}`: {reason}")]
    InvalidBase64 {
        /// The offending payload
        fragment: String,
        /// Decoder message
        reason: String,
    },

    /// A tagged wrapper whose payload has the wrong shape
    #[error("Malformed {tag} payload: expected {expected}, found `{fragment}`")]
    MalformedTag {
        /// The wire tag
        tag: &'static str,
        /// Shape the tag requires
        expected: &'static str,
        /// The offending payload
        fragment: String,
    },

    /// A required field is absent
    #[error("Missing field `{field}` in `{fragment}`")]
    MissingField {
        /// Field name
        field: &'static str,
        /// The enclosing document
        fragment: String,
    },

    /// Characters after a complete document
    #[error("Trailing characters at offset {offset}: `{fragment}`")]
    TrailingCharacters {
        /// Byte offset of the first extra character
        offset: usize,
        /// Input starting at the offset
        fragment: String,
    },

    /// An error body that does not have the expected shape
    #[error("Invalid error response: {reason} (in `{fragment}`)")]
    ErrorBody {
        /// serde_json message
        reason: String,
        /// The body
        fragment: String,
    },
}

/// Decode a JSON document to a result Value
pub fn decode_json(json: &str) -> Result<Value, DecodeError> {
    decode_in(json, Context::Data)
}

/// Decode a JSON document as a query expression
///
/// Bare mappings become [`Value::Expr`]; `@object` becomes [`Value::Object`].
/// This is the inverse of [`encode_json`](super::encode_json) for expression
/// trees.
pub fn decode_expr(json: &str) -> Result<Value, DecodeError> {
    decode_in(json, Context::Expr)
}

fn decode_in(json: &str, ctx: Context) -> Result<Value, DecodeError> {
    let mut parser = JsonParser::new(json);
    parser.skip_whitespace();
    if parser.peek().is_none() {
        return Err(DecodeError::UnexpectedEnd);
    }

    let node = parser.parse_value()?;

    parser.skip_whitespace();
    if parser.peek().is_some() {
        return Err(DecodeError::TrailingCharacters {
            offset: parser.pos,
            fragment: parser.fragment(),
        });
    }
    Tags { input: json }.value(node, ctx)
}

/// How a bare mapping is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Data,
    Expr,
}

impl Context {
    fn mapping(self, obj: Object) -> Value {
        match self {
            Context::Data => Value::Object(obj),
            Context::Expr => Value::Expr(obj),
        }
    }
}

/// A parsed JSON value, before tags are interpreted
struct Node {
    /// Where the value sits in the input
    span: Range<usize>,
    kind: NodeKind,
}

enum NodeKind {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Array(Vec<Node>),
    /// Entries in document order
    Object(Vec<(String, Node)>),
}

/// Simple JSON parser
struct JsonParser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> JsonParser<'a> {
    fn new(input: &'a str) -> Self {
        JsonParser {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\n' | '\r') = self.peek() {
            self.advance();
        }
    }

    fn fragment(&self) -> String {
        self.input[self.pos..].chars().take(FRAGMENT_CHARS).collect()
    }

    fn syntax(&self, message: &'static str) -> DecodeError {
        if self.peek().is_none() {
            return DecodeError::UnexpectedEnd;
        }
        DecodeError::Syntax {
            offset: self.pos,
            message,
            fragment: self.fragment(),
        }
    }

    fn expect(&mut self, c: char, message: &'static str) -> Result<(), DecodeError> {
        if self.peek() == Some(c) {
            self.advance();
            Ok(())
        } else {
            Err(self.syntax(message))
        }
    }

    fn parse_value(&mut self) -> Result<Node, DecodeError> {
        self.skip_whitespace();
        let start = self.pos;

        let kind = match self.peek() {
            None => return Err(DecodeError::UnexpectedEnd),
            Some('n') => self.parse_literal("null", NodeKind::Null)?,
            Some('t') => self.parse_literal("true", NodeKind::Boolean(true))?,
            Some('f') => self.parse_literal("false", NodeKind::Boolean(false))?,
            Some('"') => NodeKind::String(self.parse_string()?),
            Some('[') => self.nested(|p| p.parse_array())?,
            Some('{') => self.nested(|p| p.parse_object())?,
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number()?,
            Some(_) => return Err(self.syntax("expected a value")),
        };
        Ok(Node {
            span: start..self.pos,
            kind,
        })
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.syntax("nesting too deep"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_literal(
        &mut self,
        word: &'static str,
        kind: NodeKind,
    ) -> Result<NodeKind, DecodeError> {
        if self.input[self.pos..].starts_with(word) {
            self.pos += word.len();
            Ok(kind)
        } else {
            Err(self.syntax("expected `null`, `true` or `false`"))
        }
    }

    fn parse_string(&mut self) -> Result<String, DecodeError> {
        self.advance(); // consume opening quote
        let mut result = String::new();

        loop {
            match self.peek() {
                None => return Err(DecodeError::UnexpectedEnd),
                Some('"') => {
                    self.advance();
                    return Ok(result);
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.peek() {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('b') => '\x08',
                        Some('f') => '\x0c',
                        Some('u') => {
                            self.advance();
                            result.push(self.parse_unicode_escape()?);
                            continue;
                        }
                        Some(_) => return Err(self.syntax("invalid escape")),
                        None => return Err(DecodeError::UnexpectedEnd),
                    };
                    result.push(escaped);
                    self.advance();
                }
                Some(c) if c < '\u{20}' => {
                    return Err(self.syntax("unescaped control character in string"))
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }
    }

    /// Four hex digits after `\u`, combining UTF-16 surrogate pairs
    fn parse_unicode_escape(&mut self) -> Result<char, DecodeError> {
        let high = self.parse_hex4()?;
        if !(0xD800..0xDC00).contains(&high) {
            return char::from_u32(high).ok_or_else(|| self.syntax("invalid unicode codepoint"));
        }
        if !self.input[self.pos..].starts_with("\\u") {
            return Err(self.syntax("unpaired surrogate"));
        }
        self.pos += 2;
        let low = self.parse_hex4()?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(self.syntax("invalid low surrogate"));
        }
        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(code).ok_or_else(|| self.syntax("invalid unicode codepoint"))
    }

    fn parse_hex4(&mut self) -> Result<u32, DecodeError> {
        let hex = self
            .input
            .get(self.pos..self.pos + 4)
            .filter(|h| h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| self.syntax("invalid unicode escape"))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.syntax("invalid unicode escape"))?;
        self.pos += 4;
        Ok(code)
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
        self.pos - start
    }

    /// Integral vs fractional is decided by the literal, not the magnitude
    fn parse_number(&mut self) -> Result<NodeKind, DecodeError> {
        let start = self.pos;

        if self.peek() == Some('-') {
            self.advance();
        }

        let int_start = self.pos;
        let int_digits = self.skip_digits();
        // JSON forbids leading zeros: `0` alone, or a nonzero first digit
        let mut valid =
            int_digits == 1 || (int_digits > 1 && !self.input[int_start..].starts_with('0'));
        let mut is_float = false;

        if self.peek() == Some('.') {
            is_float = true;
            self.advance();
            valid &= self.skip_digits() > 0;
        }

        if let Some('e' | 'E') = self.peek() {
            is_float = true;
            self.advance();
            if let Some('+' | '-') = self.peek() {
                self.advance();
            }
            valid &= self.skip_digits() > 0;
        }

        let num_str = &self.input[start..self.pos];
        if !valid {
            return Err(DecodeError::InvalidNumber(num_str.to_string()));
        }

        if is_float {
            num_str
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(NodeKind::Double)
                .ok_or_else(|| DecodeError::InvalidNumber(num_str.to_string()))
        } else {
            num_str
                .parse::<i64>()
                .map(NodeKind::Integer)
                .map_err(|_| DecodeError::InvalidNumber(num_str.to_string()))
        }
    }

    fn parse_array(&mut self) -> Result<NodeKind, DecodeError> {
        self.advance(); // consume '['
        self.skip_whitespace();

        let mut arr = Vec::new();

        if self.peek() == Some(']') {
            self.advance();
            return Ok(NodeKind::Array(arr));
        }

        loop {
            arr.push(self.parse_value()?);
            self.skip_whitespace();

            match self.peek() {
                Some(',') => self.advance(),
                Some(']') => {
                    self.advance();
                    return Ok(NodeKind::Array(arr));
                }
                _ => return Err(self.syntax("expected ',' or ']'")),
            }
        }
    }

    fn parse_object(&mut self) -> Result<NodeKind, DecodeError> {
        self.advance(); // consume '{'
        self.skip_whitespace();

        let mut entries = Vec::new();

        if self.peek() == Some('}') {
            self.advance();
            return Ok(NodeKind::Object(entries));
        }

        loop {
            let key = self.parse_key()?;
            entries.push((key, self.parse_value()?));
            self.skip_whitespace();

            match self.peek() {
                Some(',') => self.advance(),
                Some('}') => {
                    self.advance();
                    return Ok(NodeKind::Object(entries));
                }
                _ => return Err(self.syntax("expected ',' or '}'")),
            }
        }
    }

    /// `"key":` with surrounding whitespace
    fn parse_key(&mut self) -> Result<String, DecodeError> {
        self.skip_whitespace();
        if self.peek() != Some('"') {
            return Err(self.syntax("expected string key"));
        }
        let key = self.parse_string()?;

        self.skip_whitespace();
        self.expect(':', "expected ':'")?;
        Ok(key)
    }
}

/// Interprets tagged wrappers in a parsed tree
///
/// Every node is visited once. A one-entry object keyed by a [`WireTag`]
/// becomes that variant; any other object is a mapping of the context.
struct Tags<'a> {
    input: &'a str,
}

impl Tags<'_> {
    fn value(&self, node: Node, ctx: Context) -> Result<Value, DecodeError> {
        match node.kind {
            NodeKind::Null => Ok(Value::Null),
            NodeKind::Boolean(b) => Ok(Value::Boolean(b)),
            NodeKind::Integer(i) => Ok(Value::Integer(i)),
            NodeKind::Double(d) => Ok(Value::Double(d)),
            NodeKind::String(s) => Ok(Value::String(s)),
            NodeKind::Array(items) => items
                .into_iter()
                .map(|item| self.value(item, ctx))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            NodeKind::Object(mut entries) => {
                let tag = match entries.as_slice() {
                    [(key, _)] => WireTag::from_key(key),
                    _ => None,
                };
                if let Some(tag) = tag {
                    if let Some((_, payload)) = entries.pop() {
                        return self.tagged(tag, payload, ctx);
                    }
                }
                self.mapping(entries, ctx).map(|obj| ctx.mapping(obj))
            }
        }
    }

    /// A raw mapping: its own keys are never tag-interpreted
    fn mapping(&self, entries: Vec<(String, Node)>, ctx: Context) -> Result<Object, DecodeError> {
        let mut map = Object::with_capacity(entries.len());
        for (key, node) in entries {
            map.insert(key, self.value(node, ctx)?);
        }
        Ok(map)
    }

    /// Build the variant for a tagged wrapper
    fn tagged(&self, tag: WireTag, payload: Node, ctx: Context) -> Result<Value, DecodeError> {
        let Node { span, kind } = payload;
        let fragment = &self.input[span.clone()];

        match (tag, kind) {
            (WireTag::Bytes, NodeKind::String(b64)) => decode_bytes(&b64),
            (WireTag::Ts, NodeKind::String(s)) => decode_timestamp(&s)
                .map(Value::Timestamp)
                .ok_or_else(|| malformed(tag, "an RFC 3339 timestamp string", fragment)),
            (WireTag::Date, NodeKind::String(s)) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| malformed(tag, "a YYYY-MM-DD date string", fragment)),
            (WireTag::Query, kind) => self
                .value(Node { span, kind }, Context::Expr)
                .map(|lambda| Value::Query(Box::new(lambda))),
            (WireTag::Set, NodeKind::Object(entries)) => {
                self.mapping(entries, Context::Expr).map(Value::Set)
            }
            (WireTag::Object, NodeKind::Object(entries)) => {
                self.mapping(entries, ctx).map(Value::Object)
            }
            (WireTag::Ref, NodeKind::Object(entries)) => {
                let obj = self.mapping(entries, Context::Data)?;
                decode_ref(obj, fragment).map(Value::Ref)
            }
            (WireTag::Bytes, _) => Err(malformed(tag, "a base64 string", fragment)),
            (WireTag::Ts, _) => Err(malformed(tag, "an RFC 3339 timestamp string", fragment)),
            (WireTag::Date, _) => Err(malformed(tag, "a YYYY-MM-DD date string", fragment)),
            (WireTag::Ref | WireTag::Set | WireTag::Object, _) => {
                Err(malformed(tag, "an object", fragment))
            }
        }
    }
}

fn malformed(tag: WireTag, expected: &'static str, fragment: &str) -> DecodeError {
    DecodeError::MalformedTag {
        tag: tag.as_str(),
        expected,
        fragment: fragment.to_string(),
    }
}

/// RFC 3339, plus the signed years beyond 0000..=9999 the encoder writes
fn decode_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| s.parse::<DateTime<FixedOffset>>())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Decode an `@bytes` payload; both base64 alphabets, padding optional
fn decode_bytes(b64: &str) -> Result<Value, DecodeError> {
    let normalized = b64.replace('+', "-").replace('/', "_");
    BASE64_LENIENT
        .decode(normalized)
        .map(Value::bytes)
        .map_err(|e| DecodeError::InvalidBase64 {
            fragment: b64.to_string(),
            reason: e.to_string(),
        })
}

/// `{"id": "...", "collection": <ref>?, "database": <ref>?}`
fn decode_ref(obj: Object, fragment: &str) -> Result<RefV, DecodeError> {
    let mut id = None;
    let mut collection = None;
    let mut database = None;

    for (key, value) in obj {
        match (key.as_str(), value) {
            ("id", Value::String(s)) => id = Some(s),
            ("collection", Value::Ref(r)) => collection = Some(r),
            ("database", Value::Ref(r)) => database = Some(r),
            _ => {
                return Err(malformed(
                    WireTag::Ref,
                    "a string `id` with optional ref `collection` and `database`",
                    fragment,
                ))
            }
        }
    }

    let mut r = RefV::new(id.ok_or_else(|| DecodeError::MissingField {
        field: "id",
        fragment: fragment.to_string(),
    })?);
    if let Some(c) = collection {
        r = r.with_collection(c);
    }
    if let Some(d) = database {
        r = r.with_database(d);
    }
    Ok(r)
}
