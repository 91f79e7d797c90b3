//! Wire format of query errors
//!
//! A failed request answers with a body of the shape:
//! ```json
//! {
//!   "errors": [{
//!     "position": ["create", "params"],
//!     "code": "validation failed",
//!     "description": "document data is not valid.",
//!     "failures": [{"field": ["data"], "code": "value required", "description": "..."}]
//!   }]
//! }
//! ```
//! Streaming error events carry one such error under their `event` key.

use super::decode::DecodeError;
use super::encode::write_string;
use faunadb_core::{QueryError, QueryErrorResponse, ValidationFailure, Value};
use serde::Deserialize;

/// Longest excerpt of a body quoted in an error
const FRAGMENT_CHARS: usize = 64;

#[derive(Deserialize)]
struct ErrorsEnvelope {
    errors: Vec<QueryError>,
}

/// Decode the body of a non-2xx response
pub fn decode_error_response(status: u16, body: &str) -> Result<QueryErrorResponse, DecodeError> {
    let parsed: ErrorsEnvelope = serde_json::from_str(body).map_err(|e| DecodeError::ErrorBody {
        reason: e.to_string(),
        fragment: body.chars().take(FRAGMENT_CHARS).collect(),
    })?;
    Ok(QueryErrorResponse {
        status,
        errors: parsed.errors,
    })
}

/// Project the `event` object of a streaming error line into a [`QueryError`]
///
/// `code` and `description` are required; `position` and `failures` are
/// optional.
pub fn query_error_from_event(event: &Value) -> Result<QueryError, DecodeError> {
    let code = required_str(event, "code")?;
    let description = required_str(event, "description")?;

    let position: Vec<String> = match event.get("position") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(segments)) => segments
            .iter()
            .map(|s| match s {
                Value::String(name) => Ok(name.clone()),
                Value::Integer(i) => Ok(i.to_string()),
                _ => Err(error_body(event, "position segments must be strings or integers")),
            })
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(error_body(event, "position must be an array")),
    };

    let failures: Vec<ValidationFailure> = match event.get("failures") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(validation_failure)
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(error_body(event, "failures must be an array")),
    };

    Ok(QueryError::new(code, description)
        .with_position(position)
        .with_failures(failures))
}

fn validation_failure(value: &Value) -> Result<ValidationFailure, DecodeError> {
    let field: Vec<String> = match value.get("field") {
        None => Vec::new(),
        Some(Value::Array(parts)) => parts
            .iter()
            .map(|p| {
                p.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| error_body(value, "field segments must be strings"))
            })
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(error_body(value, "field must be an array")),
    };
    Ok(ValidationFailure {
        field,
        code: required_str(value, "code")?.to_string(),
        description: required_str(value, "description")?.to_string(),
    })
}

fn required_str<'v>(value: &'v Value, field: &'static str) -> Result<&'v str, DecodeError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::MissingField {
            field,
            fragment: fragment_of(value),
        })
}

fn error_body(value: &Value, reason: &str) -> DecodeError {
    DecodeError::ErrorBody {
        reason: reason.to_string(),
        fragment: fragment_of(value),
    }
}

fn fragment_of(value: &Value) -> String {
    super::encode_json(value).chars().take(FRAGMENT_CHARS).collect()
}

/// Encode a QueryError to JSON
pub fn encode_query_error(error: &QueryError) -> String {
    let mut out = String::new();
    write_query_error(&mut out, error);
    out
}

/// Encode a full error response body
pub fn encode_error_response(response: &QueryErrorResponse) -> String {
    let mut out = String::from("{\"errors\":[");
    for (i, e) in response.errors.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_query_error(&mut out, e);
    }
    out.push_str("]}");
    out
}

fn write_query_error(out: &mut String, error: &QueryError) {
    out.push_str("{\"position\":");
    write_strings(out, &error.position);
    out.push_str(",\"code\":");
    write_string(out, &error.code);
    out.push_str(",\"description\":");
    write_string(out, &error.description);
    if !error.failures.is_empty() {
        out.push_str(",\"failures\":[");
        for (i, f) in error.failures.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str("{\"field\":");
            write_strings(out, &f.field);
            out.push_str(",\"code\":");
            write_string(out, &f.code);
            out.push_str(",\"description\":");
            write_string(out, &f.description);
            out.push('}');
        }
        out.push(']');
    }
    out.push('}');
}

fn write_strings(out: &mut String, items: &[String]) {
    out.push('[');
    for (i, s) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(out, s);
    }
    out.push(']');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::decode_json;

    #[test]
    fn test_decode_error_response() {
        let body = r#"{"errors":[{"position":["get",0],"code":"invalid ref","description":"bad ref"}]}"#;
        let resp = decode_error_response(400, body).unwrap();
        assert_eq!(resp.status, 400);
        assert_eq!(
            resp.errors,
            vec![QueryError::new("invalid ref", "bad ref").with_position(vec!["get".into(), "0".into()])]
        );
    }

    #[test]
    fn test_decode_error_response_not_an_error_body() {
        let result = decode_error_response(500, "<html>Bad Gateway</html>");
        assert!(matches!(
            result,
            Err(DecodeError::ErrorBody { fragment, .. }) if fragment == "<html>Bad Gateway</html>"
        ));

        let result = decode_error_response(400, r#"{"resource":1}"#);
        assert!(matches!(result, Err(DecodeError::ErrorBody { .. })));
    }

    #[test]
    fn test_error_response_encode_decode() {
        let resp = QueryErrorResponse {
            status: 400,
            errors: vec![QueryError::new("validation failed", "document data is not valid.")
                .with_position(vec!["create".into()])
                .with_failures(vec![ValidationFailure {
                    field: vec!["data".into(), "name".into()],
                    code: "value required".into(),
                    description: "Value required.".into(),
                }])],
        };
        let body = encode_error_response(&resp);
        assert_eq!(decode_error_response(400, &body).unwrap(), resp);
    }

    #[test]
    fn test_encode_query_error_shape() {
        let json = encode_query_error(&QueryError::new("invalid query", "bad ref"));
        assert_eq!(
            json,
            r#"{"position":[],"code":"invalid query","description":"bad ref"}"#
        );
    }

    #[test]
    fn test_query_error_from_event() {
        let line = decode_json(
            r#"{"type":"error","event":{"code":"invalid query","description":"bad ref","position":["map",1]}}"#,
        )
        .unwrap();
        let event = line.get("event").unwrap();
        let err = query_error_from_event(event).unwrap();
        assert_eq!(err.code, "invalid query");
        assert_eq!(err.description, "bad ref");
        assert_eq!(err.position, vec!["map", "1"]);
        assert!(err.failures.is_empty());
    }

    #[test]
    fn test_query_error_from_event_missing_code() {
        let event = decode_json(r#"{"description":"bad ref"}"#).unwrap();
        assert!(matches!(
            query_error_from_event(&event),
            Err(DecodeError::MissingField { field: "code", .. })
        ));
    }

    #[test]
    fn test_query_error_from_event_bad_failures() {
        let event = decode_json(r#"{"code":"c","description":"d","failures":"x"}"#).unwrap();
        assert!(matches!(
            query_error_from_event(&event),
            Err(DecodeError::ErrorBody { .. })
        ));
    }
}
