//! Property tests for the wire round-trip
//!
//! Generated trees exclude non-finite doubles, whose wire form is `null`.
//! Data trees exclude `Expr`, which decodes as a literal outside an
//! expression context.

use chrono::{DateTime, NaiveDate, Utc};
use faunadb_core::{Object, RefV, Value};
use faunadb_wire::{decode_expr, decode_json, encode_json};
use proptest::prelude::*;

fn key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,8}",
        Just("map".to_string()),
        Just("@ref".to_string()),
        Just("@object".to_string()),
        Just("@bytes".to_string()),
    ]
}

fn reference() -> impl Strategy<Value = RefV> {
    ("[a-z0-9]{1,12}", proptest::option::of("[a-z]{1,8}")).prop_map(|(id, coll)| match coll {
        Some(c) => RefV::document(c, id),
        None => RefV::new(id),
    })
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        any::<i64>().prop_map(Value::Integer),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::Double),
        ".{0,16}".prop_map(Value::String),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(Value::bytes),
        reference().prop_map(Value::Ref),
        // Spans signed years on both sides of 0000..=9999
        (-8_000_000_000_000i64..8_000_000_000_000, 0u32..1_000_000_000).prop_filter_map("timestamp", |(s, n)| {
            DateTime::<Utc>::from_timestamp(s, n).map(Value::Timestamp)
        }),
        (-200_000i32..200_000, 1u32..=12, 1u32..=28).prop_filter_map("date", |(y, m, d)| {
            NaiveDate::from_ymd_opt(y, m, d).map(Value::Date)
        }),
    ]
}

/// Function names never start with `@`
fn call_key() -> impl Strategy<Value = String> {
    prop_oneof!["[a-z]{1,8}", Just("map".to_string()), Just("var".to_string())]
}

fn entries(inner: BoxedStrategy<Value>) -> impl Strategy<Value = Object> {
    proptest::collection::vec((key(), inner), 0..4).prop_map(|kv| kv.into_iter().collect())
}

fn call_entries(inner: BoxedStrategy<Value>) -> impl Strategy<Value = Object> {
    proptest::collection::vec((call_key(), inner), 0..4).prop_map(|kv| kv.into_iter().collect())
}

fn data_value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            entries(inner.clone()).prop_map(Value::Object),
        ]
    })
}

fn expr_value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            entries(inner.clone()).prop_map(Value::Object),
            call_entries(inner.clone()).prop_map(Value::Expr),
            entries(inner.clone()).prop_map(Value::Set),
            inner.prop_map(Value::query),
        ]
    })
}

proptest! {
    #[test]
    fn data_round_trip(v in data_value()) {
        let json = encode_json(&v);
        prop_assert_eq!(decode_json(&json).unwrap(), v);
    }

    #[test]
    fn expression_round_trip(v in expr_value()) {
        let json = encode_json(&v);
        prop_assert_eq!(decode_expr(&json).unwrap(), v);
    }

    #[test]
    fn bytes_use_url_safe_alphabet(b in proptest::collection::vec(any::<u8>(), 0..64)) {
        let json = encode_json(&Value::bytes(&b));
        prop_assert!(!json.contains('+') && !json.contains('/'));
    }
}
