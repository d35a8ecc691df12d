//! Proptest strategies over JSON values.

use proptest::prelude::*;
use serde_json::{Map, Value};

/// Strings drawn from ASCII and the Cyrillic block, all representable in
/// Windows-1251.
pub fn legacy_safe_string() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.А-Яа-яЁё]{0,12}"
}

/// Scalar JSON values.
///
/// Floats are quarter-steps so they survive a text round trip exactly.
pub fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-4000i32..4000).prop_map(|n| Value::from(f64::from(n) * 0.25)),
        legacy_safe_string().prop_map(Value::String),
    ]
}

/// Arbitrary JSON trees up to a small depth.
pub fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((legacy_safe_string(), inner), 0..6).prop_map(|entries| {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key, value);
                }
                Value::Object(map)
            }),
        ]
    })
}
