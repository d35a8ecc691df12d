//! Sample documents shared across crates.

use serde_json::{json, Value};

/// Player name used by [`player_document`], in UTF-8.
pub const PLAYER_NAME: &str = "Иван Петров";

/// Text form of [`player_document`], compact and in key order.
pub const PLAYER_JSON: &str = r#"{"name":"Иван Петров","level":12,"ratio":0.75,"admin":false,"inventory":["knife","medkit","knife"],"position":{"x":1.5,"y":-2.25,"z":10.0},"clan":null}"#;

/// A small document exercising every value kind.
pub fn player_document() -> Value {
    json!({
        "name": PLAYER_NAME,
        "level": 12,
        "ratio": 0.75,
        "admin": false,
        "inventory": ["knife", "medkit", "knife"],
        "position": {"x": 1.5, "y": -2.25, "z": 10.0},
        "clan": null
    })
}

/// An array of `len` objects `{"id": i}`.
pub fn id_list(len: usize) -> Value {
    Value::Array((0..len).map(|i| json!({ "id": i })).collect())
}
