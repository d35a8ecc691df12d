//! Benchmark profiles for the Vellum node store.
//!
//! - [`save_profile`]: a save-game document with `n` inventory entries
//! - [`legacy_text`]: mixed Latin/Cyrillic Windows-1251 text of a given length
//! - [`populated_arena`]: an arena holding `n` live integer nodes

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use serde_json::{json, Value};
use vellum_arena::{ArenaConfig, NodeArena};
use vellum_codec::Codepage;
use vellum_core::NodeHandle;

/// A save-game document with `n` inventory entries.
///
/// Each entry is a small object with a Cyrillic name, a count and a weight.
pub fn save_profile(n: usize) -> Value {
    let inventory: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("предмет {i}"),
                "count": i % 7,
                "weight": (i % 10) as f64 * 0.25,
            })
        })
        .collect();
    json!({
        "name": "Иван Петров",
        "level": 12,
        "position": {"x": 1.5, "y": -2.25, "z": 10.0},
        "inventory": inventory,
    })
}

/// `len` bytes of Windows-1251 text alternating Latin and Cyrillic words.
pub fn legacy_text(len: usize) -> Vec<u8> {
    let words = Codepage::WINDOWS_1251.decode("save игрок level уровень ".as_bytes());
    words.iter().copied().cycle().take(len).collect()
}

/// An arena holding `n` live integer nodes, with their handles.
pub fn populated_arena(n: usize) -> (NodeArena, Vec<NodeHandle>) {
    let config = ArenaConfig {
        initial_capacity: n,
        ..ArenaConfig::default()
    };
    let mut arena = NodeArena::new(config).unwrap();
    let handles = (0..n as i64).map(|i| arena.int(i).unwrap()).collect();
    (arena, handles)
}
