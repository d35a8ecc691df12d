//! Vellum: a handle-safe JSON node store for legacy-codepage scripting hosts.
//!
//! This is the top-level facade crate that re-exports the Rust API of the
//! Vellum sub-crates. The C ABI lives in `vellum-ffi`.
//!
//! # Quick start
//!
//! ```rust
//! use vellum::prelude::*;
//!
//! let mut nodes = NodeArena::new(ArenaConfig::default()).unwrap();
//!
//! let mut doc = NodeHandle::NULL;
//! nodes.parse(br#"{"name":"Ivan","inventory":["knife"]}"#, &mut doc).unwrap();
//!
//! let medkit = nodes.string(b"medkit").unwrap();
//! nodes.array_append(doc, b"inventory", medkit).unwrap();
//! assert!(!nodes.is_valid(medkit), "appending consumes the value");
//!
//! nodes.set_int(doc, b"level", 12).unwrap();
//! assert_eq!(nodes.get_int(doc, b"level").unwrap(), 12);
//! assert_eq!(
//!     nodes.stringify(doc, -1).unwrap(),
//!     br#"{"name":"Ivan","inventory":["knife","medkit"],"level":12}"#
//! );
//!
//! nodes.cleanup(doc).unwrap();
//! assert!(matches!(nodes.cleanup(doc), Err(NodeError::InvalidHandle { .. })));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `vellum-core` | Handles, node kinds, cursors, error types |
//! | [`codec`] | `vellum-codec` | Windows-1251 transcoding |
//! | [`arena`] | `vellum-arena` | Node arena, queries, documents |
//! | [`watch`] | `vellum-watch` | Polling file watcher |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Handles, node kinds, cursors and error types (`vellum-core`).
pub use vellum_core as types;

/// Windows-1251 transcoding (`vellum-codec`).
///
/// [`codec::Codepage`] converts between UTF-8 and single-byte legacy text
/// with `?` substitution for unrepresentable characters.
pub use vellum_codec as codec;

/// Node arena, mutation and query engine, document I/O (`vellum-arena`).
///
/// [`arena::NodeArena`] owns every node and is the main entry point.
pub use vellum_arena as arena;

/// Polling file watcher (`vellum-watch`).
///
/// [`watch::FileWatcher`] reports creation, deletion and modification of
/// registered paths.
pub use vellum_watch as watch;

/// Common imports for typical Vellum usage.
///
/// ```rust
/// use vellum::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use vellum_core::{ArrayCursor, NodeHandle, NodeKind, Value};

    // Errors
    pub use vellum_core::{ConfigError, NodeError, WatchError};

    // Transcoding
    pub use vellum_codec::Codepage;

    // Arena
    pub use vellum_arena::{ArenaConfig, NodeArena};

    // Watcher
    pub use vellum_watch::{FileEvent, FileWatcher, WatchConfig};
}
