//! Core types for the Vellum node store.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! vocabulary shared by every other Vellum crate: the opaque
//! [`NodeHandle`], the [`NodeKind`] discriminant reported to callers, the
//! [`ArrayCursor`] iteration protocol, and the error taxonomy.
//!
//! The value tree itself is [`serde_json::Value`] built with
//! `preserve_order`, re-exported here as [`Value`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod kind;

pub use error::{ConfigError, NodeError, WatchError};
pub use id::{ArrayCursor, NodeHandle};
pub use kind::NodeKind;

/// The JSON value tree every node handle owns.
pub use serde_json::Value;

/// Ordered string-keyed map used for object nodes.
pub type Map = serde_json::Map<String, Value>;
