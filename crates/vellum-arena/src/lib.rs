//! Handle-checked node arena for the Vellum node store.
//!
//! [`NodeArena`] owns every JSON node the caller can reference and hands
//! out opaque [`NodeHandle`](vellum_core::NodeHandle)s for them. Handles
//! are slot+generation pairs: a freed or consumed handle never resolves
//! again, so misuse surfaces as
//! [`NodeError::InvalidHandle`](vellum_core::NodeError::InvalidHandle)
//! rather than a use-after-free.
//!
//! The arena is an explicitly owned context. Callers that need process-wide
//! state (the C boundary) wrap it themselves.
//!
//! # Ownership rules
//!
//! - Constructors, parsing and extraction register a fresh node.
//! - Extraction always deep-copies; two handles never alias.
//! - Consuming operations (container construction, `set_object`,
//!   `set_array`, `array_append`, `array_push`, `append`, `merge`)
//!   invalidate their inputs on success and leave them untouched on
//!   failure.
//! - Writing into an output slot frees the slot's previous live occupant.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod config;
pub mod document;
mod handle;
pub mod query;

pub use arena::NodeArena;
pub use config::ArenaConfig;
pub use document::MAX_INDENT;
