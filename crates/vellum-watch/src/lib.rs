//! Polling file watcher for the Vellum node store.
//!
//! Scripts register document paths and receive a notification when a file
//! appears, disappears, or is rewritten. The watcher stats each path on a
//! fixed interval; there are no OS notification hooks and no threads.
//! Callers drive it from their own loop via [`FileWatcher::poll`] or the
//! split [`scan`](FileWatcher::scan) / [`commit`](FileWatcher::commit) /
//! [`finish`](FileWatcher::finish) cycle.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod watcher;

pub use config::WatchConfig;
pub use watcher::{FileEvent, FileState, FileWatcher, Transition};
