//! Error types for the Vellum node store.
//!
//! Organized by subsystem: node operations (arena, query engine, document
//! I/O), the file watcher, and configuration validation. The C boundary
//! flattens these onto its status-code taxonomy.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use crate::id::NodeHandle;
use crate::kind::NodeKind;

/// Errors from node construction, lifecycle, mutation and query.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeError {
    /// The handle is null, was never issued, was already freed, or was
    /// consumed by an ownership-transferring operation.
    InvalidHandle {
        /// The offending handle.
        handle: NodeHandle,
    },
    /// The object has no entry under this key (or the node has no keys).
    MissingKey {
        /// The key that was looked up (UTF-8).
        key: String,
    },
    /// Index outside the container, including the end of an iteration.
    IndexOutOfRange {
        /// The requested index.
        index: i64,
        /// The container length at the time of the call.
        len: usize,
    },
    /// The operand's kind does not match what the operation requires.
    WrongType {
        /// Description of the accepted kind(s).
        expected: &'static str,
        /// The kind actually stored.
        found: NodeKind,
    },
    /// Malformed JSON text.
    Parser {
        /// Parser diagnostic.
        reason: String,
    },
    /// Path does not exist or is not a regular file.
    NoSuchFile {
        /// The path that was opened.
        path: PathBuf,
    },
    /// Output path's parent exists but is not a directory.
    NoSuchDirectory {
        /// The parent path.
        path: PathBuf,
    },
    /// A string value has no representable legacy-encoded output.
    NoReturnString,
    /// The arena refused to register another node.
    CapacityExceeded {
        /// The configured live-node limit.
        limit: u32,
    },
    /// Unexpected failure from the value-tree library or the filesystem.
    Unknown {
        /// Description of the failure.
        reason: String,
    },
}

impl NodeError {
    /// Shorthand for [`NodeError::WrongType`].
    pub fn wrong_type(expected: &'static str, found: NodeKind) -> Self {
        Self::WrongType { expected, found }
    }

    /// Whether this error reports a missing node, key, or index.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::InvalidHandle { .. } | Self::MissingKey { .. } | Self::IndexOutOfRange { .. }
        )
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHandle { handle } => {
                write!(f, "{handle} is not a live node")
            }
            Self::MissingKey { key } => write!(f, "node does not have item by key '{key}'"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::WrongType { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::Parser { reason } => write!(f, "parse error: {reason}"),
            Self::NoSuchFile { path } => write!(f, "no such file: {}", path.display()),
            Self::NoSuchDirectory { path } => {
                write!(f, "not a directory: {}", path.display())
            }
            Self::NoReturnString => write!(f, "string has no legacy-encoded representation"),
            Self::CapacityExceeded { limit } => {
                write!(f, "live node limit of {limit} reached")
            }
            Self::Unknown { reason } => write!(f, "unexpected failure: {reason}"),
        }
    }
}

impl Error for NodeError {}

impl From<serde_json::Error> for NodeError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Self::Unknown {
                reason: e.to_string(),
            }
        } else {
            Self::Parser {
                reason: e.to_string(),
            }
        }
    }
}

impl From<std::io::Error> for NodeError {
    fn from(e: std::io::Error) -> Self {
        Self::Unknown {
            reason: e.to_string(),
        }
    }
}

/// Errors from the file watcher's path registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchError {
    /// `start` on a path that is already watched.
    AlreadyWatching {
        /// The duplicate path.
        path: PathBuf,
    },
    /// `stop` on a path that is not watched.
    NotWatching {
        /// The unknown path.
        path: PathBuf,
    },
}

impl fmt::Display for WatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyWatching { path } => {
                write!(f, "already watching {}", path.display())
            }
            Self::NotWatching { path } => write!(f, "not watching {}", path.display()),
        }
    }
}

impl Error for WatchError {}

/// Errors detected while validating arena or watcher configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_live_nodes` was set to zero.
    ZeroNodeLimit,
    /// The watcher poll interval was zero.
    ZeroWatchInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroNodeLimit => write!(f, "max_live_nodes must be at least 1"),
            Self::ZeroWatchInterval => write!(f, "watch interval must be at least 1 ms"),
        }
    }
}

impl Error for ConfigError {}
