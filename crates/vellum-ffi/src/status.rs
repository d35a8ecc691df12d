//! C-compatible status codes.
//!
//! [`VellumStatus`] is a `repr(i32)` enum covering every error condition a
//! caller can observe. Conversions from the Rust error types
//! ([`NodeError`], [`WatchError`], [`ConfigError`]) flatten their context
//! away; the context goes to the log instead.

use vellum_core::{ConfigError, NodeError, WatchError};

/// C-compatible status code returned by all FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VellumStatus {
    /// Success.
    Ok = 0,
    /// Invalid handle, absent key or index, or end of iteration.
    NodeNotFound = -1,
    /// Operand kind does not match the operation.
    WrongType = -2,
    /// Malformed JSON text.
    ParserError = -3,
    /// File does not exist or is not a regular file.
    NoSuchFile = -4,
    /// Output directory path exists but is not a directory.
    NoSuchDirectory = -5,
    /// No representable string, or no buffer to write it to.
    NoReturnString = -6,
    /// Path is already watched.
    WatcherAlreadyExists = -7,
    /// Path is not watched.
    WatcherNotFound = -8,
    /// Unexpected library or I/O failure, node limit reached, or poisoned
    /// state after an earlier panic.
    UnknownError = -9,
    /// A pointer argument is null or a configuration value is rejected.
    InvalidArgument = -10,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&NodeError> for VellumStatus {
    fn from(e: &NodeError) -> Self {
        match e {
            NodeError::InvalidHandle { .. }
            | NodeError::MissingKey { .. }
            | NodeError::IndexOutOfRange { .. } => VellumStatus::NodeNotFound,
            NodeError::WrongType { .. } => VellumStatus::WrongType,
            NodeError::Parser { .. } => VellumStatus::ParserError,
            NodeError::NoSuchFile { .. } => VellumStatus::NoSuchFile,
            NodeError::NoSuchDirectory { .. } => VellumStatus::NoSuchDirectory,
            NodeError::NoReturnString => VellumStatus::NoReturnString,
            NodeError::CapacityExceeded { .. } | NodeError::Unknown { .. } => {
                VellumStatus::UnknownError
            }
        }
    }
}

impl From<&WatchError> for VellumStatus {
    fn from(e: &WatchError) -> Self {
        match e {
            WatchError::AlreadyWatching { .. } => VellumStatus::WatcherAlreadyExists,
            WatchError::NotWatching { .. } => VellumStatus::WatcherNotFound,
        }
    }
}

impl From<&ConfigError> for VellumStatus {
    fn from(_e: &ConfigError) -> Self {
        VellumStatus::InvalidArgument
    }
}
