//! C-compatible enums, entry structs and callback types.

use std::ffi::{c_char, c_void};

use vellum_core::NodeKind;
use vellum_watch::FileEvent;

/// Node kind reported by `vellum_kind` and `vellum_get_kind`.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VellumKind {
    /// JSON `null`.
    Null = 0,
    /// Boolean.
    Bool = 1,
    /// Integer.
    Int = 2,
    /// Floating point.
    Float = 3,
    /// String.
    String = 4,
    /// Object.
    Object = 5,
    /// Array.
    Array = 6,
}

impl From<NodeKind> for VellumKind {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Null => VellumKind::Null,
            NodeKind::Bool => VellumKind::Bool,
            NodeKind::Int => VellumKind::Int,
            NodeKind::Float => VellumKind::Float,
            NodeKind::String => VellumKind::String,
            NodeKind::Object => VellumKind::Object,
            NodeKind::Array => VellumKind::Array,
        }
    }
}

/// File change delivered to the watch callback.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VellumFileEvent {
    /// The file appeared.
    Created = 0,
    /// The file was deleted.
    Erased = 1,
    /// The file's modification time moved forward.
    Modified = 2,
}

impl From<FileEvent> for VellumFileEvent {
    fn from(event: FileEvent) -> Self {
        match event {
            FileEvent::Created => VellumFileEvent::Created,
            FileEvent::Erased => VellumFileEvent::Erased,
            FileEvent::Modified => VellumFileEvent::Modified,
        }
    }
}

/// One `(key, node)` pair for `vellum_object`.
///
/// `key` is a NUL-terminated Windows-1251 string; `node` is consumed on
/// success.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct VellumObjectEntry {
    /// Entry key.
    pub key: *const c_char,
    /// Handle of the entry's value.
    pub node: u64,
}

/// Watch callback: `(user_data, path, event) -> keep_going`.
///
/// `path` is the watched path, NUL-terminated and Windows-1251 encoded,
/// valid only for the duration of the call. `event` is a
/// [`VellumFileEvent`] value. Return 0 to stop delivering the rest of the
/// current poll's events.
pub type VellumWatchCallback =
    Option<extern "C" fn(user_data: *mut c_void, path: *const c_char, event: i32) -> i32>;
