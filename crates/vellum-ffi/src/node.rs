//! Node lifecycle FFI: construct, compose, free, parse and save.
//!
//! All nodes live in one process-wide [`NodeArena`] behind `NODES`. The
//! lock is held for the duration of a single call only.

use std::ffi::c_char;
use std::sync::Mutex;

use smallvec::SmallVec;
use vellum_arena::NodeArena;
use vellum_core::{NodeError, NodeHandle};

use crate::status::VellumStatus;
use crate::strings::{c_bytes, deliver, legacy_path};
use crate::types::{VellumKind, VellumObjectEntry};
use crate::{fail, invalid_argument, status_of};

static NODES: Mutex<NodeArena> = Mutex::new(NodeArena::empty());

pub(crate) fn nodes() -> &'static Mutex<NodeArena> {
    &NODES
}

/// Write a freshly registered handle to `out`, or report the failure.
///
/// `out` must already be checked for null.
#[track_caller]
#[allow(unsafe_code)]
pub(crate) fn emit(op: &str, out: *mut u64, result: Result<NodeHandle, NodeError>) -> i32 {
    match result {
        Ok(node) => {
            // SAFETY: out is non-null (checked by the caller) and writable
            // per caller contract.
            unsafe { *out = node.to_raw() };
            VellumStatus::Ok as i32
        }
        Err(e) => fail(op, &e),
    }
}

/// Run `f` against the output slot `out`, whose current contents are its
/// previous occupant. The slot is written back whether or not `f` fails.
///
/// `out` must already be checked for null.
#[allow(unsafe_code)]
pub(crate) fn with_slot<F>(out: *mut u64, f: F) -> Result<(), NodeError>
where
    F: FnOnce(&mut NodeHandle) -> Result<(), NodeError>,
{
    // SAFETY: out is non-null (checked by the caller) and readable and
    // writable per caller contract.
    let mut slot = NodeHandle::from_raw(unsafe { *out });
    let result = f(&mut slot);
    // SAFETY: as above.
    unsafe { *out = slot.to_raw() };
    result
}

// ── scalar constructors ─────────────────────────────────────────

/// Create a `null` node.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_null(out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_null", "out");
        }
        emit("vellum_null", out, ffi_lock!(NODES).null())
    })
}

/// Create a boolean node. Any nonzero `value` is `true`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_bool(value: u8, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_bool", "out");
        }
        emit("vellum_bool", out, ffi_lock!(NODES).bool(value != 0))
    })
}

/// Create an integer node.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_int(value: i64, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_int", "out");
        }
        emit("vellum_int", out, ffi_lock!(NODES).int(value))
    })
}

/// Create a float node. NaN and infinities are stored as `null`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_float(value: f64, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_float", "out");
        }
        emit("vellum_float", out, ffi_lock!(NODES).float(value))
    })
}

/// Create a string node from a NUL-terminated Windows-1251 string.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_string(value: *const c_char, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_string", "out");
        }
        // SAFETY: value is null or NUL-terminated per caller contract.
        let Some(text) = (unsafe { c_bytes(value) }) else {
            return invalid_argument("vellum_string", "value");
        };
        emit("vellum_string", out, ffi_lock!(NODES).string(text))
    })
}

/// Deep-copy `node` into a new, independent node.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_copy(node: u64, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_copy", "out");
        }
        emit("vellum_copy", out, ffi_lock!(NODES).copy(NodeHandle::from_raw(node)))
    })
}

// ── containers ──────────────────────────────────────────────────

/// Build an object from `len` `(key, node)` entries, consuming every node.
///
/// `entries` may be null when `len == 0`. On a later duplicate key the last
/// entry wins. If any node is invalid or repeated, nothing is consumed.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_object(entries: *const VellumObjectEntry, len: usize, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_object", "out");
        }
        if entries.is_null() && len > 0 {
            return invalid_argument("vellum_object", "entries");
        }
        let raw: &[VellumObjectEntry] = if len == 0 {
            &[]
        } else {
            // SAFETY: entries points to len valid VellumObjectEntry structs.
            unsafe { std::slice::from_raw_parts(entries, len) }
        };
        let mut pairs: SmallVec<[(&[u8], NodeHandle); 8]> = SmallVec::with_capacity(len);
        for entry in raw {
            // SAFETY: each key is null or NUL-terminated per caller contract.
            let Some(key) = (unsafe { c_bytes(entry.key) }) else {
                return invalid_argument("vellum_object", "entry key");
            };
            pairs.push((key, NodeHandle::from_raw(entry.node)));
        }
        emit("vellum_object", out, ffi_lock!(NODES).object(&pairs[..]))
    })
}

/// Build an array from `len` nodes, consuming every node.
///
/// `items` may be null when `len == 0`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_array(items: *const u64, len: usize, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_array", "out");
        }
        if items.is_null() && len > 0 {
            return invalid_argument("vellum_array", "items");
        }
        let handles: SmallVec<[NodeHandle; 8]> = if len == 0 {
            SmallVec::new()
        } else {
            // SAFETY: items points to len valid u64 values.
            unsafe { std::slice::from_raw_parts(items, len) }
                .iter()
                .map(|&raw| NodeHandle::from_raw(raw))
                .collect()
        };
        emit("vellum_array", out, ffi_lock!(NODES).array(&handles))
    })
}

/// Combine two containers of the same kind, consuming both.
///
/// Arrays concatenate; objects are merge-patched (RFC 7396), so nested
/// objects merge and a `null` in `right` removes the key.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_append(left: u64, right: u64, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_append", "out");
        }
        let result = ffi_lock!(NODES).append(NodeHandle::from_raw(left), NodeHandle::from_raw(right));
        emit("vellum_append", out, result)
    })
}

/// Same as [`vellum_append`].
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_merge(left: u64, right: u64, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_merge", "out");
        }
        let result = ffi_lock!(NODES).merge(NodeHandle::from_raw(left), NodeHandle::from_raw(right));
        emit("vellum_merge", out, result)
    })
}

// ── lifecycle ───────────────────────────────────────────────────

/// Free a node. A second cleanup of the same handle is `NodeNotFound`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_cleanup(node: u64) -> i32 {
    ffi_guard!({
        status_of("vellum_cleanup", ffi_lock!(NODES).cleanup(NodeHandle::from_raw(node)))
    })
}

/// Whether `node` refers to a live node. Returns `false` on panic or a
/// poisoned lock.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_is_valid(node: u64) -> bool {
    ffi_guard_or!(false, {
        NODES
            .lock()
            .map(|nodes| nodes.is_valid(NodeHandle::from_raw(node)))
            .unwrap_or(false)
    })
}

/// Number of live nodes. Returns 0 on panic or a poisoned lock.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_live_count() -> u64 {
    ffi_guard_or!(0, {
        NODES
            .lock()
            .map(|nodes| nodes.live_count() as u64)
            .unwrap_or(0)
    })
}

/// Write the [`VellumKind`] of `node` to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_kind(node: u64, out: *mut i32) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_kind", "out");
        }
        match ffi_lock!(NODES).kind(NodeHandle::from_raw(node)) {
            Ok(kind) => {
                // SAFETY: out is non-null and writable per caller contract.
                unsafe { *out = VellumKind::from(kind) as i32 };
                VellumStatus::Ok as i32
            }
            Err(e) => fail("vellum_kind", &e),
        }
    })
}

// ── documents ───────────────────────────────────────────────────

/// Parse JSON text into the output slot `out`.
///
/// `text` is Windows-1251 encoded. On success the slot's previous live
/// occupant is freed.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_parse(text: *const c_char, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_parse", "out");
        }
        // SAFETY: text is null or NUL-terminated per caller contract.
        let Some(text) = (unsafe { c_bytes(text) }) else {
            return invalid_argument("vellum_parse", "text");
        };
        let mut nodes = ffi_lock!(NODES);
        status_of("vellum_parse", with_slot(out, |slot| nodes.parse(text, slot)))
    })
}

/// Read and parse a UTF-8 JSON file into the output slot `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_parse_file(path: *const c_char, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_parse_file", "out");
        }
        // SAFETY: path is null or NUL-terminated per caller contract.
        let Some(path) = (unsafe { c_bytes(path) }) else {
            return invalid_argument("vellum_parse_file", "path");
        };
        let path = legacy_path(path);
        let mut nodes = ffi_lock!(NODES);
        status_of(
            "vellum_parse_file",
            with_slot(out, |slot| nodes.parse_file(&path, slot)),
        )
    })
}

/// Serialize `node` into `buf` as Windows-1251 JSON text.
///
/// `indent` is the number of spaces per level; a negative value writes
/// compact text. Output longer than `cap - 1` bytes is truncated.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_stringify(node: u64, indent: i32, buf: *mut c_char, cap: usize) -> i32 {
    ffi_guard!({
        let text = match ffi_lock!(NODES).stringify(NodeHandle::from_raw(node), indent) {
            Ok(text) => text,
            Err(e) => return fail("vellum_stringify", &e),
        };
        deliver("vellum_stringify", &text, buf, cap)
    })
}

/// Write `node` to `path` as UTF-8 JSON with a trailing newline, creating
/// missing parent directories.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_save_file(path: *const c_char, node: u64, indent: i32) -> i32 {
    ffi_guard!({
        // SAFETY: path is null or NUL-terminated per caller contract.
        let Some(path) = (unsafe { c_bytes(path) }) else {
            return invalid_argument("vellum_save_file", "path");
        };
        let path = legacy_path(path);
        status_of(
            "vellum_save_file",
            ffi_lock!(NODES).save_file(&path, NodeHandle::from_raw(node), indent),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use vellum_test_utils::{legacy, Scratch};

    const OK: i32 = VellumStatus::Ok as i32;

    fn int(v: i64) -> u64 {
        let mut h = 0;
        assert_eq!(vellum_int(v, &mut h), OK);
        h
    }

    fn text(node: u64, indent: i32) -> String {
        let mut buf = vec![0u8; 256];
        assert_eq!(vellum_stringify(node, indent, buf.as_mut_ptr().cast(), buf.len()), OK);
        let end = buf.iter().position(|&b| b == 0).unwrap();
        String::from_utf8(buf[..end].to_vec()).unwrap()
    }

    #[test]
    fn scalar_constructors_report_kinds() {
        let mut handles = [0u64; 5];
        assert_eq!(vellum_null(&mut handles[0]), OK);
        assert_eq!(vellum_bool(1, &mut handles[1]), OK);
        assert_eq!(vellum_int(7, &mut handles[2]), OK);
        assert_eq!(vellum_float(1.5, &mut handles[3]), OK);
        assert_eq!(vellum_string(c"hi".as_ptr(), &mut handles[4]), OK);

        let expected = [
            VellumKind::Null,
            VellumKind::Bool,
            VellumKind::Int,
            VellumKind::Float,
            VellumKind::String,
        ];
        for (h, want) in handles.iter().zip(expected) {
            let mut kind = -1;
            assert_eq!(vellum_kind(*h, &mut kind), OK);
            assert_eq!(kind, want as i32);
            assert_eq!(vellum_cleanup(*h), OK);
        }
    }

    #[test]
    fn null_out_is_invalid_argument() {
        let invalid = VellumStatus::InvalidArgument as i32;
        assert_eq!(vellum_null(std::ptr::null_mut()), invalid);
        assert_eq!(vellum_int(1, std::ptr::null_mut()), invalid);
        assert_eq!(vellum_kind(1, std::ptr::null_mut()), invalid);
        let mut h = 0;
        assert_eq!(vellum_string(std::ptr::null(), &mut h), invalid);
        assert_eq!(h, 0);
    }

    #[test]
    fn cleanup_twice_is_node_not_found() {
        let h = int(3);
        assert!(vellum_is_valid(h));
        assert_eq!(vellum_cleanup(h), OK);
        assert!(!vellum_is_valid(h));
        assert_eq!(vellum_cleanup(h), VellumStatus::NodeNotFound as i32);
    }

    #[test]
    fn object_consumes_entry_nodes() {
        let a = int(1);
        let b = int(2);
        let entries = [
            VellumObjectEntry { key: c"a".as_ptr(), node: a },
            VellumObjectEntry { key: c"b".as_ptr(), node: b },
        ];
        let mut obj = 0;
        assert_eq!(vellum_object(entries.as_ptr(), entries.len(), &mut obj), OK);
        assert!(!vellum_is_valid(a));
        assert!(!vellum_is_valid(b));
        assert_eq!(text(obj, -1), r#"{"a":1,"b":2}"#);
        vellum_cleanup(obj);
    }

    #[test]
    fn object_with_null_key_consumes_nothing() {
        let a = int(1);
        let entries = [VellumObjectEntry {
            key: std::ptr::null(),
            node: a,
        }];
        let mut obj = 0;
        assert_eq!(
            vellum_object(entries.as_ptr(), 1, &mut obj),
            VellumStatus::InvalidArgument as i32
        );
        assert!(vellum_is_valid(a));
        vellum_cleanup(a);
    }

    #[test]
    fn empty_containers_accept_null_pointers() {
        let mut obj = 0;
        let mut arr = 0;
        assert_eq!(vellum_object(std::ptr::null(), 0, &mut obj), OK);
        assert_eq!(vellum_array(std::ptr::null(), 0, &mut arr), OK);
        assert_eq!(text(obj, -1), "{}");
        assert_eq!(text(arr, -1), "[]");
        vellum_cleanup(obj);
        vellum_cleanup(arr);
    }

    #[test]
    fn array_with_repeated_handle_is_rejected() {
        let a = int(1);
        let items = [a, a];
        let mut arr = 0;
        assert_eq!(
            vellum_array(items.as_ptr(), items.len(), &mut arr),
            VellumStatus::NodeNotFound as i32
        );
        assert!(vellum_is_valid(a));
        vellum_cleanup(a);
    }

    #[test]
    fn append_and_merge_combine_containers() {
        let mut left = 0;
        let mut right = 0;
        vellum_parse(c"[1,2]".as_ptr(), &mut left);
        vellum_parse(c"[3]".as_ptr(), &mut right);
        let mut joined = 0;
        assert_eq!(vellum_append(left, right, &mut joined), OK);
        assert_eq!(text(joined, -1), "[1,2,3]");

        let mut base = 0;
        let mut patch = 0;
        vellum_parse(cr#"{"a":{"x":1,"y":2},"b":1}"#.as_ptr(), &mut base);
        vellum_parse(cr#"{"a":{"y":null},"b":2}"#.as_ptr(), &mut patch);
        let mut merged = 0;
        assert_eq!(vellum_merge(base, patch, &mut merged), OK);
        assert_eq!(text(merged, -1), r#"{"a":{"x":1},"b":2}"#);
        vellum_cleanup(joined);
        vellum_cleanup(merged);
    }

    #[test]
    fn append_objects_merges_nested_keys() {
        let mut left = 0;
        let mut right = 0;
        vellum_parse(cr#"{"b":{"x":1},"c":3}"#.as_ptr(), &mut left);
        vellum_parse(cr#"{"b":{"y":2},"c":null}"#.as_ptr(), &mut right);
        let mut out = 0;
        assert_eq!(vellum_append(left, right, &mut out), OK);
        assert!(!vellum_is_valid(left));
        assert!(!vellum_is_valid(right));
        assert_eq!(text(out, -1), r#"{"b":{"x":1,"y":2}}"#);
        vellum_cleanup(out);
    }

    #[test]
    fn parse_replaces_previous_occupant() {
        let mut slot = 0;
        assert_eq!(vellum_parse(c"[1]".as_ptr(), &mut slot), OK);
        let first = slot;
        assert_eq!(vellum_parse(c"[2]".as_ptr(), &mut slot), OK);
        assert_ne!(first, slot);
        assert!(!vellum_is_valid(first));
        assert_eq!(text(slot, -1), "[2]");
        vellum_cleanup(slot);
    }

    #[test]
    fn malformed_text_is_parser_error() {
        let mut slot = 0;
        assert_eq!(
            vellum_parse(c"{".as_ptr(), &mut slot),
            VellumStatus::ParserError as i32
        );
        assert_eq!(slot, 0);
    }

    #[test]
    fn stringify_respects_indent_and_buffer() {
        let mut node = 0;
        vellum_parse(cr#"{"a":1}"#.as_ptr(), &mut node);
        assert_eq!(text(node, 2), "{\n  \"a\": 1\n}");

        let mut small = [0xFFu8; 4];
        assert_eq!(vellum_stringify(node, -1, small.as_mut_ptr().cast(), small.len()), OK);
        assert_eq!(&small, b"{\"a\0");

        assert_eq!(
            vellum_stringify(node, -1, std::ptr::null_mut(), 0),
            VellumStatus::NoReturnString as i32
        );
        vellum_cleanup(node);
    }

    #[test]
    fn save_then_parse_file_with_legacy_path() {
        let scratch = Scratch::new();
        let path = scratch.join("сохранения/игрок.json");
        let legacy_path = CString::new(legacy(path.to_str().unwrap())).unwrap();

        let mut node = 0;
        vellum_parse(cr#"{"hp":10}"#.as_ptr(), &mut node);
        assert_eq!(vellum_save_file(legacy_path.as_ptr(), node, 2), OK);
        assert!(path.is_file());

        let mut loaded = 0;
        assert_eq!(vellum_parse_file(legacy_path.as_ptr(), &mut loaded), OK);
        assert_eq!(text(loaded, -1), r#"{"hp":10}"#);
        vellum_cleanup(node);
        vellum_cleanup(loaded);
    }

    #[test]
    fn parse_missing_file_is_no_such_file() {
        let scratch = Scratch::new();
        let path = CString::new(scratch.join("absent.json").to_str().unwrap()).unwrap();
        let mut slot = 0;
        assert_eq!(
            vellum_parse_file(path.as_ptr(), &mut slot),
            VellumStatus::NoSuchFile as i32
        );
    }
}
