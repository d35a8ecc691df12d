//! Keyed access FFI: setters, getters, key removal and key enumeration.
//!
//! Keys are NUL-terminated Windows-1251 strings. A null key is
//! `InvalidArgument`; an invalid node handle is `NodeNotFound`.

use std::ffi::c_char;

use vellum_core::{NodeError, NodeHandle};

use crate::node::{nodes, with_slot};
use crate::status::VellumStatus;
use crate::strings::{c_bytes, deliver};
use crate::types::VellumKind;
use crate::{fail, invalid_argument, status_of};

/// Write a scalar result to `out`, or report the failure.
///
/// `out` must already be checked for null.
#[track_caller]
#[allow(unsafe_code)]
fn put<T>(op: &str, out: *mut T, result: Result<T, NodeError>) -> i32 {
    match result {
        Ok(value) => {
            // SAFETY: out is non-null (checked by the caller) and writable
            // per caller contract.
            unsafe { *out = value };
            VellumStatus::Ok as i32
        }
        Err(e) => fail(op, &e),
    }
}

// ── setters ─────────────────────────────────────────────────────

/// Set `node[key]` to `null`.
///
/// A `null` node is promoted to an empty object first.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_set_null(node: u64, key: *const c_char) -> i32 {
    ffi_guard!({
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_set_null", "key");
        };
        status_of(
            "vellum_set_null",
            ffi_lock!(nodes()).set_null(NodeHandle::from_raw(node), key),
        )
    })
}

/// Set `node[key]` to a boolean. Any nonzero `value` is `true`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_set_bool(node: u64, key: *const c_char, value: u8) -> i32 {
    ffi_guard!({
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_set_bool", "key");
        };
        status_of(
            "vellum_set_bool",
            ffi_lock!(nodes()).set_bool(NodeHandle::from_raw(node), key, value != 0),
        )
    })
}

/// Set `node[key]` to an integer.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_set_int(node: u64, key: *const c_char, value: i64) -> i32 {
    ffi_guard!({
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_set_int", "key");
        };
        status_of(
            "vellum_set_int",
            ffi_lock!(nodes()).set_int(NodeHandle::from_raw(node), key, value),
        )
    })
}

/// Set `node[key]` to a float. NaN and infinities are stored as `null`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_set_float(node: u64, key: *const c_char, value: f64) -> i32 {
    ffi_guard!({
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_set_float", "key");
        };
        status_of(
            "vellum_set_float",
            ffi_lock!(nodes()).set_float(NodeHandle::from_raw(node), key, value),
        )
    })
}

/// Set `node[key]` to a string.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_set_string(node: u64, key: *const c_char, value: *const c_char) -> i32 {
    ffi_guard!({
        // SAFETY: key and value are null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_set_string", "key");
        };
        let Some(value) = (unsafe { c_bytes(value) }) else {
            return invalid_argument("vellum_set_string", "value");
        };
        status_of(
            "vellum_set_string",
            ffi_lock!(nodes()).set_string(NodeHandle::from_raw(node), key, value),
        )
    })
}

/// Move the object node `value` into `node[key]`, consuming `value`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_set_object(node: u64, key: *const c_char, value: u64) -> i32 {
    ffi_guard!({
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_set_object", "key");
        };
        let result = ffi_lock!(nodes()).set_object(
            NodeHandle::from_raw(node),
            key,
            NodeHandle::from_raw(value),
        );
        status_of("vellum_set_object", result)
    })
}

/// Move the array node `value` into `node[key]`, consuming `value`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_set_array(node: u64, key: *const c_char, value: u64) -> i32 {
    ffi_guard!({
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_set_array", "key");
        };
        let result = ffi_lock!(nodes()).set_array(
            NodeHandle::from_raw(node),
            key,
            NodeHandle::from_raw(value),
        );
        status_of("vellum_set_array", result)
    })
}

/// Erase `node[key]`. An absent key is not an error.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_remove(node: u64, key: *const c_char) -> i32 {
    ffi_guard!({
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_remove", "key");
        };
        let result = ffi_lock!(nodes()).remove(NodeHandle::from_raw(node), key);
        status_of("vellum_remove", result.map(drop))
    })
}

// ── keyed getters ───────────────────────────────────────────────

/// Read the boolean at `node[key]` into `out` (0 or 1).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_get_bool(node: u64, key: *const c_char, out: *mut u8) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_get_bool", "out");
        }
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_get_bool", "key");
        };
        let result = ffi_lock!(nodes()).get_bool(NodeHandle::from_raw(node), key);
        put("vellum_get_bool", out, result.map(u8::from))
    })
}

/// Read the integer at `node[key]` into `out`. Floats are `WrongType`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_get_int(node: u64, key: *const c_char, out: *mut i64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_get_int", "out");
        }
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_get_int", "key");
        };
        let result = ffi_lock!(nodes()).get_int(NodeHandle::from_raw(node), key);
        put("vellum_get_int", out, result)
    })
}

/// Read the float at `node[key]` into `out`. Integers are `WrongType`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_get_float(node: u64, key: *const c_char, out: *mut f64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_get_float", "out");
        }
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_get_float", "key");
        };
        let result = ffi_lock!(nodes()).get_float(NodeHandle::from_raw(node), key);
        put("vellum_get_float", out, result)
    })
}

/// Copy the string at `node[key]` into `buf` as Windows-1251 text.
///
/// At most `cap - 1` bytes are written, followed by a NUL.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_get_string(node: u64, key: *const c_char, buf: *mut c_char, cap: usize) -> i32 {
    ffi_guard!({
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_get_string", "key");
        };
        let text = match ffi_lock!(nodes()).get_string(NodeHandle::from_raw(node), key) {
            Ok(text) => text,
            Err(e) => return fail("vellum_get_string", &e),
        };
        deliver("vellum_get_string", &text, buf, cap)
    })
}

/// Copy the object at `node[key]` into the output slot `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_get_object(node: u64, key: *const c_char, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_get_object", "out");
        }
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_get_object", "key");
        };
        let mut arena = ffi_lock!(nodes());
        let node = NodeHandle::from_raw(node);
        status_of(
            "vellum_get_object",
            with_slot(out, |slot| arena.get_object(node, key, slot)),
        )
    })
}

/// Copy the array at `node[key]` into the output slot `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_get_array(node: u64, key: *const c_char, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_get_array", "out");
        }
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_get_array", "key");
        };
        let mut arena = ffi_lock!(nodes());
        let node = NodeHandle::from_raw(node);
        status_of(
            "vellum_get_array",
            with_slot(out, |slot| arena.get_array(node, key, slot)),
        )
    })
}

/// Write the [`VellumKind`] of `node[key]` to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_get_kind(node: u64, key: *const c_char, out: *mut i32) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_get_kind", "out");
        }
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_get_kind", "key");
        };
        let result = ffi_lock!(nodes()).get_kind(NodeHandle::from_raw(node), key);
        put("vellum_get_kind", out, result.map(|k| VellumKind::from(k) as i32))
    })
}

// ── node getters ────────────────────────────────────────────────

/// Read a boolean node into `out` (0 or 1).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_node_bool(node: u64, out: *mut u8) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_node_bool", "out");
        }
        let result = ffi_lock!(nodes()).node_bool(NodeHandle::from_raw(node));
        put("vellum_node_bool", out, result.map(u8::from))
    })
}

/// Read an integer node into `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_node_int(node: u64, out: *mut i64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_node_int", "out");
        }
        let result = ffi_lock!(nodes()).node_int(NodeHandle::from_raw(node));
        put("vellum_node_int", out, result)
    })
}

/// Read a float node into `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_node_float(node: u64, out: *mut f64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_node_float", "out");
        }
        let result = ffi_lock!(nodes()).node_float(NodeHandle::from_raw(node));
        put("vellum_node_float", out, result)
    })
}

/// Copy a string node into `buf` as Windows-1251 text.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_node_string(node: u64, buf: *mut c_char, cap: usize) -> i32 {
    ffi_guard!({
        let text = match ffi_lock!(nodes()).node_string(NodeHandle::from_raw(node)) {
            Ok(text) => text,
            Err(e) => return fail("vellum_node_string", &e),
        };
        deliver("vellum_node_string", &text, buf, cap)
    })
}

// ── keys ────────────────────────────────────────────────────────

/// Write the number of keys of the object `node` to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_key_count(node: u64, out: *mut usize) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_key_count", "out");
        }
        let result = ffi_lock!(nodes()).key_count(NodeHandle::from_raw(node));
        put("vellum_key_count", out, result)
    })
}

/// Copy the key at position `index` of the object `node` into `buf`.
///
/// Keys are in insertion order.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_key_at(node: u64, index: i64, buf: *mut c_char, cap: usize) -> i32 {
    ffi_guard!({
        let key = match ffi_lock!(nodes()).key_at(NodeHandle::from_raw(node), index) {
            Ok(key) => key,
            Err(e) => return fail("vellum_key_at", &e),
        };
        deliver("vellum_key_at", &key, buf, cap)
    })
}
