//! Array FFI: length, indexed read, cursor iteration and in-place edits.

use std::ffi::c_char;

use vellum_core::{ArrayCursor, NodeHandle};

use crate::node::{nodes, with_slot};
use crate::status::VellumStatus;
use crate::strings::c_bytes;
use crate::{fail, invalid_argument, status_of};

/// Write the length of the array `node` to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_array_len(node: u64, out: *mut usize) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_array_len", "out");
        }
        match ffi_lock!(nodes()).array_len(NodeHandle::from_raw(node)) {
            Ok(len) => {
                // SAFETY: out is non-null and writable per caller contract.
                unsafe { *out = len };
                VellumStatus::Ok as i32
            }
            Err(e) => fail("vellum_array_len", &e),
        }
    })
}

/// Copy element `index` of the array `node` into the output slot `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_array_get(node: u64, index: i64, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return invalid_argument("vellum_array_get", "out");
        }
        let mut arena = ffi_lock!(nodes());
        let node = NodeHandle::from_raw(node);
        status_of(
            "vellum_array_get",
            with_slot(out, |slot| arena.array_get(node, index, slot)),
        )
    })
}

/// Copy the element after `*cursor` into `out` and advance the cursor.
///
/// Start with `*cursor == -1`. Past the last element this returns
/// `NodeNotFound` and leaves both `*cursor` and `*out` unchanged; reset the
/// cursor to -1 to iterate again.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_array_iterate(node: u64, cursor: *mut i64, out: *mut u64) -> i32 {
    ffi_guard!({
        if cursor.is_null() {
            return invalid_argument("vellum_array_iterate", "cursor");
        }
        if out.is_null() {
            return invalid_argument("vellum_array_iterate", "out");
        }
        // SAFETY: cursor is non-null and readable per caller contract.
        let mut position = ArrayCursor(unsafe { *cursor });
        let mut arena = ffi_lock!(nodes());
        let node = NodeHandle::from_raw(node);
        let result = with_slot(out, |slot| arena.array_iterate(node, &mut position, slot));
        // SAFETY: cursor is non-null and writable per caller contract.
        unsafe { *cursor = position.0 };
        status_of("vellum_array_iterate", result)
    })
}

/// Append `value` to the array at `node[key]`, consuming `value`.
///
/// The key must already hold an array.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_array_append(node: u64, key: *const c_char, value: u64) -> i32 {
    ffi_guard!({
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_array_append", "key");
        };
        let result = ffi_lock!(nodes()).array_append(
            NodeHandle::from_raw(node),
            key,
            NodeHandle::from_raw(value),
        );
        status_of("vellum_array_append", result)
    })
}

/// Append `value` to the array `node` itself, consuming `value`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_array_push(node: u64, value: u64) -> i32 {
    ffi_guard!({
        let result = ffi_lock!(nodes()).array_push(NodeHandle::from_raw(node), NodeHandle::from_raw(value));
        status_of("vellum_array_push", result)
    })
}

/// Remove every element of `node[key]` equal to `value`.
///
/// `value` is only compared and stays valid. `removed` may be null;
/// otherwise it receives the number of removed elements.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_array_remove_value(
    node: u64,
    key: *const c_char,
    value: u64,
    removed: *mut usize,
) -> i32 {
    ffi_guard!({
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_array_remove_value", "key");
        };
        let result = ffi_lock!(nodes()).array_remove_value(
            NodeHandle::from_raw(node),
            key,
            NodeHandle::from_raw(value),
        );
        match result {
            Ok(count) => {
                if !removed.is_null() {
                    // SAFETY: removed is non-null and writable per caller contract.
                    unsafe { *removed = count };
                }
                VellumStatus::Ok as i32
            }
            Err(e) => fail("vellum_array_remove_value", &e),
        }
    })
}

/// Remove element `index` of `node[key]`, shifting later elements down.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_array_remove_index(node: u64, key: *const c_char, index: i64) -> i32 {
    ffi_guard!({
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_array_remove_index", "key");
        };
        let result = ffi_lock!(nodes()).array_remove_index(NodeHandle::from_raw(node), key, index);
        status_of("vellum_array_remove_index", result)
    })
}

/// Reset `node[key]` to the empty value of its kind.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_array_clear(node: u64, key: *const c_char) -> i32 {
    ffi_guard!({
        // SAFETY: key is null or NUL-terminated per caller contract.
        let Some(key) = (unsafe { c_bytes(key) }) else {
            return invalid_argument("vellum_array_clear", "key");
        };
        let result = ffi_lock!(nodes()).array_clear(NodeHandle::from_raw(node), key);
        status_of("vellum_array_clear", result)
    })
}
