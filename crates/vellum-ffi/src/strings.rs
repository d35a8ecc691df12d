//! NUL-terminated string plumbing.

use std::ffi::{c_char, CStr};
use std::path::PathBuf;

use vellum_codec::Codepage;
use vellum_core::NodeError;

use crate::status::VellumStatus;

/// Borrow a caller string as bytes, without its terminator.
///
/// Returns `None` for a null pointer.
///
/// # Safety
///
/// A non-null `ptr` must point to a NUL-terminated string that stays
/// alive and unmodified for `'a`.
#[allow(unsafe_code)]
pub(crate) unsafe fn c_bytes<'a>(ptr: *const c_char) -> Option<&'a [u8]> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the function contract.
    Some(unsafe { CStr::from_ptr(ptr) }.to_bytes())
}

/// A filesystem path from a legacy-encoded caller string.
pub(crate) fn legacy_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(Codepage::WINDOWS_1251.encode(bytes))
}

/// Legacy-encoded bytes for a path, for handing back to the caller.
pub(crate) fn path_to_legacy(path: &std::path::Path) -> Vec<u8> {
    Codepage::WINDOWS_1251.decode_until_nul(path.to_string_lossy().as_bytes())
}

/// Copy `bytes` into `buf`, truncating to `cap - 1` bytes, then terminate.
///
/// Returns the number of bytes copied before the terminator. `buf` must be
/// non-null and `cap` nonzero.
#[allow(unsafe_code)]
pub(crate) fn write_bounded(bytes: &[u8], buf: *mut c_char, cap: usize) -> usize {
    let n = bytes.len().min(cap - 1);
    // SAFETY: the caller guarantees `buf` points to at least `cap` writable
    // bytes, and `n < cap`.
    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf.cast::<u8>(), n);
        *buf.add(n) = 0;
    }
    n
}

/// Deliver a legacy string to a caller buffer.
///
/// A null buffer or zero capacity has nowhere to put the string and is
/// reported as `NoReturnString`.
#[track_caller]
pub(crate) fn deliver(op: &str, bytes: &[u8], buf: *mut c_char, cap: usize) -> i32 {
    if buf.is_null() || cap == 0 {
        return crate::fail(op, &NodeError::NoReturnString);
    }
    write_bounded(bytes, buf, cap);
    VellumStatus::Ok as i32
}
