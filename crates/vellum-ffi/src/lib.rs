//! C FFI bindings for the Vellum node store.
//!
//! Exposes the node arena, query engine and file watcher to a scripting
//! host through a flat C API. Every entry point returns an `i32`
//! [`VellumStatus`] unless documented otherwise, catches panics at the
//! boundary, and logs failures through the `log` facade.
//!
//! Strings cross the boundary NUL-terminated and Windows-1251 encoded.
//! Handles are opaque `u64` values; `0` is never a valid handle.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

use std::any::Any;
use std::cell::RefCell;
use std::ffi::c_char;
use std::fmt;
use std::panic::Location;

/// Run an FFI body, converting a panic into [`VellumStatus::Panicked`].
///
/// The panic message is kept per thread for [`vellum_last_panic_message`].
/// `return` inside the body returns from the guarded block only.
macro_rules! ffi_guard {
    ($body:block) => {
        ffi_guard_or!($crate::status::VellumStatus::Panicked as i32, $body)
    };
}

/// Like `ffi_guard!`, but returns `$fallback` on panic.
macro_rules! ffi_guard_or {
    ($fallback:expr, $body:block) => {{
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(payload) => {
                $crate::record_panic(payload.as_ref());
                $fallback
            }
        }
    }};
}

/// Lock a global table, returning `UnknownError` from the guarded block if
/// the mutex was poisoned by an earlier panic.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => {
                log::error!("vellum state lock poisoned by an earlier panic");
                return $crate::status::VellumStatus::UnknownError as i32;
            }
        }
    };
}

pub mod access;
pub mod array;
pub mod node;
pub mod status;
mod strings;
pub mod types;
pub mod watch;

pub use status::VellumStatus;
pub use types::{VellumFileEvent, VellumKind, VellumObjectEntry, VellumWatchCallback};

thread_local! {
    pub(crate) static LAST_PANIC: RefCell<String> = const { RefCell::new(String::new()) };
}

pub(crate) fn record_panic(payload: &(dyn Any + Send)) {
    let msg = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    };
    log::error!("panic caught at FFI boundary: {msg}");
    LAST_PANIC.with(|cell| *cell.borrow_mut() = msg);
}

/// Log a failed call and return its status code.
#[track_caller]
pub(crate) fn fail<E>(op: &str, err: &E) -> i32
where
    E: fmt::Display,
    for<'a> VellumStatus: From<&'a E>,
{
    let at = Location::caller();
    log::warn!("{op} failed at {}:{}: {err}", at.file(), at.line());
    VellumStatus::from(err) as i32
}

/// Map a unit result to a status code, logging the failure.
#[track_caller]
pub(crate) fn status_of<E>(op: &str, result: Result<(), E>) -> i32
where
    E: fmt::Display,
    for<'a> VellumStatus: From<&'a E>,
{
    match result {
        Ok(()) => VellumStatus::Ok as i32,
        Err(e) => fail(op, &e),
    }
}

/// Log a rejected pointer argument and return `InvalidArgument`.
#[track_caller]
pub(crate) fn invalid_argument(op: &str, what: &str) -> i32 {
    let at = Location::caller();
    log::warn!("{op} rejected at {}:{}: {what} is null", at.file(), at.line());
    VellumStatus::InvalidArgument as i32
}

/// Copy the last panic message caught on this thread into `buf`.
///
/// Returns the full message length in bytes (excluding the terminator),
/// or 0 if no panic has been recorded. Pass a null `buf` to query the
/// length. At most `cap - 1` bytes are written, followed by a NUL.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_last_panic_message(buf: *mut c_char, cap: usize) -> i32 {
    LAST_PANIC.with(|cell| {
        let msg = cell.borrow();
        if !buf.is_null() && cap > 0 {
            strings::write_bounded(msg.as_bytes(), buf, cap);
        }
        i32::try_from(msg.len()).unwrap_or(i32::MAX)
    })
}

/// Install a stderr logger that honours `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_init_logging() -> i32 {
    ffi_guard!({
        if env_logger::Builder::from_default_env().try_init().is_ok() {
            log::debug!("vellum logging initialised");
        }
        VellumStatus::Ok as i32
    })
}
