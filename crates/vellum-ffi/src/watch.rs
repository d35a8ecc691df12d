//! File watcher FFI.
//!
//! One process-wide [`FileWatcher`], created on first use, plus one
//! registered callback. [`vellum_process_tick`] is meant to be called from
//! the host's main loop; it scans under the watcher lock, then invokes the
//! callback with no lock held so the callback may call back into Vellum.

use std::ffi::{c_char, c_void, CString};
use std::sync::Mutex;
use std::time::Instant;

use vellum_watch::{FileWatcher, WatchConfig};

use crate::status::VellumStatus;
use crate::strings::{c_bytes, legacy_path, path_to_legacy};
use crate::types::{VellumFileEvent, VellumWatchCallback};
use crate::{invalid_argument, status_of};

#[derive(Clone, Copy)]
struct Callback {
    func: VellumWatchCallback,
    user_data: usize,
}

static WATCHER: Mutex<Option<FileWatcher>> = Mutex::new(None);

static CALLBACK: Mutex<Callback> = Mutex::new(Callback {
    func: None,
    user_data: 0,
});

/// Register the callback that receives file events. Pass a null `cb` to
/// stop delivering events; they are still consumed by each tick.
///
/// `user_data` is passed back verbatim and never dereferenced.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_watcher_set_callback(cb: VellumWatchCallback, user_data: *mut c_void) -> i32 {
    ffi_guard!({
        *ffi_lock!(CALLBACK) = Callback {
            func: cb,
            user_data: user_data as usize,
        };
        VellumStatus::Ok as i32
    })
}

/// Start watching `path` (Windows-1251). Its current state is the baseline.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_watcher_start(path: *const c_char) -> i32 {
    ffi_guard!({
        // SAFETY: path is null or NUL-terminated per caller contract.
        let Some(path) = (unsafe { c_bytes(path) }) else {
            return invalid_argument("vellum_watcher_start", "path");
        };
        let path = legacy_path(path);
        let mut watcher = ffi_lock!(WATCHER);
        status_of(
            "vellum_watcher_start",
            watcher.get_or_insert_with(FileWatcher::default).start(path),
        )
    })
}

/// Stop watching `path` (Windows-1251).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_watcher_stop(path: *const c_char) -> i32 {
    ffi_guard!({
        // SAFETY: path is null or NUL-terminated per caller contract.
        let Some(path) = (unsafe { c_bytes(path) }) else {
            return invalid_argument("vellum_watcher_stop", "path");
        };
        let path = legacy_path(path);
        let mut watcher = ffi_lock!(WATCHER);
        status_of(
            "vellum_watcher_stop",
            watcher.get_or_insert_with(FileWatcher::default).stop(&path),
        )
    })
}

/// Set the minimum time between polls, in milliseconds. Zero is
/// `InvalidArgument`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_set_watch_interval(ms: u64) -> i32 {
    ffi_guard!({
        let config = WatchConfig::with_interval_ms(ms);
        let mut watcher = ffi_lock!(WATCHER);
        let result = match watcher.as_mut() {
            Some(w) => w.set_config(config),
            None => FileWatcher::new(config).map(|w| *watcher = Some(w)),
        };
        status_of("vellum_set_watch_interval", result)
    })
}

/// Poll watched paths if the interval has elapsed and deliver each change
/// to the callback.
///
/// A callback returning 0 stops delivery; undelivered changes are reported
/// again on the next poll. The interval is measured from the end of
/// delivery, so a slow callback delays the next poll.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vellum_process_tick() -> i32 {
    ffi_guard!({
        let scanned = ffi_lock!(WATCHER)
            .as_ref()
            .and_then(|w| w.scan(Instant::now()));
        let Some(transitions) = scanned else {
            return VellumStatus::Ok as i32;
        };
        let callback = *ffi_lock!(CALLBACK);

        let mut delivered = 0;
        for transition in &transitions {
            log::debug!("{:?} {}", transition.event, transition.path.display());
            delivered += 1;
            let Some(func) = callback.func else {
                continue;
            };
            let path = CString::new(path_to_legacy(&transition.path)).unwrap_or_default();
            let event = VellumFileEvent::from(transition.event) as i32;
            if func(callback.user_data as *mut c_void, path.as_ptr(), event) == 0 {
                break;
            }
        }

        if let Some(w) = ffi_lock!(WATCHER).as_mut() {
            for transition in &transitions[..delivered] {
                w.commit(transition);
            }
            w.finish(Instant::now());
        }
        VellumStatus::Ok as i32
    })
}
