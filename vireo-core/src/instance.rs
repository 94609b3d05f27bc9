//! Engine instance wrapper.
//!
//! One [`Instance`] owns one native engine handle and releases it exactly
//! once on drop. Native log lines are bridged into `tracing`: the engine
//! hands our trampoline an opaque identity token (the instance handle), and
//! the trampoline resolves it through a process-wide registry back to the
//! per-instance severity threshold - the token is never reinterpreted as a
//! Rust object.

use std::collections::HashMap;
use std::ffi::{c_char, c_int, c_void, CString};
use std::ptr;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::ffi::{self, LibvlcApi, VlcInstanceHandle};
use crate::modules::{self, ModuleDescription};

/// Severity threshold for engine log messages, matching `libvlc_log_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(i32)]
pub enum LogLevel {
    Debug = 0,
    Notice = 2,
    Warning = 3,
    Error = 4,
}

/// Per-instance log thresholds, keyed by the address of the native handle.
static LOG_THRESHOLDS: Lazy<Mutex<HashMap<usize, LogLevel>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Point the engine at its plugin directory via `VLC_PLUGIN_PATH`.
///
/// Must run before the first [`Instance::new`]; the engine reads the
/// variable during instance construction and not again.
pub fn set_plugin_search_path(path: &str) {
    std::env::set_var("VLC_PLUGIN_PATH", path);
}

/// One native engine instance.
pub struct Instance {
    api: &'static LibvlcApi,
    handle: VlcInstanceHandle,
}

// The engine is internally thread-safe; serializing wrapper calls on one
// handle is the caller's job.
unsafe impl Send for Instance {}
unsafe impl Sync for Instance {}

impl Instance {
    /// Create and initialize an engine instance.
    ///
    /// `args` are engine command-line style arguments; invalid or
    /// unsupported arguments make the engine decline construction, which
    /// surfaces here as `None` rather than an error.
    pub fn new(args: &[&str]) -> Option<Instance> {
        let api = LibvlcApi::get()?;
        let owned: Vec<CString> = args
            .iter()
            .map(|a| CString::new(*a))
            .collect::<Result<_, _>>()
            .ok()?;
        let argv: Vec<*const c_char> = owned.iter().map(|a| a.as_ptr()).collect();
        let handle = unsafe {
            (api.instance_new)(
                argv.len() as c_int,
                if argv.is_empty() { ptr::null() } else { argv.as_ptr() },
            )
        };
        if handle.is_null() {
            tracing::warn!("engine declined instance construction");
            return None;
        }
        Some(Instance { api, handle })
    }

    /// Set the human-readable application name and the HTTP user agent the
    /// engine sends when a protocol requires one.
    pub fn set_user_agent(&self, name: &str, http: &str) {
        let (Ok(name), Ok(http)) = (CString::new(name), CString::new(http)) else {
            return;
        };
        unsafe { (self.api.set_user_agent)(self.handle, name.as_ptr(), http.as_ptr()) };
    }

    /// Set application metadata: reverse-domain identifier, version string,
    /// and icon name.
    pub fn set_app_id(&self, id: &str, version: &str, icon: &str) {
        let (Ok(id), Ok(version), Ok(icon)) =
            (CString::new(id), CString::new(version), CString::new(icon))
        else {
            return;
        };
        unsafe { (self.api.set_app_id)(self.handle, id.as_ptr(), version.as_ptr(), icon.as_ptr()) };
    }

    /// Forward engine log messages at or above `level` into `tracing`.
    pub fn enable_logging(&self, level: LogLevel) {
        LOG_THRESHOLDS.lock().insert(self.handle as usize, level);
        unsafe { (self.api.log_set)(self.handle, log_trampoline, self.handle) };
    }

    /// Stop forwarding engine log messages.
    pub fn disable_logging(&self) {
        unsafe { (self.api.log_unset)(self.handle) };
        LOG_THRESHOLDS.lock().remove(&(self.handle as usize));
    }

    /// Audio filter modules available in this engine build, in native
    /// registration order.
    pub fn audio_filters(&self) -> Vec<ModuleDescription> {
        unsafe {
            let head = (self.api.audio_filter_list_get)(self.handle);
            let list = modules::collect_descriptions(head);
            (self.api.module_list_release)(head);
            list
        }
    }

    /// Video filter modules available in this engine build, in native
    /// registration order.
    pub fn video_filters(&self) -> Vec<ModuleDescription> {
        unsafe {
            let head = (self.api.video_filter_list_get)(self.handle);
            let list = modules::collect_descriptions(head);
            (self.api.module_list_release)(head);
            list
        }
    }

    /// Diagnostic snapshot of the loaded engine.
    pub fn runtime_info(&self) -> serde_json::Value {
        serde_json::json!({
            "binding_version": crate::VERSION,
            "engine_version": Self::version(),
            "engine_compiler": Self::compiler(),
            "engine_changeset": Self::changeset(),
            "clock_us": Self::clock(),
        })
    }

    pub(crate) fn as_raw(&self) -> VlcInstanceHandle {
        self.handle
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        if self.handle.is_null() {
            return;
        }
        LOG_THRESHOLDS.lock().remove(&(self.handle as usize));
        unsafe { (self.api.instance_release)(self.handle) };
        self.handle = ptr::null_mut();
    }
}

// ============================================================================
// Engine-Global Queries
// ============================================================================

impl Instance {
    /// Engine version string, e.g. `"3.0.20 Vetinari"`.
    pub fn version() -> Option<String> {
        let api = LibvlcApi::get()?;
        unsafe { ffi::copy_cstr((api.get_version)()) }
    }

    /// Compiler the engine was built with.
    pub fn compiler() -> Option<String> {
        let api = LibvlcApi::get()?;
        unsafe { ffi::copy_cstr((api.get_compiler)()) }
    }

    /// Engine source changeset.
    pub fn changeset() -> Option<String> {
        let api = LibvlcApi::get()?;
        unsafe { ffi::copy_cstr((api.get_changeset)()) }
    }

    /// The engine's monotonic clock, in microseconds. The origin is
    /// arbitrary but consistent across the process.
    pub fn clock() -> Option<i64> {
        let api = LibvlcApi::get()?;
        Some(unsafe { (api.clock)() })
    }

    /// Delay in microseconds until `pts` on the engine clock; negative when
    /// the timestamp is already in the past.
    pub fn delay(pts: i64) -> Option<i64> {
        Self::clock().map(|now| pts - now)
    }
}

// ============================================================================
// Log Trampoline
// ============================================================================

unsafe extern "C" fn log_trampoline(
    data: *mut c_void,
    level: c_int,
    _ctx: *const c_void,
    fmt: *const c_char,
    args: *mut c_void,
) {
    let threshold = match LOG_THRESHOLDS.lock().get(&(data as usize)).copied() {
        Some(t) => t,
        None => return,
    };
    if level < threshold as c_int {
        return;
    }
    let Some(message) = ffi::format_native_message(fmt, args) else {
        return;
    };
    if level >= LogLevel::Error as c_int {
        tracing::error!(target: "vireo::engine", "{message}");
    } else if level >= LogLevel::Warning as c_int {
        tracing::warn!(target: "vireo::engine", "{message}");
    } else if level >= LogLevel::Notice as c_int {
        tracing::info!(target: "vireo::engine", "{message}");
    } else {
        tracing::debug!(target: "vireo::engine", "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Notice);
        assert!(LogLevel::Notice < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert_eq!(LogLevel::Notice as c_int, 2);
    }

    #[test]
    fn test_threshold_registry_roundtrip() {
        let key = 0xBEEF_usize;
        LOG_THRESHOLDS.lock().insert(key, LogLevel::Warning);
        assert_eq!(LOG_THRESHOLDS.lock().get(&key), Some(&LogLevel::Warning));
        LOG_THRESHOLDS.lock().remove(&key);
        assert_eq!(LOG_THRESHOLDS.lock().get(&key), None);
        // Removing twice is harmless.
        LOG_THRESHOLDS.lock().remove(&key);
    }

    #[test]
    fn test_trampoline_ignores_unregistered_instances() {
        // An identity token with no registry entry returns before the
        // message is ever formatted, so null fmt/args never get touched.
        unsafe {
            log_trampoline(
                0xDEAD as *mut c_void,
                LogLevel::Error as c_int,
                ptr::null(),
                ptr::null(),
                ptr::null_mut(),
            );
        }
    }

    #[test]
    fn test_trampoline_gates_below_threshold() {
        let key = 0xF00D_usize;
        LOG_THRESHOLDS.lock().insert(key, LogLevel::Error);
        unsafe {
            // Warning < Error threshold: returns before formatting.
            log_trampoline(
                key as *mut c_void,
                LogLevel::Warning as c_int,
                ptr::null(),
                ptr::null(),
                ptr::null_mut(),
            );
        }
        LOG_THRESHOLDS.lock().remove(&key);
    }
}
