// libvlc - dynamic binding to the VLC media engine
//
// No compile-time libvlc dependency - the shared library is located and
// loaded at runtime via libloading, and every entry point the crate consumes
// is resolved once into a process-wide function table.
//
// Pipeline:
// 1. Probe per-OS candidate paths for the engine library
// 2. Resolve all consumed symbols into `LibvlcApi`
// 3. Cache the table in a OnceLock for the process lifetime
// 4. Wrapper types call through the table and own the returned handles

use std::ffi::{c_char, c_int, c_uint, c_void, CStr};
use std::sync::OnceLock;

// ============================================================================
// Opaque Handle Types
// ============================================================================

pub type VlcInstanceHandle = *mut c_void;
pub type VlcMediaHandle = *mut c_void;
pub type VlcPlayerHandle = *mut c_void;
pub type VlcEventManagerHandle = *mut c_void;

// ============================================================================
// Raw Structs (from libvlc headers)
// ============================================================================

/// `libvlc_module_description_t` - node of a native singly-linked list.
///
/// String fields are owned by the native list and die with it; callers must
/// copy them out before the list is released.
#[repr(C)]
pub struct RawModuleDescription {
    pub psz_name: *mut c_char,
    pub psz_shortname: *mut c_char,
    pub psz_longname: *mut c_char,
    pub psz_help: *mut c_char,
    pub p_next: *mut RawModuleDescription,
}

/// Header of `libvlc_event_t`. The payload union is never read here.
#[repr(C)]
pub struct RawEvent {
    pub kind: c_int,
    pub p_obj: *mut c_void,
}

// ============================================================================
// Callback Types (native contracts)
// ============================================================================

/// `libvlc_video_lock_cb` - invoked before a frame is decoded; fills the
/// plane array and returns a picture identifier the engine hands back to the
/// unlock and display callbacks.
pub type VideoLockCb =
    unsafe extern "C" fn(opaque: *mut c_void, planes: *mut *mut c_void) -> *mut c_void;

/// `libvlc_video_unlock_cb` - invoked once the frame is decoded.
pub type VideoUnlockCb =
    unsafe extern "C" fn(opaque: *mut c_void, picture: *mut c_void, planes: *const *mut c_void);

/// `libvlc_video_display_cb` - invoked when the frame should be shown.
pub type VideoDisplayCb = unsafe extern "C" fn(opaque: *mut c_void, picture: *mut c_void);

/// `libvlc_log_cb` - the final argument is a C `va_list`, passed through
/// opaquely and expanded with `vsnprintf`.
pub type LogCb = unsafe extern "C" fn(
    data: *mut c_void,
    level: c_int,
    ctx: *const c_void,
    fmt: *const c_char,
    args: *mut c_void,
);

// ============================================================================
// Library Path Detection
// ============================================================================

#[cfg(target_os = "windows")]
pub fn libvlc_library_path() -> String {
    for path in &[
        "C:\\Program Files\\VideoLAN\\VLC\\libvlc.dll",
        "C:\\Program Files (x86)\\VideoLAN\\VLC\\libvlc.dll",
        "libvlc.dll",
    ] {
        if std::path::Path::new(path).exists() {
            return path.to_string();
        }
    }
    "libvlc.dll".to_string()
}

#[cfg(target_os = "linux")]
pub fn libvlc_library_path() -> String {
    for path in &[
        "/usr/lib/x86_64-linux-gnu/libvlc.so.5",
        "/usr/lib64/libvlc.so.5",
        "/usr/lib/libvlc.so.5",
        "/usr/local/lib/libvlc.so.5",
        "libvlc.so.5",
    ] {
        if std::path::Path::new(path).exists() {
            return path.to_string();
        }
    }
    "libvlc.so.5".to_string()
}

#[cfg(target_os = "macos")]
pub fn libvlc_library_path() -> String {
    for path in &[
        "/Applications/VLC.app/Contents/MacOS/lib/libvlc.dylib",
        "/usr/local/lib/libvlc.dylib",
        "libvlc.dylib",
    ] {
        if std::path::Path::new(path).exists() {
            return path.to_string();
        }
    }
    "libvlc.dylib".to_string()
}

#[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
pub fn libvlc_library_path() -> String {
    "libvlc.so.5".to_string()
}

// ============================================================================
// Function Types
// ============================================================================

type NewFn = unsafe extern "C" fn(c_int, *const *const c_char) -> VlcInstanceHandle;
type ReleaseFn = unsafe extern "C" fn(VlcInstanceHandle);
type SetUserAgentFn = unsafe extern "C" fn(VlcInstanceHandle, *const c_char, *const c_char);
type SetAppIdFn =
    unsafe extern "C" fn(VlcInstanceHandle, *const c_char, *const c_char, *const c_char);
type LogSetFn = unsafe extern "C" fn(VlcInstanceHandle, LogCb, *mut c_void);
type LogUnsetFn = unsafe extern "C" fn(VlcInstanceHandle);
type GetStringFn = unsafe extern "C" fn() -> *const c_char;
type ClockFn = unsafe extern "C" fn() -> i64;
type ErrmsgFn = unsafe extern "C" fn() -> *const c_char;
type FreeFn = unsafe extern "C" fn(*mut c_void);
type FilterListGetFn = unsafe extern "C" fn(VlcInstanceHandle) -> *mut RawModuleDescription;
type ModuleListReleaseFn = unsafe extern "C" fn(*mut RawModuleDescription);

type MediaNewLocationFn = unsafe extern "C" fn(VlcInstanceHandle, *const c_char) -> VlcMediaHandle;
type MediaReleaseFn = unsafe extern "C" fn(VlcMediaHandle);
type MediaGetMrlFn = unsafe extern "C" fn(VlcMediaHandle) -> *mut c_char;
type MediaGetStateFn = unsafe extern "C" fn(VlcMediaHandle) -> c_int;
type MediaGetDurationFn = unsafe extern "C" fn(VlcMediaHandle) -> i64;
type MediaGetTypeFn = unsafe extern "C" fn(VlcMediaHandle) -> c_uint;
type MediaEventManagerFn = unsafe extern "C" fn(VlcMediaHandle) -> VlcEventManagerHandle;

type PlayerNewFn = unsafe extern "C" fn(VlcInstanceHandle) -> VlcPlayerHandle;
type PlayerNewFromMediaFn = unsafe extern "C" fn(VlcMediaHandle) -> VlcPlayerHandle;
type PlayerReleaseFn = unsafe extern "C" fn(VlcPlayerHandle);
type PlayerIsPlayingFn = unsafe extern "C" fn(VlcPlayerHandle) -> c_int;
type PlayerPlayFn = unsafe extern "C" fn(VlcPlayerHandle) -> c_int;
type PlayerVoidFn = unsafe extern "C" fn(VlcPlayerHandle);
type VideoSetCallbacksFn = unsafe extern "C" fn(
    VlcPlayerHandle,
    Option<VideoLockCb>,
    Option<VideoUnlockCb>,
    Option<VideoDisplayCb>,
    *mut c_void,
);
type VideoSetFormatFn =
    unsafe extern "C" fn(VlcPlayerHandle, *const c_char, c_uint, c_uint, c_uint);

// ============================================================================
// Loaded Function Table
// ============================================================================

pub struct LibvlcApi {
    _lib: libloading::Library,

    pub(crate) instance_new: NewFn,
    pub(crate) instance_release: ReleaseFn,
    pub(crate) set_user_agent: SetUserAgentFn,
    pub(crate) set_app_id: SetAppIdFn,
    pub(crate) log_set: LogSetFn,
    pub(crate) log_unset: LogUnsetFn,
    pub(crate) get_version: GetStringFn,
    pub(crate) get_compiler: GetStringFn,
    pub(crate) get_changeset: GetStringFn,
    pub(crate) clock: ClockFn,
    pub(crate) errmsg: ErrmsgFn,
    pub(crate) free: FreeFn,
    pub(crate) audio_filter_list_get: FilterListGetFn,
    pub(crate) video_filter_list_get: FilterListGetFn,
    pub(crate) module_list_release: ModuleListReleaseFn,

    pub(crate) media_new_location: MediaNewLocationFn,
    pub(crate) media_release: MediaReleaseFn,
    pub(crate) media_get_mrl: MediaGetMrlFn,
    pub(crate) media_get_state: MediaGetStateFn,
    pub(crate) media_get_duration: MediaGetDurationFn,
    pub(crate) media_get_type: MediaGetTypeFn,
    pub(crate) media_event_manager: MediaEventManagerFn,

    pub(crate) player_new: PlayerNewFn,
    pub(crate) player_new_from_media: PlayerNewFromMediaFn,
    pub(crate) player_release: PlayerReleaseFn,
    pub(crate) player_is_playing: PlayerIsPlayingFn,
    pub(crate) player_play: PlayerPlayFn,
    pub(crate) player_pause: PlayerVoidFn,
    pub(crate) player_stop: PlayerVoidFn,
    pub(crate) video_set_callbacks: VideoSetCallbacksFn,
    pub(crate) video_set_format: VideoSetFormatFn,
}

static LIBVLC: OnceLock<Option<LibvlcApi>> = OnceLock::new();

impl LibvlcApi {
    /// Process-wide function table, loaded on first use.
    ///
    /// Returns `None` when the engine library (or one of its symbols) is
    /// missing; the failure is logged once and cached.
    pub fn get() -> Option<&'static LibvlcApi> {
        LIBVLC.get_or_init(Self::load).as_ref()
    }

    fn load() -> Option<LibvlcApi> {
        let path = libvlc_library_path();

        unsafe {
            let lib = match libloading::Library::new(&path) {
                Ok(lib) => lib,
                Err(e) => {
                    tracing::warn!("failed to load engine library {}: {}", path, e);
                    return None;
                }
            };

            let instance_new: NewFn = *lib.get(b"libvlc_new\0").ok()?;
            let instance_release: ReleaseFn = *lib.get(b"libvlc_release\0").ok()?;
            let set_user_agent: SetUserAgentFn = *lib.get(b"libvlc_set_user_agent\0").ok()?;
            let set_app_id: SetAppIdFn = *lib.get(b"libvlc_set_app_id\0").ok()?;
            let log_set: LogSetFn = *lib.get(b"libvlc_log_set\0").ok()?;
            let log_unset: LogUnsetFn = *lib.get(b"libvlc_log_unset\0").ok()?;
            let get_version: GetStringFn = *lib.get(b"libvlc_get_version\0").ok()?;
            let get_compiler: GetStringFn = *lib.get(b"libvlc_get_compiler\0").ok()?;
            let get_changeset: GetStringFn = *lib.get(b"libvlc_get_changeset\0").ok()?;
            let clock: ClockFn = *lib.get(b"libvlc_clock\0").ok()?;
            let errmsg: ErrmsgFn = *lib.get(b"libvlc_errmsg\0").ok()?;
            let free: FreeFn = *lib.get(b"libvlc_free\0").ok()?;
            let audio_filter_list_get: FilterListGetFn =
                *lib.get(b"libvlc_audio_filter_list_get\0").ok()?;
            let video_filter_list_get: FilterListGetFn =
                *lib.get(b"libvlc_video_filter_list_get\0").ok()?;
            let module_list_release: ModuleListReleaseFn =
                *lib.get(b"libvlc_module_description_list_release\0").ok()?;

            let media_new_location: MediaNewLocationFn =
                *lib.get(b"libvlc_media_new_location\0").ok()?;
            let media_release: MediaReleaseFn = *lib.get(b"libvlc_media_release\0").ok()?;
            let media_get_mrl: MediaGetMrlFn = *lib.get(b"libvlc_media_get_mrl\0").ok()?;
            let media_get_state: MediaGetStateFn = *lib.get(b"libvlc_media_get_state\0").ok()?;
            let media_get_duration: MediaGetDurationFn =
                *lib.get(b"libvlc_media_get_duration\0").ok()?;
            let media_get_type: MediaGetTypeFn = *lib.get(b"libvlc_media_get_type\0").ok()?;
            let media_event_manager: MediaEventManagerFn =
                *lib.get(b"libvlc_media_event_manager\0").ok()?;

            let player_new: PlayerNewFn = *lib.get(b"libvlc_media_player_new\0").ok()?;
            let player_new_from_media: PlayerNewFromMediaFn =
                *lib.get(b"libvlc_media_player_new_from_media\0").ok()?;
            let player_release: PlayerReleaseFn =
                *lib.get(b"libvlc_media_player_release\0").ok()?;
            let player_is_playing: PlayerIsPlayingFn =
                *lib.get(b"libvlc_media_player_is_playing\0").ok()?;
            let player_play: PlayerPlayFn = *lib.get(b"libvlc_media_player_play\0").ok()?;
            let player_pause: PlayerVoidFn = *lib.get(b"libvlc_media_player_pause\0").ok()?;
            let player_stop: PlayerVoidFn = *lib.get(b"libvlc_media_player_stop\0").ok()?;
            let video_set_callbacks: VideoSetCallbacksFn =
                *lib.get(b"libvlc_video_set_callbacks\0").ok()?;
            let video_set_format: VideoSetFormatFn =
                *lib.get(b"libvlc_video_set_format\0").ok()?;

            tracing::info!("engine library loaded from {}", path);

            Some(LibvlcApi {
                _lib: lib,
                instance_new,
                instance_release,
                set_user_agent,
                set_app_id,
                log_set,
                log_unset,
                get_version,
                get_compiler,
                get_changeset,
                clock,
                errmsg,
                free,
                audio_filter_list_get,
                video_filter_list_get,
                module_list_release,
                media_new_location,
                media_release,
                media_get_mrl,
                media_get_state,
                media_get_duration,
                media_get_type,
                media_event_manager,
                player_new,
                player_new_from_media,
                player_release,
                player_is_playing,
                player_play,
                player_pause,
                player_stop,
                video_set_callbacks,
                video_set_format,
            })
        }
    }

    /// Whether the engine library is present on this machine.
    pub fn available() -> bool {
        Self::get().is_some()
    }
}

// ============================================================================
// C String Helpers
// ============================================================================

/// Copy a nullable, native-owned C string. The pointer is not freed.
pub(crate) unsafe fn copy_cstr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// Copy a C string the engine allocated for us, then hand it back to the
/// engine's allocator.
pub(crate) unsafe fn copy_and_free(api: &LibvlcApi, ptr: *mut c_char) -> Option<String> {
    let copied = copy_cstr(ptr);
    if !ptr.is_null() {
        (api.free)(ptr as *mut c_void);
    }
    copied
}

// ============================================================================
// va_list Expansion
// ============================================================================

extern "C" {
    // On the ABIs this crate loads the engine on, a decayed `va_list` is
    // passed as a single pointer-sized argument.
    fn vsnprintf(buf: *mut c_char, size: libc::size_t, fmt: *const c_char, args: *mut c_void)
        -> c_int;
}

/// Expand a native printf-style message. The `va_list` may be consumed by
/// this call and must not be reused.
pub(crate) unsafe fn format_native_message(
    fmt: *const c_char,
    args: *mut c_void,
) -> Option<String> {
    if fmt.is_null() {
        return None;
    }
    let mut buf = [0u8; 1024];
    let written = vsnprintf(buf.as_mut_ptr() as *mut c_char, buf.len(), fmt, args);
    if written < 0 {
        return None;
    }
    let len = (written as usize).min(buf.len() - 1);
    Some(String::from_utf8_lossy(&buf[..len]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_path_nonempty() {
        assert!(!libvlc_library_path().is_empty());
    }

    #[test]
    fn test_copy_cstr_null() {
        unsafe {
            assert_eq!(copy_cstr(std::ptr::null()), None);
        }
    }

    #[test]
    fn test_copy_cstr_roundtrip() {
        let owned = std::ffi::CString::new("equalizer").unwrap();
        unsafe {
            assert_eq!(copy_cstr(owned.as_ptr()), Some("equalizer".to_string()));
        }
    }
}
