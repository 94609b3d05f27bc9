//! Media player wrapper and the raw video callback bridge.
//!
//! The engine renders decoded frames into caller memory through a triple of
//! C callbacks (lock / unlock / display) that share one opaque context
//! word. The bridge packages the caller's context pointer and function
//! slots into a heap-pinned record; the record's address - not the caller's
//! context - is what crosses the C boundary, and fixed-signature trampolines
//! recover it on every invocation. The record stays alive, at a stable
//! address, from registration until the callbacks are replaced, cleared, or
//! the player is dropped.

use std::ffi::{c_char, c_void};
use std::fmt;
use std::mem;
use std::ptr;

use crate::error::{self, VlcError};
use crate::ffi::{
    LibvlcApi, VideoDisplayCb, VideoLockCb, VideoUnlockCb, VlcPlayerHandle,
};
use crate::instance::Instance;
use crate::media::Media;

// ============================================================================
// Callback Record
// ============================================================================

/// Lock slot: fill the plane array, return a picture identifier the engine
/// round-trips to the unlock and display slots.
pub type LockHook = fn(opaque: *mut c_void, planes: *mut *mut c_void) -> *mut c_void;

/// Unlock slot: the frame is decoded; `picture` is whatever the lock slot
/// returned, verbatim.
pub type UnlockHook = fn(opaque: *mut c_void, picture: *mut c_void, planes: *const *mut c_void);

/// Display slot: the frame should be shown; `picture` is whatever the lock
/// slot returned, verbatim.
pub type DisplayHook = fn(opaque: *mut c_void, picture: *mut c_void);

/// Caller-supplied video output hooks plus the context word delivered to
/// every populated slot.
///
/// The slots run on whatever thread the engine decodes on; anything the
/// context points at that is also touched from other threads needs its own
/// mutual exclusion (lock in the lock slot, unlock in the unlock slot).
pub struct VideoCallbacks {
    pub opaque: *mut c_void,
    pub lock: Option<LockHook>,
    pub unlock: Option<UnlockHook>,
    pub display: Option<DisplayHook>,
}

/// Trampolines the native side should see: populated slots get the fixed
/// trampoline, empty slots get a null function pointer so the engine never
/// dispatches through them.
fn native_slots(
    callbacks: &VideoCallbacks,
) -> (
    Option<VideoLockCb>,
    Option<VideoUnlockCb>,
    Option<VideoDisplayCb>,
) {
    (
        callbacks.lock.map(|_| lock_trampoline as VideoLockCb),
        callbacks.unlock.map(|_| unlock_trampoline as VideoUnlockCb),
        callbacks.display.map(|_| display_trampoline as VideoDisplayCb),
    )
}

/// Free a registered callback record. Idempotent: a second call on the same
/// slot is a no-op.
fn free_record(slot: &mut *mut VideoCallbacks) {
    if slot.is_null() {
        return;
    }
    unsafe { drop(Box::from_raw(*slot)) };
    *slot = ptr::null_mut();
}

// ============================================================================
// Trampolines
// ============================================================================

unsafe extern "C" fn lock_trampoline(opaque: *mut c_void, planes: *mut *mut c_void) -> *mut c_void {
    if opaque.is_null() {
        tracing::error!("video lock trampoline: null record");
        return ptr::null_mut();
    }
    let record = &*(opaque as *const VideoCallbacks);
    match record.lock {
        Some(hook) => hook(record.opaque, planes),
        None => ptr::null_mut(),
    }
}

unsafe extern "C" fn unlock_trampoline(
    opaque: *mut c_void,
    picture: *mut c_void,
    planes: *const *mut c_void,
) {
    if opaque.is_null() {
        tracing::error!("video unlock trampoline: null record");
        return;
    }
    let record = &*(opaque as *const VideoCallbacks);
    if let Some(hook) = record.unlock {
        hook(record.opaque, picture, planes);
    }
}

unsafe extern "C" fn display_trampoline(opaque: *mut c_void, picture: *mut c_void) {
    if opaque.is_null() {
        tracing::error!("video display trampoline: null record");
        return;
    }
    let record = &*(opaque as *const VideoCallbacks);
    if let Some(hook) = record.display {
        hook(record.opaque, picture);
    }
}

// ============================================================================
// Chroma
// ============================================================================

/// Four-character code identifying the raw pixel layout the engine should
/// decode into, e.g. `RV32` or `YUYV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chroma {
    code: [u8; 4],
}

impl Chroma {
    /// 32-bit BGRX.
    pub const RV32: Chroma = Chroma { code: *b"RV32" };
    /// 16-bit RGB 5-6-5.
    pub const RV16: Chroma = Chroma { code: *b"RV16" };
    /// 32-bit RGBA.
    pub const RGBA: Chroma = Chroma { code: *b"RGBA" };
    /// Planar 4:2:0 YUV.
    pub const I420: Chroma = Chroma { code: *b"I420" };

    /// Validate a four-character code: exactly four printable ASCII bytes.
    pub fn new(code: &str) -> Option<Chroma> {
        let bytes = code.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(|b| b.is_ascii_graphic()) {
            return None;
        }
        let mut out = [0u8; 4];
        out.copy_from_slice(bytes);
        Some(Chroma { code: out })
    }

    fn as_c_bytes(&self) -> [u8; 5] {
        [self.code[0], self.code[1], self.code[2], self.code[3], 0]
    }
}

impl fmt::Display for Chroma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Validated ASCII at construction.
        f.write_str(std::str::from_utf8(&self.code).unwrap_or("????"))
    }
}

// ============================================================================
// Media Player
// ============================================================================

/// A media player: plays one media, optionally into caller-owned pixel
/// buffers. Owns one native player handle plus at most one registered
/// callback record.
pub struct MediaPlayer {
    api: &'static LibvlcApi,
    handle: VlcPlayerHandle,
    hooks: *mut VideoCallbacks,
}

// The callback record is owned exclusively through `hooks`; handle access
// follows the engine's documented thread-safety contract.
unsafe impl Send for MediaPlayer {}

impl MediaPlayer {
    /// Create an empty media player on an engine instance.
    pub fn new(instance: &Instance) -> Option<MediaPlayer> {
        let api = LibvlcApi::get()?;
        let handle = unsafe { (api.player_new)(instance.as_raw()) };
        if handle.is_null() {
            return None;
        }
        Some(MediaPlayer {
            api,
            handle,
            hooks: ptr::null_mut(),
        })
    }

    /// Create a media player for a media. The media can be dropped
    /// afterwards; the engine keeps its own reference.
    pub fn from_media(media: &Media) -> Option<MediaPlayer> {
        let api = LibvlcApi::get()?;
        let handle = unsafe { (api.player_new_from_media)(media.as_raw()) };
        if handle.is_null() {
            return None;
        }
        Some(MediaPlayer {
            api,
            handle,
            hooks: ptr::null_mut(),
        })
    }

    /// Whether the player is currently playing.
    pub fn is_playing(&self) -> bool {
        unsafe { (self.api.player_is_playing)(self.handle) == 1 }
    }

    /// Start playback.
    pub fn play(&self) -> Result<(), VlcError> {
        let code = unsafe { (self.api.player_play)(self.handle) };
        error::check(self.api, code).map(|_| ())
    }

    /// Toggle pause. No effect without media.
    pub fn pause(&self) {
        unsafe { (self.api.player_pause)(self.handle) };
    }

    /// Stop playback. Direct blocking native call; no effect without media.
    pub fn stop(&self) {
        unsafe { (self.api.player_stop)(self.handle) };
    }

    /// Register video output hooks. Empty slots are registered as null
    /// function pointers natively and are never invoked. A previously
    /// registered record is freed only after the new registration call has
    /// returned.
    ///
    /// # Safety
    ///
    /// `callbacks.opaque` must stay valid for every populated slot until
    /// the callbacks are replaced, cleared, or the player is dropped. The
    /// slots run on the engine's decode thread.
    pub unsafe fn set_video_callbacks(&mut self, callbacks: VideoCallbacks) {
        let (lock, unlock, display) = native_slots(&callbacks);
        let record = Box::into_raw(Box::new(callbacks));
        (self.api.video_set_callbacks)(self.handle, lock, unlock, display, record as *mut c_void);
        let mut previous = mem::replace(&mut self.hooks, record);
        free_record(&mut previous);
    }

    /// Unregister the video output hooks and free the callback record.
    pub fn clear_video_callbacks(&mut self) {
        unsafe {
            (self.api.video_set_callbacks)(self.handle, None, None, None, ptr::null_mut());
        }
        free_record(&mut self.hooks);
    }

    /// Set the decoded pixel layout and dimensions. Only meaningful in
    /// combination with [`MediaPlayer::set_video_callbacks`]; all planes
    /// share one pitch (in bytes).
    pub fn set_format(&self, chroma: Chroma, width: u32, height: u32, pitch: u32) {
        let code = chroma.as_c_bytes();
        unsafe {
            (self.api.video_set_format)(
                self.handle,
                code.as_ptr() as *const c_char,
                width,
                height,
                pitch,
            );
        }
    }
}

impl Drop for MediaPlayer {
    fn drop(&mut self) {
        // Release the native player first so no trampoline can fire, then
        // free the record it pointed at.
        if !self.handle.is_null() {
            unsafe { (self.api.player_release)(self.handle) };
            self.handle = ptr::null_mut();
        }
        free_record(&mut self.hooks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// What the hooks observed, reachable through the context pointer.
    #[derive(Default)]
    struct Recorder {
        lock_opaque: usize,
        unlock_opaque: usize,
        display_opaque: usize,
        unlock_picture: usize,
        display_picture: usize,
    }

    const PICTURE_ID: usize = 0x51C0;

    fn probe_lock(opaque: *mut c_void, planes: *mut *mut c_void) -> *mut c_void {
        let recorder = unsafe { &mut *(opaque as *mut Recorder) };
        recorder.lock_opaque = opaque as usize;
        unsafe { *planes = ptr::null_mut() };
        PICTURE_ID as *mut c_void
    }

    fn probe_unlock(opaque: *mut c_void, picture: *mut c_void, _planes: *const *mut c_void) {
        let recorder = unsafe { &mut *(opaque as *mut Recorder) };
        recorder.unlock_opaque = opaque as usize;
        recorder.unlock_picture = picture as usize;
    }

    fn probe_display(opaque: *mut c_void, picture: *mut c_void) {
        let recorder = unsafe { &mut *(opaque as *mut Recorder) };
        recorder.display_opaque = opaque as usize;
        recorder.display_picture = picture as usize;
    }

    #[test]
    fn test_trampolines_deliver_one_context_and_roundtrip_picture() {
        let mut recorder = Recorder::default();
        let record = VideoCallbacks {
            opaque: &mut recorder as *mut Recorder as *mut c_void,
            lock: Some(probe_lock),
            unlock: Some(probe_unlock),
            display: Some(probe_display),
        };
        let record_ptr = &record as *const VideoCallbacks as *mut c_void;
        let mut planes: [*mut c_void; 1] = [ptr::null_mut()];

        // Native invocation order for one frame.
        let picture = unsafe { lock_trampoline(record_ptr, planes.as_mut_ptr()) };
        unsafe { display_trampoline(record_ptr, picture) };
        unsafe { unlock_trampoline(record_ptr, picture, planes.as_ptr()) };

        let expected = &mut recorder as *mut Recorder as usize;
        assert_eq!(recorder.lock_opaque, expected);
        assert_eq!(recorder.display_opaque, expected);
        assert_eq!(recorder.unlock_opaque, expected);

        // The lock slot's identifier reaches the other slots verbatim.
        assert_eq!(picture as usize, PICTURE_ID);
        assert_eq!(recorder.display_picture, PICTURE_ID);
        assert_eq!(recorder.unlock_picture, PICTURE_ID);
    }

    #[test]
    fn test_empty_slots_register_null_natively() {
        let record = VideoCallbacks {
            opaque: ptr::null_mut(),
            lock: Some(probe_lock),
            unlock: None,
            display: None,
        };
        let (lock, unlock, display) = native_slots(&record);
        assert!(lock.is_some());
        assert!(unlock.is_none());
        assert!(display.is_none());

        let none = VideoCallbacks {
            opaque: ptr::null_mut(),
            lock: None,
            unlock: None,
            display: None,
        };
        let (lock, unlock, display) = native_slots(&none);
        assert!(lock.is_none() && unlock.is_none() && display.is_none());
    }

    #[test]
    fn test_lock_trampoline_without_hook_yields_null_picture() {
        let record = VideoCallbacks {
            opaque: ptr::null_mut(),
            lock: None,
            unlock: None,
            display: None,
        };
        let record_ptr = &record as *const VideoCallbacks as *mut c_void;
        let mut planes: [*mut c_void; 1] = [ptr::null_mut()];
        let picture = unsafe { lock_trampoline(record_ptr, planes.as_mut_ptr()) };
        assert!(picture.is_null());
    }

    #[test]
    fn test_record_free_is_idempotent() {
        let mut slot = Box::into_raw(Box::new(VideoCallbacks {
            opaque: ptr::null_mut(),
            lock: None,
            unlock: None,
            display: None,
        }));
        free_record(&mut slot);
        assert!(slot.is_null());
        // Second disposal attempt must not double-free.
        free_record(&mut slot);
        assert!(slot.is_null());
    }

    #[test]
    fn test_chroma_validation() {
        assert_eq!(Chroma::new("RV32"), Some(Chroma::RV32));
        assert_eq!(Chroma::new("I420"), Some(Chroma::I420));
        assert_eq!(Chroma::new("RV3"), None);
        assert_eq!(Chroma::new("RV320"), None);
        assert_eq!(Chroma::new("RV\u{7f}2"), None);
        assert_eq!(Chroma::RGBA.to_string(), "RGBA");
    }

    #[test]
    fn test_chroma_c_bytes_nul_terminated() {
        let bytes = Chroma::RV16.as_c_bytes();
        assert_eq!(&bytes[..4], b"RV16");
        assert_eq!(bytes[4], 0);
    }
}
