//! Media descriptor wrapper.

use std::ffi::CString;
use std::ptr;

use crate::events::EventManager;
use crate::ffi::{self, LibvlcApi, VlcMediaHandle};
use crate::instance::Instance;

/// A playable media: a resource location plus whatever metadata the engine
/// has discovered about it. Owns one native media handle.
pub struct Media {
    api: &'static LibvlcApi,
    handle: VlcMediaHandle,
}

// The engine serializes access to a media object internally; the caller is
// responsible for not racing wrapper methods on one handle.
unsafe impl Send for Media {}

impl Media {
    /// Create a media from a resource location, for instance a valid URL.
    ///
    /// Local files must use the `file://...` URI syntax. Returns `None` when
    /// the engine declines the location (construction-time absence, not an
    /// error).
    pub fn from_location(instance: &Instance, mrl: &str) -> Option<Media> {
        let api = LibvlcApi::get()?;
        let mrl = CString::new(mrl).ok()?;
        let handle = unsafe { (api.media_new_location)(instance.as_raw(), mrl.as_ptr()) };
        if handle.is_null() {
            tracing::debug!("engine declined media location");
            return None;
        }
        Some(Media { api, handle })
    }

    /// The media resource locator the engine stores for this media.
    pub fn mrl(&self) -> Option<String> {
        unsafe {
            let raw = (self.api.media_get_mrl)(self.handle);
            ffi::copy_and_free(self.api, raw)
        }
    }

    /// Current state of the media descriptor.
    pub fn state(&self) -> MediaState {
        MediaState::from_raw(unsafe { (self.api.media_get_state)(self.handle) })
    }

    /// Duration in milliseconds, or a negative value while unknown.
    pub fn duration_ms(&self) -> i64 {
        unsafe { (self.api.media_get_duration)(self.handle) }
    }

    /// The media type the engine inferred from the location.
    pub fn media_type(&self) -> MediaType {
        MediaType::from_raw(unsafe { (self.api.media_get_type)(self.handle) })
    }

    /// Event manager of this media. The native call does not add a
    /// reference, so the manager borrows `self`.
    pub fn event_manager(&self) -> EventManager<'_> {
        EventManager::from_raw(unsafe { (self.api.media_event_manager)(self.handle) })
    }

    pub(crate) fn as_raw(&self) -> VlcMediaHandle {
        self.handle
    }
}

impl Drop for Media {
    fn drop(&mut self) {
        if self.handle.is_null() {
            return;
        }
        unsafe { (self.api.media_release)(self.handle) };
        self.handle = ptr::null_mut();
    }
}

// ============================================================================
// Media Enums
// ============================================================================

/// Media descriptor states, matching the engine's `libvlc_state_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaState {
    NothingSpecial,
    Opening,
    Buffering,
    Playing,
    Paused,
    Stopped,
    Ended,
    Error,
    /// A state value this binding does not know (newer engine).
    Unknown,
}

impl MediaState {
    pub fn from_raw(raw: i32) -> MediaState {
        match raw {
            0 => MediaState::NothingSpecial,
            1 => MediaState::Opening,
            2 => MediaState::Buffering,
            3 => MediaState::Playing,
            4 => MediaState::Paused,
            5 => MediaState::Stopped,
            6 => MediaState::Ended,
            7 => MediaState::Error,
            _ => MediaState::Unknown,
        }
    }
}

/// Media types, matching `libvlc_media_type_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Unknown,
    File,
    Directory,
    Disc,
    Stream,
    Playlist,
}

impl MediaType {
    pub fn from_raw(raw: u32) -> MediaType {
        match raw {
            1 => MediaType::File,
            2 => MediaType::Directory,
            3 => MediaType::Disc,
            4 => MediaType::Stream,
            5 => MediaType::Playlist,
            _ => MediaType::Unknown,
        }
    }
}

/// Metadata keys, matching `libvlc_meta_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Meta {
    Title = 0,
    Artist,
    Genre,
    Copyright,
    Album,
    TrackNumber,
    Description,
    Rating,
    Date,
    Setting,
    Url,
    Language,
    NowPlaying,
    Publisher,
    EncodedBy,
    ArtworkUrl,
    TrackId,
    TrackTotal,
    Director,
    Season,
    Episode,
    ShowName,
    Actors,
    AlbumArtist,
    DiscNumber,
    DiscTotal,
}

/// Track kinds, matching `libvlc_track_type_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Unknown,
    Audio,
    Video,
    Text,
}

impl TrackKind {
    pub fn from_raw(raw: i32) -> TrackKind {
        match raw {
            0 => TrackKind::Audio,
            1 => TrackKind::Video,
            2 => TrackKind::Text,
            _ => TrackKind::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_mapping() {
        assert_eq!(MediaState::from_raw(0), MediaState::NothingSpecial);
        assert_eq!(MediaState::from_raw(3), MediaState::Playing);
        assert_eq!(MediaState::from_raw(7), MediaState::Error);
        assert_eq!(MediaState::from_raw(42), MediaState::Unknown);
        assert_eq!(MediaState::from_raw(-1), MediaState::Unknown);
    }

    #[test]
    fn test_media_type_mapping() {
        assert_eq!(MediaType::from_raw(0), MediaType::Unknown);
        assert_eq!(MediaType::from_raw(1), MediaType::File);
        assert_eq!(MediaType::from_raw(5), MediaType::Playlist);
        assert_eq!(MediaType::from_raw(99), MediaType::Unknown);
    }

    #[test]
    fn test_meta_discriminants() {
        assert_eq!(Meta::Title as i32, 0);
        assert_eq!(Meta::Url as i32, 10);
        assert_eq!(Meta::DiscTotal as i32, 25);
    }

    #[test]
    fn test_track_kind_mapping() {
        assert_eq!(TrackKind::from_raw(-1), TrackKind::Unknown);
        assert_eq!(TrackKind::from_raw(0), TrackKind::Audio);
        assert_eq!(TrackKind::from_raw(2), TrackKind::Text);
    }
}
