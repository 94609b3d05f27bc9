//! Engine events.
//!
//! Only the passive surface is exposed: the event-manager handle owned by a
//! media object, the native event-type namespace, and a value snapshot of an
//! event header. Callback attachment stays inside the engine.

use std::ffi::c_void;
use std::marker::PhantomData;

use crate::ffi::{RawEvent, VlcEventManagerHandle};

// ============================================================================
// Event Kinds
// ============================================================================

/// Native event types, grouped by emitting object. Discriminants match the
/// engine's `libvlc_event_e` namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum EventKind {
    MediaMetaChanged = 0,
    MediaSubItemAdded,
    MediaDurationChanged,
    MediaParsedChanged,
    MediaFreed,
    MediaStateChanged,
    MediaSubItemTreeAdded,

    MediaPlayerMediaChanged = 0x100,
    MediaPlayerNothingSpecial,
    MediaPlayerOpening,
    MediaPlayerBuffering,
    MediaPlayerPlaying,
    MediaPlayerPaused,
    MediaPlayerStopped,
    MediaPlayerForward,
    MediaPlayerBackward,
    MediaPlayerEndReached,
    MediaPlayerEncounteredError,
    MediaPlayerTimeChanged,
    MediaPlayerPositionChanged,
    MediaPlayerSeekableChanged,
    MediaPlayerPausableChanged,
    MediaPlayerTitleChanged,
    MediaPlayerSnapshotTaken,
    MediaPlayerLengthChanged,
    MediaPlayerVout,
    MediaPlayerScrambledChanged,
    MediaPlayerEsAdded,
    MediaPlayerEsDeleted,
    MediaPlayerEsSelected,
    MediaPlayerCorked,
    MediaPlayerUncorked,
    MediaPlayerMuted,
    MediaPlayerUnmuted,
    MediaPlayerAudioVolume,
    MediaPlayerAudioDevice,
    MediaPlayerChapterChanged,

    MediaListItemAdded = 0x200,
    MediaListWillAddItem,
    MediaListItemDeleted,
    MediaListWillDeleteItem,
    MediaListEndReached,

    MediaListViewItemAdded = 0x300,
    MediaListViewWillAddItem,
    MediaListViewItemDeleted,
    MediaListViewWillDeleteItem,

    MediaListPlayerPlayed = 0x400,
    MediaListPlayerNextItemSet,
    MediaListPlayerStopped,

    MediaDiscovererStarted = 0x500,
    MediaDiscovererEnded,
    RendererDiscovererItemAdded,
    RendererDiscovererItemDeleted,

    VlmMediaAdded = 0x600,
    VlmMediaRemoved,
    VlmMediaChanged,
    VlmMediaInstanceStarted,
    VlmMediaInstanceStopped,
    VlmMediaInstanceStatusInit,
    VlmMediaInstanceStatusOpening,
    VlmMediaInstanceStatusPlaying,
    VlmMediaInstanceStatusPause,
    VlmMediaInstanceStatusEnd,
    VlmMediaInstanceStatusError,
}

impl EventKind {
    /// Map a raw native event type. Unknown values (from a newer engine)
    /// map to `None` rather than panicking.
    pub fn from_raw(raw: i32) -> Option<EventKind> {
        use EventKind::*;
        Some(match raw {
            0 => MediaMetaChanged,
            1 => MediaSubItemAdded,
            2 => MediaDurationChanged,
            3 => MediaParsedChanged,
            4 => MediaFreed,
            5 => MediaStateChanged,
            6 => MediaSubItemTreeAdded,

            0x100 => MediaPlayerMediaChanged,
            0x101 => MediaPlayerNothingSpecial,
            0x102 => MediaPlayerOpening,
            0x103 => MediaPlayerBuffering,
            0x104 => MediaPlayerPlaying,
            0x105 => MediaPlayerPaused,
            0x106 => MediaPlayerStopped,
            0x107 => MediaPlayerForward,
            0x108 => MediaPlayerBackward,
            0x109 => MediaPlayerEndReached,
            0x10A => MediaPlayerEncounteredError,
            0x10B => MediaPlayerTimeChanged,
            0x10C => MediaPlayerPositionChanged,
            0x10D => MediaPlayerSeekableChanged,
            0x10E => MediaPlayerPausableChanged,
            0x10F => MediaPlayerTitleChanged,
            0x110 => MediaPlayerSnapshotTaken,
            0x111 => MediaPlayerLengthChanged,
            0x112 => MediaPlayerVout,
            0x113 => MediaPlayerScrambledChanged,
            0x114 => MediaPlayerEsAdded,
            0x115 => MediaPlayerEsDeleted,
            0x116 => MediaPlayerEsSelected,
            0x117 => MediaPlayerCorked,
            0x118 => MediaPlayerUncorked,
            0x119 => MediaPlayerMuted,
            0x11A => MediaPlayerUnmuted,
            0x11B => MediaPlayerAudioVolume,
            0x11C => MediaPlayerAudioDevice,
            0x11D => MediaPlayerChapterChanged,

            0x200 => MediaListItemAdded,
            0x201 => MediaListWillAddItem,
            0x202 => MediaListItemDeleted,
            0x203 => MediaListWillDeleteItem,
            0x204 => MediaListEndReached,

            0x300 => MediaListViewItemAdded,
            0x301 => MediaListViewWillAddItem,
            0x302 => MediaListViewItemDeleted,
            0x303 => MediaListViewWillDeleteItem,

            0x400 => MediaListPlayerPlayed,
            0x401 => MediaListPlayerNextItemSet,
            0x402 => MediaListPlayerStopped,

            0x500 => MediaDiscovererStarted,
            0x501 => MediaDiscovererEnded,
            0x502 => RendererDiscovererItemAdded,
            0x503 => RendererDiscovererItemDeleted,

            0x600 => VlmMediaAdded,
            0x601 => VlmMediaRemoved,
            0x602 => VlmMediaChanged,
            0x603 => VlmMediaInstanceStarted,
            0x604 => VlmMediaInstanceStopped,
            0x605 => VlmMediaInstanceStatusInit,
            0x606 => VlmMediaInstanceStatusOpening,
            0x607 => VlmMediaInstanceStatusPlaying,
            0x608 => VlmMediaInstanceStatusPause,
            0x609 => VlmMediaInstanceStatusEnd,
            0x60A => VlmMediaInstanceStatusError,

            _ => return None,
        })
    }
}

// ============================================================================
// Event Snapshot
// ============================================================================

/// Value snapshot of a native event header.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    /// Decoded event kind, `None` for types this binding does not know.
    pub kind: Option<EventKind>,
    /// The raw native type, verbatim.
    pub raw_type: i32,
    /// The native object that emitted the event.
    pub object: *mut c_void,
}

impl Event {
    /// Snapshot a native event header, for callers driving the raw event
    /// surface themselves.
    pub fn from_raw(raw: &RawEvent) -> Event {
        Event {
            kind: EventKind::from_raw(raw.kind),
            raw_type: raw.kind,
            object: raw.p_obj,
        }
    }
}

// ============================================================================
// Event Manager
// ============================================================================

/// Event manager belonging to a media object.
///
/// Non-owning: the native call that produces this handle does not add a
/// reference, so the wrapper borrows the owning media object instead of
/// releasing anything itself.
pub struct EventManager<'a> {
    handle: VlcEventManagerHandle,
    _owner: PhantomData<&'a ()>,
}

impl EventManager<'_> {
    pub(crate) fn from_raw(handle: VlcEventManagerHandle) -> Self {
        Self {
            handle,
            _owner: PhantomData,
        }
    }

    /// The underlying native handle.
    pub fn as_raw(&self) -> VlcEventManagerHandle {
        self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_group_boundaries() {
        assert_eq!(EventKind::from_raw(0), Some(EventKind::MediaMetaChanged));
        assert_eq!(EventKind::from_raw(6), Some(EventKind::MediaSubItemTreeAdded));
        assert_eq!(
            EventKind::from_raw(0x100),
            Some(EventKind::MediaPlayerMediaChanged)
        );
        assert_eq!(
            EventKind::from_raw(0x11D),
            Some(EventKind::MediaPlayerChapterChanged)
        );
        assert_eq!(
            EventKind::from_raw(0x600),
            Some(EventKind::VlmMediaAdded)
        );
        assert_eq!(
            EventKind::from_raw(0x60A),
            Some(EventKind::VlmMediaInstanceStatusError)
        );
    }

    #[test]
    fn test_discriminants_match_raw_values() {
        assert_eq!(EventKind::MediaPlayerEndReached as i32, 0x109);
        assert_eq!(EventKind::MediaListEndReached as i32, 0x204);
        assert_eq!(EventKind::MediaListPlayerStopped as i32, 0x402);
    }

    #[test]
    fn test_unknown_raw_maps_to_none() {
        assert_eq!(EventKind::from_raw(7), None);
        assert_eq!(EventKind::from_raw(0x11E), None);
        assert_eq!(EventKind::from_raw(-1), None);
        assert_eq!(EventKind::from_raw(0x700), None);
    }

    #[test]
    fn test_event_snapshot_keeps_raw_type() {
        let raw = RawEvent {
            kind: 0x109,
            p_obj: ptr::null_mut(),
        };
        let event = Event::from_raw(&raw);
        assert_eq!(event.kind, Some(EventKind::MediaPlayerEndReached));
        assert_eq!(event.raw_type, 0x109);

        let unknown = RawEvent {
            kind: 0x7FF,
            p_obj: ptr::null_mut(),
        };
        let event = Event::from_raw(&unknown);
        assert_eq!(event.kind, None);
        assert_eq!(event.raw_type, 0x7FF);
    }
}
