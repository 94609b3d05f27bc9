//! # vireo core
//!
//! Safe Rust layer over the libvlc media engine.
//!
//! The engine library is loaded at runtime (no compile-time link), every
//! consumed entry point is resolved once into a process-wide function table,
//! and each native object (instance, media, media player) is owned by exactly
//! one wrapper that releases it on drop. Raw video output is bridged through
//! fixed-signature trampolines that carry the caller's context across the C
//! boundary in a heap-pinned record.

// ============================================================================
// Native surface
// ============================================================================
pub mod ffi;

// ============================================================================
// Error signaling
// ============================================================================
pub mod error;

// ============================================================================
// Wrapper objects
// ============================================================================
pub mod instance;
pub mod media;
pub mod player;

// ============================================================================
// Events / enumeration
// ============================================================================
pub mod events;
pub mod modules;

pub use error::VlcError;
pub use events::{Event, EventKind, EventManager};
pub use instance::{set_plugin_search_path, Instance, LogLevel};
pub use media::{Media, MediaState, MediaType, Meta, TrackKind};
pub use modules::ModuleDescription;
pub use player::{Chroma, DisplayHook, LockHook, MediaPlayer, UnlockHook, VideoCallbacks};

// ============================================================================
// Version
// ============================================================================
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
