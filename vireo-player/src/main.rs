//! # vireo player
//!
//! Minimal windowed playback demo: the engine decodes into a shared RGBA
//! buffer through the raw lock/unlock/display callbacks, and the egui side
//! uploads that buffer as a texture whenever a frame lands.
//!
//! The lock hook acquires the buffer mutex and the unlock hook releases it,
//! so the engine's decode thread and the UI thread never touch the pixels
//! at the same time.
//!
//! ## Usage
//! ```bash
//! vireo-player file:///path/to/movie.mkv
//! vireo-player movie.mkv
//! ```

use std::ffi::c_void;
use std::mem;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use parking_lot::Mutex;
use vireo_core::{Chroma, Instance, LogLevel, Media, MediaPlayer, VideoCallbacks};

const FRAME_WIDTH: u32 = 320;
const FRAME_HEIGHT: u32 = 240;
const FRAME_PITCH: u32 = FRAME_WIDTH * 4;

// ============================================================================
// Shared Video State (between engine decode thread and UI)
// ============================================================================

struct VideoShared {
    pixels: Mutex<Vec<u8>>,
    frame_ready: AtomicBool,
    repaint: Mutex<Option<egui::Context>>,
}

impl VideoShared {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            pixels: Mutex::new(vec![0; (FRAME_PITCH * FRAME_HEIGHT) as usize]),
            frame_ready: AtomicBool::new(false),
            repaint: Mutex::new(None),
        })
    }
}

// ============================================================================
// Video Output Hooks (run on the engine's decode thread)
// ============================================================================

// The engine prepares to decode a frame: hand it the pixel buffer and keep
// the mutex held until the matching unlock.
fn video_lock(opaque: *mut c_void, planes: *mut *mut c_void) -> *mut c_void {
    let shared = unsafe { &*(opaque as *const VideoShared) };
    let mut pixels = shared.pixels.lock();
    unsafe { *planes = pixels.as_mut_ptr() as *mut c_void };
    mem::forget(pixels);
    ptr::null_mut() // Picture identifier, not needed here.
}

// The frame is decoded: release the mutex taken in the lock hook.
fn video_unlock(opaque: *mut c_void, _picture: *mut c_void, _planes: *const *mut c_void) {
    let shared = unsafe { &*(opaque as *const VideoShared) };
    unsafe { shared.pixels.force_unlock() };
}

// The frame should be shown: flag it and wake the UI thread.
fn video_display(opaque: *mut c_void, _picture: *mut c_void) {
    let shared = unsafe { &*(opaque as *const VideoShared) };
    shared.frame_ready.store(true, Ordering::Release);
    if let Some(ctx) = shared.repaint.lock().as_ref() {
        ctx.request_repaint();
    }
}

// ============================================================================
// App
// ============================================================================

struct PlayerApp {
    // Field order is drop order: the player must go first so no trampoline
    // can fire while the shared video state is torn down.
    player: MediaPlayer,
    media: Media,
    _instance: Instance,
    video: Arc<VideoShared>,
    texture: Option<TextureHandle>,
    location: String,
}

impl PlayerApp {
    fn new(cc: &eframe::CreationContext<'_>, location: &str) -> Result<Self> {
        let video = VideoShared::new();
        *video.repaint.lock() = Some(cc.egui_ctx.clone());

        let instance =
            Instance::new(&["--no-xlib"]).context("engine declined instance construction")?;
        instance.set_user_agent("vireo player", "vireo/0.2");
        instance.enable_logging(LogLevel::Warning);

        let mrl = to_mrl(location);
        let media = Media::from_location(&instance, &mrl)
            .with_context(|| format!("engine declined media location {mrl}"))?;
        let mut player =
            MediaPlayer::from_media(&media).context("engine declined media player construction")?;

        // The hooks hold a pointer into the Arc'd shared state, which this
        // app keeps alive strictly longer than the player.
        unsafe {
            player.set_video_callbacks(VideoCallbacks {
                opaque: Arc::as_ptr(&video) as *mut c_void,
                lock: Some(video_lock),
                unlock: Some(video_unlock),
                display: Some(video_display),
            });
        }
        player.set_format(Chroma::RGBA, FRAME_WIDTH, FRAME_HEIGHT, FRAME_PITCH);
        player.play().context("playback failed to start")?;

        Ok(Self {
            player,
            media,
            _instance: instance,
            video,
            texture: None,
            location: location.to_string(),
        })
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.video.frame_ready.swap(false, Ordering::Acquire) {
            let pixels = self.video.pixels.lock();
            let image = ColorImage::from_rgba_unmultiplied(
                [FRAME_WIDTH as usize, FRAME_HEIGHT as usize],
                &pixels,
            );
            drop(pixels);
            self.texture = Some(ctx.load_texture("video-frame", image, TextureOptions::LINEAR));
        }

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Play").clicked() {
                    if let Err(e) = self.player.play() {
                        tracing::error!("play failed: {e}");
                    }
                }
                if ui.button("Pause").clicked() {
                    self.player.pause();
                }
                if ui.button("Stop").clicked() {
                    self.player.stop();
                }
                ui.separator();
                ui.label(format!(
                    "{} | {:?}{}",
                    self.location,
                    self.media.state(),
                    if self.player.is_playing() { " | playing" } else { "" },
                ));
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match &self.texture {
            Some(texture) => {
                let available = ui.available_size();
                let scale = (available.x / FRAME_WIDTH as f32)
                    .min(available.y / FRAME_HEIGHT as f32)
                    .max(1.0);
                ui.centered_and_justified(|ui| {
                    ui.image((
                        texture.id(),
                        egui::vec2(FRAME_WIDTH as f32 * scale, FRAME_HEIGHT as f32 * scale),
                    ));
                });
            }
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label("waiting for the first frame...");
                });
            }
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.player.stop();
    }
}

// ============================================================================
// Entry
// ============================================================================

/// Turn a command-line location into a media resource locator. Anything that
/// already carries a scheme passes through; bare paths become `file://`
/// URIs, absolutized when the path exists.
fn to_mrl(location: &str) -> String {
    if location.contains("://") {
        return location.to_string();
    }
    let absolute = std::fs::canonicalize(location)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| location.to_string());
    format!("file://{absolute}")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("vireo=info,eframe=warn")
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(location) = args.get(1).cloned() else {
        eprintln!("usage: vireo-player <location>");
        eprintln!("  e.g. vireo-player file:///home/me/movie.mkv");
        std::process::exit(2);
    };

    tracing::info!("vireo player v{}", env!("CARGO_PKG_VERSION"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("vireo player")
            .with_inner_size([640.0, 480.0])
            .with_min_inner_size([320.0, 280.0]),
        ..Default::default()
    };

    eframe::run_native(
        "vireo player",
        options,
        Box::new(move |cc| {
            PlayerApp::new(cc, &location)
                .map(|app| Box::new(app) as Box<dyn eframe::App>)
                .map_err(|e| e.into())
        }),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mrl_passthrough_for_schemes() {
        assert_eq!(to_mrl("http://example.org/a.mkv"), "http://example.org/a.mkv");
        assert_eq!(to_mrl("rtsp://cam/stream"), "rtsp://cam/stream");
        assert_eq!(to_mrl("file:///tmp/a.mkv"), "file:///tmp/a.mkv");
    }

    #[test]
    fn test_mrl_prefixes_bare_paths() {
        // Nonexistent path: no canonicalization, just the file scheme.
        assert_eq!(to_mrl("missing.mkv"), "file://missing.mkv");
    }

    #[test]
    fn test_pitch_covers_rgba_rows() {
        assert_eq!(FRAME_PITCH, FRAME_WIDTH * 4);
    }
}
