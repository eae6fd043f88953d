//! # Native Player Usage Example
//!
//! Drives a `NativePlayer` against a simulated video element: attach, seek
//! before the element is ready, load, receive media info and a few
//! statistics snapshots, then tear everything down.
//!
//! Run with: `cargo run --example playback_demo --package core-playback`

use bridge_traits::{
    BridgeError, ElementCallback, ElementListenerId, LogLevel, MediaElement, MediaElementEvent,
    MediaElementKind, Preload, ReadyState, TimeRange, TimeRanges, VideoPlaybackQuality,
};
use core_playback::{MediaDataSource, NativePlayer, PlayerEvent, PlayerEventKind, Result};
use core_runtime::config::PlayerConfigOverrides;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Simulated Video Element
// ============================================================================

/// Shared with the task that finishes "loading" in the background.
struct SimulatedShared {
    ready_state: Mutex<ReadyState>,
    started: Mutex<Option<Instant>>,
    position: Mutex<f64>,
    listeners: Mutex<Vec<(MediaElementEvent, ElementListenerId, ElementCallback)>>,
}

impl SimulatedShared {
    fn fire(&self, event: MediaElementEvent) {
        let callbacks: Vec<ElementCallback> = self
            .listeners
            .lock()
            .iter()
            .filter(|(e, _, _)| *e == event)
            .map(|(_, _, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback();
        }
    }
}

struct SimulatedVideo {
    shared: Arc<SimulatedShared>,
    src: Mutex<Option<String>>,
    volume: Mutex<f64>,
    muted: Mutex<bool>,
    next_listener: AtomicU64,
}

impl SimulatedVideo {
    fn new() -> Self {
        Self {
            shared: Arc::new(SimulatedShared {
                ready_state: Mutex::new(ReadyState::HaveNothing),
                started: Mutex::new(None),
                position: Mutex::new(0.0),
                listeners: Mutex::new(Vec::new()),
            }),
            src: Mutex::new(None),
            volume: Mutex::new(1.0),
            muted: Mutex::new(false),
            next_listener: AtomicU64::new(1),
        }
    }

    /// 24 fps, one frame in a hundred dropped.
    fn frames(&self) -> u64 {
        self.shared
            .started
            .lock()
            .map(|started| (started.elapsed().as_secs_f64() * 24.0) as u64)
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl MediaElement for SimulatedVideo {
    fn kind(&self) -> MediaElementKind {
        MediaElementKind::Video
    }

    fn set_src(&self, url: &str) {
        *self.src.lock() = Some(url.to_string());
    }

    fn clear_src(&self) {
        *self.src.lock() = None;
        *self.shared.ready_state.lock() = ReadyState::HaveNothing;
        *self.shared.started.lock() = None;
    }

    fn ready_state(&self) -> ReadyState {
        *self.shared.ready_state.lock()
    }

    fn current_time(&self) -> f64 {
        *self.shared.position.lock()
    }

    fn set_current_time(&self, seconds: f64) -> bridge_traits::error::Result<()> {
        if !self.ready_state().has_metadata() {
            return Err(BridgeError::InvalidState(
                "cannot seek before metadata".to_string(),
            ));
        }
        *self.shared.position.lock() = seconds;
        Ok(())
    }

    fn duration(&self) -> f64 {
        if self.ready_state().has_metadata() {
            596.48
        } else {
            f64::NAN
        }
    }

    fn buffered(&self) -> TimeRanges {
        let position = self.current_time();
        TimeRanges::new(vec![TimeRange::new(position, position + 30.0)])
    }

    fn volume(&self) -> f64 {
        *self.volume.lock()
    }

    fn set_volume(&self, volume: f64) -> bridge_traits::error::Result<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(BridgeError::OutOfRange(format!("volume {}", volume)));
        }
        *self.volume.lock() = volume;
        Ok(())
    }

    fn muted(&self) -> bool {
        *self.muted.lock()
    }

    fn set_muted(&self, muted: bool) {
        *self.muted.lock() = muted;
    }

    fn set_preload(&self, _preload: Preload) {}

    fn load(&self) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            *shared.ready_state.lock() = ReadyState::HaveEnoughData;
            shared.fire(MediaElementEvent::LoadedMetadata);
        });
    }

    async fn play(&self) -> bridge_traits::error::Result<()> {
        if !self.ready_state().has_metadata() {
            return Err(BridgeError::NotAllowed("no media loaded".to_string()));
        }
        *self.shared.started.lock() = Some(Instant::now());
        Ok(())
    }

    fn pause(&self) {
        *self.shared.started.lock() = None;
    }

    fn video_width(&self) -> u32 {
        1280
    }

    fn video_height(&self) -> u32 {
        720
    }

    fn playback_quality(&self) -> Option<VideoPlaybackQuality> {
        let total = self.frames();
        Some(VideoPlaybackQuality {
            total_video_frames: total,
            dropped_video_frames: total / 100,
        })
    }

    fn add_event_listener(
        &self,
        event: MediaElementEvent,
        callback: ElementCallback,
    ) -> ElementListenerId {
        let id = ElementListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.shared.listeners.lock().push((event, id, callback));
        id
    }

    fn remove_event_listener(&self, event: MediaElementEvent, id: ElementListenerId) {
        self.shared
            .listeners
            .lock()
            .retain(|(e, existing, _)| !(*e == event && *existing == id));
    }
}

// ============================================================================
// Demo
// ============================================================================

fn print_event(event: &PlayerEvent) {
    match serde_json::to_string(event) {
        Ok(json) => println!("   event: {}", json),
        Err(err) => println!("   event could not be serialized: {}", err),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )?;

    println!("Native Player - Lifecycle Demo\n");

    let source = MediaDataSource::new("mp4", "https://media.example.com/big_buck_bunny.mp4?sig=abc");
    let overrides = PlayerConfigOverrides::new().with_statistics_info_report_interval(250);
    let player = NativePlayer::new(source, Some(overrides))?;

    player.on(PlayerEventKind::MediaInfo, print_event);
    player.on(PlayerEventKind::StatisticsInfo, print_event);

    // Seeking before the element is ready defers the request.
    player.set_current_time(30.0);
    println!("Pending seek before attach: {:?}", player.pending_seek());

    let element = Arc::new(SimulatedVideo::new());
    player.attach_media_element(element.clone())?;
    player.load()?;

    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("Position after metadata: {:.1}s", player.current_time());

    player.play().await?;
    player.set_volume(0.8)?;
    tokio::time::sleep(Duration::from_millis(800)).await;

    // A late subscriber receives the current snapshot once.
    player.on(PlayerEventKind::MediaInfo, |event| {
        println!("   late subscriber got {:?}", event.as_media_info());
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    player.pause()?;
    player.unload();
    player.detach_media_element();
    player.destroy();

    println!("\nDestroyed: {}", player.is_destroyed());
    Ok(())
}
