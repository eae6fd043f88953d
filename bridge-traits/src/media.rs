//! Rendering surface bridge trait and supporting types.
//!
//! A [`MediaElement`] is a host-owned, stateful object able to fetch, decode
//! and render a URL (an HTML `<audio>`/`<video>` element on the web, a native
//! player view elsewhere). The core never owns it: it binds to it, drives it
//! and reads snapshots from it. Hosts provide concrete implementations that
//! satisfy their platform constraints.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Distinguishes audio-only surfaces from video surfaces.
///
/// Video surfaces expose intrinsic dimensions and, optionally, frame
/// statistics; audio surfaces expose neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaElementKind {
    Audio,
    Video,
}

impl MediaElementKind {
    /// MIME top-level type matching this kind (`"audio"` or `"video"`).
    pub fn mime_prefix(&self) -> &'static str {
        match self {
            MediaElementKind::Audio => "audio/",
            MediaElementKind::Video => "video/",
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, MediaElementKind::Video)
    }
}

/// Readiness of the surface, ordered from "nothing known" to "can play through".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReadyState {
    /// No information about the media resource is available.
    HaveNothing = 0,
    /// Duration and dimensions are known; position can be assigned.
    HaveMetadata = 1,
    /// Data for the current position is available.
    HaveCurrentData = 2,
    /// Data beyond the current position is available.
    HaveFutureData = 3,
    /// Enough data is buffered to play through without stalling.
    HaveEnoughData = 4,
}

impl ReadyState {
    /// Returns `true` once the surface knows anything about its media.
    pub fn has_metadata(&self) -> bool {
        *self != ReadyState::HaveNothing
    }
}

/// Preload hint handed to the surface before loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preload {
    None,
    Metadata,
    #[default]
    Auto,
}

/// A contiguous buffered range, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Ordered, non-overlapping buffered ranges reported by the surface.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeRanges {
    ranges: Vec<TimeRange>,
}

impl TimeRanges {
    pub fn new(ranges: Vec<TimeRange>) -> Self {
        Self { ranges }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeRange> {
        self.ranges.iter()
    }

    /// Returns `true` if `seconds` falls inside any buffered range.
    pub fn contains(&self, seconds: f64) -> bool {
        self.ranges
            .iter()
            .any(|range| range.start <= seconds && seconds <= range.end)
    }
}

/// Structured playback-quality report (the modern frame statistics API).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoPlaybackQuality {
    /// Frames created so far, displayed or dropped.
    pub total_video_frames: u64,
    /// Frames dropped before presentation.
    pub dropped_video_frames: u64,
}

/// Vendor-prefixed decoded/dropped counters exposed by older engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegacyFrameCounters {
    pub decoded_frame_count: u64,
    pub dropped_frame_count: u64,
}

/// Notifications a surface can deliver to installed listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaElementEvent {
    /// Duration and dimensions became known.
    LoadedMetadata,
    /// Enough data to start playback.
    CanPlay,
    /// Playback reached the end of the media.
    Ended,
    /// The surface failed to fetch or decode the media.
    Error,
}

impl fmt::Display for MediaElementEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaElementEvent::LoadedMetadata => "loadedmetadata",
            MediaElementEvent::CanPlay => "canplay",
            MediaElementEvent::Ended => "ended",
            MediaElementEvent::Error => "error",
        };
        f.write_str(name)
    }
}

/// Identifier returned when installing a listener, used to remove it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementListenerId(pub u64);

/// Callback invoked by the surface when a [`MediaElementEvent`] fires.
pub type ElementCallback = Arc<dyn Fn() + Send + Sync>;

/// Host-owned media rendering surface.
///
/// All methods take `&self`: platform elements are shared handles with their
/// own interior state. Implementations may invoke listener callbacks
/// synchronously from within any method.
#[async_trait::async_trait]
pub trait MediaElement: Send + Sync {
    /// Whether this is an audio-only or a video surface.
    fn kind(&self) -> MediaElementKind;

    /// Point the surface at a new media URL.
    fn set_src(&self, url: &str);

    /// Empty the media URL and drop the source entirely.
    fn clear_src(&self);

    fn ready_state(&self) -> ReadyState;

    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Assign the playback position.
    ///
    /// Some engines reject the assignment with [`BridgeError::InvalidState`](crate::BridgeError::InvalidState)
    /// while nothing is loaded.
    fn set_current_time(&self, seconds: f64) -> Result<()>;

    /// Media duration in seconds. NaN when unknown, infinite for live streams.
    fn duration(&self) -> f64;

    fn buffered(&self) -> TimeRanges;

    fn volume(&self) -> f64;

    /// Set volume in `0.0..=1.0`; out-of-range values are rejected.
    fn set_volume(&self, volume: f64) -> Result<()>;

    fn muted(&self) -> bool;

    fn set_muted(&self, muted: bool);

    fn set_preload(&self, preload: Preload);

    /// Reset the surface and start fetching the current URL.
    fn load(&self);

    /// Start playback. Resolves once playback has actually started, or fails
    /// when the host refuses (e.g. autoplay policy).
    async fn play(&self) -> Result<()>;

    fn pause(&self);

    /// Intrinsic width of the video; 0 for audio surfaces or unknown.
    fn video_width(&self) -> u32 {
        0
    }

    /// Intrinsic height of the video; 0 for audio surfaces or unknown.
    fn video_height(&self) -> u32 {
        0
    }

    /// Structured frame statistics, when the engine supports them.
    fn playback_quality(&self) -> Option<VideoPlaybackQuality> {
        None
    }

    /// Legacy decoded/dropped counters, when the engine exposes them.
    fn legacy_frame_counters(&self) -> Option<LegacyFrameCounters> {
        None
    }

    fn add_event_listener(
        &self,
        event: MediaElementEvent,
        callback: ElementCallback,
    ) -> ElementListenerId;

    fn remove_event_listener(&self, event: MediaElementEvent, id: ElementListenerId);
}
