//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and the host.
//! Each trait represents a capability that the core requires but that is
//! implemented differently per platform (web, desktop, mobile).
//!
//! ## Traits
//!
//! - [`MediaElement`](media::MediaElement) - Host-owned rendering surface that
//!   fetches, decodes and renders a media URL
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform-specific failures into the closest variant; in
//! particular a position assignment refused because nothing is loaded yet
//! must be reported as [`BridgeError::InvalidState`], and a playback start
//! refused by policy as [`BridgeError::NotAllowed`].
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! with the statistics reporter task.

pub mod error;
pub mod logging;
pub mod media;

pub use error::BridgeError;

pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use media::{
    ElementCallback, ElementListenerId, LegacyFrameCounters, MediaElement, MediaElementEvent,
    MediaElementKind, Preload, ReadyState, TimeRange, TimeRanges, VideoPlaybackQuality,
};
