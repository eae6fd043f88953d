//! # Native Playback Adapter
//!
//! Binds a media source description to a platform media element and keeps
//! that binding consistent across attach, load, unload, detach and destroy.
//!
//! ## Overview
//!
//! This crate handles:
//! - Source descriptor validation ([`source`])
//! - Media-info and statistics snapshots derived from the bound element ([`snapshot`])
//! - The periodic statistics reporter ([`reporter`])
//! - The player itself, with deferred seeks and replay-on-subscribe events ([`player`])

pub mod error;
pub mod events;
pub mod player;
pub mod reporter;
pub mod snapshot;
pub mod source;

pub use error::{PlayerError, Result};
pub use events::{PlayerEvent, PlayerEventKind};
pub use player::{NativePlayer, PlayerId, PLAYER_TYPE};
pub use reporter::StatisticsReporter;
pub use snapshot::{FrameStatistics, MediaInfo, StatisticsInfo};
pub use source::{MediaDataSource, MediaSegment};
