//! Workspace facade crate.
//!
//! Host applications can depend on `native-player` alone and reach the
//! platform contract, the runtime infrastructure and the playback adapter
//! through the re-exports below.

pub use bridge_traits;
pub use core_playback;
pub use core_runtime;

pub use core_playback::{
    MediaDataSource, MediaInfo, NativePlayer, PlayerError, PlayerEvent, PlayerEventKind,
    StatisticsInfo,
};
pub use core_runtime::config::{PlayerConfig, PlayerConfigOverrides};
