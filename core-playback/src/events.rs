//! # Player Events
//!
//! Event identifiers shared by every player kind, and the payloads this
//! crate's native player emits.

use crate::snapshot::{MediaInfo, StatisticsInfo};
use core_runtime::events::Event;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Player event identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerEventKind {
    Error,
    LoadingComplete,
    RecoveredEarlyEof,
    MediaInfo,
    MetadataArrived,
    ScriptdataArrived,
    StatisticsInfo,
}

impl PlayerEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerEventKind::Error => "error",
            PlayerEventKind::LoadingComplete => "loading_complete",
            PlayerEventKind::RecoveredEarlyEof => "recovered_early_eof",
            PlayerEventKind::MediaInfo => "media_info",
            PlayerEventKind::MetadataArrived => "metadata_arrived",
            PlayerEventKind::ScriptdataArrived => "scriptdata_arrived",
            PlayerEventKind::StatisticsInfo => "statistics_info",
        }
    }

    /// Whether a late subscriber receives the current snapshot once, right
    /// after subscribing, when the bound element already has metadata.
    pub fn replays_on_subscribe(&self) -> bool {
        matches!(
            self,
            PlayerEventKind::MediaInfo | PlayerEventKind::StatisticsInfo
        )
    }
}

impl fmt::Display for PlayerEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events emitted by the native player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PlayerEvent {
    MediaInfo(MediaInfo),
    StatisticsInfo(StatisticsInfo),
}

impl PlayerEvent {
    pub fn as_media_info(&self) -> Option<&MediaInfo> {
        match self {
            PlayerEvent::MediaInfo(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_statistics_info(&self) -> Option<&StatisticsInfo> {
        match self {
            PlayerEvent::StatisticsInfo(info) => Some(info),
            _ => None,
        }
    }
}

impl Event for PlayerEvent {
    type Kind = PlayerEventKind;

    fn kind(&self) -> PlayerEventKind {
        match self {
            PlayerEvent::MediaInfo(_) => PlayerEventKind::MediaInfo,
            PlayerEvent::StatisticsInfo(_) => PlayerEventKind::StatisticsInfo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_policy_covers_snapshot_events_only() {
        assert!(PlayerEventKind::MediaInfo.replays_on_subscribe());
        assert!(PlayerEventKind::StatisticsInfo.replays_on_subscribe());
        assert!(!PlayerEventKind::Error.replays_on_subscribe());
        assert!(!PlayerEventKind::LoadingComplete.replays_on_subscribe());
    }

    #[test]
    fn kind_names_match_serde() {
        for kind in [
            PlayerEventKind::Error,
            PlayerEventKind::RecoveredEarlyEof,
            PlayerEventKind::ScriptdataArrived,
            PlayerEventKind::StatisticsInfo,
        ] {
            let value = serde_json::to_value(kind).unwrap();
            assert_eq!(value, serde_json::Value::String(kind.to_string()));
        }
    }

    #[test]
    fn event_kind_and_accessors() {
        let event = PlayerEvent::MediaInfo(MediaInfo {
            mime_type: "video/mp4".into(),
            duration: Some(1000),
            width: None,
            height: None,
        });

        assert_eq!(event.kind(), PlayerEventKind::MediaInfo);
        assert!(event.as_media_info().is_some());
        assert!(event.as_statistics_info().is_none());
    }
}
