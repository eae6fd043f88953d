//! # Snapshot Derivation
//!
//! Pure functions turning the current binding (source descriptor plus the
//! optional attached media element) into the two read-only snapshots a
//! player broadcasts: [`MediaInfo`] and [`StatisticsInfo`].
//!
//! Nothing here stores state or mutates the element.

use crate::source::MediaDataSource;
use bridge_traits::media::{
    LegacyFrameCounters, MediaElement, MediaElementKind, VideoPlaybackQuality,
};
use serde::{Deserialize, Serialize};

/// Media metadata snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    /// `audio/<type>` or `video/<type>`.
    pub mime_type: String,
    /// Duration in whole milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Playback-quality snapshot.
///
/// Frame counts are absent, not zero, when the element has no way of
/// reporting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsInfo {
    pub player_type: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoded_frames: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dropped_frames: Option<u64>,
}

/// Frame statistics capability of an element, resolved once per snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatistics {
    /// Structured playback-quality report.
    Structured(VideoPlaybackQuality),
    /// Legacy decoded/dropped counters.
    Legacy(LegacyFrameCounters),
    /// Neither mechanism exists.
    Unavailable,
}

impl FrameStatistics {
    /// Probe the element, preferring the structured report.
    pub fn probe(element: &dyn MediaElement) -> Self {
        if let Some(quality) = element.playback_quality() {
            FrameStatistics::Structured(quality)
        } else if let Some(counters) = element.legacy_frame_counters() {
            FrameStatistics::Legacy(counters)
        } else {
            FrameStatistics::Unavailable
        }
    }

    /// `(decoded, dropped)` frame counts, if any were reported.
    pub fn counts(&self) -> Option<(u64, u64)> {
        match self {
            FrameStatistics::Structured(quality) => {
                Some((quality.total_video_frames, quality.dropped_video_frames))
            }
            FrameStatistics::Legacy(counters) => {
                Some((counters.decoded_frame_count, counters.dropped_frame_count))
            }
            FrameStatistics::Unavailable => None,
        }
    }
}

/// Derive the media metadata snapshot.
///
/// Without an element only `mime_type` is filled, with the `video/` prefix.
pub fn media_info(source: &MediaDataSource, element: Option<&dyn MediaElement>) -> MediaInfo {
    let kind = element
        .map(|element| element.kind())
        .unwrap_or(MediaElementKind::Video);

    let mut info = MediaInfo {
        mime_type: format!("{}{}", kind.mime_prefix(), source.media_type),
        duration: None,
        width: None,
        height: None,
    };

    if let Some(element) = element {
        info.duration = duration_millis(element.duration());
        if kind.is_video() {
            info.width = Some(element.video_width());
            info.height = Some(element.video_height());
        }
    }

    info
}

/// Derive the playback-quality snapshot.
pub fn statistics_info(
    player_type: &str,
    source: &MediaDataSource,
    element: Option<&dyn MediaElement>,
) -> StatisticsInfo {
    let mut info = StatisticsInfo {
        player_type: player_type.to_string(),
        url: source.url.clone(),
        decoded_frames: None,
        dropped_frames: None,
    };

    let Some(element) = element.filter(|element| element.kind().is_video()) else {
        return info;
    };

    if let Some((decoded, dropped)) = FrameStatistics::probe(element).counts() {
        info.decoded_frames = Some(decoded);
        info.dropped_frames = Some(dropped);
    }

    info
}

/// `floor(seconds * 1000)`; `None` for unknown (NaN), live (infinite) or
/// negative durations.
fn duration_millis(seconds: f64) -> Option<u64> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some((seconds * 1000.0).floor() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::media::{
        ElementCallback, ElementListenerId, MediaElementEvent, Preload, ReadyState, TimeRanges,
    };
    use mockall::mock;

    mock! {
        Element {}

        #[async_trait::async_trait]
        impl MediaElement for Element {
            fn kind(&self) -> MediaElementKind;
            fn set_src(&self, url: &str);
            fn clear_src(&self);
            fn ready_state(&self) -> ReadyState;
            fn current_time(&self) -> f64;
            fn set_current_time(&self, seconds: f64) -> BridgeResult<()>;
            fn duration(&self) -> f64;
            fn buffered(&self) -> TimeRanges;
            fn volume(&self) -> f64;
            fn set_volume(&self, volume: f64) -> BridgeResult<()>;
            fn muted(&self) -> bool;
            fn set_muted(&self, muted: bool);
            fn set_preload(&self, preload: Preload);
            fn load(&self);
            async fn play(&self) -> BridgeResult<()>;
            fn pause(&self);
            fn video_width(&self) -> u32;
            fn video_height(&self) -> u32;
            fn playback_quality(&self) -> Option<VideoPlaybackQuality>;
            fn legacy_frame_counters(&self) -> Option<LegacyFrameCounters>;
            fn add_event_listener(
                &self,
                event: MediaElementEvent,
                callback: ElementCallback,
            ) -> ElementListenerId;
            fn remove_event_listener(&self, event: MediaElementEvent, id: ElementListenerId);
        }
    }

    fn source() -> MediaDataSource {
        MediaDataSource::new("mp4", "http://x/a.mp4")
    }

    fn video(duration: f64, width: u32, height: u32) -> MockElement {
        let mut element = MockElement::new();
        element.expect_kind().return_const(MediaElementKind::Video);
        element.expect_duration().return_const(duration);
        element.expect_video_width().return_const(width);
        element.expect_video_height().return_const(height);
        element
    }

    #[test]
    fn media_info_without_element_has_only_mime_type() {
        let info = media_info(&source(), None);
        assert_eq!(
            info,
            MediaInfo {
                mime_type: "video/mp4".to_string(),
                duration: None,
                width: None,
                height: None,
            }
        );
    }

    #[test]
    fn media_info_for_video_floors_duration_and_reports_size() {
        let element = video(12.3456, 1280, 720);
        let info = media_info(&source(), Some(&element));

        assert_eq!(info.mime_type, "video/mp4");
        assert_eq!(info.duration, Some(12345));
        assert_eq!(info.width, Some(1280));
        assert_eq!(info.height, Some(720));
    }

    #[test]
    fn media_info_for_audio_omits_dimensions() {
        let mut element = MockElement::new();
        element.expect_kind().return_const(MediaElementKind::Audio);
        element.expect_duration().return_const(3.9999);
        element.expect_video_width().never();
        element.expect_video_height().never();

        let info = media_info(&MediaDataSource::new("mpeg", "http://x/a.mp3"), Some(&element));

        assert_eq!(info.mime_type, "audio/mpeg");
        assert_eq!(info.duration, Some(3999));
        assert_eq!(info.width, None);
        assert_eq!(info.height, None);
    }

    #[test]
    fn media_info_omits_unknown_or_live_duration() {
        let element = video(f64::NAN, 0, 0);
        assert_eq!(media_info(&source(), Some(&element)).duration, None);

        let element = video(f64::INFINITY, 0, 0);
        assert_eq!(media_info(&source(), Some(&element)).duration, None);
    }

    #[test]
    fn statistics_without_element_or_for_audio_have_no_frames() {
        let info = statistics_info("NativePlayer", &source(), None);
        assert_eq!(info.player_type, "NativePlayer");
        assert_eq!(info.url, "http://x/a.mp4");
        assert_eq!(info.decoded_frames, None);

        let mut element = MockElement::new();
        element.expect_kind().return_const(MediaElementKind::Audio);
        element.expect_playback_quality().never();
        element.expect_legacy_frame_counters().never();

        let info = statistics_info("NativePlayer", &source(), Some(&element));
        assert_eq!(info.decoded_frames, None);
        assert_eq!(info.dropped_frames, None);
    }

    #[test]
    fn statistics_prefer_structured_report() {
        let mut element = MockElement::new();
        element.expect_kind().return_const(MediaElementKind::Video);
        element
            .expect_playback_quality()
            .times(1)
            .return_const(Some(VideoPlaybackQuality {
                total_video_frames: 240,
                dropped_video_frames: 7,
            }));
        element.expect_legacy_frame_counters().never();

        let info = statistics_info("NativePlayer", &source(), Some(&element));
        assert_eq!(info.decoded_frames, Some(240));
        assert_eq!(info.dropped_frames, Some(7));
    }

    #[test]
    fn statistics_fall_back_to_legacy_counters() {
        let mut element = MockElement::new();
        element.expect_kind().return_const(MediaElementKind::Video);
        element.expect_playback_quality().returning(|| None);
        element
            .expect_legacy_frame_counters()
            .return_const(Some(LegacyFrameCounters {
                decoded_frame_count: 100,
                dropped_frame_count: 3,
            }));

        let info = statistics_info("NativePlayer", &source(), Some(&element));
        assert_eq!(info.decoded_frames, Some(100));
        assert_eq!(info.dropped_frames, Some(3));
    }

    #[test]
    fn statistics_omit_frames_when_no_capability() {
        let mut element = MockElement::new();
        element.expect_kind().return_const(MediaElementKind::Video);
        element.expect_playback_quality().returning(|| None);
        element.expect_legacy_frame_counters().returning(|| None);

        let info = statistics_info("NativePlayer", &source(), Some(&element));
        let value = serde_json::to_value(&info).unwrap();

        assert_eq!(
            value,
            serde_json::json!({"playerType": "NativePlayer", "url": "http://x/a.mp4"})
        );
    }

    #[test]
    fn frame_statistics_counts() {
        assert_eq!(FrameStatistics::Unavailable.counts(), None);
        assert_eq!(
            FrameStatistics::Legacy(LegacyFrameCounters {
                decoded_frame_count: 5,
                dropped_frame_count: 0,
            })
            .counts(),
            Some((5, 0))
        );
    }

    #[test]
    fn media_info_serializes_camel_case_fields() {
        let element = video(2.0, 640, 360);
        let value = serde_json::to_value(media_info(&source(), Some(&element))).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"mimeType": "video/mp4", "duration": 2000, "width": 640, "height": 360})
        );
    }
}
