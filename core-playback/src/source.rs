//! # Media Data Source
//!
//! Immutable description of what a player should play: a container type
//! tag, a URL, and (for players that support it) a list of segments.

use crate::error::{PlayerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One part of a multi-segment source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSegment {
    /// Segment duration in milliseconds.
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesize: Option<u64>,
    pub url: String,
}

/// Source descriptor handed to a player at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDataSource {
    /// Container type tag, e.g. `"mp4"`, `"webm"`, `"flv"`.
    #[serde(rename = "type")]
    pub media_type: String,

    pub url: String,

    /// Present only for multi-segment sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<MediaSegment>>,
}

impl MediaDataSource {
    pub fn new(media_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            url: url.into(),
            segments: None,
        }
    }

    pub fn with_segments(mut self, segments: Vec<MediaSegment>) -> Self {
        self.segments = Some(segments);
        self
    }

    /// Returns `true` if the source declares multi-segment composition,
    /// even with an empty segment list.
    pub fn is_segmented(&self) -> bool {
        self.segments.is_some()
    }

    /// Build a descriptor from an untyped value, applying the same structural
    /// checks a dynamic caller would hit.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = &value else {
            return Err(PlayerError::InvalidArgument(
                "MediaDataSource must be an object".to_string(),
            ));
        };

        match map.get("type") {
            None => {
                return Err(PlayerError::InvalidArgument(
                    "MediaDataSource must have a type field to indicate the media type"
                        .to_string(),
                ))
            }
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(PlayerError::InvalidArgument(
                    "MediaDataSource type must be a string".to_string(),
                ))
            }
        }

        serde_json::from_value(value)
            .map_err(|e| PlayerError::InvalidArgument(format!("Malformed MediaDataSource: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_accepts_minimal_object() {
        let source =
            MediaDataSource::from_value(json!({"type": "mp4", "url": "http://x/a.mp4"})).unwrap();
        assert_eq!(source, MediaDataSource::new("mp4", "http://x/a.mp4"));
        assert!(!source.is_segmented());
    }

    #[test]
    fn from_value_rejects_null_and_non_objects() {
        for value in [Value::Null, json!("mp4"), json!(42), json!(["mp4"])] {
            let err = MediaDataSource::from_value(value).unwrap_err();
            assert!(err.is_invalid_argument());
        }
    }

    #[test]
    fn from_value_rejects_missing_or_mistyped_type() {
        let err = MediaDataSource::from_value(json!({"url": "http://x/a.mp4"})).unwrap_err();
        assert!(err.to_string().contains("type field"));

        let err = MediaDataSource::from_value(json!({"type": 3, "url": "http://x"})).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn from_value_rejects_missing_url() {
        let err = MediaDataSource::from_value(json!({"type": "mp4"})).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn from_value_keeps_segments() {
        let source = MediaDataSource::from_value(json!({
            "type": "flv",
            "url": "http://x/a.flv",
            "segments": [{"duration": 1000.0, "filesize": 2048, "url": "http://x/1.flv"}]
        }))
        .unwrap();

        assert!(source.is_segmented());
        let segments = source.segments.unwrap();
        assert_eq!(segments[0].filesize, Some(2048));
    }

    #[test]
    fn serializes_with_type_key() {
        let value = serde_json::to_value(MediaDataSource::new("webm", "http://x/a.webm")).unwrap();
        assert_eq!(value, json!({"type": "webm", "url": "http://x/a.webm"}));
    }
}
