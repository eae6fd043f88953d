//! # Player Configuration
//!
//! Recognised player options, their defaults, and the shallow merge applied
//! when a caller supplies its own configuration.
//!
//! ## Overview
//!
//! A player starts from [`PlayerConfig::default`] and overrides it field by
//! field with a [`PlayerConfigOverrides`]: every option the caller specifies
//! wins, every option left out keeps its default. The merged result is
//! validated before the player accepts it and is immutable afterwards.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::config::{PlayerConfig, PlayerConfigOverrides};
//!
//! let overrides = PlayerConfigOverrides::from_json(r#"{"statisticsInfoReportInterval": 1000}"#)
//!     .expect("valid JSON");
//! let config = PlayerConfig::merged(Some(overrides)).expect("valid config");
//!
//! assert_eq!(config.statistics_info_report_interval, 1000);
//! ```

use crate::error::{Error, Result};
use bridge_traits::media::Preload;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Effective configuration owned by a player instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    /// Period of the statistics reporter, in milliseconds.
    ///
    /// Default: 600.
    #[serde(default = "default_statistics_info_report_interval")]
    pub statistics_info_report_interval: u64,

    /// Preload hint applied to the surface on `load`.
    ///
    /// Default: `Auto`.
    #[serde(default)]
    pub preload: Preload,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            statistics_info_report_interval: default_statistics_info_report_interval(),
            preload: Preload::default(),
        }
    }
}

impl PlayerConfig {
    /// Default configuration overridden by `overrides`, validated.
    pub fn merged(overrides: Option<PlayerConfigOverrides>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(overrides) = overrides {
            config.apply(overrides);
        }
        config.validate()?;
        Ok(config)
    }

    /// Shallow merge: every option present in `overrides` replaces ours.
    pub fn apply(&mut self, overrides: PlayerConfigOverrides) {
        if let Some(interval) = overrides.statistics_info_report_interval {
            self.statistics_info_report_interval = interval;
        }
        if let Some(preload) = overrides.preload {
            self.preload = preload;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.statistics_info_report_interval == 0 {
            return Err(Error::Config(
                "statisticsInfoReportInterval must be a positive number of milliseconds"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Statistics reporter period as a [`Duration`].
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.statistics_info_report_interval)
    }
}

/// Caller-supplied options; `None` means "keep the default".
///
/// Unknown keys are ignored when deserializing, so a configuration object
/// shared with other player kinds can be passed through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics_info_report_interval: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preload: Option<Preload>,
}

impl PlayerConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statistics_info_report_interval(mut self, millis: u64) -> Self {
        self.statistics_info_report_interval = Some(millis);
        self
    }

    pub fn with_preload(mut self, preload: Preload) -> Self {
        self.preload = Some(preload);
        self
    }

    /// Parse overrides from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid player configuration: {}", e)))
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_statistics_info_report_interval() -> u64 {
    600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.statistics_info_report_interval, 600);
        assert_eq!(config.preload, Preload::Auto);
        assert_eq!(config.report_interval(), Duration::from_millis(600));
    }

    #[test]
    fn test_merge_without_overrides_keeps_defaults() {
        let config = PlayerConfig::merged(None).unwrap();
        assert_eq!(config, PlayerConfig::default());
    }

    #[test]
    fn test_merge_overrides_only_specified_fields() {
        let overrides = PlayerConfigOverrides::new().with_statistics_info_report_interval(250);
        let config = PlayerConfig::merged(Some(overrides)).unwrap();

        assert_eq!(config.statistics_info_report_interval, 250);
        assert_eq!(config.preload, Preload::Auto);

        let overrides = PlayerConfigOverrides::new().with_preload(Preload::Metadata);
        let config = PlayerConfig::merged(Some(overrides)).unwrap();

        assert_eq!(config.statistics_info_report_interval, 600);
        assert_eq!(config.preload, Preload::Metadata);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let overrides = PlayerConfigOverrides::new().with_statistics_info_report_interval(0);
        let err = PlayerConfig::merged(Some(overrides)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_overrides_from_json() {
        let overrides = PlayerConfigOverrides::from_json(
            r#"{"statisticsInfoReportInterval": 1000, "preload": "metadata", "enableWorker": true}"#,
        )
        .unwrap();

        assert_eq!(overrides.statistics_info_report_interval, Some(1000));
        assert_eq!(overrides.preload, Some(Preload::Metadata));

        let empty = PlayerConfigOverrides::from_json("{}").unwrap();
        assert_eq!(empty, PlayerConfigOverrides::default());
    }

    #[test]
    fn test_overrides_from_invalid_json() {
        assert!(PlayerConfigOverrides::from_json("[1, 2]").is_err());
        assert!(PlayerConfigOverrides::from_json(r#"{"statisticsInfoReportInterval": -5}"#).is_err());
    }

    #[test]
    fn test_config_deserializes_partial_object_over_defaults() {
        let config: PlayerConfig = serde_json::from_str(r#"{"preload": "none"}"#).unwrap();
        assert_eq!(config.preload, Preload::None);
        assert_eq!(config.statistics_info_report_interval, 600);
    }
}
