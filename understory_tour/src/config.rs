// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tour configuration: resolution timings, placement constants, and the storage key.
//!
//! Every field has a default, so a host can supply a partial JSON document:
//!
//! ```
//! use understory_tour::config::TourConfig;
//!
//! let cfg = TourConfig::from_json(r#"{ "resolve_delay_ms": 300 }"#).unwrap();
//! assert_eq!(cfg.resolve_delay().as_millis(), 300);
//! assert_eq!(cfg.placement.gap, 20.0);
//! ```

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::placement::PlacementConfig;

/// Default key under which the completion flag is stored.
pub const DEFAULT_STORAGE_KEY: &str = "tour_completed";

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// Tooltip footprint, gap, and clamping.
    pub placement: PlacementConfig,
    /// Delay between a step change and the first target lookup, in milliseconds.
    pub resolve_delay_ms: u64,
    /// Delay between failed target lookups, in milliseconds.
    pub retry_interval_ms: u64,
    /// Lookups attempted before a step is left awaiting its target.
    pub max_resolve_attempts: u32,
    /// Key of the persisted completion flag.
    pub storage_key: String,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            placement: PlacementConfig::default(),
            resolve_delay_ms: 500,
            retry_interval_ms: 250,
            max_resolve_attempts: 8,
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
        }
    }
}

impl TourConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.placement;
        for (key, value) in [
            ("placement.tooltip_width", p.tooltip_width),
            ("placement.tooltip_height", p.tooltip_height),
            ("placement.gap", p.gap),
            ("placement.margin", p.margin),
            ("placement.highlight_padding", p.highlight_padding),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    key,
                    message: format!("expected a finite non-negative number, got {value}"),
                });
            }
        }
        if self.max_resolve_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_resolve_attempts",
                message: "at least one attempt is required".to_owned(),
            });
        }
        if self.storage_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "storage_key",
                message: "must not be empty".to_owned(),
            });
        }
        Ok(())
    }

    /// Delay before the first target lookup after a step change.
    pub fn resolve_delay(&self) -> Duration {
        Duration::from_millis(self.resolve_delay_ms)
    }

    /// Delay between failed target lookups.
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}
