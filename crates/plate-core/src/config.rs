//! Client configuration
//!
//! Defaults reproduce the compiled-in behaviour: local impact service,
//! no request timeout, 50 g seed quantity, 50–200 g slider and a 0.4–1.1
//! sprite scale range. A TOML file may override any subset.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Compiled-in impact service endpoint
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Climate Plate configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateConfig {
    /// Impact service connection
    pub api: ApiConfig,
    /// Selection defaults and slider bounds
    pub selection: SelectionConfig,
    /// Plate sprite rendering
    pub render: RenderConfig,
}

impl PlateConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With impact service base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.api.request_timeout_secs = Some(secs);
        self
    }

    /// With seed quantity for first-touch toggles
    #[inline]
    #[must_use]
    pub fn with_default_grams(mut self, grams: u32) -> Self {
        self.selection.default_grams = grams;
        self
    }

    /// With sprite scale output range
    #[inline]
    #[must_use]
    pub fn with_scale_range(mut self, min: f32, max: f32) -> Self {
        self.render.scale_min = min;
        self.render.scale_max = max;
        self
    }

    /// Parse configuration from TOML
    ///
    /// # Errors
    /// Parse failures and [`ConfigError::Invalid`] from [`PlateConfig::validate`].
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// I/O, parse and validation failures.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Check internal consistency
    ///
    /// # Errors
    /// `ConfigError::Invalid` describing the first inconsistency found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url must not be empty".into()));
        }
        let s = &self.selection;
        if s.min_grams >= s.max_grams {
            return Err(ConfigError::Invalid(format!(
                "selection.min_grams ({}) must be below selection.max_grams ({})",
                s.min_grams, s.max_grams
            )));
        }
        if s.step_grams == 0 {
            return Err(ConfigError::Invalid("selection.step_grams must be positive".into()));
        }
        let r = &self.render;
        if !(r.scale_min.is_finite() && r.scale_max.is_finite()) || r.scale_min > r.scale_max {
            return Err(ConfigError::Invalid(format!(
                "render.scale_min ({}) must not exceed render.scale_max ({})",
                r.scale_min, r.scale_max
            )));
        }
        Ok(())
    }
}

/// Impact service connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Service root, e.g. `http://127.0.0.1:8000`
    pub base_url: String,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Selection defaults and slider bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Quantity seeded when an untouched ingredient is first toggled
    pub default_grams: u32,
    /// Slider lower bound, also the lower clamp for sprite scaling
    pub min_grams: u32,
    /// Slider upper bound, also the upper clamp for sprite scaling
    pub max_grams: u32,
    /// Slider step
    pub step_grams: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            default_grams: 50,
            min_grams: 50,
            max_grams: 200,
            step_grams: 10,
        }
    }
}

/// Plate sprite rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Scale at `min_grams`
    pub scale_min: f32,
    /// Scale at `max_grams`
    pub scale_max: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale_min: 0.4,
            scale_max: 1.1,
        }
    }
}
