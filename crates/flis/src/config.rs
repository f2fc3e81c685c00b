//! Renderer configuration.
//!
//! [`BatchConfig`] can be built in code or loaded from JSON. Every field has
//! a default, so a config file only needs the values it changes:
//!
//! ```json
//! { "capacity": 512, "vsync": false }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::render::pass::ClearColor;

/// Settings for a batch renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Rectangles per draw call. Must fit the device's uniform binding limit
    /// at 64 bytes per slot (1024 slots on default limits).
    pub capacity: u32,
    /// Background color each frame starts from.
    pub clear_color: ClearColor,
    /// Wait for vertical sync when presenting.
    pub vsync: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            clear_color: ClearColor::default(),
            vsync: true,
        }
    }
}

impl BatchConfig {
    /// Parse a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, RenderError> {
        let config: Self = serde_json::from_str(json).map_err(RenderError::ConfigParse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(RenderError::ConfigIo)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded batch config from '{}'", path.display());
        Ok(config)
    }

    /// Reject values no backend can honor.
    ///
    /// The upper capacity bound depends on the device and is checked when the
    /// batch is created.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.capacity == 0 {
            return Err(RenderError::InvalidCapacity {
                capacity: 0,
                max: u32::MAX,
            });
        }
        Ok(())
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, RenderError> {
        serde_json::to_string_pretty(self).map_err(RenderError::ConfigParse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = BatchConfig::from_json_str(r#"{ "capacity": 64 }"#).unwrap();
        assert_eq!(config.capacity, 64);
        assert!(config.vsync);
        assert_eq!(config.clear_color, ClearColor::default());
    }

    #[test]
    fn empty_object_is_the_default_config() {
        assert_eq!(BatchConfig::from_json_str("{}").unwrap(), BatchConfig::default());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = BatchConfig::from_json_str(r#"{ "capacity": 0 }"#).unwrap_err();
        assert!(matches!(err, RenderError::InvalidCapacity { capacity: 0, .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = BatchConfig::from_json_str("{ capacity: }").unwrap_err();
        assert!(matches!(err, RenderError::ConfigParse(_)));
    }

    #[test]
    fn clear_color_reads_as_array() {
        let config =
            BatchConfig::from_json_str(r#"{ "clear_color": [0.0, 0.5, 1.0, 1.0] }"#).unwrap();
        assert_eq!(config.clear_color, ClearColor([0.0, 0.5, 1.0, 1.0]));
    }

    #[test]
    fn written_config_reads_back() {
        let config = BatchConfig {
            capacity: 256,
            clear_color: ClearColor([0.0, 0.0, 0.0, 1.0]),
            vsync: false,
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("\"capacity\": 256"));
        assert_eq!(BatchConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = BatchConfig::load("/definitely/not/here/flis.json").unwrap_err();
        assert!(matches!(err, RenderError::ConfigIo(_)));
    }
}
