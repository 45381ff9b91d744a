//! Demo configuration.
//!
//! Window and input settings with sane defaults, optionally overridden by a
//! `gokart.toml` next to the executable. A missing file is normal; a
//! malformed one logs a warning and falls back to defaults rather than
//! aborting the demo.

use serde::Deserialize;
use std::path::Path;

use crate::constants::camera;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Scales mouse deltas before they become rotation rates.
    pub mouse_sensitivity: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window_title: "gokart".to_string(),
            window_width: 1280,
            window_height: 720,
            fov_y: camera::FOV_Y,
            mouse_sensitivity: camera::MOUSE_SENSITIVITY,
        }
    }
}

impl DemoConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }

    /// Load from a TOML file, falling back to defaults if the file is absent
    /// or unparseable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(config) => {
                    log::info!("[config] Loaded {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("[config] {} is invalid ({}), using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = DemoConfig::default();
        assert!(config.window_width > 0 && config.window_height > 0);
        assert!(config.fov_y > 0.0 && config.fov_y < std::f32::consts::PI);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = DemoConfig::load_or_default("/no/such/gokart.toml");
        assert_eq!(config.window_title, "gokart");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let parsed: DemoConfig = toml::from_str("window_width = 640").unwrap();
        assert_eq!(parsed.window_width, 640);
        assert_eq!(parsed.window_height, 720);
    }
}
