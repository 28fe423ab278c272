/// User-tunable settings
///
/// Stored as JSON next to the other per-user configuration. A missing
/// file means defaults; a malformed one is logged and replaced by
/// defaults rather than blocking startup.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StudioResult;
use crate::imaging::filter::DEFAULT_THRESHOLD;
use crate::interaction::engine::ControlLimits;
use crate::state::placement::PlacementDefaults;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Settings {
    // ========== Background removal ==========
    /// Pixels with R, G and B all above this become transparent (0-255)
    pub background_threshold: u8,

    // ========== New placements ==========
    /// Horizontal center, percent of canvas width
    pub default_x: f32,
    /// Vertical center, percent of canvas height
    pub default_y: f32,
    /// Percent of canvas width
    pub default_width: f32,

    // ========== Toolbar ranges ==========
    pub min_width: f32,
    pub max_width: f32,
    /// Rotation slider runs from -limit to +limit degrees
    pub rotation_limit: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            background_threshold: DEFAULT_THRESHOLD,
            default_x: 50.0,
            default_y: 50.0,
            default_width: 30.0,
            min_width: 10.0,
            max_width: 100.0,
            rotation_limit: 180.0,
        }
    }
}

impl Settings {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Values the engine can work with. Slider ranges must be ordered
    /// and every number finite.
    pub fn is_usable(&self) -> bool {
        self.control_limits().is_valid()
            && [self.default_x, self.default_y, self.default_width]
                .iter()
                .all(|value| value.is_finite())
    }

    pub fn placement_defaults(&self) -> PlacementDefaults {
        PlacementDefaults {
            x: self.default_x,
            y: self.default_y,
            width: self.default_width,
        }
    }

    pub fn control_limits(&self) -> ControlLimits {
        ControlLimits {
            min_width: self.min_width,
            max_width: self.max_width,
            rotation_limit: self.rotation_limit,
        }
    }

    /// Location of the settings file:
    /// - Linux: ~/.config/style-studio/settings.json
    /// - macOS: ~/Library/Application Support/style-studio/settings.json
    /// - Windows: %APPDATA%\style-studio\settings.json
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("style-studio").join("settings.json"))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("Could not determine config directory, using default settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(settings) if settings.is_usable() => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Ok(settings) => {
                log::warn!("Ignoring out-of-range settings in {}: {:?}", path.display(), settings);
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings in {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write to the default location. Missing config directory is not an error.
    pub fn save(&self) -> StudioResult<()> {
        match Self::default_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> StudioResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert!(settings.is_default());
        assert_eq!(settings.background_threshold, 240);
        assert_eq!(settings.placement_defaults(), PlacementDefaults::default());
        assert_eq!(settings.control_limits(), ControlLimits::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "background_threshold": 200 }"#).unwrap();
        assert_eq!(settings.background_threshold, 200);
        assert_eq!(settings.default_width, 30.0);
        assert!(!settings.is_default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join(format!("style-studio-test-{}", uuid::Uuid::new_v4()))
            .join("settings.json");

        let mut settings = Settings::default();
        settings.default_width = 45.0;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded, settings);

        fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load_from(&path).is_default());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("style-studio-does-not-exist").join("settings.json");
        assert!(Settings::load_from(&path).is_default());
    }

    #[test]
    fn test_out_of_range_limits_load_as_defaults() {
        let dir = std::env::temp_dir().join(format!("style-studio-test-{}", uuid::Uuid::new_v4()));
        let path = dir.join("settings.json");
        fs::create_dir_all(&dir).unwrap();

        for json in [
            r#"{ "min_width": 80, "max_width": 20 }"#,
            r#"{ "rotation_limit": -10 }"#,
            r#"{ "min_width": 0 }"#,
        ] {
            let parsed = Settings::from_json(json).unwrap();
            assert!(!parsed.is_usable());

            fs::write(&path, json).unwrap();
            let loaded = Settings::load_from(&path);
            assert!(loaded.is_default());
            assert_eq!(loaded.control_limits(), ControlLimits::default());
        }

        let _ = fs::remove_dir_all(dir);
    }
}
