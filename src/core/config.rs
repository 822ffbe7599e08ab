use crate::core::pose_classifier::{ClassifierSettings, HYSTERESIS_MARGIN, VISIBILITY_THRESHOLD};
use crate::models::pose::{PoseError, PoseResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Landmark visibility a key joint must exceed (0.0-1.0)
    pub visibility_threshold: f32,
    /// Degrees past a threshold before up/down is left (0-30)
    pub hysteresis_margin_degrees: f32,
    /// Start calibration when an uncalibrated exercise is picked in freestyle
    pub auto_calibrate_on_select: bool,
    /// Calibration countdown and display timings
    pub calibration: CalibrationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalibrationSettings {
    /// Countdown length before each capture (1-10)
    pub countdown_seconds: u32,
    pub tick_interval_ms: u64,
    /// Wait after "HOLD!" before sampling the pose
    pub settle_delay_ms: u64,
    pub pause_between_phases_ms: u64,
    /// How long "Calibration Complete!" stays up
    pub complete_display_ms: u64,
    /// How long "Calibration Cancelled" stays up
    pub cancel_display_ms: u64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            countdown_seconds: 3,
            tick_interval_ms: 1000,
            settle_delay_ms: 500,
            pause_between_phases_ms: 500,
            complete_display_ms: 2000,
            cancel_display_ms: 1500,
        }
    }
}

impl CalibrationSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn pause_between_phases(&self) -> Duration {
        Duration::from_millis(self.pause_between_phases_ms)
    }

    pub fn complete_display(&self) -> Duration {
        Duration::from_millis(self.complete_display_ms)
    }

    pub fn cancel_display(&self) -> Duration {
        Duration::from_millis(self.cancel_display_ms)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: VISIBILITY_THRESHOLD,
            hysteresis_margin_degrees: HYSTERESIS_MARGIN,
            auto_calibrate_on_select: true,
            calibration: CalibrationSettings::default(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from the default path, creating it with defaults if missing
    pub fn load() -> PoseResult<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> PoseResult<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: TrackerConfig = serde_json::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> PoseResult<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> PoseResult<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    pub fn validate(&self) -> PoseResult<()> {
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err(PoseError::InvalidConfig(format!(
                "Invalid visibility threshold: {}. Must be between 0.0 and 1.0",
                self.visibility_threshold
            )));
        }

        if !(0.0..=30.0).contains(&self.hysteresis_margin_degrees) {
            return Err(PoseError::InvalidConfig(format!(
                "Invalid hysteresis margin: {}. Must be between 0 and 30 degrees",
                self.hysteresis_margin_degrees
            )));
        }

        let calibration = &self.calibration;
        if calibration.countdown_seconds == 0 || calibration.countdown_seconds > 10 {
            return Err(PoseError::InvalidConfig(format!(
                "Invalid countdown: {}. Must be between 1 and 10 seconds",
                calibration.countdown_seconds
            )));
        }

        let durations = [
            ("tick_interval_ms", calibration.tick_interval_ms),
            ("settle_delay_ms", calibration.settle_delay_ms),
            ("pause_between_phases_ms", calibration.pause_between_phases_ms),
            ("complete_display_ms", calibration.complete_display_ms),
            ("cancel_display_ms", calibration.cancel_display_ms),
        ];
        for (name, value) in durations {
            if value == 0 {
                return Err(PoseError::InvalidConfig(format!("{} must be greater than 0", name)));
            }
        }

        Ok(())
    }

    /// Reset the file at the default path to defaults
    pub fn reset() -> PoseResult<Self> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    pub fn classifier_settings(&self) -> ClassifierSettings {
        ClassifierSettings {
            visibility_threshold: self.visibility_threshold,
            hysteresis_margin: self.hysteresis_margin_degrees,
        }
    }

    pub fn get_config_path() -> PoseResult<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| PoseError::InvalidConfig("Could not determine home directory".to_string()))?;

        let mut path = PathBuf::from(home);
        path.push(".rep_tracker");
        path.push("config");
        path.push("settings.json");

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn get_test_config_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("rep_tracker_test_config_{}_{}", name, std::process::id()));
        path.push("settings.json");
        path
    }

    fn cleanup_test_config(path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn test_default_config() {
        let config = TrackerConfig::default();
        assert_eq!(config.visibility_threshold, 0.5);
        assert_eq!(config.hysteresis_margin_degrees, 5.0);
        assert!(config.auto_calibrate_on_select);
        assert_eq!(config.calibration.countdown_seconds, 3);
        assert_eq!(config.calibration.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.calibration.settle_delay(), Duration::from_millis(500));
        assert_eq!(config.calibration.complete_display(), Duration::from_secs(2));
        assert_eq!(config.calibration.cancel_display(), Duration::from_millis(1500));
    }

    #[test]
    fn test_config_validation() {
        let mut config = TrackerConfig::default();
        assert!(config.validate().is_ok());

        config.visibility_threshold = 1.5;
        assert!(config.validate().is_err());
        config.visibility_threshold = 0.5;

        config.hysteresis_margin_degrees = -1.0;
        assert!(config.validate().is_err());
        config.hysteresis_margin_degrees = 45.0;
        assert!(config.validate().is_err());
        config.hysteresis_margin_degrees = 0.0;
        assert!(config.validate().is_ok());

        config.calibration.countdown_seconds = 0;
        assert!(config.validate().is_err());
        config.calibration.countdown_seconds = 11;
        assert!(config.validate().is_err());
        config.calibration.countdown_seconds = 3;

        config.calibration.settle_delay_ms = 0;
        assert!(matches!(config.validate(), Err(PoseError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_serialization() {
        let config = TrackerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: TrackerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{ "hysteresis_margin_degrees": 8.0, "calibration": { "countdown_seconds": 5 } }"#;
        let config: TrackerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.hysteresis_margin_degrees, 8.0);
        assert_eq!(config.visibility_threshold, 0.5);
        assert_eq!(config.calibration.countdown_seconds, 5);
        assert_eq!(config.calibration.tick_interval_ms, 1000);
    }

    #[test]
    fn test_load_creates_default_file() {
        let path = get_test_config_path("load");
        cleanup_test_config(&path);

        let config = TrackerConfig::load_from(&path).unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert!(path.exists());

        cleanup_test_config(&path);
    }

    #[test]
    fn test_save_and_reload() {
        let path = get_test_config_path("save");
        cleanup_test_config(&path);

        let mut config = TrackerConfig::default();
        config.auto_calibrate_on_select = false;
        config.calibration.countdown_seconds = 2;
        config.save_to(&path).unwrap();

        let loaded = TrackerConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        cleanup_test_config(&path);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let path = get_test_config_path("invalid");
        cleanup_test_config(&path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{ "visibility_threshold": 2.0 }"#).unwrap();

        assert!(TrackerConfig::load_from(&path).is_err());

        cleanup_test_config(&path);
    }

    #[test]
    fn test_classifier_settings_follow_config() {
        let mut config = TrackerConfig::default();
        config.hysteresis_margin_degrees = 7.5;
        let settings = config.classifier_settings();
        assert_eq!(settings.hysteresis_margin, 7.5);
        assert_eq!(settings.visibility_threshold, 0.5);
    }
}
