//! Play screen configuration, loaded from YAML.
//!
//! Every field has a default, so a partial file (or an empty one) is valid.

use crate::types::{Color, PixelsPerMeter};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How the frame driver turns elapsed time into simulation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    /// At most one step per frame, no catch-up.
    Gated,
    /// Accumulate elapsed time and run every owed step, up to a cap.
    #[default]
    Accumulate,
}

/// How the camera reacts to a new follow target.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FollowMode {
    /// Assign the target position.
    #[default]
    Set,
    /// Add the target to the current position. Compounds every step.
    Translate,
    /// Move a fraction `rate * dt` of the remaining distance toward the target.
    Lerp { rate: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 360.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub mode: FollowMode,
    /// Fraction of the viewport width the target sits right of the entity.
    pub margin_x: f32,
    /// Fraction of the viewport height the target sits below the entity.
    pub margin_y: f32,
    /// Multiplier applied to the entity position after the pixel conversion.
    pub position_scale: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            mode: FollowMode::Set,
            margin_x: 0.125,
            margin_y: 0.125,
            position_scale: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub map: String,
    pub hud: String,
    pub player: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            map: "maps/map1.tmx".into(),
            hud: "imgs/hud.png".into(),
            player: "imgs/player.png".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 16.0,
            height: 16.0,
        }
    }
}

/// The static box placed under the player's spawn point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    /// Vertical offset from the viewport centre, in pixels.
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            offset_y: -64.0,
            width: 128.0,
            height: 32.0,
        }
    }
}

/// Top-level configuration of the play screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    pub viewport: ViewportConfig,
    pub ppm: PixelsPerMeter,
    /// Simulation updates per second.
    pub target_ups: u32,
    pub velocity_iterations: usize,
    pub position_iterations: usize,
    pub step_mode: StepMode,
    pub max_catch_up_steps: u32,
    pub gravity: [f32; 2],
    pub debug_draw: bool,
    pub clear_color: Color,
    pub hud_label: String,
    pub camera: CameraConfig,
    pub assets: AssetPaths,
    pub player: PlayerConfig,
    pub ground: GroundConfig,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            ppm: PixelsPerMeter::default(),
            target_ups: 60,
            velocity_iterations: 6,
            position_iterations: 2,
            step_mode: StepMode::default(),
            max_catch_up_steps: 5,
            gravity: [0.0, 0.0],
            debug_draw: true,
            clear_color: Color::WHITE,
            hud_label: "Screen: Play".into(),
            camera: CameraConfig::default(),
            assets: AssetPaths::default(),
            player: PlayerConfig::default(),
            ground: GroundConfig::default(),
        }
    }
}

impl PlayConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Fixed simulation delta in seconds.
    pub fn step_seconds(&self) -> f32 {
        1.0 / self.target_ups as f32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ppm.0 > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "ppm must be positive, got {}",
                self.ppm.0
            )));
        }
        if self.target_ups == 0 {
            return Err(ConfigError::Invalid("target_ups must be non-zero".into()));
        }
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "viewport must be positive, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if self.max_catch_up_steps == 0 {
            return Err(ConfigError::Invalid(
                "max_catch_up_steps must be non-zero".into(),
            ));
        }
        if let FollowMode::Lerp { rate } = self.camera.mode {
            if !(rate.is_finite() && rate >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "lerp rate must be finite and non-negative, got {rate}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_validate() {
        let config = PlayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.velocity_iterations, 6);
        assert_eq!(config.position_iterations, 2);
        assert_eq!(config.hud_label, "Screen: Play");
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = PlayConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, PlayConfig::default());
    }

    #[test]
    fn partial_document_overrides_fields() {
        let text = "target_ups: 30\nstep_mode: gated\ncamera:\n  mode:\n    kind: translate\n";
        let config = PlayConfig::from_yaml_str(text).unwrap();
        assert_eq!(config.target_ups, 30);
        assert_eq!(config.step_mode, StepMode::Gated);
        assert_eq!(config.camera.mode, FollowMode::Translate);
        assert_eq!(config.camera.margin_x, 0.125);
        assert_eq!(config.ppm, PixelsPerMeter(32.0));
    }

    #[test]
    fn lerp_mode_parses_rate() {
        let text = "camera:\n  mode:\n    kind: lerp\n    rate: 4.0\n";
        let config = PlayConfig::from_yaml_str(text).unwrap();
        assert_eq!(config.camera.mode, FollowMode::Lerp { rate: 4.0 });
    }

    #[test]
    fn bad_lerp_rate_rejected() {
        for rate in [".nan", "-1.0", ".inf"] {
            let text = format!("camera:\n  mode:\n    kind: lerp\n    rate: {rate}\n");
            let err = PlayConfig::from_yaml_str(&text).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{rate}");
        }
    }

    #[test]
    fn zero_ppm_rejected() {
        let err = PlayConfig::from_yaml_str("ppm: 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_rate_rejected() {
        let err = PlayConfig::from_yaml_str("target_ups: 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn yaml_round_trip_through_file() {
        let mut config = PlayConfig::default();
        config.debug_draw = false;
        config.gravity = [0.0, -9.8];
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(config.to_yaml_string().unwrap().as_bytes())
            .unwrap();

        let loaded = PlayConfig::load(tmp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn step_seconds_from_rate() {
        let config = PlayConfig::default();
        assert!((config.step_seconds() - 1.0 / 60.0).abs() < f32::EPSILON);
    }
}
