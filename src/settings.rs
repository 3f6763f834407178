//! Simulation settings
//!
//! Defaults match the built-in levels. A JSON file can override any subset
//! of fields; out-of-range values are clamped when read, never rejected.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Target milliseconds between ticks
    pub tick_interval_ms: u64,
    /// Scale each step by elapsed time / tick interval instead of a fixed step
    pub scale_by_delta: bool,
    /// RNG seed for enemy speeds and directions
    pub seed: u64,

    // === Player ===
    pub player_speed: f64,
    pub player_health: u32,

    // === Enemies ===
    pub enemy_min_speed: f64,
    pub enemy_max_speed: f64,

    // === Collectables ===
    pub collectable_value: u32,

    // === Headless host ===
    /// How long the binary runs before ending the game itself
    pub run_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_INTERVAL_MS,
            scale_by_delta: false,
            seed: 0x5EED,

            player_speed: PLAYER_SPEED,
            player_health: PLAYER_HEALTH,

            enemy_min_speed: ENEMY_MIN_SPEED,
            enemy_max_speed: ENEMY_MAX_SPEED,

            collectable_value: COLLECTABLE_VALUE,

            run_seconds: 10,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Player speed, never negative
    pub fn player_speed(&self) -> f64 {
        self.player_speed.max(0.0)
    }

    /// Enemy speed bounds as `(min, max)`, with `0 <= min <= max`
    pub fn enemy_speed_range(&self) -> (f64, f64) {
        let min = self.enemy_min_speed.max(0.0);
        (min, self.enemy_max_speed.max(min))
    }

    /// Tick interval, never zero
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "seed": 9, "player_speed": 2.5 }"#).expect("valid json");
        assert_eq!(settings.seed, 9);
        assert_eq!(settings.player_speed, 2.5);
        assert_eq!(settings.player_health, PLAYER_HEALTH);
        assert_eq!(settings.tick_interval_ms, TICK_INTERVAL_MS);
    }

    #[test]
    fn test_speed_range_is_sanitized() {
        let settings = Settings {
            enemy_min_speed: -2.0,
            enemy_max_speed: -5.0,
            ..Default::default()
        };
        assert_eq!(settings.enemy_speed_range(), (0.0, 0.0));

        let settings = Settings {
            enemy_min_speed: 3.0,
            enemy_max_speed: 1.0,
            ..Default::default()
        };
        assert_eq!(settings.enemy_speed_range(), (3.0, 3.0));
    }

    #[test]
    fn test_player_speed_is_sanitized() {
        let settings = Settings {
            player_speed: -5.0,
            ..Default::default()
        };
        assert_eq!(settings.player_speed(), 0.0);
        assert_eq!(Settings::default().player_speed(), PLAYER_SPEED);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(Settings::from_json("{ nope"), Err(SettingsError::Json(_))));
        let missing = Settings::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(missing, Err(SettingsError::Io(_))));
    }
}
