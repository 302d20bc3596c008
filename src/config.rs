//! Game tuning and key bindings
//!
//! Defaults are compiled in; an optional JSON override lives in the same
//! key-value store as the high score.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::KeyValueStore;

/// Tunable game parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Timing ===
    /// Milliseconds per score point
    pub score_period_ms: u64,
    /// Milliseconds between collision samples
    pub collision_period_ms: u64,
    /// Milliseconds the jump animation stays applied
    pub jump_duration_ms: u64,

    // === Collision box ===
    /// Obstacle left offset (px) at or below which it reaches the character
    pub obstacle_hit_left_px: f64,
    /// Character bottom offset (px) below which the obstacle connects
    pub character_clear_bottom_px: f64,

    // === Input ===
    /// `KeyboardEvent.code` values that jump. Empty means any key.
    pub jump_keys: Vec<String>,
    /// `KeyboardEvent.code` that restarts after a game over
    pub restart_key: String,

    // === Audio ===
    /// Volume used when no valid volume is stored
    pub default_volume: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            score_period_ms: SCORE_PERIOD_MS,
            collision_period_ms: COLLISION_PERIOD_MS,
            jump_duration_ms: JUMP_DURATION_MS,

            obstacle_hit_left_px: OBSTACLE_HIT_LEFT_PX,
            character_clear_bottom_px: CHARACTER_CLEAR_BOTTOM_PX,

            jump_keys: Vec::new(),
            restart_key: "Space".to_string(),

            default_volume: DEFAULT_VOLUME,
        }
    }
}

impl GameConfig {
    /// Storage key for the JSON override
    pub const STORAGE_KEY: &'static str = "pipeJumpConfig";

    /// Whether `code` is bound to jump
    pub fn is_jump_key(&self, code: &str) -> bool {
        self.jump_keys.is_empty() || self.jump_keys.iter().any(|k| k == code)
    }

    /// Whether `code` is the restart key
    pub fn is_restart_key(&self, code: &str) -> bool {
        self.restart_key == code
    }

    /// Parse a JSON override, filling unspecified fields from the defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        config.sanitize();
        Ok(config)
    }

    /// Load from the store, falling back to defaults when absent or invalid
    pub fn load(store: &impl KeyValueStore) -> Self {
        let Some(json) = store.get(Self::STORAGE_KEY) else {
            log::debug!("No stored config, using defaults");
            return Self::default();
        };

        match Self::from_json(&json) {
            Ok(config) => {
                log::info!("Loaded config from storage");
                config
            }
            Err(e) => {
                log::warn!("Ignoring invalid stored config: {}", e);
                Self::default()
            }
        }
    }

    /// Periods outside 1..=MAX_PERIOD_MS fall back to their defaults
    fn sanitize(&mut self) {
        let defaults = Self::default();
        self.score_period_ms = period_or(self.score_period_ms, defaults.score_period_ms);
        self.collision_period_ms =
            period_or(self.collision_period_ms, defaults.collision_period_ms);
        self.jump_duration_ms = period_or(self.jump_duration_ms, defaults.jump_duration_ms);
        self.default_volume = if self.default_volume.is_finite() {
            self.default_volume.clamp(0.0, 1.0)
        } else {
            defaults.default_volume
        };
    }
}

fn period_or(period_ms: u64, default_ms: u64) -> u64 {
    if (1..=MAX_PERIOD_MS).contains(&period_ms) {
        period_ms
    } else {
        log::warn!("Period {}ms out of range, using {}ms", period_ms, default_ms);
        default_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_any_key_jumps_by_default() {
        let config = GameConfig::default();
        assert!(config.is_jump_key("ArrowUp"));
        assert!(config.is_jump_key("KeyQ"));
        assert!(config.is_restart_key("Space"));
        assert!(!config.is_restart_key("Enter"));
    }

    #[test]
    fn test_bound_jump_keys() {
        let config = GameConfig {
            jump_keys: vec!["ArrowUp".to_string(), "Space".to_string()],
            ..Default::default()
        };
        assert!(config.is_jump_key("Space"));
        assert!(!config.is_jump_key("KeyQ"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{"score_period_ms": 500}"#).unwrap();
        assert_eq!(config.score_period_ms, 500);
        assert_eq!(config.collision_period_ms, COLLISION_PERIOD_MS);
        assert_eq!(config.restart_key, "Space");
    }

    #[test]
    fn test_zero_periods_are_rejected() {
        let config =
            GameConfig::from_json(r#"{"collision_period_ms": 0, "default_volume": 3.0}"#).unwrap();
        assert_eq!(config.collision_period_ms, COLLISION_PERIOD_MS);
        assert_eq!(config.default_volume, 1.0);
    }

    #[test]
    fn test_oversized_periods_are_rejected() {
        let json = format!(
            r#"{{"jump_duration_ms": {}, "score_period_ms": 60001, "collision_period_ms": 60000}}"#,
            u64::MAX
        );
        let config = GameConfig::from_json(&json).unwrap();
        assert_eq!(config.jump_duration_ms, JUMP_DURATION_MS);
        assert_eq!(config.score_period_ms, SCORE_PERIOD_MS);
        assert_eq!(config.collision_period_ms, MAX_PERIOD_MS);
    }

    #[test]
    fn test_load_falls_back_on_garbage() {
        let mut store = MemoryStore::new();
        assert_eq!(GameConfig::load(&store), GameConfig::default());

        store.set(GameConfig::STORAGE_KEY, "{not json").unwrap();
        assert_eq!(GameConfig::load(&store), GameConfig::default());

        store
            .set(GameConfig::STORAGE_KEY, r#"{"jump_duration_ms": 650}"#)
            .unwrap();
        assert_eq!(GameConfig::load(&store).jump_duration_ms, 650);
    }
}
