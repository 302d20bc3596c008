//! Pipe Jump - A browser endless-runner arcade game
//!
//! Core modules:
//! - `sim`: Tick-driven game logic (scheduler, score, collision, state machine)
//! - `persistence`: High score and volume storage over a string key-value store
//! - `audio`: Theme and end-effect playback
//! - `config`: Tunable game constants, loadable from storage
//! - `ui`: Input mapping and HUD text

pub mod audio;
pub mod config;
pub mod persistence;
pub mod sim;
pub mod ui;

pub use audio::{AudioController, SoundHandle, Track};
pub use config::GameConfig;
pub use persistence::{KeyValueStore, MemoryStore, Persistence, StorageError, VolumeSettings};
pub use sim::{Game, GameEvent, GamePhase, GameSession, PositionProvider, PositionSample};

/// Game configuration constants
pub mod consts {
    /// Score tick period (one point per second survived)
    pub const SCORE_PERIOD_MS: u64 = 1000;
    /// Collision sampling period
    pub const COLLISION_PERIOD_MS: u64 = 10;
    /// Length of the jump animation (matches the CSS `jump` keyframes)
    pub const JUMP_DURATION_MS: u64 = 500;
    /// Longest stretch of time a single advance will catch up on
    pub const MAX_ADVANCE_MS: u64 = 5000;
    /// Longest timer period or delay a stored config may ask for
    pub const MAX_PERIOD_MS: u64 = 60_000;

    /// Obstacle left offset at or below which it overlaps the character column
    pub const OBSTACLE_HIT_LEFT_PX: f64 = 120.0;
    /// Character bottom offset below which it is low enough to be hit
    pub const CHARACTER_CLEAR_BOTTOM_PX: f64 = 80.0;

    /// Volume used when nothing valid is stored
    pub const DEFAULT_VOLUME: f32 = 0.5;
}
