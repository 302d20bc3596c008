//! Session state and the events it reports to the presentation layer

use serde::{Deserialize, Serialize};

use super::collision::PositionSample;
use super::score::ScoreTracker;

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Constructed, waiting for page load
    #[default]
    Idle,
    /// Obstacle moving, score counting
    Running,
    /// Hit the obstacle; waits for a restart
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "Idle",
            GamePhase::Running => "Running",
            GamePhase::GameOver => "GameOver",
        }
    }
}

/// One play-through, from load to game over
#[derive(Debug, Clone)]
pub struct GameSession {
    pub phase: GamePhase,
    pub score: ScoreTracker,
    /// Best score as last read from storage
    pub high_score: u64,
}

impl GameSession {
    pub fn new(score_period_ms: u64, high_score: u64) -> Self {
        Self {
            phase: GamePhase::Idle,
            score: ScoreTracker::new(score_period_ms),
            high_score,
        }
    }

    pub fn score(&self) -> u64 {
        self.score.current()
    }
}

/// Things the display needs to react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    ScoreChanged(u64),
    HighScoreChanged(u64),
    /// Restart control shown (true) or hidden (false)
    RestartVisible(bool),
    JumpStarted,
    JumpEnded,
    /// Stop the sprite animations where they were when the hit was sampled
    Frozen(PositionSample),
    GameOver { score: u64, new_record: bool },
}
