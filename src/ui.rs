//! Input mapping and HUD state
//!
//! Pure glue between browser events and the game: which key does what in
//! which phase, and what the score/high-score/restart widgets should show.

use crate::config::GameConfig;
use crate::sim::{GameEvent, GamePhase};

/// Raw input from the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// `keydown`, carrying `KeyboardEvent.code`
    KeyDown { code: String },
    /// Click on the restart control
    RestartActivated,
}

impl InputEvent {
    pub fn key(code: impl Into<String>) -> Self {
        InputEvent::KeyDown { code: code.into() }
    }
}

/// What an input means in the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Jump,
    Restart,
}

/// Resolve an input against the phase. Jumps only count while running;
/// restarts only after a game over.
pub fn map_input(phase: GamePhase, event: &InputEvent, config: &GameConfig) -> Option<Command> {
    match (phase, event) {
        (GamePhase::GameOver, InputEvent::RestartActivated) => Some(Command::Restart),
        (GamePhase::GameOver, InputEvent::KeyDown { code }) if config.is_restart_key(code) => {
            Some(Command::Restart)
        }
        (GamePhase::Running, InputEvent::KeyDown { code }) if config.is_jump_key(code) => {
            Some(Command::Jump)
        }
        _ => None,
    }
}

/// Score as shown on the HUD
pub fn format_score(score: u64) -> String {
    score.to_string()
}

/// High score as shown on the HUD
pub fn format_high_score(high_score: u64) -> String {
    format!("HI: {}", high_score)
}

/// Text and visibility of the HUD widgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub score_text: String,
    pub high_score_text: String,
    pub restart_visible: bool,
    pub jumping: bool,
    pub frozen: bool,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            score_text: format_score(0),
            high_score_text: format_high_score(0),
            restart_visible: false,
            jumping: false,
            frozen: false,
        }
    }
}

impl Hud {
    pub fn apply(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::ScoreChanged(score) => self.score_text = format_score(score),
            GameEvent::HighScoreChanged(best) => self.high_score_text = format_high_score(best),
            GameEvent::RestartVisible(visible) => self.restart_visible = visible,
            GameEvent::JumpStarted => self.jumping = true,
            GameEvent::JumpEnded => self.jumping = false,
            GameEvent::Frozen(_) => self.frozen = true,
            GameEvent::GameOver { .. } => {}
        }
    }

    pub fn apply_all<'a>(&mut self, events: impl IntoIterator<Item = &'a GameEvent>) {
        for event in events {
            self.apply(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::PositionSample;

    #[test]
    fn test_jump_only_while_running() {
        let config = GameConfig::default();
        let key = InputEvent::key("ArrowUp");
        assert_eq!(map_input(GamePhase::Running, &key, &config), Some(Command::Jump));
        assert_eq!(map_input(GamePhase::Idle, &key, &config), None);
        assert_eq!(map_input(GamePhase::GameOver, &key, &config), None);
    }

    #[test]
    fn test_restart_only_after_game_over() {
        let config = GameConfig::default();
        let space = InputEvent::key("Space");

        assert_eq!(
            map_input(GamePhase::GameOver, &space, &config),
            Some(Command::Restart)
        );
        assert_eq!(
            map_input(GamePhase::GameOver, &InputEvent::RestartActivated, &config),
            Some(Command::Restart)
        );
        // Space while running is just a jump
        assert_eq!(map_input(GamePhase::Running, &space, &config), Some(Command::Jump));
        assert_eq!(
            map_input(GamePhase::Running, &InputEvent::RestartActivated, &config),
            None
        );
    }

    #[test]
    fn test_unbound_key_ignored() {
        let config = GameConfig {
            jump_keys: vec!["ArrowUp".to_string()],
            ..Default::default()
        };
        assert_eq!(
            map_input(GamePhase::Running, &InputEvent::key("KeyZ"), &config),
            None
        );
    }

    #[test]
    fn test_hud_follows_events() {
        let mut hud = Hud::default();
        hud.apply_all(&[
            GameEvent::ScoreChanged(0),
            GameEvent::RestartVisible(false),
            GameEvent::HighScoreChanged(12),
            GameEvent::JumpStarted,
            GameEvent::ScoreChanged(7),
        ]);
        assert_eq!(hud.score_text, "7");
        assert_eq!(hud.high_score_text, "HI: 12");
        assert!(hud.jumping);
        assert!(!hud.restart_visible);

        hud.apply_all(&[
            GameEvent::Frozen(PositionSample::new(90.0, 10.0)),
            GameEvent::GameOver {
                score: 7,
                new_record: false,
            },
            GameEvent::RestartVisible(true),
        ]);
        assert!(hud.frozen);
        assert!(hud.restart_visible);
    }
}
