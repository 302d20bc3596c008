//! Game lifecycle: Idle -> Running -> GameOver -> (restart) Running
//!
//! `Game` owns the session, the scheduler and every collaborator. The host
//! feeds it elapsed time and input, then drains `GameEvent`s to update the
//! page. Restarting consumes the game and builds a fresh one from the same
//! collaborators, the same way a page reload would.

use super::collision::{CollisionBounds, CollisionLoop, PositionProvider, PositionSample};
use super::schedule::{Scheduler, TimerHandle};
use super::state::{GameEvent, GamePhase, GameSession};
use crate::audio::{AudioController, SoundHandle, Track};
use crate::config::GameConfig;
use crate::consts::MAX_ADVANCE_MS;
use crate::persistence::{KeyValueStore, Persistence};
use crate::ui::{Command, InputEvent, map_input};

pub struct Game<P, S, A> {
    config: GameConfig,
    session: GameSession,
    scheduler: Scheduler,
    collision: CollisionLoop,
    jump_timer: Option<TimerHandle>,
    positions: P,
    audio: AudioController<A>,
    persistence: Persistence<S>,
    events: Vec<GameEvent>,
}

impl<P, S, A> Game<P, S, A>
where
    P: PositionProvider,
    S: KeyValueStore,
    A: SoundHandle,
{
    /// Build an idle game. Stored volumes are applied to the audio right away.
    pub fn new(config: GameConfig, positions: P, store: S, mut audio: AudioController<A>) -> Self {
        let persistence = Persistence::with_default_volume(store, config.default_volume);
        audio.apply_volumes(persistence.volumes());

        let session = GameSession::new(config.score_period_ms, persistence.high_score());
        let collision = CollisionLoop::new(CollisionBounds::from(&config), config.collision_period_ms);

        Self {
            config,
            session,
            scheduler: Scheduler::new(),
            collision,
            jump_timer: None,
            positions,
            audio,
            persistence,
            events: Vec::new(),
        }
    }

    /// Idle -> Running (page load)
    pub fn start(&mut self) {
        if self.session.phase != GamePhase::Idle {
            log::debug!("Ignoring start in {}", self.session.phase.as_str());
            return;
        }

        self.session.phase = GamePhase::Running;
        self.collision.start(&mut self.scheduler);
        self.session.score.start(&mut self.scheduler);
        self.emit(GameEvent::ScoreChanged(0));
        self.emit(GameEvent::RestartVisible(false));

        self.audio.play(Track::Theme);

        self.session.high_score = self.persistence.high_score();
        self.emit(GameEvent::HighScoreChanged(self.session.high_score));

        log::info!("Game started (high score {})", self.session.high_score);
    }

    /// Advance virtual time, firing every timer that comes due
    pub fn advance(&mut self, elapsed_ms: u64) {
        let target = self
            .scheduler
            .now_ms()
            .saturating_add(elapsed_ms.min(MAX_ADVANCE_MS));
        while let Some(handle) = self.scheduler.poll(target) {
            self.dispatch(handle);
        }
        self.scheduler.settle(target);
    }

    fn dispatch(&mut self, handle: TimerHandle) {
        if self.collision.owns(handle) {
            if let Some(sample) = self.collision.tick(&mut self.scheduler, &mut self.positions) {
                self.game_over(sample);
            }
        } else if self.session.score.owns(handle) {
            if self.session.phase != GamePhase::Running {
                return;
            }
            if let Some(score) = self.session.score.on_tick() {
                self.emit(GameEvent::ScoreChanged(score));
            }
        } else if self.jump_timer == Some(handle) {
            self.jump_timer = None;
            self.emit(GameEvent::JumpEnded);
        }
    }

    /// Running -> GameOver. Only the first call per session has any effect.
    fn game_over(&mut self, sample: PositionSample) {
        if self.session.phase != GamePhase::Running {
            log::debug!("Ignoring collision in {}", self.session.phase.as_str());
            return;
        }
        self.session.phase = GamePhase::GameOver;
        self.emit(GameEvent::Frozen(sample));

        self.session.score.stop(&mut self.scheduler);
        if let Some(timer) = self.jump_timer.take() {
            self.scheduler.cancel(timer);
        }

        self.audio.stop_and_rewind(Track::Theme);
        self.audio.play(Track::End);

        let score = self.session.score();
        let new_record = self.persistence.record_score(score);
        self.session.high_score = self.persistence.high_score();

        self.emit(GameEvent::GameOver { score, new_record });
        self.emit(GameEvent::RestartVisible(true));
        self.emit(GameEvent::HighScoreChanged(self.session.high_score));

        log::info!(
            "Game over: score {} at obstacle {:.0}px / character {:.0}px",
            score,
            sample.obstacle_left_px,
            sample.character_bottom_px
        );
    }

    /// Handle a key or click. Jumps are applied here; a restart is handed back
    /// to the host, which either reloads the page or calls [`Game::restart`].
    pub fn handle_input(&mut self, event: &InputEvent) -> Option<Command> {
        let command = map_input(self.session.phase, event, &self.config);
        match command {
            Some(Command::Jump) => self.jump().then_some(Command::Jump),
            Some(Command::Restart) => Some(Command::Restart),
            None => {
                log::debug!("Ignoring {:?} in {}", event, self.session.phase.as_str());
                None
            }
        }
    }

    /// Start the jump animation unless one is already playing
    fn jump(&mut self) -> bool {
        if self.jump_timer.is_some() {
            return false;
        }
        self.jump_timer = Some(self.scheduler.after(self.config.jump_duration_ms));
        self.emit(GameEvent::JumpStarted);
        true
    }

    /// Change a track's volume; it is saved when the session ends
    pub fn set_volume(&mut self, track: Track, volume: f32) {
        self.audio.set_volume(track, volume);
    }

    /// Write back state that is only saved on exit (page unload)
    pub fn end_session(&mut self) {
        let volumes = self.audio.volumes();
        self.persistence.save_volumes(volumes);
    }

    /// GameOver -> Running with a brand-new session. Outside GameOver the game
    /// is returned unchanged.
    pub fn restart(mut self) -> Self {
        if self.session.phase != GamePhase::GameOver {
            log::debug!("Ignoring restart in {}", self.session.phase.as_str());
            return self;
        }

        self.end_session();
        let config = self.config.clone();
        let (positions, store, mut audio) = self.into_parts();
        audio.stop_and_rewind(Track::End);

        let mut game = Self::new(config, positions, store, audio);
        game.start();
        log::info!("Game restarted");
        game
    }

    pub fn into_parts(self) -> (P, S, AudioController<A>) {
        (self.positions, self.persistence.into_store(), self.audio)
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take everything emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    pub fn score(&self) -> u64 {
        self.session.score()
    }

    pub fn high_score(&self) -> u64 {
        self.session.high_score
    }


    pub fn is_jumping(&self) -> bool {
        self.jump_timer.is_some()
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn audio(&self) -> &AudioController<A> {
        &self.audio
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn positions_mut(&mut self) -> &mut P {
        &mut self.positions
    }
}
