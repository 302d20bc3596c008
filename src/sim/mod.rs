//! Game logic module
//!
//! Everything here is driven by virtual time and injected collaborators:
//! - Timers come from `Scheduler`, advanced by the host
//! - Positions come from a `PositionProvider`
//! - No DOM or platform dependencies

pub mod collision;
pub mod machine;
pub mod schedule;
pub mod score;
pub mod state;

pub use collision::{CollisionBounds, CollisionLoop, PositionProvider, PositionSample, is_collision};
pub use machine::Game;
pub use schedule::{Scheduler, TimerHandle};
pub use score::ScoreTracker;
pub use state::{GameEvent, GamePhase, GameSession};
