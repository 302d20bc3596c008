//! Obstacle/character overlap detection
//!
//! The positions come from the presentation layer (CSS animations move the
//! sprites), so this is a sampler: every period it reads where the pipe and
//! the character currently are and checks the hit box. It fires once, then
//! cancels itself.

use serde::{Deserialize, Serialize};

use super::schedule::{Scheduler, TimerHandle};
use crate::config::GameConfig;
use crate::consts::*;

/// Screen positions read on one collision tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionSample {
    /// Obstacle's left offset within the board (px)
    pub obstacle_left_px: f64,
    /// Character's bottom offset within the board (px)
    pub character_bottom_px: f64,
}

impl PositionSample {
    pub fn new(obstacle_left_px: f64, character_bottom_px: f64) -> Self {
        Self {
            obstacle_left_px,
            character_bottom_px,
        }
    }
}

/// Source of position samples
pub trait PositionProvider {
    fn sample(&mut self) -> PositionSample;
}

impl<F: FnMut() -> PositionSample> PositionProvider for F {
    fn sample(&mut self) -> PositionSample {
        self()
    }
}

/// Hit box thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionBounds {
    pub hit_left_px: f64,
    pub clear_bottom_px: f64,
}

impl Default for CollisionBounds {
    fn default() -> Self {
        Self {
            hit_left_px: OBSTACLE_HIT_LEFT_PX,
            clear_bottom_px: CHARACTER_CLEAR_BOTTOM_PX,
        }
    }
}

impl From<&GameConfig> for CollisionBounds {
    fn from(config: &GameConfig) -> Self {
        Self {
            hit_left_px: config.obstacle_hit_left_px,
            clear_bottom_px: config.character_clear_bottom_px,
        }
    }
}

/// Check whether the obstacle has reached a grounded character.
///
/// `obstacle_left == 0` is excluded: the pipe sits at 0 while its animation
/// restarts, which is not a hit. NaN never collides.
#[inline]
pub fn is_collision(sample: &PositionSample, bounds: &CollisionBounds) -> bool {
    sample.obstacle_left_px > 0.0
        && sample.obstacle_left_px <= bounds.hit_left_px
        && sample.character_bottom_px < bounds.clear_bottom_px
}

/// Fixed-interval one-shot collision sampler
#[derive(Debug, Clone)]
pub struct CollisionLoop {
    bounds: CollisionBounds,
    period_ms: u64,
    timer: Option<TimerHandle>,
}

impl CollisionLoop {
    pub fn new(bounds: CollisionBounds, period_ms: u64) -> Self {
        Self {
            bounds,
            period_ms,
            timer: None,
        }
    }

    pub fn start(&mut self, scheduler: &mut Scheduler) {
        if self.timer.is_none() {
            self.timer = Some(scheduler.every(self.period_ms));
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn owns(&self, handle: TimerHandle) -> bool {
        self.timer == Some(handle)
    }

    /// Take one sample. On a hit the loop's timer is cancelled before the
    /// sample is returned, so it can never report twice.
    pub fn tick(
        &mut self,
        scheduler: &mut Scheduler,
        positions: &mut impl PositionProvider,
    ) -> Option<PositionSample> {
        let timer = self.timer?;
        let sample = positions.sample();
        if !is_collision(&sample, &self.bounds) {
            return None;
        }

        scheduler.cancel(timer);
        self.timer = None;
        Some(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hit(left: f64, bottom: f64) -> bool {
        is_collision(&PositionSample::new(left, bottom), &CollisionBounds::default())
    }

    #[test]
    fn test_predicate_cases() {
        assert!(hit(100.0, 50.0));
        assert!(!hit(150.0, 50.0));
        assert!(!hit(100.0, 90.0));
        assert!(!hit(0.0, 50.0));
    }

    #[test]
    fn test_predicate_edges() {
        // Upper left bound is inclusive, bottom bound exclusive
        assert!(hit(120.0, 0.0));
        assert!(!hit(120.01, 0.0));
        assert!(!hit(60.0, 80.0));
        assert!(hit(60.0, 79.9));
        assert!(hit(0.5, 0.0));
        assert!(!hit(-10.0, 0.0));
    }

    #[test]
    fn test_nan_never_collides() {
        assert!(!hit(f64::NAN, 0.0));
        assert!(!hit(100.0, f64::NAN));
    }

    #[test]
    fn test_loop_fires_once() {
        let mut scheduler = Scheduler::new();
        let mut collision = CollisionLoop::new(CollisionBounds::default(), 10);
        collision.start(&mut scheduler);

        let mut samples = 0;
        let mut positions = || {
            samples += 1;
            PositionSample::new(100.0, 0.0)
        };

        let mut hits = 0;
        while let Some(handle) = scheduler.poll(1000) {
            if collision.owns(handle) && collision.tick(&mut scheduler, &mut positions).is_some() {
                hits += 1;
            }
        }

        assert_eq!(hits, 1);
        assert_eq!(samples, 1);
        assert!(!collision.is_running());
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_miss_keeps_sampling() {
        let mut scheduler = Scheduler::new();
        let mut collision = CollisionLoop::new(CollisionBounds::default(), 10);
        collision.start(&mut scheduler);

        let mut positions = || PositionSample::new(400.0, 0.0);
        let mut ticks = 0;
        while let Some(handle) = scheduler.poll(100) {
            if collision.owns(handle) {
                assert!(collision.tick(&mut scheduler, &mut positions).is_none());
                ticks += 1;
            }
        }
        assert_eq!(ticks, 10);
        assert!(collision.is_running());
    }

    #[test]
    fn test_bounds_from_config() {
        let config = GameConfig {
            obstacle_hit_left_px: 60.0,
            ..Default::default()
        };
        let bounds = CollisionBounds::from(&config);
        assert!(!is_collision(&PositionSample::new(100.0, 0.0), &bounds));
        assert!(is_collision(&PositionSample::new(50.0, 0.0), &bounds));
    }

    proptest! {
        #[test]
        fn prop_airborne_never_collides(left in -500.0f64..1500.0, bottom in 80.0f64..400.0) {
            prop_assert!(!hit(left, bottom));
        }

        #[test]
        fn prop_far_obstacle_never_collides(left in 120.001f64..5000.0, bottom in -50.0f64..80.0) {
            prop_assert!(!hit(left, bottom));
        }

        #[test]
        fn prop_grounded_in_range_collides(left in 0.001f64..=120.0, bottom in -50.0f64..79.999) {
            prop_assert!(hit(left, bottom));
        }
    }
}
