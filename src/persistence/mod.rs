//! High score and volume persistence
//!
//! Everything lives in a flat string-keyed store (LocalStorage on web).
//! Missing or corrupt values fall back to defaults instead of erroring:
//! - `highScore` -> 0
//! - `themeVolume` / `endVolume` -> 0.5, clamped to [0, 1]

#[cfg(target_arch = "wasm32")]
pub mod web;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::Track;
use crate::consts::DEFAULT_VOLUME;

/// Storage key for the best score
pub const HIGH_SCORE_KEY: &str = "highScore";

/// Failure to write to the backing store
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store refused the write (quota, private mode, ...)
    #[error("store rejected write of `{key}`: {reason}")]
    WriteRejected { key: String, reason: String },
    /// No store is reachable at all
    #[error("storage unavailable")]
    Unavailable,
}

/// A flat string key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Volume levels for both tracks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeSettings {
    pub theme: f32,
    pub end: f32,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            theme: DEFAULT_VOLUME,
            end: DEFAULT_VOLUME,
        }
    }
}

impl VolumeSettings {
    pub fn get(&self, track: Track) -> f32 {
        match track {
            Track::Theme => self.theme,
            Track::End => self.end,
        }
    }

    pub fn set(&mut self, track: Track, volume: f32) {
        match track {
            Track::Theme => self.theme = volume,
            Track::End => self.end = volume,
        }
    }
}

/// Typed access to the game's persisted values
#[derive(Debug)]
pub struct Persistence<S> {
    store: S,
    default_volume: f32,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self::with_default_volume(store, DEFAULT_VOLUME)
    }

    pub fn with_default_volume(store: S, default_volume: f32) -> Self {
        Self {
            store,
            default_volume,
        }
    }

    /// Stored best score (0 if unset or unparseable)
    pub fn high_score(&self) -> u64 {
        match self.store.get(HIGH_SCORE_KEY) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Corrupt high score {:?}, treating as 0", raw);
                0
            }),
            None => 0,
        }
    }

    pub fn set_high_score(&mut self, score: u64) {
        self.write(HIGH_SCORE_KEY, &score.to_string());
    }

    /// Persist `score` if it beats the stored best. Returns true on a new record.
    pub fn record_score(&mut self, score: u64) -> bool {
        let best = self.high_score();
        if score > best {
            self.set_high_score(score);
            log::info!("New high score: {} (was {})", score, best);
            true
        } else {
            false
        }
    }

    /// Stored volume for a track, clamped to [0, 1]
    pub fn volume(&self, track: Track) -> f32 {
        let key = track.volume_key();
        let Some(raw) = self.store.get(key) else {
            return self.default_volume;
        };
        match raw.trim().parse::<f32>() {
            Ok(v) if v.is_finite() => v.clamp(0.0, 1.0),
            _ => {
                log::warn!("Corrupt volume {:?} for {}, using default", raw, key);
                self.default_volume
            }
        }
    }

    pub fn set_volume(&mut self, track: Track, volume: f32) {
        self.write(track.volume_key(), &volume.to_string());
    }

    pub fn volumes(&self) -> VolumeSettings {
        VolumeSettings {
            theme: self.volume(Track::Theme),
            end: self.volume(Track::End),
        }
    }

    pub fn save_volumes(&mut self, volumes: VolumeSettings) {
        self.set_volume(Track::Theme, volumes.theme);
        self.set_volume(Track::End, volumes.end);
        log::debug!("Volumes saved ({:?})", volumes);
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            log::warn!("Failed to persist {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store that rejects every write
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::WriteRejected {
                key: key.to_string(),
                reason: "read only".to_string(),
            })
        }
    }

    fn store_with(key: &str, value: &str) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.set(key, value).unwrap();
        store
    }

    #[test]
    fn test_high_score_defaults() {
        assert_eq!(Persistence::new(MemoryStore::new()).high_score(), 0);
        assert_eq!(Persistence::new(store_with(HIGH_SCORE_KEY, "abc")).high_score(), 0);
        assert_eq!(Persistence::new(store_with(HIGH_SCORE_KEY, "-4")).high_score(), 0);
        assert_eq!(Persistence::new(store_with(HIGH_SCORE_KEY, "17")).high_score(), 17);
    }

    #[test]
    fn test_record_score_only_raises() {
        let mut persistence = Persistence::new(store_with(HIGH_SCORE_KEY, "10"));

        assert!(persistence.record_score(42));
        assert_eq!(persistence.high_score(), 42);

        assert!(!persistence.record_score(5));
        assert_eq!(persistence.high_score(), 42);

        // Ties are not a new record
        assert!(!persistence.record_score(42));
    }

    #[test]
    fn test_record_score_keeps_higher_stored() {
        let mut persistence = Persistence::new(store_with(HIGH_SCORE_KEY, "10"));
        assert!(!persistence.record_score(5));
        assert_eq!(persistence.store().get(HIGH_SCORE_KEY).as_deref(), Some("10"));
    }

    #[test]
    fn test_volume_defaults_and_clamping() {
        let persistence = Persistence::new(MemoryStore::new());
        assert_eq!(persistence.volume(Track::Theme), 0.5);
        assert_eq!(persistence.volume(Track::End), 0.5);

        let persistence = Persistence::new(store_with("themeVolume", "1.7"));
        assert_eq!(persistence.volume(Track::Theme), 1.0);

        let persistence = Persistence::new(store_with("endVolume", "-0.2"));
        assert_eq!(persistence.volume(Track::End), 0.0);

        let persistence = Persistence::new(store_with("endVolume", "NaN"));
        assert_eq!(persistence.volume(Track::End), 0.5);

        let persistence = Persistence::new(store_with("themeVolume", "loud"));
        assert_eq!(persistence.volume(Track::Theme), 0.5);
    }

    #[test]
    fn test_volume_round_trip() {
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence.save_volumes(VolumeSettings {
            theme: 0.3,
            end: 0.8,
        });

        let reopened = Persistence::new(persistence.into_store());
        let volumes = reopened.volumes();
        assert!((volumes.theme - 0.3).abs() < f32::EPSILON);
        assert!((volumes.end - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_write_failures_are_swallowed() {
        let mut persistence = Persistence::new(ReadOnlyStore);
        assert!(persistence.record_score(3));
        persistence.set_volume(Track::Theme, 0.2);
        assert_eq!(persistence.high_score(), 0);
    }
}
