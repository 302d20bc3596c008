//! Audio playback for the theme loop and the game-over effect
//!
//! Playback is fire-and-forget: a rejected `play()` (autoplay policy, missing
//! file) is logged and otherwise ignored.

use crate::persistence::VolumeSettings;

/// The two sounds the game uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    /// Background theme, looping while running
    Theme,
    /// One-shot effect on game over
    End,
}

impl Track {
    /// Storage key holding this track's volume
    pub fn volume_key(&self) -> &'static str {
        match self {
            Track::Theme => "themeVolume",
            Track::End => "endVolume",
        }
    }
}

/// A playable sound
pub trait SoundHandle {
    /// Start playback from the current position
    fn play(&mut self);
    fn pause(&mut self);
    /// Move the playback position back to the start
    fn rewind(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
}

/// In-memory sound that only records what was asked of it (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemorySound {
    pub playing: bool,
    pub plays: u32,
    pub rewinds: u32,
    volume: f32,
}

impl SoundHandle for MemorySound {
    fn play(&mut self) {
        self.playing = true;
        self.plays += 1;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn rewind(&mut self) {
        self.rewinds += 1;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn volume(&self) -> f32 {
        self.volume
    }
}

/// Owns both sound handles
#[derive(Debug)]
pub struct AudioController<A> {
    theme: A,
    end: A,
}

impl<A: SoundHandle> AudioController<A> {
    pub fn new(theme: A, end: A) -> Self {
        Self { theme, end }
    }

    fn handle(&mut self, track: Track) -> &mut A {
        match track {
            Track::Theme => &mut self.theme,
            Track::End => &mut self.end,
        }
    }

    pub fn play(&mut self, track: Track) {
        self.handle(track).play();
    }

    /// Pause and reset to the start
    pub fn stop_and_rewind(&mut self, track: Track) {
        let handle = self.handle(track);
        handle.pause();
        handle.rewind();
    }

    /// Set volume (clamped to 0.0 - 1.0)
    pub fn set_volume(&mut self, track: Track, volume: f32) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.handle(track).set_volume(volume);
    }

    pub fn volume(&self, track: Track) -> f32 {
        match track {
            Track::Theme => self.theme.volume(),
            Track::End => self.end.volume(),
        }
    }

    pub fn apply_volumes(&mut self, volumes: VolumeSettings) {
        self.set_volume(Track::Theme, volumes.theme);
        self.set_volume(Track::End, volumes.end);
    }

    /// Current volumes of both tracks
    pub fn volumes(&self) -> VolumeSettings {
        VolumeSettings {
            theme: self.volume(Track::Theme),
            end: self.volume(Track::End),
        }
    }

    pub fn sound(&self, track: Track) -> &A {
        match track {
            Track::Theme => &self.theme,
            Track::End => &self.end,
        }
    }
}

/// `<audio>` element playback (WASM only)
#[cfg(target_arch = "wasm32")]
pub mod web {
    use web_sys::HtmlAudioElement;

    use super::SoundHandle;

    pub struct ElementSound {
        element: HtmlAudioElement,
    }

    impl ElementSound {
        pub fn new(element: HtmlAudioElement) -> Self {
            Self { element }
        }

        /// Load a sound file that isn't in the page markup
        pub fn from_url(url: &str) -> Option<Self> {
            match HtmlAudioElement::new_with_src(url) {
                Ok(element) => Some(Self::new(element)),
                Err(e) => {
                    log::warn!("Failed to create audio for {}: {:?}", url, e);
                    None
                }
            }
        }
    }

    impl SoundHandle for ElementSound {
        fn play(&mut self) {
            // The returned promise rejects under autoplay restrictions; nothing to retry
            if let Err(e) = self.element.play() {
                log::warn!("Audio play failed: {:?}", e);
            }
        }

        fn pause(&mut self) {
            if let Err(e) = self.element.pause() {
                log::warn!("Audio pause failed: {:?}", e);
            }
        }

        fn rewind(&mut self) {
            self.element.set_current_time(0.0);
        }

        fn set_volume(&mut self, volume: f32) {
            self.element.set_volume(volume as f64);
        }

        fn volume(&self) -> f32 {
            self.element.volume() as f32
        }
    }
}
