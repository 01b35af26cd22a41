//! Recording entry entity

use super::PlaybackSpeed;
use crate::domain::audio::SourceHandle;

/// A committed take. Only `speed` and `current_time` change after creation.
#[derive(Debug)]
pub struct RecordingEntry {
    source: SourceHandle,
    speed: PlaybackSpeed,
    duration_seconds: u64,
    current_time: f64,
}

impl RecordingEntry {
    /// A freshly committed take: 1x, positioned at the start
    pub fn new(source: SourceHandle, duration_seconds: u64) -> Self {
        Self {
            source,
            speed: PlaybackSpeed::default(),
            duration_seconds,
            current_time: 0.0,
        }
    }

    pub fn source(&self) -> &SourceHandle {
        &self.source
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    /// Last reported playback position in seconds (advisory)
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub(crate) fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
    }

    pub(crate) fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds.max(0.0);
    }
}
