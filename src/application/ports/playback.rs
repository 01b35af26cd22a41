//! Playback element port interface

use thiserror::Error;

use crate::domain::audio::SourceHandle;

/// Playback element errors
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("Audio output not available: {0}")]
    DeviceNotAvailable(String),

    #[error("Failed to decode source: {0}")]
    DecodeFailed(String),

    #[error("No source loaded")]
    NoSource,

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Port for a live player bound to one recording entry.
///
/// Methods are synchronous: players are expected to hand work to their own
/// audio thread and return immediately.
pub trait PlaybackElement: Send + Sync {
    /// Point the element at a take. Any current playback is stopped.
    fn load(&self, source: &SourceHandle) -> Result<(), PlaybackError>;

    /// Set the playback rate multiplier
    fn set_rate(&self, rate: f32);

    /// Current playback rate multiplier
    fn rate(&self) -> f32;

    /// Start playing from the beginning of the loaded source
    fn play(&self) -> Result<(), PlaybackError>;

    /// Stop playback
    fn stop(&self);

    /// Position within the source in seconds
    fn position_secs(&self) -> f64;
}
