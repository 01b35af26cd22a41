//! Audio cue port for composer feedback
//!
//! Short tones played when a take starts, pauses, resumes, is sent or is discarded.

use async_trait::async_trait;
use thiserror::Error;

/// Types of audio cues that can be played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCueType {
    /// Ascending chime when a take starts
    RecordingStart,
    /// Single soft tone when a take is paused
    RecordingPause,
    /// Single brighter tone when a take resumes
    RecordingResume,
    /// Descending chime when a take is sent
    MessageSent,
    /// Double tap when a take is discarded
    RecordingDiscard,
}

/// Errors that can occur during audio cue playback
#[derive(Error, Debug)]
pub enum AudioCueError {
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),
}

/// Port trait for audio cue playback
#[async_trait]
pub trait AudioCue: Send + Sync {
    async fn play(&self, cue_type: AudioCueType) -> Result<(), AudioCueError>;
}

/// Blanket implementation for boxed cue types
#[async_trait]
impl AudioCue for Box<dyn AudioCue> {
    async fn play(&self, cue_type: AudioCueType) -> Result<(), AudioCueError> {
        self.as_ref().play(cue_type).await
    }
}
