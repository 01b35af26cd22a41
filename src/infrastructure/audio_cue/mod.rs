//! Audio cue adapters
//!
//! Short tones for take start, pause, resume, send and discard.

mod noop;
mod rodio;

pub use noop::NoOpAudioCue;
pub use rodio::RodioAudioCue;

use crate::application::ports::AudioCue;

/// Pick the cue adapter for the `audio_cues` setting
pub fn create_audio_cue(enabled: bool) -> Box<dyn AudioCue> {
    if enabled {
        Box::new(RodioAudioCue::new())
    } else {
        Box::new(NoOpAudioCue::new())
    }
}
