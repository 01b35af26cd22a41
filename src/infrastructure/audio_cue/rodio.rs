//! Synthesized composer cues played through rodio

use std::time::Duration;

use async_trait::async_trait;
use rodio::source::{SineWave, Source, Zero};
use rodio::{OutputStream, Sink};

use crate::application::ports::{AudioCue, AudioCueError, AudioCueType};

const AMPLITUDE: f32 = 0.3;

/// Musical notes used by the cues, in Hz
const G4: f32 = 392.0;
const C5: f32 = 523.0;
const E5: f32 = 659.0;
const G5: f32 = 784.0;

pub struct RodioAudioCue;

impl RodioAudioCue {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RodioAudioCue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioCue for RodioAudioCue {
    async fn play(&self, cue_type: AudioCueType) -> Result<(), AudioCueError> {
        tokio::task::spawn_blocking(move || play_blocking(cue_type))
            .await
            .map_err(|e| AudioCueError::PlaybackFailed(format!("Task join error: {}", e)))?
    }
}

/// (frequency, milliseconds) steps for a cue; a zero frequency is a rest
fn pattern(cue_type: AudioCueType) -> &'static [(f32, u64)] {
    match cue_type {
        AudioCueType::RecordingStart => &[(C5, 80), (E5, 120)],
        AudioCueType::RecordingPause => &[(E5, 90)],
        AudioCueType::RecordingResume => &[(G5, 90)],
        AudioCueType::MessageSent => &[(E5, 80), (C5, 120)],
        AudioCueType::RecordingDiscard => &[(G4, 60), (0.0, 40), (G4, 60)],
    }
}

fn tone(freq: f32, duration_ms: u64) -> impl Source<Item = f32> + Send {
    let fade_ms = (duration_ms / 5).min(30);
    SineWave::new(freq)
        .take_duration(Duration::from_millis(duration_ms))
        .fade_in(Duration::from_millis(fade_ms))
        .amplify(AMPLITUDE)
}

fn play_blocking(cue_type: AudioCueType) -> Result<(), AudioCueError> {
    let (_stream, handle) = OutputStream::try_default()
        .map_err(|e| AudioCueError::DeviceNotAvailable(e.to_string()))?;
    let sink = Sink::try_new(&handle).map_err(|e| AudioCueError::PlaybackFailed(e.to_string()))?;

    for &(freq, duration_ms) in pattern(cue_type) {
        if freq > 0.0 {
            sink.append(tone(freq, duration_ms));
        } else {
            let rest = Duration::from_millis(duration_ms);
            sink.append(Zero::<f32>::new(1, 44100).take_duration(rest));
        }
    }

    sink.sleep_until_end();
    Ok(())
}
