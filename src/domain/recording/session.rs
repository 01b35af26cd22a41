//! Capture session state machine

use std::fmt;
use thiserror::Error;

use crate::domain::audio::AudioChunk;

/// Capture states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureStatus {
    #[default]
    Idle,
    Recording,
    Paused,
}

impl CaptureStatus {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
        }
    }

    /// Label shown next to the take clock
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Recording => "Recording",
            Self::Paused => "Paused",
        }
    }

    /// Whether a take exists (recording or paused)
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Recording | Self::Paused)
    }
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while {current_state}")]
pub struct InvalidStateTransition {
    pub current_state: CaptureStatus,
    pub action: String,
}

/// What a finished take leaves behind once the session is closed
#[derive(Debug)]
pub struct FinishedTake {
    pub elapsed_seconds: u64,
    pub chunks: Vec<AudioChunk>,
}

/// Capture session entity.
///
/// State machine:
///   IDLE -> RECORDING (start)
///   RECORDING -> PAUSED (pause)
///   PAUSED -> RECORDING (resume)
///   RECORDING | PAUSED -> IDLE (finish)
///
/// `elapsed_seconds` only moves on `tick` while RECORDING.
#[derive(Debug, Default)]
pub struct CaptureSession {
    status: CaptureStatus,
    elapsed_seconds: u64,
    chunks: Vec<AudioChunk>,
}

impl CaptureSession {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> CaptureStatus {
        self.status
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.status == CaptureStatus::Idle
    }

    pub fn is_recording(&self) -> bool {
        self.status == CaptureStatus::Recording
    }

    pub fn is_paused(&self) -> bool {
        self.status == CaptureStatus::Paused
    }

    fn reject(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.status,
            action: action.to_string(),
        }
    }

    /// Check that a transition is allowed without performing it
    pub fn ensure(
        &self,
        allowed: &[CaptureStatus],
        action: &str,
    ) -> Result<(), InvalidStateTransition> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(self.reject(action))
        }
    }

    /// Transition from IDLE to RECORDING with a fresh clock and chunk list
    pub fn start(&mut self) -> Result<(), InvalidStateTransition> {
        self.ensure(&[CaptureStatus::Idle], "start recording")?;
        self.status = CaptureStatus::Recording;
        self.elapsed_seconds = 0;
        self.chunks.clear();
        Ok(())
    }

    /// Transition from RECORDING to PAUSED
    pub fn pause(&mut self) -> Result<(), InvalidStateTransition> {
        self.ensure(&[CaptureStatus::Recording], "pause")?;
        self.status = CaptureStatus::Paused;
        Ok(())
    }

    /// Transition from PAUSED to RECORDING
    pub fn resume(&mut self) -> Result<(), InvalidStateTransition> {
        self.ensure(&[CaptureStatus::Paused], "resume")?;
        self.status = CaptureStatus::Recording;
        Ok(())
    }

    /// Advance the take clock by one second.
    ///
    /// Returns false (and leaves the clock alone) unless RECORDING.
    pub fn tick(&mut self) -> bool {
        if self.status != CaptureStatus::Recording {
            return false;
        }
        self.elapsed_seconds += 1;
        true
    }

    /// Append a chunk delivered by the device. Dropped unless RECORDING.
    pub fn push_chunk(&mut self, chunk: AudioChunk) -> bool {
        if self.status != CaptureStatus::Recording {
            return false;
        }
        self.chunks.push(chunk);
        true
    }

    /// Close the take from RECORDING or PAUSED, back to IDLE with the clock reset
    pub fn finish(&mut self) -> Result<FinishedTake, InvalidStateTransition> {
        self.ensure(
            &[CaptureStatus::Recording, CaptureStatus::Paused],
            "stop recording",
        )?;
        let take = FinishedTake {
            elapsed_seconds: self.elapsed_seconds,
            chunks: std::mem::take(&mut self.chunks),
        };
        self.status = CaptureStatus::Idle;
        self.elapsed_seconds = 0;
        Ok(take)
    }
}
