//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod audio;
pub mod config;
pub mod error;
pub mod playback;
pub mod recording;

// Re-export common types
pub use audio::{AudioChunk, AudioData, AudioMimeType, SourceHandle};
pub use config::AppConfig;
pub use error::*;
pub use playback::{PlaybackSpeed, RecordingEntry};
pub use recording::{
    format_duration, CaptureSession, CaptureStatus, DiscardPolicy, Duration,
    InvalidStateTransition,
};
