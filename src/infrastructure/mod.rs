//! Infrastructure layer - Adapter implementations
//!
//! Concrete implementations of the port interfaces: microphone capture
//! through cpal, playback and cues through rodio, and the TOML config file.

pub mod audio_cue;
pub mod capture;
pub mod config;
pub mod playback;

// Re-export adapters
pub use audio_cue::{create_audio_cue, NoOpAudioCue, RodioAudioCue};
pub use capture::{create_capture_device, CpalCaptureDevice};
pub use config::XdgConfigStore;
pub use playback::{RodioOutput, RodioPlaybackElement};
