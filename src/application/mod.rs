//! Application layer - Use cases and port interfaces
//!
//! Contains the session controller, the playback registry and the trait
//! definitions for the microphone, players, cues and config storage.

pub mod composer;
pub mod ports;
pub mod registry;

// Re-export use cases
pub use composer::{
    CaptureSnapshot, ComposerConfig, ComposerError, DiscardOutcome, SessionController,
};
pub use registry::{format_duration, PlaybackRegistry, RegistryError, SharedRegistry};
