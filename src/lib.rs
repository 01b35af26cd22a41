//! voice-composer - terminal voice-message composer
//!
//! Records microphone audio in takes that can be paused, resumed, discarded
//! or sent, and replays sent messages at 1x, 1.5x or 2x.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Capture session state machine, playback entries, value objects and errors
//! - **Application**: Session controller, playback registry and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal capture, rodio playback, TOML config)
//! - **CLI**: Command-line interface, interactive composer and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
