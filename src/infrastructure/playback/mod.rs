//! Playback of finished takes

mod rodio_element;

pub use rodio_element::{RodioOutput, RodioPlaybackElement};
