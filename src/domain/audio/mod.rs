//! Audio value objects shared by capture and playback

mod audio_data;
mod chunk;
mod source;

pub use audio_data::{AudioData, AudioMimeType};
pub use chunk::AudioChunk;
pub use source::SourceHandle;
