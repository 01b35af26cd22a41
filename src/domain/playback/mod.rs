//! Playback domain: committed takes and their replay speed

mod entry;
mod speed;

pub use entry::RecordingEntry;
pub use speed::PlaybackSpeed;
