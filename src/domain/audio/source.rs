//! Playable handle to a finished take

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::AudioData;

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// The playable resource produced by the capture device when a take stops.
///
/// Deliberately not `Clone`: a handle is moved into exactly one recording
/// entry and lives as long as that entry. Playback elements only borrow it.
pub struct SourceHandle {
    id: u64,
    audio: AudioData,
}

impl SourceHandle {
    /// Wrap encoded audio, minting a process-unique id
    pub fn new(audio: AudioData) -> Self {
        Self {
            id: NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed),
            audio,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn audio(&self) -> &AudioData {
        &self.audio
    }

    /// Playable `data:` URL for the take, encoded on each call
    pub fn url(&self) -> String {
        self.audio.to_data_url()
    }
}

impl fmt::Debug for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceHandle")
            .field("id", &self.id)
            .field("mime_type", &self.audio.mime_type())
            .field("size", &self.audio.human_readable_size())
            .finish()
    }
}
