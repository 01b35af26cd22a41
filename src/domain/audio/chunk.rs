//! Raw fragments streamed by the capture device while a take is live

/// One opaque fragment of captured audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    bytes: Vec<u8>,
}

impl AudioChunk {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Build a chunk from mono PCM samples (little-endian i16)
    pub fn from_pcm(samples: &[i16]) -> Self {
        Self {
            bytes: samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
