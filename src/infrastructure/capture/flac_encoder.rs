//! FLAC encoding of finished takes
//!
//! Mono, 16-bit, at whatever rate the microphone delivered.

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::config;
use flacenc::error::Verify;
use flacenc::source::MemSource;

use crate::domain::audio::{AudioData, AudioMimeType};

const BITS_PER_SAMPLE: usize = 16;

const CHANNELS: usize = 1;

/// FLAC encoding errors
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("FLAC config error: {0}")]
    Config(String),

    #[error("FLAC encoding failed: {0}")]
    Encode(String),

    #[error("FLAC write failed: {0}")]
    Write(String),

    #[error("Unsupported sample rate: {0} Hz")]
    SampleRate(u32),
}

/// Encode mono PCM samples into a playable FLAC take
pub fn encode_take(pcm_samples: &[i16], sample_rate: u32) -> Result<AudioData, EncodingError> {
    if sample_rate == 0 {
        return Err(EncodingError::SampleRate(sample_rate));
    }

    let samples_i32: Vec<i32> = pcm_samples.iter().map(|&s| s as i32).collect();

    let config = config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| EncodingError::Config(format!("{:?}", e)))?;

    let source = MemSource::from_samples(
        &samples_i32,
        CHANNELS,
        BITS_PER_SAMPLE,
        sample_rate as usize,
    );

    let flac_stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| EncodingError::Encode(format!("{:?}", e)))?;

    let mut sink = ByteSink::new();
    flac_stream
        .write(&mut sink)
        .map_err(|e| EncodingError::Write(e.to_string()))?;

    Ok(AudioData::new(sink.into_inner(), AudioMimeType::Flac))
}
