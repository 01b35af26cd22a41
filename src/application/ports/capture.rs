//! Capture device port interface

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::audio::{AudioChunk, SourceHandle};

/// Capture device errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// Permission denied or no input hardware
    #[error("Microphone unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Capture stream failed: {0}")]
    StreamFailed(String),

    #[error("No capture stream is open")]
    NotOpen,

    #[error("Failed to encode take: {0}")]
    EncodeFailed(String),

    #[error("No audio data captured")]
    Empty,
}

/// Sender the device pushes live chunks into while a take is active
pub type ChunkSender = mpsc::UnboundedSender<AudioChunk>;

/// Port for the microphone.
///
/// One stream per take: `open` acquires the microphone, `start`/`pause`/
/// `resume` drive it, and `stop` tears it down and hands over the finished,
/// encoded take.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Acquire the microphone. Suspends until access is granted or denied.
    async fn open(&self, chunks: ChunkSender) -> Result<(), CaptureError>;

    /// Begin streaming on an opened device
    async fn start(&self) -> Result<(), CaptureError>;

    async fn pause(&self) -> Result<(), CaptureError>;

    async fn resume(&self) -> Result<(), CaptureError>;

    /// Stop streaming (pausing first if needed) and deliver the finished take
    async fn stop(&self) -> Result<SourceHandle, CaptureError>;
}

/// Blanket implementation for boxed capture devices
#[async_trait]
impl CaptureDevice for Box<dyn CaptureDevice> {
    async fn open(&self, chunks: ChunkSender) -> Result<(), CaptureError> {
        self.as_ref().open(chunks).await
    }

    async fn start(&self) -> Result<(), CaptureError> {
        self.as_ref().start().await
    }

    async fn pause(&self) -> Result<(), CaptureError> {
        self.as_ref().pause().await
    }

    async fn resume(&self) -> Result<(), CaptureError> {
        self.as_ref().resume().await
    }

    async fn stop(&self) -> Result<SourceHandle, CaptureError> {
        self.as_ref().stop().await
    }
}
