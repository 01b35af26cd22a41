//! Microphone capture device using cpal
//!
//! `cpal::Stream` is not `Send`, so each take's stream lives on its own
//! thread and is driven over a command channel. Samples are mixed down to
//! mono i16, streamed out as chunks, and buffered for the final FLAC take.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use tokio::sync::oneshot;

use super::flac_encoder::encode_take;
use crate::application::ports::{CaptureDevice, CaptureError, ChunkSender};
use crate::domain::audio::{AudioChunk, SourceHandle};

type Reply = oneshot::Sender<Result<(), CaptureError>>;

enum StreamCommand {
    Play(Reply),
    Pause(Reply),
    Close(Reply),
}

/// Handle to the thread owning the current take's stream
struct OpenStream {
    commands: std_mpsc::Sender<StreamCommand>,
    sample_rate: u32,
}

/// Sample sink shared with the cpal data callback
struct CaptureSink {
    buffer: Arc<StdMutex<Vec<i16>>>,
    capturing: Arc<AtomicBool>,
    chunks: ChunkSender,
    channels: u16,
}

impl CaptureSink {
    fn push(&self, samples: &[i16]) {
        if !self.capturing.load(Ordering::SeqCst) {
            return;
        }
        let mono = CpalCaptureDevice::to_mono(samples, self.channels);
        // The receiver goes away once the take is closed
        let _ = self.chunks.send(AudioChunk::from_pcm(&mono));
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.extend_from_slice(&mono);
        }
    }
}

/// Default-input-device microphone
pub struct CpalCaptureDevice {
    /// Mono samples of the current take at the device rate
    buffer: Arc<StdMutex<Vec<i16>>>,
    capturing: Arc<AtomicBool>,
    stream: StdMutex<Option<OpenStream>>,
}

impl CpalCaptureDevice {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(StdMutex::new(Vec::new())),
            capturing: Arc::new(AtomicBool::new(false)),
            stream: StdMutex::new(None),
        }
    }

    fn stream_guard(&self) -> MutexGuard<'_, Option<OpenStream>> {
        self.stream.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Average interleaved channels down to mono
    fn to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels <= 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / frame.len() as i32) as i16
            })
            .collect()
    }

    /// Build (but do not start) an input stream on the default device.
    /// Returns the stream and its sample rate.
    fn build_stream(
        buffer: Arc<StdMutex<Vec<i16>>>,
        capturing: Arc<AtomicBool>,
        chunks: ChunkSender,
    ) -> Result<(cpal::Stream, u32), CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| CaptureError::DeviceUnavailable("no input device found".into()))?;

        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
        let sample_rate = supported.sample_rate().0;
        let sample_format = supported.sample_format();
        let config = supported.config();

        let sink = CaptureSink {
            buffer,
            capturing,
            chunks,
            channels: config.channels,
        };

        let stream = match sample_format {
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| sink.push(data),
                |err| log::error!("Audio stream error: {}", err),
                None,
            ),
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let pcm: Vec<i16> = data.iter().map(|&s| (s * 32767.0) as i16).collect();
                    sink.push(&pcm);
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            ),
            other => {
                return Err(CaptureError::DeviceUnavailable(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        }
        .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        log::debug!(
            "Opened input stream: {} Hz, {} channel(s), {:?}",
            sample_rate,
            config.channels,
            sample_format
        );
        Ok((stream, sample_rate))
    }

    /// Body of the stream thread: own the stream until told to close
    fn run_stream(
        buffer: Arc<StdMutex<Vec<i16>>>,
        capturing: Arc<AtomicBool>,
        chunks: ChunkSender,
        commands: std_mpsc::Receiver<StreamCommand>,
        ready: oneshot::Sender<Result<u32, CaptureError>>,
    ) {
        let stream = match Self::build_stream(buffer, Arc::clone(&capturing), chunks) {
            Ok((stream, sample_rate)) => {
                let _ = ready.send(Ok(sample_rate));
                stream
            }
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };

        while let Ok(command) = commands.recv() {
            match command {
                StreamCommand::Play(reply) => {
                    let result = stream
                        .play()
                        .map_err(|e| CaptureError::StreamFailed(e.to_string()));
                    capturing.store(result.is_ok(), Ordering::SeqCst);
                    let _ = reply.send(result);
                }
                StreamCommand::Pause(reply) => {
                    capturing.store(false, Ordering::SeqCst);
                    let result = stream
                        .pause()
                        .map_err(|e| CaptureError::StreamFailed(e.to_string()));
                    let _ = reply.send(result);
                }
                StreamCommand::Close(reply) => {
                    capturing.store(false, Ordering::SeqCst);
                    drop(stream);
                    let _ = reply.send(Ok(()));
                    return;
                }
            }
        }

        // Device dropped without closing the take
        capturing.store(false, Ordering::SeqCst);
    }

    /// Send a command to the stream thread and wait for its reply
    async fn command(&self, make: fn(Reply) -> StreamCommand) -> Result<(), CaptureError> {
        let commands = self
            .stream_guard()
            .as_ref()
            .map(|open| open.commands.clone())
            .ok_or(CaptureError::NotOpen)?;

        let (reply_tx, reply_rx) = oneshot::channel();
        commands
            .send(make(reply_tx))
            .map_err(|_| CaptureError::StreamFailed("capture thread is gone".into()))?;
        reply_rx
            .await
            .map_err(|_| CaptureError::StreamFailed("capture thread is gone".into()))?
    }
}

impl Default for CpalCaptureDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureDevice for CpalCaptureDevice {
    async fn open(&self, chunks: ChunkSender) -> Result<(), CaptureError> {
        if self.stream_guard().is_some() {
            return Err(CaptureError::StreamFailed(
                "a capture stream is already open".into(),
            ));
        }

        self.buffer.lock().unwrap_or_else(|e| e.into_inner()).clear();

        let (ready_tx, ready_rx) = oneshot::channel();
        let (commands_tx, commands_rx) = std_mpsc::channel();
        let buffer = Arc::clone(&self.buffer);
        let capturing = Arc::clone(&self.capturing);

        std::thread::Builder::new()
            .name("capture-stream".into())
            .spawn(move || Self::run_stream(buffer, capturing, chunks, commands_rx, ready_tx))
            .map_err(|e| CaptureError::StreamFailed(e.to_string()))?;

        let sample_rate = ready_rx
            .await
            .map_err(|_| CaptureError::StreamFailed("capture thread exited".into()))??;

        *self.stream_guard() = Some(OpenStream {
            commands: commands_tx,
            sample_rate,
        });
        Ok(())
    }

    async fn start(&self) -> Result<(), CaptureError> {
        self.command(StreamCommand::Play).await
    }

    async fn pause(&self) -> Result<(), CaptureError> {
        self.command(StreamCommand::Pause).await
    }

    async fn resume(&self) -> Result<(), CaptureError> {
        self.command(StreamCommand::Play).await
    }

    async fn stop(&self) -> Result<SourceHandle, CaptureError> {
        let open = self.stream_guard().take().ok_or(CaptureError::NotOpen)?;

        let (reply_tx, reply_rx) = oneshot::channel();
        if open.commands.send(StreamCommand::Close(reply_tx)).is_ok() {
            // A dead thread has already released the stream
            let _ = reply_rx.await;
        }

        let samples = std::mem::take(&mut *self.buffer.lock().unwrap_or_else(|e| e.into_inner()));
        if samples.is_empty() {
            return Err(CaptureError::Empty);
        }

        let sample_rate = open.sample_rate;
        let audio = tokio::task::spawn_blocking(move || encode_take(&samples, sample_rate))
            .await
            .map_err(|e| CaptureError::EncodeFailed(format!("Encode task error: {}", e)))?
            .map_err(|e| CaptureError::EncodeFailed(e.to_string()))?;

        Ok(SourceHandle::new(audio))
    }
}
