//! Rodio-backed playback elements

use std::io::Cursor;
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex as StdMutex};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::application::ports::{PlaybackElement, PlaybackError};
use crate::domain::audio::SourceHandle;

/// Shared audio output.
///
/// `rodio::OutputStream` is not `Send`; it is parked on a thread of its own
/// for as long as this value lives, and elements are created from its handle.
pub struct RodioOutput {
    handle: OutputStreamHandle,
    _shutdown: std_mpsc::Sender<()>,
}

impl RodioOutput {
    /// Open the default output device
    pub fn open() -> Result<Self, PlaybackError> {
        let (ready_tx, ready_rx) = std_mpsc::channel();
        let (shutdown_tx, shutdown_rx) = std_mpsc::channel::<()>();

        std::thread::Builder::new()
            .name("playback-output".into())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = ready_tx.send(Ok(handle));
                    // Returns once the owning RodioOutput is dropped
                    let _ = shutdown_rx.recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(PlaybackError::DeviceNotAvailable(e.to_string())));
                }
            })
            .map_err(|e| PlaybackError::DeviceNotAvailable(e.to_string()))?;

        let handle = ready_rx
            .recv()
            .map_err(|_| PlaybackError::DeviceNotAvailable("output thread exited".into()))??;

        Ok(Self {
            handle,
            _shutdown: shutdown_tx,
        })
    }

    /// Create a new, unloaded element on this output
    pub fn element(&self) -> Result<RodioPlaybackElement, PlaybackError> {
        RodioPlaybackElement::new(&self.handle)
    }
}

/// One player, attached to one recording entry at a time
pub struct RodioPlaybackElement {
    sink: Sink,
    source: StdMutex<Option<Arc<Vec<u8>>>>,
}

impl RodioPlaybackElement {
    pub fn new(handle: &OutputStreamHandle) -> Result<Self, PlaybackError> {
        let sink =
            Sink::try_new(handle).map_err(|e| PlaybackError::DeviceNotAvailable(e.to_string()))?;
        sink.pause();
        Ok(Self {
            sink,
            source: StdMutex::new(None),
        })
    }

    fn loaded(&self) -> Option<Arc<Vec<u8>>> {
        self.source.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl PlaybackElement for RodioPlaybackElement {
    fn load(&self, source: &SourceHandle) -> Result<(), PlaybackError> {
        self.sink.clear();
        let bytes = Arc::new(source.audio().data().to_vec());
        *self.source.lock().unwrap_or_else(|e| e.into_inner()) = Some(bytes);
        log::debug!("Loaded source {} into player", source.id());
        Ok(())
    }

    fn set_rate(&self, rate: f32) {
        self.sink.set_speed(rate);
    }

    fn rate(&self) -> f32 {
        self.sink.speed()
    }

    fn play(&self) -> Result<(), PlaybackError> {
        let bytes = self.loaded().ok_or(PlaybackError::NoSource)?;
        let decoder = Decoder::new(Cursor::new(bytes.as_ref().clone()))
            .map_err(|e| PlaybackError::DecodeFailed(e.to_string()))?;

        // clear() also pauses the sink
        self.sink.clear();
        self.sink.append(decoder);
        self.sink.play();
        Ok(())
    }

    fn stop(&self) {
        self.sink.clear();
    }

    fn position_secs(&self) -> f64 {
        self.sink.get_pos().as_secs_f64()
    }
}
