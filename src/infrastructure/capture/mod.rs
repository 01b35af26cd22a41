//! Microphone capture infrastructure
//!
//! Captures from the default input device with cpal and encodes each
//! finished take to FLAC.

mod cpal_device;
mod flac_encoder;

pub use cpal_device::CpalCaptureDevice;
pub use flac_encoder::{encode_take, EncodingError};

/// Create the capture device for the current platform
pub fn create_capture_device() -> CpalCaptureDevice {
    CpalCaptureDevice::new()
}
