//! Recording domain: the capture session and its clock

mod discard;
mod duration;
mod session;

pub use discard::DiscardPolicy;
pub use duration::{format_duration, Duration, DEFAULT_MAX_TAKE_SECS, DEFAULT_STOP_TIMEOUT_SECS};
pub use session::{CaptureSession, CaptureStatus, FinishedTake, InvalidStateTransition};
