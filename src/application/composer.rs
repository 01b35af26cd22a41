//! Session controller use case
//!
//! Drives one take at a time through idle -> recording <-> paused -> idle,
//! keeps the take clock, and hands finished takes to the playback registry.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};

use crate::domain::audio::{AudioChunk, SourceHandle};
use crate::domain::playback::RecordingEntry;
use crate::domain::recording::{
    CaptureSession, CaptureStatus, DiscardPolicy, Duration, InvalidStateTransition,
};

use super::ports::{AudioCue, AudioCueType, CaptureDevice, CaptureError};
use super::registry::SharedRegistry;

/// Errors from the session controller
#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("Microphone unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("{0}")]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Capture device failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Capture device did not deliver the take within {0}")]
    StopTimedOut(Duration),
}

/// Configuration for the session controller
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// Takes reaching this length are due for auto-send
    pub max_duration: Duration,
    /// How long to wait for the device to deliver a stopped take
    pub stop_timeout: Duration,
    /// Period of the take clock
    pub tick_interval: StdDuration,
    /// Whether discarding may also drop the last sent message
    pub discard_policy: DiscardPolicy,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_duration: Duration::default_max_take(),
            stop_timeout: Duration::default_stop_timeout(),
            tick_interval: StdDuration::from_secs(1),
            discard_policy: DiscardPolicy::default(),
        }
    }
}

/// Point-in-time view of the take for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSnapshot {
    pub status: CaptureStatus,
    pub elapsed_seconds: u64,
    pub chunk_count: usize,
}

/// Result of discarding a take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscardOutcome {
    /// Length of the abandoned take
    pub discarded_seconds: u64,
    /// Whether the last sent message was removed as well
    pub removed_committed: bool,
}

/// Everything guarded by the session lock
#[derive(Default)]
struct CaptureState {
    session: CaptureSession,
    chunks: Option<mpsc::UnboundedReceiver<AudioChunk>>,
    ticker: Option<JoinHandle<()>>,
    /// Bumped whenever the ticker is cancelled; a tick from an older
    /// generation must not touch the clock.
    generation: u64,
}

impl CaptureState {
    fn drain_chunks(&mut self) {
        if let Some(rx) = self.chunks.as_mut() {
            while let Ok(chunk) = rx.try_recv() {
                self.session.push_chunk(chunk);
            }
        }
    }

    fn cancel_ticker(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    fn snapshot(&self) -> CaptureSnapshot {
        CaptureSnapshot {
            status: self.session.status(),
            elapsed_seconds: self.session.elapsed_seconds(),
            chunk_count: self.session.chunk_count(),
        }
    }
}

/// Session controller
pub struct SessionController<D, A>
where
    D: CaptureDevice,
    A: AudioCue,
{
    device: D,
    cue: A,
    registry: SharedRegistry,
    state: Arc<Mutex<CaptureState>>,
    config: ComposerConfig,
}

impl<D, A> SessionController<D, A>
where
    D: CaptureDevice,
    A: AudioCue,
{
    /// Create a controller feeding the given registry
    pub fn new(device: D, cue: A, registry: SharedRegistry, config: ComposerConfig) -> Self {
        Self {
            device,
            cue,
            registry,
            state: Arc::new(Mutex::new(CaptureState::default())),
            config,
        }
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub async fn status(&self) -> CaptureStatus {
        self.state.lock().await.session.status()
    }

    pub async fn elapsed_seconds(&self) -> u64 {
        self.state.lock().await.session.elapsed_seconds()
    }

    pub async fn snapshot(&self) -> CaptureSnapshot {
        let mut state = self.state.lock().await;
        state.drain_chunks();
        state.snapshot()
    }

    /// Whether the take in progress has reached the configured maximum
    pub async fn reached_max_duration(&self) -> bool {
        let state = self.state.lock().await;
        state.session.status().is_active()
            && state.session.elapsed_seconds() >= self.config.max_duration.as_secs()
    }

    /// Start a new take (IDLE -> RECORDING)
    pub async fn start(&self) -> Result<(), ComposerError> {
        {
            let mut state = self.state.lock().await;
            state.session.ensure(&[CaptureStatus::Idle], "start recording")?;

            let (tx, rx) = mpsc::unbounded_channel();
            self.device.open(tx).await.map_err(unavailable)?;

            if let Err(e) = self.device.start().await {
                // Release the stream we just opened
                if let Err(stop_err) = self.device.stop().await {
                    log::debug!("Releasing capture stream after failed start: {}", stop_err);
                }
                return Err(unavailable(e));
            }

            state.session.start()?;
            state.chunks = Some(rx);
            self.spawn_ticker(&mut state);
            log::info!("Take started");
        }

        self.play_cue(AudioCueType::RecordingStart).await;
        Ok(())
    }

    /// Pause the take (RECORDING -> PAUSED); the clock freezes
    pub async fn pause(&self) -> Result<(), ComposerError> {
        {
            let mut state = self.state.lock().await;
            state.session.ensure(&[CaptureStatus::Recording], "pause")?;

            state.drain_chunks();
            state.cancel_ticker();

            if let Err(e) = self.device.pause().await {
                // Still recording, so the clock keeps running
                self.spawn_ticker(&mut state);
                return Err(e.into());
            }

            state.session.pause()?;
            log::info!("Take paused at {}s", state.session.elapsed_seconds());
        }

        self.play_cue(AudioCueType::RecordingPause).await;
        Ok(())
    }

    /// Resume the take (PAUSED -> RECORDING)
    pub async fn resume(&self) -> Result<(), ComposerError> {
        {
            let mut state = self.state.lock().await;
            state.session.ensure(&[CaptureStatus::Paused], "resume")?;

            // Stray chunks from the paused stream are dropped here
            state.drain_chunks();

            self.device.resume().await?;

            // Anything the live stream queued while resuming belongs to the take
            state.session.resume()?;
            state.drain_chunks();
            self.spawn_ticker(&mut state);
            log::info!("Take resumed at {}s", state.session.elapsed_seconds());
        }

        self.play_cue(AudioCueType::RecordingResume).await;
        Ok(())
    }

    /// Stop the take and append it to the registry (RECORDING | PAUSED -> IDLE).
    ///
    /// The entry's duration is the clock value when the stop was requested.
    /// Returns the index of the new entry.
    pub async fn stop_and_commit(&self) -> Result<usize, ComposerError> {
        let index = {
            let mut state = self.state.lock().await;
            state
                .session
                .ensure(&[CaptureStatus::Recording, CaptureStatus::Paused], "send")?;

            state.cancel_ticker();
            state.drain_chunks();

            let delivered = self.stop_device().await;
            let take = state.session.finish()?;
            state.chunks = None;

            let source = delivered?;
            log::info!(
                "Take sent: {}s, {} chunks ({} B raw), {}",
                take.elapsed_seconds,
                take.chunks.len(),
                take.chunks.iter().map(AudioChunk::len).sum::<usize>(),
                source.audio().human_readable_size()
            );

            let entry = RecordingEntry::new(source, take.elapsed_seconds);
            self.registry.lock().await.append(entry)
        };

        self.play_cue(AudioCueType::MessageSent).await;
        Ok(index)
    }

    /// Stop the take and drop it (RECORDING | PAUSED -> IDLE).
    ///
    /// Under `DiscardPolicy::DropLastCommitted` the most recently sent
    /// message is removed as well.
    pub async fn stop_and_discard(&self) -> Result<DiscardOutcome, ComposerError> {
        let outcome = {
            let mut state = self.state.lock().await;
            state
                .session
                .ensure(&[CaptureStatus::Recording, CaptureStatus::Paused], "discard")?;

            let take = self.abandon(&mut state).await?;

            let removed_committed = if self.config.discard_policy.drops_last_committed() {
                self.registry.lock().await.remove_last().is_some()
            } else {
                false
            };

            log::info!(
                "Take discarded after {}s (removed last message: {})",
                take,
                removed_committed
            );
            DiscardOutcome {
                discarded_seconds: take,
                removed_committed,
            }
        };

        self.play_cue(AudioCueType::RecordingDiscard).await;
        Ok(outcome)
    }

    /// Abandon any take in progress without touching the registry.
    /// Used on shutdown; a no-op when idle.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if state.session.status().is_active() {
            if let Ok(seconds) = self.abandon(&mut state).await {
                log::info!("Take abandoned on shutdown after {}s", seconds);
            }
        }
        state.cancel_ticker();
    }

    /// Stop the device and close the session, dropping whatever it delivers.
    /// Device failures are logged rather than returned.
    async fn abandon(&self, state: &mut CaptureState) -> Result<u64, ComposerError> {
        state.cancel_ticker();

        if let Err(e) = self.stop_device().await {
            log::warn!("Capture device failed while discarding: {}", e);
        }

        let take = state.session.finish()?;
        state.chunks = None;
        Ok(take.elapsed_seconds)
    }

    async fn stop_device(&self) -> Result<SourceHandle, ComposerError> {
        let limit = self.config.stop_timeout;
        match timeout(limit.as_std(), self.device.stop()).await {
            Ok(delivered) => Ok(delivered?),
            Err(_) => Err(ComposerError::StopTimedOut(limit)),
        }
    }

    /// Start the take clock. Must be called with the session lock held.
    fn spawn_ticker(&self, state: &mut CaptureState) {
        state.cancel_ticker();
        let generation = state.generation;
        let period = self.config.tick_interval;
        let shared = Arc::clone(&self.state);

        state.ticker = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let mut state = shared.lock().await;
                if state.generation != generation || !state.session.is_recording() {
                    break;
                }
                state.drain_chunks();
                state.session.tick();
                log::trace!("Take clock at {}s", state.session.elapsed_seconds());
            }
        }));
    }

    async fn play_cue(&self, cue: AudioCueType) {
        if let Err(e) = self.cue.play(cue).await {
            log::debug!("Audio cue {:?} failed: {}", cue, e);
        }
    }
}

impl<D, A> Drop for SessionController<D, A>
where
    D: CaptureDevice,
    A: AudioCue,
{
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_lock() {
            state.cancel_ticker();
        }
    }
}

fn unavailable(e: CaptureError) -> ComposerError {
    match e {
        CaptureError::DeviceUnavailable(message) => ComposerError::DeviceUnavailable(message),
        other => ComposerError::DeviceUnavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{AudioCueError, ChunkSender};
    use crate::application::registry::PlaybackRegistry;
    use crate::domain::audio::{AudioData, AudioMimeType};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct MockDevice {
        deny_open: AtomicBool,
        fail_stop: AtomicBool,
        emit_on_resume: AtomicBool,
        pause_delay_ms: AtomicU64,
        stop_delay_ms: AtomicU64,
        opens: AtomicUsize,
        pauses: AtomicUsize,
        resumes: AtomicUsize,
        stops: AtomicUsize,
        sender: StdMutex<Option<ChunkSender>>,
    }

    impl MockDevice {
        fn shared() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn emit(&self, bytes: &[u8]) {
            if let Some(tx) = self.sender.lock().unwrap().as_ref() {
                let _ = tx.send(AudioChunk::new(bytes.to_vec()));
            }
        }
    }

    #[async_trait]
    impl CaptureDevice for Arc<MockDevice> {
        async fn open(&self, chunks: ChunkSender) -> Result<(), CaptureError> {
            if self.deny_open.load(Ordering::SeqCst) {
                return Err(CaptureError::DeviceUnavailable("permission denied".into()));
            }
            self.opens.fetch_add(1, Ordering::SeqCst);
            *self.sender.lock().unwrap() = Some(chunks);
            Ok(())
        }

        async fn start(&self) -> Result<(), CaptureError> {
            Ok(())
        }

        async fn pause(&self) -> Result<(), CaptureError> {
            self.pauses.fetch_add(1, Ordering::SeqCst);
            wait_ms(self.pause_delay_ms.load(Ordering::SeqCst)).await;
            Ok(())
        }

        async fn resume(&self) -> Result<(), CaptureError> {
            self.resumes.fetch_add(1, Ordering::SeqCst);
            if self.emit_on_resume.load(Ordering::SeqCst) {
                // The live stream delivers before resume() returns
                self.emit(&[9, 9]);
            }
            Ok(())
        }

        async fn stop(&self) -> Result<SourceHandle, CaptureError> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            self.sender.lock().unwrap().take();
            wait_ms(self.stop_delay_ms.load(Ordering::SeqCst)).await;
            if self.fail_stop.load(Ordering::SeqCst) {
                return Err(CaptureError::Empty);
            }
            Ok(SourceHandle::new(AudioData::new(
                vec![0u8; 32],
                AudioMimeType::Flac,
            )))
        }
    }

    struct SilentCue;

    #[async_trait]
    impl AudioCue for SilentCue {
        async fn play(&self, _cue_type: AudioCueType) -> Result<(), AudioCueError> {
            Ok(())
        }
    }

    fn controller(
        device: &Arc<MockDevice>,
        config: ComposerConfig,
    ) -> SessionController<Arc<MockDevice>, SilentCue> {
        SessionController::new(
            Arc::clone(device),
            SilentCue,
            PlaybackRegistry::shared(),
            config,
        )
    }

    async fn wait_ms(ms: u64) {
        if ms > 0 {
            tokio::time::sleep(StdDuration::from_millis(ms)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_from_idle() {
        let device = MockDevice::shared();
        let composer = controller(&device, ComposerConfig::default());

        assert_eq!(composer.status().await, CaptureStatus::Idle);
        composer.start().await.unwrap();
        assert_eq!(composer.status().await, CaptureStatus::Recording);
        assert_eq!(composer.elapsed_seconds().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_active_fails_without_second_session() {
        let device = MockDevice::shared();
        let composer = controller(&device, ComposerConfig::default());

        composer.start().await.unwrap();
        let err = composer.start().await.unwrap_err();
        assert!(matches!(err, ComposerError::InvalidState(_)));

        composer.pause().await.unwrap();
        let err = composer.start().await.unwrap_err();
        assert!(matches!(err, ComposerError::InvalidState(_)));

        assert_eq!(device.opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn denied_microphone_stays_idle_and_can_retry() {
        let device = MockDevice::shared();
        device.deny_open.store(true, Ordering::SeqCst);
        let composer = controller(&device, ComposerConfig::default());

        let err = composer.start().await.unwrap_err();
        assert!(matches!(err, ComposerError::DeviceUnavailable(ref m) if m.contains("permission")));
        assert_eq!(composer.status().await, CaptureStatus::Idle);

        wait_ms(3_000).await;
        assert_eq!(composer.elapsed_seconds().await, 0);

        device.deny_open.store(false, Ordering::SeqCst);
        composer.start().await.unwrap();
        assert_eq!(composer.status().await, CaptureStatus::Recording);
    }

    #[tokio::test(start_paused = true)]
    async fn clock_counts_only_while_recording() {
        let device = MockDevice::shared();
        let composer = controller(&device, ComposerConfig::default());

        composer.start().await.unwrap();
        wait_ms(2_500).await;
        assert_eq!(composer.elapsed_seconds().await, 2);

        composer.pause().await.unwrap();
        wait_ms(10_000).await;
        assert_eq!(composer.elapsed_seconds().await, 2);
        assert_eq!(composer.status().await, CaptureStatus::Paused);

        composer.resume().await.unwrap();
        wait_ms(1_500).await;
        assert_eq!(composer.elapsed_seconds().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_resume_alternate_strictly() {
        let device = MockDevice::shared();
        let composer = controller(&device, ComposerConfig::default());

        assert!(composer.pause().await.is_err());
        assert!(composer.resume().await.is_err());

        composer.start().await.unwrap();
        assert!(composer.resume().await.is_err());

        let mut last_elapsed = 0;
        for _ in 0..3 {
            wait_ms(1_500).await;
            composer.pause().await.unwrap();
            assert_eq!(composer.status().await, CaptureStatus::Paused);
            assert!(composer.pause().await.is_err());

            let elapsed = composer.elapsed_seconds().await;
            assert!(elapsed > last_elapsed);
            last_elapsed = elapsed;

            composer.resume().await.unwrap();
            assert_eq!(composer.status().await, CaptureStatus::Recording);
        }

        assert_eq!(device.pauses.load(Ordering::SeqCst), 3);
        assert_eq!(device.resumes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_ticks_do_not_count_toward_duration() {
        let device = MockDevice::shared();
        let composer = controller(&device, ComposerConfig::default());

        composer.start().await.unwrap();
        wait_ms(3_500).await;
        composer.pause().await.unwrap();
        wait_ms(5_000).await;
        composer.resume().await.unwrap();
        wait_ms(2_500).await;
        let index = composer.stop_and_commit().await.unwrap();

        let registry = composer.registry().lock().await;
        assert_eq!(index, 0);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(0).unwrap().duration_seconds(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn commit_appends_one_entry_and_resets() {
        let device = MockDevice::shared();
        let composer = controller(&device, ComposerConfig::default());

        composer.start().await.unwrap();
        wait_ms(4_500).await;
        composer.stop_and_commit().await.unwrap();

        assert_eq!(composer.status().await, CaptureStatus::Idle);
        assert_eq!(composer.elapsed_seconds().await, 0);

        // No tick lands after the stop
        wait_ms(3_000).await;
        assert_eq!(composer.elapsed_seconds().await, 0);

        let registry = composer.registry().lock().await;
        assert_eq!(registry.len(), 1);
        let entry = registry.get(0).unwrap();
        assert_eq!(entry.duration_seconds(), 4);
        assert_eq!(entry.speed().rate(), 1.0);
        assert_eq!(entry.current_time(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn commit_from_paused() {
        let device = MockDevice::shared();
        let composer = controller(&device, ComposerConfig::default());

        composer.start().await.unwrap();
        wait_ms(1_500).await;
        composer.pause().await.unwrap();
        let index = composer.stop_and_commit().await.unwrap();

        assert_eq!(index, 0);
        assert_eq!(composer.status().await, CaptureStatus::Idle);
        let registry = composer.registry().lock().await;
        assert_eq!(registry.get(0).unwrap().duration_seconds(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn commit_from_idle_fails() {
        let device = MockDevice::shared();
        let composer = controller(&device, ComposerConfig::default());

        let err = composer.stop_and_commit().await.unwrap_err();
        assert!(matches!(err, ComposerError::InvalidState(_)));
        assert!(composer.stop_and_discard().await.is_err());
        assert_eq!(device.stops.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn discard_appends_nothing() {
        let device = MockDevice::shared();
        let composer = controller(&device, ComposerConfig::default());

        composer.start().await.unwrap();
        wait_ms(1_500).await;
        composer.stop_and_commit().await.unwrap();
        let before = composer.registry().lock().await.len();

        composer.start().await.unwrap();
        wait_ms(2_500).await;
        let outcome = composer.stop_and_discard().await.unwrap();

        assert_eq!(outcome.discarded_seconds, 2);
        assert!(!outcome.removed_committed);
        assert_eq!(composer.status().await, CaptureStatus::Idle);
        assert_eq!(composer.elapsed_seconds().await, 0);
        assert_eq!(composer.registry().lock().await.len(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn discard_right_after_start_leaves_registry_unchanged() {
        let device = MockDevice::shared();
        let composer = controller(&device, ComposerConfig::default());

        composer.start().await.unwrap();
        composer.stop_and_discard().await.unwrap();
        assert!(composer.registry().lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn legacy_policy_drops_last_committed() {
        let device = MockDevice::shared();
        let config = ComposerConfig {
            discard_policy: DiscardPolicy::DropLastCommitted,
            ..Default::default()
        };
        let composer = controller(&device, config);

        for _ in 0..2 {
            composer.start().await.unwrap();
            composer.stop_and_commit().await.unwrap();
        }

        composer.start().await.unwrap();
        let outcome = composer.stop_and_discard().await.unwrap();
        assert!(outcome.removed_committed);
        assert_eq!(composer.registry().lock().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn legacy_policy_with_empty_registry() {
        let device = MockDevice::shared();
        let config = ComposerConfig {
            discard_policy: DiscardPolicy::DropLastCommitted,
            ..Default::default()
        };
        let composer = controller(&device, config);

        composer.start().await.unwrap();
        let outcome = composer.stop_and_discard().await.unwrap();
        assert!(!outcome.removed_committed);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_delivery_still_ends_the_take() {
        let device = MockDevice::shared();
        device.fail_stop.store(true, Ordering::SeqCst);
        let composer = controller(&device, ComposerConfig::default());

        composer.start().await.unwrap();
        wait_ms(1_500).await;
        let err = composer.stop_and_commit().await.unwrap_err();

        assert!(matches!(err, ComposerError::Capture(CaptureError::Empty)));
        assert_eq!(composer.status().await, CaptureStatus::Idle);
        assert_eq!(composer.elapsed_seconds().await, 0);
        assert!(composer.registry().lock().await.is_empty());

        wait_ms(2_000).await;
        assert_eq!(composer.elapsed_seconds().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn discard_ignores_delivery_failure() {
        let device = MockDevice::shared();
        device.fail_stop.store(true, Ordering::SeqCst);
        let composer = controller(&device, ComposerConfig::default());

        composer.start().await.unwrap();
        assert!(composer.stop_and_discard().await.is_ok());
        assert_eq!(composer.status().await, CaptureStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_times_out() {
        let device = MockDevice::shared();
        device.stop_delay_ms.store(60_000, Ordering::SeqCst);
        let config = ComposerConfig {
            stop_timeout: Duration::from_secs(2),
            ..Default::default()
        };
        let composer = controller(&device, config);

        composer.start().await.unwrap();
        let err = composer.stop_and_commit().await.unwrap_err();
        assert!(matches!(err, ComposerError::StopTimedOut(d) if d.as_secs() == 2));
        assert_eq!(composer.status().await, CaptureStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn chunks_collected_only_while_recording() {
        let device = MockDevice::shared();
        let composer = controller(&device, ComposerConfig::default());

        composer.start().await.unwrap();
        device.emit(&[1, 2]);
        device.emit(&[3, 4]);
        assert_eq!(composer.snapshot().await.chunk_count, 2);

        composer.pause().await.unwrap();
        device.emit(&[5, 6]);
        composer.resume().await.unwrap();
        assert_eq!(composer.snapshot().await.chunk_count, 2);

        device.emit(&[7, 8]);
        let snapshot = composer.snapshot().await;
        assert_eq!(snapshot.chunk_count, 3);
        assert_eq!(snapshot.status, CaptureStatus::Recording);
    }

    #[tokio::test(start_paused = true)]
    async fn chunks_delivered_during_resume_belong_to_the_take() {
        let device = MockDevice::shared();
        device.emit_on_resume.store(true, Ordering::SeqCst);
        let composer = controller(&device, ComposerConfig::default());

        composer.start().await.unwrap();
        composer.pause().await.unwrap();
        device.emit(&[5, 6]);
        composer.resume().await.unwrap();

        let snapshot = composer.snapshot().await;
        assert_eq!(snapshot.chunk_count, 1);
        assert_eq!(snapshot.status, CaptureStatus::Recording);
    }

    #[tokio::test(start_paused = true)]
    async fn no_tick_lands_while_pause_waits_on_the_device() {
        let device = MockDevice::shared();
        device.pause_delay_ms.store(1_200, Ordering::SeqCst);
        let composer = controller(&device, ComposerConfig::default());

        composer.start().await.unwrap();
        wait_ms(2_500).await;
        let before = composer.elapsed_seconds().await;
        assert_eq!(before, 2);

        // A tick falls due at 3s while the device is still pausing
        composer.pause().await.unwrap();
        assert_eq!(composer.elapsed_seconds().await, before);

        wait_ms(3_000).await;
        assert_eq!(composer.elapsed_seconds().await, before);
    }

    #[tokio::test(start_paused = true)]
    async fn no_tick_lands_while_stop_waits_on_the_device() {
        let device = MockDevice::shared();
        device.stop_delay_ms.store(1_200, Ordering::SeqCst);
        let composer = controller(&device, ComposerConfig::default());

        composer.start().await.unwrap();
        wait_ms(2_500).await;
        let before = composer.elapsed_seconds().await;

        let index = composer.stop_and_commit().await.unwrap();
        let registry = composer.registry().lock().await;
        assert_eq!(registry.get(index).unwrap().duration_seconds(), before);
        drop(registry);

        assert_eq!(composer.elapsed_seconds().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reached_max_duration() {
        let device = MockDevice::shared();
        let config = ComposerConfig {
            max_duration: Duration::from_secs(3),
            ..Default::default()
        };
        let composer = controller(&device, config);

        assert!(!composer.reached_max_duration().await);
        composer.start().await.unwrap();
        wait_ms(2_500).await;
        assert!(!composer.reached_max_duration().await);
        wait_ms(1_000).await;
        assert!(composer.reached_max_duration().await);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_abandons_take_but_keeps_messages() {
        let device = MockDevice::shared();
        let config = ComposerConfig {
            discard_policy: DiscardPolicy::DropLastCommitted,
            ..Default::default()
        };
        let composer = controller(&device, config);

        composer.start().await.unwrap();
        composer.stop_and_commit().await.unwrap();
        composer.start().await.unwrap();

        composer.shutdown().await;
        assert_eq!(composer.status().await, CaptureStatus::Idle);
        assert_eq!(composer.registry().lock().await.len(), 1);

        // Idle shutdown is a no-op
        composer.shutdown().await;
        assert_eq!(device.stops.load(Ordering::SeqCst), 2);
    }
}
