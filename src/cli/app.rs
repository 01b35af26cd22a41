//! Interactive composer runner

use std::io::BufRead;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::application::ports::{AudioCue, CaptureDevice, ConfigStore, PlaybackError};
use crate::application::{
    format_duration, ComposerConfig, PlaybackRegistry, RegistryError, SessionController,
    SharedRegistry,
};
use crate::domain::config::AppConfig;
use crate::domain::playback::PlaybackSpeed;
use crate::domain::recording::CaptureStatus;
use crate::infrastructure::{create_audio_cue, create_capture_device, RodioOutput, XdgConfigStore};

use super::args::ComposerOptions;
use super::commands::ComposerCommand;
use super::presenter::Presenter;
use super::signals::ShutdownListener;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// How often the status line and the take limit are checked
const REFRESH_INTERVAL: StdDuration = StdDuration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Run the interactive composer until `quit`, end of input, or a signal
pub async fn run_composer(options: ComposerOptions) -> ExitCode {
    let mut signals = match ShutdownListener::install() {
        Ok(s) => s,
        Err(e) => {
            Presenter::new().error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut input = match spawn_stdin_reader() {
        Ok(rx) => rx,
        Err(e) => {
            Presenter::new().error(&format!("Failed to read input: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let config = ComposerConfig {
        max_duration: options.max_duration,
        stop_timeout: options.stop_timeout,
        discard_policy: options.discard_policy,
        ..Default::default()
    };
    log::debug!("Composer config: {:?}", config);

    let mut composer = Composer::new(
        create_capture_device(),
        create_audio_cue(options.audio_cues),
        config,
    );
    composer
        .presenter
        .info("Type 'record' to start a voice message, 'help' for commands");

    let result = composer.run(&mut input, &mut signals).await;
    composer.close().await;

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            composer.presenter.error(&format!("Failed to read input: {}", e));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Read stdin on a plain thread so a pending read never holds up runtime
/// shutdown. The channel closes at end of input.
fn spawn_stdin_reader() -> std::io::Result<mpsc::UnboundedReceiver<std::io::Result<String>>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                if tx.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// The composer: one session controller, the sent messages, and the
/// terminal they are shown on.
struct Composer<D, A>
where
    D: CaptureDevice,
    A: AudioCue,
{
    controller: SessionController<D, A>,
    registry: SharedRegistry,
    /// Opened on first playback
    output: Option<RodioOutput>,
    presenter: Presenter,
}

impl<D, A> Composer<D, A>
where
    D: CaptureDevice,
    A: AudioCue,
{
    fn new(device: D, cue: A, config: ComposerConfig) -> Self {
        let registry = PlaybackRegistry::shared();
        Self {
            controller: SessionController::new(device, cue, Arc::clone(&registry), config),
            registry,
            output: None,
            presenter: Presenter::new(),
        }
    }

    async fn run(
        &mut self,
        input: &mut mpsc::UnboundedReceiver<std::io::Result<String>>,
        signals: &mut ShutdownListener,
    ) -> std::io::Result<()> {
        let mut refresh = tokio::time::interval(REFRESH_INTERVAL);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                line = input.recv() => {
                    let Some(line) = line else {
                        log::debug!("End of input");
                        return Ok(());
                    };
                    if self.handle_line(&line?).await == Flow::Quit {
                        return Ok(());
                    }
                }
                Some(signal) = signals.recv() => {
                    log::info!("Shutting down on {}", signal.name());
                    return Ok(());
                }
                _ = refresh.tick() => self.refresh().await,
            }
        }
    }

    async fn handle_line(&mut self, line: &str) -> Flow {
        match line.parse::<ComposerCommand>() {
            Ok(command) => self.handle(command).await,
            Err(e) => {
                self.presenter.error(&e.to_string());
                Flow::Continue
            }
        }
    }

    async fn handle(&mut self, command: ComposerCommand) -> Flow {
        match command {
            ComposerCommand::Record => match self.controller.start().await {
                Ok(()) => {
                    let status = self.presenter.format_status(CaptureStatus::Recording, 0);
                    self.presenter.start_spinner(&status);
                }
                Err(e) => self.presenter.error(&e.to_string()),
            },
            ComposerCommand::Pause => match self.controller.pause().await {
                Ok(()) => self.show_status().await,
                Err(e) => self.presenter.error(&e.to_string()),
            },
            ComposerCommand::Resume => match self.controller.resume().await {
                Ok(()) => self.show_status().await,
                Err(e) => self.presenter.error(&e.to_string()),
            },
            ComposerCommand::Send => self.send().await,
            ComposerCommand::Discard => self.discard().await,
            ComposerCommand::Speed { index } => {
                let result = self.registry.lock().await.cycle_speed(index);
                match result {
                    Ok(speed) => self
                        .presenter
                        .success(&format!("#{} now plays at {}", index + 1, speed)),
                    Err(e) => self.presenter.error(&e.to_string()),
                }
            }
            ComposerCommand::Play { index } => match self.play(index).await {
                Ok(speed) => self
                    .presenter
                    .info(&format!("Playing #{} at {}", index + 1, speed)),
                Err(e) => self.presenter.error(&e.to_string()),
            },
            ComposerCommand::Stop => {
                let mut registry = self.registry.lock().await;
                for index in 0..registry.len() {
                    let _ = registry.sync_position(index);
                }
                registry.stop_all();
            }
            ComposerCommand::List => {
                let mut registry = self.registry.lock().await;
                for index in 0..registry.len() {
                    let _ = registry.sync_position(index);
                }
                self.presenter.entries(registry.entries());
            }
            ComposerCommand::Help => self.presenter.help(),
            ComposerCommand::Quit => return Flow::Quit,
            ComposerCommand::Text(text) => {
                if self.controller.status().await == CaptureStatus::Idle {
                    log::debug!("Ignoring {} chars of text input", text.len());
                    self.presenter.info(
                        "Text messages are not sent; type 'record' to start a voice message",
                    );
                } else {
                    self.presenter
                        .warn(&format!("Unknown command '{}'; type 'help'", text));
                }
            }
            ComposerCommand::Empty => {}
        }
        Flow::Continue
    }

    async fn send(&mut self) {
        match self.controller.stop_and_commit().await {
            Ok(index) => {
                let duration = self
                    .registry
                    .lock()
                    .await
                    .get(index)
                    .map(|entry| entry.duration_seconds())
                    .unwrap_or_default();
                self.presenter.spinner_success(&format!(
                    "Sent #{} ({})",
                    index + 1,
                    format_duration(duration)
                ));
            }
            Err(e) => self.fail(&e.to_string()),
        }
    }

    async fn discard(&mut self) {
        match self.controller.stop_and_discard().await {
            Ok(outcome) => {
                self.presenter.spinner_fail(&format!(
                    "Discarded take ({})",
                    format_duration(outcome.discarded_seconds)
                ));
                if outcome.removed_committed {
                    self.presenter.warn("Also removed the last sent message");
                }
            }
            Err(e) => self.fail(&e.to_string()),
        }
    }

    /// Play an entry, attaching a player to it on first use
    async fn play(&mut self, index: usize) -> Result<PlaybackSpeed, RegistryError> {
        let mut registry = self.registry.lock().await;
        let speed = registry.get(index)?.speed();

        if !registry.is_bound(index) {
            if self.output.is_none() {
                let output = tokio::task::spawn_blocking(RodioOutput::open)
                    .await
                    .map_err(|e| PlaybackError::DeviceNotAvailable(e.to_string()))??;
                self.output = Some(output);
            }
            let output = self
                .output
                .as_ref()
                .ok_or_else(|| PlaybackError::DeviceNotAvailable("no audio output".into()))?;
            registry.bind(index, Box::new(output.element()?))?;
        }

        registry.stop_all();
        registry.play(index)?;
        Ok(speed)
    }

    /// Redraw the status line and send the take once it hits the limit
    async fn refresh(&mut self) {
        let snapshot = self.controller.snapshot().await;
        if !snapshot.status.is_active() {
            return;
        }

        if self.controller.reached_max_duration().await {
            self.presenter.warn(&format!(
                "Take reached {}, sending",
                self.controller.config().max_duration
            ));
            self.send().await;
            return;
        }

        let status = self
            .presenter
            .format_status(snapshot.status, snapshot.elapsed_seconds);
        self.presenter.update_spinner(&status);
    }

    async fn show_status(&mut self) {
        let snapshot = self.controller.snapshot().await;
        let status = self
            .presenter
            .format_status(snapshot.status, snapshot.elapsed_seconds);
        self.presenter.update_spinner(&status);
    }

    fn fail(&mut self, message: &str) {
        if self.presenter.is_spinner_active() {
            self.presenter.spinner_fail(message);
        } else {
            self.presenter.error(message);
        }
    }

    /// Discard any take in progress and silence playback
    async fn close(&mut self) {
        if self.controller.status().await.is_active() {
            self.controller.shutdown().await;
            self.presenter.spinner_fail("Take discarded");
        }
        self.presenter.stop_spinner();
        self.registry.lock().await.stop_all();
    }
}

/// Load and merge configuration: defaults < file < CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load_or_empty().await;

    AppConfig::defaults().merge(file_config).merge(cli_config)
}
