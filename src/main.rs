//! voice-composer CLI entry point

use std::process::ExitCode;

use clap::Parser;

use voice_composer::cli::{
    app::{load_merged_config, run_composer, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
    ComposerOptions,
};
use voice_composer::domain::config::AppConfig;
use voice_composer::domain::recording::{DiscardPolicy, Duration};
use voice_composer::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let presenter = Presenter::new();

    if let Some(Commands::Config { action }) = cli.command {
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    // Build CLI config from args
    let cli_config = AppConfig {
        max_duration: cli.max_duration.clone(),
        stop_timeout: cli.stop_timeout.clone(),
        audio_cues: if cli.cues { Some(true) } else { None },
        discard_policy: cli
            .discard_policy
            .map(|p| DiscardPolicy::from(p).to_string()),
    };

    let config = load_merged_config(cli_config).await;

    let max_duration = match parse_duration(config.max_duration.as_deref(), "max-duration") {
        Ok(d) => d.unwrap_or_else(Duration::default_max_take),
        Err(message) => {
            presenter.error(&message);
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };
    let stop_timeout = match parse_duration(config.stop_timeout.as_deref(), "stop-timeout") {
        Ok(d) => d.unwrap_or_else(Duration::default_stop_timeout),
        Err(message) => {
            presenter.error(&message);
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let options = ComposerOptions {
        max_duration,
        stop_timeout,
        audio_cues: config.audio_cues_or_default(),
        discard_policy: config.discard_policy_or_default(),
    };

    run_composer(options).await
}

fn parse_duration(value: Option<&str>, name: &str) -> Result<Option<Duration>, String> {
    value
        .map(|s| s.parse::<Duration>())
        .transpose()
        .map_err(|e| format!("Invalid {}: {}", name, e))
}
