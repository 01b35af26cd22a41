//! CLI argument definitions using Clap

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::recording::{DiscardPolicy, Duration};

/// voice-composer - record, send and replay voice messages from the terminal
#[derive(Parser, Debug)]
#[command(name = "voice-composer")]
#[command(version)]
#[command(about = "Record voice messages in takes, then replay them at 1x, 1.5x or 2x")]
#[command(long_about = None)]
pub struct Cli {
    /// Longest take before it is sent automatically (e.g., 90s, 5m, 2m30s)
    #[arg(short = 'm', long, value_name = "TIME")]
    pub max_duration: Option<String>,

    /// How long to wait for the microphone to hand over a finished take
    #[arg(long, value_name = "TIME")]
    pub stop_timeout: Option<String>,

    /// Play short tones on start, pause, resume, send and discard
    #[arg(short = 'c', long)]
    pub cues: bool,

    /// What discarding a take may remove
    #[arg(long, value_name = "POLICY")]
    pub discard_policy: Option<DiscardPolicyArg>,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Discard policy argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DiscardPolicyArg {
    /// Discard only abandons the take in progress
    KeepCommitted,
    /// Discard also removes the last sent message
    DropLastCommitted,
}

impl From<DiscardPolicyArg> for DiscardPolicy {
    fn from(arg: DiscardPolicyArg) -> Self {
        match arg {
            DiscardPolicyArg::KeepCommitted => DiscardPolicy::KeepCommitted,
            DiscardPolicyArg::DropLastCommitted => DiscardPolicy::DropLastCommitted,
        }
    }
}

/// Resolved composer options
#[derive(Debug, Clone)]
pub struct ComposerOptions {
    pub max_duration: Duration,
    pub stop_timeout: Duration,
    pub audio_cues: bool,
    pub discard_policy: DiscardPolicy,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "max_duration",
    "stop_timeout",
    "audio_cues",
    "discard_policy",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["voice-composer"]);
        assert!(cli.max_duration.is_none());
        assert!(cli.stop_timeout.is_none());
        assert!(!cli.cues);
        assert!(cli.discard_policy.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_max_duration() {
        let cli = Cli::parse_from(["voice-composer", "-m", "90s"]);
        assert_eq!(cli.max_duration, Some("90s".to_string()));
    }

    #[test]
    fn cli_parses_cues_and_policy() {
        let cli = Cli::parse_from([
            "voice-composer",
            "--cues",
            "--discard-policy",
            "drop-last-committed",
        ]);
        assert!(cli.cues);
        assert_eq!(cli.discard_policy, Some(DiscardPolicyArg::DropLastCommitted));
    }

    #[test]
    fn cli_rejects_unknown_policy() {
        let result = Cli::try_parse_from(["voice-composer", "--discard-policy", "sometimes"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_config_init() {
        let cli = Cli::parse_from(["voice-composer", "config", "init"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Init
            })
        ));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["voice-composer", "config", "set", "max_duration", "2m"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "max_duration");
            assert_eq!(value, "2m");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn policy_arg_converts_to_policy() {
        assert_eq!(
            DiscardPolicy::from(DiscardPolicyArg::KeepCommitted),
            DiscardPolicy::KeepCommitted
        );
        assert_eq!(
            DiscardPolicy::from(DiscardPolicyArg::DropLastCommitted),
            DiscardPolicy::DropLastCommitted
        );
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("max_duration"));
        assert!(is_valid_config_key("discard_policy"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
