//! CLI layer - Command-line interface
//!
//! Argument parsing, the interactive composer loop, the config subcommand,
//! output formatting and signal handling.

pub mod app;
pub mod args;
pub mod commands;
pub mod config_cmd;
pub mod presenter;
pub mod signals;

// Re-export commonly used types
pub use app::{run_composer, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ComposerOptions, ConfigAction};
pub use commands::ComposerCommand;
pub use presenter::Presenter;
