//! Composer input lines

use std::str::FromStr;

use thiserror::Error;

/// One line typed into the composer.
///
/// Message numbers are shown to the user starting at 1; the parsed command
/// carries the 0-based registry index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerCommand {
    Record,
    Pause,
    Resume,
    Send,
    Discard,
    Speed { index: usize },
    Play { index: usize },
    Stop,
    List,
    Help,
    Quit,
    /// Anything that is not a command
    Text(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("'{0}' needs a message number, e.g. '{0} 1'")]
    MissingNumber(String),

    #[error("Invalid message number '{0}' (numbers start at 1)")]
    InvalidNumber(String),
}

fn message_index(command: &str, arg: Option<&str>) -> Result<usize, CommandParseError> {
    let arg = arg.ok_or_else(|| CommandParseError::MissingNumber(command.to_string()))?;
    match arg.trim_start_matches('#').parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(CommandParseError::InvalidNumber(arg.to_string())),
    }
}

impl FromStr for ComposerCommand {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let trimmed = line.trim();
        let mut words = trimmed.split_whitespace();
        let Some(first) = words.next() else {
            return Ok(Self::Empty);
        };
        let word = first.to_lowercase();
        let arg = words.next();
        let extra = words.next().is_some();

        let command = match (word.as_str(), arg) {
            ("speed", _) if !extra => Self::Speed {
                index: message_index("speed", arg)?,
            },
            ("play", _) if !extra => Self::Play {
                index: message_index("play", arg)?,
            },
            ("record" | "r", None) => Self::Record,
            ("pause" | "p", None) => Self::Pause,
            ("resume", None) => Self::Resume,
            ("send" | "s", None) => Self::Send,
            ("discard" | "d", None) => Self::Discard,
            ("stop", None) => Self::Stop,
            ("list" | "ls", None) => Self::List,
            ("help" | "?", None) => Self::Help,
            ("quit" | "q" | "exit", None) => Self::Quit,
            _ => Self::Text(trimmed.to_string()),
        };
        Ok(command)
    }
}
