//! CLI presenter for output formatting

use std::io::{self, Write};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::format_duration;
use crate::domain::playback::RecordingEntry;
use crate::domain::recording::CaptureStatus;

const HELP: &[(&str, &str)] = &[
    ("record, r", "start a new take"),
    ("pause, p", "pause the take"),
    ("resume", "continue a paused take"),
    ("send, s", "stop the take and add it to the messages"),
    ("discard, d", "stop the take and throw it away"),
    ("play <n>", "play message n"),
    ("speed <n>", "cycle message n through 1x, 1.5x, 2x"),
    ("stop", "stop playback"),
    ("list, ls", "show sent messages"),
    ("quit, q", "discard any take and exit"),
];

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    pub fn is_spinner_active(&self) -> bool {
        self.spinner.is_some()
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print a line without tearing the spinner
    fn line(&self, text: String) {
        match self.spinner {
            Some(ref spinner) => spinner.println(text),
            None => eprintln!("{}", text),
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        self.line(format!("{} {}", "ℹ".cyan(), message));
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        self.line(format!("{} {}", "✓".green(), message));
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        self.line(format!("{} {}", "⚠".yellow(), message));
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        self.line(format!("{} {}", "✗".red(), message));
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Output text to stdout without newline
    pub fn output_inline(&self, text: &str) {
        print!("{}", text);
        let _ = io::stdout().flush();
    }

    /// Status line for the take in progress, e.g. "● Recording 00:07"
    pub fn format_status(&self, status: CaptureStatus, elapsed_seconds: u64) -> String {
        let clock = format_duration(elapsed_seconds);
        match status {
            CaptureStatus::Recording => format!("{} Recording {}", "●".red(), clock),
            CaptureStatus::Paused => format!("{} Paused {}", "‖".yellow(), clock),
            CaptureStatus::Idle => format!("Idle {}", clock),
        }
    }

    /// One row of the message list, e.g. "#2  00:05  1.5x"
    pub fn format_entry(&self, index: usize, entry: &RecordingEntry) -> String {
        let mut row = format!(
            "{}  {}  {}",
            format!("#{}", index + 1).cyan(),
            format_duration(entry.duration_seconds()),
            entry.speed().label()
        );
        if entry.current_time() > 0.0 {
            row.push_str(&format!("  (at {})", format_duration(entry.current_time() as u64)));
        }
        row
    }

    /// Show the message list
    pub fn entries(&self, entries: &[RecordingEntry]) {
        if entries.is_empty() {
            self.info("No messages yet");
            return;
        }
        for (index, entry) in entries.iter().enumerate() {
            self.output(&self.format_entry(index, entry));
        }
    }

    /// Show composer commands
    pub fn help(&self) {
        for (command, description) in HELP {
            self.output(&format!("  {} {}", format!("{:<12}", command).cyan(), description));
        }
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
