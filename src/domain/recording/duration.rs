//! Duration value object and take clock formatting

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default cap on a single take (5 minutes)
pub const DEFAULT_MAX_TAKE_SECS: u64 = 300;

/// Default time to wait for the device to hand over a finished take
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 5;

/// Value object for configured time spans (take limit, stop timeout).
/// Always positive; parsed from strings like "30s", "5m", "2m30s".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    /// Default maximum take length
    pub const fn default_max_take() -> Self {
        Self::from_secs(DEFAULT_MAX_TAKE_SECS)
    }

    /// Default stop timeout
    pub const fn default_stop_timeout() -> Self {
        Self::from_secs(DEFAULT_STOP_TIMEOUT_SECS)
    }

    /// Whole seconds, truncated
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

/// Render a whole number of seconds as a zero-padded `MM:SS` clock.
///
/// Minutes are not wrapped into hours, so a 100 minute take renders as
/// `100:00`.
pub fn format_duration(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Accepts "30s", "5m", "2m30s" (case-insensitive, surrounding whitespace ignored)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationParseError {
            input: s.to_string(),
        };
        let input = s.trim().to_lowercase();

        let mut minutes: Option<u64> = None;
        let mut seconds: Option<u64> = None;
        let mut digits = String::new();

        for ch in input.chars() {
            match ch {
                '0'..='9' => digits.push(ch),
                'm' if !digits.is_empty() && minutes.is_none() && seconds.is_none() => {
                    minutes = Some(digits.parse().map_err(|_| invalid())?);
                    digits.clear();
                }
                's' if !digits.is_empty() && seconds.is_none() => {
                    seconds = Some(digits.parse().map_err(|_| invalid())?);
                    digits.clear();
                }
                _ => return Err(invalid()),
            }
        }

        // Trailing digits without a unit
        if !digits.is_empty() || (minutes.is_none() && seconds.is_none()) {
            return Err(invalid());
        }

        let total_secs = minutes
            .unwrap_or(0)
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds.unwrap_or(0)))
            .ok_or_else(invalid)?;

        if total_secs == 0 {
            return Err(invalid());
        }

        total_secs
            .checked_mul(1000)
            .map(Self::from_millis)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;

        match (minutes, seconds) {
            (0, s) => write!(f, "{}s", s),
            (m, 0) => write!(f, "{}m", m),
            (m, s) => write!(f, "{}m{}s", m, s),
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_max_take()
    }
}
