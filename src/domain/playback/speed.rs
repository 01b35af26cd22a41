//! Playback speed value object

use std::fmt;

/// One of the three fixed replay rates, cycled in order 1x -> 1.5x -> 2x -> 1x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackSpeed {
    #[default]
    Normal,
    OneAndHalf,
    Double,
}

impl PlaybackSpeed {
    /// Rate multiplier handed to the playback element
    pub const fn rate(&self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::OneAndHalf => 1.5,
            Self::Double => 2.0,
        }
    }

    /// The next speed in the cycle
    pub const fn next(&self) -> Self {
        match self {
            Self::Normal => Self::OneAndHalf,
            Self::OneAndHalf => Self::Double,
            Self::Double => Self::Normal,
        }
    }

    /// Short label for the speed button
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Normal => "1x",
            Self::OneAndHalf => "1.5x",
            Self::Double => "2x",
        }
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
