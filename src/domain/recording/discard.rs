//! What discarding a take is allowed to touch

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DiscardPolicyParseError;

/// Whether discarding an in-progress take also drops the last sent message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscardPolicy {
    /// Discard only abandons the take in progress
    #[default]
    KeepCommitted,
    /// Discard also removes the most recently sent message, if any
    DropLastCommitted,
}

impl DiscardPolicy {
    pub const ALL: [DiscardPolicy; 2] = [Self::KeepCommitted, Self::DropLastCommitted];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::KeepCommitted => "keep-committed",
            Self::DropLastCommitted => "drop-last-committed",
        }
    }

    pub const fn drops_last_committed(&self) -> bool {
        matches!(self, Self::DropLastCommitted)
    }
}

impl fmt::Display for DiscardPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscardPolicy {
    type Err = DiscardPolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| DiscardPolicyParseError {
                input: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keeps_committed_entries() {
        assert_eq!(DiscardPolicy::default(), DiscardPolicy::KeepCommitted);
        assert!(!DiscardPolicy::default().drops_last_committed());
    }

    #[test]
    fn parses_both_policies() {
        assert_eq!(
            "keep-committed".parse::<DiscardPolicy>().unwrap(),
            DiscardPolicy::KeepCommitted
        );
        assert_eq!(
            " Drop-Last-Committed ".parse::<DiscardPolicy>().unwrap(),
            DiscardPolicy::DropLastCommitted
        );
        assert!("sometimes".parse::<DiscardPolicy>().is_err());
    }
}
