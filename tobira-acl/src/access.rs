// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two actions which can be granted to a role. Write access is assumed to also contain read
/// access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Permission to see and watch an item.
    Read,

    /// Permission to change an item, including its access list.
    Write,
}

impl Action {
    /// Both actions, in increasing order of access.
    pub const ALL: [Action; 2] = [Action::Read, Action::Write];

    /// Action is Write.
    pub fn is_write(&self) -> bool {
        matches!(self, Action::Write)
    }

    /// Returns `true` if holding this action also grants the other.
    pub fn includes(&self, other: Action) -> bool {
        *self >= other
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::Read => "read",
            Action::Write => "write",
        };

        write!(f, "{}", s)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown action '{0}', expected 'read' or 'write'")]
pub struct ParseActionError(String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Action::Read),
            "write" => Ok(Action::Write),
            other => Err(ParseActionError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Action;

    #[test]
    fn write_includes_read() {
        assert!(Action::Write.includes(Action::Read));
        assert!(Action::Write.includes(Action::Write));
        assert!(!Action::Read.includes(Action::Write));
        assert!(Action::Read < Action::Write);
    }

    #[test]
    fn parse_and_display() {
        for action in Action::ALL {
            assert_eq!(action.to_string().parse::<Action>(), Ok(action));
        }
        assert!("manage".parse::<Action>().is_err());
    }
}
