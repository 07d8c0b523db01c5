use std::fmt;

use serde::{Deserialize, Serialize};

/// Recursion scope of an operation over a directory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    /// Only the target itself.
    Empty,
    /// The target and its immediate file children.
    Files,
    /// The target and all of its immediate children.
    Immediates,
    /// The target and everything below it.
    Infinity,
}

impl Depth {
    /// Value passed to `--depth`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Files => "files",
            Self::Immediates => "immediates",
            Self::Infinity => "infinity",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Automatic conflict resolution strategy passed to `--accept`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictAction {
    /// Mark the conflict to be resolved later.
    Postpone,
    /// Keep the current working file.
    Working,
    /// Choose the pristine base file.
    Base,
    /// Prefer local changes for conflicted hunks only.
    MineConflict,
    /// Prefer incoming changes for conflicted hunks only.
    TheirsConflict,
    /// Take the local file as a whole.
    MineFull,
    /// Take the incoming file as a whole.
    TheirsFull,
}

impl ConflictAction {
    /// Value passed to `--accept`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postpone => "postpone",
            Self::Working => "working",
            Self::Base => "base",
            Self::MineConflict => "mine-conflict",
            Self::TheirsConflict => "theirs-conflict",
            Self::MineFull => "mine-full",
            Self::TheirsFull => "theirs-full",
        }
    }
}

impl fmt::Display for ConflictAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_serializes_like_the_flag_value() {
        for depth in [Depth::Empty, Depth::Files, Depth::Immediates, Depth::Infinity] {
            let json = serde_json::to_string(&depth).expect("serialize depth");
            assert_eq!(json, format!("\"{}\"", depth.as_str()));
        }
    }

    #[test]
    fn conflict_action_uses_kebab_case() {
        let json = serde_json::to_string(&ConflictAction::TheirsConflict).expect("serialize");
        assert_eq!(json, "\"theirs-conflict\"");
        assert_eq!(ConflictAction::MineFull.to_string(), "mine-full");
    }
}
