use std::fmt;

use serde::{Deserialize, Serialize};

/// Named revisions understood by svn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolicRevision {
    /// Latest revision in the repository.
    Head,
    /// Revision the working copy item was checked out at.
    Base,
    /// Last revision at or before BASE in which the item changed.
    Committed,
    /// Revision immediately before COMMITTED.
    Prev,
}

impl SymbolicRevision {
    /// Keyword as svn expects it on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Head => "HEAD",
            Self::Base => "BASE",
            Self::Committed => "COMMITTED",
            Self::Prev => "PREV",
        }
    }
}

/// A point or range in history.
///
/// Range expressions are passed through untouched; svn validates them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Revision {
    /// A named revision such as `HEAD`.
    Symbolic(SymbolicRevision),
    /// A revision number.
    Number(u64),
    /// A free-form expression such as `1:3` or `HEAD:1`.
    Range(String),
}

impl Revision {
    /// Normalized command-line form.
    #[must_use]
    pub fn as_arg(&self) -> String {
        match self {
            Self::Symbolic(symbolic) => symbolic.as_str().to_owned(),
            Self::Number(number) => number.to_string(),
            Self::Range(expression) => expression.clone(),
        }
    }
}

impl Default for Revision {
    /// Full history, newest first.
    fn default() -> Self {
        Self::Range("HEAD:1".into())
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_arg())
    }
}

impl From<u64> for Revision {
    fn from(number: u64) -> Self {
        Self::Number(number)
    }
}

impl From<SymbolicRevision> for Revision {
    fn from(symbolic: SymbolicRevision) -> Self {
        Self::Symbolic(symbolic)
    }
}

impl From<&str> for Revision {
    fn from(expression: &str) -> Self {
        Self::Range(expression.to_owned())
    }
}

impl From<String> for Revision {
    fn from(expression: String) -> Self {
        Self::Range(expression)
    }
}
