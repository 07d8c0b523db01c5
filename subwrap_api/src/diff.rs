use serde::{Deserialize, Serialize};

/// Summary of the paths that changed between two revisions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiffResult {
    /// Changed paths in the order the tool reported them.
    #[serde(default)]
    pub paths: Vec<ItemPath>,
}

impl DiffResult {
    /// Wrap an ordered list of changed paths.
    #[must_use]
    pub const fn new(paths: Vec<ItemPath>) -> Self {
        Self { paths }
    }

    /// Returns `true` when no path changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of changed paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

/// One changed path from `svn diff --summarize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPath {
    /// How the node itself changed.
    pub item: ChangeKind,
    /// How the node's properties changed.
    pub props: ChangeKind,
    /// Whether the node is a file or a directory.
    pub kind: NodeKind,
    /// Path or URL of the node as printed by the tool.
    pub path: String,
}

/// Status word used by svn for content and property changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChangeKind {
    /// No change.
    None,
    /// Unchanged, versioned item.
    Normal,
    /// Scheduled for or recorded as an addition.
    Added,
    /// Content or properties modified.
    Modified,
    /// Scheduled for or recorded as a deletion.
    Deleted,
    /// Deleted and re-added in the same revision.
    Replaced,
    /// In a conflicted state.
    Conflicted,
    /// Merged from incoming changes.
    Merged,
    /// Versioned but missing from disk.
    Missing,
    /// Obstructed by an item of a different kind.
    Obstructed,
    /// Not under version control.
    Unversioned,
    /// Pulled in by an externals definition.
    External,
    /// Ignored by svn:ignore rules.
    Ignored,
    /// Directory with incomplete contents.
    Incomplete,
    /// Any status word this crate does not know about, including an empty
    /// one.
    Unknown(String),
}

impl ChangeKind {
    /// The status word exactly as svn prints it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Normal => "normal",
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Replaced => "replaced",
            Self::Conflicted => "conflicted",
            Self::Merged => "merged",
            Self::Missing => "missing",
            Self::Obstructed => "obstructed",
            Self::Unversioned => "unversioned",
            Self::External => "external",
            Self::Ignored => "ignored",
            Self::Incomplete => "incomplete",
            Self::Unknown(other) => other,
        }
    }
}

impl From<&str> for ChangeKind {
    fn from(value: &str) -> Self {
        match value {
            "none" => Self::None,
            "normal" => Self::Normal,
            "added" => Self::Added,
            "modified" => Self::Modified,
            "deleted" => Self::Deleted,
            "replaced" => Self::Replaced,
            "conflicted" => Self::Conflicted,
            "merged" => Self::Merged,
            "missing" => Self::Missing,
            "obstructed" => Self::Obstructed,
            "unversioned" => Self::Unversioned,
            "external" => Self::External,
            "ignored" => Self::Ignored,
            "incomplete" => Self::Incomplete,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

impl From<String> for ChangeKind {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ChangeKind> for String {
    fn from(kind: ChangeKind) -> Self {
        kind.as_str().to_owned()
    }
}

/// Node type reported for a changed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
    /// Node does not exist on this side of the comparison.
    None,
    /// Kind could not be determined.
    Unknown,
}

impl From<&str> for NodeKind {
    fn from(value: &str) -> Self {
        match value {
            "file" => Self::File,
            "dir" => Self::Dir,
            "none" => Self::None,
            _ => Self::Unknown,
        }
    }
}
