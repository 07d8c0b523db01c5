//! Classification of svn's error stream into typed errors.
//!
//! svn prefixes every error line with a code such as `E160006`. The codes are
//! matched against a fixed, ordered table and the first hit wins, so a
//! diagnostic carrying several codes always maps to the same error.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::command::Subcommand;
use crate::Error;

/// One row of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticRule {
    /// Diagnostic code that must appear in the text.
    pub code: &'static str,
    /// Additional text that must appear for codes svn reuses across failures.
    pub marker: Option<&'static str>,
    build: fn(&'static str, &str) -> Error,
}

impl DiagnosticRule {
    const fn new(code: &'static str, build: fn(&'static str, &str) -> Error) -> Self {
        Self {
            code,
            marker: None,
            build,
        }
    }

    const fn with_marker(mut self, marker: &'static str) -> Self {
        self.marker = Some(marker);
        self
    }

    fn matches(&self, diagnostic: &str) -> bool {
        diagnostic.contains(self.code)
            && self
                .marker
                .map_or(true, |marker| diagnostic.contains(marker))
    }
}

/// Classification table in match order.
pub static RULES: &[DiagnosticRule] = &[
    DiagnosticRule::new("E155037", |_, _| Error::OperationInProgress),
    DiagnosticRule::new("E155004", file_locked),
    DiagnosticRule::new("E200030", |_, _| Error::WorkingCopyCorrupted),
    DiagnosticRule::new("E155016", |_, _| Error::WorkingCopyCorrupted),
    DiagnosticRule::new("E160006", revision_not_found),
    DiagnosticRule::new("E205000", revision_syntax).with_marker("Syntax error in revision"),
    DiagnosticRule::new("E155011", |_, _| Error::CommitConflict),
    DiagnosticRule::new("E160028", |_, _| Error::CommitConflict),
    DiagnosticRule::new("E170004", |_, _| Error::CommitConflict),
    DiagnosticRule::new("E155010", checksum_not_found).with_marker("Pristine text"),
    DiagnosticRule::new("E155007", |_, _| Error::NoWorkingCopyTargets),
];

/// Turn a non-empty svn error stream into the matching error.
///
/// Unrecognized diagnostics become [`Error::ToolFailure`] with line breaks
/// folded into spaces.
#[must_use]
pub fn classify(operation: Subcommand, diagnostic: &str) -> Error {
    match RULES.iter().find(|rule| rule.matches(diagnostic)) {
        Some(rule) => {
            debug!(operation = %operation, code = rule.code, "classified svn diagnostic");
            (rule.build)(rule.code, diagnostic)
        }
        None => {
            debug!(operation = %operation, "unrecognized svn diagnostic");
            Error::ToolFailure {
                operation: operation.as_str(),
                diagnostic: normalize_whitespace(diagnostic),
            }
        }
    }
}

fn revision_not_found(code: &'static str, diagnostic: &str) -> Error {
    let line = diagnostic
        .lines()
        .find(|line| line.contains(code))
        .unwrap_or(diagnostic);
    let revision = line.split_whitespace().last().unwrap_or_default();
    Error::RevisionNotFound {
        revision: revision.to_owned(),
    }
}

fn revision_syntax(_code: &'static str, diagnostic: &str) -> Error {
    let snippet = quoted_pattern()
        .find(diagnostic)
        .map_or_else(|| normalize_whitespace(diagnostic), |found| found.as_str().to_owned());
    Error::RevisionSyntax { snippet }
}

fn file_locked(_code: &'static str, diagnostic: &str) -> Error {
    let mut paths: Vec<&str> = Vec::new();
    for captures in locked_pattern().captures_iter(diagnostic) {
        let Some(path) = captures.get(1).map(|found| found.as_str()) else {
            continue;
        };
        if path.starts_with("svn ") || paths.contains(&path) {
            continue;
        }
        paths.push(path);
    }

    let paths = if paths.is_empty() {
        "working copy".to_owned()
    } else {
        paths.join(", ")
    };
    Error::FileLocked { paths }
}

fn checksum_not_found(_code: &'static str, diagnostic: &str) -> Error {
    let checksum = quoted_pattern()
        .captures(diagnostic)
        .and_then(|captures| captures.get(1))
        .map_or("unknown", |found| found.as_str());
    Error::ChecksumNotFound {
        checksum: checksum.to_owned(),
    }
}

fn normalize_whitespace(diagnostic: &str) -> String {
    diagnostic.lines().map(str::trim_end).collect::<Vec<_>>().join(" ")
}

#[allow(clippy::expect_used)]
fn quoted_pattern() -> &'static Regex {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    QUOTED.get_or_init(|| Regex::new(r"'([^']*)'").expect("quoted pattern compiles"))
}

#[allow(clippy::expect_used)]
fn locked_pattern() -> &'static Regex {
    static LOCKED: OnceLock<Regex> = OnceLock::new();
    LOCKED.get_or_init(|| {
        Regex::new(r"'([^'\n]+)'\s+(?:is\s+)?(?:already\s+)?locked")
            .expect("locked pattern compiles")
    })
}
