//! Core library for driving the Subversion command-line client.
//!
//! The crate is layered around the lifetime of a single svn invocation:
//! - building the argument vector for an operation
//! - running the tool and capturing both output streams
//! - decoding stdout, or classifying stderr into a typed error
//!
//! [`client::Client`] ties the layers together behind one method per
//! operation.

#![warn(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::pedantic,
    missing_docs
)]
#![cfg_attr(
    not(test),
    deny(
        clippy::dbg_macro,
        clippy::expect_used,
        clippy::panic,
        clippy::print_stderr,
        clippy::print_stdout,
        clippy::todo,
        clippy::unwrap_used
    )
)]

use std::time::Duration;

/// Client façade exposing one method per svn operation.
pub mod client;
/// Argument vector construction.
pub mod command;
/// XML decoding of svn output.
pub mod decode;
/// Classification of svn diagnostics into typed errors.
pub mod diagnostic;
/// Child process execution.
pub mod process;

pub use client::{Client, CleanupOptions, CommitOptions, RevertOptions, UpdateOptions};
pub use subwrap_api::{
    ChangeKind, ConflictAction, Depth, DiffResult, ItemPath, LogEntry, NodeKind, Revision,
    SymbolicRevision,
};

/// Common result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The svn executable could not be launched.
    #[error("is the svn command-line client installed? `{program}` could not be found on PATH")]
    ToolNotInstalled {
        /// Program name or path that failed to spawn.
        program: String,
    },
    /// The requested working directory does not exist.
    #[error("working directory {path} does not exist")]
    WorkingDirectoryMissing {
        /// Path that was requested.
        path: String,
    },
    /// The requested working directory is not a directory.
    #[error("working directory {path} is not a directory")]
    NotADirectory {
        /// Path that was requested.
        path: String,
    },
    /// svn does not know the requested revision.
    #[error("no such revision {revision}")]
    RevisionNotFound {
        /// Revision token reported by svn.
        revision: String,
    },
    /// svn rejected the revision argument.
    #[error("{snippet} is not valid revision syntax")]
    RevisionSyntax {
        /// Quoted argument as printed by svn.
        snippet: String,
    },
    /// An earlier svn operation left the working copy locked.
    #[error("previous operation has not finished; run cleanup if it was interrupted")]
    OperationInProgress,
    /// The working copy administrative database is damaged.
    #[error("working copy database is malformed or corrupt")]
    WorkingCopyCorrupted,
    /// The commit touched items that are out of date.
    #[error("commit conflict: one or more items are out of date, update before committing")]
    CommitConflict,
    /// One or more paths are locked by another working copy operation.
    #[error("locked: {paths}")]
    FileLocked {
        /// Comma-separated list of locked paths.
        paths: String,
    },
    /// A pristine text referenced by the working copy is missing.
    #[error("pristine text with checksum {checksum} was not found")]
    ChecksumNotFound {
        /// Checksum reported by svn.
        checksum: String,
    },
    /// The targets of the operation are not inside a working copy.
    #[error("no working copy found for the operation's targets")]
    NoWorkingCopyTargets,
    /// stdout could not be decoded into the expected shape.
    #[error("failed to parse svn {operation} output: {message}")]
    OutputParse {
        /// Subcommand whose output was being decoded.
        operation: &'static str,
        /// Decoder diagnostic.
        message: String,
    },
    /// svn failed with a diagnostic this crate does not recognize.
    #[error("svn {operation} failed: {diagnostic}")]
    ToolFailure {
        /// Subcommand that failed.
        operation: &'static str,
        /// Raw diagnostic with line breaks replaced by spaces.
        diagnostic: String,
    },
    /// The svn child process exceeded the configured deadline.
    #[error("svn did not finish within {after:?}")]
    Timeout {
        /// Configured deadline.
        after: Duration,
    },
    /// Filesystem or process interaction failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Filesystem path or program involved in the failed operation.
        path: String,
        /// Source I/O error returned by the standard library.
        #[source]
        source: std::io::Error,
    },
}
