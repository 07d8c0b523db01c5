//! Client façade over the svn command-line tool.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use subwrap_api::{ConflictAction, Depth, DiffResult, LogEntry, Revision};
use tracing::debug;

use crate::command::{CommandOptions, OperationRequest, Subcommand};
use crate::decode::{decode_diff, decode_log};
use crate::diagnostic::classify;
use crate::process::{CommandRunner, SvnCli};
use crate::{Error, Result};

const PROBE_ARGS: [&str; 2] = ["--version", "--quiet"];

/// Flags accepted by [`Client::revert`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevertOptions {
    /// Descend into directories, same as `Depth::Infinity`.
    pub recursive: bool,
    /// Remove reverted additions from disk as well.
    pub remove_added: bool,
    /// Limit the operation by depth.
    pub depth: Option<Depth>,
}

/// Flags and targets accepted by [`Client::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct UpdateOptions {
    /// Paths to update; the whole working copy when empty.
    pub targets: Vec<String>,
    /// Revision to synchronize to; HEAD when unset.
    pub revision: Option<u64>,
    /// Automatic conflict resolution.
    pub accept: Option<ConflictAction>,
    /// New working copy depth for the targets.
    pub depth: Option<Depth>,
    /// Treat unversioned obstructions as local changes.
    pub force: bool,
    /// Skip externals definitions.
    pub ignore_externals: bool,
    /// Check out missing parent directories of the targets.
    pub parents: bool,
    /// Merge local additions with incoming additions instead of raising a
    /// tree conflict.
    pub adds_as_modification: bool,
}

/// Flags accepted by [`Client::cleanup`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct CleanupOptions {
    /// Delete unversioned files.
    pub remove_unversioned: bool,
    /// Delete ignored files.
    pub remove_ignored: bool,
    /// Drop pristine copies no longer referenced.
    pub vacuum_pristines: bool,
    /// Clean up externals as well.
    pub include_externals: bool,
}

/// Target and flags accepted by [`Client::commit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOptions {
    /// Path to commit; the whole working copy when unset.
    pub path: Option<String>,
    /// Limit the operation by depth.
    pub depth: Option<Depth>,
    /// Keep locks on committed paths.
    pub no_unlock: bool,
    /// Recurse into externals defined with a fixed revision.
    pub include_externals: bool,
}

/// Handle to an svn working copy.
///
/// The client is immutable after construction and holds no state between
/// calls beyond the working directory, so it can be shared across threads.
/// svn's own working copy lock is the only coordination between concurrent
/// calls.
#[derive(Clone)]
pub struct Client {
    cwd: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl Client {
    /// Open a client for `path` using the svn binary configured by the
    /// environment.
    ///
    /// # Errors
    ///
    /// See [`Client::with_runner`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_runner(path, Arc::new(SvnCli::from_env()))
    }

    /// Open a client for `path` that executes commands through `runner`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotInstalled`] when the trial invocation cannot
    /// launch svn, [`Error::WorkingDirectoryMissing`] when `path` does not
    /// exist, [`Error::NotADirectory`] when it is not a directory, and
    /// [`Error::Io`] when it cannot be canonicalized.
    pub fn with_runner(path: impl AsRef<Path>, runner: Arc<dyn CommandRunner>) -> Result<Self> {
        let probe: Vec<String> = PROBE_ARGS.iter().map(|arg| (*arg).to_owned()).collect();
        runner.run(None, &probe)?;

        let original = path.as_ref();
        if !original.exists() {
            return Err(Error::WorkingDirectoryMissing {
                path: display_path(original),
            });
        }
        if !original.is_dir() {
            return Err(Error::NotADirectory {
                path: display_path(original),
            });
        }

        let cwd = std::fs::canonicalize(original).map_err(|source| Error::Io {
            path: display_path(original),
            source,
        })?;
        debug!(cwd = %cwd.display(), "opened svn client");

        Ok(Self { cwd, runner })
    }

    /// Absolute working directory every command runs in.
    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Show log messages for `revision`, optionally restricted to `file`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RevisionNotFound`] or [`Error::RevisionSyntax`] for
    /// bad revisions, [`Error::OutputParse`] when the XML cannot be decoded,
    /// and any other classified svn failure.
    pub fn log(&self, file: Option<&str>, revision: impl Into<Revision>) -> Result<Vec<LogEntry>> {
        let request = OperationRequest::new(Subcommand::Log)
            .targets(file)
            .options(CommandOptions {
                xml: true,
                revision: Some(revision.into()),
                ..CommandOptions::default()
            });
        let xml = self.execute(&request)?;
        decode_log(&xml)
    }

    /// Full history of the working copy, newest first (`HEAD:1`).
    ///
    /// # Errors
    ///
    /// See [`Client::log`].
    pub fn log_all(&self) -> Result<Vec<LogEntry>> {
        self.log(None, Revision::default())
    }

    /// Summarize the paths changed between `start` and `end` (HEAD when
    /// unset).
    ///
    /// This first runs `svn update` on the whole working copy so the
    /// comparison baseline is current. The working copy is modified even
    /// though the diff itself is read-only.
    ///
    /// # Errors
    ///
    /// Returns any error from the implicit update, [`Error::RevisionNotFound`]
    /// for unknown revisions, and [`Error::OutputParse`] when the XML cannot
    /// be decoded.
    pub fn diff(&self, start: u64, end: Option<u64>) -> Result<DiffResult> {
        debug!(cwd = %self.cwd.display(), "updating working copy before diff");
        self.update(&UpdateOptions::default())?;

        let end = end.map_or_else(|| "HEAD".to_owned(), |revision| revision.to_string());
        let request = OperationRequest::new(Subcommand::Diff).options(CommandOptions {
            range: Some(format!("{start}:{end}")),
            xml: true,
            summarize: true,
            ..CommandOptions::default()
        });
        let xml = self.execute(&request)?;
        decode_diff(&xml)
    }

    /// Restore the pristine state of `path`, returning svn's report.
    ///
    /// # Errors
    ///
    /// Returns any classified svn failure.
    pub fn revert(&self, path: &str, options: &RevertOptions) -> Result<String> {
        let request = OperationRequest::new(Subcommand::Revert)
            .target(path)
            .options(CommandOptions {
                recursive: options.recursive,
                remove_added: options.remove_added,
                depth: options.depth,
                ..CommandOptions::default()
            });
        self.execute(&request)
    }

    /// Bring repository changes into the working copy, returning svn's
    /// report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RevisionNotFound`] for unknown revisions and any other
    /// classified svn failure.
    pub fn update(&self, options: &UpdateOptions) -> Result<String> {
        let request = OperationRequest::new(Subcommand::Update)
            .targets(options.targets.iter().cloned())
            .options(CommandOptions {
                revision: options.revision.map(Revision::from),
                accept: options.accept,
                depth: options.depth,
                force: options.force,
                ignore_externals: options.ignore_externals,
                parents: options.parents,
                adds_as_modification: options.adds_as_modification,
                ..CommandOptions::default()
            });
        self.execute(&request)
    }

    /// Recover the working copy from an interrupted operation.
    ///
    /// # Errors
    ///
    /// Returns any classified svn failure.
    pub fn cleanup(&self, options: &CleanupOptions) -> Result<String> {
        let request = OperationRequest::new(Subcommand::Cleanup).options(CommandOptions {
            remove_unversioned: options.remove_unversioned,
            remove_ignored: options.remove_ignored,
            vacuum_pristines: options.vacuum_pristines,
            include_externals: options.include_externals,
            ..CommandOptions::default()
        });
        self.execute(&request)
    }

    /// Send local changes to the repository with `message` as the log
    /// message.
    ///
    /// svn runs with `--non-interactive`. An empty `message` leaves out
    /// `--message` entirely, so svn fails with its own diagnostic instead of
    /// opening an editor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommitConflict`] when items are out of date,
    /// [`Error::FileLocked`] when paths are locked, and any other classified
    /// svn failure.
    pub fn commit(&self, message: &str, options: &CommitOptions) -> Result<String> {
        let request = OperationRequest::new(Subcommand::Commit)
            .targets(options.path.clone())
            .options(CommandOptions {
                message: Some(message.to_owned()),
                depth: options.depth,
                no_unlock: options.no_unlock,
                include_externals: options.include_externals,
                non_interactive: true,
                ..CommandOptions::default()
            });
        self.execute(&request)
    }

    /// Raw `svn info` output for the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoWorkingCopyTargets`] outside a working copy and any
    /// other classified svn failure.
    pub fn info(&self) -> Result<String> {
        self.execute(&OperationRequest::new(Subcommand::Info))
    }

    fn execute(&self, request: &OperationRequest) -> Result<String> {
        let subcommand = request.subcommand();
        let output = self.runner.run(Some(&self.cwd), &request.to_args())?;

        if !output.stderr.is_empty() {
            return Err(classify(subcommand, &output.stderr));
        }
        if !output.success() {
            let diagnostic = output.status.map_or_else(
                || "terminated by signal".to_owned(),
                |code| format!("exited with status {code}"),
            );
            return Err(Error::ToolFailure {
                operation: subcommand.as_str(),
                diagnostic,
            });
        }

        Ok(output.stdout)
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = OperationRequest::new(Subcommand::Info).to_args();
        let stats = self
            .runner
            .run(Some(&self.cwd), &args)
            .map(|output| output.stdout)
            .unwrap_or_default();

        if stats.is_empty() {
            return write!(
                f,
                "SVN Client - {} - no svn repository info to show",
                self.cwd.display()
            );
        }

        let signs = "=".repeat(longest_line_len(&stats));
        write!(f, "SVN Client\n{signs}\n{stats}\n{signs}")
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("cwd", &self.cwd)
            .field("program", &self.runner.program())
            .finish_non_exhaustive()
    }
}

fn longest_line_len(text: &str) -> usize {
    text.lines()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or_default()
}

fn display_path(path: &Path) -> String {
    path.to_path_buf()
        .into_os_string()
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessOutput;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct ScriptedRunner {
        calls: Mutex<Vec<Vec<String>>>,
        info: String,
    }

    impl CommandRunner for ScriptedRunner {
        fn program(&self) -> &std::ffi::OsStr {
            std::ffi::OsStr::new("svn")
        }

        fn run(&self, _cwd: Option<&Path>, args: &[String]) -> Result<ProcessOutput> {
            self.calls.lock().expect("calls lock").push(args.to_vec());
            let stdout = if args.first().map(String::as_str) == Some("info") {
                self.info.clone()
            } else {
                String::new()
            };
            Ok(ProcessOutput {
                stdout,
                stderr: String::new(),
                status: Some(0),
            })
        }
    }

    #[test]
    fn longest_line_counts_characters() {
        assert_eq!(longest_line_len("ab\nabcd\nä"), 4);
        assert_eq!(longest_line_len(""), 0);
    }

    #[test]
    fn display_frames_info_with_signs() -> Result<()> {
        let temp = TempDir::new().expect("tempdir");
        let runner = Arc::new(ScriptedRunner {
            info: "Path: .\nRevision: 3".into(),
            ..ScriptedRunner::default()
        });
        let client = Client::with_runner(temp.path(), runner)?;

        assert_eq!(
            client.to_string(),
            "SVN Client\n===========\nPath: .\nRevision: 3\n==========="
        );
        Ok(())
    }

    #[test]
    fn display_falls_back_to_working_directory() -> Result<()> {
        let temp = TempDir::new().expect("tempdir");
        let client = Client::with_runner(temp.path(), Arc::new(ScriptedRunner::default()))?;

        let rendered = client.to_string();
        assert!(rendered.contains(&client.cwd().display().to_string()));
        assert!(rendered.ends_with("no svn repository info to show"));
        Ok(())
    }

    #[test]
    fn construction_probes_the_tool_once() -> Result<()> {
        let temp = TempDir::new().expect("tempdir");
        let runner = Arc::new(ScriptedRunner::default());
        let _client = Client::with_runner(temp.path(), runner.clone())?;

        let calls = runner.calls.lock().expect("calls lock");
        assert_eq!(calls.as_slice(), [vec!["--version".to_owned(), "--quiet".to_owned()]]);
        Ok(())
    }
}
