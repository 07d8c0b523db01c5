//! Execution of the svn binary as a child process.

use std::env;
use std::ffi::{OsStr, OsString};
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::{Error, Result};

const DEFAULT_PROGRAM: &str = "svn";
const PROGRAM_ENV: &str = "SUBWRAP_SVN_BIN";
const TIMEOUT_ENV: &str = "SUBWRAP_TIMEOUT_SECS";

/// Captured result of one finished invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// Trimmed standard output.
    pub stdout: String,
    /// Trimmed standard error.
    pub stderr: String,
    /// Exit code, `None` when the child was terminated by a signal.
    pub status: Option<i32>,
}

impl ProcessOutput {
    /// Returns `true` when the child exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.status, Some(0))
    }
}

/// Runs svn argument vectors.
///
/// [`SvnCli`] is the production implementation; tests substitute recording
/// fakes.
pub trait CommandRunner: Send + Sync {
    /// Program name reported in errors and logs.
    fn program(&self) -> &OsStr;

    /// Execute `args` with `cwd` as the working directory (inherited when
    /// `None`) and wait for the child to exit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotInstalled`] when the program cannot be found,
    /// [`Error::Timeout`] when a configured deadline expires, and
    /// [`Error::Io`] for any other spawn or pipe failure.
    fn run(&self, cwd: Option<&Path>, args: &[String]) -> Result<ProcessOutput>;
}

/// Runner backed by the locally installed svn binary.
#[derive(Debug, Clone)]
pub struct SvnCli {
    program: OsString,
    timeout: Option<Duration>,
}

impl SvnCli {
    /// Runner for an explicit program with no deadline.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Runner configured from `SUBWRAP_SVN_BIN` and `SUBWRAP_TIMEOUT_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        let program = env::var_os(PROGRAM_ENV)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| OsString::from(DEFAULT_PROGRAM));
        let timeout = env::var(TIMEOUT_ENV)
            .ok()
            .as_deref()
            .and_then(parse_timeout);
        Self { program, timeout }
    }

    /// Kill the child and fail with [`Error::Timeout`] after `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Configured deadline, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn display_program(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl Default for SvnCli {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl CommandRunner for SvnCli {
    fn program(&self) -> &OsStr {
        &self.program
    }

    fn run(&self, cwd: Option<&Path>, args: &[String]) -> Result<ProcessOutput> {
        let mut command = Command::new(&self.program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        debug!(
            program = %self.display_program(),
            ?args,
            ?cwd,
            timeout = ?self.timeout(),
            "spawning svn"
        );

        let mut child = command.spawn().map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                Error::ToolNotInstalled {
                    program: self.display_program(),
                }
            } else {
                Error::Io {
                    path: self.display_program(),
                    source,
                }
            }
        })?;

        let stdout_handle = child.stdout.take().map(spawn_reader);
        let stderr_handle = child.stderr.take().map(spawn_reader);

        let status = match self.timeout {
            None => child.wait(),
            Some(limit) => match child.wait_timeout(limit) {
                Ok(Some(status)) => Ok(status),
                Ok(None) => {
                    warn!(program = %self.display_program(), ?args, ?limit, "svn timed out, killing child");
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::Timeout { after: limit });
                }
                Err(err) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    Err(err)
                }
            },
        }
        .map_err(|source| Error::Io {
            path: self.display_program(),
            source,
        })?;

        let stdout = join_reader(stdout_handle, &self.display_program())?;
        let stderr = join_reader(stderr_handle, &self.display_program())?;

        debug!(
            program = %self.display_program(),
            status = ?status.code(),
            stderr_len = stderr.len(),
            "svn finished"
        );

        Ok(ProcessOutput {
            stdout: stdout.trim().to_owned(),
            stderr: stderr.trim().to_owned(),
            status: status.code(),
        })
    }
}

fn spawn_reader<R>(mut stream: R) -> JoinHandle<io::Result<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn join_reader(handle: Option<JoinHandle<io::Result<Vec<u8>>>>, program: &str) -> Result<String> {
    match handle {
        Some(handle) => {
            let bytes = handle
                .join()
                .map_err(|_| Error::Io {
                    path: program.to_owned(),
                    source: io::Error::new(io::ErrorKind::Other, "output reader panicked"),
                })?
                .map_err(|source| Error::Io {
                    path: program.to_owned(),
                    source,
                })?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        None => Ok(String::new()),
    }
}

fn parse_timeout(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timeout_ignores_zero_and_garbage() {
        assert_eq!(parse_timeout("30"), Some(Duration::from_secs(30)));
        assert_eq!(parse_timeout(" 5 "), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout("0"), None);
        assert_eq!(parse_timeout(""), None);
        assert_eq!(parse_timeout("soon"), None);
    }

    #[test]
    fn deadline_is_opt_in() {
        assert_eq!(SvnCli::default().timeout(), None);
        let runner = SvnCli::new("svn").with_timeout(Duration::from_secs(9));
        assert_eq!(runner.timeout(), Some(Duration::from_secs(9)));
        assert_eq!(runner.program(), OsStr::new("svn"));
    }

    #[test]
    fn missing_program_is_reported_as_not_installed() {
        let runner = SvnCli::new("subwrap-definitely-not-a-real-binary");
        let err = runner.run(None, &["--version".to_owned()]);
        assert!(matches!(err, Err(Error::ToolNotInstalled { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn captures_and_trims_both_streams() {
        let runner = SvnCli::new("sh");
        let args = vec![
            "-c".to_owned(),
            "printf '  out\\n\\n'; printf '\\n err  \\n' >&2; exit 3".to_owned(),
        ];
        let output = runner.run(None, &args).expect("run sh");

        assert_eq!(output.stdout, "out");
        assert_eq!(output.stderr, "err");
        assert_eq!(output.status, Some(3));
        assert!(!output.success());
    }

    #[cfg(unix)]
    #[test]
    fn drains_large_output_without_deadlock() {
        let runner = SvnCli::new("sh");
        let args = vec![
            "-c".to_owned(),
            "head -c 300000 /dev/zero | tr '\\0' a; head -c 300000 /dev/zero | tr '\\0' b >&2"
                .to_owned(),
        ];
        let output = runner.run(None, &args).expect("run sh");

        assert_eq!(output.stdout.len(), 300_000);
        assert_eq!(output.stderr.len(), 300_000);
        assert!(output.success());
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_requested_directory() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let runner = SvnCli::new("pwd");
        let output = runner.run(Some(temp.path()), &[]).expect("run pwd");

        let reported = std::fs::canonicalize(output.stdout).expect("canonical pwd");
        let expected = std::fs::canonicalize(temp.path()).expect("canonical temp");
        assert_eq!(reported, expected);
    }

    #[cfg(unix)]
    #[test]
    fn deadline_kills_slow_child() {
        let runner = SvnCli::new("sleep").with_timeout(Duration::from_millis(100));
        let err = runner.run(None, &["5".to_owned()]);
        assert!(matches!(err, Err(Error::Timeout { .. })));
    }
}
