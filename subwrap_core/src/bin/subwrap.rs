use std::io::{self, Write};

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use subwrap_core::{
    CleanupOptions, Client, CommitOptions, ConflictAction, Depth, Revision, RevertOptions,
    UpdateOptions,
};
use tracing_subscriber::EnvFilter;

/// Run svn operations and print typed results.
#[derive(Debug, Parser)]
#[command(name = "subwrap", version)]
struct Cli {
    /// Working copy directory.
    #[arg(long, default_value = ".")]
    cwd: Utf8PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show log entries as JSON.
    Log {
        /// Restrict the log to one file.
        #[arg(long)]
        file: Option<String>,
        /// Revision, keyword or range such as `1:3`.
        #[arg(long, default_value = "HEAD:1")]
        revision: String,
    },
    /// Summarize changed paths between two revisions as JSON. Updates the
    /// working copy first.
    Diff {
        start: u64,
        end: Option<u64>,
    },
    /// Undo local changes.
    Revert {
        path: String,
        #[arg(long)]
        recursive: bool,
        #[arg(long)]
        remove_added: bool,
        #[arg(long, value_enum)]
        depth: Option<DepthArg>,
    },
    /// Bring repository changes into the working copy.
    Update {
        targets: Vec<String>,
        #[arg(long)]
        revision: Option<u64>,
        #[arg(long, value_enum)]
        accept: Option<AcceptArg>,
        #[arg(long, value_enum)]
        depth: Option<DepthArg>,
        #[arg(long)]
        force: bool,
        #[arg(long)]
        ignore_externals: bool,
        #[arg(long)]
        parents: bool,
        #[arg(long)]
        adds_as_modification: bool,
    },
    /// Recover an interrupted working copy.
    Cleanup {
        #[arg(long)]
        remove_unversioned: bool,
        #[arg(long)]
        remove_ignored: bool,
        #[arg(long)]
        vacuum_pristines: bool,
        #[arg(long)]
        include_externals: bool,
    },
    /// Commit local changes.
    Commit {
        message: String,
        #[arg(long)]
        path: Option<String>,
        #[arg(long, value_enum)]
        depth: Option<DepthArg>,
        #[arg(long)]
        no_unlock: bool,
        #[arg(long)]
        include_externals: bool,
    },
    /// Print `svn info` framed with the working directory.
    Info,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DepthArg {
    Empty,
    Files,
    Immediates,
    Infinity,
}

impl From<DepthArg> for Depth {
    fn from(arg: DepthArg) -> Self {
        match arg {
            DepthArg::Empty => Self::Empty,
            DepthArg::Files => Self::Files,
            DepthArg::Immediates => Self::Immediates,
            DepthArg::Infinity => Self::Infinity,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AcceptArg {
    Postpone,
    Working,
    Base,
    MineConflict,
    TheirsConflict,
    MineFull,
    TheirsFull,
}

impl From<AcceptArg> for ConflictAction {
    fn from(arg: AcceptArg) -> Self {
        match arg {
            AcceptArg::Postpone => Self::Postpone,
            AcceptArg::Working => Self::Working,
            AcceptArg::Base => Self::Base,
            AcceptArg::MineConflict => Self::MineConflict,
            AcceptArg::TheirsConflict => Self::TheirsConflict,
            AcceptArg::MineFull => Self::MineFull,
            AcceptArg::TheirsFull => Self::TheirsFull,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let client = Client::open(cli.cwd.as_std_path())
        .with_context(|| format!("failed to open working copy {}", cli.cwd))?;

    run(&client, cli.command)
}

fn run(client: &Client, command: Command) -> Result<()> {
    match command {
        Command::Log { file, revision } => {
            let entries = client
                .log(file.as_deref(), parse_revision(&revision))
                .context("svn log failed")?;
            print_json(&entries)
        }
        Command::Diff { start, end } => {
            let diff = client.diff(start, end).context("svn diff failed")?;
            print_json(&diff)
        }
        Command::Revert {
            path,
            recursive,
            remove_added,
            depth,
        } => {
            let options = RevertOptions {
                recursive,
                remove_added,
                depth: depth.map(Depth::from),
            };
            let output = client
                .revert(&path, &options)
                .with_context(|| format!("svn revert {path} failed"))?;
            print_text(&output)
        }
        Command::Update {
            targets,
            revision,
            accept,
            depth,
            force,
            ignore_externals,
            parents,
            adds_as_modification,
        } => {
            let options = UpdateOptions {
                targets,
                revision,
                accept: accept.map(ConflictAction::from),
                depth: depth.map(Depth::from),
                force,
                ignore_externals,
                parents,
                adds_as_modification,
            };
            let output = client.update(&options).context("svn update failed")?;
            print_text(&output)
        }
        Command::Cleanup {
            remove_unversioned,
            remove_ignored,
            vacuum_pristines,
            include_externals,
        } => {
            let options = CleanupOptions {
                remove_unversioned,
                remove_ignored,
                vacuum_pristines,
                include_externals,
            };
            let output = client.cleanup(&options).context("svn cleanup failed")?;
            print_text(&output)
        }
        Command::Commit {
            message,
            path,
            depth,
            no_unlock,
            include_externals,
        } => {
            let options = CommitOptions {
                path,
                depth: depth.map(Depth::from),
                no_unlock,
                include_externals,
            };
            let output = client
                .commit(&message, &options)
                .context("svn commit failed")?;
            print_text(&output)
        }
        Command::Info => print_text(&client.to_string()),
    }
}

/// Numbers and the svn keywords map to their typed forms; anything else is
/// passed through as a range expression.
fn parse_revision(raw: &str) -> Revision {
    use subwrap_core::SymbolicRevision;

    match raw {
        "HEAD" => Revision::from(SymbolicRevision::Head),
        "BASE" => Revision::from(SymbolicRevision::Base),
        "COMMITTED" => Revision::from(SymbolicRevision::Committed),
        "PREV" => Revision::from(SymbolicRevision::Prev),
        other => other
            .parse::<u64>()
            .map_or_else(|_| Revision::from(other), Revision::from),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("failed to encode JSON")?;
    writeln!(stdout).context("failed to write to stdout")
}

fn print_text(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}").context("failed to write to stdout")
}
