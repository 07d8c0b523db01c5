//! Translation of typed operation requests into svn argument vectors.

use std::fmt;

use subwrap_api::{ConflictAction, Depth, Revision};

/// svn subcommands this crate knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subcommand {
    /// `svn log`
    Log,
    /// `svn diff`
    Diff,
    /// `svn revert`
    Revert,
    /// `svn update`
    Update,
    /// `svn cleanup`
    Cleanup,
    /// `svn commit`
    Commit,
    /// `svn info`
    Info,
}

impl Subcommand {
    /// Name as typed on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Diff => "diff",
            Self::Revert => "revert",
            Self::Update => "update",
            Self::Cleanup => "cleanup",
            Self::Commit => "commit",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Subcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional flags recognized by the builder.
///
/// Unset options never reach the argument vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct CommandOptions {
    /// `-r <value>`, used by diff for its revision pair.
    pub range: Option<String>,
    /// `--xml`
    pub xml: bool,
    /// `--summarize`
    pub summarize: bool,
    /// `--recursive`
    pub recursive: bool,
    /// `--remove-added`
    pub remove_added: bool,
    /// `--message <value>`
    pub message: Option<String>,
    /// `--revision <value>`
    pub revision: Option<Revision>,
    /// `--accept <value>`
    pub accept: Option<ConflictAction>,
    /// `--depth <value>`
    pub depth: Option<Depth>,
    /// `--force`
    pub force: bool,
    /// `--ignore-externals`
    pub ignore_externals: bool,
    /// `--parents`
    pub parents: bool,
    /// `--adds-as-modification`
    pub adds_as_modification: bool,
    /// `--no-unlock`
    pub no_unlock: bool,
    /// `--remove-unversioned`
    pub remove_unversioned: bool,
    /// `--remove-ignored`
    pub remove_ignored: bool,
    /// `--vacuum-pristines`
    pub vacuum_pristines: bool,
    /// `--include-externals`
    pub include_externals: bool,
    /// `--non-interactive`
    pub non_interactive: bool,
}

/// A single svn invocation before it is rendered to arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    subcommand: Subcommand,
    targets: Vec<String>,
    options: CommandOptions,
}

impl OperationRequest {
    /// Start a request for the given subcommand with no targets or flags.
    #[must_use]
    pub fn new(subcommand: Subcommand) -> Self {
        Self {
            subcommand,
            targets: Vec::new(),
            options: CommandOptions::default(),
        }
    }

    /// Append one positional target.
    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
        self
    }

    /// Append several positional targets, preserving their order.
    #[must_use]
    pub fn targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets.extend(targets.into_iter().map(Into::into));
        self
    }

    /// Replace the option set.
    #[must_use]
    pub fn options(mut self, options: CommandOptions) -> Self {
        self.options = options;
        self
    }

    /// Subcommand this request runs.
    #[must_use]
    pub const fn subcommand(&self) -> Subcommand {
        self.subcommand
    }

    /// Render the argument vector: subcommand, targets, then flags in a
    /// fixed order.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![self.subcommand.as_str().to_owned()];
        args.extend(
            self.targets
                .iter()
                .filter(|target| !target.is_empty())
                .cloned(),
        );

        let opts = &self.options;
        push_value(&mut args, "-r", opts.range.as_deref());
        push_flag(&mut args, "--xml", opts.xml);
        push_flag(&mut args, "--summarize", opts.summarize);
        push_flag(&mut args, "--recursive", opts.recursive);
        push_flag(&mut args, "--remove-added", opts.remove_added);
        push_value(&mut args, "--message", opts.message.as_deref());
        push_value(
            &mut args,
            "--revision",
            opts.revision.as_ref().map(Revision::as_arg).as_deref(),
        );
        push_value(&mut args, "--accept", opts.accept.map(ConflictAction::as_str));
        push_value(&mut args, "--depth", opts.depth.map(Depth::as_str));
        push_flag(&mut args, "--force", opts.force);
        push_flag(&mut args, "--ignore-externals", opts.ignore_externals);
        push_flag(&mut args, "--parents", opts.parents);
        push_flag(&mut args, "--adds-as-modification", opts.adds_as_modification);
        push_flag(&mut args, "--no-unlock", opts.no_unlock);
        push_flag(&mut args, "--remove-unversioned", opts.remove_unversioned);
        push_flag(&mut args, "--remove-ignored", opts.remove_ignored);
        push_flag(&mut args, "--vacuum-pristines", opts.vacuum_pristines);
        push_flag(&mut args, "--include-externals", opts.include_externals);
        push_flag(&mut args, "--non-interactive", opts.non_interactive);

        args
    }
}

fn push_flag(args: &mut Vec<String>, flag: &str, enabled: bool) {
    if enabled {
        args.push(flag.to_owned());
    }
}

fn push_value(args: &mut Vec<String>, flag: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        args.push(flag.to_owned());
        args.push(value.to_owned());
    }
}
