use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use flowsim_sdk::FileId;

#[derive(Parser)]
#[command(
    name = "flowsim",
    about = "flowsim: a git workflow simulator for teaching file states and git-flow branching",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Simulation state file [default: .flowsim.json]
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start a fresh simulation
    Init(InitArgs),
    /// Show the working set grouped by state
    Status,
    /// Create an untracked file
    Create(CreateArgs),
    /// Put a file under version control
    Track(FileArgs),
    /// Replace a file's content
    Edit(EditArgs),
    /// Stage a file for the next commit
    Stage(FileArgs),
    /// Remove a file from the staging area
    Unstage(FileArgs),
    /// Delete a file
    Rm(FileArgs),
    /// Commit staged files
    Commit(CommitArgs),
    /// Show every committed version, newest first
    Log,
    /// Show one file's version chain
    History(FileArgs),
    /// Roll a file back to a version
    Revert(RevertArgs),
    /// List branches, or create one
    Branch(BranchArgs),
    /// Commit directly on a branch
    CommitCode(CommitCodeArgs),
    /// Merge one branch into another
    Merge(MergeArgs),
    /// Print the mermaid gitGraph description
    Graph,
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing state file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct CreateArgs {
    pub name: String,
}

#[derive(Args)]
pub struct FileArgs {
    /// File id, as printed by `create` (`3` or `#3`)
    pub id: FileId,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: FileId,
    pub content: String,
}

#[derive(Args)]
pub struct CommitArgs {
    #[arg(short, long)]
    pub message: String,
    #[arg(required = true)]
    pub ids: Vec<FileId>,
}

#[derive(Args)]
pub struct RevertArgs {
    pub id: FileId,
    /// Position in the file's history, 0 being the newest
    pub index: usize,
}

#[derive(Args)]
pub struct BranchArgs {
    #[arg(requires = "from")]
    pub name: Option<String>,
    /// Branch to create from
    #[arg(long, requires = "name")]
    pub from: Option<String>,
}

#[derive(Args)]
pub struct CommitCodeArgs {
    pub branch: String,
    #[arg(short, long)]
    pub message: String,
}

#[derive(Args)]
pub struct MergeArgs {
    pub source: String,
    pub target: String,
    /// Version tag recorded on master when merging into it
    #[arg(long)]
    pub version: Option<String>,
}
