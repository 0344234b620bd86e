use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "linediff",
    about = "Line-oriented diff and patch with unified diff support",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML file with default diff options
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a unified diff of two files
    Diff(DiffArgs),
    /// Apply the first file entry of a unified diff to a file
    Patch(PatchArgs),
    /// Print a parsed unified diff as JSON
    Inspect(InspectArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    /// Lines of context around each change
    #[arg(short = 'U', long = "unified")]
    pub context: Option<usize>,
    /// myers, myers-linear or patience
    #[arg(long)]
    pub algorithm: Option<String>,
    #[arg(short = 'w', long)]
    pub ignore_whitespace: bool,
    /// Colour the output when writing to a terminal
    #[arg(long)]
    pub color: bool,
}

#[derive(Args)]
pub struct PatchArgs {
    pub file: PathBuf,
    pub diff: PathBuf,
    /// Elements each hunk may ignore at either end
    #[arg(long)]
    pub fuzz: Option<usize>,
    #[arg(long)]
    pub conflict_markers: bool,
    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct InspectArgs {
    pub diff: PathBuf,
    /// Single-line JSON
    #[arg(long)]
    pub compact: bool,
}
