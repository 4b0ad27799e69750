mod config;
mod logger;
mod prompt;
mod sorter;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::sorter::MediaSort;

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Normalize movie and episode filenames and sort them into a library"
)]
pub(crate) struct MediaSortArgs {
    /// Optional input directory or file
    #[arg(value_hint = clap::ValueHint::AnyPath)]
    path: Option<PathBuf>,

    /// Apply changes without asking
    #[arg(short, long)]
    auto: bool,

    /// Split movies into first-letter subdirectories (library layout)
    #[arg(short, long)]
    bucket: bool,

    /// Enable debug prints
    #[arg(short = 'D', long)]
    debug: bool,

    /// Destination root for the library layout (implies --library)
    #[arg(short = 'o', long, name = "DIR", value_hint = clap::ValueHint::DirPath)]
    destination: Option<PathBuf>,

    /// Ignore directories with this name
    #[arg(short = 'i', long, num_args = 1, action = clap::ArgAction::Append, name = "IGNORE")]
    ignore: Vec<String>,

    /// Rename files inside their current directory
    #[arg(short = 'n', long, conflicts_with_all = ["library", "DIR"])]
    in_place: bool,

    /// Treat this word as release junk
    #[arg(short = 'j', long, num_args = 1, action = clap::ArgAction::Append, name = "JUNK")]
    junk: Vec<String>,

    /// Never treat this word as release junk or a tag
    #[arg(short = 'k', long, num_args = 1, action = clap::ArgAction::Append, name = "KEEP")]
    keep: Vec<String>,

    /// Move movies and episodes into a library layout
    #[arg(short = 'L', long)]
    library: bool,

    /// Only print changes and write the report
    #[arg(short, long)]
    print: bool,

    /// Write the plan report to this file
    #[arg(short, long, name = "FILE", value_hint = clap::ValueHint::FilePath)]
    report: Option<PathBuf>,

    /// Use this show name for all episodes
    #[arg(short, long, name = "NAME")]
    show: Option<String>,

    /// Clear immutable flags without asking
    #[arg(short, long)]
    unlock: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = MediaSortArgs::parse();
    if let Some(ref shell) = args.completion {
        media_sort::generate_shell_completion(*shell, MediaSortArgs::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        MediaSort::new(args)?.run()
    }
}
