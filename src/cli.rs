// src/cli.rs
use crate::extractors::{Anchor, KeyPattern, DEFAULT_TERMINATOR_LOOKAHEAD};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Matches `const X: T[] = [` and `export const x: T[] = [` declarations.
pub const DEFAULT_ARRAY_ANCHOR: &str = r"re:(?:export\s+)?const\s+\w+\s*:\s*\w+\[\]\s*=\s*\[";

/// Command Line Interface for seed catalog region maintenance
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output directory for extracted regions, merged documents and reports
    #[arg(short, long, global = true, default_value = "./output", env = "SEED_SECTIONS_OUTPUT")]
    pub output_dir: PathBuf,

    /// Characters after a closing delimiter searched for a terminator
    #[arg(long, global = true, default_value_t = DEFAULT_TERMINATOR_LOOKAHEAD, env = "SEED_SECTIONS_LOOKAHEAD")]
    pub lookahead: usize,

    /// Also write a JSON report to the output directory
    #[arg(long, global = true)]
    pub report: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count top-level entries per region and flag duplicate names
    Count(CountArgs),
    /// List entries present in the source regions but missing from the target regions
    Diff(DiffArgs),
    /// Write a region's text to the output directory
    Extract(ExtractArgs),
    /// Append entries missing from the target region, copied from the source region
    Merge(MergeArgs),
}

#[derive(Args, Debug)]
pub struct CountArgs {
    /// Documents to inventory
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Region anchor: literal text, `glob:<wildcard>` or `re:<regex>`
    #[arg(short, long, default_value = DEFAULT_ARRAY_ANCHOR)]
    pub anchor: Anchor,

    /// Entry key: a field name, or `re:<regex>` with one capture group
    #[arg(short, long, default_value = "name")]
    pub key: KeyPattern,

    /// Also tally named entries by the value of this key (same syntax as --key)
    #[arg(short, long)]
    pub group_by: Option<KeyPattern>,

    /// Count entries inside comments too
    #[arg(long)]
    pub keep_comments: bool,

    #[arg(long, default_value_t = '[')]
    pub open: char,

    #[arg(long, default_value_t = ']')]
    pub close: char,
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    #[arg(short, long)]
    pub source: PathBuf,

    #[arg(short, long)]
    pub target: PathBuf,

    #[arg(long, default_value = DEFAULT_ARRAY_ANCHOR)]
    pub source_anchor: Anchor,

    #[arg(long, default_value = DEFAULT_ARRAY_ANCHOR)]
    pub target_anchor: Anchor,

    #[arg(short, long, default_value = "name")]
    pub key: KeyPattern,

    #[arg(long)]
    pub keep_comments: bool,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    #[arg(short, long)]
    pub file: PathBuf,

    #[arg(short, long)]
    pub anchor: Anchor,

    #[arg(long, default_value_t = '[')]
    pub open: char,

    #[arg(long, default_value_t = ']')]
    pub close: char,

    /// Statement terminator to include after the closing delimiter
    #[arg(long, default_value_t = ';')]
    pub terminator: char,

    #[arg(long)]
    pub no_terminator: bool,

    /// Byte offset to start searching from (also applies to `--all`)
    #[arg(long, default_value_t = 0)]
    pub from: usize,

    /// Extract every region for the anchor instead of the first
    #[arg(long)]
    pub all: bool,

    /// Debug mode - save an annotated HTML copy of the document
    #[arg(short, long)]
    pub debug: bool,

    /// Extra regex to highlight in the debug copy (repeatable)
    #[arg(long)]
    pub highlight: Vec<String>,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    #[arg(short, long)]
    pub source: PathBuf,

    #[arg(short, long)]
    pub target: PathBuf,

    #[arg(long)]
    pub source_anchor: Anchor,

    #[arg(long)]
    pub target_anchor: Anchor,

    #[arg(short, long, default_value = "name")]
    pub key: KeyPattern,

    /// Report what would be added without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Rewrite the target document instead of writing to the output directory
    #[arg(long, conflicts_with = "dry_run")]
    pub in_place: bool,
}

impl ExtractArgs {
    pub fn terminator(&self) -> Option<char> {
        (!self.no_terminator).then_some(self.terminator)
    }
}
