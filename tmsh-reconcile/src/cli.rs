use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "tmsh-reconcile")]
#[command(about = "Diff device configuration trees and generate tmsh reconciliation scripts")]
pub struct Cli {
    /// Log debug detail to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Compare two configuration trees and show differences.
    Diff(DiffArgs),
    /// Generate the script that moves the current tree to the desired one.
    Script(ScriptArgs),
}

#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// Current configuration tree (JSON).
    pub current: PathBuf,
    /// Desired configuration tree (JSON).
    pub desired: PathBuf,
    /// Resource path or property name to skip; repeatable.
    #[arg(long)]
    pub ignore: Vec<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[arg(long)]
    pub summary: bool,
}

#[derive(Parser, Debug)]
pub struct ScriptArgs {
    pub current: PathBuf,
    pub desired: PathBuf,
    /// Settings TOML file. Built-in defaults apply otherwise.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub target_version: Option<String>,
    #[arg(long)]
    pub task_id: Option<String>,
    /// JSON cache of virtual addresses present on the device.
    #[arg(long)]
    pub virtual_addresses: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Write one file per section into this directory instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub summary: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
