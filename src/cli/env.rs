use clap::Parser;
use std::path::PathBuf;

use droidlocate_core_types::Platform;

use super::commands::Commands;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Output format
    #[arg(short, long, default_value = "human")]
    pub output: crate::cli::output::OutputFormat,

    /// Target platform, overriding the config file
    #[arg(short, long)]
    pub platform: Option<Platform>,

    /// Scroll attempt cap, overriding the config file
    #[arg(long, value_name = "N")]
    pub max_scrolls: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}
