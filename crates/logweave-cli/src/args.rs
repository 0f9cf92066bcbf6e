use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogLevel;

#[derive(Parser)]
#[command(name = "logweave")]
#[command(about = "Rebuild readable transcripts from coding-assistant session logs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to $LOGWEAVE_CONFIG, then <config dir>/logweave/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the correlated conversation as JSON
    Show {
        /// Session log (.jsonl)
        log: PathBuf,

        #[command(flatten)]
        extract: ExtractArgs,

        #[arg(long, help = "Include reasoning blocks as separate entries")]
        thinking: bool,
    },

    /// Print successful shell commands with their preceding commentary
    Bash {
        /// Session log (.jsonl)
        log: PathBuf,
    },

    /// Print categorized tool operations
    Tools {
        /// Session log (.jsonl)
        log: PathBuf,

        #[command(flatten)]
        extract: ExtractArgs,

        /// Categories (file, search, web, git) or tool names (Read, Grep, ...)
        #[arg(long, value_delimiter = ',')]
        tool_filter: Vec<String>,
    },

    /// Print session header information
    Preview {
        /// Session log (.jsonl)
        log: PathBuf,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct ExtractArgs {
    #[arg(
        long,
        help = "Include tool summaries, system notices, metadata and statistics"
    )]
    pub detailed: bool,
}
