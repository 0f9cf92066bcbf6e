use super::args::{Cli, Commands};
use crate::config::Config;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::debug;

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Show {
            log,
            extract,
            thinking,
        } => {
            let options = config.correlate_options(extract.detailed, thinking);
            let entries = logweave_engine::correlate_file(&log, options);
            print_json(&entries)
        }

        Commands::Bash { log } => {
            let commands = logweave_engine::extract_bash_commands(&log);
            print_json(&commands)
        }

        Commands::Tools {
            log,
            extract,
            tool_filter,
        } => {
            let filter = config.tool_filter(&tool_filter);
            let detailed = extract.detailed || config.extract.detailed;
            let operations = logweave_engine::extract_tool_operations(&log, &filter, detailed);
            print_json(&operations)
        }

        Commands::Preview { log } => {
            let preview = preview(&log)?;
            print_json(&preview)
        }
    }
}

fn preview(log: &Path) -> Result<logweave_providers::SessionPreview> {
    logweave_providers::session_preview(log)
        .with_context(|| format!("Failed to read session log {}", log.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value).context("Failed to write JSON output")?;
    writeln!(out)?;
    Ok(())
}
