// Engine module - correlation of raw session records
// This layer sits between decoded records (providers) and renderers / CLI

pub mod correlator;
pub mod extract;
pub mod pairing;
pub mod plan;
pub mod qa;
mod stats;

pub use correlator::StreamCorrelator;
pub use extract::{collect_bash_commands, collect_tool_operations};
pub use pairing::PendingTable;

use logweave_providers::RecordReader;
use logweave_types::{BashCommand, ConversationEntry, CorrelateOptions, ToolFilter, ToolOperations};
use std::path::Path;

// Façade API - Stable public interface for CLI layer
// Every function degrades to an empty result when the log cannot be read

/// Rebuild the conversation of one session log
pub fn correlate_file(path: &Path, options: CorrelateOptions) -> Vec<ConversationEntry> {
    let mut correlator = StreamCorrelator::new(path, options);
    for record in RecordReader::open_lossy(path).decoded() {
        correlator.push(&record);
    }
    correlator.finish()
}

/// Successful shell commands of one session log, with their commentary
pub fn extract_bash_commands(path: &Path) -> Vec<BashCommand> {
    collect_bash_commands(RecordReader::open_lossy(path).decoded())
}

/// Categorized tool operations of one session log
pub fn extract_tool_operations(path: &Path, filter: &ToolFilter, detailed: bool) -> ToolOperations {
    collect_tool_operations(RecordReader::open_lossy(path).decoded(), filter, detailed)
}
