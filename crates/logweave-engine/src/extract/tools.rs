use chrono::{DateTime, Utc};
use logweave_providers::claude::schema::{Content, ContentBlock, Record, RecordPayload};
use logweave_providers::tool_result_text;
use logweave_types::{
    OperationStatus, ToolCategory, ToolFilter, ToolOperation, ToolOperations, ToolResultSummary,
};
use serde_json::Value;

use super::{ContextBuffer, truncate};
use crate::pairing::PendingTable;

const SEARCH_PREVIEW_LINES: usize = 5;
const WEB_PREVIEW_CHARS: usize = 500;
const SHELL_PREVIEW_CHARS: usize = 300;

struct PendingOperation {
    tool: String,
    category: ToolCategory,
    context: String,
    input: Value,
    timestamp: Option<DateTime<Utc>>,
}

impl PendingOperation {
    fn into_operation(self, tool_use_id: String, result: ToolResultSummary) -> ToolOperation {
        ToolOperation {
            tool: self.tool,
            category: self.category,
            tool_use_id,
            context: self.context,
            input: self.input,
            timestamp: self.timestamp,
            result,
        }
    }
}

pub fn is_git_command(command: &str) -> bool {
    let command = command.trim();
    command.starts_with("git ") || command.starts_with("git\t")
}

/// Collect categorized tool operations selected by `filter`.
///
/// Results are matched by call id only. Operations that never received a
/// result are appended with [`ToolResultSummary::NoResult`], oldest first.
pub fn collect_tool_operations<I>(records: I, filter: &ToolFilter, detailed: bool) -> ToolOperations
where
    I: IntoIterator<Item = Record>,
{
    let mut operations = ToolOperations::default();
    let mut context = ContextBuffer::default();
    let mut pending: PendingTable<PendingOperation> = PendingTable::new();

    for record in records {
        match &record.payload {
            RecordPayload::Assistant(asst) => {
                let Some(message) = asst.message.as_ref().filter(|m| m.role == "assistant")
                else {
                    continue;
                };
                match &message.content {
                    Content::Blocks(blocks) => {
                        for block in blocks {
                            match block {
                                ContentBlock::Text { text } => context.push(text),
                                ContentBlock::ToolUse { id, name, input } => {
                                    let Some(category) = track_category(filter, name, input)
                                    else {
                                        continue;
                                    };
                                    pending.insert(
                                        id.clone(),
                                        PendingOperation {
                                            tool: name.clone(),
                                            category,
                                            context: context.take(),
                                            input: input.clone(),
                                            timestamp: record.timestamp,
                                        },
                                    );
                                }
                                _ => {}
                            }
                        }
                    }
                    Content::Text(text) => context.push(text),
                    Content::Other(_) => {}
                }
            }
            RecordPayload::User(user) => {
                if let Some(message) = &user.message {
                    for result in message.content.tool_results() {
                        let Some(op) = pending.take(result.tool_use_id) else {
                            continue;
                        };
                        let output = tool_result_text(result.content);
                        let summary = summarize(&op, &output, result.is_error, detailed);
                        operations.push(op.into_operation(result.tool_use_id.to_string(), summary));
                    }
                }
                context.reset();
            }
            _ => {}
        }
    }

    for (tool_use_id, op) in pending.drain_ordered() {
        operations.push(op.into_operation(tool_use_id, ToolResultSummary::NoResult));
    }

    operations
}

fn track_category(filter: &ToolFilter, name: &str, input: &Value) -> Option<ToolCategory> {
    if filter.includes_tool(name) {
        return ToolCategory::for_tool(name);
    }
    let command = input.get("command").and_then(Value::as_str).unwrap_or("");
    (name == "Bash" && filter.includes_git() && is_git_command(command)).then_some(ToolCategory::Git)
}

fn summarize(op: &PendingOperation, output: &str, is_error: bool, detailed: bool) -> ToolResultSummary {
    if detailed {
        return ToolResultSummary::Full {
            content: output.to_string(),
        };
    }

    if op.category == ToolCategory::Git {
        return ToolResultSummary::Shell {
            output_preview: truncate(output, SHELL_PREVIEW_CHARS),
        };
    }

    match op.tool.as_str() {
        "Read" => ToolResultSummary::Read {
            lines: if output.is_empty() {
                0
            } else {
                output.matches('\n').count() + 1
            },
            size_bytes: output.len(),
        },
        "Write" | "Edit" => ToolResultSummary::Modified {
            status: if is_error {
                OperationStatus::Failed
            } else {
                OperationStatus::Success
            },
        },
        "Grep" | "Glob" => {
            let matches: Vec<&str> = output.split('\n').filter(|l| !l.trim().is_empty()).collect();
            ToolResultSummary::Search {
                matched_count: matches.len(),
                matches_preview: matches
                    .iter()
                    .take(SEARCH_PREVIEW_LINES)
                    .map(|l| l.to_string())
                    .collect(),
            }
        }
        _ => ToolResultSummary::Web {
            preview: truncate(output, WEB_PREVIEW_CHARS),
        },
    }
}
