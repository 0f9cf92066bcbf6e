use chrono::{DateTime, Utc};
use logweave_providers::claude::schema::{Content, ContentBlock, Record, RecordPayload};
use logweave_providers::tool_result_text;
use logweave_types::BashCommand;

use super::ContextBuffer;
use crate::pairing::PendingTable;

/// First-line markers of a failed shell command, matched case-insensitively
const ERROR_MARKERS: [&str; 4] = [
    "command not found",
    "no such file or directory",
    "permission denied",
    "fatal:",
];

struct PendingCommand {
    command: String,
    context: String,
    timestamp: Option<DateTime<Utc>>,
}

/// Collect shell commands that did not obviously fail, with the assistant
/// commentary that preceded each.
///
/// Results are paired by call id; a result whose id matches nothing is
/// paired with the oldest command still waiting.
pub fn collect_bash_commands<I>(records: I) -> Vec<BashCommand>
where
    I: IntoIterator<Item = Record>,
{
    let mut commands = Vec::new();
    let mut context = ContextBuffer::default();
    let mut pending: PendingTable<PendingCommand> = PendingTable::new();
    let mut anonymous = 0usize;

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
                                ContentBlock::ToolUse { id, name, input }
                                    if name.eq_ignore_ascii_case("bash") =>
                                {
                                    let command = input
                                        .get("command")
                                        .and_then(|c| c.as_str())
                                        .unwrap_or("");
                                    if command.is_empty() {
                                        continue;
                                    }
                                    // Calls without an id can only be paired by age
                                    let key = if id.is_empty() {
                                        anonymous += 1;
                                        format!("\0anonymous-{}", anonymous)
                                    } else {
                                        id.clone()
                                    };
                                    pending.insert(
                                        key,
                                        PendingCommand {
                                            command: command.to_string(),
                                            context: context.take(),
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
                        let failed = looks_failed(&tool_result_text(result.content));

                        let matched = if result.tool_use_id.is_empty() {
                            None
                        } else {
                            pending.take(result.tool_use_id)
                        };
                        let matched = matched.or_else(|| pending.take_oldest().map(|(_, c)| c));

                        if let Some(cmd) = matched.filter(|_| !failed) {
                            commands.push(BashCommand {
                                command: cmd.command,
                                context: cmd.context,
                                timestamp: cmd.timestamp,
                            });
                        }
                    }
                }
                context.reset();
            }
            _ => {}
        }
    }

    commands
}

fn looks_failed(output: &str) -> bool {
    let first_line = output.split('\n').next().unwrap_or("").to_lowercase();
    ERROR_MARKERS.iter().any(|marker| first_line.contains(marker))
}
