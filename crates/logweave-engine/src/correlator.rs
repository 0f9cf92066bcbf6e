use chrono::{DateTime, Utc};
use logweave_providers::claude::schema::{
    AssistantRecord, ProgressRecord, Record, RecordPayload, SystemRecord, UserRecord,
};
use logweave_providers::claude::thinking_texts;
use logweave_providers::{SubagentLocator, extract_agent_id, flatten_content, tool_result_text};
use logweave_types::{
    ConversationEntry, CorrelateOptions, EntryPayload, MessageMetadata, MessagePayload,
    NotificationPayload, QaPayload, Question, ReasoningPayload, SubagentPayload, UserPayload,
};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::pairing::PendingTable;
use crate::plan::{contains_plan_approval, parse_plan_approval, plan_from_exit_tool};
use crate::qa::{answers_from_record, questions_from_content};
use crate::stats::StatsAccumulator;

const TASK_TOOL: &str = "Task";
const EXIT_PLAN_TOOL: &str = "ExitPlanMode";

#[derive(Debug, Clone)]
struct PendingTask {
    description: String,
    subagent_type: String,
}

/// Single-pass reducer from session records to conversation entries.
///
/// Feed records in file order with [`StreamCorrelator::push`], then call
/// [`StreamCorrelator::finish`] to get the entries (plus the trailing
/// statistics entry in detailed mode).
pub struct StreamCorrelator {
    options: CorrelateOptions,
    locator: SubagentLocator,
    entries: Vec<ConversationEntry>,
    stats: Option<StatsAccumulator>,

    // Key: tool_use id, Value: tool name
    tool_calls: PendingTable<String>,
    questions: PendingTable<Vec<Question>>,
    tasks: PendingTable<PendingTask>,
}

impl StreamCorrelator {
    pub fn new(session_path: &Path, options: CorrelateOptions) -> Self {
        Self::with_locator(SubagentLocator::for_session(session_path, options), options)
    }

    pub fn with_locator(locator: SubagentLocator, options: CorrelateOptions) -> Self {
        Self {
            options,
            locator,
            entries: Vec::new(),
            stats: options.detailed.then(StatsAccumulator::new),
            tool_calls: PendingTable::new(),
            questions: PendingTable::new(),
            tasks: PendingTable::new(),
        }
    }

    pub fn push(&mut self, record: &Record) {
        if let Some(stats) = self.stats.as_mut() {
            stats.observe_envelope(record);
        }

        match &record.payload {
            RecordPayload::User(user) => self.on_user(record, user),
            RecordPayload::Assistant(asst) => self.on_assistant(record, asst),
            RecordPayload::System(system) => self.on_system(record, system),
            RecordPayload::Progress(progress) => self.on_progress(record, progress),
            RecordPayload::FileHistorySnapshot | RecordPayload::Unknown => {}
        }
    }

    pub fn finish(mut self) -> Vec<ConversationEntry> {
        if !self.tool_calls.is_empty() {
            let tools: Vec<String> = self
                .tool_calls
                .drain_ordered()
                .into_iter()
                .map(|(_, name)| name)
                .collect();
            debug!(unresolved = tools.len(), ?tools, "tool calls without a result at end of log");
        }

        if let Some(stats) = self.stats.take()
            && !self.entries.is_empty()
        {
            self.entries
                .push(ConversationEntry::new(None, EntryPayload::Stats(stats.finish())));
        }
        self.entries
    }

    fn emit(&mut self, timestamp: Option<DateTime<Utc>>, payload: EntryPayload) {
        self.entries.push(ConversationEntry::new(timestamp, payload));
    }

    fn on_user(&mut self, record: &Record, user: &UserRecord) {
        let Some(message) = user.message.as_ref().filter(|m| m.role == "user") else {
            return;
        };

        let side_agent_id = user
            .tool_use_result
            .as_ref()
            .and_then(|result| result.agent_id.as_deref());
        for result in message.content.tool_results() {
            self.tool_calls.take(result.tool_use_id);
            if let Some(task) = self.tasks.take(result.tool_use_id) {
                self.resolve_task(record.timestamp, task, result.content, side_agent_id);
            }
        }

        if let Some((tool_use_id, answers)) = answers_from_record(user)
            && let Some(questions) = self.questions.take(tool_use_id)
        {
            self.emit(
                record.timestamp,
                EntryPayload::Qa(QaPayload {
                    questions,
                    answers: answers.clone(),
                }),
            );
            return;
        }

        let text = flatten_content(&message.content, false);
        if text.trim().is_empty() {
            return;
        }

        let payload = match plan_in_text(&text) {
            Some(plan) => plan,
            None => EntryPayload::User(UserPayload { text }),
        };
        self.emit(record.timestamp, payload);
        if let Some(stats) = self.stats.as_mut() {
            stats.count_turn();
        }
    }

    /// The id in the result text wins over the structured `toolUseResult` one
    fn resolve_task(
        &mut self,
        timestamp: Option<DateTime<Utc>>,
        task: PendingTask,
        body: &Value,
        side_agent_id: Option<&str>,
    ) {
        let result_text = tool_result_text(body);
        let Some(agent_id) = extract_agent_id(&result_text).or(side_agent_id) else {
            debug!("delegated task result without an agent id");
            return;
        };
        let Some(transcript) = self.locator.resolve(agent_id) else {
            return;
        };

        let payload = EntryPayload::Subagent(SubagentPayload {
            description: task.description,
            subagent_type: task.subagent_type,
            agent_id: transcript.agent_id.clone(),
            model: transcript.model.clone(),
            messages: transcript.messages.clone(),
        });
        self.emit(timestamp, payload);
        if let Some(stats) = self.stats.as_mut() {
            stats.count_subagent();
        }
    }

    fn on_assistant(&mut self, record: &Record, asst: &AssistantRecord) {
        let Some(message) = asst.message.as_ref().filter(|m| m.role == "assistant") else {
            return;
        };
        let content = &message.content;

        if let Some(stats) = self.stats.as_mut() {
            stats.observe_assistant(message);
        }

        for call in content.tool_uses() {
            self.tool_calls.insert(call.id, call.name.to_string());
            if call.name == TASK_TOOL {
                self.tasks.insert(
                    call.id,
                    PendingTask {
                        description: call.input_str("description").to_string(),
                        subagent_type: call.input_str("subagent_type").to_string(),
                    },
                );
            }
        }

        if let Some((tool_use_id, questions)) = questions_from_content(content) {
            self.questions.insert(tool_use_id, questions);
        }

        let exit_plan = content
            .tool_uses()
            .filter(|call| call.name == EXIT_PLAN_TOOL)
            .find_map(|call| plan_from_exit_tool(call.input, record.slug.as_deref()));
        if let Some(plan) = exit_plan {
            self.emit(record.timestamp, EntryPayload::Plan(plan));
            return;
        }

        if self.options.include_thinking {
            for thinking in thinking_texts(content) {
                self.emit(
                    record.timestamp,
                    EntryPayload::Thinking(ReasoningPayload {
                        text: thinking.to_string(),
                    }),
                );
            }
        }

        let text = flatten_content(content, self.options.detailed);
        if text.trim().is_empty() {
            return;
        }

        let payload = match plan_in_text(&text) {
            Some(plan) => plan,
            None => {
                let metadata = self.options.detailed.then(|| MessageMetadata {
                    model: message.model.clone().unwrap_or_default(),
                    input_tokens: message.usage.as_ref().map_or(0, |u| u.input_tokens),
                    output_tokens: message.usage.as_ref().map_or(0, |u| u.output_tokens),
                    cache_read_tokens: message
                        .usage
                        .as_ref()
                        .and_then(|u| u.cache_read_input_tokens)
                        .unwrap_or(0),
                    cwd: record.cwd.clone().unwrap_or_default(),
                    git_branch: record.git_branch.clone().unwrap_or_default(),
                });
                EntryPayload::Assistant(MessagePayload { text, metadata })
            }
        };
        self.emit(record.timestamp, payload);
    }

    fn on_system(&mut self, record: &Record, system: &SystemRecord) {
        let subtype = system.subtype.as_deref();
        let duration_ms = system.duration_ms.unwrap_or(0.0);

        if subtype == Some("turn_duration")
            && let Some(stats) = self.stats.as_mut()
        {
            stats.add_duration(duration_ms);
        }

        if !self.options.detailed {
            return;
        }

        let content = system.content.as_ref().map(value_text).unwrap_or_default();
        let text = match subtype {
            Some("turn_duration") => format!("Turn completed in {:.1}s", duration_ms / 1000.0),
            Some("local_command") => format!("Command: {}", content),
            _ if !content.is_empty() => content,
            Some(subtype) => subtype.to_string(),
            None => "system".to_string(),
        };

        if !text.is_empty() {
            self.emit(
                record.timestamp,
                EntryPayload::System(NotificationPayload {
                    text: format!("ℹ️ System: {}", text),
                }),
            );
        }
    }

    fn on_progress(&mut self, record: &Record, progress: &ProgressRecord) {
        if !self.options.detailed {
            return;
        }
        let Some(data) = &progress.data else {
            return;
        };
        let event = data.hook_event.as_deref().unwrap_or("");
        if event.is_empty() {
            return;
        }

        let name = data.hook_name.as_deref().unwrap_or("");
        self.emit(
            record.timestamp,
            EntryPayload::System(NotificationPayload {
                text: format!("⚙️ Hook: {} ({})", event, name),
            }),
        );
    }
}

fn plan_in_text(text: &str) -> Option<EntryPayload> {
    if !contains_plan_approval(text) {
        return None;
    }
    parse_plan_approval(text).map(EntryPayload::Plan)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
