use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::stats::SessionStats;

/// One renderable transcript item produced by the correlator.
///
/// Renderers dispatch purely on the `role` tag of the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::timestamp::serialize"
    )]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub payload: EntryPayload,
}

impl ConversationEntry {
    pub fn new(timestamp: Option<DateTime<Utc>>, payload: EntryPayload) -> Self {
        Self { timestamp, payload }
    }

    pub fn role(&self) -> &'static str {
        self.payload.role()
    }

    /// Display text for the text-bearing variants
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            EntryPayload::User(p) => Some(&p.text),
            EntryPayload::Assistant(p) => Some(&p.text),
            EntryPayload::Thinking(p) => Some(&p.text),
            EntryPayload::System(p) => Some(&p.text),
            EntryPayload::Plan(p) => Some(&p.text),
            EntryPayload::Qa(_) | EntryPayload::Subagent(_) | EntryPayload::Stats(_) => None,
        }
    }

    pub fn is_stats(&self) -> bool {
        matches!(self.payload, EntryPayload::Stats(_))
    }
}

/// Entry payload variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role")]
#[serde(rename_all = "snake_case")]
pub enum EntryPayload {
    /// 1. User turn text
    User(UserPayload),

    /// 2. Assistant text (metadata attached in detailed mode)
    Assistant(MessagePayload),

    /// 3. Reasoning block, only when thinking output is requested
    Thinking(ReasoningPayload),

    /// 4. System notice or hook event (detailed mode only)
    System(NotificationPayload),

    /// 5. Approved or proposed plan
    Plan(PlanPayload),

    /// 6. Clarifying questions together with the user's answers
    Qa(QaPayload),

    /// 7. Delegated task with its inlined transcript
    Subagent(SubagentPayload),

    /// 8. Trailing session statistics (detailed mode only)
    Stats(SessionStats),
}

impl EntryPayload {
    pub fn role(&self) -> &'static str {
        match self {
            EntryPayload::User(_) => "user",
            EntryPayload::Assistant(_) => "assistant",
            EntryPayload::Thinking(_) => "thinking",
            EntryPayload::System(_) => "system",
            EntryPayload::Plan(_) => "plan",
            EntryPayload::Qa(_) => "qa",
            EntryPayload::Subagent(_) => "subagent",
            EntryPayload::Stats(_) => "stats",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPayload {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

/// Per-message model and token information for assistant entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cwd: String,
    pub git_branch: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningPayload {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub text: String,
}

/// Where a plan entry was recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    /// Structured input of a finish-planning tool invocation
    ExitTool,
    /// Parsed out of an approval banner in flattened text
    Approval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPayload {
    pub title: String,
    /// Location the plan was saved to, e.g. `~/.claude/plans/foo.md`
    pub path: String,
    pub body: String,
    /// Text the plan was recognized in
    pub text: String,
    pub source: PlanSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaPayload {
    pub questions: Vec<Question>,
    /// Question text -> answer text
    pub answers: BTreeMap<String, String>,
}

/// A clarifying question as issued by the assistant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub multi_select: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubagentPayload {
    pub description: String,
    pub subagent_type: String,
    pub agent_id: String,
    pub model: String,
    pub messages: Vec<SubagentMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubagentRole {
    User,
    Assistant,
    Thinking,
}

/// One flattened turn of a delegated agent's transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubagentMessage {
    pub role: SubagentRole,
    pub text: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::timestamp::serialize"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}
