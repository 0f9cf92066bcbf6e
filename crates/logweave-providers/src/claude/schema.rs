use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// One decoded log line.
///
/// Envelope fields shared by every record type are decoded here; the
/// type-specific part lives in [`RecordPayload`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Interpreter version that wrote the record
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    /// Plan file stem, present on plan-mode records
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub is_sidechain: bool,
    #[serde(flatten)]
    pub payload: RecordPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    User,
    Assistant,
    System,
    Progress,
    Snapshot,
    Unknown,
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self.payload {
            RecordPayload::User(_) => RecordKind::User,
            RecordPayload::Assistant(_) => RecordKind::Assistant,
            RecordPayload::System(_) => RecordKind::System,
            RecordPayload::Progress(_) => RecordKind::Progress,
            RecordPayload::FileHistorySnapshot => RecordKind::Snapshot,
            RecordPayload::Unknown => RecordKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "kebab-case")]
pub enum RecordPayload {
    User(UserRecord),
    Assistant(AssistantRecord),
    System(SystemRecord),
    Progress(ProgressRecord),
    FileHistorySnapshot,
    #[serde(other)]
    Unknown,
}

/// Absent or unparseable timestamps decode as `None` instead of failing the line
fn deserialize_lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub message: Option<UserMessage>,
    #[serde(default)]
    pub is_meta: bool,
    /// Structured side data of a tool result (answers, subagent id, ...)
    #[serde(default)]
    pub tool_use_result: Option<ToolUseResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Content,
}

/// Structured tool result metadata attached to a user record.
///
/// The field is an object for most tools but a bare string for errors, so
/// anything that is not an object decodes to the empty value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolUseResult {
    /// Agent ID linking this tool result to its subagent side file
    pub agent_id: Option<String>,
    /// Question text -> answer text for clarifying-question results
    pub answers: BTreeMap<String, String>,
}

impl<'de> Deserialize<'de> for ToolUseResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{IgnoredAny, MapAccess, SeqAccess, Visitor};
        use std::fmt;

        struct ToolUseResultVisitor;

        impl<'de> Visitor<'de> for ToolUseResultVisitor {
            type Value = ToolUseResult;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map or any value for ToolUseResult")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut result = ToolUseResult::default();
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "agentId" => {
                            result.agent_id =
                                map.next_value::<Value>()?.as_str().map(String::from)
                        }
                        "answers" => {
                            if let Value::Object(answers) = map.next_value::<Value>()? {
                                result.answers = answers
                                    .into_iter()
                                    .map(|(question, answer)| (question, value_to_text(answer)))
                                    .collect();
                            }
                        }
                        _ => {
                            let _ = map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(result)
            }

            fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
            where
                S: SeqAccess<'de>,
            {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(ToolUseResult::default())
            }

            // Handle string values (e.g., error messages)
            fn visit_str<E>(self, _: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ToolUseResult::default())
            }

            fn visit_bool<E>(self, _: bool) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ToolUseResult::default())
            }

            fn visit_i64<E>(self, _: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ToolUseResult::default())
            }

            fn visit_u64<E>(self, _: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ToolUseResult::default())
            }

            fn visit_f64<E>(self, _: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ToolUseResult::default())
            }
        }

        deserializer.deserialize_any(ToolUseResultVisitor)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRecord {
    #[serde(default)]
    pub message: Option<AssistantMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "Content::no_blocks")]
    pub content: Content,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: Option<u64>,
    #[serde(default)]
    pub cache_read_input_tokens: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemRecord {
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub duration_ms: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressRecord {
    #[serde(default)]
    pub data: Option<ProgressData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressData {
    #[serde(default)]
    pub hook_event: Option<String>,
    #[serde(default)]
    pub hook_name: Option<String>,
}

/// Turn content, classified once at decode time.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Blocks(Vec<ContentBlock>),
    /// Any other JSON shape, kept verbatim
    Other(Value),
}

impl Default for Content {
    fn default() -> Self {
        Content::Text(String::new())
    }
}

impl Content {
    fn no_blocks() -> Self {
        Content::Blocks(Vec::new())
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        match self {
            Content::Blocks(blocks) => blocks,
            Content::Text(_) | Content::Other(_) => &[],
        }
    }

    pub fn tool_uses(&self) -> impl Iterator<Item = ToolUse<'_>> {
        self.blocks().iter().filter_map(|block| match block {
            ContentBlock::ToolUse { id, name, input } => Some(ToolUse { id, name, input }),
            _ => None,
        })
    }

    pub fn tool_results(&self) -> impl Iterator<Item = ToolResult<'_>> {
        self.blocks().iter().filter_map(|block| match block {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => Some(ToolResult {
                tool_use_id,
                content,
                is_error: *is_error,
            }),
            _ => None,
        })
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Content::Text(text),
            Value::Array(items) => {
                Content::Blocks(items.into_iter().map(ContentBlock::from_value).collect())
            }
            other => Content::Other(other),
        }
    }
}

impl<'de> Deserialize<'de> for Content {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Content::from)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    Thinking {
        #[serde(default)]
        thinking: String,
    },
    ToolUse {
        #[serde(default)]
        id: String,
        #[serde(default = "unknown_tool_name")]
        name: String,
        #[serde(default = "empty_input")]
        input: Value,
    },
    ToolResult {
        #[serde(default)]
        tool_use_id: String,
        #[serde(default)]
        content: Value,
        #[serde(default)]
        is_error: bool,
    },
    #[serde(other)]
    Unknown,
}

impl ContentBlock {
    /// Elements that are not recognizable blocks become `Unknown` rather
    /// than failing the whole record.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or(ContentBlock::Unknown)
    }
}

fn unknown_tool_name() -> String {
    "unknown".to_string()
}

fn empty_input() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Borrowed view of a `tool_use` block
#[derive(Debug, Clone, Copy)]
pub struct ToolUse<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub input: &'a Value,
}

impl<'a> ToolUse<'a> {
    /// String argument of the invocation, empty when absent
    pub fn input_str(&self, key: &str) -> &'a str {
        self.input.get(key).and_then(Value::as_str).unwrap_or("")
    }
}

/// Borrowed view of a `tool_result` block
#[derive(Debug, Clone, Copy)]
pub struct ToolResult<'a> {
    pub tool_use_id: &'a str,
    pub content: &'a Value,
    pub is_error: bool,
}

/// Plain-text rendering of an arbitrary JSON value
pub(crate) fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
