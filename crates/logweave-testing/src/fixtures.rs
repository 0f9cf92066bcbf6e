//! Factories for session log records.
//!
//! Records mirror what the assistant writes to disk: a shared envelope
//! (`type`, `uuid`, `sessionId`, `timestamp`, `cwd`, `version`, ...) plus a
//! type-specific body. Timestamps are `2026-01-15T10:<minute>:00.000Z`.

use serde_json::{Value, json};

pub const SESSION_ID: &str = "test-session-001";
pub const MODEL: &str = "claude-sonnet-4-5-20250929";
pub const CWD: &str = "/test/project";
pub const VERSION: &str = "2.1.42";
pub const BRANCH: &str = "main";

pub fn timestamp(minute: u32) -> String {
    format!("2026-01-15T10:{:02}:00.000Z", minute)
}

fn envelope(kind: &str, minute: u32) -> Value {
    json!({
        "type": kind,
        "uuid": format!("{}-{:02}", kind, minute),
        "parentUuid": null,
        "sessionId": SESSION_ID,
        "timestamp": timestamp(minute),
        "isSidechain": false,
        "userType": "external",
        "cwd": CWD,
        "version": VERSION,
        "gitBranch": BRANCH,
    })
}

/// Set (or overwrite) a top-level field of a record
pub fn with_field(mut record: Value, key: &str, value: impl Into<Value>) -> Value {
    if let Some(obj) = record.as_object_mut() {
        obj.insert(key.to_string(), value.into());
    }
    record
}

pub fn user_text(text: &str, minute: u32) -> Value {
    user_content(json!(text), minute)
}

pub fn user_content(content: Value, minute: u32) -> Value {
    with_field(
        envelope("user", minute),
        "message",
        json!({"role": "user", "content": content}),
    )
}

/// User record carrying one tool result block
pub fn tool_result(tool_use_id: &str, content: impl Into<Value>, minute: u32) -> Value {
    user_content(
        json!([{
            "type": "tool_result",
            "tool_use_id": tool_use_id,
            "content": content.into(),
        }]),
        minute,
    )
}

/// Clarifying-question result: answers travel in `toolUseResult`
pub fn answers(tool_use_id: &str, answers: Value, minute: u32) -> Value {
    with_field(
        tool_result(tool_use_id, "User has answered your questions.", minute),
        "toolUseResult",
        json!({ "questions": [], "answers": answers }),
    )
}

pub fn assistant(content: Value, minute: u32) -> Value {
    with_field(
        envelope("assistant", minute),
        "message",
        json!({
            "model": MODEL,
            "id": format!("msg_{:02}", minute),
            "type": "message",
            "role": "assistant",
            "content": content,
            "usage": {
                "input_tokens": 1000,
                "output_tokens": 200,
                "cache_read_input_tokens": 5000,
                "cache_creation_input_tokens": 0,
            },
        }),
    )
}

pub fn assistant_text(text: &str, minute: u32) -> Value {
    assistant(json!([text_block(text)]), minute)
}

pub fn text_block(text: &str) -> Value {
    json!({"type": "text", "text": text})
}

pub fn thinking_block(text: &str) -> Value {
    json!({"type": "thinking", "thinking": text, "signature": "sig"})
}

pub fn tool_use(id: &str, name: &str, input: Value) -> Value {
    json!({"type": "tool_use", "id": id, "name": name, "input": input})
}

pub fn system(subtype: &str, content: &str, minute: u32) -> Value {
    let mut record = envelope("system", minute);
    if let Some(obj) = record.as_object_mut() {
        obj.insert("subtype".into(), json!(subtype));
        obj.insert("content".into(), json!(content));
        obj.insert("level".into(), json!("info"));
        obj.insert("isMeta".into(), json!(false));
    }
    record
}

pub fn turn_duration(duration_ms: u64, minute: u32) -> Value {
    with_field(system("turn_duration", "", minute), "durationMs", duration_ms)
}

pub fn hook_progress(event: &str, name: &str, minute: u32) -> Value {
    with_field(
        envelope("progress", minute),
        "data",
        json!({
            "type": "hook_progress",
            "hookEvent": event,
            "hookName": name,
            "command": "echo hook",
        }),
    )
}

pub fn snapshot(minute: u32) -> Value {
    json!({
        "type": "file-history-snapshot",
        "messageId": format!("msg_{:02}", minute),
        "snapshot": {"trackedFileBackups": {}, "timestamp": timestamp(minute)},
        "isSnapshotUpdate": false,
    })
}

/// Serialize records as JSONL text
pub fn to_jsonl(records: &[Value]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.to_string());
        out.push('\n');
    }
    out
}
