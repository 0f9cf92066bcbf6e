use crate::Result;
use logweave_types::{CorrelateOptions, SubagentMessage, SubagentRole};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::flatten::{flatten_content, thinking_texts};
use super::io::RecordReader;
use super::schema::RecordPayload;

static AGENT_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"agentId:\s*(\w+)").unwrap());

/// Delegate id embedded in a delegated task's result text
pub fn extract_agent_id(result_text: &str) -> Option<&str> {
    AGENT_ID
        .captures(result_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Flattened transcript of one delegated agent
#[derive(Debug, Clone, PartialEq)]
pub struct SubagentTranscript {
    pub agent_id: String,
    /// First non-empty assistant model
    pub model: String,
    pub messages: Vec<SubagentMessage>,
}

/// Index side files of a session: agent id -> path.
///
/// Looks in `<dir>/<stem>/subagents/agent-<id>.jsonl` and in legacy
/// `<dir>/agent-<id>.jsonl` siblings; the former wins for the same id.
pub fn index_subagent_files(session_path: &Path) -> Result<HashMap<String, PathBuf>> {
    let mut files = HashMap::new();
    let Some(parent) = session_path.parent() else {
        return Ok(files);
    };

    let mut dirs = vec![parent.to_path_buf()];
    if let Some(stem) = session_path.file_stem() {
        dirs.push(parent.join(stem).join("subagents"));
    }

    for dir in dirs.iter().filter(|d| d.is_dir()) {
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if let Some(agent_id) = side_file_agent_id(path) {
                files.insert(agent_id.to_string(), path.to_path_buf());
            }
        }
    }

    Ok(files)
}

fn side_file_agent_id(path: &Path) -> Option<&str> {
    if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
        return None;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.strip_prefix("agent-"))
        .filter(|id| !id.is_empty())
}

/// Load and flatten one side file
pub fn load_subagent_transcript(path: &Path, options: CorrelateOptions) -> SubagentTranscript {
    let agent_id = side_file_agent_id(path).unwrap_or_default().to_string();
    let mut model = String::new();
    let mut messages = Vec::new();

    for record in RecordReader::open_lossy(path).decoded() {
        match &record.payload {
            RecordPayload::User(user) => {
                let Some(message) = user.message.as_ref().filter(|m| m.role == "user") else {
                    continue;
                };
                let text = flatten_content(&message.content, false);
                if !text.trim().is_empty() {
                    messages.push(SubagentMessage {
                        role: SubagentRole::User,
                        text,
                        timestamp: record.timestamp,
                    });
                }
            }
            RecordPayload::Assistant(asst) => {
                let Some(message) = asst.message.as_ref().filter(|m| m.role == "assistant")
                else {
                    continue;
                };
                if model.is_empty() {
                    if let Some(m) = &message.model {
                        model = m.clone();
                    }
                }

                if options.include_thinking {
                    messages.extend(thinking_texts(&message.content).map(|thinking| {
                        SubagentMessage {
                            role: SubagentRole::Thinking,
                            text: thinking.to_string(),
                            timestamp: record.timestamp,
                        }
                    }));
                }

                let text = flatten_content(&message.content, options.detailed);
                if !text.trim().is_empty() {
                    messages.push(SubagentMessage {
                        role: SubagentRole::Assistant,
                        text,
                        timestamp: record.timestamp,
                    });
                }
            }
            _ => {}
        }
    }

    SubagentTranscript {
        agent_id,
        model,
        messages,
    }
}

/// Find and load the transcript of one delegate, without caching
pub fn locate_subagent(
    session_path: &Path,
    agent_id: &str,
    options: CorrelateOptions,
) -> Option<SubagentTranscript> {
    let files = index_subagent_files(session_path).ok()?;
    files
        .get(agent_id)
        .map(|path| load_subagent_transcript(path, options))
}

/// Side-file lookup for one correlation pass.
///
/// The directory is indexed once; each transcript is loaded at most once.
pub struct SubagentLocator {
    files: HashMap<String, PathBuf>,
    loaded: HashMap<String, SubagentTranscript>,
    options: CorrelateOptions,
}

impl SubagentLocator {
    pub fn for_session(session_path: &Path, options: CorrelateOptions) -> Self {
        let files = index_subagent_files(session_path).unwrap_or_else(|err| {
            warn!(path = %session_path.display(), error = %err, "cannot index subagent files");
            HashMap::new()
        });
        Self {
            files,
            loaded: HashMap::new(),
            options,
        }
    }

    pub fn resolve(&mut self, agent_id: &str) -> Option<&SubagentTranscript> {
        if !self.loaded.contains_key(agent_id) {
            let Some(path) = self.files.get(agent_id) else {
                debug!(agent_id, "no side file for delegated task");
                return None;
            };
            let transcript = load_subagent_transcript(path, self.options);
            self.loaded.insert(agent_id.to_string(), transcript);
        }
        self.loaded.get(agent_id)
    }

    pub fn known_agents(&self) -> usize {
        self.files.len()
    }
}
