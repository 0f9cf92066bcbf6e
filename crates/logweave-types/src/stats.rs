use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate counters for one session, emitted as the trailing entry in
/// detailed mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Distinct assistant models, sorted
    pub models_used: Vec<String>,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cache_read_tokens: u64,
    pub total_cache_creation_tokens: u64,
    /// User turns that produced visible text
    pub turn_count: u64,
    pub tool_use_count: u64,
    /// Tool name -> number of invocations
    pub tools_used: BTreeMap<String, u64>,
    pub subagent_count: u64,
    pub total_duration_ms: u64,
    pub session_version: String,
    pub git_branch: String,
}
