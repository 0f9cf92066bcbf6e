use logweave_providers::claude::schema::{AssistantMessage, Record};
use logweave_types::SessionStats;
use std::collections::BTreeSet;

/// Session counters owned by one detailed correlation pass
#[derive(Debug, Default)]
pub struct StatsAccumulator {
    stats: SessionStats,
    models: BTreeSet<String>,
    duration_ms: f64,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Version and branch come from the first record that names a version
    pub fn observe_envelope(&mut self, record: &Record) {
        if self.stats.session_version.is_empty() {
            self.stats.session_version = record.version.clone().unwrap_or_default();
            self.stats.git_branch = record.git_branch.clone().unwrap_or_default();
        }
    }

    pub fn observe_assistant(&mut self, message: &AssistantMessage) {
        if let Some(model) = message.model.as_deref().filter(|m| !m.is_empty()) {
            self.models.insert(model.to_string());
        }

        if let Some(usage) = &message.usage {
            self.stats.total_input_tokens += usage.input_tokens;
            self.stats.total_output_tokens += usage.output_tokens;
            self.stats.total_cache_read_tokens += usage.cache_read_input_tokens.unwrap_or(0);
            self.stats.total_cache_creation_tokens +=
                usage.cache_creation_input_tokens.unwrap_or(0);
        }

        for call in message.content.tool_uses() {
            self.stats.tool_use_count += 1;
            *self.stats.tools_used.entry(call.name.to_string()).or_insert(0) += 1;
        }
    }

    pub fn add_duration(&mut self, duration_ms: f64) {
        self.duration_ms += duration_ms;
    }

    pub fn count_turn(&mut self) {
        self.stats.turn_count += 1;
    }

    pub fn count_subagent(&mut self) {
        self.stats.subagent_count += 1;
    }

    pub fn finish(self) -> SessionStats {
        SessionStats {
            models_used: self.models.into_iter().collect(),
            total_duration_ms: self.duration_ms.max(0.0).round() as u64,
            ..self.stats
        }
    }
}
