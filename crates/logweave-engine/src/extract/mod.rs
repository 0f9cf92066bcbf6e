// Shell-command and tool-operation extraction
// Sibling passes to the stream correlator: same record order, same pairing
// discipline, different output.

pub mod bash;
pub mod tools;

pub use bash::collect_bash_commands;
pub use tools::collect_tool_operations;

/// Assistant commentary gathered since the last tracked invocation
#[derive(Debug, Default)]
pub(crate) struct ContextBuffer {
    parts: Vec<String>,
}

impl ContextBuffer {
    pub(crate) fn push(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.parts.push(text.to_string());
        }
    }

    /// Joined commentary; the buffer starts over afterwards
    pub(crate) fn take(&mut self) -> String {
        let joined = self.parts.join("\n\n");
        self.parts.clear();
        joined
    }

    pub(crate) fn reset(&mut self) {
        self.parts.clear();
    }
}

/// Keep the first `max_chars` characters, marking the cut with `...`
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((offset, _)) => format!("{}...", &s[..offset]),
        None => s.to_string(),
    }
}
