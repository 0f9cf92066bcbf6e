use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category a tracked tool operation is grouped under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    File,
    Search,
    Web,
    /// Shell invocations whose command starts with `git`
    Git,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 4] = [
        ToolCategory::File,
        ToolCategory::Search,
        ToolCategory::Web,
        ToolCategory::Git,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolCategory::File => "file",
            ToolCategory::Search => "search",
            ToolCategory::Web => "web",
            ToolCategory::Git => "git",
        }
    }

    /// Case-insensitive lookup by category name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
    }

    /// Tool names that belong to this category. Git has none: it is detected
    /// from the shell command text instead.
    pub fn tools(&self) -> &'static [&'static str] {
        match self {
            ToolCategory::File => &["Read", "Write", "Edit"],
            ToolCategory::Search => &["Grep", "Glob"],
            ToolCategory::Web => &["WebFetch", "WebSearch"],
            ToolCategory::Git => &[],
        }
    }

    pub fn for_tool(tool_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.tools().contains(&tool_name))
    }
}

/// A shell command that ran without an obvious failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BashCommand {
    pub command: String,
    /// Assistant commentary written just before the command was issued
    pub context: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::timestamp::serialize"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    Success,
    Failed,
}

/// Tool-specific digest of a tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolResultSummary {
    /// Detailed mode: the whole result body
    Full { content: String },
    Read { lines: usize, size_bytes: usize },
    Modified { status: OperationStatus },
    Search {
        matched_count: usize,
        matches_preview: Vec<String>,
    },
    Web { preview: String },
    Shell { output_preview: String },
    /// The invocation never received a result
    NoResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOperation {
    pub tool: String,
    pub category: ToolCategory,
    pub tool_use_id: String,
    pub context: String,
    pub input: Value,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::timestamp::serialize"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    pub result: ToolResultSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileOperations {
    #[serde(rename = "Read")]
    pub read: Vec<ToolOperation>,
    #[serde(rename = "Write")]
    pub write: Vec<ToolOperation>,
    #[serde(rename = "Edit")]
    pub edit: Vec<ToolOperation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchOperations {
    #[serde(rename = "Grep")]
    pub grep: Vec<ToolOperation>,
    #[serde(rename = "Glob")]
    pub glob: Vec<ToolOperation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebOperations {
    #[serde(rename = "WebFetch")]
    pub web_fetch: Vec<ToolOperation>,
    #[serde(rename = "WebSearch")]
    pub web_search: Vec<ToolOperation>,
}

/// Categorized tool operations of one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOperations {
    pub file: FileOperations,
    pub search: SearchOperations,
    pub web: WebOperations,
    pub git: Vec<ToolOperation>,
}

impl ToolOperations {
    /// File an operation under its category and tool. Operations for tools
    /// outside the known set are dropped.
    pub fn push(&mut self, op: ToolOperation) {
        let bucket = match (op.category, op.tool.as_str()) {
            (ToolCategory::Git, _) => &mut self.git,
            (_, "Read") => &mut self.file.read,
            (_, "Write") => &mut self.file.write,
            (_, "Edit") => &mut self.file.edit,
            (_, "Grep") => &mut self.search.grep,
            (_, "Glob") => &mut self.search.glob,
            (_, "WebFetch") => &mut self.web.web_fetch,
            (_, "WebSearch") => &mut self.web.web_search,
            _ => return,
        };
        bucket.push(op);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolOperation> {
        self.file
            .read
            .iter()
            .chain(&self.file.write)
            .chain(&self.file.edit)
            .chain(&self.search.grep)
            .chain(&self.search.glob)
            .chain(&self.web.web_fetch)
            .chain(&self.web.web_search)
            .chain(&self.git)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(tool: &str, category: ToolCategory) -> ToolOperation {
        ToolOperation {
            tool: tool.to_string(),
            category,
            tool_use_id: "toolu_1".to_string(),
            context: String::new(),
            input: Value::Null,
            timestamp: None,
            result: ToolResultSummary::NoResult,
        }
    }

    #[test]
    fn test_category_lookup() {
        assert_eq!(ToolCategory::parse("FILE"), Some(ToolCategory::File));
        assert_eq!(ToolCategory::parse("git"), Some(ToolCategory::Git));
        assert_eq!(ToolCategory::parse("Read"), None);
        assert_eq!(ToolCategory::for_tool("Glob"), Some(ToolCategory::Search));
        assert_eq!(ToolCategory::for_tool("Bash"), None);
    }

    #[test]
    fn test_push_routes_by_tool_and_category() {
        let mut ops = ToolOperations::default();
        ops.push(op("Read", ToolCategory::File));
        ops.push(op("WebSearch", ToolCategory::Web));
        ops.push(op("Bash", ToolCategory::Git));
        ops.push(op("Bash", ToolCategory::File));

        assert_eq!(ops.file.read.len(), 1);
        assert_eq!(ops.web.web_search.len(), 1);
        assert_eq!(ops.git.len(), 1);
        assert_eq!(ops.len(), 3);
    }

    #[test]
    fn test_operations_serialize_with_tool_names() {
        let mut ops = ToolOperations::default();
        ops.push(op("Grep", ToolCategory::Search));

        let json = serde_json::to_value(&ops).unwrap();
        assert_eq!(json["search"]["Grep"][0]["result"]["kind"], "no_result");
        assert!(json["file"]["Read"].as_array().unwrap().is_empty());
    }
}
