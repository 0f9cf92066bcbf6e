use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::extract::ToolCategory;

/// Caller-selected behaviour of one correlation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelateOptions {
    /// Include tool summaries, system notices, per-message metadata and stats
    #[serde(default)]
    pub detailed: bool,
    /// Surface reasoning blocks as separate entries
    #[serde(default)]
    pub include_thinking: bool,
}

impl CorrelateOptions {
    pub fn detailed() -> Self {
        Self {
            detailed: true,
            include_thinking: false,
        }
    }

    pub fn with_thinking(mut self, include_thinking: bool) -> Self {
        self.include_thinking = include_thinking;
        self
    }
}

/// Selection of tool kinds for categorized extraction.
///
/// Entries name either a category (`file`, `search`, `web`, `git`) or a
/// single tool (`Read`, `Grep`, ...). An empty filter selects everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFilter {
    categories: BTreeSet<ToolCategory>,
    tools: BTreeSet<&'static str>,
}

impl Default for ToolFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl ToolFilter {
    pub fn all() -> Self {
        let categories: BTreeSet<ToolCategory> = ToolCategory::ALL.into_iter().collect();
        let tools = categories
            .iter()
            .flat_map(|c| c.tools().iter().copied())
            .collect();
        Self { categories, tools }
    }

    /// Build a filter from user-supplied names. Unknown names are ignored.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<S> = names.into_iter().collect();
        if names.is_empty() {
            return Self::all();
        }

        let mut categories = BTreeSet::new();
        let mut tools = BTreeSet::new();

        for name in &names {
            let name = name.as_ref().trim();
            if let Some(category) = ToolCategory::parse(name) {
                categories.insert(category);
                tools.extend(category.tools().iter().copied());
            } else if let Some(tool) = ToolCategory::ALL
                .iter()
                .flat_map(|c| c.tools().iter().copied())
                .find(|t| *t == name)
            {
                tools.insert(tool);
            }
        }

        Self { categories, tools }
    }

    pub fn includes_tool(&self, tool_name: &str) -> bool {
        self.tools.contains(tool_name)
    }

    pub fn includes_git(&self) -> bool {
        self.categories.contains(&ToolCategory::Git)
    }
}
