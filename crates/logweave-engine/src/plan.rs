use logweave_types::{PlanPayload, PlanSource};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static APPROVAL_BANNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"⏺\s*User approved Claude's plan").unwrap());

static SAVED_BANNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Plan saved to:\s*~[/\\]\.claude[/\\]plans[/\\]").unwrap());

static SAVED_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Plan saved to:\s*(~[/\\]\.claude[/\\]plans[/\\][^\s·]+\.md)").unwrap()
});

const TITLE_MAX_CHARS: usize = 100;
const UNTITLED: &str = "Untitled Plan";

pub fn contains_plan_approval(text: &str) -> bool {
    APPROVAL_BANNER.is_match(text) || SAVED_BANNER.is_match(text)
}

/// Parse an approval banner:
///
/// ```text
/// ⏺ User approved Claude's plan
///   ⎿  Plan saved to: ~/.claude/plans/foo.md · /plan to edit
///      Plan Title
///
///      Body...
/// ```
///
/// Returns `None` when there is no saved path or nothing follows it.
pub fn parse_plan_approval(text: &str) -> Option<PlanPayload> {
    let path_match = SAVED_PATH.captures(text)?.get(1)?;
    let path = path_match.as_str();

    let mut remaining = text[path_match.end()..].trim();
    if remaining.starts_with('·') {
        remaining = match remaining.split_once('\n') {
            Some((_, rest)) => rest,
            None => "",
        };
    }
    let remaining = remaining.trim();
    if remaining.is_empty() {
        return None;
    }

    let lines: Vec<&str> = remaining.split('\n').collect();
    let (title_idx, title) = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| {
            let line = line.trim();
            (!line.is_empty()).then_some((i, line))
        })
        .unwrap_or((0, ""));

    Some(PlanPayload {
        title: title.to_string(),
        path: path.to_string(),
        body: dedent(&lines[title_idx + 1..]),
        text: text.to_string(),
        source: PlanSource::Approval,
    })
}

/// Strip the common leading indentation of non-blank lines, then trim
fn dedent(lines: &[&str]) -> String {
    let indent_of = |line: &str| line.chars().take_while(|c| c.is_whitespace()).count();
    let min_indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent_of(line))
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| match line.char_indices().nth(min_indent) {
            Some((offset, _)) => &line[offset..],
            None if line.chars().count() == min_indent => "",
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Build a plan from the structured input of a finish-planning invocation.
///
/// `slug` names the plan file; without it the path falls back to
/// `~/.claude/plans/unknown.md`.
pub fn plan_from_exit_tool(input: &Value, slug: Option<&str>) -> Option<PlanPayload> {
    let plan = input.get("plan").and_then(Value::as_str)?;
    if plan.is_empty() {
        return None;
    }

    let path = match slug.filter(|s| !s.is_empty()) {
        Some(slug) => format!("~/.claude/plans/{}.md", slug),
        None => "~/.claude/plans/unknown.md".to_string(),
    };

    Some(PlanPayload {
        title: plan_title(plan),
        path,
        body: plan.to_string(),
        text: plan.to_string(),
        source: PlanSource::ExitTool,
    })
}

fn plan_title(plan: &str) -> String {
    for line in plan.trim().split('\n') {
        let line = line.trim();
        if let Some(heading) = line.strip_prefix("# ") {
            return heading.trim().to_string();
        }
        if !line.is_empty() && !line.starts_with('#') {
            return line.chars().take(TITLE_MAX_CHARS).collect();
        }
    }
    UNTITLED.to_string()
}
