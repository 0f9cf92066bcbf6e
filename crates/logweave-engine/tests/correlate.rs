use logweave_engine::{StreamCorrelator, correlate_file};
use logweave_providers::Record;
use logweave_testing::TestWorld;
use logweave_testing::fixtures::*;
use logweave_types::{
    ConversationEntry, CorrelateOptions, EntryPayload, PlanSource, SubagentRole,
};
use serde_json::{Value, json};

fn roles(entries: &[ConversationEntry]) -> Vec<&'static str> {
    entries.iter().map(|e| e.role()).collect()
}

fn list_files_session() -> Vec<Value> {
    vec![
        user_text("list files", 1),
        assistant(
            json!([
                text_block("Let me list the files."),
                tool_use("toolu_ls", "Bash", json!({"command": "ls"}))
            ]),
            2,
        ),
        tool_result("toolu_ls", "a.py\nb.py", 3),
        assistant_text("Found 2 files", 4),
    ]
}

#[test]
fn test_tool_round_trip_leaves_no_standalone_entries() {
    let world = TestWorld::new().with_session(&list_files_session());

    let entries = correlate_file(world.session_path(), CorrelateOptions::default());

    assert_eq!(roles(&entries), vec!["user", "assistant", "assistant"]);
    assert_eq!(entries[0].text(), Some("list files"));
    assert_eq!(entries[1].text(), Some("Let me list the files."));
    assert_eq!(entries[2].text(), Some("Found 2 files"));
}

#[test]
fn test_detailed_mode_inlines_tools_and_appends_stats() {
    let world = TestWorld::new().with_session(&list_files_session());

    let entries = correlate_file(world.session_path(), CorrelateOptions::detailed());

    assert_eq!(
        roles(&entries),
        vec!["user", "assistant", "assistant", "stats"]
    );
    let EntryPayload::Assistant(first) = &entries[1].payload else {
        panic!("expected assistant entry");
    };
    assert!(first.text.contains("🔧 Using tool: Bash"));
    assert!(first.text.contains("\"command\": \"ls\""));
    let metadata = first.metadata.as_ref().unwrap();
    assert_eq!(metadata.model, MODEL);
    assert_eq!(metadata.cache_read_tokens, 5000);
    assert_eq!(metadata.cwd, CWD);
    assert_eq!(metadata.git_branch, BRANCH);

    let EntryPayload::Stats(stats) = &entries[3].payload else {
        panic!("expected stats entry");
    };
    assert!(entries[3].timestamp.is_none());
    assert_eq!(stats.turn_count, 1);
    assert_eq!(stats.tool_use_count, 1);
    assert_eq!(stats.tools_used.get("Bash"), Some(&1));
    assert_eq!(stats.total_input_tokens, 2000);
    assert_eq!(stats.total_output_tokens, 400);
    assert_eq!(stats.models_used, vec![MODEL.to_string()]);
    assert_eq!(stats.session_version, VERSION);
    assert_eq!(stats.git_branch, BRANCH);
}

#[test]
fn test_stats_count_every_invocation() {
    let world = TestWorld::new().with_session(&[
        user_text("go", 1),
        assistant(
            json!([
                tool_use("t1", "Read", json!({"file_path": "a"})),
                tool_use("t2", "Read", json!({"file_path": "b"})),
                tool_use("t3", "Grep", json!({"pattern": "x"}))
            ]),
            2,
        ),
        assistant(json!([tool_use("t4", "Read", json!({}))]), 3),
        turn_duration(1200, 4),
        turn_duration(800, 5),
    ]);

    let entries = correlate_file(world.session_path(), CorrelateOptions::detailed());
    let EntryPayload::Stats(stats) = &entries.last().unwrap().payload else {
        panic!("expected trailing stats");
    };

    assert_eq!(stats.tool_use_count, 4);
    assert_eq!(stats.tools_used.len(), 2);
    assert_eq!(stats.tools_used["Read"], 3);
    assert_eq!(stats.tools_used["Grep"], 1);
    assert_eq!(stats.total_duration_ms, 2000);
}

#[test]
fn test_thinking_entries_only_with_flag() {
    let world = TestWorld::new().with_session(&[
        user_text("why?", 1),
        assistant(
            json!([
                thinking_block("first thought"),
                thinking_block(""),
                thinking_block("second thought"),
                text_block("Because.")
            ]),
            2,
        ),
    ]);

    let plain = correlate_file(world.session_path(), CorrelateOptions::default());
    assert_eq!(roles(&plain), vec!["user", "assistant"]);

    let with_thinking = correlate_file(
        world.session_path(),
        CorrelateOptions::default().with_thinking(true),
    );
    assert_eq!(
        roles(&with_thinking),
        vec!["user", "thinking", "thinking", "assistant"]
    );
    assert_eq!(with_thinking[1].text(), Some("first thought"));
    assert_eq!(with_thinking[2].text(), Some("second thought"));
}

fn delegation_session() -> Vec<Value> {
    vec![
        user_text("explore the code", 1),
        assistant(
            json!([tool_use(
                "toolu_task",
                "Task",
                json!({"description": "Explore codebase", "subagent_type": "Explore", "prompt": "..."})
            )]),
            2,
        ),
        tool_result(
            "toolu_task",
            json!([{"type": "text", "text": "Summary of findings.\nagentId: a1b2c3 (use to resume)"}]),
            5,
        ),
        assistant_text("The explorer found it.", 6),
    ]
}

fn subagent_records() -> Vec<Value> {
    vec![
        with_field(user_text("Explore the codebase", 3), "isSidechain", true),
        assistant_text("Looking around.", 4),
    ]
}

#[test]
fn test_delegated_task_inlines_side_file() {
    let world = TestWorld::new()
        .with_session(&delegation_session())
        .with_subagent("a1b2c3", &subagent_records());

    let entries = correlate_file(world.session_path(), CorrelateOptions::detailed());

    let subagents: Vec<_> = entries
        .iter()
        .filter_map(|e| match &e.payload {
            EntryPayload::Subagent(s) => Some((e, s)),
            _ => None,
        })
        .collect();
    assert_eq!(subagents.len(), 1);
    let (entry, subagent) = subagents[0];
    assert_eq!(entry.timestamp.unwrap().to_rfc3339(), "2026-01-15T10:05:00+00:00");
    assert_eq!(subagent.description, "Explore codebase");
    assert_eq!(subagent.subagent_type, "Explore");
    assert_eq!(subagent.agent_id, "a1b2c3");
    assert_eq!(subagent.model, MODEL);
    assert_eq!(subagent.messages.len(), 2);
    assert_eq!(subagent.messages[0].role, SubagentRole::User);

    let EntryPayload::Stats(stats) = &entries.last().unwrap().payload else {
        panic!("expected trailing stats");
    };
    assert_eq!(stats.subagent_count, 1);
}

#[test]
fn test_legacy_side_file_is_found() {
    let world = TestWorld::new()
        .with_session(&delegation_session())
        .with_legacy_subagent("a1b2c3", &subagent_records());

    let entries = correlate_file(world.session_path(), CorrelateOptions::default());
    assert_eq!(
        roles(&entries),
        vec!["user", "subagent", "assistant"]
    );
}

fn task_call(id: &str, minute: u32) -> Value {
    assistant(
        json!([tool_use(
            id,
            "Task",
            json!({"description": "Explore codebase", "subagent_type": "Explore"})
        )]),
        minute,
    )
}

fn task_result(id: &str, agent_id: &str, minute: u32) -> Value {
    tool_result(
        id,
        json!([{"type": "text", "text": format!("Done.\nagentId: {} (use to resume)", agent_id)}]),
        minute,
    )
}

#[test]
fn test_repeated_delegate_reuses_loaded_transcript() -> anyhow::Result<()> {
    let world = TestWorld::new().with_subagent("zz", &subagent_records());
    let side_file = world
        .project_dir()
        .join(SESSION_ID)
        .join("subagents")
        .join("agent-zz.jsonl");
    let first_half = [task_call("t1", 1), task_result("t1", "zz", 2)];
    let second_half = [task_call("t2", 3), task_result("t2", "zz", 4)];

    let mut correlator = StreamCorrelator::new(world.session_path(), CorrelateOptions::default());
    for value in &first_half {
        correlator.push(&serde_json::from_value::<Record>(value.clone())?);
    }
    // Rewritten after the first resolve; the pass must keep the loaded copy
    std::fs::write(&side_file, to_jsonl(&[user_text("rewritten", 9)]))?;
    for value in &second_half {
        correlator.push(&serde_json::from_value::<Record>(value.clone())?);
    }
    let entries = correlator.finish();

    assert_eq!(roles(&entries), vec!["subagent", "subagent"]);
    let messages: Vec<_> = entries
        .iter()
        .filter_map(|e| match &e.payload {
            EntryPayload::Subagent(s) => Some(&s.messages),
            _ => None,
        })
        .collect();
    assert_eq!(messages[0], messages[1]);
    assert_eq!(messages[0].len(), 2);
    assert_eq!(messages[0][0].text, "Explore the codebase");
    Ok(())
}

#[test]
fn test_structured_agent_id_resolves_delegate() {
    let world = TestWorld::new()
        .with_session(&[
            task_call("t1", 1),
            with_field(
                tool_result("t1", "Explorer finished.", 2),
                "toolUseResult",
                json!({"status": "completed", "agentId": "a1b2c3"}),
            ),
        ])
        .with_subagent("a1b2c3", &subagent_records());

    let entries = correlate_file(world.session_path(), CorrelateOptions::default());

    assert_eq!(roles(&entries), vec!["subagent"]);
    let EntryPayload::Subagent(subagent) = &entries[0].payload else {
        panic!("expected subagent entry");
    };
    assert_eq!(subagent.agent_id, "a1b2c3");
}

#[test]
fn test_missing_side_file_drops_delegation() {
    let world = TestWorld::new().with_session(&delegation_session());

    let entries = correlate_file(world.session_path(), CorrelateOptions::default());

    assert_eq!(roles(&entries), vec!["user", "assistant"]);
}

#[test]
fn test_questions_pair_with_answers() {
    let world = TestWorld::new().with_session(&[
        user_text("set up the db", 1),
        assistant(
            json!([tool_use(
                "toolu_q",
                "AskUserQuestion",
                json!({"questions": [{
                    "question": "Which database?",
                    "header": "DB",
                    "options": [{"label": "Postgres", "description": "relational"}, {"label": "SQLite"}],
                    "multiSelect": false
                }]})
            )]),
            2,
        ),
        answers("toolu_q", json!({"Which database?": "Postgres"}), 3),
        answers("toolu_unknown", json!({"Other?": "yes"}), 4),
    ]);

    let entries = correlate_file(world.session_path(), CorrelateOptions::default());

    assert_eq!(roles(&entries), vec!["user", "qa"]);
    let EntryPayload::Qa(qa) = &entries[1].payload else {
        panic!("expected qa entry");
    };
    assert_eq!(qa.questions[0].question, "Which database?");
    assert_eq!(qa.questions[0].options.len(), 2);
    assert_eq!(qa.answers["Which database?"], "Postgres");
}

#[test]
fn test_exit_plan_tool_replaces_assistant_text() {
    let world = TestWorld::new().with_session(&[
        user_text("plan it", 1),
        with_field(
            assistant(
                json!([
                    text_block("Here is the plan."),
                    tool_use("toolu_plan", "ExitPlanMode", json!({"plan": "# Add Auth\n\n1. Login\n2. Logout"}))
                ]),
                2,
            ),
            "slug",
            "snug-otter",
        ),
    ]);

    let entries = correlate_file(world.session_path(), CorrelateOptions::default());

    assert_eq!(roles(&entries), vec!["user", "plan"]);
    let EntryPayload::Plan(plan) = &entries[1].payload else {
        panic!("expected plan entry");
    };
    assert_eq!(plan.title, "Add Auth");
    assert_eq!(plan.path, "~/.claude/plans/snug-otter.md");
    assert_eq!(plan.source, PlanSource::ExitTool);
}

#[test]
fn test_approval_banner_becomes_plan() {
    let banner = "⏺ User approved Claude's plan\n  ⎿  Plan saved to: ~/.claude/plans/quiet-lake.md · /plan to edit\n     Refactor Parser\n\n     Split the lexer out.";
    let world = TestWorld::new().with_session(&[
        user_text(banner, 1),
        user_text("⏺ User approved Claude's plan but nothing else", 2),
    ]);

    let entries = correlate_file(world.session_path(), CorrelateOptions::detailed());

    assert_eq!(roles(&entries), vec!["plan", "user", "stats"]);
    let EntryPayload::Plan(plan) = &entries[0].payload else {
        panic!("expected plan entry");
    };
    assert_eq!(plan.title, "Refactor Parser");
    assert_eq!(plan.body, "Split the lexer out.");
    assert_eq!(plan.source, PlanSource::Approval);
    let EntryPayload::Stats(stats) = &entries[2].payload else {
        panic!("expected stats entry");
    };
    assert_eq!(stats.turn_count, 2);
}

#[test]
fn test_assistant_approval_banner() {
    let banner = "⏺ User approved Claude's plan\n  ⎿  Plan saved to: ~/.claude/plans/quiet-lake.md · /plan to edit\n     Refactor Parser\n\n     Split the lexer out.";
    let unparseable = "⏺ User approved Claude's plan\n  ⎿  Plan saved to: ~/.claude/plans/quiet-lake.md";
    let world = TestWorld::new().with_session(&[
        assistant_text(banner, 1),
        assistant_text(unparseable, 2),
    ]);

    let entries = correlate_file(world.session_path(), CorrelateOptions::detailed());

    assert_eq!(roles(&entries), vec!["plan", "assistant", "stats"]);
    let EntryPayload::Plan(plan) = &entries[0].payload else {
        panic!("expected plan entry");
    };
    assert_eq!(plan.title, "Refactor Parser");
    assert_eq!(plan.path, "~/.claude/plans/quiet-lake.md");
    assert_eq!(plan.source, PlanSource::Approval);

    let EntryPayload::Assistant(fallback) = &entries[1].payload else {
        panic!("expected assistant entry");
    };
    assert_eq!(fallback.text, unparseable);
    assert_eq!(fallback.metadata.as_ref().unwrap().model, MODEL);
}

#[test]
fn test_malformed_lines_are_skipped() {
    let text = format!(
        "{}\nnot json at all\n{{\"type\":\n\n{}\n",
        user_text("hello", 1),
        assistant_text("hi", 2)
    );
    let world = TestWorld::new().with_raw_session(&text);

    let entries = correlate_file(world.session_path(), CorrelateOptions::default());

    assert_eq!(roles(&entries), vec!["user", "assistant"]);
}

#[test]
fn test_unreadable_log_yields_nothing() {
    let world = TestWorld::new();
    let entries = correlate_file(world.session_path(), CorrelateOptions::detailed());
    assert!(entries.is_empty());
}

#[test]
fn test_entries_never_outnumber_records() {
    let mut records = list_files_session();
    records.extend([
        snapshot(5),
        hook_progress("PostToolUse", "fmt", 6),
        system("local_command", "/status", 7),
        user_text("   ", 8),
    ]);
    let world = TestWorld::new().with_session(&records);

    let entries = correlate_file(world.session_path(), CorrelateOptions::detailed());
    let non_stats = entries.iter().filter(|e| !e.is_stats()).count();

    assert!(non_stats <= records.len());
    assert_eq!(
        roles(&entries),
        vec!["user", "assistant", "assistant", "system", "system", "stats"]
    );
}

#[test]
fn test_repeated_runs_are_identical() -> anyhow::Result<()> {
    let world = TestWorld::new()
        .with_session(&delegation_session())
        .with_subagent("a1b2c3", &subagent_records());
    let options = CorrelateOptions::detailed().with_thinking(true);

    let first = serde_json::to_string(&correlate_file(world.session_path(), options))?;
    let second = serde_json::to_string(&correlate_file(world.session_path(), options))?;

    assert_eq!(first, second);
    Ok(())
}
