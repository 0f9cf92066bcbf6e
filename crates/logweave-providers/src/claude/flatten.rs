use serde_json::Value;

use super::schema::{Content, ContentBlock};

/// Render turn content as plain text.
///
/// Text blocks are joined with newlines and tool results are dropped. In
/// detailed mode each tool invocation is rendered with its name and
/// pretty-printed input.
pub fn flatten_content(content: &Content, detailed: bool) -> String {
    match content {
        Content::Text(text) => text.clone(),
        Content::Blocks(blocks) => {
            let mut parts: Vec<String> = Vec::new();
            for block in blocks {
                match block {
                    ContentBlock::Text { text } => parts.push(text.clone()),
                    ContentBlock::ToolUse { name, input, .. } if detailed => {
                        parts.push(format!("\n🔧 Using tool: {}", name));
                        let input = serde_json::to_string_pretty(input)
                            .unwrap_or_else(|_| input.to_string());
                        parts.push(format!("Input: {}\n", input));
                    }
                    _ => {}
                }
            }
            parts.join("\n")
        }
        Content::Other(Value::Null) => String::new(),
        Content::Other(other) => other.to_string(),
    }
}

/// Non-empty reasoning texts, in order
pub fn thinking_texts(content: &Content) -> impl Iterator<Item = &str> {
    content.blocks().iter().filter_map(|block| match block {
        ContentBlock::Thinking { thinking } if !thinking.is_empty() => {
            Some(thinking.as_str())
        }
        _ => None,
    })
}

/// Text carried by a tool result body.
///
/// Bodies are either a string or a list of `{"type":"text"}` parts;
/// non-object list elements are ignored.
pub fn tool_result_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                item.as_object()
                    .map(|obj| obj.get("text").and_then(Value::as_str).unwrap_or(""))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blocks(value: Value) -> Content {
        Content::from(value)
    }

    #[test]
    fn test_text_blocks_joined_and_tool_results_dropped() {
        let content = blocks(json!([
            {"type": "text", "text": "first"},
            {"type": "tool_result", "tool_use_id": "t1", "content": "ignored"},
            {"type": "text", "text": "second"}
        ]));
        assert_eq!(flatten_content(&content, true), "first\nsecond");
    }

    #[test]
    fn test_tool_use_rendered_only_in_detailed_mode() {
        let content = blocks(json!([
            {"type": "text", "text": "Let me check."},
            {"type": "tool_use", "id": "t1", "name": "Bash", "input": {"command": "ls"}}
        ]));

        assert_eq!(flatten_content(&content, false), "Let me check.");
        assert_eq!(
            flatten_content(&content, true),
            "Let me check.\n\n🔧 Using tool: Bash\nInput: {\n  \"command\": \"ls\"\n}\n"
        );
    }

    #[test]
    fn test_tool_input_keeps_argument_order() {
        let content = blocks(json!([
            {"type": "tool_use", "id": "e1", "name": "Edit",
             "input": {"file_path": "a.rs", "old_string": "x", "new_string": "y"}}
        ]));

        assert_eq!(
            flatten_content(&content, true),
            "\n🔧 Using tool: Edit\nInput: {\n  \"file_path\": \"a.rs\",\n  \"old_string\": \"x\",\n  \"new_string\": \"y\"\n}\n"
        );
    }

    #[test]
    fn test_missing_tool_input_renders_empty_object() {
        let content = blocks(json!([{"type": "tool_use", "id": "t1", "name": "TodoRead"}]));
        assert_eq!(
            flatten_content(&content, true),
            "\n🔧 Using tool: TodoRead\nInput: {}\n"
        );
    }

    #[test]
    fn test_other_shapes_render_literally() {
        assert_eq!(flatten_content(&Content::Other(json!(42)), false), "42");
        assert_eq!(flatten_content(&Content::Other(Value::Null), false), "");
        assert_eq!(flatten_content(&Content::Text("plain".into()), false), "plain");
    }

    #[test]
    fn test_tool_result_text_shapes() {
        assert_eq!(tool_result_text(&json!("out")), "out");
        assert_eq!(
            tool_result_text(&json!([{"type": "text", "text": "a"}, {"type": "text", "text": "b"}])),
            "a\nb"
        );
        assert_eq!(tool_result_text(&Value::Null), "");
    }
}
