use logweave_providers::claude::schema::{Content, UserRecord};
use logweave_types::Question;
use serde_json::Value;
use std::collections::BTreeMap;

pub const ASK_TOOL: &str = "AskUserQuestion";

/// First clarifying-question invocation of an assistant turn: (call id, questions)
pub fn questions_from_content(content: &Content) -> Option<(&str, Vec<Question>)> {
    let call = content.tool_uses().find(|call| call.name == ASK_TOOL)?;
    let questions = call
        .input
        .get("questions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default();
    Some((call.id, questions))
}

/// Answers carried by a user record, with the call id they resolve.
///
/// The id is taken from the first tool result that names one.
pub fn answers_from_record(user: &UserRecord) -> Option<(&str, &BTreeMap<String, String>)> {
    let answers = &user.tool_use_result.as_ref()?.answers;
    if answers.is_empty() {
        return None;
    }
    let content = &user.message.as_ref()?.content;
    content
        .tool_results()
        .find(|result| !result.tool_use_id.is_empty())
        .map(|result| (result.tool_use_id, answers))
}
