//! Edit-modal view builders and `view.state.values` extraction (§4.8).

use monday_core::types::{Priority, TaskStatus};
use serde_json::{json, Value};

use crate::types::{MeetingPreviewPayload, TaskPreviewPayload};

fn plain_text_input(block_id: &str, label: &str, initial: &str, multiline: bool, optional: bool) -> Value {
    json!({
        "type": "input",
        "block_id": block_id,
        "optional": optional,
        "label": { "type": "plain_text", "text": label },
        "element": {
            "type": "plain_text_input",
            "action_id": block_id,
            "multiline": multiline,
            "initial_value": initial,
        }
    })
}

fn static_select(block_id: &str, label: &str, options: &[&str], initial: Option<&str>) -> Value {
    let opts: Vec<Value> = options
        .iter()
        .map(|o| json!({ "text": { "type": "plain_text", "text": *o }, "value": *o }))
        .collect();
    let mut element = json!({
        "type": "static_select",
        "action_id": block_id,
        "options": opts,
    });
    if let Some(initial) = initial {
        element["initial_option"] = json!({ "text": { "type": "plain_text", "text": initial }, "value": initial });
    }
    json!({
        "type": "input",
        "block_id": block_id,
        "label": { "type": "plain_text", "text": label },
        "element": element,
    })
}

fn board_options(payload_boards: &[crate::types::BoardSummary]) -> Vec<&str> {
    payload_boards.iter().map(|b| b.name.as_str()).collect()
}

/// Task edit modal (§4.8 edit button): name required, description/board
/// selector/assignee/status/priority all pre-filled from metadata.
pub fn task_edit_view(payload: &TaskPreviewPayload, message_ts: &str) -> Value {
    let board_names = board_options(&payload.boards);
    let private_metadata = json!({
        "channel": payload.channel,
        "thread_ts": payload.thread_ts,
        "user_id": payload.user_id,
        "message_ts": message_ts,
    })
    .to_string();

    json!({
        "type": "modal",
        "callback_id": "create_task_submit",
        "private_metadata": private_metadata,
        "title": { "type": "plain_text", "text": "Edit Task" },
        "submit": { "type": "plain_text", "text": "Submit" },
        "blocks": [
            plain_text_input("name", "Name", &payload.task.name, false, false),
            plain_text_input("description", "Description", &payload.task.description, true, true),
            static_select("board", "Board", &board_names, None),
            plain_text_input("assignee", "Assignee", &payload.task.assignee, false, true),
            static_select("status", "Status", &["ToDo", "Working", "InProgress", "Done"], Some(payload.task.status.as_str())),
            static_select("priority", "Priority", &["Low", "Medium", "High", "Critical"], Some(payload.task.priority.as_str())),
        ],
    })
}

/// Meeting-notes edit modal (§4.8 approve button): board selector,
/// summary, decisions, and up to five action-item slots.
pub fn meeting_edit_view(payload: &MeetingPreviewPayload, message_ts: &str) -> Value {
    let decisions = payload.analysis.decisions.join("\n");
    let private_metadata = json!({
        "subject_id": payload.subject_id,
        "event_id": payload.event_id,
        "title": payload.title,
        "channel": payload.channel,
        "message_ts": message_ts,
    })
    .to_string();

    let mut blocks = vec![
        plain_text_input(
            "board",
            "Board",
            payload.analysis.suggested_board_id.as_deref().unwrap_or(""),
            false,
            true,
        ),
        plain_text_input("summary", "Summary", &payload.analysis.summary, true, false),
        plain_text_input("decisions", "Key decisions (one per line)", &decisions, true, true),
    ];

    for (i, item) in payload.analysis.action_items.iter().take(5).enumerate() {
        blocks.push(plain_text_input(
            &format!("action_item_{i}_title"),
            &format!("Action item {} — title", i + 1),
            &item.title,
            false,
            true,
        ));
        blocks.push(plain_text_input(
            &format!("action_item_{i}_description"),
            &format!("Action item {} — description", i + 1),
            &item.description,
            true,
            true,
        ));
        blocks.push(plain_text_input(
            &format!("action_item_{i}_assignee"),
            &format!("Action item {} — assignee", i + 1),
            item.assignee.as_deref().unwrap_or(""),
            false,
            true,
        ));
    }

    json!({
        "type": "modal",
        "callback_id": "meeting_edit_submit",
        "private_metadata": private_metadata,
        "title": { "type": "plain_text", "text": "Approve Meeting Notes" },
        "submit": { "type": "plain_text", "text": "Submit" },
        "blocks": blocks,
    })
}

/// Pull a single field's value out of `view.state.values` — plain-text
/// inputs carry `.value`, selects carry `.selected_option.value`.
pub fn extract_value(values: &Value, block_id: &str) -> Option<String> {
    let field = values.get(block_id)?.get(block_id)?;
    if let Some(v) = field.get("value").and_then(|v| v.as_str()) {
        if !v.is_empty() {
            return Some(v.to_string());
        }
    }
    field
        .get("selected_option")
        .and_then(|o| o.get("value"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

pub fn parse_priority(s: Option<String>) -> Option<Priority> {
    match s?.as_str() {
        "Low" => Some(Priority::Low),
        "Medium" => Some(Priority::Medium),
        "High" => Some(Priority::High),
        "Critical" => Some(Priority::Critical),
        _ => None,
    }
}

pub fn parse_status(s: Option<String>) -> Option<TaskStatus> {
    match s?.as_str() {
        "ToDo" => Some(TaskStatus::ToDo),
        "Working" => Some(TaskStatus::Working),
        "InProgress" => Some(TaskStatus::InProgress),
        "Done" => Some(TaskStatus::Done),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_value_reads_plain_text_input() {
        let values = json!({ "name": { "name": { "value": "Fix bug" } } });
        assert_eq!(extract_value(&values, "name"), Some("Fix bug".to_string()));
    }

    #[test]
    fn extract_value_reads_static_select() {
        let values = json!({ "priority": { "priority": { "selected_option": { "value": "High" } } } });
        assert_eq!(extract_value(&values, "priority"), Some("High".to_string()));
    }

    #[test]
    fn parse_priority_rejects_unknown() {
        assert!(parse_priority(Some("Urgent".to_string())).is_none());
    }
}
