//! Block builders (§4.11): pure functions from domain data to
//! `{blocks, text}`. `text` is always a plain-text fallback rendering of
//! the same content, suitable for platforms/notifications that can't
//! render blocks.

use monday_core::types::{ExtractedTask, MeetingAnalysis};
use serde_json::{json, Value};

use crate::markdown::to_mrkdwn;

/// A block-kit-shaped `{blocks, text}` pair ready to hand to the
/// messaging-platform adapter.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub blocks: Value,
    pub text: String,
}

fn header(text: &str) -> Value {
    json!({
        "type": "header",
        "text": { "type": "plain_text", "text": text, "emoji": true }
    })
}

fn section(mrkdwn_text: &str) -> Value {
    json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": mrkdwn_text }
    })
}

fn divider() -> Value {
    json!({ "type": "divider" })
}

fn context(text: &str) -> Value {
    json!({
        "type": "context",
        "elements": [{ "type": "mrkdwn", "text": text }]
    })
}

struct Button {
    text: &'static str,
    action_id: &'static str,
    value: String,
    style: Option<&'static str>,
}

fn actions(buttons: Vec<Button>) -> Value {
    json!({
        "type": "actions",
        "elements": buttons
            .into_iter()
            .map(|b| {
                let mut el = json!({
                    "type": "button",
                    "text": { "type": "plain_text", "text": b.text },
                    "action_id": b.action_id,
                    "value": b.value,
                });
                if let Some(style) = b.style {
                    el["style"] = json!(style);
                }
                el
            })
            .collect::<Vec<_>>()
    })
}

/// A plain agent text response, converted from LLM markdown to mrkdwn.
pub fn agent_response_blocks(raw_text: &str) -> Rendered {
    let text = to_mrkdwn(raw_text);
    Rendered {
        blocks: json!([section(&text)]),
        text,
    }
}

pub fn error_blocks(message: &str) -> Rendered {
    let text = format!(":warning: {message}");
    Rendered {
        blocks: json!([section(&text)]),
        text,
    }
}

pub fn warning_blocks(message: &str) -> Rendered {
    let text = format!(":large_yellow_circle: {message}");
    Rendered {
        blocks: json!([section(&text)]),
        text,
    }
}

const NO_RESPONSE_TEXT: &str = "The agent did not return a response.";

pub fn no_response_blocks() -> Rendered {
    Rendered {
        blocks: json!([section(NO_RESPONSE_TEXT)]),
        text: NO_RESPONSE_TEXT.to_string(),
    }
}

/// Rendered board-status summary (§4.7 board-status handler).
pub fn status_dashboard_blocks(summary_raw: &str) -> Rendered {
    let summary = to_mrkdwn(summary_raw);
    let text = format!("Board Status\n{summary}");
    Rendered {
        blocks: json!([header("Board Status"), divider(), section(&summary)]),
        text,
    }
}

/// Task-from-conversation preview (§4.8). Metadata persistence is the
/// caller's responsibility; this only builds the display.
pub fn task_preview_blocks(task: &ExtractedTask) -> Rendered {
    let body = format!(
        "*Name:* {}\n*Description:* {}\n*Assignee:* {}\n*Priority:* {}\n*Status:* {}",
        task.name, task.description, task.assignee, task.priority, task.status
    );
    let text = format!("Task Preview\n{body}");
    Rendered {
        blocks: json!([
            header("Task Preview"),
            section(&body),
            actions(vec![
                Button {
                    text: "Create Task",
                    action_id: "mention_create_task",
                    value: task.name.clone(),
                    style: Some("primary"),
                },
                Button {
                    text: "Edit",
                    action_id: "mention_edit_task",
                    value: task.name.clone(),
                    style: None,
                },
                Button {
                    text: "Cancel",
                    action_id: "mention_cancel_task",
                    value: task.name.clone(),
                    style: Some("danger"),
                },
            ]),
        ]),
        text,
    }
}

/// Meeting-notes preview (§4.8), rendered after meeting analysis.
pub fn meeting_notes_preview_blocks(title: &str, analysis: &MeetingAnalysis) -> Rendered {
    let decisions = if analysis.decisions.is_empty() {
        "_none recorded_".to_string()
    } else {
        analysis
            .decisions
            .iter()
            .map(|d| format!("- {d}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let action_items = if analysis.action_items.is_empty() {
        "_none_".to_string()
    } else {
        analysis
            .action_items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let mut line = format!("{}. *{}*", i + 1, item.title);
                if let Some(assignee) = &item.assignee {
                    line.push_str(&format!(" — {assignee}"));
                }
                if let Some(priority) = &item.priority {
                    line.push_str(&format!(" [{priority}]"));
                }
                if let Some(deadline) = &item.deadline {
                    line.push_str(&format!(" (due {deadline})"));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let body = format!(
        "*Summary:* {}\n\n*Key decisions:*\n{decisions}\n\n*Action items:*\n{action_items}",
        analysis.summary
    );
    let text = format!("Meeting Notes: {title}\n{body}");

    Rendered {
        blocks: json!([
            header(&format!("Meeting Notes: {title}")),
            section(&body),
            actions(vec![
                Button {
                    text: "Approve",
                    action_id: "meeting_approve",
                    value: title.to_string(),
                    style: Some("primary"),
                },
                Button {
                    text: "Dismiss",
                    action_id: "meeting_dismiss",
                    value: title.to_string(),
                    style: None,
                },
            ]),
        ]),
        text,
    }
}

pub fn standup_blocks(agent_text: &str) -> Rendered {
    let body = to_mrkdwn(agent_text);
    Rendered {
        blocks: json!([header("Daily Standup"), divider(), section(&body)]),
        text: format!("Daily Standup\n{body}"),
    }
}

pub fn stale_task_blocks(agent_text: &str) -> Rendered {
    let body = to_mrkdwn(agent_text);
    Rendered {
        blocks: json!([header("Stale Tasks"), divider(), section(&body)]),
        text: format!("Stale Tasks\n{body}"),
    }
}

pub fn weekly_summary_blocks(agent_text: &str) -> Rendered {
    let body = to_mrkdwn(agent_text);
    Rendered {
        blocks: json!([header("Weekly Summary"), divider(), section(&body)]),
        text: format!("Weekly Summary\n{body}"),
    }
}

/// Replaces a task preview's blocks after the user acts on it.
pub fn task_outcome_blocks(outcome_text: &str, approver: &str) -> Rendered {
    let body = format!("{outcome_text}\n_by <@{approver}>_");
    Rendered {
        blocks: json!([section(&body)]),
        text: body,
    }
}

/// Replaces a meeting-notes preview's blocks once approved.
pub fn meeting_approved_blocks(approver: &str) -> Rendered {
    let text = format!("Meeting notes approved by <@{approver}>.");
    Rendered {
        blocks: json!([section(&text), context("Meeting sync complete.")]),
        text,
    }
}

/// Replaces a meeting-notes preview's blocks once dismissed.
pub fn meeting_dismissed_blocks() -> Rendered {
    let text = "Meeting notes dismissed.".to_string();
    Rendered {
        blocks: json!([section(&text)]),
        text,
    }
}

/// Connect-link prompt surfaced when an OAuth-gated intent has no token
/// on file (§4.7 meeting-sync/calendar/drive).
pub fn connect_link_blocks(auth_url: &str) -> Rendered {
    let text = "Connect your Google account to use this feature.".to_string();
    Rendered {
        blocks: json!([
            section(&text),
            actions(vec![Button {
                text: "Connect Google Account",
                action_id: "google_oauth_connect",
                value: auth_url.to_string(),
                style: Some("primary"),
            }]),
        ]),
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monday_core::types::{ActionItem, Priority, TaskStatus};

    fn sample_task() -> ExtractedTask {
        ExtractedTask {
            name: "Fix login bug".to_string(),
            description: "Users can't log in with SSO".to_string(),
            assignee: "jane".to_string(),
            priority: Priority::High,
            status: TaskStatus::ToDo,
        }
    }

    #[test]
    fn task_preview_has_three_buttons_with_expected_action_ids() {
        let rendered = task_preview_blocks(&sample_task());
        let blocks = rendered.blocks.as_array().unwrap();
        let actions_block = blocks
            .iter()
            .find(|b| b["type"] == "actions")
            .expect("actions block present");
        let ids: Vec<&str> = actions_block["elements"]
            .as_array()
            .unwrap()
            .iter()
            .map(|el| el["action_id"].as_str().unwrap())
            .collect();
        assert_eq!(
            ids,
            vec![
                "mention_create_task",
                "mention_edit_task",
                "mention_cancel_task"
            ]
        );
    }

    #[test]
    fn task_preview_text_contains_all_fields() {
        let rendered = task_preview_blocks(&sample_task());
        assert!(rendered.text.contains("Fix login bug"));
        assert!(rendered.text.contains("jane"));
        assert!(rendered.text.contains("High"));
    }

    #[test]
    fn meeting_preview_has_approve_and_dismiss_buttons() {
        let analysis = MeetingAnalysis {
            summary: "Discussed Q3 roadmap".to_string(),
            action_items: vec![ActionItem {
                title: "Draft proposal".to_string(),
                description: "".to_string(),
                assignee: Some("sam".to_string()),
                priority: Some(Priority::Medium),
                deadline: Some("2026-08-01".to_string()),
            }],
            decisions: vec!["Ship in Q3".to_string()],
            suggested_board_id: None,
        };
        let rendered = meeting_notes_preview_blocks("Planning Sync", &analysis);
        let blocks = rendered.blocks.as_array().unwrap();
        let actions_block = blocks.iter().find(|b| b["type"] == "actions").unwrap();
        let ids: Vec<&str> = actions_block["elements"]
            .as_array()
            .unwrap()
            .iter()
            .map(|el| el["action_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["meeting_approve", "meeting_dismiss"]);
        assert!(rendered.text.contains("Draft proposal"));
        assert!(rendered.text.contains("sam"));
    }

    #[test]
    fn stale_task_blocks_convert_markdown_body() {
        let rendered = stale_task_blocks("# Overdue\n**2** tasks need attention");
        assert!(rendered.text.contains("*Overdue*"));
        assert!(rendered.text.contains("*2* tasks"));
    }

    #[test]
    fn no_response_blocks_are_stable() {
        let rendered = no_response_blocks();
        assert_eq!(rendered.text, NO_RESPONSE_TEXT);
    }
}
