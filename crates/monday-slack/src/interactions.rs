//! Interactive-component dispatch (§4.8): block actions from task/meeting
//! previews, and the two modal view-submissions that edit them before
//! sending to the product-owner agent.

use monday_core::types::ExtractedTask;
use monday_render::{meeting_approved_blocks, meeting_dismissed_blocks, task_outcome_blocks};
use monday_stores::MeetingStatus;
use serde_json::Value;
use tracing::warn;

use crate::context::SlackContext;
use crate::events::{InteractionPayload, ViewSubmission};
use crate::modals;
use crate::types::{MeetingPreviewPayload, TaskPreviewPayload};

pub async fn handle_block_action(ctx: &SlackContext, payload: InteractionPayload) {
    let Some(action) = payload.actions.first() else {
        return;
    };

    match action.action_id.as_str() {
        "mention_create_task" => handle_create(ctx, &payload).await,
        "mention_edit_task" => handle_edit_open(ctx, &payload).await,
        "mention_cancel_task" => handle_cancel(ctx, &payload).await,
        "meeting_approve" => handle_meeting_approve_open(ctx, &payload).await,
        "meeting_dismiss" => handle_meeting_dismiss(ctx, &payload).await,
        other => warn!(action_id = other, "unrecognized block action"),
    }
}

pub async fn handle_view_submission(ctx: &SlackContext, payload: InteractionPayload) {
    let Some(view) = payload.view.clone() else {
        return;
    };

    match view.callback_id.as_str() {
        "create_task_submit" => handle_create_task_submit(ctx, &payload, &view).await,
        "meeting_edit_submit" => handle_meeting_edit_submit(ctx, &payload, &view).await,
        other => warn!(callback_id = other, "unrecognized view submission"),
    }
}

fn task_payload(payload: &InteractionPayload) -> Option<TaskPreviewPayload> {
    let metadata = payload.message.as_ref()?.metadata.as_ref()?;
    if metadata.event_type != "task_preview" {
        return None;
    }
    serde_json::from_value(metadata.event_payload.clone()).ok()
}

fn meeting_payload(payload: &InteractionPayload) -> Option<MeetingPreviewPayload> {
    let metadata = payload.message.as_ref()?.metadata.as_ref()?;
    if metadata.event_type != "meeting_preview" {
        return None;
    }
    serde_json::from_value(metadata.event_payload.clone()).ok()
}

fn create_task_prompt(task: &ExtractedTask) -> String {
    format!(
        "Create a task on Monday.com with the following details:\n- Task name: {}\n- Description: {}\n- Assignee: {}\n- Priority: {}\n- Status: {}",
        task.name, task.description, task.assignee, task.priority, task.status
    )
}

async fn handle_create(ctx: &SlackContext, payload: &InteractionPayload) {
    let (Some(preview), Some(message)) = (task_payload(payload), &payload.message) else {
        return;
    };

    let response = ctx
        .a2a
        .send_message(&ctx.agents().product_owner_url, &create_task_prompt(&preview.task), None)
        .await;

    let outcome = match &response.error {
        Some(error) => format!("Failed to create task: {}", error.message),
        None => "Task created.".to_string(),
    };

    let rendered = task_outcome_blocks(&outcome, &payload.user.id);
    if let Err(e) = ctx
        .client
        .update_message(&preview.channel, &message.ts, &rendered.text, Some(&rendered.blocks), None)
        .await
    {
        warn!(error = %e, "failed to update task preview after create");
    }
}

async fn handle_edit_open(ctx: &SlackContext, payload: &InteractionPayload) {
    let (Some(preview), Some(message), Some(trigger_id)) = (task_payload(payload), &payload.message, &payload.trigger_id) else {
        return;
    };

    let view = modals::task_edit_view(&preview, &message.ts);
    if let Err(e) = ctx.client.open_view(trigger_id, view).await {
        warn!(error = %e, "failed to open task edit modal");
    }
}

async fn handle_cancel(ctx: &SlackContext, payload: &InteractionPayload) {
    let (Some(preview), Some(message)) = (task_payload(payload), &payload.message) else {
        return;
    };

    let rendered = task_outcome_blocks("Task creation cancelled.", &payload.user.id);
    if let Err(e) = ctx
        .client
        .update_message(&preview.channel, &message.ts, &rendered.text, Some(&rendered.blocks), None)
        .await
    {
        warn!(error = %e, "failed to update task preview after cancel");
    }
}

async fn handle_meeting_approve_open(ctx: &SlackContext, payload: &InteractionPayload) {
    let (Some(preview), Some(message), Some(trigger_id)) = (meeting_payload(payload), &payload.message, &payload.trigger_id) else {
        return;
    };

    let view = modals::meeting_edit_view(&preview, &message.ts);
    if let Err(e) = ctx.client.open_view(trigger_id, view).await {
        warn!(error = %e, "failed to open meeting edit modal");
    }
}

async fn handle_meeting_dismiss(ctx: &SlackContext, payload: &InteractionPayload) {
    let (Some(preview), Some(message)) = (meeting_payload(payload), &payload.message) else {
        return;
    };

    let rendered = meeting_dismissed_blocks();
    if let Err(e) = ctx
        .client
        .update_message(&preview.channel, &message.ts, &rendered.text, Some(&rendered.blocks), None)
        .await
    {
        warn!(error = %e, "failed to update meeting preview after dismiss");
    }
    if let Err(e) = ctx.meetings.set_status(&preview.event_id, MeetingStatus::Dismissed) {
        warn!(error = %e, "failed to mark meeting dismissed");
    }
}

async fn handle_create_task_submit(ctx: &SlackContext, payload: &InteractionPayload, view: &ViewSubmission) {
    let Ok(private) = serde_json::from_str::<Value>(&view.private_metadata) else {
        return;
    };
    let channel = private.get("channel").and_then(|v| v.as_str()).unwrap_or_default();
    let message_ts = private.get("message_ts").and_then(|v| v.as_str());

    let values = &view.state.values;
    let name = modals::extract_value(values, "name").unwrap_or_default();
    let description = modals::extract_value(values, "description").unwrap_or_default();
    let board = modals::extract_value(values, "board");
    let assignee = modals::extract_value(values, "assignee").unwrap_or_default();
    let status = modals::parse_status(modals::extract_value(values, "status"));
    let priority = modals::parse_priority(modals::extract_value(values, "priority"));

    let mut prompt = format!(
        "Create a task on Monday.com with the following details:\n- Task name: {name}\n- Description: {description}\n- Assignee: {assignee}"
    );
    if let Some(board) = &board {
        prompt.push_str(&format!("\n- Board: {board}"));
    }
    if let Some(priority) = priority {
        prompt.push_str(&format!("\n- Priority: {priority}"));
    }
    if let Some(status) = status {
        prompt.push_str(&format!("\n- Status: {status}"));
    }

    let response = ctx.a2a.send_message(&ctx.agents().product_owner_url, &prompt, None).await;
    let outcome = match &response.error {
        Some(error) => format!("Failed to create task: {}", error.message),
        None => "Task created.".to_string(),
    };
    let rendered = task_outcome_blocks(&outcome, &payload.user.id);

    let post_result = match message_ts {
        Some(ts) => {
            ctx.client
                .update_message(channel, ts, &rendered.text, Some(&rendered.blocks), None)
                .await
        }
        None => {
            ctx.client
                .post_message(channel, &rendered.text, Some(&rendered.blocks), None, None)
                .await
                .map(|_| ())
        }
    };
    if let Err(e) = post_result {
        warn!(error = %e, "failed to report task outcome after modal submit");
    }
}

async fn handle_meeting_edit_submit(ctx: &SlackContext, payload: &InteractionPayload, view: &ViewSubmission) {
    let Ok(private) = serde_json::from_str::<Value>(&view.private_metadata) else {
        return;
    };
    let channel = private.get("channel").and_then(|v| v.as_str()).unwrap_or_default();
    let event_id = private.get("event_id").and_then(|v| v.as_str()).unwrap_or_default();
    let title = private.get("title").and_then(|v| v.as_str()).unwrap_or_default();
    let message_ts = private.get("message_ts").and_then(|v| v.as_str());

    let values = &view.state.values;
    let board = modals::extract_value(values, "board");
    let summary = modals::extract_value(values, "summary").unwrap_or_default();
    let decisions = modals::extract_value(values, "decisions").unwrap_or_default();

    let mut action_items = Vec::new();
    for i in 0..5 {
        let Some(item_title) = modals::extract_value(values, &format!("action_item_{i}_title")) else {
            continue;
        };
        if item_title.trim().is_empty() {
            continue;
        }
        let description = modals::extract_value(values, &format!("action_item_{i}_description")).unwrap_or_default();
        let assignee = modals::extract_value(values, &format!("action_item_{i}_assignee"));
        let mut line = format!("- {item_title}");
        if !description.is_empty() {
            line.push_str(&format!(": {description}"));
        }
        if let Some(assignee) = assignee {
            line.push_str(&format!(" ({assignee})"));
        }
        action_items.push(line);
    }

    let mut prompt = format!("Record approved meeting notes for \"{title}\".\nSummary: {summary}\nDecisions: {decisions}");
    if let Some(board) = &board {
        prompt.push_str(&format!("\nBoard: {board}"));
    }
    if !action_items.is_empty() {
        prompt.push_str(&format!("\nAction items:\n{}", action_items.join("\n")));
    }

    let response = ctx.a2a.send_message(&ctx.agents().product_owner_url, &prompt, None).await;
    if let Some(error) = &response.error {
        warn!(error = %error.message, "product-owner rejected approved meeting notes");
    }

    let rendered = meeting_approved_blocks(&payload.user.id);
    if let Some(ts) = message_ts {
        if let Err(e) = ctx
            .client
            .update_message(channel, ts, &rendered.text, Some(&rendered.blocks), None)
            .await
        {
            warn!(error = %e, "failed to update meeting preview after approval");
        }
    }

    if let Err(e) = ctx.meetings.set_status(event_id, MeetingStatus::Approved) {
        warn!(error = %e, "failed to mark meeting approved");
    }
}
