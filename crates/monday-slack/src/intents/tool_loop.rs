//! Bounded tool-use loop for the `calendar` and `drive` intents (§4.7).
//! Both gate on an OAuth-connected Google account, then iterate the LLM
//! against a five-tool schema backed by `GoogleClient`, feeding each tool's
//! result back in as a plain user message — this crate's `Message` has no
//! structured tool-result content block — until the model stops calling
//! tools or the iteration cap is hit.

use monday_llm::{ChatRequest, Message, ToolCall, ToolDefinition};
use monday_oauth::GoogleClient;
use monday_render::connect_link_blocks;
use serde_json::{json, Value};
use tracing::warn;

use crate::context::SlackContext;
use crate::events::MessageEvent;

const MAX_TOOL_ITERATIONS: u32 = 5;

const CALENDAR_SYSTEM_PROMPT: &str = "You manage the user's Google Calendar on their behalf. \
Use the available tools to list, read, create, update, or delete events as the request requires, \
then reply in plain text summarizing what you did. All dates are RFC3339.";

const DRIVE_SYSTEM_PROMPT: &str = "You manage the user's Google Drive on their behalf. Use the \
available tools to list, read, create, update, or delete files as the request requires, then \
reply in plain text summarizing what you did.";

enum Domain {
    Calendar,
    Drive,
}

pub async fn handle_calendar(ctx: &SlackContext, event: &MessageEvent, thread_ts: &str, text: &str) {
    let Some(google) = connected_client(ctx, event, thread_ts).await else {
        return;
    };
    let reply = run_loop(ctx, &google, Domain::Calendar, text).await;
    post_plain(ctx, event, thread_ts, &reply).await;
}

pub async fn handle_drive(ctx: &SlackContext, event: &MessageEvent, thread_ts: &str, text: &str) {
    let Some(google) = connected_client(ctx, event, thread_ts).await else {
        return;
    };
    let reply = run_loop(ctx, &google, Domain::Drive, text).await;
    post_plain(ctx, event, thread_ts, &reply).await;
}

async fn connected_client(ctx: &SlackContext, event: &MessageEvent, thread_ts: &str) -> Option<GoogleClient> {
    let subject_id = event.user.clone()?;

    let Some(oauth) = &ctx.oauth else {
        post_plain(ctx, event, thread_ts, "Google integration isn't configured for this workspace.").await;
        return None;
    };

    if !oauth.is_connected(&subject_id) {
        let rendered = connect_link_blocks(&oauth.connect_url(&subject_id));
        if let Err(e) = ctx
            .client
            .post_message(&event.channel, &rendered.text, Some(&rendered.blocks), Some(thread_ts), None)
            .await
        {
            warn!(error = %e, "failed to post connect-link prompt");
        }
        return None;
    }

    match oauth.get_client(&subject_id).await {
        Ok(client) => Some(client),
        Err(e) => {
            warn!(error = %e, "failed to build google client");
            post_plain(ctx, event, thread_ts, "I couldn't access your Google account. Try reconnecting.").await;
            None
        }
    }
}

async fn run_loop(ctx: &SlackContext, google: &GoogleClient, domain: Domain, message_text: &str) -> String {
    let (system, tools) = match domain {
        Domain::Calendar => (CALENDAR_SYSTEM_PROMPT, calendar_tools()),
        Domain::Drive => (DRIVE_SYSTEM_PROMPT, drive_tools()),
    };

    let mut messages = vec![Message::user(message_text)];

    for _ in 0..MAX_TOOL_ITERATIONS {
        let response = match ctx
            .llm
            .chat(ChatRequest {
                system: Some(system.to_string()),
                messages: messages.clone(),
                tools: tools.clone(),
                max_tokens: 1024,
            })
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "tool-loop LLM call failed");
                return "Something went wrong talking to the agent. Please try again.".to_string();
            }
        };

        if !response.has_tool_use() {
            return response.text;
        }

        messages.push(Message::assistant(describe_tool_calls(&response.tool_calls)));
        for call in &response.tool_calls {
            let result = match domain {
                Domain::Calendar => dispatch_calendar_tool(google, &call.name, &call.input).await,
                Domain::Drive => dispatch_drive_tool(google, &call.name, &call.input).await,
            };
            messages.push(Message::user(format!("Result of {}: {result}", call.name)));
        }
    }

    "I wasn't able to finish this within the allotted number of steps. Please try a more specific request.".to_string()
}

fn describe_tool_calls(calls: &[ToolCall]) -> String {
    calls
        .iter()
        .map(|c| format!("calling {}({})", c.name, c.input))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn post_plain(ctx: &SlackContext, event: &MessageEvent, thread_ts: &str, text: &str) {
    if let Err(e) = ctx.client.post_message(&event.channel, text, None, Some(thread_ts), None).await {
        warn!(error = %e, "failed to post tool-loop reply");
    }
}

fn str_field(input: &Value, key: &str) -> String {
    input.get(key).and_then(|v| v.as_str()).unwrap_or_default().to_string()
}

fn calendar_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "list_events".to_string(),
            description: "List calendar events within a time range.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "time_min": { "type": "string", "description": "RFC3339 range start" },
                    "time_max": { "type": "string", "description": "RFC3339 range end" },
                },
                "required": ["time_min", "time_max"],
            }),
        },
        ToolDefinition {
            name: "get_event".to_string(),
            description: "Fetch a single calendar event by id.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": { "event_id": { "type": "string" } },
                "required": ["event_id"],
            }),
        },
        ToolDefinition {
            name: "create_event".to_string(),
            description: "Create a new calendar event.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "summary": { "type": "string" },
                    "start": { "type": "string", "description": "RFC3339" },
                    "end": { "type": "string", "description": "RFC3339" },
                },
                "required": ["summary", "start", "end"],
            }),
        },
        ToolDefinition {
            name: "update_event".to_string(),
            description: "Update an existing event's summary and/or time window.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "event_id": { "type": "string" },
                    "summary": { "type": "string" },
                    "start": { "type": "string", "description": "RFC3339" },
                    "end": { "type": "string", "description": "RFC3339" },
                },
                "required": ["event_id"],
            }),
        },
        ToolDefinition {
            name: "delete_event".to_string(),
            description: "Delete a calendar event by id.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": { "event_id": { "type": "string" } },
                "required": ["event_id"],
            }),
        },
    ]
}

fn drive_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "list_files".to_string(),
            description: "List Drive files matching a Drive API query string.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"],
            }),
        },
        ToolDefinition {
            name: "read_file".to_string(),
            description: "Export a Google Doc's contents as plain text.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": { "file_id": { "type": "string" } },
                "required": ["file_id"],
            }),
        },
        ToolDefinition {
            name: "create_file".to_string(),
            description: "Create a plain-text file in Drive.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "content": { "type": "string" },
                },
                "required": ["name", "content"],
            }),
        },
        ToolDefinition {
            name: "update_file".to_string(),
            description: "Rename an existing Drive file.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_id": { "type": "string" },
                    "new_name": { "type": "string" },
                },
                "required": ["file_id", "new_name"],
            }),
        },
        ToolDefinition {
            name: "delete_file".to_string(),
            description: "Delete a Drive file by id.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": { "file_id": { "type": "string" } },
                "required": ["file_id"],
            }),
        },
    ]
}

async fn dispatch_calendar_tool(google: &GoogleClient, name: &str, input: &Value) -> String {
    match name {
        "list_events" => match google
            .list_events(&str_field(input, "time_min"), &str_field(input, "time_max"))
            .await
        {
            Ok(events) if events.is_empty() => "no events found".to_string(),
            Ok(events) => events
                .iter()
                .map(|e| format!("{} ({})", e.id, e.summary.clone().unwrap_or_default()))
                .collect::<Vec<_>>()
                .join("; "),
            Err(e) => format!("error: {e}"),
        },
        "get_event" => match google.get_event(&str_field(input, "event_id")).await {
            Ok(event) => format!("{} ({})", event.id, event.summary.unwrap_or_default()),
            Err(e) => format!("error: {e}"),
        },
        "create_event" => match google
            .create_event(&str_field(input, "summary"), &str_field(input, "start"), &str_field(input, "end"))
            .await
        {
            Ok(event) => format!("created event {}", event.id),
            Err(e) => format!("error: {e}"),
        },
        "update_event" => {
            let event_id = str_field(input, "event_id");
            let summary = input.get("summary").and_then(|v| v.as_str());
            let start = input.get("start").and_then(|v| v.as_str());
            let end = input.get("end").and_then(|v| v.as_str());
            match google.update_event(&event_id, summary, start, end).await {
                Ok(event) => format!("updated event {}", event.id),
                Err(e) => format!("error: {e}"),
            }
        }
        "delete_event" => match google.delete_event(&str_field(input, "event_id")).await {
            Ok(()) => "event deleted".to_string(),
            Err(e) => format!("error: {e}"),
        },
        other => format!("unknown tool: {other}"),
    }
}

async fn dispatch_drive_tool(google: &GoogleClient, name: &str, input: &Value) -> String {
    match name {
        "list_files" => match google.list_files(&str_field(input, "query")).await {
            Ok(files) if files.is_empty() => "no files found".to_string(),
            Ok(files) => files
                .iter()
                .map(|f| format!("{} ({})", f.id, f.name))
                .collect::<Vec<_>>()
                .join("; "),
            Err(e) => format!("error: {e}"),
        },
        "read_file" => match google.export_doc_text(&str_field(input, "file_id")).await {
            Ok(text) => text,
            Err(e) => format!("error: {e}"),
        },
        "create_file" => match google
            .create_file(&str_field(input, "name"), &str_field(input, "content"))
            .await
        {
            Ok(file) => format!("created file {} ({})", file.id, file.name),
            Err(e) => format!("error: {e}"),
        },
        "update_file" => match google
            .update_file(&str_field(input, "file_id"), &str_field(input, "new_name"))
            .await
        {
            Ok(file) => format!("renamed file {} to {}", file.id, file.name),
            Err(e) => format!("error: {e}"),
        },
        "delete_file" => match google.delete_file(&str_field(input, "file_id")).await {
            Ok(()) => "file deleted".to_string(),
            Err(e) => format!("error: {e}"),
        },
        other => format!("unknown tool: {other}"),
    }
}
