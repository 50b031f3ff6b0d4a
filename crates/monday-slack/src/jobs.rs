//! Built-in job `execute` closures (§4.9): standup, stale-task sweep,
//! weekly summary. Each wraps the scrum-master agent with a fixed prompt
//! and renders via the matching `monday-render` block style before
//! posting to the configured notification channel.

use std::sync::Arc;

use monday_a2a::{extract_text, A2aClient};
use monday_render::{stale_task_blocks, standup_blocks, weekly_summary_blocks};
use monday_scheduler::{JobExecuteFn, JobOutcome};
use tracing::warn;

use crate::client::SlackClient;

const STANDUP_PROMPT: &str = "Generate today's standup summary across all active boards.";
const STALE_TASK_PROMPT: &str = "List any tasks that have been stuck without progress for more \
than 3 days. If there are none, reply with exactly NO_STALE_TASKS and nothing else.";
const WEEKLY_SUMMARY_PROMPT: &str = "Summarize this week's progress across all boards for a \
leadership digest.";

const STALE_TASK_SENTINEL: &str = "NO_STALE_TASKS";

pub fn standup_job(a2a: Arc<A2aClient>, client: Arc<SlackClient>, scrum_master_url: String, channel: String) -> JobExecuteFn {
    Arc::new(move || {
        let a2a = a2a.clone();
        let client = client.clone();
        let scrum_master_url = scrum_master_url.clone();
        let channel = channel.clone();
        Box::pin(async move {
            let text = match fetch_agent_text(&a2a, &scrum_master_url, STANDUP_PROMPT).await {
                Ok(text) => text,
                Err(e) => return JobOutcome::failed(e),
            };
            let rendered = standup_blocks(&text);
            post_job_result(&client, &channel, &rendered).await
        })
    })
}

pub fn stale_task_job(a2a: Arc<A2aClient>, client: Arc<SlackClient>, scrum_master_url: String, channel: String) -> JobExecuteFn {
    Arc::new(move || {
        let a2a = a2a.clone();
        let client = client.clone();
        let scrum_master_url = scrum_master_url.clone();
        let channel = channel.clone();
        Box::pin(async move {
            let text = match fetch_agent_text(&a2a, &scrum_master_url, STALE_TASK_PROMPT).await {
                Ok(text) => text,
                Err(e) => return JobOutcome::failed(e),
            };
            if text.contains(STALE_TASK_SENTINEL) {
                return JobOutcome::ok(false);
            }
            let rendered = stale_task_blocks(&text);
            post_job_result(&client, &channel, &rendered).await
        })
    })
}

pub fn weekly_summary_job(a2a: Arc<A2aClient>, client: Arc<SlackClient>, scrum_master_url: String, channel: String) -> JobExecuteFn {
    Arc::new(move || {
        let a2a = a2a.clone();
        let client = client.clone();
        let scrum_master_url = scrum_master_url.clone();
        let channel = channel.clone();
        Box::pin(async move {
            let text = match fetch_agent_text(&a2a, &scrum_master_url, WEEKLY_SUMMARY_PROMPT).await {
                Ok(text) => text,
                Err(e) => return JobOutcome::failed(e),
            };
            let rendered = weekly_summary_blocks(&text);
            post_job_result(&client, &channel, &rendered).await
        })
    })
}

async fn fetch_agent_text(a2a: &A2aClient, agent_url: &str, prompt: &str) -> Result<String, String> {
    let response = a2a.send_message(agent_url, prompt, None).await;
    if let Some(error) = &response.error {
        return Err(error.message.clone());
    }
    let task = response.result.ok_or_else(|| "agent returned no task".to_string())?;
    Ok(extract_text(&task))
}

async fn post_job_result(client: &SlackClient, channel: &str, rendered: &monday_render::Rendered) -> JobOutcome {
    match client.post_message(channel, &rendered.text, Some(&rendered.blocks), None, None).await {
        Ok(_) => JobOutcome::ok(true),
        Err(e) => {
            warn!(error = %e, "job failed to post");
            JobOutcome::failed(e.to_string())
        }
    }
}
