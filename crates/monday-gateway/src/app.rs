//! Central application state (§5): assembles every collaborator crate
//! behind one `Arc<AppState>` and wires the Axum router over it.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use monday_a2a::A2aClient;
use monday_core::config::MondayConfig;
use monday_llm::LlmClient;
use monday_meetingsync::{MeetingSyncOrchestrator, MeetingSyncService, PreviewPoster};
use monday_oauth::{OAuthBroker, OAuthBrokerConfig};
use monday_scheduler::{Job, SchedulerEngine};
use monday_sessions::SessionStore;
use monday_slack::{directory::UserDirectory, jobs, SlackClient, SlackContext, SlackPreviewPoster};
use monday_stores::{MeetingStore, TokenStore};

use crate::http;

/// Everything the Axum handlers need, plus the two background drivers
/// (`main` owns starting/stopping them across the graceful-shutdown
/// signal, §5 "stop scheduler, stop meeting-sync orchestrator").
pub struct AppState {
    pub slack: Arc<SlackContext>,
    pub scheduler: Arc<SchedulerEngine>,
    pub meeting_sync_orchestrator: Arc<MeetingSyncOrchestrator>,
    pub agent_notify_api_key: String,
}

impl AppState {
    /// Build every collaborator from config. An `Err` here is always a
    /// fatal startup condition (§6 exit code 1): bad timezone, invalid
    /// cron for an enabled job, or an unreachable store file.
    pub async fn build(config: MondayConfig) -> anyhow::Result<Arc<Self>> {
        let slack_client = Arc::new(SlackClient::new(config.slack.bot_token.clone()));
        let bot_user_id = slack_client.auth_test().await?;

        let tokens = TokenStore::open(&config.database.token_store_path)?;
        let connected_subjects = tokens.list_subject_ids()?;
        let meetings = Arc::new(MeetingStore::open(&config.database.meeting_store_path)?);

        let oauth = config.oauth.google.clone().map(|google| {
            Arc::new(OAuthBroker::new(
                OAuthBrokerConfig {
                    client_id: google.client_id,
                    client_secret: google.client_secret,
                    redirect_uri: google.redirect_uri,
                    signing_secret: google.signing_secret,
                },
                tokens,
            ))
        });

        let a2a = Arc::new(A2aClient::new(config.agents.api_key.clone()));
        let llm = Arc::new(LlmClient::new(
            config.llm.api_key.clone(),
            config.llm.base_url.clone(),
            config.llm.model.clone(),
        ));
        let sessions = Arc::new(SessionStore::new());
        let directory = UserDirectory::new(config.slack.static_user_map.clone());

        let poster: Arc<dyn PreviewPoster> = Arc::new(SlackPreviewPoster::new(
            slack_client.clone(),
            config.slack.notification_channel_id.clone(),
        ));
        let meeting_sync = Arc::new(MeetingSyncService::new(oauth.clone(), meetings.clone(), llm.clone(), poster));

        let slack = Arc::new(SlackContext {
            config: config.clone(),
            client: slack_client.clone(),
            bot_user_id,
            directory,
            sessions,
            a2a: a2a.clone(),
            llm: llm.clone(),
            oauth,
            meetings,
            meeting_sync: meeting_sync.clone(),
            board_cache: Default::default(),
            user_list_cache: Default::default(),
        });

        let scheduler = Arc::new(SchedulerEngine::new(&config.scheduler.timezone)?);
        if config.scheduler.enabled {
            register_builtin_jobs(&scheduler, &config, &a2a, &slack_client)?;
        }

        let meeting_sync_orchestrator = Arc::new(MeetingSyncOrchestrator::new(meeting_sync, connected_subjects));

        Ok(Arc::new(Self {
            slack,
            scheduler,
            meeting_sync_orchestrator,
            agent_notify_api_key: config.slack.agent_notify_api_key,
        }))
    }
}

/// Defaults chosen for the three built-in jobs (§4.9) — not specified by
/// name in config, so each is overridable per-id via
/// `SchedulerConfig::jobs`. Standup on weekday mornings, the stale-task
/// sweep on weekday afternoons, the leadership digest once a week.
fn register_builtin_jobs(
    scheduler: &SchedulerEngine,
    config: &MondayConfig,
    a2a: &Arc<A2aClient>,
    slack_client: &Arc<SlackClient>,
) -> anyhow::Result<()> {
    let channel = config.slack.notification_channel_id.clone();
    let scrum_master_url = config.agents.scrum_master_url.clone();

    let builtins: [(&str, &str, &str); 3] = [
        ("standup", "Daily standup summary", "0 0 9 * * MON-FRI"),
        ("stale-task-sweep", "Stale task sweep", "0 0 14 * * MON-FRI"),
        ("weekly-summary", "Weekly leadership summary", "0 0 17 * * FRI"),
    ];

    for (id, name, default_cron) in builtins {
        let execute = match id {
            "standup" => jobs::standup_job(a2a.clone(), slack_client.clone(), scrum_master_url.clone(), channel.clone()),
            "stale-task-sweep" => {
                jobs::stale_task_job(a2a.clone(), slack_client.clone(), scrum_master_url.clone(), channel.clone())
            }
            _ => jobs::weekly_summary_job(a2a.clone(), slack_client.clone(), scrum_master_url.clone(), channel.clone()),
        };

        let override_cfg = config.scheduler.jobs.get(id);
        let enabled = override_cfg.and_then(|o| o.enabled).unwrap_or(true);
        let cron_expression = override_cfg
            .and_then(|o| o.cron.clone())
            .unwrap_or_else(|| default_cron.to_string());

        scheduler.register(Job {
            id: id.to_string(),
            name: name.to_string(),
            cron_expression,
            enabled,
            execute,
        })?;
    }

    Ok(())
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(http::health::health_handler))
        .route("/slack/events", post(http::slack::events_handler))
        .route("/slack/interactions", post(http::slack::interactions_handler))
        .route("/api/agent-notify", post(http::agent_notify::agent_notify_handler))
        .route("/api/google/callback", get(http::oauth::callback_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
