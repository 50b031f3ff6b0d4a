use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_TIMEZONE: &str = "Asia/Jerusalem";
pub const A2A_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DIRECTORY_CACHE_TTL_SECS: u64 = 300;

/// Top-level config (`monday.toml` + `MONDAY_*` env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MondayConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    pub slack: SlackConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

/// Platform credentials. Signature verification and event-dispatch
/// transport are external collaborators (spec §1); the gateway only needs
/// the values required to call back into the platform and to authenticate
/// the inbound webhook surface it does own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub bot_token: String,
    pub signing_secret: String,
    #[serde(default)]
    pub app_token: Option<String>,
    /// Channel id used by scheduled jobs and meeting-sync previews.
    pub notification_channel_id: String,
    /// Static `<@U…>` id → display-name fallback used when the workspace
    /// user-list call fails with `missing_scope` (§4.6 step 1).
    #[serde(default)]
    pub static_user_map: HashMap<String, String>,
    /// Shared secret required on the `X-API-Key` header for
    /// `POST /api/agent-notify`, same header outbound A2A calls use.
    pub agent_notify_api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default = "default_product_owner_url")]
    pub product_owner_url: String,
    #[serde(default = "default_developer_url")]
    pub developer_url: String,
    #[serde(default = "default_reviewer_url")]
    pub reviewer_url: String,
    #[serde(default = "default_scrum_master_url")]
    pub scrum_master_url: String,
    /// Shared-secret sent as `X-API-Key` on every outbound A2A call, when set.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            product_owner_url: default_product_owner_url(),
            developer_url: default_developer_url(),
            reviewer_url: default_reviewer_url(),
            scrum_master_url: default_scrum_master_url(),
            api_key: None,
        }
    }
}

impl AgentsConfig {
    pub fn url_for(&self, key: crate::types::AgentKey) -> &str {
        match key {
            crate::types::AgentKey::ProductOwner => &self.product_owner_url,
            crate::types::AgentKey::Developer => &self.developer_url,
            crate::types::AgentKey::Reviewer => &self.reviewer_url,
            crate::types::AgentKey::ScrumMaster => &self.scrum_master_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_key: String,
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

/// OAuth broker configuration (C5). Absent entirely when the operator
/// hasn't wired up Google integration — `meeting-sync`/`calendar`/`drive`
/// intents then surface a connect-link instead of erroring.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OAuthConfig {
    pub google: Option<GoogleOAuthConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Signing secret for the HMAC-bound `state` parameter (§4.5).
    pub signing_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub jobs: HashMap<String, ScheduledJobOverride>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timezone: default_timezone(),
            jobs: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJobOverride {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub cron: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_token_store_path")]
    pub token_store_path: String,
    #[serde(default = "default_meeting_store_path")]
    pub meeting_store_path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            token_store_path: default_token_store_path(),
            meeting_store_path: default_meeting_store_path(),
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_port() -> u16 {
    8787
}
fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_product_owner_url() -> String {
    "http://localhost:10001".to_string()
}
fn default_developer_url() -> String {
    "http://localhost:10002".to_string()
}
fn default_reviewer_url() -> String {
    "http://localhost:10003".to_string()
}
fn default_scrum_master_url() -> String {
    "http://localhost:10004".to_string()
}
fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}
fn default_model() -> String {
    "claude-sonnet-4-6".to_string()
}
fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}
fn default_token_store_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.monday-agents/tokens.db", home)
}
fn default_meeting_store_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.monday-agents/meetings.db", home)
}

impl MondayConfig {
    /// Load config from a TOML file with `MONDAY_*` env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. `./monday.toml`
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(|| "monday.toml".to_string());

        let config: MondayConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("MONDAY_").split("__"))
            .extract()
            .map_err(|e| crate::error::MondayError::Config(e.to_string()))?;

        Ok(config)
    }
}
