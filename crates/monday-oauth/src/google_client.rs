//! Thin reqwest wrapper around Google's OAuth token endpoint, Calendar API
//! v3, and Drive API v3 — the external collaborator the OAuth broker talks
//! to. Only the request/response shapes the gateway actually needs are
//! modeled; everything else about the Google APIs is out of scope.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::error::{OAuthError, Result};

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

#[derive(Debug, Clone)]
pub struct TokenExchange {
    pub access_token: String,
    pub refresh_token: String,
    pub expiry_epoch_ms: i64,
    pub scope: String,
}

#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub access_token: String,
    pub expiry_epoch_ms: i64,
}

#[derive(Deserialize)]
struct RawTokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
    #[serde(default)]
    scope: Option<String>,
}

/// Build the authorization-code consent URL the gateway surfaces when a
/// subject hasn't connected yet (calendar + drive read/write, §4.5).
pub fn build_consent_url(client_id: &str, redirect_uri: &str, state: &str) -> String {
    let scope = format!("{CALENDAR_SCOPE} {DRIVE_SCOPE}");
    format!(
        "{AUTH_ENDPOINT}?client_id={}&redirect_uri={}&response_type=code&access_type=offline&prompt=consent&scope={}&state={}",
        urlencode(client_id),
        urlencode(redirect_uri),
        urlencode(&scope),
        urlencode(state),
    )
}

fn urlencode(s: &str) -> String {
    utf8_percent_encode(s, NON_ALPHANUMERIC).to_string()
}

pub async fn exchange_code(
    http: &reqwest::Client,
    client_id: &str,
    client_secret: &str,
    redirect_uri: &str,
    code: &str,
) -> Result<TokenExchange> {
    let resp = http
        .post(TOKEN_ENDPOINT)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
            ("code", code),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| OAuthError::Transport(e.to_string()))?;

    if !resp.status().is_success() {
        let text = resp.text().await.unwrap_or_default();
        warn!(body = %text, "google token exchange failed");
        return Err(OAuthError::MissingTokens);
    }

    let raw: RawTokenResponse = resp
        .json()
        .await
        .map_err(|e| OAuthError::Transport(e.to_string()))?;

    let refresh_token = raw.refresh_token.ok_or(OAuthError::MissingTokens)?;

    Ok(TokenExchange {
        access_token: raw.access_token,
        refresh_token,
        expiry_epoch_ms: now_ms() + raw.expires_in * 1000,
        scope: raw.scope.unwrap_or_else(|| format!("{CALENDAR_SCOPE} {DRIVE_SCOPE}")),
    })
}

pub async fn refresh_token(
    http: &reqwest::Client,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<RefreshedToken> {
    let resp = http
        .post(TOKEN_ENDPOINT)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .await
        .map_err(|e| OAuthError::Transport(e.to_string()))?;

    if !resp.status().is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(OAuthError::Transport(format!(
            "refresh failed: {text}"
        )));
    }

    let raw: RawTokenResponse = resp
        .json()
        .await
        .map_err(|e| OAuthError::Transport(e.to_string()))?;

    Ok(RefreshedToken {
        access_token: raw.access_token,
        expiry_epoch_ms: now_ms() + raw.expires_in * 1000,
    })
}

pub async fn revoke(http: &reqwest::Client, access_token: &str) {
    let _ = http
        .post("https://oauth2.googleapis.com/revoke")
        .form(&[("token", access_token)])
        .send()
        .await;
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A pre-authenticated client returned by `OAuthBroker::get_client` — bare
/// enough for the calendar/drive intent handlers to drive Google's APIs
/// with a bounded tool-use loop (§4.7).
pub struct GoogleClient {
    pub access_token: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    #[serde(rename = "conferenceData")]
    pub conference_data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EventTime {
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
}

impl GoogleClient {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            http: reqwest::Client::new(),
        }
    }

    pub async fn list_events(
        &self,
        time_min_rfc3339: &str,
        time_max_rfc3339: &str,
    ) -> Result<Vec<CalendarEvent>> {
        #[derive(Deserialize)]
        struct ListResponse {
            #[serde(default)]
            items: Vec<CalendarEvent>,
        }

        let resp = self
            .http
            .get("https://www.googleapis.com/calendar/v3/calendars/primary/events")
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", time_min_rfc3339),
                ("timeMax", time_max_rfc3339),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OAuthError::Transport(format!(
                "calendar list failed: HTTP {}",
                resp.status()
            )));
        }

        let parsed: ListResponse = resp
            .json()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;
        Ok(parsed.items)
    }

    /// Find files whose name starts with `prefix` (used to locate a
    /// meeting's transcript export, §4.7 meeting-sync, §9 open question).
    pub async fn find_files_by_name_prefix(&self, prefix: &str) -> Result<Vec<DriveFile>> {
        #[derive(Deserialize)]
        struct ListResponse {
            #[serde(default)]
            files: Vec<DriveFile>,
        }

        let query = format!("name contains '{}'", prefix.replace('\'', "\\'"));
        let resp = self
            .http
            .get("https://www.googleapis.com/drive/v3/files")
            .bearer_auth(&self.access_token)
            .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OAuthError::Transport(format!(
                "drive search failed: HTTP {}",
                resp.status()
            )));
        }

        let parsed: ListResponse = resp
            .json()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;
        Ok(parsed.files)
    }

    pub async fn export_doc_text(&self, file_id: &str) -> Result<String> {
        let resp = self
            .http
            .get(format!(
                "https://www.googleapis.com/drive/v3/files/{file_id}/export"
            ))
            .bearer_auth(&self.access_token)
            .query(&[("mimeType", "text/plain")])
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OAuthError::Transport(format!(
                "drive export failed: HTTP {}",
                resp.status()
            )));
        }

        resp.text()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))
    }

    /// Create a calendar event — one of the ≤5 tools exposed to the
    /// calendar intent's bounded tool-use loop (§4.7).
    pub async fn create_event(&self, summary: &str, start_rfc3339: &str, end_rfc3339: &str) -> Result<CalendarEvent> {
        let body = json!({
            "summary": summary,
            "start": {"dateTime": start_rfc3339},
            "end": {"dateTime": end_rfc3339},
        });
        let resp = self
            .http
            .post("https://www.googleapis.com/calendar/v3/calendars/primary/events")
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OAuthError::Transport(format!(
                "calendar create failed: HTTP {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))
    }

    /// Fetch a single event — the "read" tool in the calendar bounded
    /// tool-use loop (§4.7).
    pub async fn get_event(&self, event_id: &str) -> Result<CalendarEvent> {
        let resp = self
            .http
            .get(format!(
                "https://www.googleapis.com/calendar/v3/calendars/primary/events/{event_id}"
            ))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OAuthError::Transport(format!(
                "calendar get failed: HTTP {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))
    }

    /// Patch an event's summary and/or time window — the "update" tool.
    pub async fn update_event(
        &self,
        event_id: &str,
        summary: Option<&str>,
        start_rfc3339: Option<&str>,
        end_rfc3339: Option<&str>,
    ) -> Result<CalendarEvent> {
        let mut body = json!({});
        if let Some(summary) = summary {
            body["summary"] = json!(summary);
        }
        if let Some(start) = start_rfc3339 {
            body["start"] = json!({"dateTime": start});
        }
        if let Some(end) = end_rfc3339 {
            body["end"] = json!({"dateTime": end});
        }

        let resp = self
            .http
            .patch(format!(
                "https://www.googleapis.com/calendar/v3/calendars/primary/events/{event_id}"
            ))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OAuthError::Transport(format!(
                "calendar update failed: HTTP {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))
    }

    /// Delete an event — the "delete" tool.
    pub async fn delete_event(&self, event_id: &str) -> Result<()> {
        let resp = self
            .http
            .delete(format!(
                "https://www.googleapis.com/calendar/v3/calendars/primary/events/{event_id}"
            ))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;

        if !resp.status().is_success() && resp.status().as_u16() != 410 {
            return Err(OAuthError::Transport(format!(
                "calendar delete failed: HTTP {}",
                resp.status()
            )));
        }
        Ok(())
    }

    /// List files matching a free-text query — the drive loop's "list" tool.
    pub async fn list_files(&self, query: &str) -> Result<Vec<DriveFile>> {
        #[derive(Deserialize)]
        struct ListResponse {
            #[serde(default)]
            files: Vec<DriveFile>,
        }

        let resp = self
            .http
            .get("https://www.googleapis.com/drive/v3/files")
            .bearer_auth(&self.access_token)
            .query(&[("q", query), ("fields", "files(id,name)")])
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OAuthError::Transport(format!(
                "drive list failed: HTTP {}",
                resp.status()
            )));
        }

        let parsed: ListResponse = resp
            .json()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;
        Ok(parsed.files)
    }

    /// Create a plain-text file — the drive loop's "create" tool.
    pub async fn create_file(&self, name: &str, content: &str) -> Result<DriveFile> {
        let resp = self
            .http
            .post("https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart")
            .bearer_auth(&self.access_token)
            .multipart(
                reqwest::multipart::Form::new()
                    .part(
                        "metadata",
                        reqwest::multipart::Part::text(json!({ "name": name }).to_string())
                            .mime_str("application/json")
                            .map_err(|e| OAuthError::Transport(e.to_string()))?,
                    )
                    .part(
                        "media",
                        reqwest::multipart::Part::text(content.to_string())
                            .mime_str("text/plain")
                            .map_err(|e| OAuthError::Transport(e.to_string()))?,
                    ),
            )
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OAuthError::Transport(format!(
                "drive create failed: HTTP {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))
    }

    /// Rename a file — the drive loop's "update" tool.
    pub async fn update_file(&self, file_id: &str, new_name: &str) -> Result<DriveFile> {
        let resp = self
            .http
            .patch(format!("https://www.googleapis.com/drive/v3/files/{file_id}"))
            .bearer_auth(&self.access_token)
            .json(&json!({ "name": new_name }))
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OAuthError::Transport(format!(
                "drive update failed: HTTP {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))
    }

    /// Delete a file — the drive loop's "delete" tool.
    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        let resp = self
            .http
            .delete(format!("https://www.googleapis.com/drive/v3/files/{file_id}"))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;

        if !resp.status().is_success() && resp.status().as_u16() != 404 {
            return Err(OAuthError::Transport(format!(
                "drive delete failed: HTTP {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}
