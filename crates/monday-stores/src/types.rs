use serde::{Deserialize, Serialize};

/// OAuth Token Record (§3). Invariant: if the record exists, `refresh_token`
/// is non-empty (enforced by `TokenStore::upsert`'s caller — the OAuth
/// broker — which fails `MissingTokens` before ever calling upsert).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub subject_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expiry_epoch_ms: i64,
    pub scope: String,
}

/// Meeting Record (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub event_id: String,
    pub title: String,
    pub processed_at: String,
    pub status: MeetingStatus,
    pub task_ids: Option<Vec<String>>,
}

/// `pending → approved` or `pending → dismissed`; both terminal (§4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    Pending,
    Approved,
    Dismissed,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Pending => "pending",
            MeetingStatus::Approved => "approved",
            MeetingStatus::Dismissed => "dismissed",
        }
    }
}

impl std::str::FromStr for MeetingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MeetingStatus::Pending),
            "approved" => Ok(MeetingStatus::Approved),
            "dismissed" => Ok(MeetingStatus::Dismissed),
            other => Err(format!("unknown meeting status: {other}")),
        }
    }
}
