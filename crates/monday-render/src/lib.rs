//! Rendering Library (C11): pure functions from domain data to
//! `{blocks, text}` platform payloads. No I/O, no platform SDK calls.

pub mod blocks;
pub mod markdown;

pub use blocks::{
    agent_response_blocks, connect_link_blocks, error_blocks, meeting_approved_blocks,
    meeting_dismissed_blocks, meeting_notes_preview_blocks, no_response_blocks,
    stale_task_blocks, standup_blocks, status_dashboard_blocks, task_outcome_blocks,
    task_preview_blocks, warning_blocks, weekly_summary_blocks, Rendered,
};
pub use markdown::to_mrkdwn;
