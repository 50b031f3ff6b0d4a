//! Board list lookup (§4.7 create-task step 4). There is no dedicated
//! board-listing API in this system — the product-owner agent is asked a
//! one-shot natural-language question and the reply's JSON array is
//! parsed leniently; a malformed or empty reply just yields an empty
//! list rather than failing the whole preview.

use monday_a2a::{extract_text, A2aClient};
use monday_llm::strip_code_fences;

use crate::types::BoardSummary;

const BOARD_LIST_PROMPT: &str =
    "List the boards you manage as a JSON array of {\"id\": string, \"name\": string}. Respond with JSON only.";

pub async fn fetch_boards(a2a: &A2aClient, product_owner_url: &str) -> Vec<BoardSummary> {
    let response = a2a.send_message(product_owner_url, BOARD_LIST_PROMPT, None).await;
    let Some(task) = response.result else {
        return Vec::new();
    };
    let text = extract_text(&task);
    serde_json::from_str(strip_code_fences(&text)).unwrap_or_default()
}
