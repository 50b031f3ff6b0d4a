//! Mention-text normalization (§4.6 step 1): strip the bot's own mention,
//! replace every other `<@U…>` with a resolved display name.

use crate::client::SlackClient;
use crate::directory::UserDirectory;

/// Replace every `<@U…>` token with a display name, except the bot's own
/// id, which is stripped entirely. Tokens the directory can't resolve
/// fall back to the raw Slack `<@id>` form is avoided — `resolve` always
/// returns *something* (falling back to the raw id), so every token is
/// replaced.
pub async fn normalize(text: &str, bot_user_id: &str, client: &SlackClient, directory: &UserDirectory) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("<@") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('>') else {
            // Malformed / truncated mention token — keep the remainder verbatim.
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let raw_id = after[..end].trim_start_matches('!').to_string();
        let id = raw_id.split('|').next().unwrap_or(&raw_id).to_string();

        if id == bot_user_id {
            // Stripped entirely.
        } else {
            let name = directory.resolve(client, &id).await;
            out.push('@');
            out.push_str(&name);
        }

        rest = &after[end + 1..];
    }
    out.push_str(rest);

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn strips_bot_mention_and_keeps_rest() {
        let mut map = HashMap::new();
        map.insert("U2".to_string(), "Bob".to_string());
        let directory = UserDirectory::new(map);
        let client = SlackClient::new("xoxb-test".to_string());

        let out = normalize("<@U1> please ping <@U2>", "U1", &client, &directory).await;
        assert_eq!(out, "please ping @Bob");
    }

    #[tokio::test]
    async fn empty_after_stripping_bot_mention_yields_empty_string() {
        let directory = UserDirectory::new(HashMap::new());
        let client = SlackClient::new("xoxb-test".to_string());

        let out = normalize("<@U1>", "U1", &client, &directory).await;
        assert_eq!(out, "");
    }
}
