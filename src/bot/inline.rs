//! Inline query side of the reports special chat assignment.
//!
//! The choose-chat button prefills the owner's input with an assignment
//! query; once they pick a target chat the query arrives here, and the
//! answer is a single article that posts the confirmation command into
//! that chat.

use anyhow::{Context, Result};
use teloxide::prelude::*;
use teloxide::types::{
    InlineQueryResult, InlineQueryResultArticle, InputMessageContent, InputMessageContentText,
};
use tracing::debug;

use super::fsm::engine::Deps;
use crate::cache::pending::derive_secret_token;

const QUERY_PREFIX: &str = "set_reports_special_chat:";

/// The query text a choose-chat button prefills for a given public token.
pub fn assignment_query(public_token: &str) -> String {
    format!("{}{}", QUERY_PREFIX, public_token)
}

pub async fn handle_inline_query(bot: Bot, deps: std::sync::Arc<Deps>, q: InlineQuery) -> Result<()> {
    let Some(public_token) = q.query.trim().strip_prefix(QUERY_PREFIX) else {
        return Ok(());
    };

    let command = match deps.pending.resolve(q.from.id.0, public_token).await? {
        Some(pending) => {
            let secret =
                derive_secret_token(pending.origin_chat_id, q.from.id.0, &pending.entropy);
            if secret != pending.secret_token {
                debug!(
                    "Pending assignment for user {} failed the secret recomputation",
                    q.from.id
                );
                None
            } else {
                Some(format!(
                    "/set_reports_special_chat {}:{}",
                    public_token, secret
                ))
            }
        }
        None => None,
    };

    let article = match command {
        Some(command) => InlineQueryResultArticle::new(
            uuid::Uuid::new_v4().to_string(),
            "🔧 Set this chat as the chat for reports",
            InputMessageContent::Text(InputMessageContentText::new(command)),
        )
        .description("Sends the confirmation command into the chosen chat"),
        None => InlineQueryResultArticle::new(
            uuid::Uuid::new_v4().to_string(),
            "⚠️ No pending reports special chat assignment",
            InputMessageContent::Text(InputMessageContentText::new(
                "⚠️ The assignment has expired. Open the settings window again.",
            )),
        ),
    };

    bot.answer_inline_query(q.id.clone(), vec![InlineQueryResult::Article(article)])
        .is_personal(true)
        .await
        .context("failed to answer assignment inline query")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_query_roundtrip() {
        let query = assignment_query("abcd1234");
        assert_eq!(query, "set_reports_special_chat:abcd1234");
        assert_eq!(query.strip_prefix(QUERY_PREFIX), Some("abcd1234"));
    }
}
