use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    db::ChatStore,
    error::{AppError, AppResult},
    models::{
        ArchivedConversation, ChatRequest, ChatbotForward, Conversation, FallbackChatReply,
    },
    services::ai::AiClient,
};

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
pub const DEFAULT_ARCHIVE_LIMIT: i64 = 100;

/// Reply served for one chat turn
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatOutcome {
    Primary(Value),
    Fallback(FallbackChatReply),
}

/// Canned reply chosen by keyword when the AI service cannot answer
pub fn fallback_response(message: &str) -> String {
    let lower = message.to_lowercase();

    if lower.contains("hello") || lower.contains("hi") {
        return "Hello! I'm your AI learning assistant. How can I help you today?".to_string();
    }

    if lower.contains("help") {
        return "I can help you with:\n\
                - Course recommendations\n\
                - Learning tips\n\
                - Answering questions about your studies\n\
                - Explaining concepts\n\n\
                What would you like to know?"
            .to_string();
    }

    if lower.contains("course") || lower.contains("learn") {
        return "I can recommend courses based on your interests and progress. \
                What subject are you interested in learning?"
            .to_string();
    }

    if lower.contains("thank") {
        return "You're welcome! Feel free to ask if you need anything else.".to_string();
    }

    format!(
        "I understand you're asking about: '{}'. While I'm processing your question, \
         could you provide more details? The AI service will provide more comprehensive \
         answers once it's fully connected.",
        message
    )
}

/// Runs one chat turn and records the exchange
///
/// Any AI failure yields a keyword fallback; the exchange is stored either way.
pub async fn chat<S>(
    ai: &dyn AiClient,
    store: &S,
    user_id: i64,
    request: ChatRequest,
) -> AppResult<ChatOutcome>
where
    S: ChatStore + ?Sized,
{
    let message = request.message;
    if message.trim().is_empty() {
        return Err(AppError::InvalidInput("Message is required".to_string()));
    }

    let forward = ChatbotForward {
        user_id,
        message: message.clone(),
        context: request.context.clone(),
    };

    match ai.chatbot(forward).await {
        Ok(reply) => {
            let response_text = reply
                .get("response")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let context = request.context.unwrap_or_else(|| json!({}));

            store
                .save_conversation(user_id, &message, response_text, &context)
                .await?;

            Ok(ChatOutcome::Primary(reply))
        }
        Err(e) => {
            tracing::warn!(user_id, error = %e, "AI chatbot unavailable, using fallback reply");

            let response = fallback_response(&message);
            store
                .save_conversation(user_id, &message, &response, &json!({ "fallback": true }))
                .await?;

            Ok(ChatOutcome::Fallback(FallbackChatReply {
                response,
                source: "fallback".to_string(),
            }))
        }
    }
}

/// Positive limit or the default
fn effective_limit(limit: Option<i64>, default: i64) -> i64 {
    match limit {
        Some(n) if n > 0 => n,
        _ => default,
    }
}

/// Recent conversations, oldest first
pub async fn history<S: ChatStore + ?Sized>(
    store: &S,
    user_id: i64,
    limit: Option<i64>,
) -> AppResult<Vec<Conversation>> {
    let mut conversations = store
        .recent_conversations(user_id, effective_limit(limit, DEFAULT_HISTORY_LIMIT))
        .await?;
    conversations.reverse();
    Ok(conversations)
}

/// Moves the user's conversations to the archive
pub async fn archive<S: ChatStore + ?Sized>(store: &S, user_id: i64) -> AppResult<u64> {
    let archived = store.archive_conversations(user_id).await?;
    tracing::info!(user_id, archived, "Chat history archived");
    Ok(archived)
}

/// Recently archived conversations, oldest first
pub async fn archived<S: ChatStore + ?Sized>(
    store: &S,
    user_id: i64,
    limit: Option<i64>,
) -> AppResult<Vec<ArchivedConversation>> {
    let mut rows = store
        .recent_archived(user_id, effective_limit(limit, DEFAULT_ARCHIVE_LIMIT))
        .await?;
    rows.reverse();
    Ok(rows)
}
