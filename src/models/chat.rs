use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/ai/chatbot`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub context: Option<Value>,
}

/// Payload forwarded to the AI service's chatbot endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatbotForward {
    pub user_id: i64,
    pub message: String,
    pub context: Option<Value>,
}

/// Reply produced locally when the AI service cannot answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackChatReply {
    pub response: String,
    pub source: String,
}

/// A stored chatbot exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub message: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// An exchange moved to the archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedConversation {
    pub id: i64,
    pub message: String,
    pub response: String,
    pub original_timestamp: Option<DateTime<Utc>>,
    pub archived_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Serialize)]
pub struct ArchiveResult {
    pub archived: u64,
}

#[derive(Debug, Serialize)]
pub struct ArchiveListing {
    pub archived: Vec<ArchivedConversation>,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub text: Option<String>,
}
