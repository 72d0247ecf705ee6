//! Conversation turn record

use serde::{Deserialize, Serialize};

/// One completed (question, answer) exchange within a chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// What the user asked
    pub question: String,
    /// What the assistant answered
    pub answer: String,
    /// When the question was asked
    pub asked_at: chrono::DateTime<chrono::Utc>,
}

impl ConversationTurn {
    /// Create a new turn stamped with the current time
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            asked_at: chrono::Utc::now(),
        }
    }
}
