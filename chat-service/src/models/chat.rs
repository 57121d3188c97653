use serde::{Deserialize, Serialize};
use validator::Validate;

/// One earlier exchange: what the user asked and what the model answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user: String,
    pub model: String,
}

impl ConversationTurn {
    pub fn new(user: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            model: model.into(),
        }
    }
}

/// Body of `POST /api/chat/generate`.
///
/// The caller owns the conversation; `history` is oldest first and may be
/// empty on the first turn.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
    #[validate(length(
        min = 1,
        max = 500,
        message = "new_message must be between 1 and 500 characters"
    ))]
    pub new_message: String,
}

impl ChatRequest {
    pub fn new(history: Vec<ConversationTurn>, new_message: impl Into<String>) -> Self {
        Self {
            history,
            new_message: new_message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}
