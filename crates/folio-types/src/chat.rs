use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::DocumentData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the conversational history sent with every question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Some(Utc::now()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Some(Utc::now()),
        }
    }
}

/// Where the backend finds the documents to answer from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatContext {
    /// Documents live in a server-side session
    Session { session_id: String },
    /// Documents travel with every request
    Inline {
        documents: Vec<DocumentData>,
        description: String,
    },
}

/// Body of a streaming chat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    pub model: String,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
    #[serde(flatten)]
    pub context: ChatContext,
}

impl ChatRequest {
    pub fn for_session(
        session_id: impl Into<String>,
        question: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            model: model.into(),
            chat_history: Vec::new(),
            context: ChatContext::Session {
                session_id: session_id.into(),
            },
        }
    }

    pub fn inline(
        documents: Vec<DocumentData>,
        description: impl Into<String>,
        question: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            model: model.into(),
            chat_history: Vec::new(),
            context: ChatContext::Inline {
                documents,
                description: description.into(),
            },
        }
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.chat_history = history;
        self
    }
}
