use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::{Document, DocumentRepository, Entity, RepositoryError};
use crate::validation::{require_non_empty, require_non_empty_opt, ValidationError};
use crate::{DocumentId, UserId};

pub const DEFAULT_SESSION_TITLE: &str = "New chat";

/// A chat session owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSessionFields {
    pub user_id: UserId,
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSessionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Entity for ChatSessionFields {
    const COLLECTION: &'static str = "chat_sessions";
    type Patch = ChatSessionPatch;

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("title", &self.title)
    }

    fn validate_patch(patch: &ChatSessionPatch) -> Result<(), ValidationError> {
        require_non_empty_opt("title", patch.title.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// A single message within a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageFields {
    pub session_id: DocumentId,
    pub sender_id: UserId,
    pub role: MessageRole,
    pub content: String,
    /// Stored as epoch milliseconds so it orders numerically
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessagePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Entity for ChatMessageFields {
    const COLLECTION: &'static str = "chat_messages";
    type Patch = ChatMessagePatch;

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("content", &self.content)
    }

    fn validate_patch(patch: &ChatMessagePatch) -> Result<(), ValidationError> {
        require_non_empty_opt("content", patch.content.as_deref())
    }
}

pub type ChatSession = Document<ChatSessionFields>;
pub type ChatMessage = Document<ChatMessageFields>;
pub type ChatSessionRepository = DocumentRepository<ChatSessionFields>;
pub type ChatMessageRepository = DocumentRepository<ChatMessageFields>;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Chat session not found")]
    NotFound,
    #[error("Access denied to chat session")]
    AccessDenied,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ChatError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(e) => Self::Validation(e),
            other => Self::Repository(other),
        }
    }
}

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Open a new session; a missing title becomes [`DEFAULT_SESSION_TITLE`]
    async fn start_session(
        &self,
        user_id: UserId,
        title: Option<String>,
    ) -> Result<ChatSession, ChatError>;

    /// Sessions owned by the user, newest first
    async fn list_sessions(&self, user_id: UserId) -> Result<Vec<ChatSession>, ChatError>;

    async fn rename_session(
        &self,
        session_id: DocumentId,
        user_id: UserId,
        title: String,
    ) -> Result<ChatSession, ChatError>;

    /// Append a message to a session the user owns
    async fn post_message(
        &self,
        session_id: DocumentId,
        user_id: UserId,
        role: MessageRole,
        content: String,
    ) -> Result<ChatMessage, ChatError>;

    /// A page of the session's messages, oldest first
    async fn list_messages(
        &self,
        session_id: DocumentId,
        user_id: UserId,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<ChatMessage>, ChatError>;

    /// Remove a session and its messages
    async fn delete_session(&self, session_id: DocumentId, user_id: UserId)
        -> Result<(), ChatError>;
}
