use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use super::ports::{
    ChatError, ChatMessage, ChatMessageFields, ChatService, ChatSession, ChatSessionFields,
    ChatSessionPatch, MessageRole, DEFAULT_SESSION_TITLE,
};
use crate::repository::{Filter, FindOptions, Repository, SortDirection};
use crate::{DocumentId, UserId};

pub struct ChatServiceImpl {
    session_repo: Arc<dyn Repository<ChatSessionFields>>,
    message_repo: Arc<dyn Repository<ChatMessageFields>>,
}

impl ChatServiceImpl {
    pub fn new(
        session_repo: Arc<dyn Repository<ChatSessionFields>>,
        message_repo: Arc<dyn Repository<ChatMessageFields>>,
    ) -> Self {
        Self {
            session_repo,
            message_repo,
        }
    }

    /// Load a session and check the caller owns it
    async fn owned_session(
        &self,
        session_id: DocumentId,
        user_id: UserId,
    ) -> Result<ChatSession, ChatError> {
        let session = self
            .session_repo
            .find_by_id(session_id)
            .await?
            .ok_or(ChatError::NotFound)?;

        if session.fields.user_id != user_id {
            tracing::warn!(
                "Chat session access denied: session_id={}, user_id={}",
                session_id,
                user_id
            );
            return Err(ChatError::AccessDenied);
        }

        Ok(session)
    }

    fn messages_of(session_id: DocumentId) -> Filter {
        Filter::new().eq("session_id", session_id.to_string())
    }
}

#[async_trait]
impl ChatService for ChatServiceImpl {
    async fn start_session(
        &self,
        user_id: UserId,
        title: Option<String>,
    ) -> Result<ChatSession, ChatError> {
        tracing::info!("Starting chat session for user_id={}", user_id);

        let session = self
            .session_repo
            .create(ChatSessionFields {
                user_id,
                title: title.unwrap_or_else(|| DEFAULT_SESSION_TITLE.to_string()),
                started_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            "Chat session started: session_id={}, user_id={}",
            session.id,
            user_id
        );

        Ok(session)
    }

    async fn list_sessions(&self, user_id: UserId) -> Result<Vec<ChatSession>, ChatError> {
        tracing::debug!("Listing chat sessions for user_id={}", user_id);

        let filter = Filter::new().eq("user_id", user_id.to_string());
        let options = FindOptions::new().sort_by("started_at", SortDirection::Desc);
        Ok(self.session_repo.find(&filter, &options).await?)
    }

    async fn rename_session(
        &self,
        session_id: DocumentId,
        user_id: UserId,
        title: String,
    ) -> Result<ChatSession, ChatError> {
        self.owned_session(session_id, user_id).await?;

        self.session_repo
            .update(session_id, ChatSessionPatch { title: Some(title) })
            .await?
            .ok_or(ChatError::NotFound)
    }

    async fn post_message(
        &self,
        session_id: DocumentId,
        user_id: UserId,
        role: MessageRole,
        content: String,
    ) -> Result<ChatMessage, ChatError> {
        self.owned_session(session_id, user_id).await?;

        tracing::debug!(
            "Posting {:?} message to session_id={} ({} chars)",
            role,
            session_id,
            content.len()
        );

        let message = self
            .message_repo
            .create(ChatMessageFields {
                session_id,
                sender_id: user_id,
                role,
                content,
                sent_at: Utc::now(),
            })
            .await?;

        Ok(message)
    }

    async fn list_messages(
        &self,
        session_id: DocumentId,
        user_id: UserId,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        self.owned_session(session_id, user_id).await?;

        let options = FindOptions::new()
            .sort_by("sent_at", SortDirection::Asc)
            .skip(skip)
            .limit(limit);
        Ok(self
            .message_repo
            .find(&Self::messages_of(session_id), &options)
            .await?)
    }

    async fn delete_session(
        &self,
        session_id: DocumentId,
        user_id: UserId,
    ) -> Result<(), ChatError> {
        self.owned_session(session_id, user_id).await?;

        tracing::info!(
            "Deleting chat session: session_id={}, user_id={}",
            session_id,
            user_id
        );

        let messages = self
            .message_repo
            .find(&Self::messages_of(session_id), &FindOptions::new())
            .await?;
        for message in &messages {
            self.message_repo.delete(message.id).await?;
        }
        self.session_repo.delete(session_id).await?;

        tracing::info!(
            "Chat session deleted: session_id={}, messages_removed={}",
            session_id,
            messages.len()
        );

        Ok(())
    }
}
