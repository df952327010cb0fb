pub mod ports;
pub mod service;

pub use ports::{
    ChatError, ChatMessage, ChatMessageFields, ChatMessagePatch, ChatMessageRepository,
    ChatService, ChatSession, ChatSessionFields, ChatSessionPatch, ChatSessionRepository,
    MessageRole, DEFAULT_SESSION_TITLE,
};
pub use service::ChatServiceImpl;
