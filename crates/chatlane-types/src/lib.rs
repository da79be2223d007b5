//! Core types and structures for chatlane
//!
//! This crate provides the data model shared by every chatlane crate: messages,
//! sessions and the process-wide chat state, plus the fixed strings and limits
//! the client relies on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Id of the bootstrap session, which always exists and cannot be deleted
pub const DEFAULT_SESSION_ID: &str = "default";

/// Title given to every freshly created session
pub const NEW_CHAT_TITLE: &str = "New Chat";

/// Title used when a session is renamed to a blank string
pub const UNTITLED_TITLE: &str = "Untitled";

/// Seed bot message every session starts with
pub const GREETING: &str = "Hello! I'm your AI assistant. What can I help you with? 👋";

/// Reply used when the completion service answers without usable content
pub const FALLBACK_REPLY: &str = "I couldn't process your request.";

/// Reply appended when the completion request fails
pub const ERROR_REPLY: &str = "I encountered an error. Please try again later.";

/// Maximum length of a user message, in characters
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// Number of characters kept when a title is derived from a message
pub const TITLE_MAX_CHARS: usize = 20;

/// Suffix appended to a derived title that was cut short
pub const TITLE_ELLIPSIS: &str = "...";

/// Session id type
pub type SessionId = String;

/// Session-local message id
pub type MessageId = u64;

// ============================================================================
// Message Types
// ============================================================================

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// Category of a failed completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    Transport,
    UpstreamStatus,
    Parse,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Transport => "transport",
            ErrorKind::UpstreamStatus => "upstream_status",
            ErrorKind::Parse => "parse",
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A single chat message. Messages are never modified once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,
    #[serde(
        rename = "errorKind",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_kind: Option<ErrorKind>,
}

impl Message {
    pub fn new(id: MessageId, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender,
            timestamp: Utc::now(),
            error: false,
            error_kind: None,
        }
    }

    /// Error-flagged bot message carrying the fixed apology
    pub fn failure(id: MessageId, kind: ErrorKind) -> Self {
        Self {
            error: true,
            error_kind: Some(kind),
            ..Self::new(id, Sender::Bot, ERROR_REPLY)
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

// ============================================================================
// Session Types
// ============================================================================

/// One conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub title: String,
    pub messages: Vec<Message>,
    /// Set once the title was chosen explicitly; blocks title derivation
    #[serde(default, skip_serializing_if = "is_false")]
    pub renamed: bool,
}

impl Session {
    /// Create a session holding only the seed greeting
    pub fn new(id: impl Into<SessionId>) -> Self {
        Self {
            id: id.into(),
            title: NEW_CHAT_TITLE.to_string(),
            messages: vec![Message::new(1, Sender::Bot, GREETING)],
            renamed: false,
        }
    }

    /// Id the next appended message receives
    pub fn next_message_id(&self) -> MessageId {
        self.messages.last().map(|m| m.id + 1).unwrap_or(1)
    }

    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(Message::is_user)
    }

    /// Whether the title is still the one assigned at creation
    pub fn has_auto_title(&self) -> bool {
        !self.renamed && self.title == NEW_CHAT_TITLE
    }
}

/// Derive a sidebar title from the first user message
pub fn derive_title(text: &str) -> String {
    if text.chars().count() <= TITLE_MAX_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}{}", head, TITLE_ELLIPSIS)
    }
}

// ============================================================================
// Chat State
// ============================================================================

/// Process-wide chat state: the ordered sessions and the active pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatState {
    pub sessions: Vec<Session>,
    pub active_session_id: SessionId,
}

impl ChatState {
    /// State used on first load and whenever persisted state is unusable
    pub fn bootstrap() -> Self {
        Self {
            sessions: vec![Session::new(DEFAULT_SESSION_ID)],
            active_session_id: DEFAULT_SESSION_ID.to_string(),
        }
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn session_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.session(id).is_some()
    }

    /// The active session, if the pointer resolves
    pub fn active_session(&self) -> Option<&Session> {
        self.session(&self.active_session_id)
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::bootstrap()
    }
}
