//! Session store: owns the ordered sessions and the active-session pointer.
//!
//! Every successful mutation is written through to the durable store before
//! the call returns.

use chatlane_types::{
    derive_title, ChatState, ErrorKind, Message, MessageId, Sender, Session, SessionId,
    DEFAULT_SESSION_ID, UNTITLED_TITLE,
};
use chrono::Utc;
use thiserror::Error;

use crate::codec;
use crate::storage::DurableStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
    #[error("the default session cannot be deleted")]
    DefaultSessionProtected,
}

pub struct SessionStore {
    state: ChatState,
    storage: Box<dyn DurableStore>,
}

impl SessionStore {
    /// Restore the persisted state from `storage` (or bootstrap) and take
    /// ownership of it as the sole writer.
    pub fn open(storage: Box<dyn DurableStore>) -> Self {
        let state = codec::load(storage.as_ref());
        log::debug!(
            "Opened session store with {} session(s), active: {}",
            state.sessions.len(),
            state.active_session_id
        );
        let mut store = Self { state, storage };
        store.persist();
        store
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Immutable copy of the current state for rendering
    pub fn snapshot(&self) -> ChatState {
        self.state.clone()
    }

    pub fn active_session_id(&self) -> &str {
        &self.state.active_session_id
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.state.session(id)
    }

    pub fn create_session(&mut self) -> SessionId {
        let id = self.fresh_session_id();
        self.state.sessions.push(Session::new(id.clone()));
        self.state.active_session_id = id.clone();
        log::debug!("Created session {}", id);
        self.persist();
        id
    }

    pub fn delete_session(&mut self, id: &str) -> Result<(), StoreError> {
        if id == DEFAULT_SESSION_ID {
            return Err(StoreError::DefaultSessionProtected);
        }

        let index = self
            .state
            .sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StoreError::SessionNotFound(id.to_string()))?;
        self.state.sessions.remove(index);

        if self.state.active_session_id == id {
            if self.state.sessions.is_empty() {
                self.state.sessions.push(Session::new(DEFAULT_SESSION_ID));
            }
            self.state.active_session_id = self.state.sessions[0].id.clone();
        }

        log::debug!(
            "Deleted session {}, active is now {}",
            id,
            self.state.active_session_id
        );
        self.persist();
        Ok(())
    }

    pub fn rename_session(&mut self, id: &str, title: &str) -> Result<(), StoreError> {
        let session = self
            .state
            .session_mut(id)
            .ok_or_else(|| StoreError::SessionNotFound(id.to_string()))?;

        let title = title.trim();
        session.title = if title.is_empty() {
            UNTITLED_TITLE.to_string()
        } else {
            title.to_string()
        };
        session.renamed = true;

        log::debug!("Renamed session {} to {:?}", id, session.title);
        self.persist();
        Ok(())
    }

    /// Make `id` the active session. Unknown ids leave the state untouched.
    pub fn select_session(&mut self, id: &str) -> bool {
        if !self.state.contains(id) {
            log::debug!("Ignoring selection of unknown session {}", id);
            return false;
        }
        if self.state.active_session_id != id {
            self.state.active_session_id = id.to_string();
            self.persist();
        }
        true
    }

    /// Append a message with the next sequential id of the target session.
    ///
    /// The first user message of a session still carrying its auto-generated
    /// title also sets the title.
    pub fn append_message(
        &mut self,
        session_id: &str,
        sender: Sender,
        text: &str,
    ) -> Result<MessageId, StoreError> {
        self.push_message(session_id, |id| Message::new(id, sender, text))
    }

    /// Append the error-flagged bot reply for a failed request
    pub fn append_failure(
        &mut self,
        session_id: &str,
        kind: ErrorKind,
    ) -> Result<MessageId, StoreError> {
        self.push_message(session_id, |id| Message::failure(id, kind))
    }

    fn push_message(
        &mut self,
        session_id: &str,
        build: impl FnOnce(MessageId) -> Message,
    ) -> Result<MessageId, StoreError> {
        let session = self
            .state
            .session_mut(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;

        let message = build(session.next_message_id());
        let id = message.id;

        if message.is_user() && !session.has_user_message() && session.has_auto_title() {
            session.title = derive_title(&message.text);
        }
        session.messages.push(message);

        self.persist();
        Ok(id)
    }

    fn fresh_session_id(&self) -> SessionId {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let candidate = millis.to_string();
            if !self.state.contains(&candidate) {
                return candidate;
            }
            millis += 1;
        }
    }

    fn persist(&mut self) {
        if let Err(e) = codec::save(&self.state, self.storage.as_mut()) {
            log::warn!("Failed to persist chat state: {}", e);
        }
    }
}
