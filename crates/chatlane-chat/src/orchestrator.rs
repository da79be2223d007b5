//! Send orchestrator: optimistic user-message append, the gateway call, and
//! reconciliation of its outcome into the originating session.
//!
//! All state lives behind one `Rc<RefCell<_>>` and is only borrowed between
//! suspension points, so several sessions can have requests in flight at the
//! same time on a single-threaded executor.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chatlane_models::ChatMessage;
use chatlane_types::{
    ChatState, ErrorKind, MessageId, Sender, SessionId, FALLBACK_REPLY, MAX_MESSAGE_LENGTH,
};
use thiserror::Error;

use crate::context::build_context;
use crate::gateway::{CompletionGateway, GatewayError};
use crate::storage::DurableStore;
use crate::store::{SessionStore, StoreError};

/// Per-session request state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendState {
    #[default]
    Idle,
    Pending,
}

/// Reasons a submit is rejected before anything is mutated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("message is empty")]
    Empty,
    #[error("a reply is already pending for session {0}")]
    AlreadyPending(SessionId),
    #[error("message is {length} characters long, the limit is {limit}")]
    TooLong { length: usize, limit: usize },
    #[error("session not found: {0}")]
    UnknownSession(SessionId),
}

/// Inline notice shown next to the input field; never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputNotice {
    TooLong { length: usize, limit: usize },
}

/// What a resolved request appended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Replied { message_id: MessageId },
    Failed { message_id: MessageId, kind: ErrorKind },
    /// The originating session was deleted while the request was in flight
    Discarded,
}

struct ClientState {
    store: SessionStore,
    send_states: HashMap<SessionId, SendState>,
    input: String,
    notice: Option<InputNotice>,
}

impl ClientState {
    fn send_state(&self, session_id: &str) -> SendState {
        self.send_states.get(session_id).copied().unwrap_or_default()
    }

    fn release(&mut self, session_id: &str) {
        self.send_states.remove(session_id);
    }
}

/// The chat client: session store, request orchestration and input buffer.
pub struct ChatClient<G> {
    state: Rc<RefCell<ClientState>>,
    gateway: Rc<G>,
}

impl<G> Clone for ChatClient<G> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            gateway: Rc::clone(&self.gateway),
        }
    }
}

impl<G: CompletionGateway> ChatClient<G> {
    pub fn new(storage: Box<dyn DurableStore>, gateway: G) -> Self {
        Self::with_store(SessionStore::open(storage), gateway)
    }

    pub fn with_store(store: SessionStore, gateway: G) -> Self {
        Self {
            state: Rc::new(RefCell::new(ClientState {
                store,
                send_states: HashMap::new(),
                input: String::new(),
                notice: None,
            })),
            gateway: Rc::new(gateway),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    // ------------------------------------------------------------------
    // Session management
    // ------------------------------------------------------------------

    pub fn create_session(&self) -> SessionId {
        self.state.borrow_mut().store.create_session()
    }

    pub fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        self.state.borrow_mut().store.delete_session(id)
    }

    pub fn rename_session(&self, id: &str, title: &str) -> Result<(), StoreError> {
        self.state.borrow_mut().store.rename_session(id, title)
    }

    pub fn select_session(&self, id: &str) -> bool {
        self.state.borrow_mut().store.select_session(id)
    }

    /// Read-only copy of the chat state for rendering
    pub fn snapshot(&self) -> ChatState {
        self.state.borrow().store.snapshot()
    }

    pub fn active_session_id(&self) -> SessionId {
        self.state.borrow().store.active_session_id().to_string()
    }

    pub fn send_state(&self, session_id: &str) -> SendState {
        self.state.borrow().send_state(session_id)
    }

    pub fn is_pending(&self, session_id: &str) -> bool {
        self.send_state(session_id) == SendState::Pending
    }

    // ------------------------------------------------------------------
    // Input buffer
    // ------------------------------------------------------------------

    /// Replace the input buffer. An over-long text raises the inline notice;
    /// any valid edit clears it.
    pub fn set_input(&self, text: &str) {
        let mut state = self.state.borrow_mut();
        let length = text.chars().count();
        state.notice = (length > MAX_MESSAGE_LENGTH).then_some(InputNotice::TooLong {
            length,
            limit: MAX_MESSAGE_LENGTH,
        });
        state.input = text.to_string();
    }

    pub fn input(&self) -> String {
        self.state.borrow().input.clone()
    }

    pub fn input_notice(&self) -> Option<InputNotice> {
        self.state.borrow().notice
    }

    /// Characters in the input buffer and the maximum allowed
    pub fn character_count(&self) -> (usize, usize) {
        (self.state.borrow().input.chars().count(), MAX_MESSAGE_LENGTH)
    }

    // ------------------------------------------------------------------
    // Sending
    // ------------------------------------------------------------------

    /// Send `text` in the active session and apply the reply when it arrives
    pub async fn submit(&self, text: &str) -> Result<SendOutcome, SubmitError> {
        let session_id = self.active_session_id();
        self.submit_to(&session_id, text).await
    }

    /// Send the contents of the input buffer in the active session. The
    /// buffer is cleared once the message has been accepted.
    pub async fn submit_input(&self) -> Result<SendOutcome, SubmitError> {
        let text = self.input();
        let pending = self.begin_submit(&text)?;
        {
            let mut state = self.state.borrow_mut();
            state.input.clear();
            state.notice = None;
        }
        self.complete(pending).await
    }

    pub async fn submit_to(&self, session_id: &str, text: &str) -> Result<SendOutcome, SubmitError> {
        let pending = self.begin_submit_to(session_id, text)?;
        self.complete(pending).await
    }

    async fn complete(&self, mut pending: PendingSend) -> Result<SendOutcome, SubmitError> {
        let context = pending.take_context();
        let result = self.gateway.send(context).await;
        Ok(pending.resolve(result))
    }

    /// First half of a submit against the active session
    pub fn begin_submit(&self, text: &str) -> Result<PendingSend, SubmitError> {
        let session_id = self.active_session_id();
        self.begin_submit_to(&session_id, text)
    }

    /// Validate `text`, append it as a user message, mark the session pending
    /// and hand back the context to send. The session returns to idle when
    /// the returned `PendingSend` is resolved or dropped.
    pub fn begin_submit_to(&self, session_id: &str, text: &str) -> Result<PendingSend, SubmitError> {
        let mut state = self.state.borrow_mut();

        if text.trim().is_empty() {
            return Err(SubmitError::Empty);
        }
        if state.store.session(session_id).is_none() {
            return Err(SubmitError::UnknownSession(session_id.to_string()));
        }
        if state.send_state(session_id) == SendState::Pending {
            log::debug!("Ignoring submit while session {} is pending", session_id);
            return Err(SubmitError::AlreadyPending(session_id.to_string()));
        }
        let length = text.chars().count();
        if length > MAX_MESSAGE_LENGTH {
            state.notice = Some(InputNotice::TooLong {
                length,
                limit: MAX_MESSAGE_LENGTH,
            });
            return Err(SubmitError::TooLong {
                length,
                limit: MAX_MESSAGE_LENGTH,
            });
        }

        // Built before the append: the history excludes the message being sent
        let context = match state.store.session(session_id) {
            Some(session) => build_context(session, text),
            None => return Err(SubmitError::UnknownSession(session_id.to_string())),
        };
        let user_message_id = state
            .store
            .append_message(session_id, Sender::User, text)
            .map_err(|_| SubmitError::UnknownSession(session_id.to_string()))?;

        state
            .send_states
            .insert(session_id.to_string(), SendState::Pending);

        log::info!(
            "Sending {} context message(s) for session {}",
            context.len(),
            session_id
        );

        Ok(PendingSend {
            state: Rc::clone(&self.state),
            session_id: session_id.to_string(),
            user_message_id,
            context,
            released: false,
        })
    }
}

/// An accepted submit whose gateway outcome has not been applied yet
pub struct PendingSend {
    state: Rc<RefCell<ClientState>>,
    session_id: SessionId,
    user_message_id: MessageId,
    context: Vec<ChatMessage>,
    released: bool,
}

impl PendingSend {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_message_id(&self) -> MessageId {
        self.user_message_id
    }

    pub fn context(&self) -> &[ChatMessage] {
        &self.context
    }

    pub fn take_context(&mut self) -> Vec<ChatMessage> {
        std::mem::take(&mut self.context)
    }

    /// Append the bot reply (or the error message) to the originating session
    /// and return it to idle.
    pub fn resolve(mut self, result: Result<String, GatewayError>) -> SendOutcome {
        self.released = true;
        let mut state = self.state.borrow_mut();
        state.release(&self.session_id);

        let appended = match result {
            Ok(reply) => {
                let text = if reply.trim().is_empty() {
                    FALLBACK_REPLY
                } else {
                    reply.as_str()
                };
                state
                    .store
                    .append_message(&self.session_id, Sender::Bot, text)
                    .map(|message_id| SendOutcome::Replied { message_id })
            }
            Err(e) => {
                log::warn!("Completion request for session {} failed: {}", self.session_id, e);
                let kind = e.kind();
                state
                    .store
                    .append_failure(&self.session_id, kind)
                    .map(|message_id| SendOutcome::Failed { message_id, kind })
            }
        };

        appended.unwrap_or_else(|e| {
            log::warn!("Dropping reply: {}", e);
            SendOutcome::Discarded
        })
    }
}

impl Drop for PendingSend {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        log::warn!(
            "Request for session {} abandoned before it resolved",
            self.session_id
        );
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.release(&self.session_id);
        }
    }
}
