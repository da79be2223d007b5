//! # chatlane-chat
//!
//! Session and message state management for the chatlane client:
//!
//! - **Session store**: ordered sessions, the active-session pointer, and
//!   write-through persistence on every mutation
//! - **Persistence codec**: text encoding of the chat state that degrades to a
//!   fresh bootstrap state instead of failing
//! - **Context builder**: the role-tagged message list sent for a request
//! - **Send orchestrator**: optimistic user-message append, one in-flight
//!   request per session, and reconciliation of the reply into the session it
//!   came from
//!
//! ## Example
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use chatlane_chat::{ChatClient, CompletionGateway, GatewayError, MemoryStore};
//! use chatlane_models::ChatMessage;
//!
//! struct Echo;
//!
//! #[async_trait(?Send)]
//! impl CompletionGateway for Echo {
//!     async fn send(&self, messages: Vec<ChatMessage>) -> Result<String, GatewayError> {
//!         Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
//!     }
//! }
//!
//! # async fn run() {
//! let client = ChatClient::new(Box::new(MemoryStore::new()), Echo);
//! client.create_session();
//! client.submit("Hello!").await.unwrap();
//! println!("{:?}", client.snapshot());
//! # }
//! ```

pub mod codec;
pub mod context;
pub mod gateway;
pub mod orchestrator;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use codec::{CodecError, EncodedState, ACTIVE_SESSION_KEY, SESSIONS_KEY};
pub use context::{build_context, SYSTEM_PROMPT};
pub use gateway::{reply_from_response, CompletionGateway, GatewayError};
pub use orchestrator::{
    ChatClient,
    InputNotice,
    PendingSend,
    SendOutcome,
    SendState,
    SubmitError,
};
pub use storage::{DurableStore, FileStore, MemoryStore, StorageError};
pub use store::{SessionStore, StoreError};
