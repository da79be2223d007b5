//! Persistence codec: maps `ChatState` to and from the two durable text slots.
//!
//! Decoding never fails. Anything missing, empty or malformed degrades to the
//! bootstrap state so a corrupted store can never lock the user out.

use chatlane_types::{ChatState, Session, DEFAULT_SESSION_ID};
use thiserror::Error;

use crate::storage::{DurableStore, StorageError};

/// Slot holding the JSON array of sessions
pub const SESSIONS_KEY: &str = "chat-sessions";

/// Slot holding the id of the last active session
pub const ACTIVE_SESSION_KEY: &str = "active-session";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode sessions: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write durable state: {0}")]
    Storage(#[from] StorageError),
}

/// Encoded form of a `ChatState`, one field per durable slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedState {
    pub sessions: String,
    pub active_session_id: String,
}

pub fn serialize(state: &ChatState) -> Result<EncodedState, CodecError> {
    Ok(EncodedState {
        sessions: serde_json::to_string(&state.sessions)?,
        active_session_id: state.active_session_id.clone(),
    })
}

pub fn deserialize(sessions: Option<&str>, active_session_id: Option<&str>) -> ChatState {
    let raw = match sessions.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => {
            log::debug!("No persisted sessions, starting from bootstrap state");
            return ChatState::bootstrap();
        }
    };

    let sessions: Vec<Session> = match serde_json::from_str(raw) {
        Ok(sessions) => sessions,
        Err(e) => {
            log::warn!("Discarding malformed persisted sessions: {}", e);
            return ChatState::bootstrap();
        }
    };

    if !is_well_formed(&sessions) {
        log::warn!("Discarding persisted sessions that break the session invariants");
        return ChatState::bootstrap();
    }

    let active_session_id = resolve_active(&sessions, active_session_id);
    ChatState {
        sessions,
        active_session_id,
    }
}

/// Write both slots of `state` to `store`
pub fn save(state: &ChatState, store: &mut dyn DurableStore) -> Result<(), CodecError> {
    let encoded = serialize(state)?;
    store.set(SESSIONS_KEY, &encoded.sessions)?;
    store.set(ACTIVE_SESSION_KEY, &encoded.active_session_id)?;
    Ok(())
}

/// Read the state persisted in `store`, or the bootstrap state
pub fn load(store: &dyn DurableStore) -> ChatState {
    let sessions = store.get(SESSIONS_KEY);
    let active = store.get(ACTIVE_SESSION_KEY);
    deserialize(sessions.as_deref(), active.as_deref())
}

fn is_well_formed(sessions: &[Session]) -> bool {
    if sessions.is_empty() {
        return false;
    }

    let mut seen = std::collections::HashSet::new();
    sessions.iter().all(|session| {
        seen.insert(session.id.as_str())
            && !session.messages.is_empty()
            && session.messages.windows(2).all(|w| w[0].id < w[1].id)
    })
}

fn resolve_active(sessions: &[Session], requested: Option<&str>) -> String {
    let exists = |id: &str| sessions.iter().any(|s| s.id == id);

    match requested {
        Some(id) if exists(id) => id.to_string(),
        _ if exists(DEFAULT_SESSION_ID) => DEFAULT_SESSION_ID.to_string(),
        // is_well_formed guarantees at least one session
        _ => sessions[0].id.clone(),
    }
}
