use chatlane_chat::{ChatClient, InputNotice, SendOutcome, SubmitError};
use chatlane_types::MAX_MESSAGE_LENGTH;
use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::gateway::RelayGateway;
use crate::storage::LocalStorageStore;

/// JavaScript-facing chat client.
///
/// Every mutation is written through to localStorage. Reads go through
/// `snapshot_json`, which the page renders from.
#[wasm_bindgen]
pub struct ChatHandle {
    client: ChatClient<RelayGateway>,
}

#[wasm_bindgen]
impl ChatHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(relay_url: Option<String>) -> Result<ChatHandle, JsValue> {
        let storage = LocalStorageStore::new()?;
        let gateway = RelayGateway::new(relay_url);
        log::info!("Chat client using relay at {}", gateway.url());
        Ok(Self {
            client: ChatClient::new(Box::new(storage), gateway),
        })
    }

    pub fn create_session(&self) -> String {
        self.client.create_session()
    }

    pub fn delete_session(&self, id: &str) -> Result<(), JsValue> {
        self.client
            .delete_session(id)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn rename_session(&self, id: &str, title: &str) -> Result<(), JsValue> {
        self.client
            .rename_session(id, title)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn select_session(&self, id: &str) -> bool {
        self.client.select_session(id)
    }

    pub fn active_session_id(&self) -> String {
        self.client.active_session_id()
    }

    pub fn is_pending(&self, session_id: &str) -> bool {
        self.client.is_pending(session_id)
    }

    pub fn set_input(&self, text: &str) {
        self.client.set_input(text);
    }

    pub fn input(&self) -> String {
        self.client.input()
    }

    /// Inline notice for the input field, if any
    pub fn input_notice(&self) -> Option<String> {
        self.client.input_notice().map(notice_text)
    }

    pub fn character_count(&self) -> usize {
        self.client.character_count().0
    }

    pub fn character_limit(&self) -> usize {
        MAX_MESSAGE_LENGTH
    }

    /// Chat state as `{"sessions": [...], "active_session_id": ...}` for rendering
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.client.snapshot()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Send `text` in the active session. Resolves with `"replied"`,
    /// `"failed"` or `"discarded"` once the outcome was applied; rejects when
    /// the submit is refused.
    pub fn submit(&self, text: String) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move { settle(client.submit(&text).await) })
    }

    /// Send the current input buffer in the active session
    pub fn submit_input(&self) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move { settle(client.submit_input().await) })
    }
}

fn settle(result: Result<SendOutcome, SubmitError>) -> Result<JsValue, JsValue> {
    match result {
        Ok(outcome) => Ok(JsValue::from_str(outcome_label(&outcome))),
        Err(e) => {
            log::debug!("Submit refused: {}", e);
            Err(JsValue::from_str(&e.to_string()))
        }
    }
}

fn outcome_label(outcome: &SendOutcome) -> &'static str {
    match outcome {
        SendOutcome::Replied { .. } => "replied",
        SendOutcome::Failed { .. } => "failed",
        SendOutcome::Discarded => "discarded",
    }
}

fn notice_text(notice: InputNotice) -> String {
    match notice {
        InputNotice::TooLong { length, limit } => {
            format!("Message is too long ({}/{} characters)", length, limit)
        }
    }
}
