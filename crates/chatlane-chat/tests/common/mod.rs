#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use chatlane_chat::{ChatClient, CompletionGateway, GatewayError, MemoryStore};
use chatlane_models::ChatMessage;
use futures::channel::oneshot;

type Reply = Result<String, GatewayError>;

/// A request captured by the scripted gateway
pub struct Call {
    pub context: Vec<ChatMessage>,
    responder: Option<oneshot::Sender<Reply>>,
}

/// Gateway whose requests stay in flight until the test answers them.
/// Clones share the recorded calls.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    calls: Rc<RefCell<Vec<Call>>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Context sent with the `index`-th request
    pub fn context(&self, index: usize) -> Vec<ChatMessage> {
        self.calls.borrow()[index].context.clone()
    }

    /// Resolve the `index`-th request
    pub fn respond(&self, index: usize, reply: Reply) {
        let responder = self.calls.borrow_mut()[index]
            .responder
            .take()
            .expect("request already answered");
        responder.send(reply).expect("request no longer awaited");
    }
}

#[async_trait(?Send)]
impl CompletionGateway for ScriptedGateway {
    async fn send(&self, messages: Vec<ChatMessage>) -> Result<String, GatewayError> {
        let (tx, rx) = oneshot::channel();
        self.calls.borrow_mut().push(Call {
            context: messages,
            responder: Some(tx),
        });
        rx.await
            .unwrap_or_else(|_| Err(GatewayError::Transport("responder dropped".to_string())))
    }
}

/// Client over fresh in-memory storage; the storage handle is returned so
/// tests can reopen it.
pub fn scripted_client() -> (ChatClient<ScriptedGateway>, ScriptedGateway, MemoryStore) {
    let storage = MemoryStore::new();
    let gateway = ScriptedGateway::new();
    let client = ChatClient::new(Box::new(storage.clone()), gateway.clone());
    (client, gateway, storage)
}
