use chatlane_models::ChatMessage;
use chatlane_types::{Sender, Session};

/// Persona instruction sent as the first entry of every request
pub const SYSTEM_PROMPT: &str = "You are the AI assistant on this website. \
    If the user asks about the website or about you, explain that the site is \
    built on a GPT-4 class language model. \
    Always answer in a friendly way.";

/// Assemble the role-tagged messages for a request.
///
/// `session` holds the history as it was before `new_user_text` was appended.
/// The whole history is sent, error-flagged bot replies included; nothing is
/// windowed or summarized.
pub fn build_context(session: &Session, new_user_text: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(session.messages.len() + 2);
    messages.push(ChatMessage::system(SYSTEM_PROMPT));
    messages.extend(session.messages.iter().map(|m| match m.sender {
        Sender::User => ChatMessage::user(m.text.clone()),
        Sender::Bot => ChatMessage::assistant(m.text.clone()),
    }));
    messages.push(ChatMessage::user(new_user_text));
    messages
}
