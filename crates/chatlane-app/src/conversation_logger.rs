use anyhow::{Context, Result};
use chatlane_types::{ErrorKind, Message, Sender};
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

#[derive(Serialize)]
struct LogEntry<'a> {
    timestamp: String, // ISO-8601 local time of the write
    session_id: &'a str,
    message_id: u64,
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<ErrorKind>,
}

/// Appends chat messages to a JSONL transcript
pub struct ConversationLogger {
    file_path: PathBuf,
    file: tokio::fs::File,
}

impl ConversationLogger {
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .with_context(|| format!("Failed to open transcript {}", path.display()))?;
        Ok(Self {
            file_path: path.to_path_buf(),
            file,
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Append one message. Write failures are reported and otherwise ignored.
    pub async fn log(&mut self, session_id: &str, message: &Message) {
        let entry = LogEntry {
            timestamp: Local::now().to_rfc3339(),
            session_id,
            message_id: message.id,
            role: match message.sender {
                Sender::User => "user",
                Sender::Bot => "assistant",
            },
            content: &message.text,
            error_kind: message.error_kind,
        };

        let Ok(mut line) = serde_json::to_string(&entry) else {
            return;
        };
        line.push('\n');
        if let Err(e) = self.file.write_all(line.as_bytes()).await {
            log::warn!("[Logging error] {}", e);
        } else {
            let _ = self.file.flush().await;
        }
    }
}
