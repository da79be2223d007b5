//! Chatlane application library
//!
//! The terminal client and the HTTP relay the browser client talks to.

pub mod app;
pub mod cli;
pub mod config;
pub mod conversation_logger;
pub mod web;

pub use app::{run_repl_mode, run_web_server};
pub use cli::{Cli, Commands};
pub use conversation_logger::ConversationLogger;
