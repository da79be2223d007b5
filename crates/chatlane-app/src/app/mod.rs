pub mod repl;
pub mod web_server;

pub use repl::{parse_command, run_command, run_repl_mode, Flow, ReplCommand};
pub use web_server::run_web_server;
