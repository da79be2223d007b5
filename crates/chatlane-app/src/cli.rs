use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// CLI arguments for chatlane
#[derive(Parser, Debug)]
#[command(name = "chatlane")]
#[command(about = "Chatlane - multi-session chat client with a completion relay")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Generate shell completions
    #[arg(long, value_enum)]
    pub generate: Option<Shell>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP relay that forwards browser requests upstream
    Serve {
        /// Address to bind the relay to
        #[arg(long, default_value = "127.0.0.1", env = "CHATLANE_BIND")]
        bind: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 3000, env = "CHATLANE_PORT")]
        port: u16,
    },

    /// Chat in the terminal
    Chat {
        /// Directory holding the persisted sessions (default: ~/.chatlane/data)
        #[arg(long, value_name = "DIR", env = "CHATLANE_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Append every message to this JSONL transcript
        #[arg(long, value_name = "FILE")]
        transcript: Option<PathBuf>,

        /// Session to open instead of the last active one
        #[arg(long, value_name = "ID")]
        session: Option<String>,
    },
}
