use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::Colorize;

use chatlane::{run_repl_mode, run_web_server, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if let Some(shell) = cli.generate {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    match cli.command {
        Some(Commands::Serve { bind, port }) => run_web_server(&bind, port).await,
        Some(Commands::Chat {
            data_dir,
            transcript,
            session,
        }) => run_repl_mode(data_dir, transcript, session).await,
        None => {
            println!("{}", "No subcommand provided. Try `chatlane chat` or `chatlane serve`.".bright_black());
            Ok(())
        }
    }
}
