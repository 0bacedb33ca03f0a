use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::process;
use tracing::debug;

mod cli;

use cli::auth::AuthCommands;
use emojipost_cli::config::Config;
use emojipost_cli::logging::init_logging;

#[derive(Parser)]
#[command(name = "emojipost")]
#[command(about = "Emojipost CLI - Slack session management")]
#[command(version)]
struct Cli {
    /// Directory holding the persisted Slack token (overrides EMOJIPOST_STORE_DIR)
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the Slack session
    #[command(subcommand)]
    Auth(AuthCommands),
}

#[tokio::main]
async fn main() {
    // Load .env file
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    match handle_command(cli).await {
        Ok(_) => {}
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

async fn handle_command(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?.with_store_dir(cli.store_dir);
    debug!("Using token store at {}", config.store_dir.display());

    match cli.command {
        Commands::Auth(auth_cmd) => auth_cmd.execute(&config).await,
    }
}
