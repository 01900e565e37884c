mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::sync::SyncArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "jira-setup",
    about = "Provision the migration board in Jira (project, epics, stories) and write its README",
    version,
    propagate_version = true
)]
struct Cli {
    /// Board definition YAML (default: the built-in AVBA board)
    #[arg(long, global = true, env = "JIRA_SETUP_BOARD")]
    board: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create whatever is missing, then write the README
    Sync(SyncArgs),

    /// Show what exists and what a sync would create, without changing anything
    Plan,

    /// Print the board definition
    Board,

    /// List workflow transition ids available in the project
    Transitions,
}

fn main() {
    // Load .env before parsing so clap's `env` fallbacks see it too.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = cmd::load_board(cli.board.as_deref()).and_then(|board| match cli.command {
        Commands::Sync(args) => cmd::sync::run(&board, &args, cli.json),
        Commands::Plan => cmd::plan::run(&board, cli.json),
        Commands::Board => cmd::board::run(&board, cli.json),
        Commands::Transitions => cmd::transitions::run(&board, cli.json),
    });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
