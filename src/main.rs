use api_client::{HttpLeaderboardClient, LeaderboardApi};
use clap::{Parser, Subcommand};
use configuration::Config;
use core_types::TimeFilter;
use game::{render, Session};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Reflex reaction-time game.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; every setting has a default.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = configuration::load_config()?;

    match cli.command {
        Commands::Serve(args) => {
            init_tracing();
            if let Some(port) = args.port {
                config.server.port = port;
            }
            web_server::run_server(config).await
        }
        Commands::Play(args) => {
            // The game owns the terminal, so its log goes to a file.
            let _guard = init_file_tracing();
            handle_play(args, config).await
        }
        Commands::Leaderboard(args) => {
            init_tracing();
            handle_leaderboard(args, &config).await
        }
        Commands::Best(args) => {
            init_tracing();
            handle_best(args, &config).await
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

fn init_file_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::never(".", "reflex-play.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A reaction-time game with a shared leaderboard.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the leaderboard HTTP server.
    Serve(ServeArgs),
    /// Play the game in this terminal.
    Play(PlayArgs),
    /// Print the leaderboard of a running server.
    Leaderboard(LeaderboardArgs),
    /// Print a participant's personal best.
    Best(BestArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Overrides the configured port.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct PlayArgs {
    /// The name scores are submitted under. Can also be set in game with `n <name>`.
    #[arg(long)]
    name: Option<String>,

    /// Base URL of the leaderboard server.
    #[arg(long)]
    server: Option<String>,
}

#[derive(Parser)]
struct LeaderboardArgs {
    /// One of all_time, today, this_week, this_month.
    #[arg(long, default_value = "all_time")]
    filter: TimeFilter,

    /// Maximum number of entries. The server default applies when omitted.
    #[arg(long)]
    limit: Option<u32>,

    /// Base URL of the leaderboard server.
    #[arg(long)]
    server: Option<String>,
}

#[derive(Parser)]
struct BestArgs {
    /// The participant's exact name.
    name: String,

    /// Base URL of the leaderboard server.
    #[arg(long)]
    server: Option<String>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn client(server: Option<String>, config: &Config) -> anyhow::Result<HttpLeaderboardClient> {
    let url = server.unwrap_or_else(|| config.game.server_url.clone());
    Ok(HttpLeaderboardClient::new(&url)?)
}

async fn handle_play(args: PlayArgs, config: Config) -> anyhow::Result<()> {
    let client = client(args.server, &config)?;
    match client.healthcheck().await {
        Ok(_) => tracing::info!(server = client.base_url(), "Leaderboard server is reachable."),
        Err(e) => {
            tracing::warn!(
                server = client.base_url(),
                error = %e,
                "Leaderboard server is unreachable."
            );
            println!(
                "Warning: cannot reach {} ({e}). You can still play; scores will not be saved.",
                client.base_url()
            );
        }
    }

    let name = args.name.map(|name| name.trim().to_string());
    let session = Session::new(Arc::new(client), config.game, name, std::io::stdout());
    session.run(BufReader::new(tokio::io::stdin())).await?;
    Ok(())
}

async fn handle_leaderboard(args: LeaderboardArgs, config: &Config) -> anyhow::Result<()> {
    let client = client(args.server, config)?;
    let entries = client.get_leaderboard(args.filter, args.limit).await?;
    println!("{}", render::leaderboard_table(args.filter, &entries));
    Ok(())
}

async fn handle_best(args: BestArgs, config: &Config) -> anyhow::Result<()> {
    let client = client(args.server, config)?;
    let best = client.get_personal_best(&args.name).await?;
    println!("{}", render::personal_best_line(&args.name, best.as_ref()));
    Ok(())
}
