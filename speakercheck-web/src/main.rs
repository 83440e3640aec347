use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use speakercheck_data::db::{self, users};
use speakercheck_data::Role;
use speakercheck_web::config::ServerConfig;
use speakercheck_web::state::AppState;

#[derive(Parser)]
#[command(name = "speakercheck-server")]
#[command(about = "REST service for speaker availability tracking")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/speakercheck/server.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides config and SPEAKERCHECK_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the REST API (default)
    Serve {
        /// Port to listen on (overrides config and SPEAKERCHECK_PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Grant the admin role to an existing user
    Promote {
        /// Username to promote
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(db_path) = cli.db {
        config.db_path = db_path;
    }

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await
        }
        Commands::Promote { username } => {
            let conn = db::open_or_create(&config.db_path)?;
            let user = users::set_role(&conn, &username, Role::Admin)?;
            info!(user = %user.username, "promoted to admin");
            println!("{} is now an admin", user.username);
            Ok(())
        }
    }
}

async fn serve(config: ServerConfig) -> Result<()> {
    info!(db = %config.db_path.display(), "opening database");
    let state = AppState::open(&config.db_path, config.bcrypt_cost)?;

    let (_, handle) =
        speakercheck_web::spawn_server(state, config.socket_addr(), shutdown_signal()).await?;
    handle.await?;

    info!("speakercheck API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
