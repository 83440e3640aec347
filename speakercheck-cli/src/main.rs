use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use speakercheck_cli::{ApiClient, ClientConfig, TokenStore};

mod commands;

use commands::Session;

#[derive(Parser)]
#[command(name = "speakercheck")]
#[command(about = "Track speaker availability from the command line")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/speakercheck/client.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API base URL (overrides config and SPEAKERCHECK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        username: String,

        /// Password (prompted on stdin if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account and store the session token
    Register {
        username: String,

        /// Password (prompted on stdin if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Revoke the stored token and forget it
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Manage pages (speaker categories)
    Pages {
        #[command(subcommand)]
        command: PageCommands,
    },

    /// Manage speakers
    Speakers {
        #[command(subcommand)]
        command: SpeakerCommands,
    },

    /// Schedule a speaker for a program
    Schedule {
        /// Speaker id
        speaker: String,

        /// Program date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Program time (HH:MM)
        #[arg(long)]
        time: String,
    },

    /// Make a scheduled speaker available again
    Release {
        /// Speaker id
        speaker: String,
    },
}

#[derive(Subcommand)]
enum PageCommands {
    /// List pages in display order
    List,

    /// Add a page at the end of the list
    Add { name: String },

    /// Rename a page
    Rename {
        /// Page id or name
        page: String,
        name: String,
    },

    /// Delete an empty page
    Delete {
        /// Page id or name
        page: String,
    },
}

#[derive(Subcommand)]
enum SpeakerCommands {
    /// List the speakers of a page
    List {
        /// Page id or name
        page: String,
    },

    /// Show one speaker
    Show { speaker: String },

    /// Add a speaker to a page
    Add {
        /// Page id or name
        #[arg(long)]
        page: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        area: String,
        #[arg(long)]
        phone: String,
    },

    /// Edit speaker details
    Update {
        speaker: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        area: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Move to another page (id or name)
        #[arg(long)]
        page: Option<String>,
    },

    /// Delete a speaker
    Delete { speaker: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ClientConfig::load(cli.config.as_deref())?;
    let api_url = cli.api_url.unwrap_or(config.api_url);
    let tokens = TokenStore::new(config.token_path);
    let client = ApiClient::new(api_url).with_token(tokens.load()?);
    let session = Session::new(client, tokens, cli.yes);

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&session, &username, password).await
        }
        Commands::Register { username, password } => {
            commands::auth::register(&session, &username, password).await
        }
        Commands::Logout => commands::auth::logout(&session).await,
        Commands::Whoami => commands::auth::whoami(&session).await,

        Commands::Pages { command } => match command {
            PageCommands::List => commands::pages::list(&session).await,
            PageCommands::Add { name } => commands::pages::add(&session, &name).await,
            PageCommands::Rename { page, name } => {
                commands::pages::rename(&session, &page, &name).await
            }
            PageCommands::Delete { page } => commands::pages::delete(&session, &page).await,
        },

        Commands::Speakers { command } => match command {
            SpeakerCommands::List { page } => commands::speakers::list(&session, &page).await,
            SpeakerCommands::Show { speaker } => {
                commands::speakers::show(&session, &speaker).await
            }
            SpeakerCommands::Add {
                page,
                name,
                area,
                phone,
            } => commands::speakers::add(&session, &page, &name, &area, &phone).await,
            SpeakerCommands::Update {
                speaker,
                name,
                area,
                phone,
                page,
            } => {
                commands::speakers::update(&session, &speaker, name, area, phone, page.as_deref())
                    .await
            }
            SpeakerCommands::Delete { speaker } => {
                commands::speakers::delete(&session, &speaker).await
            }
        },

        Commands::Schedule {
            speaker,
            date,
            time,
        } => commands::speakers::schedule(&session, &speaker, &date, &time).await,
        Commands::Release { speaker } => commands::speakers::release(&session, &speaker).await,
    }
}
