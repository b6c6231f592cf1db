//! coursedesk - command-line client for the course management API.
//!
//! Owns the session (persisted in the cache directory), loads configuration
//! and exposes every API operation as a subcommand.

mod commands;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use coursedesk_core::{ApiClient, Config, Session};

#[derive(Parser, Debug)]
#[command(name = "coursedesk", version, about)]
struct Cli {
    /// Override the API base URL for this invocation
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account (signs in when the server returns a token)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out and forget the session token
    Logout,
    /// Show whether a session token is stored
    Status,
    /// Category management
    #[command(subcommand)]
    Categories(CategoryCommand),
    /// Course management
    #[command(subcommand)]
    Courses(CourseCommand),
    /// Print the route guard decision for a path
    Route { path: String },
    /// Show or change configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    List {
        #[arg(long)]
        page: Option<u32>,
    },
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
}

/// Course body options shared by create and update
#[derive(clap::Args, Debug)]
struct CourseBody {
    /// Inline JSON document
    #[arg(long, conflicts_with_all = ["field", "file"])]
    json: Option<String>,
    /// Form field as key=value, repeatable (sends multipart)
    #[arg(long = "field", value_name = "KEY=VALUE")]
    field: Vec<String>,
    /// File to attach (sends multipart)
    #[arg(long)]
    file: Option<PathBuf>,
    /// Form field name for the attached file
    #[arg(long, default_value = "image")]
    file_field: String,
}

#[derive(Subcommand, Debug)]
enum CourseCommand {
    List {
        #[arg(long)]
        page: Option<u32>,
    },
    Get {
        id: String,
    },
    Create {
        #[command(flatten)]
        body: CourseBody,
    },
    Update {
        id: String,
        #[command(flatten)]
        body: CourseBody,
    },
    Delete {
        id: String,
    },
    /// Download all courses as a spreadsheet
    Export {
        #[arg(long, short, default_value = "courses.xlsx")]
        output: PathBuf,
    },
    /// Upload a spreadsheet of courses
    Import {
        path: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show,
    SetUrl { url: String },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = cli.api_url.clone() {
        config.api_url = url;
    }

    if let Command::Config(cmd) = cli.command {
        return commands::config(cmd, config);
    }

    let session = Session::persistent(Config::cache_dir()?);
    session.load().context("Failed to restore session")?;

    let client = ApiClient::new(&config.api_url, config.timeout(), session.clone())
        .context("Failed to create API client")?;
    info!(api_url = %config.api_url, "coursedesk starting");

    commands::run(cli.command, client, session).await
}
