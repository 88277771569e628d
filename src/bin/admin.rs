//! CLI administration tool for shortlink.
//!
//! Works directly against the database, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a link on behalf of user 42, expiring in a day
//! cargo run --bin admin -- link create https://example.com --owner 42 --expires-in-hours 24
//!
//! # Inspect a link (does not count as a click)
//! cargo run --bin admin -- link show aZ3kP9qX
//!
//! # Check database connection and apply migrations
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `BASE_URL` (optional): prefix for printed short URLs
//! - `CODE_LENGTH`, `CODE_MAX_ATTEMPTS` (optional): generator settings

use shortlink::application::services::{CodeGeneratorConfig, LinkService};
use shortlink::domain::clock::SystemClock;
use shortlink::domain::entities::ShortLink;
use shortlink::domain::repositories::ShortLinkRepository;
use shortlink::infrastructure::cache::MemoryCache;
use shortlink::infrastructure::persistence::PgShortLinkRepository;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Create a short link
    Create {
        /// Destination URL (http or https)
        target: String,

        /// Owner user id
        #[arg(short, long)]
        owner: i64,

        /// Expire the link after this many hours
        #[arg(short, long)]
        expires_in_hours: Option<i64>,
    },

    /// Show a short link by code
    Show {
        code: String,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection and apply pending migrations
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_link_action(action: LinkAction, pool: PgPool) -> Result<()> {
    let repo = Arc::new(PgShortLinkRepository::new(Arc::new(pool)));

    match action {
        LinkAction::Create {
            target,
            owner,
            expires_in_hours,
        } => create_link(repo, target, owner, expires_in_hours).await,
        LinkAction::Show { code } => show_link(repo, code).await,
    }
}

fn env_or(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Runs the identifier generator against the database.
async fn create_link(
    repo: Arc<PgShortLinkRepository>,
    target: String,
    owner: i64,
    expires_in_hours: Option<i64>,
) -> Result<()> {
    println!("{}", "🔗 Create Short Link".bright_blue().bold());
    println!();

    let config = CodeGeneratorConfig {
        code_length: env_or("CODE_LENGTH", 8),
        max_attempts: env_or("CODE_MAX_ATTEMPTS", 10),
    };
    // Creation never reads or evicts cache entries.
    let service = LinkService::new(
        repo,
        Arc::new(MemoryCache::new()),
        Arc::new(SystemClock),
        config,
    );

    let expires_at = expires_in_hours.map(|h| Utc::now() + chrono::Duration::hours(h));

    let link = service
        .generate(&target, owner, expires_at)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "✅ Link created".green().bold());
    println!();
    print_link(&link);

    Ok(())
}

async fn show_link(repo: Arc<PgShortLinkRepository>, code: String) -> Result<()> {
    let link = repo
        .find_by_code(&code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    match link {
        Some(link) => print_link(&link),
        None => println!("{}", format!("⚠️  No active link with code '{}'", code).yellow()),
    }

    Ok(())
}

fn print_link(link: &ShortLink) {
    let base_url =
        std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    println!("  Code:      {}", link.code.bright_yellow().bold());
    println!(
        "  Short URL: {}",
        format!("{}/{}", base_url.trim_end_matches('/'), link.code).bright_cyan()
    );
    println!("  Target:    {}", link.target.cyan());
    println!("  Owner:     {}", link.owner_id.to_string().bright_white());
    println!("  Clicks:    {}", link.click_count.to_string().bright_green());
    println!(
        "  Created:   {}",
        link.created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    if let Some(expires_at) = link.expires_at {
        println!(
            "  Expires:   {}",
            expires_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
        );
    }
    println!();
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;
            println!("{}", "✅ Database connection OK".green().bold());

            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .context("Failed to run migrations")?;
            println!("{}", "✅ Migrations up to date".green().bold());
        }
    }

    Ok(())
}
