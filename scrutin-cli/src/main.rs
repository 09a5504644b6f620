//! Scrutin CLI - Command line interface for Scrutin
//!
//! Gathers a ticket, pull requests, source files and reference documents
//! step by step, then asks a hosted model for a structured code review.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use scrutin_core::{Config, Secrets};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{
    FilesArgs, PreviewArgs, PrsArgs, ReferencesArgs, ReviewArgs, ShowArgs, TicketsArgs,
};

/// Scrutin: AI-assisted code review from tickets, PRs and source files
#[derive(Parser, Debug)]
#[command(name = "scrutin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.config/scrutin/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model to use (overrides config and env)
    #[arg(long, global = true, env = "SCRUTIN_MODEL")]
    model: Option<String>,

    /// Generation API root (overrides config and env)
    #[arg(long, global = true, env = "SCRUTIN_LLM_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Step 1: fetch Jira tickets
    #[command(visible_alias = "t")]
    Tickets(TicketsArgs),

    /// Step 2: fetch pull requests from configured repos
    Prs(PrsArgs),

    /// Step 3: browse local files and concatenate a selection
    #[command(visible_alias = "f")]
    Files(FilesArgs),

    /// Step 4: choose reference documents
    #[command(visible_alias = "refs")]
    References(ReferencesArgs),

    /// Print the prompt that would be sent, without calling the model
    Preview(PreviewArgs),

    /// Step 5: generate the review
    #[command(visible_alias = "r")]
    Review(ReviewArgs),

    /// Step 6: show the stored review, split into sections
    Show(ShowArgs),

    /// Show what each step has stored so far
    Status,

    /// Discard all stored state and start a new review
    Reset,

    /// Create a secrets template at ~/.config/scrutin/secrets.toml
    Init,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = Config::load_with_overrides(
        cli.config.as_deref(),
        cli.model.clone(),
        cli.base_url.clone(),
    )?;

    if cli.verbose {
        tracing::info!(
            model = %config.llm.model,
            base_url = %config.llm.base_url,
            repos = config.repos.len(),
            references = config.references.len(),
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("scrutin {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Tickets(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Prs(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Files(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::References(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Preview(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Review(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Show(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Status) => {
            commands::status(&config).await?;
        }
        Some(Commands::Reset) => {
            commands::reset(&config).await?;
        }
        Some(Commands::Init) => {
            let path = Secrets::create_template()?;
            println!("Created secrets template at {}", path.display());
            println!("Edit it to add your Gemini, Jira and GitHub credentials.");
        }
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("Scrutin - AI-assisted code review");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config) {
    println!("Scrutin Configuration");
    println!("=====================");
    println!();
    println!("LLM Settings:");
    println!("  base_url: {}", config.llm.base_url);
    println!("  model: {}", config.llm.model);
    println!("  timeout: {:?}", config.llm.timeout);
    println!();
    println!("Jira:");
    println!("  base_url: {}", config.jira.base_url.as_deref().unwrap_or("(not set)"));
    println!("  email: {}", config.jira.email.as_deref().unwrap_or("(not set)"));
    println!();
    println!("Repositories:");
    for (key, repo) in &config.repos {
        println!("  {}: {}/{} - {}", key, repo.owner, repo.name, repo.description);
        if let Some(ref path) = repo.local_path {
            println!("      local_path: {}", path.display());
        }
    }
    println!();
    println!("References: {}", config.references.len());
    for entry in &config.references {
        println!("  {} [{}] {} ({})", entry.id, entry.kind, entry.name, entry.path.display());
    }
    println!();
    match config.store.resolved_path() {
        Ok(path) => println!("Hand-off store: {}", path.display()),
        Err(e) => println!("Hand-off store: {}", e),
    }
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
