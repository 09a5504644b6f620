//! CLI command implementations

pub mod files;
pub mod preview;
pub mod prs;
pub mod references;
pub mod review;
pub mod show;
pub mod tickets;

pub use files::FilesArgs;
pub use preview::PreviewArgs;
pub use prs::PrsArgs;
pub use references::ReferencesArgs;
pub use review::ReviewArgs;
pub use show::ShowArgs;
pub use tickets::TicketsArgs;

use scrutin_core::Config;
use scrutin_db::Database;

/// Open the hand-off database named by the config
pub(crate) async fn open_store(config: &Config) -> anyhow::Result<Database> {
    let path = config.store.resolved_path()?;
    Database::new(&path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open hand-off store {}: {}", path.display(), e))
}

/// Print what each step has stored so far
pub async fn status(config: &Config) -> anyhow::Result<()> {
    let db = open_store(config).await?;
    let entries = db.handoff().entries().await?;

    if entries.is_empty() {
        println!("Nothing stored yet. Start with `scrutin tickets`.");
        return Ok(());
    }

    println!("Stored state:");
    for entry in entries {
        println!(
            "  {:<18} {:>10} bytes  updated {}",
            entry.key,
            entry.bytes,
            entry.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    Ok(())
}

/// Clear every hand-off key
pub async fn reset(config: &Config) -> anyhow::Result<()> {
    let db = open_store(config).await?;
    db.handoff().clear().await?;
    println!("Cleared stored state. Ready for a new review.");
    Ok(())
}
