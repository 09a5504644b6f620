//! Reference step - attach reference documents

use clap::{Args, Subcommand};
use scrutin_core::{Config, ReferenceCatalog};
use scrutin_db::HandoffKey;

use super::open_store;

/// Reference document commands
#[derive(Args, Debug)]
pub struct ReferencesArgs {
    #[command(subcommand)]
    pub command: ReferencesCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReferencesCommand {
    /// List the configured reference catalog
    List,

    /// Load the given references and store them for the review
    Select {
        /// Catalog ids
        #[arg(required = true, value_delimiter = ',')]
        ids: Vec<String>,
    },
}

impl ReferencesArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let catalog = ReferenceCatalog::from_config(config);

        match &self.command {
            ReferencesCommand::List => {
                if catalog.entries().is_empty() {
                    println!("No references configured. Add [[references]] entries to the config file.");
                    return Ok(());
                }
                for entry in catalog.entries() {
                    println!("  {:<20} [{}] {}", entry.id, entry.kind, entry.name);
                }
            }
            ReferencesCommand::Select { ids } => {
                let contents = catalog.load(ids).await?;

                let db = open_store(config).await?;
                db.handoff()
                    .put(HandoffKey::ReferenceContents, &contents)
                    .await?;

                println!("Stored {} reference documents.", contents.len());
            }
        }

        Ok(())
    }
}
