//! Ticket step - fetch Jira tickets

use clap::Args;
use scrutin_core::{Config, Secrets};
use scrutin_db::HandoffKey;
use scrutin_jira::{is_placeholder, JiraClient};

use super::open_store;

/// Fetch one or more Jira tickets and store them for the review
#[derive(Args, Debug)]
pub struct TicketsArgs {
    /// Ticket keys, e.g. TS-123 (comma or space separated)
    #[arg(required = true, value_delimiter = ',')]
    keys: Vec<String>,
}

impl TicketsArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let secrets = Secrets::load()?;
        let client = JiraClient::from_config(&config.jira, &secrets)?;

        let tickets = client.fetch_tickets(&self.keys).await?;

        let db = open_store(config).await?;
        db.handoff().put(HandoffKey::JiraTickets, &tickets).await?;

        for ticket in &tickets {
            if is_placeholder(ticket) {
                println!("  ✗ {}: {}", ticket.key, ticket.description);
            } else {
                println!("  ✓ {}: {}", ticket.key, ticket.summary);
            }
        }
        let valid = tickets.iter().filter(|t| !is_placeholder(t)).count();
        println!();
        println!("Stored {} of {} tickets.", valid, tickets.len());

        Ok(())
    }
}
