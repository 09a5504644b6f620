//! Fetching many tickets at once

use futures::future::join_all;
use scrutin_core::TicketRecord;
use tracing::{info, warn};

use crate::{Error, JiraClient, Result};

/// Summary prefix marking a ticket that could not be fetched
pub const PLACEHOLDER_PREFIX: &str = "Error fetching ticket";

/// Stand-in ticket recording why `key` could not be fetched
pub fn placeholder_ticket(key: &str, err: &Error) -> TicketRecord {
    TicketRecord::new(
        key,
        format!("{} {}", PLACEHOLDER_PREFIX, key),
        format!("Failed to fetch this ticket: {}", err),
    )
}

pub fn is_placeholder(ticket: &TicketRecord) -> bool {
    ticket.summary.starts_with(PLACEHOLDER_PREFIX)
}

impl JiraClient {
    /// Fetch tickets concurrently, in request order
    ///
    /// A ticket that fails is replaced by a placeholder; the batch only
    /// fails when none of the tickets could be fetched.
    pub async fn fetch_tickets(&self, keys: &[String]) -> Result<Vec<TicketRecord>> {
        let keys: Vec<&str> = keys
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect();

        if keys.is_empty() {
            return Err(Error::Input(
                "Please enter at least one ticket number".to_string(),
            ));
        }

        info!(count = keys.len(), tickets = %keys.join(", "), "Fetching tickets");

        let results = join_all(keys.iter().map(|key| self.fetch_ticket(key))).await;

        let tickets: Vec<TicketRecord> = keys
            .iter()
            .zip(results)
            .map(|(key, result)| {
                result.unwrap_or_else(|e| {
                    warn!(key, error = %e, "Failed to fetch ticket");
                    placeholder_ticket(key, &e)
                })
            })
            .collect();

        let valid = tickets.iter().filter(|t| !is_placeholder(t)).count();
        if valid == 0 {
            return Err(Error::Input(
                "Failed to fetch any valid tickets. Check your Jira credentials and ticket numbers."
                    .to_string(),
            ));
        }

        info!(valid, requested = keys.len(), "Completed fetching tickets");
        Ok(tickets)
    }
}
