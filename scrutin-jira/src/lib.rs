//! Scrutin Jira - ticket fetching for Scrutin
//!
//! Tickets are fetched over the Jira REST API (v2) with Basic auth and
//! reduced to key, summary and description.

mod batch;
mod client;
mod error;

pub use batch::{is_placeholder, placeholder_ticket, PLACEHOLDER_PREFIX};
pub use client::JiraClient;
pub use error::{Error, Result};
