//! Scrutin GitHub - pull request fetching for Scrutin
//!
//! This crate gathers everything the review prompt needs about a pull
//! request: metadata, changed files with patches, commits, inline review
//! comments and submitted reviews.

mod batch;
mod client;
mod error;
mod pr;

pub use batch::{fetch_selected, parse_selection, PrSelection};
pub use client::GitHubClient;
pub use error::{Error, Result};
pub use pr::PullRequestSource;
