//! PR step - fetch pull requests from configured repositories

use clap::Args;
use scrutin_core::{Config, Secrets};
use scrutin_db::HandoffKey;
use scrutin_github::{fetch_selected, parse_selection, GitHubClient};

use super::open_store;

/// Fetch pull requests and store them keyed by repository
#[derive(Args, Debug)]
pub struct PrsArgs {
    /// Selections as <repo>=<number>, e.g. frontend=123 backend=45
    #[arg(required = true)]
    selections: Vec<String>,
}

impl PrsArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let selections = self
            .selections
            .iter()
            .map(|s| parse_selection(s))
            .collect::<Result<Vec<_>, _>>()?;

        let secrets = Secrets::load()?;
        let client = GitHubClient::from_secrets(&secrets)?;

        let records = fetch_selected(&client, &config.repos, &selections).await?;

        let db = open_store(config).await?;
        db.handoff().put(HandoffKey::GithubPrs, &records).await?;

        for (key, pr) in &records {
            println!("{} ({}) #{}: {}", key, pr.repo, pr.number, pr.title);
            println!(
                "    {} files, {} commits, {} reviews, {} review comments",
                pr.changed_files.len(),
                pr.commits.len(),
                pr.reviews.len(),
                pr.review_comments.len()
            );
        }

        Ok(())
    }
}
