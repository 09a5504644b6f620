//! Review step - assemble stored state and generate the review

use std::collections::BTreeMap;
use std::sync::Arc;

use clap::Args;
use scrutin_core::review::ReviewGenerator;
use scrutin_core::{
    Config, Error, GeminiBackend, GeneratedReview, PromptBuilder, PullRequestRecord,
    ReferenceCatalog, ReferenceContents, ReviewInput, Secrets, TicketRecord,
};
use scrutin_db::{HandoffKey, HandoffStore};
use scrutin_jira::is_placeholder;
use tracing::{info, warn};

use super::open_store;
use super::show::print_review;

/// Generate a review from everything stored by the previous steps
#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Repository key whose PR is reviewed (defaults to the first stored)
    #[arg(short, long)]
    pub repo: Option<String>,
}

/// First ticket that was fetched successfully, else the first ticket
pub(crate) fn primary_ticket(tickets: Vec<TicketRecord>) -> Option<TicketRecord> {
    let index = tickets.iter().position(|t| !is_placeholder(t)).unwrap_or(0);
    tickets.into_iter().nth(index)
}

/// PR for `repo` if given, else the first by repo key
pub(crate) fn primary_pr(
    mut prs: BTreeMap<String, PullRequestRecord>,
    repo: Option<&str>,
) -> anyhow::Result<Option<PullRequestRecord>> {
    match repo {
        Some(key) => prs
            .remove(key)
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("No pull request stored for repository {}", key)),
        None => Ok(prs.into_values().next()),
    }
}

/// Keys in `all` other than `kept`
pub(crate) fn dropped_keys<'a>(all: impl IntoIterator<Item = &'a str>, kept: &str) -> Vec<String> {
    all.into_iter()
        .filter(|key| *key != kept)
        .map(str::to_string)
        .collect()
}

/// Build the review input from the hand-off store
pub(crate) async fn assemble_input(
    store: &HandoffStore<'_>,
    catalog: &ReferenceCatalog,
    repo: Option<&str>,
) -> anyhow::Result<ReviewInput> {
    let tickets: Vec<TicketRecord> = store
        .get(HandoffKey::JiraTickets)
        .await?
        .unwrap_or_default();
    let prs: BTreeMap<String, PullRequestRecord> = store
        .get(HandoffKey::GithubPrs)
        .await?
        .unwrap_or_default();
    let files: Option<String> = store.get(HandoffKey::ConcatenatedFiles).await?;
    let references: ReferenceContents = store
        .get(HandoffKey::ReferenceContents)
        .await?
        .unwrap_or_default();

    let files = files
        .filter(|f| !f.is_empty())
        .ok_or_else(|| Error::Input("No files provided for review".to_string()))?;

    if tickets.is_empty() {
        warn!("No tickets stored; reviewing without a ticket");
    }
    if prs.is_empty() {
        warn!("No pull requests stored; reviewing without a PR");
    }

    let mut input = ReviewInput::new()
        .with_concatenated_files(files)
        .with_reference_files(catalog.resolve_documents(&references));

    let ticket_keys: Vec<String> = tickets.iter().map(|t| t.key.clone()).collect();
    if let Some(ticket) = primary_ticket(tickets) {
        info!(key = %ticket.key, "Primary ticket selected");
        let dropped = dropped_keys(ticket_keys.iter().map(String::as_str), &ticket.key);
        if !dropped.is_empty() {
            warn!(
                kept = %ticket.key,
                dropped = ?dropped,
                "Only one ticket is reviewed; others left out of the prompt"
            );
        }
        input = input.with_ticket(ticket);
    }

    let repo_keys: Vec<String> = prs.keys().cloned().collect();
    let kept_repo = match repo {
        Some(key) => Some(key.to_string()),
        None => repo_keys.first().cloned(),
    };
    if let Some(pr) = primary_pr(prs, repo)? {
        info!(repo = %pr.repo, number = pr.number, "Primary pull request selected");
        if let Some(kept) = &kept_repo {
            let dropped = dropped_keys(repo_keys.iter().map(String::as_str), kept);
            if !dropped.is_empty() {
                warn!(
                    kept = %kept,
                    dropped = ?dropped,
                    "Only one pull request is reviewed; others left out of the prompt"
                );
            }
        }
        input = input.with_pr(pr);
    }

    Ok(input)
}

impl ReviewArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let db = open_store(config).await?;
        let store = db.handoff();
        let catalog = ReferenceCatalog::from_config(config);

        let input = assemble_input(&store, &catalog, self.repo.as_deref()).await?;

        let secrets = Secrets::load()?;
        let backend = GeminiBackend::from_config(&config.llm, secrets.gemini_api_key().as_deref())?;
        let generator = ReviewGenerator::new(Arc::new(backend))
            .with_prompt_builder(PromptBuilder::new().with_persona(config.persona.clone()));

        eprintln!("Generating review with {}...", config.llm.model);
        let review = run_review(&store, &generator, &input).await?;

        print_review(&review);
        Ok(())
    }
}

/// Generate and store a review, clearing the previous result first
pub(crate) async fn run_review(
    store: &HandoffStore<'_>,
    generator: &ReviewGenerator,
    input: &ReviewInput,
) -> anyhow::Result<GeneratedReview> {
    // A failed run must not leave the previous review looking current
    store.remove(HandoffKey::ReviewResult).await?;

    let text = generator.generate(input).await?;
    let review = GeneratedReview::new(text);
    store.put(HandoffKey::ReviewResult, &review).await?;
    Ok(review)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrutin_core::RepoRef;
    use scrutin_db::Database;
    use std::time::Duration;
    use tempfile::TempDir;

    fn ticket(key: &str, summary: &str) -> TicketRecord {
        TicketRecord::new(key, summary, "")
    }

    #[test]
    fn test_primary_ticket_skips_placeholders() {
        let tickets = vec![
            ticket("TS-1", "Error fetching ticket TS-1"),
            ticket("TS-2", "Real work"),
        ];
        assert_eq!(primary_ticket(tickets).unwrap().key, "TS-2");
    }

    #[test]
    fn test_primary_ticket_falls_back_to_first() {
        let tickets = vec![
            ticket("TS-1", "Error fetching ticket TS-1"),
            ticket("TS-2", "Error fetching ticket TS-2"),
        ];
        assert_eq!(primary_ticket(tickets).unwrap().key, "TS-1");
        assert!(primary_ticket(Vec::new()).is_none());
    }

    #[test]
    fn test_dropped_keys() {
        let keys = ["TS-1", "TS-2", "TS-3"];
        assert_eq!(dropped_keys(keys, "TS-2"), vec!["TS-1", "TS-3"]);
        assert!(dropped_keys(["backend"], "backend").is_empty());
    }

    #[test]
    fn test_primary_pr_selection() {
        let mut prs = BTreeMap::new();
        prs.insert(
            "frontend".to_string(),
            PullRequestRecord::new(1, "F", RepoRef::new("o", "app")),
        );
        prs.insert(
            "backend".to_string(),
            PullRequestRecord::new(2, "B", RepoRef::new("o", "api")),
        );

        assert_eq!(primary_pr(prs.clone(), None).unwrap().unwrap().number, 2);
        assert_eq!(
            primary_pr(prs.clone(), Some("frontend")).unwrap().unwrap().number,
            1
        );
        assert!(primary_pr(prs, Some("mobile")).is_err());
        assert!(primary_pr(BTreeMap::new(), None).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_review_clears_previous_result() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path().join("handoff.db")).await.unwrap();
        let store = db.handoff();
        store
            .put(HandoffKey::ReviewResult, &GeneratedReview::new("old review".to_string()))
            .await
            .unwrap();

        let backend = GeminiBackend::with_timeout(
            "http://127.0.0.1:9/v1beta",
            "m",
            "key",
            Duration::from_secs(5),
        )
        .unwrap();
        let generator = ReviewGenerator::new(Arc::new(backend));
        let input = ReviewInput::new().with_concatenated_files("=== a.rs ===\nfn a() {}".to_string());

        assert!(run_review(&store, &generator, &input).await.is_err());
        let stored: Option<GeneratedReview> = store.get(HandoffKey::ReviewResult).await.unwrap();
        assert!(stored.is_none());
    }
}
