//! Fetching PRs across the configured repositories

use std::collections::BTreeMap;
use std::str::FromStr;

use futures::future::try_join_all;
use scrutin_core::config::RepoConfig;
use scrutin_core::PullRequestRecord;
use tracing::info;

use crate::{Error, PullRequestSource, Result};

/// One requested PR: a configured repo key and a PR number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrSelection {
    pub key: String,
    pub number: u64,
}

impl FromStr for PrSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_selection(s)
    }
}

/// Parse `KEY=NUMBER` or `KEY#NUMBER`
pub fn parse_selection(arg: &str) -> Result<PrSelection> {
    let (key, number) = arg
        .split_once('=')
        .or_else(|| arg.split_once('#'))
        .ok_or_else(|| {
            Error::Parse(format!(
                "Invalid PR selection: {}. Expected <repo>=<number>",
                arg
            ))
        })?;

    let key = key.trim();
    if key.is_empty() {
        return Err(Error::Parse(format!("Missing repository key in: {}", arg)));
    }

    let number = number
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Parse(format!("Invalid PR number in: {}", arg)))?;

    Ok(PrSelection {
        key: key.to_string(),
        number,
    })
}

/// Fetch every selected PR concurrently, keyed by repo key
///
/// The first failure aborts the batch and is reported as
/// `"<Key> PR Error: <message>"`.
pub async fn fetch_selected<S>(
    source: &S,
    repos: &BTreeMap<String, RepoConfig>,
    selections: &[PrSelection],
) -> Result<BTreeMap<String, PullRequestRecord>>
where
    S: PullRequestSource + ?Sized,
{
    if selections.is_empty() {
        return Err(Error::Input(
            "Please enter at least one PR number".to_string(),
        ));
    }

    let mut seen = BTreeMap::new();
    for selection in selections {
        let repo = repos.get(&selection.key).ok_or_else(|| {
            Error::Input(format!("Unknown repository key: {}", selection.key))
        })?;
        if seen.insert(selection.key.as_str(), repo.repo_ref()).is_some() {
            return Err(Error::Input(format!(
                "Repository {} selected more than once",
                selection.key
            )));
        }
    }

    let fetches = selections.iter().map(|selection| {
        let repo = &seen[selection.key.as_str()];
        async move {
            source
                .fetch_pr(repo, selection.number)
                .await
                .map(|record| (selection.key.clone(), record))
                .map_err(|e| Error::for_repo(&selection.key, e))
        }
    });

    let records: BTreeMap<_, _> = try_join_all(fetches).await?.into_iter().collect();
    info!(count = records.len(), "Fetched selected pull requests");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scrutin_core::RepoRef;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        missing: Option<u64>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PullRequestSource for FakeSource {
        async fn fetch_pr(&self, repo: &RepoRef, number: u64) -> Result<PullRequestRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.missing == Some(number) {
                return Err(Error::PrNotFound(number));
            }
            Ok(PullRequestRecord::new(number, format!("PR {}", number), repo.clone()))
        }
    }

    fn repos() -> BTreeMap<String, RepoConfig> {
        scrutin_core::Config::default().repos
    }

    fn select(key: &str, number: u64) -> PrSelection {
        PrSelection {
            key: key.to_string(),
            number,
        }
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("frontend=42").unwrap(), select("frontend", 42));
        assert_eq!(parse_selection("backend#7").unwrap(), select("backend", 7));
        assert!(parse_selection("frontend").is_err());
        assert!(parse_selection("=5").is_err());
        assert!(parse_selection("frontend=abc").is_err());
    }

    #[tokio::test]
    async fn test_fetch_keyed_by_repo() {
        let source = FakeSource {
            missing: None,
            calls: AtomicUsize::new(0),
        };
        let records = fetch_selected(
            &source,
            &repos(),
            &[select("frontend", 1), select("backend", 2)],
        )
        .await
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records["frontend"].repo.name, "tempstars-app");
        assert_eq!(records["backend"].number, 2);
    }

    #[tokio::test]
    async fn test_failure_names_repo() {
        let source = FakeSource {
            missing: Some(2),
            calls: AtomicUsize::new(0),
        };
        let err = fetch_selected(
            &source,
            &repos(),
            &[select("frontend", 1), select("backend", 2)],
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Backend PR Error: Pull request #2 not found");
    }

    #[tokio::test]
    async fn test_empty_and_unknown_rejected_before_fetching() {
        let source = FakeSource {
            missing: None,
            calls: AtomicUsize::new(0),
        };

        let err = fetch_selected(&source, &repos(), &[]).await.unwrap_err();
        assert!(matches!(err, Error::Input(_)));

        let err = fetch_selected(&source, &repos(), &[select("mobile", 1)])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown repository key: mobile"));

        let err = fetch_selected(
            &source,
            &repos(),
            &[select("frontend", 1), select("frontend", 2)],
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));

        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
