//! Pull request fetching

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::models::pulls::PullRequest as OctocrabPR;
use scrutin_core::{CommentInfo, CommitInfo, FileChange, PullRequestRecord, RepoRef, ReviewInfo};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, GitHubClient, Result};

/// Anything that can produce a full [`PullRequestRecord`]
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    async fn fetch_pr(&self, repo: &RepoRef, number: u64) -> Result<PullRequestRecord>;
}

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
}

const PAGE: PageParams = PageParams { per_page: 100 };

#[derive(Debug, Deserialize)]
struct ApiCommit {
    sha: String,
    commit: ApiCommitDetail,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    message: String,
    author: Option<ApiCommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct ApiCommitAuthor {
    name: Option<String>,
    date: Option<DateTime<Utc>>,
}

impl From<ApiCommit> for CommitInfo {
    fn from(c: ApiCommit) -> Self {
        let (author, date) = match c.commit.author {
            Some(a) => (a.name, a.date),
            None => (None, None),
        };
        CommitInfo {
            sha: c.sha,
            message: c.commit.message,
            author,
            date,
        }
    }
}

fn merge_metadata(mut record: PullRequestRecord, pr: OctocrabPR) -> PullRequestRecord {
    record.number = pr.number;
    record.title = pr.title.unwrap_or_default();
    record.description = pr.body.unwrap_or_default();
    record.author = pr.user.map(|u| u.login);
    record.created_at = pr.created_at;
    record.updated_at = pr.updated_at;
    record.is_merged = Some(pr.merged_at.is_some());
    record.merged_at = pr.merged_at;
    record.mergeable = pr.mergeable;
    record.labels = pr
        .labels
        .unwrap_or_default()
        .into_iter()
        .map(|l| l.name)
        .collect();
    record
}

impl GitHubClient {
    async fn get_pr(&self, repo: &RepoRef, number: u64) -> Result<OctocrabPR> {
        self.client()
            .pulls(&repo.owner, &repo.name)
            .get(number)
            .await
            .map_err(|e| match &e {
                octocrab::Error::GitHub { source, .. } if source.message.contains("Not Found") => {
                    Error::PrNotFound(number)
                }
                _ => Error::Api(e),
            })
    }

    /// Changed files with their patches
    pub async fn get_pr_files(&self, repo: &RepoRef, number: u64) -> Result<Vec<FileChange>> {
        let route = format!("/repos/{}/{}/pulls/{}/files", repo.owner, repo.name, number);
        Ok(self.client().get(route, Some(&PAGE)).await?)
    }

    pub async fn get_pr_commits(&self, repo: &RepoRef, number: u64) -> Result<Vec<CommitInfo>> {
        let route = format!("/repos/{}/{}/pulls/{}/commits", repo.owner, repo.name, number);
        let commits: Vec<ApiCommit> = self.client().get(route, Some(&PAGE)).await?;
        Ok(commits.into_iter().map(CommitInfo::from).collect())
    }

    /// Inline review comments
    pub async fn get_pr_review_comments(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<Vec<CommentInfo>> {
        let comments = self
            .client()
            .pulls(&repo.owner, &repo.name)
            .list_comments(Some(number))
            .per_page(100)
            .send()
            .await?;

        Ok(comments
            .items
            .into_iter()
            .map(|c| CommentInfo {
                id: c.id.0,
                body: c.body,
                path: Some(c.path),
                position: c.position,
                author: c.user.map(|u| u.login),
                created_at: Some(c.created_at),
            })
            .collect())
    }

    /// Submitted reviews
    pub async fn get_pr_reviews(&self, repo: &RepoRef, number: u64) -> Result<Vec<ReviewInfo>> {
        let reviews = self
            .client()
            .pulls(&repo.owner, &repo.name)
            .list_reviews(number)
            .per_page(100)
            .send()
            .await?;

        Ok(reviews
            .items
            .into_iter()
            .map(|r| ReviewInfo {
                id: r.id.0,
                // Wire form, e.g. CHANGES_REQUESTED
                state: r
                    .state
                    .and_then(|s| serde_json::to_value(s).ok())
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_else(|| "UNKNOWN".to_string()),
                author: r.user.map(|u| u.login),
                body: r.body,
                submitted_at: r.submitted_at,
            })
            .collect())
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    async fn fetch_pr(&self, repo: &RepoRef, number: u64) -> Result<PullRequestRecord> {
        debug!(repo = %repo, number, "Fetching pull request");

        let (pr, files, commits, review_comments, reviews) = tokio::try_join!(
            self.get_pr(repo, number),
            self.get_pr_files(repo, number),
            self.get_pr_commits(repo, number),
            self.get_pr_review_comments(repo, number),
            self.get_pr_reviews(repo, number),
        )?;

        let mut record = merge_metadata(PullRequestRecord::new(number, "", repo.clone()), pr);
        record.changed_files = files;
        record.commits = commits;
        record.review_comments = review_comments;
        record.reviews = reviews;

        info!(
            repo = %repo,
            number,
            files = record.changed_files.len(),
            commits = record.commits.len(),
            reviews = record.reviews.len(),
            "Fetched pull request"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrutin_core::FileStatus;

    #[test]
    fn test_files_deserialize_from_api_shape() {
        let json = r#"[
            {"sha": "abc", "filename": "src/a.ts", "status": "modified",
             "additions": 3, "deletions": 1, "changes": 4,
             "patch": "@@ -1 +1 @@", "blob_url": "https://example.test"},
            {"sha": "def", "filename": "logo.png", "status": "added",
             "additions": 0, "deletions": 0, "changes": 0}
        ]"#;
        let files: Vec<FileChange> = serde_json::from_str(json).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].status, FileStatus::Modified);
        assert_eq!(files[0].patch.as_deref(), Some("@@ -1 +1 @@"));
        assert_eq!(files[0].changes, Some(4));
        assert!(files[1].patch.is_none());
    }

    #[test]
    fn test_commit_conversion() {
        let json = r#"{
            "sha": "0123456789abcdef",
            "commit": {
                "message": "Fix login redirect",
                "author": {"name": "Dana", "email": "d@example.test", "date": "2024-03-01T12:00:00Z"}
            }
        }"#;
        let commit: CommitInfo = serde_json::from_str::<ApiCommit>(json).unwrap().into();
        assert_eq!(commit.short_sha(), "0123456");
        assert_eq!(commit.message, "Fix login redirect");
        assert_eq!(commit.author.as_deref(), Some("Dana"));
        assert!(commit.date.is_some());
    }

    #[test]
    fn test_commit_without_author() {
        let json = r#"{"sha": "abc", "commit": {"message": "m", "author": null}}"#;
        let commit: CommitInfo = serde_json::from_str::<ApiCommit>(json).unwrap().into();
        assert!(commit.author.is_none());
        assert!(commit.date.is_none());
    }
}
