//! Records passed through the review pipeline
//!
//! Every record here is built fresh per wizard run, read by the formatters and
//! never mutated by them. Field names serialize in camelCase so the JSON dumps
//! embedded in the prompt and stored as hand-off state match what the ticket
//! and pull request services return.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A ticket as fetched from the issue tracker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    /// Ticket key, e.g. `PROJ-123`
    pub key: String,
    /// One-line summary
    pub summary: String,
    /// Full description (empty when the tracker has none)
    #[serde(default)]
    pub description: String,
}

impl TicketRecord {
    /// Create a ticket record
    pub fn new(
        key: impl Into<String>,
        summary: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            description: description.into(),
        }
    }
}

/// Repository a pull request belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Change status of a file in a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Removed => "removed",
            FileStatus::Renamed => "renamed",
            FileStatus::Copied => "copied",
            FileStatus::Changed => "changed",
            FileStatus::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file touched by a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub filename: String,
    pub status: FileStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<u64>,
}

impl FileChange {
    pub fn new(filename: impl Into<String>, status: FileStatus) -> Self {
        Self {
            filename: filename.into(),
            status,
            patch: None,
            additions: None,
            deletions: None,
            changes: None,
        }
    }

    /// Set addition/deletion counts (and the derived total)
    pub fn with_counts(mut self, additions: u64, deletions: u64) -> Self {
        self.additions = Some(additions);
        self.deletions = Some(deletions);
        self.changes = Some(additions + deletions);
        self
    }
}

/// A commit on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl CommitInfo {
    /// First seven characters of the SHA
    pub fn short_sha(&self) -> &str {
        match self.sha.char_indices().nth(7) {
            Some((idx, _)) => &self.sha[..idx],
            None => &self.sha,
        }
    }
}

/// An inline review comment on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInfo {
    pub id: u64,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A submitted review on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInfo {
    pub id: u64,
    /// APPROVED, CHANGES_REQUESTED, COMMENTED, ...
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Pull request details as gathered from the code host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestRecord {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub repo: RepoRef,
    #[serde(default)]
    pub changed_files: Vec<FileChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_merged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mergeable: Option<bool>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub commits: Vec<CommitInfo>,
    #[serde(default)]
    pub review_comments: Vec<CommentInfo>,
    #[serde(default)]
    pub reviews: Vec<ReviewInfo>,
}

impl PullRequestRecord {
    /// Create a record with only the required fields set
    pub fn new(number: u64, title: impl Into<String>, repo: RepoRef) -> Self {
        Self {
            number,
            title: title.into(),
            repo,
            ..Self::default()
        }
    }

    pub fn merged(&self) -> bool {
        self.is_merged.unwrap_or(false)
    }
}

/// Category of a reference document
///
/// Known categories get a dedicated label in the prompt; anything else is
/// carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReferenceKind {
    Schema,
    BusinessContext,
    CodingStandard,
    Other(String),
}

impl ReferenceKind {
    pub fn as_str(&self) -> &str {
        match self {
            ReferenceKind::Schema => "schema",
            ReferenceKind::BusinessContext => "business-context",
            ReferenceKind::CodingStandard => "coding-standard",
            ReferenceKind::Other(other) => other,
        }
    }
}

impl From<String> for ReferenceKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "schema" => ReferenceKind::Schema,
            "business-context" => ReferenceKind::BusinessContext,
            "coding-standard" => ReferenceKind::CodingStandard,
            _ => ReferenceKind::Other(value),
        }
    }
}

impl From<&str> for ReferenceKind {
    fn from(value: &str) -> Self {
        ReferenceKind::from(value.to_string())
    }
}

impl From<ReferenceKind> for String {
    fn from(kind: ReferenceKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference document injected into the prompt for extra grounding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDocument {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ReferenceKind,
    pub name: String,
    pub content: String,
}

impl ReferenceDocument {
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<ReferenceKind>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Everything the prompt builder and review generator consume
///
/// Absent inputs are explicit `None`/empty values chosen by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewInput {
    pub ticket: Option<TicketRecord>,
    pub pr: Option<PullRequestRecord>,
    pub concatenated_files: String,
    pub reference_files: Vec<ReferenceDocument>,
}

impl ReviewInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ticket(mut self, ticket: TicketRecord) -> Self {
        self.ticket = Some(ticket);
        self
    }

    pub fn with_pr(mut self, pr: PullRequestRecord) -> Self {
        self.pr = Some(pr);
        self
    }

    pub fn with_concatenated_files(mut self, files: impl Into<String>) -> Self {
        self.concatenated_files = files.into();
        self
    }

    pub fn with_reference_files(mut self, references: Vec<ReferenceDocument>) -> Self {
        self.reference_files = references;
        self
    }
}

/// Stored result of a review run
///
/// `suggestions` and `score` are never populated; they are kept so stored
/// results keep the shape existing consumers read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedReview {
    pub review: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub score: u32,
}

impl GeneratedReview {
    pub fn new(review: impl Into<String>) -> Self {
        Self {
            review: review.into(),
            suggestions: Vec::new(),
            score: 0,
        }
    }
}

/// Five-section view of a review, derived for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSections {
    pub summary: String,
    pub critical_issues: String,
    pub recommendations: String,
    pub highlights: String,
    pub breakdown: String,
}

/// `{success, data?, error?}` envelope used wherever an outcome leaves the process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T, E: fmt::Display> From<std::result::Result<T, E>> for ApiResponse<T> {
    fn from(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(data) => ApiResponse::ok(data),
            Err(e) => ApiResponse::err(e.to_string()),
        }
    }
}

/// Render an optional timestamp the way the code host reports it
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_kind_round_trips_known_and_unknown() {
        let kinds: Vec<ReferenceKind> =
            serde_json::from_str(r#"["schema","business-context","coding-standard","runbook"]"#)
                .unwrap();
        assert_eq!(
            kinds,
            vec![
                ReferenceKind::Schema,
                ReferenceKind::BusinessContext,
                ReferenceKind::CodingStandard,
                ReferenceKind::Other("runbook".to_string()),
            ]
        );
        assert_eq!(
            serde_json::to_string(&kinds[3]).unwrap(),
            r#""runbook""#
        );
    }

    #[test]
    fn test_pull_request_serializes_camel_case_and_skips_absent() {
        let pr = PullRequestRecord::new(7, "Add login", RepoRef::new("acme", "api"));
        let json = serde_json::to_value(&pr).unwrap();
        assert_eq!(json["changedFiles"], serde_json::json!([]));
        assert_eq!(json["repo"]["owner"], "acme");
        assert!(json.get("author").is_none());
        assert!(json.get("isMerged").is_none());
    }

    #[test]
    fn test_pull_request_deserializes_with_missing_lists() {
        let pr: PullRequestRecord = serde_json::from_str(
            r#"{"number":3,"title":"t","repo":{"owner":"o","name":"n"},"isMerged":true}"#,
        )
        .unwrap();
        assert!(pr.merged());
        assert!(pr.commits.is_empty());
        assert_eq!(pr.description, "");
    }

    #[test]
    fn test_short_sha() {
        let commit = CommitInfo {
            sha: "abcdef1234567".to_string(),
            message: "m".to_string(),
            author: None,
            date: None,
        };
        assert_eq!(commit.short_sha(), "abcdef1");

        let short = CommitInfo {
            sha: "abc".to_string(),
            ..commit
        };
        assert_eq!(short.short_sha(), "abc");
    }

    #[test]
    fn test_generated_review_shape() {
        let review = GeneratedReview::new("text");
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"review": "text", "suggestions": [], "score": 0})
        );
    }

    #[test]
    fn test_api_response_from_result() {
        let ok: ApiResponse<String> = Ok::<_, crate::Error>("done".to_string()).into();
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"success": true, "data": "done"})
        );

        let err: ApiResponse<String> =
            Err::<String, _>(crate::Error::Input("bad".to_string())).into();
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"success": false, "error": "bad"})
        );
    }
}
