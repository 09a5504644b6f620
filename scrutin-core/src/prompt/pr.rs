//! Pull request formatting

use crate::model::{format_timestamp, PullRequestRecord};

/// Text used when no pull request is available
pub const NO_PR_PLACEHOLDER: &str = "No PR information available.";

const UNKNOWN: &str = "Unknown";
const UNKNOWN_DATE: &str = "Unknown date";

fn status_line(pr: &PullRequestRecord) -> &'static str {
    if pr.merged() {
        "Merged"
    } else if pr.mergeable.unwrap_or(false) {
        "Mergeable"
    } else {
        "Not Mergeable"
    }
}

fn date_or_unknown(date: Option<&chrono::DateTime<chrono::Utc>>) -> String {
    date.map(format_timestamp)
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

fn changed_files(pr: &PullRequestRecord) -> String {
    if pr.changed_files.is_empty() {
        return "No files changed".to_string();
    }

    pr.changed_files
        .iter()
        .map(|file| {
            let counts = match (file.additions, file.deletions) {
                (Some(a), Some(d)) => format!(" (+{}/-{})", a, d),
                _ => String::new(),
            };
            format!("- {} ({}{})", file.filename, file.status, counts)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn commits(pr: &PullRequestRecord) -> String {
    if pr.commits.is_empty() {
        return "No commit information available".to_string();
    }

    pr.commits
        .iter()
        .map(|commit| {
            format!(
                "- {}: {} ({}, {})",
                commit.short_sha(),
                commit.message,
                commit.author.as_deref().unwrap_or(UNKNOWN),
                date_or_unknown(commit.date.as_ref()),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn reviews(pr: &PullRequestRecord) -> String {
    if pr.reviews.is_empty() {
        return "No reviews yet".to_string();
    }

    pr.reviews
        .iter()
        .map(|review| {
            let submitted = review
                .submitted_at
                .as_ref()
                .map(|ts| format!("on {}", format_timestamp(ts)))
                .unwrap_or_default();
            format!(
                "- {}: {} {}",
                review.author.as_deref().unwrap_or(UNKNOWN),
                review.state,
                submitted
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a pull request as readable text followed by a full JSON dump
///
/// The merged-at line is left blank unless the PR is merged with a known
/// merge time.
pub fn format_pr(pr: Option<&PullRequestRecord>) -> String {
    let Some(pr) = pr else {
        return NO_PR_PLACEHOLDER.to_string();
    };

    let labels = if pr.labels.is_empty() {
        "None".to_string()
    } else {
        pr.labels.join(", ")
    };

    let merged_at = match (pr.merged(), pr.merged_at.as_ref()) {
        (true, Some(ts)) => format!("Merged at: {}", format_timestamp(ts)),
        _ => String::new(),
    };

    // Serializing plain data with string keys cannot fail
    let full = serde_json::to_string_pretty(pr).unwrap_or_else(|_| "{}".to_string());

    format!(
        "PR #{number}: {title}
Description: {description}
Author: {author}
Created: {created}
Updated: {updated}
Status: {status}
{merged_at}
Labels: {labels}
Changed Files: {count} files modified

Files changed:
{files}

Commits:
{commits}

Reviews:
{reviews}

Full PR Data:
{full}",
        number = pr.number,
        title = pr.title,
        description = pr.description,
        author = pr.author.as_deref().unwrap_or(UNKNOWN),
        created = date_or_unknown(pr.created_at.as_ref()),
        updated = date_or_unknown(pr.updated_at.as_ref()),
        status = status_line(pr),
        count = pr.changed_files.len(),
        files = changed_files(pr),
        commits = commits(pr),
        reviews = reviews(pr),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CommitInfo, FileChange, FileStatus, RepoRef, ReviewInfo};
    use chrono::{TimeZone, Utc};

    fn sample_pr() -> PullRequestRecord {
        PullRequestRecord::new(42, "Add login", RepoRef::new("acme", "api"))
    }

    #[test]
    fn test_absent_pr() {
        assert_eq!(format_pr(None), "No PR information available.");
    }

    #[test]
    fn test_defaults_for_sparse_pr() {
        let out = format_pr(Some(&sample_pr()));
        assert!(out.starts_with("PR #42: Add login\n"));
        assert!(out.contains("Author: Unknown\n"));
        assert!(out.contains("Created: Unknown date\n"));
        assert!(out.contains("Updated: Unknown date\n"));
        assert!(out.contains("Status: Not Mergeable\n\nLabels: None\n"));
        assert!(out.contains("Changed Files: 0 files modified"));
        assert!(out.contains("Files changed:\nNo files changed"));
        assert!(out.contains("Commits:\nNo commit information available"));
        assert!(out.contains("Reviews:\nNo reviews yet"));
    }

    #[test]
    fn test_merged_status_with_merge_time() {
        let mut pr = sample_pr();
        pr.is_merged = Some(true);
        pr.mergeable = Some(true);
        pr.merged_at = Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());

        let out = format_pr(Some(&pr));
        assert!(out.contains("Status: Merged\nMerged at: 2024-03-01T12:00:00Z\n"));
    }

    #[test]
    fn test_merged_without_merge_time_has_blank_line() {
        let mut pr = sample_pr();
        pr.is_merged = Some(true);
        let out = format_pr(Some(&pr));
        assert!(out.contains("Status: Merged\n\nLabels:"));
    }

    #[test]
    fn test_mergeable_status() {
        let mut pr = sample_pr();
        pr.mergeable = Some(true);
        assert!(format_pr(Some(&pr)).contains("Status: Mergeable\n"));
    }

    #[test]
    fn test_lists_render_bullets() {
        let mut pr = sample_pr();
        pr.labels = vec!["bug".to_string(), "urgent".to_string()];
        pr.changed_files = vec![
            FileChange::new("src/a.rs", FileStatus::Modified).with_counts(3, 1),
            FileChange::new("src/b.rs", FileStatus::Added),
        ];
        pr.commits = vec![CommitInfo {
            sha: "0123456789abcdef".to_string(),
            message: "Initial".to_string(),
            author: Some("Ada".to_string()),
            date: None,
        }];
        pr.reviews = vec![
            ReviewInfo {
                id: 1,
                state: "APPROVED".to_string(),
                author: Some("bob".to_string()),
                body: None,
                submitted_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            },
            ReviewInfo {
                id: 2,
                state: "COMMENTED".to_string(),
                author: None,
                body: None,
                submitted_at: None,
            },
        ];

        let out = format_pr(Some(&pr));
        assert!(out.contains("Labels: bug, urgent\n"));
        assert!(out.contains("Changed Files: 2 files modified"));
        assert!(out.contains("- src/a.rs (modified (+3/-1))\n- src/b.rs (added)"));
        assert!(out.contains("- 0123456: Initial (Ada, Unknown date)"));
        assert!(out.contains("- bob: APPROVED on 2024-01-02T03:04:05Z\n- Unknown: COMMENTED "));
    }

    #[test]
    fn test_full_json_dump_is_last() {
        let out = format_pr(Some(&sample_pr()));
        let (_, json) = out.split_once("Full PR Data:\n").unwrap();
        let parsed: PullRequestRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, sample_pr());
    }
}
