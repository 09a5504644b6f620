//! File step - browse local checkouts and concatenate a selection

use std::path::PathBuf;

use clap::{Args, Subcommand};
use scrutin_core::{Config, FileNode, FileReader, PullRequestRecord};
use scrutin_db::HandoffKey;
use std::collections::BTreeMap;

use super::open_store;

/// Local file commands
#[derive(Args, Debug)]
pub struct FilesArgs {
    #[command(subcommand)]
    pub command: FilesCommand,
}

#[derive(Subcommand, Debug)]
pub enum FilesCommand {
    /// List a directory tree
    Tree {
        /// Directory to list (defaults to the repo's local_path)
        path: Option<PathBuf>,

        /// Configured repository whose local checkout to list
        #[arg(short, long)]
        repo: Option<String>,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Concatenate files and store the result for the review
    Concat {
        /// Files to include, in order
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Show files changed by the stored pull requests
    Changed,
}

impl FilesArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let reader = FileReader::from_config(&config.files);

        match &self.command {
            FilesCommand::Tree { path, repo, json } => {
                let dir = match (path, repo) {
                    (Some(path), _) => path.clone(),
                    (None, Some(key)) => config.repo(key)?.local_path.clone().ok_or_else(|| {
                        anyhow::anyhow!("Repository {} has no local_path configured", key)
                    })?,
                    (None, None) => anyhow::bail!("Provide a path or --repo"),
                };

                let tree = reader.read_tree(&dir).await?;
                if *json {
                    println!("{}", serde_json::to_string_pretty(&tree)?);
                } else {
                    println!("{}", dir.display());
                    print_tree(&tree, 1);
                }
            }
            FilesCommand::Concat { paths } => {
                let content = reader.concatenate(paths).await?;

                let db = open_store(config).await?;
                db.handoff()
                    .put(HandoffKey::ConcatenatedFiles, &content)
                    .await?;

                println!(
                    "Concatenated {} files ({} characters).",
                    paths.len(),
                    content.chars().count()
                );
            }
            FilesCommand::Changed => {
                let db = open_store(config).await?;
                let prs: Option<BTreeMap<String, PullRequestRecord>> =
                    db.handoff().get(HandoffKey::GithubPrs).await?;

                let Some(prs) = prs else {
                    println!("No pull requests stored. Run `scrutin prs` first.");
                    return Ok(());
                };

                for (key, pr) in &prs {
                    println!("{} #{}:", key, pr.number);
                    for file in &pr.changed_files {
                        println!("  [{}] {}", file.status, file.filename);
                    }
                }
            }
        }

        Ok(())
    }
}

fn print_tree(nodes: &[FileNode], depth: usize) {
    for node in nodes {
        let suffix = if node.is_directory { "/" } else { "" };
        println!("{}{}{}", "  ".repeat(depth), node.name, suffix);
        if let Some(ref children) = node.children {
            print_tree(children, depth + 1);
        }
    }
}
