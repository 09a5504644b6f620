//! Prompt preview - render the prompt without calling the model

use std::path::PathBuf;

use clap::Args;
use scrutin_core::review::{estimate_tokens, with_reinforcement, MAX_PROMPT_TOKENS};
use scrutin_core::{Config, PromptBuilder, ReferenceCatalog};

use super::open_store;
use super::review::assemble_input;

/// Print the review prompt built from the stored state
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Repository key whose PR is included (defaults to the first stored)
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Write the prompt to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl PreviewArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let db = open_store(config).await?;
        let catalog = ReferenceCatalog::from_config(config);
        let input = assemble_input(&db.handoff(), &catalog, self.repo.as_deref()).await?;

        let prompt = PromptBuilder::new()
            .with_persona(config.persona.clone())
            .build(&input);

        match &self.output {
            Some(path) => {
                tokio::fs::write(path, &prompt).await?;
                println!("Wrote prompt to {}", path.display());
            }
            None => println!("{}", prompt),
        }

        eprintln!("{}", size_line(&prompt));
        Ok(())
    }
}

/// Size summary for the prompt as it would be submitted
fn size_line(prompt: &str) -> String {
    let submitted = with_reinforcement(prompt);
    format!(
        "Prompt: {} characters, ~{} tokens as submitted (limit {})",
        submitted.chars().count(),
        estimate_tokens(&submitted),
        MAX_PROMPT_TOKENS
    )
}
