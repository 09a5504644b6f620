//! Results step - display the stored review

use clap::Args;
use scrutin_core::{parse_sections, Config, GeneratedReview};
use scrutin_db::HandoffKey;

use super::open_store;

/// Show the most recent review
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Print the raw review text instead of sections
    #[arg(long)]
    pub raw: bool,
}

impl ShowArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let db = open_store(config).await?;
        let review: Option<GeneratedReview> = db.handoff().get(HandoffKey::ReviewResult).await?;

        let Some(review) = review else {
            println!("No review results found. Run `scrutin review` first.");
            return Ok(());
        };

        if self.raw {
            println!("{}", review.review);
        } else {
            print_review(&review);
        }
        Ok(())
    }
}

pub(crate) fn print_review(review: &GeneratedReview) {
    let sections = parse_sections(&review.review);

    for (title, body) in [
        ("Summary", &sections.summary),
        ("Critical Issues", &sections.critical_issues),
        ("Recommendations", &sections.recommendations),
        ("Positive Highlights", &sections.highlights),
        ("Detailed Breakdown", &sections.breakdown),
    ] {
        println!("{}", title);
        println!("{}", "=".repeat(title.len()));
        let body = body.trim();
        if body.is_empty() {
            println!("(none)");
        } else {
            println!("{}", body);
        }
        println!();
    }
}
