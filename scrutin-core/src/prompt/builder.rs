//! Review prompt builder

use serde::{Deserialize, Serialize};

use crate::model::{ReviewInput, TicketRecord};

use super::pr::format_pr;
use super::reference::format_references;
use super::template::{render, TemplateVars};

const REVIEW_TEMPLATE: &str = include_str!("templates/review.md");

/// Team context woven into the reviewer preamble
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Persona {
    /// Organization the reviewer works for
    pub organization: String,
    /// What the organization builds, phrased to follow the organization name
    pub product: String,
    /// How the concatenated files are laid out across repositories
    pub repository_note: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            organization: "TempStars".to_string(),
            product: "a web and mobile based two-sided marketplace platform that connects \
                      dental offices with dental professionals for temping and hiring"
                .to_string(),
            repository_note: "Note: The TempStars repo is split into 'tempstars-api' (backend) \
                              and 'tempstars-app' (frontend) repos, so you will see paths that \
                              start with either name. During development both repos are used."
                .to_string(),
        }
    }
}

fn ticket_json(ticket: Option<&TicketRecord>) -> String {
    match ticket {
        // Plain string fields always serialize
        Some(ticket) => serde_json::to_string_pretty(ticket).unwrap_or_else(|_| "{}".to_string()),
        None => "{}".to_string(),
    }
}

/// Builds the full review prompt from a [`ReviewInput`]
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    persona: Persona,
}

impl PromptBuilder {
    /// Create a builder with the default persona
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom persona for the preamble
    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    /// Render the prompt
    ///
    /// Sections appear in fixed order (JIRA TICKET, GITHUB PR, CONCATENATED
    /// FILES, ADDITIONAL CONTEXT FILES), each between `=====START <NAME>=====`
    /// and `=====END <NAME>=====`, followed by the review guidelines and the
    /// six-section output structure.
    pub fn build(&self, input: &ReviewInput) -> String {
        let vars = TemplateVars::new()
            .with("ORGANIZATION", self.persona.organization.as_str())
            .with("PRODUCT", self.persona.product.as_str())
            .with("REPOSITORY_NOTE", self.persona.repository_note.as_str())
            .with("JIRA_TICKET", ticket_json(input.ticket.as_ref()))
            .with("GITHUB_PR", format_pr(input.pr.as_ref()))
            .with("CONCATENATED_FILES", input.concatenated_files.as_str())
            .with("ADDITIONAL_CONTEXT", format_references(&input.reference_files));

        render(REVIEW_TEMPLATE.trim_end_matches('\n'), &vars)
    }
}

/// Render the prompt with the default persona
pub fn build_prompt(input: &ReviewInput) -> String {
    PromptBuilder::new().build(input)
}
