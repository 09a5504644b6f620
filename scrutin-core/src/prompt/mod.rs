//! Prompt assembly
//!
//! Turns a [`ReviewInput`](crate::model::ReviewInput) into the single
//! instruction prompt sent to the model. Every function here is pure: the same
//! input always renders byte-identical output.

mod builder;
mod pr;
mod reference;
mod template;

pub use builder::{build_prompt, Persona, PromptBuilder};
pub use pr::{format_pr, NO_PR_PLACEHOLDER};
pub use reference::{format_references, NO_REFERENCES_PLACEHOLDER};
