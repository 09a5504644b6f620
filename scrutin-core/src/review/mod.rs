//! Review generation
//!
//! The generator submits the assembled prompt to a [`GenerationBackend`],
//! checks that the reply carries every required section header, and retries
//! under a [`RetryPolicy`] until a reply validates or the attempt budget runs
//! out. The section parser splits a stored review into its display sections.

mod backend;
mod generator;
mod retry;
mod sections;
mod validate;

pub use backend::{GeminiBackend, GenerationBackend};
pub use generator::{
    estimate_tokens, with_reinforcement, ReviewGenerator, MAX_PROMPT_TOKENS, REINFORCEMENT_SUFFIX,
};
pub use retry::{ImmediateRetry, RetryPolicy};
pub use sections::parse_sections;
pub use validate::{RequiredSections, ResponseValidator, Validation, REQUIRED_SECTIONS};
