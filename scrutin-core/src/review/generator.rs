//! Review generator

use std::sync::{Arc, LazyLock};

use tracing::{debug, info, warn};

use crate::model::{ApiResponse, ReviewInput};
use crate::prompt::PromptBuilder;
use crate::{Error, Result};

use super::backend::GenerationBackend;
use super::retry::{ImmediateRetry, RetryPolicy};
use super::validate::{RequiredSections, ResponseValidator, REQUIRED_SECTIONS};

/// Largest prompt, in estimated tokens, that will be submitted
pub const MAX_PROMPT_TOKENS: usize = 1_800_000;

/// Appended to every prompt to restate the mandatory headers
pub static REINFORCEMENT_SUFFIX: LazyLock<String> = LazyLock::new(|| {
    format!(
        "\n\nIMPORTANT: Your response MUST include these exact section headers in this order:\n{}\n\n\
         Each section is required and must maintain this exact naming. Do not skip any sections.",
        REQUIRED_SECTIONS.join("\n")
    )
});

/// `prompt` as submitted, with the reinforcement suffix appended
pub fn with_reinforcement(prompt: &str) -> String {
    let mut submitted = String::with_capacity(prompt.len() + REINFORCEMENT_SUFFIX.len());
    submitted.push_str(prompt);
    submitted.push_str(&REINFORCEMENT_SUFFIX);
    submitted
}

/// Token estimate used for the size gate: one token per four characters, rounded up
pub fn estimate_tokens(prompt: &str) -> usize {
    prompt.chars().count().div_ceil(4)
}

/// Produces a validated review for a [`ReviewInput`]
pub struct ReviewGenerator {
    backend: Arc<dyn GenerationBackend>,
    prompt: PromptBuilder,
    policy: Box<dyn RetryPolicy>,
    validator: Box<dyn ResponseValidator>,
    max_prompt_tokens: usize,
}

impl ReviewGenerator {
    /// Create a generator with immediate retries and required-section validation
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            prompt: PromptBuilder::new(),
            policy: Box::new(ImmediateRetry::default()),
            validator: Box::new(RequiredSections),
            max_prompt_tokens: MAX_PROMPT_TOKENS,
        }
    }

    pub fn with_prompt_builder(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_retry_policy(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn with_validator(mut self, validator: impl ResponseValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn with_max_prompt_tokens(mut self, max: usize) -> Self {
        self.max_prompt_tokens = max;
        self
    }

    /// Full text submitted to the backend for `input`
    pub fn prompt_for(&self, input: &ReviewInput) -> String {
        with_reinforcement(&self.prompt.build(input))
    }

    /// Generate a review, retrying under the configured policy
    ///
    /// Oversized prompts fail with [`Error::Input`] before any request is
    /// made. Transport and format failures are retried; if every attempt
    /// fails the last such error is returned, otherwise a validation error
    /// naming the attempt count.
    pub async fn generate(&self, input: &ReviewInput) -> Result<String> {
        info!(
            has_ticket = input.ticket.is_some(),
            has_pr = input.pr.is_some(),
            files_chars = input.concatenated_files.len(),
            references = input.reference_files.len(),
            backend = self.backend.name(),
            model = self.backend.model(),
            "Generating review"
        );

        let prompt = self.prompt_for(input);
        let estimated = estimate_tokens(&prompt);
        debug!(estimated_tokens = estimated, "Estimated prompt size");

        if estimated > self.max_prompt_tokens {
            return Err(Error::Input(format!(
                "Prompt too large ({} tokens). Maximum allowed is {} tokens.",
                estimated, self.max_prompt_tokens
            )));
        }

        let attempts = self.policy.max_attempts();
        let mut last_error: Option<Error> = None;

        for attempt in 0..attempts {
            let delay = self.policy.delay(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let temperature = self.policy.temperature(attempt);
            debug!(attempt = attempt + 1, temperature, "Requesting review");

            match self.backend.generate(&prompt, temperature).await {
                Ok(text) => {
                    let verdict = self.validator.validate(&text);
                    if verdict.is_valid() {
                        info!(attempt = attempt + 1, chars = text.len(), "Review generated");
                        return Ok(text);
                    }
                    warn!(
                        attempt = attempt + 1,
                        missing = ?verdict.missing,
                        "Review is missing required sections, retrying"
                    );
                }
                Err(e) if e.is_retryable() => {
                    warn!(attempt = attempt + 1, error = %e, "Review attempt failed");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::Validation(format!(
                "Failed to generate valid review after {} attempts",
                attempts
            ))
        }))
    }

    /// [`generate`](Self::generate) wrapped in the success/error envelope
    pub async fn generate_response(&self, input: &ReviewInput) -> ApiResponse<String> {
        self.generate(input).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TicketRecord;
    use crate::review::Validation;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned outcomes and records every call
    struct ScriptedBackend {
        script: Mutex<VecDeque<Result<String>>>,
        temperatures: Mutex<Vec<f64>>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                temperatures: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.temperatures.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        async fn generate(&self, _prompt: &str, temperature: f64) -> Result<String> {
            self.temperatures.lock().unwrap().push(temperature);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Transport("script exhausted".to_string())))
        }
    }

    fn complete_review() -> String {
        REQUIRED_SECTIONS
            .iter()
            .map(|h| format!("## {}\ncontent", h))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn input() -> ReviewInput {
        ReviewInput::new()
            .with_ticket(TicketRecord::new("T-1", "S", "D"))
            .with_concatenated_files("=== a.ts ===\nx\n=== End a.ts ===")
    }

    #[tokio::test]
    async fn test_first_valid_reply_is_returned() {
        let backend = ScriptedBackend::new(vec![Ok(complete_review())]);
        let generator = ReviewGenerator::new(backend.clone());

        let text = generator.generate(&input()).await.unwrap();
        assert_eq!(text, complete_review());
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_incomplete_reply_is_retried_with_cooler_temperature() {
        let backend = ScriptedBackend::new(vec![
            Ok("1. SUMMARY only".to_string()),
            Err(Error::Format("Unexpected response format from Gemini API".to_string())),
            Ok(complete_review()),
        ]);
        let generator = ReviewGenerator::new(backend.clone());

        assert!(generator.generate(&input()).await.is_ok());
        let temps = backend.temperatures.lock().unwrap().clone();
        assert_eq!(temps.len(), 3);
        assert!((temps[0] - 0.7).abs() < 1e-9);
        assert!((temps[1] - 0.6).abs() < 1e-9);
        assert!((temps[2] - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_always_incomplete_fails_after_three_attempts() {
        let backend = ScriptedBackend::new(vec![
            Ok("nothing".to_string()),
            Ok("nothing".to_string()),
            Ok("nothing".to_string()),
        ]);
        let generator = ReviewGenerator::new(backend.clone());

        let err = generator.generate(&input()).await.unwrap_err();
        assert_eq!(backend.calls(), 3);
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Failed to generate valid review after 3 attempts"
        );
    }

    #[tokio::test]
    async fn test_rejecting_validator_exhausts_budget() {
        struct RejectAll;

        impl ResponseValidator for RejectAll {
            fn validate(&self, _text: &str) -> Validation {
                Validation {
                    missing: vec!["everything".to_string()],
                }
            }
        }

        let backend = ScriptedBackend::new(vec![
            Ok(complete_review()),
            Ok(complete_review()),
            Ok(complete_review()),
            Ok(complete_review()),
        ]);
        let generator = ReviewGenerator::new(backend.clone()).with_validator(RejectAll);

        let response = generator.generate_response(&input()).await;
        assert!(!response.success);
        assert_eq!(
            response.error.as_deref(),
            Some("Failed to generate valid review after 3 attempts")
        );
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_last_transport_error_is_reported() {
        let backend = ScriptedBackend::new(vec![
            Err(Error::Transport("Gemini API error: Bad Gateway".to_string())),
            Ok("incomplete".to_string()),
            Err(Error::Transport("Gemini API error: Service Unavailable".to_string())),
        ]);
        let generator = ReviewGenerator::new(backend.clone());

        let err = generator.generate(&input()).await.unwrap_err();
        assert_eq!(backend.calls(), 3);
        assert_eq!(err.to_string(), "Gemini API error: Service Unavailable");
    }

    #[tokio::test]
    async fn test_oversized_prompt_never_reaches_backend() {
        let backend = ScriptedBackend::new(vec![Ok(complete_review())]);
        let generator = ReviewGenerator::new(backend.clone());
        let big = input().with_concatenated_files("x".repeat(4 * MAX_PROMPT_TOKENS + 1));

        let err = generator.generate(&big).await.unwrap_err();
        assert_eq!(backend.calls(), 0);
        assert!(matches!(err, Error::Input(_)));
        let msg = err.to_string();
        assert!(msg.starts_with("Prompt too large ("));
        assert!(msg.ends_with("Maximum allowed is 1800000 tokens."));
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let backend = ScriptedBackend::new(vec![
            Err(Error::Config("no key".to_string())),
            Ok(complete_review()),
        ]);
        let generator = ReviewGenerator::new(backend.clone());

        let err = generator.generate(&input()).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_response_envelope() {
        let backend = ScriptedBackend::new(vec![Ok(complete_review())]);
        let generator = ReviewGenerator::new(backend);
        let response = generator.generate_response(&input()).await;
        assert!(response.success);
        assert_eq!(response.data.as_deref(), Some(complete_review().as_str()));

        let backend = ScriptedBackend::new(vec![]);
        let generator = ReviewGenerator::new(backend);
        let response = generator.generate_response(&input()).await;
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("script exhausted"));
    }

    #[test]
    fn test_prompt_ends_with_reinforcement() {
        let backend = ScriptedBackend::new(vec![]);
        let generator = ReviewGenerator::new(backend);
        let prompt = generator.prompt_for(&input());
        assert!(prompt.ends_with("Do not skip any sections."));
        assert!(prompt.contains(
            "in this order:\n1. SUMMARY\n2. CRITICAL ISSUES\n3. RECOMMENDATIONS\n\
             4. POSITIVE HIGHLIGHTS\n5. DETAILED BREAKDOWN\n6. A HIGHLY DETAILED INSTRUCTION GUIDE\n\n"
        ));
    }

    #[test]
    fn test_reinforced_prompt_matches_submitted_prompt() {
        let backend = ScriptedBackend::new(vec![]);
        let generator = ReviewGenerator::new(backend);
        let bare = PromptBuilder::new().build(&input());
        let submitted = generator.prompt_for(&input());

        assert_eq!(with_reinforcement(&bare), submitted);
        assert!(estimate_tokens(&submitted) > estimate_tokens(&bare));
    }

    #[test]
    fn test_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("éééé"), 1);
    }
}
