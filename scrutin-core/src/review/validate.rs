//! Response validation

use tracing::debug;

/// Header literals every review must contain, in prompt order
pub const REQUIRED_SECTIONS: [&str; 6] = [
    "1. SUMMARY",
    "2. CRITICAL ISSUES",
    "3. RECOMMENDATIONS",
    "4. POSITIVE HIGHLIGHTS",
    "5. DETAILED BREAKDOWN",
    "6. A HIGHLY DETAILED INSTRUCTION GUIDE",
];

/// Outcome of validating one reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    /// Required sections the reply did not contain
    pub missing: Vec<String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Checks a model reply before it is accepted
pub trait ResponseValidator: Send + Sync {
    fn validate(&self, text: &str) -> Validation;
}

/// Accepts a reply only if every header in [`REQUIRED_SECTIONS`] occurs in it
///
/// Matching is an exact substring search anywhere in the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredSections;

impl ResponseValidator for RequiredSections {
    fn validate(&self, text: &str) -> Validation {
        let mut missing = Vec::new();
        for header in REQUIRED_SECTIONS {
            let present = text.contains(header);
            debug!(section = header, present, "Section verification");
            if !present {
                missing.push(header.to_string());
            }
        }
        Validation { missing }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_review() -> String {
        REQUIRED_SECTIONS
            .iter()
            .map(|h| format!("{}\nbody", h))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_complete_review_passes() {
        assert!(RequiredSections.validate(&complete_review()).is_valid());
    }

    #[test]
    fn test_missing_sections_reported() {
        let text = "1. SUMMARY\n2. CRITICAL ISSUES\n5. DETAILED BREAKDOWN";
        let result = RequiredSections.validate(text);
        assert!(!result.is_valid());
        assert_eq!(
            result.missing,
            vec![
                "3. RECOMMENDATIONS",
                "4. POSITIVE HIGHLIGHTS",
                "6. A HIGHLY DETAILED INSTRUCTION GUIDE",
            ]
        );
    }

    #[test]
    fn test_headers_match_anywhere_but_exact_case() {
        let inline = format!("intro {} outro", complete_review().replace('\n', " "));
        assert!(RequiredSections.validate(&inline).is_valid());

        let lower = complete_review().to_lowercase();
        assert_eq!(RequiredSections.validate(&lower).missing.len(), 6);
    }
}
