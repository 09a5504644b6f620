//! `{{NAME}}` placeholder substitution
//!
//! Substitution is a single left-to-right pass over the template. Inserted
//! values are never rescanned, so source files or ticket text that happen to
//! contain `{{SOMETHING}}` come through untouched.

use std::collections::BTreeMap;

/// Variable values for one render
#[derive(Debug, Clone, Default)]
pub(crate) struct TemplateVars {
    values: BTreeMap<&'static str, String>,
}

impl TemplateVars {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_uppercase() || c == '_')
}

/// Render `template`, leaving unknown or malformed placeholders as-is
pub(crate) fn render(template: &str, vars: &TemplateVars) -> String {
    let mut out = String::with_capacity(
        template.len() + vars.values.values().map(String::len).sum::<usize>(),
    );
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        match after.find("}}") {
            Some(end) if is_placeholder_name(&after[..end]) => {
                let name = &after[..end];
                match vars.values.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(name);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            _ => {
                out.push_str("{{");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
