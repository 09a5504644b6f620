//! Reference document formatting

use crate::model::{ReferenceDocument, ReferenceKind};

/// Text used when no reference documents were selected
pub const NO_REFERENCES_PLACEHOLDER: &str = "No additional reference files selected.";

/// Label prefixed to a document's content, chosen by its kind
fn label(doc: &ReferenceDocument) -> String {
    match &doc.kind {
        ReferenceKind::Schema => "Database Schema:".to_string(),
        ReferenceKind::BusinessContext => "Business Context:".to_string(),
        ReferenceKind::CodingStandard => "Design & Coding Standards:".to_string(),
        ReferenceKind::Other(_) => format!("{}:", doc.name),
    }
}

/// Labelled content of one document, without the begin/end markers
pub(crate) fn labelled_content(doc: &ReferenceDocument) -> String {
    format!("{}\n{}", label(doc), doc.content)
}

fn format_one(doc: &ReferenceDocument) -> String {
    format!(
        "\n=== {name} ===\nType: {kind}\n\n{body}\n\n=== End {name} ===\n",
        name = doc.name,
        kind = doc.kind,
        body = labelled_content(doc),
    )
}

/// Format reference documents into one delimited block
///
/// Content is not escaped: a document that itself contains marker text
/// produces an ambiguous block.
pub fn format_references(docs: &[ReferenceDocument]) -> String {
    if docs.is_empty() {
        return NO_REFERENCES_PLACEHOLDER.to_string();
    }

    docs.iter()
        .map(format_one)
        .collect::<Vec<_>>()
        .join("\n\n")
}
