//! Splitting a review into display sections

use crate::model::ReviewSections;

#[derive(Clone, Copy)]
enum Section {
    Summary,
    CriticalIssues,
    Recommendations,
    Highlights,
    Breakdown,
}

fn header_in(line: &str) -> Option<Section> {
    if line.contains("1. SUMMARY") {
        Some(Section::Summary)
    } else if line.contains("2. CRITICAL ISSUES") {
        Some(Section::CriticalIssues)
    } else if line.contains("3. RECOMMENDATIONS") {
        Some(Section::Recommendations)
    } else if line.contains("4. POSITIVE HIGHLIGHTS") {
        Some(Section::Highlights)
    } else if line.contains("5. DETAILED BREAKDOWN") {
        Some(Section::Breakdown)
    } else {
        None
    }
}

/// Split review text into its five display sections
///
/// A line containing a header literal anywhere switches the active section;
/// every other line is appended, newline-terminated, to the active section.
/// Lines before the first header are dropped. There is no sixth bucket: the
/// implementation guide lands in `breakdown`, which consumers rely on.
pub fn parse_sections(review: &str) -> ReviewSections {
    let mut sections = ReviewSections::default();
    let mut current: Option<Section> = None;

    for line in review.lines() {
        if let Some(section) = header_in(line) {
            current = Some(section);
            continue;
        }

        let Some(section) = current else {
            continue;
        };

        let target = match section {
            Section::Summary => &mut sections.summary,
            Section::CriticalIssues => &mut sections.critical_issues,
            Section::Recommendations => &mut sections.recommendations,
            Section::Highlights => &mut sections.highlights,
            Section::Breakdown => &mut sections.breakdown,
        };
        target.push_str(line);
        target.push('\n');
    }

    sections
}
