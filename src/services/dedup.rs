use crate::models::CitationRef;
use std::collections::HashSet;

/// Collapses citations to one entry per URI, keeping the first occurrence and
/// its position. Entries without a URI are dropped.
pub fn dedupe_citations(citations: &[CitationRef]) -> Vec<CitationRef> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for citation in citations {
        if citation.uri.trim().is_empty() {
            continue;
        }
        if seen.insert(citation.uri.as_str()) {
            unique.push(citation.clone());
        }
    }
    unique
}
