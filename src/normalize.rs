//! Chunk normalization: transliterate to ASCII, lowercase, and deduplicate
//! while preserving first-occurrence order.
//!
//! The order of the returned chunks drives generation order, so it must stay
//! stable for identical inputs.
use std::collections::HashSet;

use deunicode::deunicode;
use log::debug;

/// Canonical form of a single raw fragment. Returns `None` when nothing
/// printable is left after transliteration.
pub fn normalize_chunk(raw: &str) -> Option<String> {
    let folded = deunicode(raw).to_lowercase();
    let trimmed = folded.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

/// Normalize every fragment and drop exact duplicates, keeping the first one.
pub fn normalize_chunks<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for r in raw {
        let Some(chunk) = normalize_chunk(r.as_ref()) else {
            debug!("dropping empty fragment {:?}", r.as_ref());
            continue;
        };
        if seen.insert(chunk.clone()) {
            out.push(chunk);
        }
    }
    out
}
