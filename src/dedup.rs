//! Combination deduplication.
//!
//! A chunk is dropped when it can be rebuilt by concatenating two or more
//! *other* chunks of the same set (chunks may be reused, the chunk under test
//! may not). Each chunk is judged against the original set, so the order of
//! evaluation never changes which chunks survive.
use std::collections::{HashMap, HashSet};

use log::debug;

/// Memoized "is this string a concatenation of pool members" check.
///
/// The pool is fixed for the lifetime of the checker, so the memo is keyed by
/// the substring alone.
struct CombinationChecker<'a> {
    pool: HashSet<&'a str>,
    memo: HashMap<&'a str, bool>,
}

impl<'a> CombinationChecker<'a> {
    fn new(pool: HashSet<&'a str>) -> Self {
        Self {
            pool,
            memo: HashMap::new(),
        }
    }

    fn is_combination(&mut self, s: &'a str) -> bool {
        if let Some(&hit) = self.memo.get(s) {
            return hit;
        }
        let mut found = false;
        for (i, _) in s.char_indices().skip(1) {
            let (left, right) = s.split_at(i);
            let has_left = self.pool.contains(left);
            let has_right = self.pool.contains(right);
            if (has_left && has_right)
                || (has_left && self.is_combination(right))
                || (has_right && self.is_combination(left))
            {
                found = true;
                break;
            }
        }
        self.memo.insert(s, found);
        found
    }
}

/// True when `s` can be rebuilt from members of `chunks` other than `s`.
pub fn is_combination(s: &str, chunks: &[String]) -> bool {
    let pool: HashSet<&str> = chunks
        .iter()
        .map(String::as_str)
        .filter(|c| *c != s)
        .collect();
    CombinationChecker::new(pool).is_combination(s)
}

/// Keep only the chunks that are not combinations of other chunks.
pub fn dedup_chunks(chunks: &[String]) -> Vec<String> {
    chunks
        .iter()
        .filter(|s| {
            let redundant = is_combination(s, chunks);
            if redundant {
                debug!("dropping combined chunk {:?}", s);
            }
            !redundant
        })
        .cloned()
        .collect()
}
