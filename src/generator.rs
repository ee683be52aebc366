//! Lazy candidate generation.
//!
//! Enumeration order, outermost first:
//! 1. chunk count `r` from 1 to `n`;
//! 2. ordered selections of `r` distinct chunk positions, lexicographic;
//! 3. domains, in `DomainSet` order;
//! 4. separator pattern (none for `r == 1`).
//!
//! The whole position lives in [`Cursor`], so a run can be checkpointed,
//! resumed with [`CandidateGenerator::resume`], or split into disjoint shards
//! by permutation rank.
use thiserror::Error;

/// Separators placed between chunks of a local part.
pub const SEPARATORS: [&str; 4] = ["", ".", "_", "-"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeparatorMode {
    /// One separator shared by every gap.
    #[default]
    Normal,
    /// Every gap picks its separator independently.
    Crazy,
}

impl SeparatorMode {
    /// Number of separator slots tracked for `r` chunks.
    fn slots(self, r: usize) -> usize {
        match (r, self) {
            (0 | 1, _) => 0,
            (_, SeparatorMode::Normal) => 1,
            (_, SeparatorMode::Crazy) => r - 1,
        }
    }
}

/// Complete enumeration position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// Number of chunks in the local part.
    pub r: usize,
    /// Chunk positions of the current selection.
    pub permutation: Vec<usize>,
    /// Lexicographic rank of `permutation` among selections of length `r`.
    pub rank: u128,
    /// Index into the domain list.
    pub domain: usize,
    /// Indices into [`SEPARATORS`], one per slot.
    pub separators: Vec<usize>,
}

impl Cursor {
    fn first(r: usize, mode: SeparatorMode) -> Self {
        Self {
            r,
            permutation: (0..r).collect(),
            rank: 0,
            domain: 0,
            separators: vec![0; mode.slots(r)],
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("cursor length {0} is out of range for {1} chunks")]
    Length(usize, usize),
    #[error("cursor permutation is not a selection of distinct chunk positions")]
    Permutation,
    #[error("cursor domain index {0} is out of range")]
    Domain(usize),
    #[error("cursor separator state does not match the mode")]
    Separators,
    #[error("shard {0} is out of range for {1} shards")]
    Shard(usize, usize),
}

/// Advance `a` to the next `a.len()`-selection of `0..n` in lexicographic
/// order. Returns `false` once the last selection has been passed.
pub fn next_selection(a: &mut [usize], n: usize) -> bool {
    let r = a.len();
    let mut used = vec![false; n];
    for i in (0..r).rev() {
        used.fill(false);
        for &v in &a[..i] {
            used[v] = true;
        }
        let Some(bigger) = (a[i] + 1..n).find(|&v| !used[v]) else {
            continue;
        };
        a[i] = bigger;
        used[bigger] = true;
        let mut fill = (0..n).filter(|&v| !used[v]);
        for slot in a[i + 1..].iter_mut() {
            match fill.next() {
                Some(v) => *slot = v,
                None => return false,
            }
        }
        return true;
    }
    false
}

/// Streaming, deterministic candidate iterator over borrowed chunk and
/// domain lists. Holds only the cursor and the shard filter.
#[derive(Debug, Clone)]
pub struct CandidateGenerator<'a> {
    chunks: &'a [String],
    domains: &'a [String],
    mode: SeparatorMode,
    cursor: Cursor,
    shard: usize,
    shards: usize,
    done: bool,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(chunks: &'a [String], domains: &'a [String], mode: SeparatorMode) -> Self {
        Self {
            chunks,
            domains,
            mode,
            cursor: Cursor::first(1, mode),
            shard: 0,
            shards: 1,
            done: chunks.is_empty() || domains.is_empty(),
        }
    }

    /// Generator restricted to permutations whose rank is congruent to
    /// `shard` modulo `shards`. The shards of one space are disjoint and
    /// together cover it.
    pub fn sharded(
        chunks: &'a [String],
        domains: &'a [String],
        mode: SeparatorMode,
        shard: usize,
        shards: usize,
    ) -> Result<Self, CursorError> {
        if shards == 0 || shard >= shards {
            return Err(CursorError::Shard(shard, shards));
        }
        let mut g = Self::new(chunks, domains, mode);
        g.shard = shard;
        g.shards = shards;
        if !g.done && !g.in_shard() {
            g.advance_permutation();
        }
        Ok(g)
    }

    /// Rebuild a generator positioned at `cursor`; the next candidate it
    /// yields is the one the cursor describes.
    pub fn resume(
        chunks: &'a [String],
        domains: &'a [String],
        mode: SeparatorMode,
        cursor: Cursor,
    ) -> Result<Self, CursorError> {
        let n = chunks.len();
        if cursor.r == 0 || cursor.r > n || cursor.permutation.len() != cursor.r {
            return Err(CursorError::Length(cursor.r, n));
        }
        let mut seen = vec![false; n];
        for &p in &cursor.permutation {
            if p >= n || seen[p] {
                return Err(CursorError::Permutation);
            }
            seen[p] = true;
        }
        if cursor.domain >= domains.len() {
            return Err(CursorError::Domain(cursor.domain));
        }
        if cursor.separators.len() != mode.slots(cursor.r)
            || cursor.separators.iter().any(|&s| s >= SEPARATORS.len())
        {
            return Err(CursorError::Separators);
        }
        Ok(Self {
            chunks,
            domains,
            mode,
            cursor,
            shard: 0,
            shards: 1,
            done: false,
        })
    }

    /// Position of the next candidate, or `None` once exhausted.
    pub fn cursor(&self) -> Option<&Cursor> {
        (!self.done).then_some(&self.cursor)
    }

    pub fn mode(&self) -> SeparatorMode {
        self.mode
    }

    fn in_shard(&self) -> bool {
        self.cursor.rank % self.shards as u128 == self.shard as u128
    }

    fn current(&self) -> String {
        let c = &self.cursor;
        let mut local = String::new();
        for (i, &p) in c.permutation.iter().enumerate() {
            if i > 0 {
                let slot = match self.mode {
                    SeparatorMode::Normal => 0,
                    SeparatorMode::Crazy => i - 1,
                };
                local.push_str(SEPARATORS[c.separators[slot]]);
            }
            local.push_str(&self.chunks[p]);
        }
        format!("{}@{}", local, self.domains[c.domain])
    }

    /// Odometer over separator slots, last slot fastest.
    fn advance_separators(&mut self) -> bool {
        for s in self.cursor.separators.iter_mut().rev() {
            *s += 1;
            if *s < SEPARATORS.len() {
                return true;
            }
            *s = 0;
        }
        false
    }

    fn advance_permutation(&mut self) {
        let n = self.chunks.len();
        loop {
            if next_selection(&mut self.cursor.permutation, n) {
                self.cursor.rank += 1;
            } else if self.cursor.r < n {
                self.cursor = Cursor::first(self.cursor.r + 1, self.mode);
            } else {
                self.done = true;
                return;
            }
            if self.in_shard() {
                return;
            }
        }
    }

    fn advance(&mut self) {
        if self.advance_separators() {
            return;
        }
        self.cursor.domain += 1;
        if self.cursor.domain < self.domains.len() {
            return;
        }
        self.cursor.domain = 0;
        self.advance_permutation();
    }
}

impl Iterator for CandidateGenerator<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let candidate = self.current();
        self.advance();
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::count::combination_count;
    use std::collections::HashSet;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn john_doe_example_normal_mode() {
        let chunks = strings(&["john", "doe"]);
        let domains = strings(&["example.com"]);
        let all: Vec<String> =
            CandidateGenerator::new(&chunks, &domains, SeparatorMode::Normal).collect();
        assert_eq!(
            all,
            vec![
                "john@example.com",
                "doe@example.com",
                "johndoe@example.com",
                "john.doe@example.com",
                "john_doe@example.com",
                "john-doe@example.com",
                "doejohn@example.com",
                "doe.john@example.com",
                "doe_john@example.com",
                "doe-john@example.com",
            ]
        );
        assert_eq!(all.len() as u128, combination_count(2, 1, SeparatorMode::Normal));
    }

    #[test]
    fn domains_vary_inside_permutation_and_outside_separators() {
        let chunks = strings(&["a", "b"]);
        let domains = strings(&["x.io", "y.io"]);
        let first: Vec<String> = CandidateGenerator::new(&chunks, &domains, SeparatorMode::Normal)
            .skip(4)
            .take(5)
            .collect();
        assert_eq!(first, vec!["ab@x.io", "a.b@x.io", "a_b@x.io", "a-b@x.io", "ab@y.io"]);
    }

    #[test]
    fn lexicographic_selection_order() {
        let mut a = vec![0, 1];
        let mut seen = vec![a.clone()];
        while next_selection(&mut a, 3) {
            seen.push(a.clone());
        }
        assert_eq!(
            seen,
            vec![vec![0, 1], vec![0, 2], vec![1, 0], vec![1, 2], vec![2, 0], vec![2, 1]]
        );
    }

    #[test]
    fn count_matches_brute_force_for_small_sets() {
        for n in 0..=4 {
            for d in 0..=3 {
                let chunks: Vec<String> = (0..n).map(|i| format!("c{i}")).collect();
                let domains: Vec<String> = (0..d).map(|i| format!("d{i}.com")).collect();
                for mode in [SeparatorMode::Normal, SeparatorMode::Crazy] {
                    let produced = CandidateGenerator::new(&chunks, &domains, mode).count() as u128;
                    assert_eq!(produced, combination_count(n, d, mode), "n={n} d={d} {mode:?}");
                }
            }
        }
    }

    #[test]
    fn deterministic_runs() {
        let chunks = strings(&["marco", "polo", "m"]);
        let domains = strings(&["a.com", "b.org"]);
        let a: Vec<String> =
            CandidateGenerator::new(&chunks, &domains, SeparatorMode::Crazy).collect();
        let b: Vec<String> =
            CandidateGenerator::new(&chunks, &domains, SeparatorMode::Crazy).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn crazy_mode_contains_normal_mode() {
        let chunks = strings(&["a", "b", "c"]);
        let domains = strings(&["z.com"]);
        let crazy: HashSet<String> =
            CandidateGenerator::new(&chunks, &domains, SeparatorMode::Crazy).collect();
        let normal: Vec<String> =
            CandidateGenerator::new(&chunks, &domains, SeparatorMode::Normal).collect();
        assert!(normal.iter().all(|c| crazy.contains(c)));
        assert!(crazy.contains("a.b_c@z.com"));
        assert!(!normal.contains(&"a.b_c@z.com".to_string()));
    }

    #[test]
    fn crazy_tuples_are_lexicographic() {
        let chunks = strings(&["a", "b", "c"]);
        let domains = strings(&["z.com"]);
        let r3: Vec<String> = CandidateGenerator::new(&chunks, &domains, SeparatorMode::Crazy)
            .skip(3 + 6 * 4)
            .take(5)
            .collect();
        assert_eq!(r3, vec!["abc@z.com", "ab.c@z.com", "ab_c@z.com", "ab-c@z.com", "a.bc@z.com"]);
    }

    #[test]
    fn shards_partition_the_space() {
        let chunks = strings(&["a", "b", "c", "d"]);
        let domains = strings(&["x.com", "y.com"]);
        let full: Vec<String> =
            CandidateGenerator::new(&chunks, &domains, SeparatorMode::Normal).collect();
        let mut union = Vec::new();
        for shard in 0..3 {
            union.extend(
                CandidateGenerator::sharded(&chunks, &domains, SeparatorMode::Normal, shard, 3)
                    .unwrap(),
            );
        }
        assert_eq!(union.len(), full.len());
        let a: HashSet<&String> = union.iter().collect();
        let b: HashSet<&String> = full.iter().collect();
        assert_eq!(a, b);
        assert!(
            CandidateGenerator::sharded(&chunks, &domains, SeparatorMode::Normal, 3, 3).is_err()
        );
    }

    #[test]
    fn resume_continues_where_the_cursor_points() {
        let chunks = strings(&["jane", "doe", "j"]);
        let domains = strings(&["test.org", "mail.com"]);
        let mut g = CandidateGenerator::new(&chunks, &domains, SeparatorMode::Crazy);
        let head: Vec<String> = g.by_ref().take(17).collect();
        let cursor = g.cursor().cloned().unwrap();
        let rest: Vec<String> = g.collect();
        let resumed: Vec<String> =
            CandidateGenerator::resume(&chunks, &domains, SeparatorMode::Crazy, cursor)
                .unwrap()
                .collect();
        assert_eq!(resumed, rest);
        assert_eq!(head.len() + rest.len(), 2 * (3 + 6 * 4 + 6 * 16));
    }

    #[test]
    fn resume_rejects_inconsistent_cursor() {
        let chunks = strings(&["a", "b"]);
        let domains = strings(&["x.com"]);
        let bad = Cursor {
            r: 2,
            permutation: vec![1, 1],
            rank: 0,
            domain: 0,
            separators: vec![0],
        };
        assert_eq!(
            CandidateGenerator::resume(&chunks, &domains, SeparatorMode::Normal, bad).unwrap_err(),
            CursorError::Permutation
        );
    }
}
