//! The digest-comparison search loop.
//!
//! A [`Search`] is `Running` until one of three terminal states: a candidate
//! matched (`Found`), the generator ran dry (`Exhausted`), or the caller's
//! [`StopSignal`] fired (`Cancelled`). Progress is pushed to a [`Progress`]
//! sink once per candidate; the loop itself owns no presentation state.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info};
use rayon::prelude::*;

use crate::digest::SearchTarget;
use crate::generator::{CandidateGenerator, SeparatorMode};

/// Receives the running processed count.
pub trait Progress {
    fn begin(&self, _total: u128) {}
    fn step(&self, processed: u64);
    fn end(&self) {}
}

/// Progress sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn step(&self, _processed: u64) {}
}

/// Cooperative cancellation, polled once per candidate.
pub trait StopSignal {
    fn should_stop(&self) -> bool;
}

impl StopSignal for AtomicBool {
    fn should_stop(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Never stops.
#[derive(Debug, Default, Clone, Copy)]
pub struct Never;

impl StopSignal for Never {
    fn should_stop(&self) -> bool {
        false
    }
}

/// Stop on an external interrupt flag or once a wall-clock budget is spent.
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    interrupted: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.deadline = Some(Instant::now() + budget);
        self
    }

    /// Shared flag, e.g. for a Ctrl-C handler.
    pub fn handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Relaxed);
    }
}

impl StopSignal for StopFlag {
    fn should_stop(&self) -> bool {
        self.interrupted.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Terminal state of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// `position` is the 1-based number of candidates processed, match included.
    Found {
        email: String,
        position: u64,
        elapsed: Duration,
    },
    Exhausted {
        processed: u64,
        elapsed: Duration,
    },
    Cancelled {
        processed: u64,
        elapsed: Duration,
    },
}

impl SearchOutcome {
    pub fn processed(&self) -> u64 {
        match self {
            SearchOutcome::Found { position, .. } => *position,
            SearchOutcome::Exhausted { processed, .. }
            | SearchOutcome::Cancelled { processed, .. } => *processed,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            SearchOutcome::Found { elapsed, .. }
            | SearchOutcome::Exhausted { elapsed, .. }
            | SearchOutcome::Cancelled { elapsed, .. } => *elapsed,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            SearchOutcome::Found { email, .. } => Some(email),
            _ => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            SearchOutcome::Found { .. } => "found",
            SearchOutcome::Exhausted { .. } => "exhausted",
            SearchOutcome::Cancelled { .. } => "cancelled",
        }
    }
}

/// Single-threaded search over any candidate stream.
pub struct Search<'t, I> {
    candidates: I,
    target: &'t SearchTarget,
    processed: u64,
    started: Instant,
}

impl<'t, I> Search<'t, I>
where
    I: Iterator<Item = String>,
{
    pub fn new(candidates: I, target: &'t SearchTarget) -> Self {
        Self {
            candidates,
            target,
            processed: 0,
            started: Instant::now(),
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Pull and test one candidate. `None` means still running.
    pub fn step(&mut self) -> Option<SearchOutcome> {
        let Some(candidate) = self.candidates.next() else {
            return Some(SearchOutcome::Exhausted {
                processed: self.processed,
                elapsed: self.started.elapsed(),
            });
        };
        self.processed += 1;
        if self.target.matches(&candidate) {
            return Some(SearchOutcome::Found {
                email: candidate,
                position: self.processed,
                elapsed: self.started.elapsed(),
            });
        }
        None
    }

    /// Drive the search to a terminal state.
    pub fn run(mut self, progress: &dyn Progress, stop: &dyn StopSignal) -> SearchOutcome {
        let outcome = loop {
            if stop.should_stop() {
                break SearchOutcome::Cancelled {
                    processed: self.processed,
                    elapsed: self.started.elapsed(),
                };
            }
            let outcome = self.step();
            progress.step(self.processed);
            if let Some(outcome) = outcome {
                break outcome;
            }
        };
        progress.end();
        debug!("search finished: {} after {}", outcome.status(), outcome.processed());
        outcome
    }
}

/// Search the space split into `shards` disjoint generators on the rayon
/// pool. The first worker to match stops the others; `position` is the
/// global processed count at that moment.
pub fn run_search_parallel(
    chunks: &[String],
    domains: &[String],
    mode: SeparatorMode,
    target: &SearchTarget,
    shards: usize,
    progress: &(dyn Progress + Sync),
    stop: &(dyn StopSignal + Sync),
) -> SearchOutcome {
    let shards = shards.max(1);
    let started = Instant::now();
    let processed = AtomicU64::new(0);
    let found = AtomicBool::new(false);
    let cancelled = AtomicBool::new(false);
    info!("searching with {} shards", shards);

    let hit = (0..shards).into_par_iter().find_map_any(|shard| {
        let candidates = CandidateGenerator::sharded(chunks, domains, mode, shard, shards).ok()?;
        for candidate in candidates {
            if found.load(Ordering::Relaxed) {
                return None;
            }
            if stop.should_stop() {
                cancelled.store(true, Ordering::Relaxed);
                return None;
            }
            let n = processed.fetch_add(1, Ordering::Relaxed) + 1;
            progress.step(n);
            if target.matches(&candidate) {
                found.store(true, Ordering::Relaxed);
                return Some((candidate, n));
            }
        }
        None
    });
    progress.end();

    let elapsed = started.elapsed();
    match hit {
        Some((email, position)) => SearchOutcome::Found {
            email,
            position,
            elapsed,
        },
        None if cancelled.load(Ordering::Relaxed) => SearchOutcome::Cancelled {
            processed: processed.load(Ordering::Relaxed),
            elapsed,
        },
        None => SearchOutcome::Exhausted {
            processed: processed.load(Ordering::Relaxed),
            elapsed,
        },
    }
}

/// Result of hashing one publicly listed email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicEmailCheck {
    pub email: String,
    pub matches: bool,
}

/// Compare every public email against the target. Always runs in full.
pub fn check_public_emails(emails: &[String], target: &SearchTarget) -> Vec<PublicEmailCheck> {
    emails
        .iter()
        .map(|email| PublicEmailCheck {
            email: email.clone(),
            matches: target.matches(email),
        })
        .collect()
}
