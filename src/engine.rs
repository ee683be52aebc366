//! Engine: assembles a search session from a target, an optional profile,
//! caller-supplied elements and a domain source, then runs the search and
//! checks the profile's public emails.
//!
//! Typical usage:
//!
//! ```no_run
//! use hashtrace::engine::SessionBuilder;
//! use hashtrace::search::{NoProgress, Never};
//! # fn main() -> anyhow::Result<()> {
//! let session = SessionBuilder::new()
//!     .target("f71119606391ae12d0540ad0813ae10a")
//!     .elements(["jane", "doe"])
//!     .build()?;
//! let report = session.run(&NoProgress, &Never);
//! println!("{}", hashtrace::report::render_report(&report));
//! # Ok(())
//! # }
//! ```
use log::{debug, info};

use crate::count::combination_count;
use crate::dedup::dedup_chunks;
use crate::digest::{DigestAlgorithm, SearchTarget, TargetError};
use crate::domains::{DomainError, DomainSet, DomainSource};
use crate::extract::{Extraction, extract};
use crate::generator::{CandidateGenerator, SeparatorMode};
use crate::normalize::normalize_chunks;
use crate::profile::ProfileRecord;
use crate::search::{
    PublicEmailCheck, Progress, Search, SearchOutcome, StopSignal, check_public_emails,
    run_search_parallel,
};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no target digest given and the profile does not expose one")]
    MissingTarget,
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error(transparent)]
    Domains(#[from] DomainError),
    #[error("no elements to combine: none found in the profile or supplied with --elements")]
    EmptyChunkSet,
}

#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    target: Option<String>,
    profile: Option<ProfileRecord>,
    elements: Vec<String>,
    domains: DomainSource,
    mode: SeparatorMode,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn profile(mut self, profile: ProfileRecord) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Extra fragments appended after the profile's own chunks.
    pub fn elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elements.extend(elements.into_iter().map(Into::into));
        self
    }

    pub fn domains(mut self, source: DomainSource) -> Self {
        self.domains = source;
        self
    }

    pub fn mode(mut self, mode: SeparatorMode) -> Self {
        self.mode = mode;
        self
    }

    /// Validate the configuration and build the chunk and domain sets.
    pub fn build(self) -> Result<Session, EngineError> {
        let raw_target = self
            .target
            .or_else(|| self.profile.as_ref().and_then(|p| p.hash.clone()))
            .ok_or(EngineError::MissingTarget)?;
        let target = SearchTarget::parse(&raw_target)?;
        let mut domains = self.domains.load()?;

        let extraction = self.profile.as_ref().map(extract).unwrap_or_default();
        let Extraction {
            chunks: raw_chunks,
            domains: discovered,
            public_emails,
        } = extraction;

        let normalized = normalize_chunks(raw_chunks.iter().chain(self.elements.iter()));
        let chunks = dedup_chunks(&normalized);
        debug!(
            "{} raw fragments, {} normalized, {} after combination dedup",
            raw_chunks.len() + self.elements.len(),
            normalized.len(),
            chunks.len()
        );
        if chunks.is_empty() {
            return Err(EngineError::EmptyChunkSet);
        }
        domains.prioritize(&discovered);

        info!(
            "target {} ({}), {} chunks, {} domains",
            target,
            target.algorithm(),
            chunks.len(),
            domains.len()
        );
        Ok(Session {
            target,
            chunks,
            domains,
            mode: self.mode,
            public_emails,
        })
    }
}

/// Read-only inputs of one search.
#[derive(Debug, Clone)]
pub struct Session {
    pub target: SearchTarget,
    pub chunks: Vec<String>,
    pub domains: DomainSet,
    pub mode: SeparatorMode,
    pub public_emails: Vec<String>,
}

impl Session {
    /// Exact number of candidates the generator will produce.
    pub fn total(&self) -> u128 {
        combination_count(self.chunks.len(), self.domains.len(), self.mode)
    }

    pub fn candidates(&self) -> CandidateGenerator<'_> {
        CandidateGenerator::new(&self.chunks, self.domains.as_slice(), self.mode)
    }

    pub fn run(&self, progress: &dyn Progress, stop: &dyn StopSignal) -> SearchReport {
        progress.begin(self.total());
        let outcome = Search::new(self.candidates(), &self.target).run(progress, stop);
        self.report(outcome)
    }

    pub fn run_parallel(
        &self,
        shards: usize,
        progress: &(dyn Progress + Sync),
        stop: &(dyn StopSignal + Sync),
    ) -> SearchReport {
        progress.begin(self.total());
        let outcome = run_search_parallel(
            &self.chunks,
            self.domains.as_slice(),
            self.mode,
            &self.target,
            shards,
            progress,
            stop,
        );
        self.report(outcome)
    }

    fn report(&self, outcome: SearchOutcome) -> SearchReport {
        SearchReport {
            target: self.target.hex().to_string(),
            algorithm: self.target.algorithm(),
            chunks: self.chunks.clone(),
            domain_count: self.domains.len(),
            total: self.total(),
            mode: self.mode,
            outcome,
            public_emails: check_public_emails(&self.public_emails, &self.target),
        }
    }
}

/// Everything a caller needs to render or export a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub target: String,
    pub algorithm: DigestAlgorithm,
    pub chunks: Vec<String>,
    pub domain_count: usize,
    pub total: u128,
    pub mode: SeparatorMode,
    pub outcome: SearchOutcome,
    pub public_emails: Vec<PublicEmailCheck>,
}

impl SearchReport {
    /// The public email whose digest equals the target, if any.
    pub fn primary_public_email(&self) -> Option<&str> {
        self.public_emails
            .iter()
            .find(|c| c.matches)
            .map(|c| c.email.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::DomainTier;
    use crate::profile::Account;
    use crate::search::{Never, NoProgress};

    const JANE_MD5: &str = "f71119606391ae12d0540ad0813ae10a";
    const JANE_SHA256: &str = "8bc4aa80049cbdfcc75cb97b7e98d4f5f023e3c49197d3a4c70c4dbd09a6c1eb";

    fn custom(domains: &[&str]) -> DomainSource {
        DomainSource::Custom(domains.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn finds_email_from_supplied_elements() {
        let session = SessionBuilder::new()
            .target(JANE_MD5)
            .elements(["Jane", "DOE", "janedoe"])
            .domains(custom(&["test.org"]))
            .build()
            .unwrap();
        assert_eq!(session.chunks, vec!["jane", "doe"]);
        assert_eq!(session.total(), 10);
        let report = session.run(&NoProgress, &Never);
        assert_eq!(report.outcome.email(), Some("jane.doe@test.org"));
        assert_eq!(report.algorithm, DigestAlgorithm::Md5);
    }

    #[test]
    fn profile_chunks_domains_and_public_emails() {
        let profile = ProfileRecord {
            hash: Some(JANE_SHA256.into()),
            display_name: Some("Jane Doe".into()),
            emails: vec!["jane.doe@test.org".into(), "jd@elsewhere.net".into()],
            accounts: vec![Account::new("WordPress", "https://test.org")],
            ..Default::default()
        };
        let session = SessionBuilder::new()
            .profile(profile)
            .domains(DomainSource::Tier(DomainTier::Common))
            .build()
            .unwrap();
        assert_eq!(session.target.algorithm(), DigestAlgorithm::Sha256);
        // "test" from the custom WordPress domain
        assert_eq!(session.chunks, vec!["jane", "doe", "j", "d", "test"]);
        assert_eq!(session.domains.as_slice()[0], "test.org");
        assert_eq!(session.public_emails.len(), 2);

        let report = session.run(&NoProgress, &Never);
        assert_eq!(report.outcome.email(), Some("jane.doe@test.org"));
        assert_eq!(report.primary_public_email(), Some("jane.doe@test.org"));
        assert_eq!(report.domain_count, session.domains.len());
    }

    #[test]
    fn configuration_errors_come_first() {
        assert!(matches!(
            SessionBuilder::new().elements(["a"]).build(),
            Err(EngineError::MissingTarget)
        ));
        assert!(matches!(
            SessionBuilder::new().target("xyz").elements(["a"]).build(),
            Err(EngineError::Target(_))
        ));
        assert!(matches!(
            SessionBuilder::new()
                .target(JANE_MD5)
                .domains(custom(&[]))
                .build(),
            Err(EngineError::Domains(DomainError::EmptyDomainSet))
        ));
    }

    #[test]
    fn empty_chunk_set_is_reported() {
        let res = SessionBuilder::new()
            .target(JANE_MD5)
            .profile(ProfileRecord::default())
            .elements(["  "])
            .build();
        assert!(matches!(res, Err(EngineError::EmptyChunkSet)));
    }

    #[test]
    fn exhausted_run_processes_the_whole_space() {
        let session = SessionBuilder::new()
            .target("6429bc468e7c918cd189ed2cdeaa427a")
            .elements(["a", "b", "c"])
            .domains(custom(&["x.com", "y.com"]))
            .mode(SeparatorMode::Crazy)
            .build()
            .unwrap();
        let report = session.run(&NoProgress, &Never);
        assert_eq!(report.outcome.status(), "exhausted");
        assert_eq!(report.outcome.processed() as u128, report.total);
        let parallel = session.run_parallel(4, &NoProgress, &Never);
        assert_eq!(parallel.outcome.processed() as u128, report.total);
    }
}
