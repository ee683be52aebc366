//! Email domain lists.
//!
//! Generic domains come from an embedded tier (`common`, `long`, `full`) or
//! from a caller-supplied list that replaces the tier. Domains discovered in
//! the profile are moved to the front.
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use log::debug;

const COMMON: &str = include_str!("../data/email_services.json");
const LONG: &str = include_str!("../data/email_services_long.json");
const FULL: &str = include_str!("../data/email_services_full.json");

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("a custom domain list cannot be combined with --domain-list {0}")]
    ConflictingSources(DomainTier),
    #[error("unknown domain list {0:?} (expected common, long or full)")]
    UnknownTier(String),
    #[error("domain list is empty")]
    EmptyDomainSet,
    #[error("embedded domain list is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DomainTier {
    #[default]
    Common,
    Long,
    Full,
}

impl DomainTier {
    fn raw(self) -> &'static str {
        match self {
            DomainTier::Common => COMMON,
            DomainTier::Long => LONG,
            DomainTier::Full => FULL,
        }
    }

    pub fn domains(self) -> Result<Vec<String>, DomainError> {
        Ok(serde_json::from_str(self.raw())?)
    }
}

impl fmt::Display for DomainTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DomainTier::Common => "common",
            DomainTier::Long => "long",
            DomainTier::Full => "full",
        })
    }
}

impl FromStr for DomainTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "common" => Ok(DomainTier::Common),
            "long" => Ok(DomainTier::Long),
            "full" => Ok(DomainTier::Full),
            _ => Err(DomainError::UnknownTier(s.to_string())),
        }
    }
}

/// Where the generic domains come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainSource {
    Tier(DomainTier),
    Custom(Vec<String>),
}

impl Default for DomainSource {
    fn default() -> Self {
        DomainSource::Tier(DomainTier::default())
    }
}

impl DomainSource {
    /// Combine the tier option with a caller list. An explicit tier next to a
    /// caller list is a conflict; a caller list alone replaces the tier.
    pub fn resolve(tier: Option<DomainTier>, custom: Vec<String>) -> Result<Self, DomainError> {
        match (tier, custom.is_empty()) {
            (Some(t), false) => Err(DomainError::ConflictingSources(t)),
            (_, false) => Ok(DomainSource::Custom(custom)),
            (t, true) => Ok(DomainSource::Tier(t.unwrap_or_default())),
        }
    }

    pub fn load(&self) -> Result<DomainSet, DomainError> {
        let set = match self {
            DomainSource::Tier(t) => DomainSet::new(t.domains()?),
            DomainSource::Custom(list) => DomainSet::new(list),
        };
        if set.is_empty() {
            return Err(DomainError::EmptyDomainSet);
        }
        Ok(set)
    }
}

/// Ordered, duplicate-free domain list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainSet {
    domains: Vec<String>,
}

fn clean(domain: &str) -> Option<String> {
    let d = domain.trim().trim_start_matches('@').to_lowercase();
    (!d.is_empty()).then_some(d)
}

impl DomainSet {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let domains = domains
            .into_iter()
            .filter_map(|d| clean(d.as_ref()))
            .filter(|d| seen.insert(d.clone()))
            .collect();
        Self { domains }
    }

    /// Put newly discovered domains ahead of the generic ones, keeping their
    /// discovery order. Domains already present stay where they are.
    pub fn prioritize<I, S>(&mut self, discovered: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut front: Vec<String> = Vec::new();
        for d in discovered.into_iter().filter_map(|d| clean(d.as_ref())) {
            if !self.domains.contains(&d) && !front.contains(&d) {
                debug!("prioritizing discovered domain {}", d);
                front.push(d);
            }
        }
        front.append(&mut self.domains);
        self.domains = front;
    }

    pub fn as_slice(&self) -> &[String] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_nested_and_start_with_common() {
        let common = DomainTier::Common.domains().unwrap();
        let long = DomainTier::Long.domains().unwrap();
        let full = DomainTier::Full.domains().unwrap();
        assert_eq!(common[0], "gmail.com");
        assert!(common.len() < long.len() && long.len() < full.len());
        assert!(common.iter().all(|d| full.contains(d)));
        assert_eq!("FULL".parse::<DomainTier>().unwrap(), DomainTier::Full);
        assert!("huge".parse::<DomainTier>().is_err());
    }

    #[test]
    fn custom_list_replaces_tier_and_conflicts_with_explicit_tier() {
        let custom = vec!["Example.com".to_string(), "@test.org".to_string()];
        let src = DomainSource::resolve(None, custom.clone()).unwrap();
        let set = src.load().unwrap();
        assert_eq!(set.as_slice(), ["example.com", "test.org"]);
        assert!(matches!(
            DomainSource::resolve(Some(DomainTier::Long), custom),
            Err(DomainError::ConflictingSources(DomainTier::Long))
        ));
        assert_eq!(
            DomainSource::resolve(None, vec![]).unwrap(),
            DomainSource::Tier(DomainTier::Common)
        );
        assert!(matches!(
            DomainSource::Custom(vec![" ".into()]).load(),
            Err(DomainError::EmptyDomainSet)
        ));
    }

    #[test]
    fn discovered_domains_go_first_without_duplicates() {
        let mut set = DomainSet::new(["gmail.com", "yahoo.com", "gmail.com"]);
        assert_eq!(set.len(), 2);
        set.prioritize(["janedoe.dev", "gmail.com", "acme.io", "JaneDoe.dev"]);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec!["janedoe.dev", "acme.io", "gmail.com", "yahoo.com"]
        );
    }
}
