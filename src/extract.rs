//! Chunk extraction from a profile record.
//!
//! Produces raw (un-normalized, possibly duplicated) chunks in a fixed rule
//! order, the domains discovered along the way, and the public emails that
//! are checked directly instead of being generated.
use std::collections::HashSet;
use std::sync::LazyLock;

use deunicode::deunicode;
use log::debug;
use regex::Regex;

use crate::networks::{harvest_account, registrable_domain};
use crate::profile::ProfileRecord;

/// Characters that split a name into pieces.
const NAME_SEPARATORS: [char; 5] = ['-', '_', ' ', '.', '/'];

static PUBLIC_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.%+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$")
        .expect("valid email regex")
});

static BIO_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("valid bio email regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Raw fragments, in rule order.
    pub chunks: Vec<String>,
    /// Domains found in account URLs and profile links, in discovery order.
    pub domains: Vec<String>,
    /// Emails published on the profile.
    pub public_emails: Vec<String>,
}

/// Pieces of a name plus the initial of every piece longer than one char.
///
/// The name is transliterated before splitting, so `李小龙` yields `Li`,
/// `Xiao`, `Long` and a curly apostrophe is stripped like a straight one.
pub fn name_chunks(name: &str) -> Vec<String> {
    let ascii = deunicode(name);
    let pieces: Vec<String> = ascii
        .split(NAME_SEPARATORS)
        .map(|p| p.replace(['"', '\''], ""))
        .filter(|p| !p.is_empty())
        .collect();
    let initials: Vec<String> = pieces
        .iter()
        .filter(|p| p.chars().count() > 1)
        .filter_map(|p| p.chars().next())
        .map(String::from)
        .collect();
    pieces.into_iter().chain(initials).collect()
}

pub fn is_email(s: &str) -> bool {
    PUBLIC_EMAIL.is_match(s)
}

/// Emails listed on the profile plus those mentioned in the biography.
pub fn public_emails(profile: &ProfileRecord) -> Vec<String> {
    let listed = profile.emails.iter().map(|e| e.trim()).filter(|e| is_email(e));
    let in_bio = profile
        .about_me
        .as_deref()
        .into_iter()
        .flat_map(|bio| BIO_EMAIL.find_iter(bio).map(|m| m.as_str()));
    let mut seen = HashSet::new();
    listed
        .chain(in_bio)
        .filter(|e| seen.insert(e.to_lowercase()))
        .map(str::to_string)
        .collect()
}

pub fn extract(profile: &ProfileRecord) -> Extraction {
    let mut out = Extraction::default();

    if let Some(username) = profile.preferred_username.as_deref() {
        out.chunks.push(username.to_string());
    }
    for name in [&profile.display_name, &profile.given_name, &profile.family_name]
        .into_iter()
        .flatten()
    {
        out.chunks.extend(name_chunks(name));
    }
    if let Some(url) = profile.profile_url.as_deref() {
        out.chunks.push(crate::networks::last_segment(url.trim_end_matches('/')));
    }

    for account in &profile.accounts {
        let harvest = harvest_account(&account.network, &account.url);
        debug!(
            "{} account {} -> {:?} {:?}",
            account.network, account.url, harvest.chunks, harvest.domains
        );
        out.chunks.extend(harvest.chunks);
        push_unique(&mut out.domains, harvest.domains);
    }

    for link in &profile.links {
        match registrable_domain(&link.url) {
            Ok(domain) => push_unique(&mut out.domains, [domain]),
            Err(e) => debug!("skipping link domain: {e}"),
        }
    }

    out.public_emails = public_emails(profile);
    out
}

fn push_unique<I: IntoIterator<Item = String>>(into: &mut Vec<String>, items: I) {
    for item in items {
        let item = item.to_lowercase();
        if !into.contains(&item) {
            into.push(item);
        }
    }
}
