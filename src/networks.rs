//! Per-network rules for verified accounts.
//!
//! Each network maps to a small pure function from the account URL to the
//! chunks (and occasionally domains) it reveals. Adding a network means adding
//! one row to [`RULES`]; anything not listed falls back to the last path
//! segment of the URL.
use std::sync::LazyLock;

use log::debug;
use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("malformed url: {0}")]
    Malformed(String),
    #[error("url has no host: {0}")]
    NoHost(String),
    #[error("no registrable domain in host: {0}")]
    NoRegistrableDomain(String),
}

/// What one account contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Harvest {
    pub chunks: Vec<String>,
    pub domains: Vec<String>,
}

impl Harvest {
    fn from_pieces<I, S>(pieces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut h = Harvest::default();
        h.extend_chunks(pieces);
        h
    }

    fn extend_chunks<I, S>(&mut self, pieces: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chunks.extend(
            pieces
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty()),
        );
    }
}

pub type NetworkRule = fn(&str) -> Harvest;

/// Network name (lowercase) to rule.
pub static RULES: &[(&str, NetworkRule)] = &[
    ("mastodon", at_handle),
    ("fediverse", at_handle),
    ("tiktok", at_handle),
    ("youtube", youtube),
    ("linkedin", linkedin),
    ("tumblr", tumblr),
    ("wordpress", wordpress),
    ("bluesky", bluesky),
    ("facebook", dotted_unless_profile_php),
    ("instagram", dotted_unless_profile_php),
    ("stack overflow", hyphenated),
    ("flickr", flickr),
    ("twitter", underscored),
    ("x", underscored),
    ("tripit", tripit),
    ("goodreads", goodreads),
    // no reusable identity in these URLs
    ("foursquare", skip),
    ("yahoo", skip),
    ("google+", skip),
    ("vimeo", skip),
];

pub fn rule_for(network: &str) -> NetworkRule {
    let key = network.trim().to_lowercase();
    RULES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, rule)| *rule)
        .unwrap_or(last_segment_only)
}

/// Apply the network's rule to an account URL (trailing `/` stripped).
pub fn harvest_account(network: &str, url: &str) -> Harvest {
    let url = url.trim().trim_end_matches('/');
    rule_for(network)(url)
}

/// Last `/`-separated segment, without query or fragment, percent-decoded.
pub fn last_segment(url: &str) -> String {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = url[..end].trim_end_matches('/');
    let seg = path.rsplit('/').next().unwrap_or(path);
    percent_decode_str(seg).decode_utf8_lossy().into_owned()
}

/// Host split around its public suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostParts {
    /// Labels left of the registrable domain, `www.` removed.
    pub subdomain: Option<String>,
    /// Registrable domain without its suffix, e.g. `example` in `example.co.uk`.
    pub label: String,
    /// Registrable domain, e.g. `example.co.uk`.
    pub registrable: String,
}

/// Split a bare host name using the public suffix list.
pub fn split_host(host: &str) -> Result<HostParts, UrlError> {
    let host = host.trim_end_matches('.').to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let registrable =
        psl::domain_str(host).ok_or_else(|| UrlError::NoRegistrableDomain(host.to_string()))?;
    let suffix =
        psl::suffix_str(host).ok_or_else(|| UrlError::NoRegistrableDomain(host.to_string()))?;
    let label = registrable
        .strip_suffix(suffix)
        .unwrap_or(registrable)
        .trim_end_matches('.')
        .to_string();
    let subdomain = host
        .strip_suffix(registrable)
        .map(|s| s.trim_end_matches('.'))
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Ok(HostParts {
        subdomain,
        label,
        registrable: registrable.to_string(),
    })
}

/// Parse a URL (scheme optional) and split its host.
pub fn url_host_parts(raw: &str) -> Result<HostParts, UrlError> {
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&with_scheme).map_err(|_| UrlError::Malformed(raw.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| UrlError::NoHost(raw.to_string()))?;
    split_host(host)
}

/// Registrable domain of a URL, e.g. for profile links.
pub fn registrable_domain(raw: &str) -> Result<String, UrlError> {
    url_host_parts(raw).map(|p| p.registrable)
}

/// Subdomain under a platform's own base domain, else the PSL subdomain.
fn platform_subdomain(url: &str, base: &str) -> Result<Option<String>, UrlError> {
    let parts = url_host_parts(url)?;
    let host = match &parts.subdomain {
        Some(sub) => format!("{}.{}", sub, parts.registrable),
        None => parts.registrable.clone(),
    };
    if let Some(sub) = host.strip_suffix(base).and_then(|s| s.strip_suffix('.')) {
        if !sub.is_empty() {
            return Ok(Some(sub.to_string()));
        }
    }
    Ok(parts.subdomain)
}

fn skip(_url: &str) -> Harvest {
    Harvest::default()
}

fn last_segment_only(url: &str) -> Harvest {
    Harvest::from_pieces([last_segment(url)])
}

fn at_handle(url: &str) -> Harvest {
    Harvest::from_pieces([last_segment(url).replace('@', "")])
}

fn youtube(url: &str) -> Harvest {
    Harvest::from_pieces([last_segment(url).trim_start_matches('@')])
}

fn linkedin(url: &str) -> Harvest {
    if url.to_lowercase().contains("linkedin.com/in/") {
        last_segment_only(url)
    } else {
        Harvest::default()
    }
}

fn tumblr(url: &str) -> Harvest {
    match platform_subdomain(url, "tumblr.com") {
        Ok(Some(sub)) => Harvest::from_pieces([sub]),
        Ok(None) => last_segment_only(url),
        Err(e) => {
            debug!("tumblr: {e}, falling back to last segment");
            last_segment_only(url)
        }
    }
}

fn wordpress(url: &str) -> Harvest {
    let parts = match url_host_parts(url) {
        Ok(parts) => parts,
        Err(e) => {
            debug!("wordpress: {e}, falling back to last segment");
            return last_segment_only(url);
        }
    };
    match platform_subdomain(url, "wordpress.com") {
        Ok(Some(sub)) => Harvest::from_pieces([sub]),
        _ if parts.registrable == "wordpress.com" => last_segment_only(url),
        _ => Harvest {
            chunks: vec![parts.label],
            domains: vec![parts.registrable],
        },
    }
}

static BSKY_HANDLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z0-9._-]+)\.bsky\.social").expect("valid bluesky handle regex")
});

fn bluesky(url: &str) -> Harvest {
    let handle = last_segment(url);
    if let Some(cap) = BSKY_HANDLE.captures(&handle) {
        return Harvest::from_pieces([&cap[1]]);
    }
    // custom-domain handle: the handle is itself a domain
    let labels: Vec<&str> = handle.split('.').collect();
    let mut h = Harvest::from_pieces([labels[0]]);
    match split_host(&handle) {
        Ok(parts) => h.domains.push(parts.registrable),
        Err(e) => {
            debug!("bluesky: {e}, pairing the first two handle labels");
            if labels.len() > 1 {
                h.domains.push(format!("{}.{}", labels[0], labels[1]));
            }
        }
    }
    h
}

fn dotted_unless_profile_php(url: &str) -> Harvest {
    if url.contains("profile.php") {
        return Harvest::default();
    }
    Harvest::from_pieces(last_segment(url).split('.').map(str::to_string))
}

fn hyphenated(url: &str) -> Harvest {
    Harvest::from_pieces(last_segment(url).split('-').map(str::to_string))
}

fn flickr(url: &str) -> Harvest {
    if url.contains("/people/") {
        return Harvest::default();
    }
    hyphenated(url)
}

fn underscored(url: &str) -> Harvest {
    Harvest::from_pieces(last_segment(url).split('_').map(str::to_string))
}

fn tripit(url: &str) -> Harvest {
    if !url.contains("/people/") {
        return Harvest::default();
    }
    Harvest::from_pieces(last_segment(url).split('.').map(str::to_string))
}

fn goodreads(url: &str) -> Harvest {
    // leading piece is the numeric user id
    Harvest::from_pieces(last_segment(url).split('-').skip(1).map(str::to_string))
}
