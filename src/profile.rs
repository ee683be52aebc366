//! Profile record as handed over by whatever fetched it.
//!
//! Field names follow the camelCase JSON used by public avatar profiles. Every
//! field is optional; missing ones are simply skipped during extraction.
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("malformed profile json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A verified account on a third-party network.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    #[serde(alias = "account", alias = "shortname")]
    pub network: String,
    pub url: String,
}

impl Account {
    pub fn new(network: &str, url: &str) -> Self {
        Self {
            network: network.to_string(),
            url: url.to_string(),
        }
    }
}

/// A link published on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileRecord {
    /// Digest of the account's primary email, when the profile exposes it.
    pub hash: Option<String>,
    pub preferred_username: Option<String>,
    pub display_name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub profile_url: Option<String>,
    pub about_me: Option<String>,
    pub emails: Vec<String>,
    pub links: Vec<Link>,
    pub accounts: Vec<Account>,
}

impl ProfileRecord {
    pub fn from_json(contents: &str) -> Result<Self, ProfileError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read profile {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("parse profile {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_fields_and_defaults() {
        let json = r#"{
            "hash": "f71119606391ae12d0540ad0813ae10a",
            "preferredUsername": "janedoe",
            "displayName": "Jane Doe",
            "aboutMe": "write me at jane@public.example",
            "accounts": [{"account": "Twitter", "url": "https://twitter.com/jane_doe"}],
            "links": [{"url": "https://janedoe.dev/about"}]
        }"#;
        let p = ProfileRecord::from_json(json).unwrap();
        assert_eq!(p.preferred_username.as_deref(), Some("janedoe"));
        assert_eq!(p.accounts, vec![Account::new("Twitter", "https://twitter.com/jane_doe")]);
        assert_eq!(p.links[0].url, "https://janedoe.dev/about");
        assert!(p.emails.is_empty());
        assert!(p.given_name.is_none());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            ProfileRecord::from_json("{not json"),
            Err(ProfileError::Json(_))
        ));
    }
}
