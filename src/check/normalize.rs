//! Canonicalization of free-form check and platform names.
//!
//! # Rules
//! - Trim surrounding whitespace
//! - Strip every non-alphabetic character (absorbs typos like `"plugins!"`)
//! - Lower-case
//! - Drop a single trailing `s` (`"Users"` → `user`), except for `wordpress`
//! - Map synonyms (`setting` → `config`, `wp` → `wordpress`, ...)
//!
//! # Design Decisions
//! - Pure functions, no I/O
//! - Unknown check names are reported, never fatal
//! - Unknown platform names are fatal (`UnsupportedPlatform`)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::orchestrator::types::OrchestratorError;

/// A category of inspection the capability services can run against a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Plugin,
    Config,
    User,
}

impl CheckKind {
    /// Order in which the WordPress service emits segments.
    pub const EMIT_ORDER: [CheckKind; 3] = [CheckKind::Plugin, CheckKind::Config, CheckKind::User];

    /// Canonical name, also used in cache keys and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Plugin => "plugin",
            CheckKind::Config => "config",
            CheckKind::User => "user",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Downstream capability service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Wordpress,
    Regular,
}

impl Platform {
    /// Name used as the downstream path segment and in the forwarded body.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Wordpress => "wordpress",
            Platform::Regular => "regular",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of normalizing one check token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedCheck {
    Valid(CheckKind),
    /// Carries the stripped form, which is what gets reported back.
    Invalid(String),
}

/// Trim, drop non-alphabetic characters and lower-case.
pub fn normalize_string(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn singularize(mut value: String) -> String {
    if value.ends_with('s') {
        value.pop();
    }
    value
}

/// Trim and drop non-alphabetic characters and a trailing `s`, keeping case.
fn strip_check(token: &str) -> String {
    singularize(token.trim().chars().filter(|c| c.is_ascii_alphabetic()).collect())
}

/// Map a free-form check token onto a [`CheckKind`].
pub fn normalize_check(token: &str) -> NormalizedCheck {
    match singularize(normalize_string(token)).as_str() {
        "plugin" => NormalizedCheck::Valid(CheckKind::Plugin),
        "config" | "setting" => NormalizedCheck::Valid(CheckKind::Config),
        "user" => NormalizedCheck::Valid(CheckKind::User),
        _ => NormalizedCheck::Invalid(strip_check(token)),
    }
}

/// Map a free-form platform hint onto a [`Platform`].
pub fn normalize_platform(hint: &str) -> Result<Platform, OrchestratorError> {
    let mut value = normalize_string(hint);
    if value != "wordpress" {
        value = singularize(value);
    }
    match value.as_str() {
        "wordpress" | "wp" => Ok(Platform::Wordpress),
        "regular" | "basic" | "reg" => Ok(Platform::Regular),
        _ => Err(OrchestratorError::UnsupportedPlatform(value)),
    }
}

/// Strip a leading scheme and `www.` from a target host.
pub fn strip_target_host(url: &str) -> &str {
    let url = url.trim();
    let url = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .unwrap_or(url);
    url.strip_prefix("www.").unwrap_or(url)
}
