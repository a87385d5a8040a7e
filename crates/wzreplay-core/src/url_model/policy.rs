//! Allow-list gate applied before any network or filesystem side effect.

use std::fmt;
use url::Url;

/// Only scheme accepted by default.
pub const ALLOWED_SCHEME: &str = "https";
/// Required (lower-cased) path suffix of a replay URL.
pub const REPLAY_EXTENSION: &str = ".wzrp";
/// Hosts trusted to serve replays by default.
pub const ALLOWED_HOSTS: [&str; 2] = ["www.wz-2100.com", "wz-2100.com"];

/// Why a candidate URL was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Unparseable,
    Scheme(String),
    Extension,
    Credentials,
    Host(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Unparseable => write!(f, "not a valid URL"),
            Rejection::Scheme(s) => write!(f, "scheme {:?} is not allowed", s),
            Rejection::Extension => write!(f, "path does not end with the replay extension"),
            Rejection::Credentials => write!(f, "URL carries user info"),
            Rejection::Host(h) => write!(f, "host {:?} is not allowed", h),
        }
    }
}

/// Allow-list policy: scheme, path suffix and host set must all match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowPolicy {
    scheme: String,
    extension: String,
    hosts: Vec<String>,
}

impl Default for AllowPolicy {
    fn default() -> Self {
        Self::new(ALLOWED_SCHEME, REPLAY_EXTENSION, &ALLOWED_HOSTS)
    }
}

impl AllowPolicy {
    pub fn new<S: AsRef<str>>(scheme: &str, extension: &str, hosts: &[S]) -> Self {
        Self {
            scheme: scheme.to_ascii_lowercase(),
            extension: extension.to_ascii_lowercase(),
            hosts: hosts
                .iter()
                .map(|h| h.as_ref().trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Validates `candidate` and returns the immutable [`ReplayUrl`] on success.
    pub fn check(&self, candidate: &str) -> Result<ReplayUrl, Rejection> {
        let url = Url::parse(candidate).map_err(|_| Rejection::Unparseable)?;

        if !url.scheme().eq_ignore_ascii_case(&self.scheme) {
            return Err(Rejection::Scheme(url.scheme().to_string()));
        }
        if self.extension.is_empty() || !url.path().to_ascii_lowercase().ends_with(&self.extension)
        {
            return Err(Rejection::Extension);
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(Rejection::Credentials);
        }
        let authority = authority(&url).ok_or(Rejection::Unparseable)?;
        if !self.hosts.iter().any(|h| *h == authority) {
            return Err(Rejection::Host(authority));
        }

        Ok(ReplayUrl { url })
    }

    /// Boolean form of [`AllowPolicy::check`]; parse failures are plain rejections.
    pub fn is_allowed(&self, candidate: &str) -> bool {
        self.check(candidate).is_ok()
    }
}

/// `host` or `host:port` (when a non-default port is present), lower-cased.
fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// A URL that passed the allow-list. Only [`AllowPolicy::check`] constructs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayUrl {
    url: Url,
}

impl ReplayUrl {
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for ReplayUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
