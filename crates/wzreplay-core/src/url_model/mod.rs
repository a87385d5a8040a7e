//! URL modeling: allow-list validation and artifact filename derivation.
//!
//! Everything that decides whether a remote URL may be touched, and what the
//! downloaded file is called on disk, lives here.

mod path;
mod percent;
mod policy;
mod sanitize;

pub use path::filename_from_url_path;
pub use percent::percent_decode;
pub use policy::{AllowPolicy, Rejection, ReplayUrl, ALLOWED_HOSTS, ALLOWED_SCHEME, REPLAY_EXTENSION};
pub use sanitize::sanitize_filename;

/// Stem used when the URL path yields no usable filename.
const DEFAULT_STEM: &str = "replay";

/// Derives the on-disk name for a validated replay URL.
///
/// Uses the basename of the URL path, percent-decoded and sanitized. If that
/// is empty or no longer ends with `extension`, falls back to `replay<extension>`.
///
/// # Examples
///
/// - `https://wz-2100.com/replays/abc.wzrp` → `abc.wzrp`
/// - `https://wz-2100.com/replays/.wzrp` → `replay.wzrp`
pub fn derive_replay_filename(url: &ReplayUrl, extension: &str) -> String {
    let fallback = format!("{}{}", DEFAULT_STEM, extension);
    let raw = match filename_from_url_path(url.url()) {
        Some(r) => r,
        None => return fallback,
    };

    let sanitized = sanitize_filename(&raw);
    if sanitized.is_empty()
        || !sanitized
            .to_ascii_lowercase()
            .ends_with(&extension.to_ascii_lowercase())
    {
        fallback
    } else {
        sanitized
    }
}
