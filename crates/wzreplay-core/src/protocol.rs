//! `wzreplay:` argument parsing.
//!
//! Browsers and OS dispatchers hand the payload over in one of two shapes:
//!
//! - query form: `wzreplay://open?url=<encoded>` (or `open/?url=`)
//! - embedded form: `wzreplay://<encoded URL>` / `wzreplay://https://...`
//!
//! Both are accepted without knowing which one produced the argument.

use crate::error::{HandlerError, HandlerResult};
use crate::url_model::percent_decode;

/// Scheme prefix every accepted argument starts with (compared case-insensitively).
pub const SCHEME_PREFIX: &str = "wzreplay:";

/// Extracts the candidate replay URL from the raw custom-scheme argument.
///
/// The result is only shaped like an http(s) URL; run it through
/// [`crate::url_model::AllowPolicy`] before touching the network.
pub fn parse_protocol_arg(raw: &str) -> HandlerResult<String> {
    let raw = raw.trim();
    if !starts_with_ignore_case(raw, SCHEME_PREFIX) {
        return Err(HandlerError::ProtocolParse(format!(
            "Not a wzreplay: URL. Got: {}",
            raw
        )));
    }

    let rest = raw[SCHEME_PREFIX.len()..].trim_start_matches('/');

    let url = if starts_with_ignore_case(rest, "open?") || starts_with_ignore_case(rest, "open/?") {
        percent_decode(&query_value(rest, "url").unwrap_or_default())
    } else {
        percent_decode(rest)
    };
    let url = url.trim();

    if !starts_with_ignore_case(url, "http") {
        return Err(HandlerError::ProtocolParse(format!(
            "Parsed URL doesn't look like http(s): {}",
            url
        )));
    }

    Ok(url.to_string())
}

/// First non-empty value of `key` in the query part of `s` (after `?`, before `#`).
/// Values are form-decoded (`+` is a space).
fn query_value(s: &str, key: &str) -> Option<String> {
    let (_, query) = s.split_once('?')?;
    let query = query.split('#').next().unwrap_or("");
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(raw: &str) -> String {
        parse_protocol_arg(raw).unwrap()
    }

    #[test]
    fn query_form() {
        assert_eq!(
            ok("wzreplay://open?url=https%3A%2F%2Fwww.wz-2100.com%2Freplays%2Fabc.wzrp"),
            "https://www.wz-2100.com/replays/abc.wzrp"
        );
    }

    #[test]
    fn query_form_with_trailing_slash_variant() {
        assert_eq!(
            ok("wzreplay://open/?url=https%3A%2F%2Fwz-2100.com%2Fr.wzrp"),
            "https://wz-2100.com/r.wzrp"
        );
    }

    #[test]
    fn embedded_form_encoded() {
        assert_eq!(
            ok("wzreplay://https%3A%2F%2Fwz-2100.com%2Fr.wzrp"),
            "https://wz-2100.com/r.wzrp"
        );
    }

    #[test]
    fn embedded_form_raw() {
        assert_eq!(
            ok("wzreplay://https://wz-2100.com/r.wzrp"),
            "https://wz-2100.com/r.wzrp"
        );
    }

    #[test]
    fn scheme_is_case_insensitive_and_slashes_vary() {
        assert_eq!(
            ok("  WZReplay:open?url=https%3A%2F%2Fwz-2100.com%2Fr.wzrp  "),
            "https://wz-2100.com/r.wzrp"
        );
        assert_eq!(
            ok("wzreplay:///OPEN?url=https%3A%2F%2Fwz-2100.com%2Fr.wzrp"),
            "https://wz-2100.com/r.wzrp"
        );
    }

    #[test]
    fn query_picks_url_among_other_params() {
        assert_eq!(
            ok("wzreplay://open?v=2&url=&url=https%3A%2F%2Fwz-2100.com%2Fa.wzrp&x=1#frag"),
            "https://wz-2100.com/a.wzrp"
        );
    }

    #[test]
    fn double_encoded_value_is_decoded_twice() {
        assert_eq!(
            ok("wzreplay://open?url=https%253A%252F%252Fwz-2100.com%252Fr.wzrp"),
            "https://wz-2100.com/r.wzrp"
        );
    }

    #[test]
    fn rejects_other_schemes() {
        for raw in ["https://wz-2100.com/r.wzrp", "wzreplayx://open", "", "wz"] {
            assert!(matches!(
                parse_protocol_arg(raw),
                Err(HandlerError::ProtocolParse(_))
            ));
        }
    }

    #[test]
    fn rejects_missing_or_non_http_url() {
        for raw in [
            "wzreplay://open?foo=bar",
            "wzreplay://open?url=",
            "wzreplay://ftp%3A%2F%2Fwz-2100.com%2Fr.wzrp",
            "wzreplay://",
        ] {
            assert!(matches!(
                parse_protocol_arg(raw),
                Err(HandlerError::ProtocolParse(_))
            ));
        }
    }
}
