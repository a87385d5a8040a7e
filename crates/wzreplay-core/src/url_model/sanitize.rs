//! Filename sanitization safe on both Windows and Linux.

/// Device names Windows refuses as file stems regardless of extension.
const WINDOWS_RESERVED: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Sanitizes a candidate filename.
///
/// - Replaces NUL, `/`, `\`, control characters, whitespace and `<>:"|?*` with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing spaces, dots and underscores
/// - Prefixes Windows device names (`CON.wzrp` -> `_CON.wzrp`)
/// - Limits length to 255 bytes (NAME_MAX)
pub fn sanitize_filename(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let replacement = if c == '\0'
            || c == '/'
            || c == '\\'
            || c.is_control()
            || c.is_whitespace()
            || matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*')
        {
            '_'
        } else {
            c
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');

    let stem = trimmed.split('.').next().unwrap_or("");
    let reserved = WINDOWS_RESERVED
        .iter()
        .any(|r| r.eq_ignore_ascii_case(stem));
    let named = if reserved {
        format!("_{}", trimmed)
    } else {
        trimmed.to_string()
    };

    if named.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !named.is_char_boundary(take) {
            take -= 1;
        }
        named[..take].to_string()
    } else {
        named
    }
}
