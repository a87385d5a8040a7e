//! Tolerant scan of Steam's `libraryfolders.vdf`.
//!
//! The VDF format is loosely specified, so this does not parse it. It pulls
//! out every `"path" "<dir>"` pair it can find and ignores everything else,
//! including malformed or truncated entries. A strict parser can replace this
//! function without touching its callers.

use regex::Regex;
use std::path::PathBuf;

const PATH_ENTRY: &str = r#"(?i)"path"[ \t]*"([^"\r\n]+)""#;

/// Library roots listed in a `libraryfolders.vdf` body, in file order, deduplicated.
/// Never fails; an unreadable manifest simply yields no roots.
pub fn library_roots_from_manifest(text: &str) -> Vec<PathBuf> {
    let Ok(re) = Regex::new(PATH_ENTRY) else {
        return Vec::new();
    };

    let mut roots: Vec<PathBuf> = Vec::new();
    for caps in re.captures_iter(text) {
        let value = caps[1].trim();
        if value.is_empty() {
            continue;
        }
        let root = PathBuf::from(value.replace("\\\\", "\\"));
        if !roots.contains(&root) {
            roots.push(root);
        }
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_modern_layout() {
        let vdf = r#"
"libraryfolders"
{
	"0"
	{
		"path"		"C:\\Program Files (x86)\\Steam"
		"label"		""
		"apps"
		{
			"1241950"		"123456"
		}
	}
	"1"
	{
		"path"		"D:\\SteamLibrary"
	}
}
"#;
        let roots = library_roots_from_manifest(vdf);
        assert_eq!(
            roots,
            vec![
                PathBuf::from(r"C:\Program Files (x86)\Steam"),
                PathBuf::from(r"D:\SteamLibrary"),
            ]
        );
    }

    #[test]
    fn unix_paths_and_duplicates() {
        let vdf = r#"
"libraryfolders" {
  "0" { "path" "/home/u/.local/share/Steam" }
  "1" { "path" "/mnt/games/SteamLibrary" }
  "2" { "PATH" "/mnt/games/SteamLibrary" }
}
"#;
        let roots = library_roots_from_manifest(vdf);
        assert_eq!(roots.len(), 2);
        assert!(roots[1].ends_with("SteamLibrary"));
    }

    #[test]
    fn malformed_entries_are_ignored() {
        let vdf = r#"
"path" ""
"path" "   "
"path" "/ok/lib"
"path"  "/unterminated
garbage { } "label" "x"
"#;
        let roots = library_roots_from_manifest(vdf);
        assert_eq!(roots, vec![PathBuf::from("/ok/lib")]);
    }

    #[test]
    fn empty_or_binary_input_yields_nothing() {
        assert!(library_roots_from_manifest("").is_empty());
        assert!(library_roots_from_manifest("\u{0}\u{1}\u{fffd}").is_empty());
    }
}
