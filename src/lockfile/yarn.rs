//! Parser for the flow-style yarn.lock v1 format.

use regex::Regex;

use super::{InstalledPackage, InstalledPackages};
use crate::result::Result;

/// Parse yarn.lock v1 text into installed packages.
///
/// Declaration headers are unindented lines ending in `:`, holding one or
/// more comma-joined specifiers like `"@scope/pkg@^1.0.0"`. Only the first
/// specifier is canonical. The installed version comes from the indented
/// `version "x.y.z"` line inside the block, never from the specifier itself.
pub fn parse(text: &str) -> Result<InstalledPackages> {
    // Matches declaration headers like "package-a@^1.0.0:"
    let header_regex = Regex::new(r"^[^\s#].*:$")?;
    let version_regex = Regex::new(r#"^\s+version\s+"(?<version>[^"]*)""#)?;

    let mut pkgs = InstalledPackages::new();
    let mut current_name: Option<String> = None;

    for line in text.lines() {
        if header_regex.is_match(line) {
            current_name = name_of(line.trim_end_matches(':'));
            continue;
        }

        if let (Some(name), Some(caps)) =
            (current_name.as_ref(), version_regex.captures(line))
        {
            pkgs.insert(
                name.clone(),
                InstalledPackage {
                    name: name.clone(),
                    version: caps["version"].to_string(),
                },
            );
        }
    }

    Ok(pkgs)
}

/// Extract the package name from a declaration key.
///
/// The key splits on `@`; an empty first segment means the name is scoped and
/// the true name is `@` followed by the second segment.
fn name_of(key: &str) -> Option<String> {
    let first_specifier = key.split(',').next()?.trim();
    let specifier = first_specifier.trim_matches('"');

    let mut parts = specifier.split('@');
    match parts.next() {
        Some("") => parts.next().map(|scoped| format!("@{scoped}")),
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_package() {
        let text = r#"# THIS IS AN AUTOGENERATED FILE. DO NOT EDIT THIS FILE DIRECTLY.
# yarn lockfile v1


pkg@^1.0.0:
  version "1.2.3"
  resolved "https://registry.yarnpkg.com/pkg/-/pkg-1.2.3.tgz"
"#;
        let pkgs = parse(text).unwrap();
        assert_eq!(pkgs.len(), 1);
        assert_eq!(
            pkgs["pkg"],
            InstalledPackage {
                name: "pkg".into(),
                version: "1.2.3".into()
            }
        );
    }

    #[test]
    fn parses_scoped_package() {
        let text = "\"@scope/pkg@^1.0.0\":\n  version \"2.0.1\"\n";
        let pkgs = parse(text).unwrap();
        assert_eq!(pkgs["@scope/pkg"].name, "@scope/pkg");
        assert_eq!(pkgs["@scope/pkg"].version, "2.0.1");
    }

    #[test]
    fn takes_first_of_comma_joined_specifiers() {
        let text = "\"lodash@^4.17.20\", \"lodash@^4.17.21\":\n  version \"4.17.21\"\n";
        let pkgs = parse(text).unwrap();
        assert_eq!(pkgs["lodash"].version, "4.17.21");
    }

    #[test]
    fn version_comes_from_block_not_key() {
        let text = "pkg@^1.0.0:\n  version \"1.5.0\"\n";
        let pkgs = parse(text).unwrap();
        assert_eq!(pkgs["pkg"].version, "1.5.0");
    }

    #[test]
    fn duplicate_names_last_write_wins() {
        let text = r#"pkg@^1.0.0:
  version "1.0.0"

pkg@^2.0.0:
  version "2.0.0"
"#;
        let pkgs = parse(text).unwrap();
        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs["pkg"].version, "2.0.0");
    }

    #[test]
    fn parsing_is_deterministic() {
        let text = "a@^1.0.0:\n  version \"1.0.0\"\n\nb@^2.0.0:\n  version \"2.0.0\"\n";
        let first = parse(text).unwrap();
        let second = parse(text).unwrap();
        assert_eq!(first, second);

        let names: Vec<&String> = first.keys().collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
