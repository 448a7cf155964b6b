//! Changelog discovery for a package's source repository.

mod locator;

pub use locator::{RepoReference, locate};

use std::sync::LazyLock;

/// Candidate changelog filenames mapped to a preference rank. Lower rank
/// wins; ties keep declaration order. Never mutated at runtime.
const FILENAMES: &[(&str, u8)] = &[
    ("CHANGELOG.md", 0),
    ("ChangeLog.md", 0),
    ("Changelog.md", 2),
    ("changelog.md", 3),
    ("CHANGELOG.txt", 2),
    ("ChangeLog.txt", 3),
    ("Changelog.txt", 3),
    ("changelog.txt", 3),
    ("CHANGELOG.rdoc", 4),
    ("ChangeLog.rdoc", 4),
    ("Changelog.rdoc", 4),
    ("changelog.rdoc", 4),
    ("CHANGELOG", 2),
    ("ChangeLog", 2),
    ("Changelog", 3),
    ("changelog", 3),
    ("HISTORY.md", 1),
    ("History.md", 1),
    ("history.md", 3),
    ("HISTORY.txt", 2),
    ("History.txt", 3),
    ("history.txt", 3),
    ("HISTORY.rdoc", 4),
    ("History.rdoc", 2),
    ("history.rdoc", 4),
    ("HISTORY", 3),
    ("History", 3),
    ("history", 3),
    ("NEWS.md", 1),
    ("News.md", 2),
    ("news.md", 3),
    ("NEWS.txt", 3),
    ("News.txt", 3),
    ("news.txt", 3),
    ("NEWS.rdoc", 4),
    ("News.rdoc", 4),
    ("news.rdoc", 4),
    ("NEWS", 2),
    ("News", 3),
    ("news", 3),
    ("Releases", 2),
];

/// Filenames ordered by ascending rank, declaration order within a rank.
pub(crate) static SORTED_FILENAMES: LazyLock<Vec<&'static str>> =
    LazyLock::new(|| {
        let mut entries = FILENAMES.to_vec();
        entries.sort_by_key(|(_, rank)| *rank);
        entries.into_iter().map(|(name, _)| name).collect()
    });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_candidates_come_first() {
        assert_eq!(SORTED_FILENAMES[0], "CHANGELOG.md");
        assert_eq!(SORTED_FILENAMES[1], "ChangeLog.md");
    }

    #[test]
    fn sort_is_stable_within_rank() {
        let rank_one: Vec<&str> = SORTED_FILENAMES
            .iter()
            .skip(2)
            .take(3)
            .copied()
            .collect();
        assert_eq!(rank_one, vec!["HISTORY.md", "History.md", "NEWS.md"]);
    }

    #[test]
    fn covers_every_declared_filename() {
        assert_eq!(SORTED_FILENAMES.len(), FILENAMES.len());
    }

    #[test]
    fn uppercase_beats_lowercase() {
        let upper = SORTED_FILENAMES
            .iter()
            .position(|name| *name == "CHANGELOG.md")
            .unwrap();
        let lower = SORTED_FILENAMES
            .iter()
            .position(|name| *name == "changelog.md")
            .unwrap();
        assert!(upper < lower);
    }
}
