//! Discovery of the optional CPLEX dynamic library.
//!
//! Versioned installations announce themselves through environment variables
//! named `<PREFIX><digits>` whose value is the installation root. Candidates
//! are tried newest first; each root is walked lazily and the walk stops at
//! the first file matching the platform glob.

use super::{error::Result, settings::CandidateOrdering};
use glob::{MatchOptions, Pattern};
use regex::Regex;
use std::{
    cmp::Ordering,
    ffi::OsString,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Platform extension of dynamic libraries searched for.
pub const LIBRARY_EXTENSION: &str = if cfg!(windows) { "dll" } else { "so" };

/// An environment variable naming a versioned installation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvironmentCandidate {
    /// Variable name, e.g. `CPLEX_STUDIO_DIR2211`
    pub name: String,
    /// Digits following the prefix
    pub suffix: String,
    /// Directory the variable points to
    pub directory: PathBuf,
}

/// The library file chosen for staging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredLibrary {
    /// Candidate whose directory contained the file
    pub candidate: String,
    /// Full path of the file
    pub path: PathBuf,
}

impl DiscoveredLibrary {
    /// File name used in the output directory.
    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.path.file_name()
    }
}

/// File name glob for the library, e.g. `cplex*.so`.
#[derive(Clone, Debug)]
pub struct LibraryPattern {
    pattern: Pattern,
    options: MatchOptions,
}

impl LibraryPattern {
    /// Builds `<stem>*.<platform extension>`.
    pub fn for_host(stem: &str) -> Result<Self> {
        Self::new(stem, LIBRARY_EXTENSION)
    }

    /// Builds `<stem>*.<extension>`.
    pub fn new(stem: &str, extension: &str) -> Result<Self> {
        let pattern = Pattern::new(&format!("{}*.{}", Pattern::escape(stem), extension))?;
        let options = MatchOptions {
            case_sensitive: !cfg!(windows),
            ..MatchOptions::new()
        };
        Ok(Self { pattern, options })
    }

    /// Whether a bare file name matches.
    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.matches_with(file_name, self.options)
    }

    /// Pattern text, shown as the checklist label.
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Compares digit strings by numeric value without parsing.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Finds environment variables named `<prefix><digits>`, sorted in the order
/// they should be tried.
pub fn collect_candidates<I>(
    prefix: &str,
    vars: I,
    ordering: CandidateOrdering,
) -> Result<Vec<EnvironmentCandidate>>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let name_pattern = Regex::new(&format!("^{}([0-9]+)$", regex::escape(prefix)))?;

    let mut candidates: Vec<_> = vars
        .into_iter()
        .filter_map(|(name, value)| {
            let name = name.into_string().ok()?;
            let suffix = name_pattern.captures(&name)?.get(1)?.as_str().to_string();
            Some(EnvironmentCandidate {
                name,
                suffix,
                directory: PathBuf::from(value),
            })
        })
        .collect();

    match ordering {
        CandidateOrdering::Numeric => candidates.sort_by(|a, b| {
            compare_numeric(&b.suffix, &a.suffix).then_with(|| b.name.cmp(&a.name))
        }),
        CandidateOrdering::Lexicographic => candidates.sort_by(|a, b| b.name.cmp(&a.name)),
    }

    Ok(candidates)
}

/// Walks `root` in file-name order and returns the first matching file.
///
/// Unreadable entries are skipped; a missing root yields `None`.
pub fn find_in(root: &Path, pattern: &LibraryPattern) -> Option<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::debug!("skipping unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .find(|entry| {
            entry.path().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| pattern.matches(name))
        })
        .map(walkdir::DirEntry::into_path)
}

/// Tries candidates in order and stops at the first match anywhere.
pub fn locate(
    candidates: &[EnvironmentCandidate],
    pattern: &LibraryPattern,
) -> Option<DiscoveredLibrary> {
    candidates.iter().find_map(|candidate| {
        log::debug!(
            "Searching {} ({}) for {}",
            candidate.directory.display(),
            candidate.name,
            pattern.as_str()
        );
        find_in(&candidate.directory, pattern).map(|path| DiscoveredLibrary {
            candidate: candidate.name.clone(),
            path,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &Path)]) -> Vec<(OsString, OsString)> {
        pairs
            .iter()
            .map(|(n, p)| (OsString::from(n), p.as_os_str().to_owned()))
            .collect()
    }

    fn names(candidates: &[EnvironmentCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn only_prefix_followed_by_digits_matches() {
        let dir = Path::new("/opt");
        let found = collect_candidates(
            "CPLEX_STUDIO_DIR",
            vars(&[
                ("CPLEX_STUDIO_DIR129", dir),
                ("CPLEX_STUDIO_DIR", dir),
                ("CPLEX_STUDIO_DIR12_X", dir),
                ("XCPLEX_STUDIO_DIR1", dir),
                ("PATH", dir),
            ]),
            CandidateOrdering::Numeric,
        )
        .unwrap();

        assert_eq!(names(&found), ["CPLEX_STUDIO_DIR129"]);
        assert_eq!(found[0].suffix, "129");
    }

    #[test]
    fn numeric_ordering_puts_highest_version_first() {
        let dir = Path::new("/opt");
        let found = collect_candidates(
            "PREFIX",
            vars(&[("PREFIX9", dir), ("PREFIX12", dir), ("PREFIX0100", dir)]),
            CandidateOrdering::Numeric,
        )
        .unwrap();

        assert_eq!(names(&found), ["PREFIX0100", "PREFIX12", "PREFIX9"]);
    }

    #[test]
    fn lexicographic_ordering_compares_names_as_strings() {
        let dir = Path::new("/opt");
        let found = collect_candidates(
            "PREFIX",
            vars(&[("PREFIX12", dir), ("PREFIX9", dir)]),
            CandidateOrdering::Lexicographic,
        )
        .unwrap();

        assert_eq!(names(&found), ["PREFIX9", "PREFIX12"]);
    }

    #[test]
    fn pattern_uses_stem_and_extension() {
        let pattern = LibraryPattern::new("cplex", "so").unwrap();
        assert_eq!(pattern.as_str(), "cplex*.so");
        assert!(pattern.matches("cplex2211.so"));
        assert!(pattern.matches("cplex_abc.so"));
        assert!(!pattern.matches("libcplex.so"));
        assert!(!pattern.matches("cplex.dll"));
    }

    #[test]
    fn search_returns_first_match_in_name_order() {
        let root = tempfile::tempdir().unwrap();
        let deep = root.path().join("bin/x86-64_linux");
        std::fs::create_dir_all(&deep).unwrap();
        std::fs::write(deep.join("cplex_b.so"), b"b").unwrap();
        std::fs::write(deep.join("cplex_a.so"), b"a").unwrap();
        std::fs::create_dir(root.path().join("cplex_dir.so")).unwrap();

        let pattern = LibraryPattern::new("cplex", "so").unwrap();
        assert_eq!(find_in(root.path(), &pattern), Some(deep.join("cplex_a.so")));
    }

    #[test]
    fn missing_root_yields_nothing() {
        let pattern = LibraryPattern::new("cplex", "so").unwrap();
        assert_eq!(find_in(Path::new("/definitely/not/here"), &pattern), None);
    }

    #[test]
    fn higher_suffix_wins_when_both_match() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        std::fs::write(a.path().join("cplex_a.so"), b"A").unwrap();
        std::fs::write(b.path().join("cplex_b.so"), b"B").unwrap();

        let candidates = collect_candidates(
            "PREFIX",
            vars(&[("PREFIX9", b.path()), ("PREFIX12", a.path())]),
            CandidateOrdering::Numeric,
        )
        .unwrap();
        let pattern = LibraryPattern::new("cplex", "so").unwrap();
        let found = locate(&candidates, &pattern).unwrap();

        assert_eq!(found.candidate, "PREFIX12");
        assert_eq!(found.path, a.path().join("cplex_a.so"));
    }

    #[test]
    fn candidates_without_match_are_skipped() {
        let empty = tempfile::tempdir().unwrap();
        let full = tempfile::tempdir().unwrap();
        std::fs::write(full.path().join("cplex1.so"), b"lib").unwrap();

        let candidates = collect_candidates(
            "PREFIX",
            vars(&[("PREFIX2", empty.path()), ("PREFIX1", full.path())]),
            CandidateOrdering::Numeric,
        )
        .unwrap();
        let pattern = LibraryPattern::new("cplex", "so").unwrap();

        assert_eq!(locate(&candidates, &pattern).unwrap().candidate, "PREFIX1");
        assert!(locate(&[], &pattern).is_none());
    }
}
