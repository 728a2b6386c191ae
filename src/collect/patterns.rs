// src/collect/patterns.rs

use std::fmt;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;

use crate::errors::{ReloadError, Result};

/// Prefix marking an ignore pattern as a regular expression.
pub const REGEX_PREFIX: &str = "re:";

/// Compiled ignore patterns.
///
/// Plain patterns are globs (`*.log`, `tmp_*`, `build/**`); patterns prefixed
/// with `re:` are regular expressions searched anywhere in the candidate.
#[derive(Clone)]
pub struct IgnoreMatcher {
    globs: Option<GlobSet>,
    regexes: Vec<Regex>,
    patterns: Vec<String>,
}

impl fmt::Debug for IgnoreMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreMatcher")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl IgnoreMatcher {
    /// Compile `patterns`. Any malformed entry is an
    /// [`ReloadError::InvalidPattern`].
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut glob_count = 0usize;
        let mut regexes = Vec::new();

        for pat in patterns {
            if let Some(expr) = pat.strip_prefix(REGEX_PREFIX) {
                let re = Regex::new(expr).map_err(|e| invalid(pat, e))?;
                regexes.push(re);
            } else {
                let glob = Glob::new(pat).map_err(|e| invalid(pat, e))?;
                builder.add(glob);
                glob_count += 1;
            }
        }

        let globs = if glob_count == 0 {
            None
        } else {
            Some(builder.build().map_err(|e| invalid(&patterns.join(", "), e))?)
        };

        Ok(Self {
            globs,
            regexes,
            patterns: patterns.to_vec(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True if any pattern matches any of the candidate strings.
    pub fn is_match(&self, candidates: &[&str]) -> bool {
        candidates.iter().any(|c| {
            self.globs.as_ref().is_some_and(|g| g.is_match(c))
                || self.regexes.iter().any(|re| re.is_match(c))
        })
    }

    /// Match a scanned file against its file name, its path relative to
    /// `root` and its absolute path.
    pub fn matches_file(&self, root: &Path, path: &Path) -> bool {
        if self.is_empty() {
            return false;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let rel = relative_str(root, path).unwrap_or_default();
        let abs = path.to_string_lossy().replace('\\', "/");
        self.is_match(&[&name, &rel, &abs])
    }
}

fn invalid(pattern: &str, err: impl fmt::Display) -> ReloadError {
    ReloadError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: err.to_string(),
    }
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if `path` does not live under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(patterns: &[&str]) -> IgnoreMatcher {
        let owned: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        IgnoreMatcher::new(&owned).unwrap()
    }

    #[test]
    fn glob_matches_by_file_name() {
        let m = matcher(&["*.log"]);
        let root = Path::new("/proj");
        assert!(m.matches_file(root, Path::new("/proj/b.log")));
        assert!(m.matches_file(root, Path::new("/proj/logs/deep/b.log")));
        assert!(!m.matches_file(root, Path::new("/proj/a.py")));
    }

    #[test]
    fn bare_name_matches_exact_file_name_only() {
        let m = matcher(&["settings.py"]);
        let root = Path::new("/proj");
        assert!(m.matches_file(root, Path::new("/proj/app/settings.py")));
        assert!(!m.matches_file(root, Path::new("/proj/app/local_settings.py")));
    }

    #[test]
    fn regex_patterns_are_searched() {
        let m = matcher(&[r"re:^tmp_.*\.py$"]);
        let root = Path::new("/proj");
        assert!(m.matches_file(root, Path::new("/proj/tmp_scratch.py")));
        assert!(!m.matches_file(root, Path::new("/proj/main.py")));
    }

    #[test]
    fn relative_globs_match_against_root_relative_path() {
        let m = matcher(&["generated/**"]);
        let root = Path::new("/proj");
        assert!(m.matches_file(root, Path::new("/proj/generated/api/client.rs")));
        assert!(!m.matches_file(root, Path::new("/proj/src/generated.rs")));
    }

    #[test]
    fn malformed_patterns_are_reported() {
        let bad_glob = IgnoreMatcher::new(&["src/[".to_string()]).unwrap_err();
        assert!(matches!(bad_glob, ReloadError::InvalidPattern { ref pattern, .. } if pattern == "src/["));

        let bad_regex = IgnoreMatcher::new(&["re:a(".to_string()]).unwrap_err();
        assert!(matches!(bad_regex, ReloadError::InvalidPattern { .. }));
    }
}
