use std::path::Path;

use glob::Pattern;

use crate::utils::to_slash;

/// Canonical manifest left under the scanned root.
pub const MANIFEST_FILE: &str = ".dependency-filter.json";
/// Write-ahead copy of the manifest, renamed over [`MANIFEST_FILE`] at the end of a run.
pub const STAGED_MANIFEST_FILE: &str = ".dependency-filter-tmp.json";
/// Default archive name under the scanned root.
pub const ARCHIVE_FILE: &str = "dependency-filter.zip";

#[derive(Debug, Clone)]
pub enum ExcludeRule {
    /// Exact base-name match.
    Name(String),
    /// Glob matched against the `/`-separated relative path or the base name.
    Glob(Pattern),
}

impl ExcludeRule {
    fn matches(&self, rel: &str, name: &str) -> bool {
        match self {
            ExcludeRule::Name(n) => n == name,
            ExcludeRule::Glob(pat) => pat.matches(rel) || pat.matches(name),
        }
    }
}

/// Entries that must never show up in a snapshot.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    rules: Vec<ExcludeRule>,
}

impl Exclusions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tool's own bookkeeping files: both manifests, the archive and,
    /// when known, the running executable.
    pub fn reserved(archive_name: &str, executable: Option<&str>) -> Self {
        let mut exclusions = Self::new()
            .with_name(MANIFEST_FILE)
            .with_name(STAGED_MANIFEST_FILE)
            .with_name(archive_name);
        if let Some(exe) = executable {
            exclusions = exclusions.with_name(exe);
        }
        exclusions
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.rules.iter().any(|r| matches!(r, ExcludeRule::Name(n) if *n == name)) {
            self.rules.push(ExcludeRule::Name(name));
        }
        self
    }

    pub fn with_patterns(mut self, patterns: impl IntoIterator<Item = Pattern>) -> Self {
        self.rules.extend(patterns.into_iter().map(ExcludeRule::Glob));
        self
    }

    /// `rel` is relative to the scan root.
    pub fn is_excluded(&self, rel: &Path) -> bool {
        let name = rel.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let s_rel = to_slash(rel);
        self.rules.iter().any(|rule| rule.matches(&s_rel, name))
    }
}
