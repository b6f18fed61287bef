//! Non-fatal problems collected during a build
//!
//! Nothing in here stops a build. Skipped files and broken links are gathered
//! while the pipeline runs and reported once at the end.

use std::fmt;

/// Why a file was left out of the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No registered language claims the file's name or extension.
    UnrecognizedLanguage,
    /// The file could not be read as UTF-8 text.
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedLanguage => write!(f, "unrecognized language"),
            Self::Unreadable(reason) => write!(f, "unreadable: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub reason: SkipReason,
}

/// A position in a source file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceLocation {
    pub path: String,
    /// 1-based
    pub line: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

/// A relative link whose target is not part of the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLink {
    pub location: SourceLocation,
    /// Destination as written in the source.
    pub target: String,
}

/// Everything worth telling the user about after a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub skipped: Vec<SkippedFile>,
    pub broken_links: Vec<BrokenLink>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(&mut self, path: impl Into<String>, reason: SkipReason) {
        let path = path.into();
        tracing::warn!(path = %path, reason = %reason, "skipping file");
        self.skipped.push(SkippedFile { path, reason });
    }

    pub fn broken_link(&mut self, location: SourceLocation, target: impl Into<String>) {
        let target = target.into();
        tracing::warn!(location = %location, target = %target, "broken link");
        self.broken_links.push(BrokenLink { location, target });
    }

    /// Append another set of diagnostics.
    pub fn extend(&mut self, other: Diagnostics) {
        self.skipped.extend(other.skipped);
        self.broken_links.extend(other.broken_links);
    }

    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty() && self.broken_links.is_empty()
    }

    pub fn len(&self) -> usize {
        self.skipped.len() + self.broken_links.len()
    }

    /// Skipped files that had no language.
    pub fn unrecognized(&self) -> impl Iterator<Item = &SkippedFile> {
        self.skipped
            .iter()
            .filter(|s| s.reason == SkipReason::UnrecognizedLanguage)
    }
}

/// Multi-line report, one problem per line, grouped by kind.
impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.skipped.is_empty() {
            writeln!(f, "skipped {} file(s):", self.skipped.len())?;
            for skipped in &self.skipped {
                writeln!(f, "  {}: {}", skipped.path, skipped.reason)?;
            }
        }
        if !self.broken_links.is_empty() {
            writeln!(f, "{} broken link(s):", self.broken_links.len())?;
            for link in &self.broken_links {
                writeln!(f, "  {}: {}", link.location, link.target)?;
            }
        }
        Ok(())
    }
}
