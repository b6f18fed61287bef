//! Source file discovery

use anyhow::{Context, Result};
use glob::Pattern;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

/// A file found on disk, with the path it gets inside the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// `/`-separated, relative to the root it was found under
    pub relative: String,
}

/// Walks input roots, honoring exclude patterns.
#[derive(Debug, Default)]
pub struct Discovery {
    excludes: Vec<Pattern>,
    skip: Vec<PathBuf>,
}

impl Discovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile exclude globs, matched against relative paths.
    pub fn with_excludes(mut self, patterns: &[String]) -> Result<Self> {
        for pattern in patterns {
            let compiled = Pattern::new(pattern)
                .with_context(|| format!("Invalid exclude pattern '{}'", pattern))?;
            self.excludes.push(compiled);
        }
        Ok(self)
    }

    /// Never descend into `dir`, typically the output directory.
    pub fn skipping(mut self, dir: &Path) -> Self {
        if let Ok(dir) = dir.canonicalize() {
            self.skip.push(dir);
        }
        self
    }

    /// Collect files under every root, each root's files sorted by path.
    ///
    /// Paths are relative to the deepest directory containing every root, so
    /// `folio src tests` keeps the `src/` and `tests/` prefixes while
    /// `folio src` documents `src`'s contents at the top level. A file found
    /// through two overlapping roots is listed once.
    pub fn collect(&self, roots: &[PathBuf]) -> Result<Vec<SourceFile>> {
        let roots = roots
            .iter()
            .map(|root| {
                root.canonicalize()
                    .with_context(|| format!("Path not found: {}", root.display()))
            })
            .collect::<Result<Vec<_>>>()?;
        let Some(base) = common_base(&roots) else {
            return Ok(Vec::new());
        };

        let mut files = Vec::new();
        for root in &roots {
            let prefix = relative_to(root, &base)?;
            if root.is_dir() {
                self.walk(root, &prefix, &mut files)?;
            } else if !self.is_excluded(&prefix) {
                files.push(SourceFile {
                    path: root.clone(),
                    relative: prefix,
                });
            }
        }

        let mut seen = HashSet::new();
        files.retain(|file| seen.insert(file.relative.clone()));
        tracing::debug!(files = files.len(), base = %base.display(), "discovered source files");
        Ok(files)
    }

    fn walk(&self, dir: &Path, prefix: &str, files: &mut Vec<SourceFile>) -> Result<()> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory '{}'", dir.display()))?;

        let mut entries: Vec<_> = entries.collect::<std::io::Result<_>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!(path = %path.display(), "skipping non-UTF-8 file name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let relative = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", prefix, name)
            };
            if self.is_excluded(&relative) {
                tracing::debug!(path = %relative, "excluded");
                continue;
            }

            if path.is_dir() {
                if SKIPPED_DIRS.contains(&name.as_str()) || self.is_skipped(&path) {
                    continue;
                }
                self.walk(&path, &relative, files)?;
            } else if path.is_file() {
                files.push(SourceFile { path, relative });
            }
        }

        Ok(())
    }

    fn is_excluded(&self, relative: &str) -> bool {
        self.excludes.iter().any(|p| p.matches(relative))
    }

    fn is_skipped(&self, dir: &Path) -> bool {
        if self.skip.is_empty() {
            return false;
        }
        dir.canonicalize()
            .map(|dir| self.skip.contains(&dir))
            .unwrap_or(false)
    }
}

/// Deepest directory that contains every root. A file root counts as its
/// parent directory.
fn common_base(roots: &[PathBuf]) -> Option<PathBuf> {
    let mut dirs = roots.iter().map(|root| {
        if root.is_dir() {
            root.as_path()
        } else {
            root.parent().unwrap_or(root)
        }
    });
    let mut base = dirs.next()?.to_path_buf();
    for dir in dirs {
        while !dir.starts_with(&base) {
            if !base.pop() {
                break;
            }
        }
    }
    Some(base)
}

/// `path` below `base`, `/`-separated. Empty when they are equal.
fn relative_to(path: &Path, base: &Path) -> Result<String> {
    let relative = path.strip_prefix(base).unwrap_or(path);
    let mut segments = Vec::new();
    for component in relative.components() {
        let segment = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid file name '{}'", path.display()))?;
        segments.push(segment);
    }
    Ok(segments.join("/"))
}
