//! File units
//!
//! A [`FileUnit`] is one source file after segmentation: its blocks, the
//! page it will be rendered to, its title and its outline.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::language::LanguageDescriptor;
use crate::outline::{self, Heading, Reference};
use crate::segment::{segment, Block};

/// Extension of rendered pages.
pub const PAGE_EXTENSION: &str = "html";

/// Page the index file is rendered to.
pub const INDEX_PAGE: &str = "index.html";

/// Default index file.
pub const DEFAULT_INDEX: &str = "README.md";

/// How a source path becomes a page path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputNaming {
    /// `a/b.rs` → `a/b.rs.html`
    #[default]
    Append,
    /// `a/b.rs` → `a/b.html`
    Replace,
}

impl std::str::FromStr for OutputNaming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(Self::Append),
            "replace" => Ok(Self::Replace),
            other => Err(format!("unknown output naming '{other}' (expected append or replace)")),
        }
    }
}

/// Maps source paths to output page paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMapper {
    /// Leading directories removed from output paths; the first match wins.
    pub strip: Vec<String>,
    pub naming: OutputNaming,
    /// Source path rendered as `index.html`.
    pub index: Option<String>,
}

impl Default for OutputMapper {
    fn default() -> Self {
        Self {
            strip: Vec::new(),
            naming: OutputNaming::Append,
            index: Some(DEFAULT_INDEX.to_string()),
        }
    }
}

impl OutputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strip(mut self, prefix: impl Into<String>) -> Self {
        self.strip.push(prefix.into());
        self
    }

    pub fn with_naming(mut self, naming: OutputNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_index(mut self, index: Option<String>) -> Self {
        self.index = index.map(|i| normalize_path(&i));
        self
    }

    /// Output page path for a (normalized) source path.
    pub fn map(&self, source: &str) -> String {
        if self.index.as_deref() == Some(source) {
            return INDEX_PAGE.to_string();
        }

        let stripped = self
            .strip
            .iter()
            .map(|prefix| prefix.trim_matches('/'))
            .filter(|prefix| !prefix.is_empty())
            .find_map(|prefix| {
                source
                    .strip_prefix(prefix)
                    .and_then(|rest| rest.strip_prefix('/'))
                    .filter(|rest| !rest.is_empty())
            })
            .unwrap_or(source);

        match self.naming {
            OutputNaming::Append => format!("{stripped}.{PAGE_EXTENSION}"),
            OutputNaming::Replace => {
                let (dir, name) = split_file_name(stripped);
                let stem = match name.rfind('.') {
                    Some(dot) if dot > 0 => &name[..dot],
                    _ => name,
                };
                format!("{dir}{stem}.{PAGE_EXTENSION}")
            }
        }
    }
}

/// One segmented source file.
#[derive(Debug, Clone)]
pub struct FileUnit {
    /// Relative, `/`-separated source path; unique within a project.
    pub source_path: String,
    /// Relative path of the rendered page.
    pub output_path: String,
    pub title: String,
    pub blocks: Vec<Block>,
    pub language: Arc<LanguageDescriptor>,
    pub headings: Vec<Heading>,
    pub references: Vec<Reference>,
}

impl FileUnit {
    /// Segment a file and derive everything the project needs from it.
    pub fn build(
        path: &str,
        text: &str,
        language: Arc<LanguageDescriptor>,
        mapper: &OutputMapper,
    ) -> Self {
        let source_path = normalize_path(path);
        let blocks = segment(text, &language);
        let title = derive_title(&blocks, &source_path);
        let outline = outline::extract(&blocks);

        Self {
            output_path: mapper.map(&source_path),
            source_path,
            title,
            blocks,
            language,
            headings: outline.headings,
            references: outline.references,
        }
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        split_file_name(&self.source_path).1
    }

    /// Directory part of the source path, empty at the root.
    pub fn directory(&self) -> &str {
        split_file_name(&self.source_path).0.trim_end_matches('/')
    }
}

/// Title of a file: the first line of its first prose block, else its name.
pub fn derive_title(blocks: &[Block], source_path: &str) -> String {
    blocks
        .iter()
        .find(|b| b.is_prose())
        .and_then(|block| {
            block
                .lines
                .iter()
                .map(|line| strip_heading_markers(&line.content))
                .find(|line| !line.is_empty())
        })
        .map_or_else(|| split_file_name(source_path).1.to_string(), str::to_string)
}

fn strip_heading_markers(line: &str) -> &str {
    let line = line.trim();
    let line = line.trim_start_matches('#').trim();
    line.trim_end_matches('#').trim_end()
}

/// Normalize a relative source path: `/` separators, no `./` segments, no
/// empty segments.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Split a path into its directory prefix (with trailing `/`) and file name.
fn split_file_name(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(slash) => (&path[..=slash], &path[slash + 1..]),
        None => ("", path),
    }
}
