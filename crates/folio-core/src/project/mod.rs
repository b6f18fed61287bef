//! Project-wide aggregation
//!
//! A [`Project`] owns every [`FileUnit`] of a build in table-of-contents
//! order, together with the folder hierarchy, the anchor of each file and the
//! links that could not be resolved. It is built once, after all files are
//! segmented, and is read-only afterwards.

mod anchor;
mod toc;

use std::collections::{HashMap, HashSet};

pub use anchor::anchor_for;
pub use toc::TocNode;

use crate::crosslink::{directory_of, join_relative, CrossLinker, LinkTarget};
use crate::diagnostics::{BrokenLink, SourceLocation};
use crate::error::BuildError;
use crate::unit::{FileUnit, INDEX_PAGE};

/// All documented files of a build.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    /// Units in TOC order
    units: Vec<FileUnit>,
    toc: TocNode,
    by_source: HashMap<String, usize>,
    anchors: Vec<String>,
    broken_links: Vec<BrokenLink>,
}

/// A directory on the way from the root to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub name: String,
    pub path: String,
}

/// Where a file sits in the project, for page navigation.
#[derive(Debug, Clone)]
pub struct NavContext<'a> {
    pub breadcrumbs: Vec<Breadcrumb>,
    pub previous: Option<&'a FileUnit>,
    pub next: Option<&'a FileUnit>,
    /// 1-based position among the files of the same directory.
    pub position: usize,
    /// Number of files in the same directory.
    pub siblings: usize,
}

impl Project {
    /// Aggregate segmented files into a project.
    pub fn build(name: impl Into<String>, units: Vec<FileUnit>) -> Result<Self, BuildError> {
        check_unique(&units)?;

        let (toc, units) = toc::build(units);
        let by_source = units
            .iter()
            .enumerate()
            .map(|(index, unit)| (unit.source_path.clone(), index))
            .collect();
        let anchors = units.iter().map(|u| anchor_for(&u.source_path)).collect();

        let mut project = Self {
            name: name.into(),
            units,
            toc,
            by_source,
            anchors,
            broken_links: Vec::new(),
        };
        project.broken_links = project.find_broken_links();

        tracing::debug!(
            files = project.units.len(),
            broken_links = project.broken_links.len(),
            "project built"
        );
        Ok(project)
    }

    fn find_broken_links(&self) -> Vec<BrokenLink> {
        let mut broken = Vec::new();
        for unit in &self.units {
            let directory = directory_of(&unit.source_path);
            for reference in &unit.references {
                let resolved = join_relative(directory, &reference.path)
                    .is_some_and(|target| self.by_source.contains_key(&target));
                if !resolved {
                    broken.push(BrokenLink {
                        location: SourceLocation {
                            path: unit.source_path.clone(),
                            line: reference.line,
                        },
                        target: reference.raw.clone(),
                    });
                }
            }
        }
        broken
    }

    /// Units in TOC order.
    pub fn units(&self) -> &[FileUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Look up a unit by source path.
    pub fn unit(&self, source_path: &str) -> Option<&FileUnit> {
        self.position(source_path).map(|index| &self.units[index])
    }

    /// TOC position of a unit.
    pub fn position(&self, source_path: &str) -> Option<usize> {
        self.by_source.get(source_path).copied()
    }

    /// Anchor of a file.
    pub fn anchor(&self, source_path: &str) -> Option<&str> {
        self.position(source_path).map(|index| self.anchors[index].as_str())
    }

    /// Root of the folder hierarchy.
    pub fn toc(&self) -> &TocNode {
        &self.toc
    }

    /// Relative links whose target is not in the project.
    pub fn broken_links(&self) -> &[BrokenLink] {
        &self.broken_links
    }

    /// The unit rendered as the site's front page, if any.
    pub fn index_unit(&self) -> Option<&FileUnit> {
        self.units.iter().find(|u| u.output_path == INDEX_PAGE)
    }

    /// Resolve a link written in `from` to the file it points at.
    pub fn resolve_link(&self, from: &str, destination: &str) -> Option<LinkTarget> {
        CrossLinker::new(self, from).resolve(destination)
    }

    /// URL of a link written in `from`, relative to `from`'s page.
    pub fn href(&self, from: &str, destination: &str) -> Option<String> {
        CrossLinker::new(self, from).href(destination)
    }

    /// Navigation context of a file.
    pub fn nav(&self, source_path: &str) -> Option<NavContext<'_>> {
        let index = self.position(source_path)?;
        let unit = &self.units[index];

        let mut breadcrumbs = Vec::new();
        let mut path = String::new();
        for segment in unit.directory().split('/').filter(|s| !s.is_empty()) {
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(segment);
            breadcrumbs.push(Breadcrumb {
                name: segment.to_string(),
                path: path.clone(),
            });
        }

        let siblings: Vec<usize> = self
            .toc
            .directory(unit.directory())
            .map(|dir| {
                dir.children()
                    .iter()
                    .filter_map(|child| match child {
                        TocNode::File { unit, .. } => Some(*unit),
                        TocNode::Directory { .. } => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        let position = siblings.iter().position(|&i| i == index).map_or(0, |p| p + 1);

        Some(NavContext {
            breadcrumbs,
            previous: index.checked_sub(1).map(|i| &self.units[i]),
            next: self.units.get(index + 1),
            position,
            siblings: siblings.len(),
        })
    }
}

fn check_unique(units: &[FileUnit]) -> Result<(), BuildError> {
    let mut sources: HashSet<&str> = HashSet::with_capacity(units.len());
    let mut outputs: HashMap<&str, &str> = HashMap::with_capacity(units.len());
    for unit in units {
        if !sources.insert(&unit.source_path) {
            return Err(BuildError::DuplicateSourcePath(unit.source_path.clone()));
        }
        if let Some(first) = outputs.insert(&unit.output_path, &unit.source_path) {
            return Err(BuildError::DuplicateOutputPath {
                output: unit.output_path.clone(),
                first: first.to_string(),
                second: unit.source_path.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageDescriptor;
    use crate::unit::{OutputMapper, OutputNaming};
    use std::sync::Arc;

    fn slash() -> Arc<LanguageDescriptor> {
        Arc::new(LanguageDescriptor::new("Slash").with_line_comment("//"))
    }

    fn unit(path: &str, text: &str) -> FileUnit {
        FileUnit::build(path, text, slash(), &OutputMapper::new())
    }

    fn sample() -> Project {
        Project::build(
            "sample",
            vec![
                unit(
                    "src/main.rs",
                    "// # Main\n// See [util](util/io.rs#read) and [gone](nope.rs).\nfn main() {}",
                ),
                unit("src/util/io.rs", "// IO helpers, back to [main](../main.rs).\nfn read() {}"),
                unit("src/lib.rs", "fn lib() {}"),
                unit("build.rs", "fn build() {}"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_units_follow_toc_order() {
        let project = sample();
        let order: Vec<_> = project.units().iter().map(|u| u.source_path.as_str()).collect();
        assert_eq!(order, vec!["src/util/io.rs", "src/lib.rs", "src/main.rs", "build.rs"]);
        assert_eq!(project.position("src/main.rs"), Some(2));
        assert_eq!(project.anchor("src/util/io.rs"), Some("src-util-io.rs"));
    }

    #[test]
    fn test_broken_links_are_recorded() {
        let project = sample();
        assert_eq!(project.broken_links().len(), 1);
        let broken = &project.broken_links()[0];
        assert_eq!(broken.target, "nope.rs");
        assert_eq!(broken.location.path, "src/main.rs");
        assert_eq!(broken.location.line, 2);
    }

    #[test]
    fn test_resolves_links_relative_to_file() {
        let project = sample();
        let target = project.resolve_link("src/main.rs", "util/io.rs#read").unwrap();
        assert_eq!(target.source_path, "src/util/io.rs");
        assert_eq!(target.output_path, "src/util/io.rs.html");
        assert_eq!(target.fragment.as_deref(), Some("read"));

        assert_eq!(
            project.href("src/main.rs", "util/io.rs#read").as_deref(),
            Some("util/io.rs.html#read")
        );
        assert_eq!(
            project.href("src/util/io.rs", "../main.rs").as_deref(),
            Some("../main.rs.html")
        );
        assert!(project.resolve_link("src/main.rs", "nope.rs").is_none());
        assert!(project.resolve_link("src/main.rs", "https://example.com").is_none());
    }

    #[test]
    fn test_navigation_context() {
        let project = sample();
        let nav = project.nav("src/lib.rs").unwrap();
        assert_eq!(
            nav.breadcrumbs,
            vec![Breadcrumb {
                name: "src".into(),
                path: "src".into()
            }]
        );
        assert_eq!(nav.previous.unwrap().source_path, "src/util/io.rs");
        assert_eq!(nav.next.unwrap().source_path, "src/main.rs");
        assert_eq!((nav.position, nav.siblings), (1, 2));

        let first = project.nav("src/util/io.rs").unwrap();
        assert!(first.previous.is_none());
        assert_eq!(first.breadcrumbs.len(), 2);
        assert_eq!(first.breadcrumbs[1].path, "src/util");

        let last = project.nav("build.rs").unwrap();
        assert!(last.next.is_none());
        assert!(last.breadcrumbs.is_empty());
        assert_eq!((last.position, last.siblings), (1, 1));

        assert!(project.nav("missing.rs").is_none());
    }

    #[test]
    fn test_rejects_duplicate_output_paths() {
        let mapper = OutputMapper::new().with_naming(OutputNaming::Replace);
        let units = vec![
            FileUnit::build("lib.rs", "", slash(), &mapper),
            FileUnit::build("lib.py", "", slash(), &mapper),
        ];
        assert_eq!(
            Project::build("dup", units).unwrap_err(),
            BuildError::DuplicateOutputPath {
                output: "lib.html".into(),
                first: "lib.rs".into(),
                second: "lib.py".into(),
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_source_paths() {
        let units = vec![unit("a.rs", ""), unit("./a.rs", "")];
        assert_eq!(
            Project::build("dup", units).unwrap_err(),
            BuildError::DuplicateSourcePath("a.rs".into())
        );
    }

    #[test]
    fn test_index_unit_is_found() {
        let project =
            Project::build("p", vec![unit("README.md", "// # Hi"), unit("a.rs", "")]).unwrap();
        assert_eq!(project.index_unit().unwrap().source_path, "README.md");
        assert!(sample().index_unit().is_none());
    }
}
