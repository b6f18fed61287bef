//! Cross-linking between files
//!
//! This module resolves relative links written in prose to other files of
//! the project and turns them into URLs relative to the linking page.

use crate::outline::parse_reference;
use crate::project::Project;

/// Where a resolved link points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    /// Source path of the target file.
    pub source_path: String,
    /// Page the target file is rendered to.
    pub output_path: String,
    /// Anchor of the target file.
    pub anchor: String,
    /// Fragment carried over from the link, if any.
    pub fragment: Option<String>,
}

/// Resolves links written in one file of a project.
pub struct CrossLinker<'a> {
    project: &'a Project,
    /// Source path of the linking file
    current: &'a str,
}

impl<'a> CrossLinker<'a> {
    pub fn new(project: &'a Project, current: &'a str) -> Self {
        Self { project, current }
    }

    /// Resolve a link destination to a file of the project.
    pub fn resolve(&self, destination: &str) -> Option<LinkTarget> {
        let reference = parse_reference(destination, 0)?;
        let target = join_relative(directory_of(self.current), &reference.path)?;
        let unit = self.project.unit(&target)?;
        Some(LinkTarget {
            source_path: unit.source_path.clone(),
            output_path: unit.output_path.clone(),
            anchor: self.project.anchor(&unit.source_path)?.to_string(),
            fragment: reference.fragment,
        })
    }

    /// URL of a link destination relative to the current page.
    pub fn href(&self, destination: &str) -> Option<String> {
        let target = self.resolve(destination)?;
        let from = self.project.unit(self.current)?;
        let mut href = relative_url(&from.output_path, &target.output_path);
        if let Some(fragment) = &target.fragment {
            href.push('#');
            href.push_str(fragment);
        }
        Some(href)
    }
}

/// Directory part of a `/`-separated path, empty at the root.
pub fn directory_of(path: &str) -> &str {
    path.rfind('/').map_or("", |slash| &path[..slash])
}

/// Join a relative path onto a directory, folding `.` and `..` segments.
///
/// Returns `None` when the path climbs above the project root.
pub fn join_relative(directory: &str, relative: &str) -> Option<String> {
    let mut segments: Vec<&str> = directory.split('/').filter(|s| !s.is_empty()).collect();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

/// URL of page `to` as seen from page `from`; both are project-relative.
pub fn relative_url(from: &str, to: &str) -> String {
    let from_dirs: Vec<&str> = directory_of(from).split('/').filter(|s| !s.is_empty()).collect();
    let to_segments: Vec<&str> = to.split('/').collect();
    let (to_dirs, to_file) = to_segments.split_at(to_segments.len() - 1);

    let common = from_dirs
        .iter()
        .zip(to_dirs)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_dirs.len() - common];
    parts.extend_from_slice(&to_dirs[common..]);
    parts.extend_from_slice(to_file);
    parts.join("/")
}
