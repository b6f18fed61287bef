//! Folder hierarchy and table-of-contents order

use std::cmp::Ordering;

use crate::unit::FileUnit;

/// A node of the folder hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TocNode {
    Directory {
        name: String,
        /// `/`-separated path from the project root; empty for the root.
        path: String,
        children: Vec<TocNode>,
    },
    File {
        name: String,
        /// Index into the project's units.
        unit: usize,
    },
}

impl TocNode {
    pub(crate) fn root() -> Self {
        TocNode::Directory {
            name: String::new(),
            path: String::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TocNode::Directory { name, .. } | TocNode::File { name, .. } => name,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, TocNode::Directory { .. })
    }

    pub fn children(&self) -> &[TocNode] {
        match self {
            TocNode::Directory { children, .. } => children,
            TocNode::File { .. } => &[],
        }
    }

    /// Unit indices in depth-first order.
    pub fn files(&self) -> Vec<usize> {
        let mut files = Vec::new();
        self.collect_files(&mut files);
        files
    }

    fn collect_files(&self, files: &mut Vec<usize>) {
        match self {
            TocNode::File { unit, .. } => files.push(*unit),
            TocNode::Directory { children, .. } => {
                for child in children {
                    child.collect_files(files);
                }
            }
        }
    }

    /// Find the directory at `path`.
    pub fn directory(&self, path: &str) -> Option<&TocNode> {
        if path.is_empty() {
            return self.is_directory().then_some(self);
        }
        path.split('/').try_fold(self, |node, segment| {
            node.children()
                .iter()
                .find(|child| child.is_directory() && child.name() == segment)
        })
    }

    fn insert(&mut self, segments: &[&str], unit: usize) {
        let TocNode::Directory { path, children, .. } = self else {
            return;
        };
        match segments {
            [] => {}
            [file] => children.push(TocNode::File {
                name: (*file).to_string(),
                unit,
            }),
            [dir, rest @ ..] => {
                let position = children
                    .iter()
                    .position(|child| child.is_directory() && child.name() == *dir);
                let index = match position {
                    Some(index) => index,
                    None => {
                        let child_path = if path.is_empty() {
                            (*dir).to_string()
                        } else {
                            format!("{path}/{dir}")
                        };
                        children.push(TocNode::Directory {
                            name: (*dir).to_string(),
                            path: child_path,
                            children: Vec::new(),
                        });
                        children.len() - 1
                    }
                };
                children[index].insert(rest, unit);
            }
        }
    }

    fn sort(&mut self) {
        if let TocNode::Directory { children, .. } = self {
            children.sort_by(compare_siblings);
            for child in children {
                child.sort();
            }
        }
    }

    fn remap(&mut self, new_index: &[usize]) {
        match self {
            TocNode::File { unit, .. } => *unit = new_index[*unit],
            TocNode::Directory { children, .. } => {
                for child in children {
                    child.remap(new_index);
                }
            }
        }
    }
}

/// Directories first, then case-insensitive by name, then by exact name.
fn compare_siblings(a: &TocNode, b: &TocNode) -> Ordering {
    b.is_directory()
        .cmp(&a.is_directory())
        .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
        .then_with(|| a.name().cmp(b.name()))
}

/// Build the sorted hierarchy and return the units in TOC order, with the
/// tree's indices pointing into the returned vector.
pub(crate) fn build(units: Vec<FileUnit>) -> (TocNode, Vec<FileUnit>) {
    let mut root = TocNode::root();
    for (index, unit) in units.iter().enumerate() {
        let segments: Vec<&str> = unit.source_path.split('/').collect();
        root.insert(&segments, index);
    }
    root.sort();

    let order = root.files();
    let mut new_index = vec![0; units.len()];
    for (position, &old) in order.iter().enumerate() {
        new_index[old] = position;
    }
    root.remap(&new_index);

    let mut slots: Vec<Option<FileUnit>> = units.into_iter().map(Some).collect();
    let ordered = order
        .iter()
        .filter_map(|&old| slots[old].take())
        .collect();

    (root, ordered)
}
