//! Language registry
//!
//! Maps file extensions and exact file names to [`LanguageDescriptor`]s, the
//! comment-syntax rules the segmenter needs to split a file into prose and
//! code. The registry is an ordinary value: build it once with
//! [`LanguageRegistry::builtin`], optionally layer configured languages on top,
//! and pass it by reference to whatever needs lookups.

mod builtin;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while registering languages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("extension '{extension}' is claimed by both '{existing}' and '{incoming}'")]
    DuplicateExtension {
        extension: String,
        existing: String,
        incoming: String,
    },

    #[error("file name '{file_name}' is claimed by both '{existing}' and '{incoming}'")]
    DuplicateFileName {
        file_name: String,
        existing: String,
        incoming: String,
    },
}

/// Open/close markers of a block comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockComment {
    /// Marker that opens the comment, e.g. `/*`.
    pub open: String,

    /// Optional prefix repeated on interior lines, e.g. the `*` in ` * text`.
    #[serde(default)]
    pub middle: Option<String>,

    /// Marker that closes the comment, e.g. `*/`.
    pub close: String,
}

impl BlockComment {
    /// Create block comment markers without a middle prefix.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            middle: None,
            close: close.into(),
        }
    }

    /// Set the interior line prefix.
    #[must_use]
    pub fn with_middle(mut self, middle: impl Into<String>) -> Self {
        self.middle = Some(middle.into());
        self
    }
}

/// Comment-syntax rules for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct LanguageDescriptor {
    /// Display name, e.g. `Rust`.
    pub name: String,

    /// Extensions claimed by this language, without the leading dot.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Exact file names claimed by this language, e.g. `Makefile`.
    #[serde(default)]
    pub file_names: Vec<String>,

    /// Line comment prefixes, e.g. `//`.
    #[serde(default)]
    pub line_comments: Vec<String>,

    /// Block comment marker pairs.
    #[serde(default)]
    pub block_comments: Vec<BlockComment>,

    /// Whether block comments nest.
    #[serde(default)]
    pub nested: bool,

    /// Identifier handed to the highlighter.
    #[serde(default)]
    pub highlighter: String,

    /// Comments whose text starts with this prefix stay in the code.
    #[serde(default)]
    pub ignore_prefix: Option<String>,

    /// Comments whose text starts with this prefix fold the next code block.
    #[serde(default)]
    pub fold_prefix: Option<String>,

    /// The whole file is prose (Markdown, plain text).
    #[serde(default)]
    pub prose_only: bool,
}

impl LanguageDescriptor {
    /// Create a descriptor with no comment syntax.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            highlighter: name.to_lowercase(),
            name,
            extensions: Vec::new(),
            file_names: Vec::new(),
            line_comments: Vec::new(),
            block_comments: Vec::new(),
            nested: false,
            ignore_prefix: None,
            fold_prefix: None,
            prose_only: false,
        }
    }

    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions.extend(extensions.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_file_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_names.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_line_comment(mut self, prefix: impl Into<String>) -> Self {
        self.line_comments.push(prefix.into());
        self
    }

    #[must_use]
    pub fn with_block_comment(mut self, block: BlockComment) -> Self {
        self.block_comments.push(block);
        self
    }

    #[must_use]
    pub fn nested(mut self, nested: bool) -> Self {
        self.nested = nested;
        self
    }

    #[must_use]
    pub fn with_highlighter(mut self, highlighter: impl Into<String>) -> Self {
        self.highlighter = highlighter.into();
        self
    }

    #[must_use]
    pub fn with_ignore_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ignore_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_fold_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.fold_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn prose_only(mut self, prose_only: bool) -> Self {
        self.prose_only = prose_only;
        self
    }

    /// Whether the language defines any comment syntax at all.
    pub fn has_comment_syntax(&self) -> bool {
        !self.line_comments.is_empty() || !self.block_comments.is_empty()
    }

    /// The longest line comment prefix that `text` starts with.
    pub fn match_line_comment(&self, text: &str) -> Option<&str> {
        self.line_comments
            .iter()
            .filter(|prefix| !prefix.is_empty() && text.starts_with(prefix.as_str()))
            .max_by_key(|prefix| prefix.len())
            .map(String::as_str)
    }

    /// The block comment with the longest open marker that `text` starts with.
    ///
    /// A marker made of one repeated character only opens a comment when the
    /// run stops there: `###` opens a CoffeeScript block, `####` does not.
    pub fn match_block_open(&self, text: &str) -> Option<&BlockComment> {
        self.block_comments
            .iter()
            .filter(|block| !block.open.is_empty() && text.starts_with(block.open.as_str()))
            .filter(|block| !extends_fence(&block.open, &text[block.open.len()..]))
            .max_by_key(|block| block.open.len())
    }
}

/// Whether `open` is a run of one character that `rest` continues.
fn extends_fence(open: &str, rest: &str) -> bool {
    let mut chars = open.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    open.len() > 1 && chars.all(|c| c == first) && rest.starts_with(first)
}

/// Lookup table from extension / file name to language.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    languages: Vec<Arc<LanguageDescriptor>>,
    by_extension: HashMap<String, Arc<LanguageDescriptor>>,
    by_file_name: HashMap<String, Arc<LanguageDescriptor>>,
}

impl LanguageRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in language.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for descriptor in builtin::descriptors() {
            registry.override_with(descriptor);
        }
        registry
    }

    /// Register a language, rejecting any extension or file name that is
    /// already claimed.
    pub fn register(
        &mut self,
        descriptor: LanguageDescriptor,
    ) -> Result<Arc<LanguageDescriptor>, RegistryError> {
        for extension in &descriptor.extensions {
            if let Some(existing) = self.by_extension.get(extension) {
                return Err(RegistryError::DuplicateExtension {
                    extension: extension.clone(),
                    existing: existing.name.clone(),
                    incoming: descriptor.name.clone(),
                });
            }
        }
        for file_name in &descriptor.file_names {
            if let Some(existing) = self.by_file_name.get(file_name) {
                return Err(RegistryError::DuplicateFileName {
                    file_name: file_name.clone(),
                    existing: existing.name.clone(),
                    incoming: descriptor.name.clone(),
                });
            }
        }
        Ok(self.insert(descriptor))
    }

    /// Register a language, taking over any claims held by earlier languages.
    ///
    /// A language left without any claim is dropped from the registry.
    pub fn override_with(&mut self, descriptor: LanguageDescriptor) -> Arc<LanguageDescriptor> {
        let descriptor = self.insert(descriptor);
        let by_extension = &self.by_extension;
        let by_file_name = &self.by_file_name;
        self.languages.retain(|language| {
            by_extension.values().any(|l| Arc::ptr_eq(l, language))
                || by_file_name.values().any(|l| Arc::ptr_eq(l, language))
        });
        descriptor
    }

    fn insert(&mut self, descriptor: LanguageDescriptor) -> Arc<LanguageDescriptor> {
        let descriptor = Arc::new(descriptor);
        for extension in &descriptor.extensions {
            self.by_extension
                .insert(extension.clone(), Arc::clone(&descriptor));
        }
        for file_name in &descriptor.file_names {
            self.by_file_name
                .insert(file_name.clone(), Arc::clone(&descriptor));
        }
        self.languages.push(Arc::clone(&descriptor));
        descriptor
    }

    /// Look up a language by extension (without the dot). Case-sensitive.
    pub fn resolve(&self, extension: &str) -> Option<&Arc<LanguageDescriptor>> {
        self.by_extension.get(extension)
    }

    /// Look up the language of a path: exact file name first, then extension.
    pub fn resolve_path(&self, path: &str) -> Option<&Arc<LanguageDescriptor>> {
        let path = Path::new(path);
        let file_name = path.file_name().and_then(|n| n.to_str())?;
        if let Some(language) = self.by_file_name.get(file_name) {
            return Some(language);
        }
        let extension = path.extension().and_then(|e| e.to_str())?;
        self.resolve(extension)
    }

    /// All registered languages, sorted by name.
    pub fn languages(&self) -> Vec<&Arc<LanguageDescriptor>> {
        let mut languages: Vec<_> = self.languages.iter().collect();
        languages.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        languages
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}
