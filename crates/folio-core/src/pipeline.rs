//! Build pipeline
//!
//! Segments every input file in parallel on the rayon pool, then aggregates
//! the results into a [`Project`] on the calling thread. Input order is kept
//! through the parallel stage, so diagnostics come out in the order the
//! files were given.

use rayon::prelude::*;

use crate::diagnostics::{Diagnostics, SkipReason};
use crate::error::BuildError;
use crate::language::LanguageRegistry;
use crate::project::Project;
use crate::unit::{normalize_path, FileUnit, OutputMapper};

/// One file handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInput {
    /// Path relative to the project root.
    pub path: String,
    pub text: String,
}

impl SourceInput {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct Build {
    pub project: Project,
    pub diagnostics: Diagnostics,
}

/// Turns source files into a [`Project`].
pub struct Pipeline<'a> {
    registry: &'a LanguageRegistry,
    mapper: OutputMapper,
    name: String,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        registry: &'a LanguageRegistry,
        mapper: OutputMapper,
        name: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            mapper,
            name: name.into(),
        }
    }

    /// Segment every input and build the project.
    ///
    /// Files without a language are skipped with a diagnostic. Fails when
    /// there is no input at all, or when two files map to the same page.
    pub fn run(&self, inputs: Vec<SourceInput>) -> Result<Build, BuildError> {
        if inputs.is_empty() {
            return Err(BuildError::EmptyInput);
        }
        tracing::info!(files = inputs.len(), "segmenting sources");

        let segmented: Vec<Result<FileUnit, String>> = inputs
            .par_iter()
            .map(|input| self.segment(input))
            .collect();

        let mut diagnostics = Diagnostics::new();
        let mut units = Vec::with_capacity(segmented.len());
        for result in segmented {
            match result {
                Ok(unit) => units.push(unit),
                Err(path) => diagnostics.skip(path, SkipReason::UnrecognizedLanguage),
            }
        }
        if units.is_empty() {
            tracing::warn!("no input file has a recognized language");
        }

        tracing::info!(files = units.len(), "building project");
        let project = Project::build(self.name.clone(), units)?;
        for broken in project.broken_links() {
            diagnostics.broken_link(broken.location.clone(), broken.target.clone());
        }

        Ok(Build {
            project,
            diagnostics,
        })
    }

    fn segment(&self, input: &SourceInput) -> Result<FileUnit, String> {
        let path = normalize_path(&input.path);
        let Some(language) = self.registry.resolve_path(&path) else {
            return Err(path);
        };
        tracing::debug!(path = %path, language = %language.name, "segmenting");
        Ok(FileUnit::build(&path, &input.text, language.clone(), &self.mapper))
    }
}
