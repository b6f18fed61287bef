//! Folio Core - Documentation engine for the Folio site generator
//!
//! This crate provides the core functionality:
//! - Language registry: comment syntax per file extension
//! - Segmenter: splitting source text into prose and code blocks
//! - Outline: headings and relative links found in prose
//! - Project: table of contents, anchors, navigation and link resolution
//! - Pipeline: parallel segmentation and project assembly
//! - HTML: page rendering and the search index

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Language registry - comment syntax per file extension
pub mod language;

/// Segmenter - splits a file into prose and code blocks
pub mod segment;

/// Heading and link extraction from prose
pub mod outline;

/// File units - one segmented source file
pub mod unit;

/// Project aggregation - TOC order, anchors and navigation
pub mod project;

/// Cross-file link resolution
pub mod crosslink;

/// Non-fatal build diagnostics
pub mod diagnostics;

/// Fatal build errors
pub mod error;

/// Configuration file loading
pub mod config;

/// Parallel build pipeline
pub mod pipeline;

/// Search index generation
pub mod search;

/// HTML rendering
pub mod html;

/// Convenience re-export of the language registry
pub use language::{LanguageDescriptor, LanguageRegistry};

/// Convenience re-export of segmentation types
pub use segment::{segment, Block, BlockKind};

/// Convenience re-export of file units
pub use unit::{FileUnit, OutputMapper, OutputNaming};

/// Convenience re-export of the project
pub use project::{NavContext, Project, TocNode};

/// Convenience re-export of the pipeline
pub use pipeline::{Build, Pipeline, SourceInput};

/// Convenience re-export of diagnostics and errors
pub use diagnostics::{Diagnostics, SkipReason};
pub use error::BuildError;

/// Convenience re-export of rendering
pub use html::{Highlighter, HtmlRenderer, PlainHighlighter, RenderError, Renderer};

/// Convenience re-export of configuration
pub use config::{Config, ConfigError};
