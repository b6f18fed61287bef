//! Fatal build errors.

use thiserror::Error;

/// Errors that stop a build before anything is rendered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("no source files to document")]
    EmptyInput,

    #[error("source path '{0}' appears more than once")]
    DuplicateSourcePath(String),

    #[error("'{first}' and '{second}' would both be written to '{output}'")]
    DuplicateOutputPath {
        output: String,
        first: String,
        second: String,
    },
}
