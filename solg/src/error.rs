use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::id::Id;

/// Errors that prevent a single project or declaration from being used
#[derive(Debug, Error, Diagnostic)]
pub enum SolgError {
    #[error("Project '{}' declares invalid ProjectGuid '{value}'", path.display())]
    #[diagnostic(
        code(solg::invalid_identifier),
        help("Replace it with a valid identifier, for example {suggested}")
    )]
    InvalidIdentifier {
        path: PathBuf,
        value: String,
        suggested: Id,
    },

    #[error("Custom project type for '{extension}' has invalid identifier '{value}'")]
    #[diagnostic(
        code(solg::invalid_category),
        help("Project type identifiers look like {{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}}")
    )]
    InvalidCategory { extension: String, value: String },
}
