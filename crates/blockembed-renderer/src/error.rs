//! Renderer error types.

use miette::Diagnostic;
use thiserror::Error;

/// Errors from the rendering helpers.
///
/// Math typesetting has no error variant: malformed input renders as error
/// markup instead.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RenderError {
    /// No grammar registered for the highlight language.
    #[error("no syntax definition for `{0}`")]
    #[diagnostic(code(blockembed::highlight::language))]
    UnknownLanguage(&'static str),

    /// The highlighter failed part-way through the source.
    #[error("highlighting failed: {0}")]
    #[diagnostic(code(blockembed::highlight::failed))]
    Highlight(String),
}
