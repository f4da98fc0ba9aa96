//! Error types shared across blockembed crates.

use miette::Diagnostic;
use thiserror::Error;

/// Errors from the shared vocabulary types.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CommonError {
    /// Processor identifier not in the closed processor set.
    #[error("unknown embed processor: {0}")]
    #[diagnostic(
        code(blockembed::processor::unknown),
        help("expected one of html, youtube, vimeo, soundcloud, google_maps, miro, figma, chart, latex, diagram")
    )]
    UnknownProcessor(String),
}

/// Configuration loading errors.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    /// Environment variable present but not parseable.
    #[error("invalid value for {var}: {message}")]
    #[diagnostic(code(blockembed::config::env))]
    InvalidEnv { var: &'static str, message: String },

    /// Configuration document could not be deserialized.
    #[error("invalid configuration: {0}")]
    #[diagnostic(code(blockembed::config::parse))]
    Parse(#[from] serde_json::Error),

    /// URL in the configuration could not be parsed.
    #[error("invalid URL {url}: {message}")]
    #[diagnostic(code(blockembed::config::url))]
    UrlParse { url: String, message: String },
}
