//! Error types for embed block operations.

use miette::Diagnostic;
use thiserror::Error;

use crate::platform::PlatformError;

/// Errors surfaced by embed block operations.
///
/// Most user-facing paths never fail: malformed math renders as error markup,
/// rejected diagrams leave the previous content, and torn-down blocks ignore
/// late callbacks. What remains are failures of the host platform itself.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum EmbedError {
    /// A host platform call failed (frame creation, message post).
    #[error("platform error: {0}")]
    #[diagnostic(code(blockembed::platform))]
    Platform(#[from] PlatformError),

    /// Sandbox message could not be encoded.
    #[error("failed to encode sandbox message: {0}")]
    #[diagnostic(code(blockembed::sandbox::encode))]
    Encode(#[from] serde_json::Error),
}
