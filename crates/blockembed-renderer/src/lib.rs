//! blockembed-renderer: pure rendering helpers for embed blocks.
//!
//! - [`math`]: LaTeX → MathML typesetting with a trust policy for link commands
//! - [`highlight`]: source-view syntax highlighting
//! - [`providers`]: provider share URL → `<iframe>` embed markup

pub mod error;
#[cfg(feature = "syntax-highlighting")]
pub mod highlight;
pub mod math;
pub mod providers;

pub use error::RenderError;
pub use math::{Typeset, typeset};
