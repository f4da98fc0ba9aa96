//! blockembed-common: vocabulary and ambient plumbing shared by the blockembed crates.
//!
//! - [`Processor`] / [`Provider`]: the closed set of content kinds a block can hold
//! - [`EmbedConfig`]: receiver path, library URLs, theme, save policy
//! - [`telemetry`]: tracing subscriber setup for binaries (feature `telemetry`)

pub mod config;
pub mod error;
pub mod processor;
#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use config::EmbedConfig;
pub use error::{CommonError, ConfigError};
pub use processor::{HighlightLang, Processor, Provider};
