//! The closed set of content processors an embed block can hold.
//!
//! A processor decides how a block's source text is highlighted while editing
//! and which render adapter turns it into a preview. Downstream dispatch matches
//! exhaustively on [`Processor`], so a new variant has to be handled everywhere.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CommonError;

/// Third-party providers whose content is embedded through a sandboxed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Youtube,
    Vimeo,
    Soundcloud,
    GoogleMaps,
    Miro,
    Figma,
}

impl Provider {
    pub const ALL: [Provider; 6] = [
        Provider::Youtube,
        Provider::Vimeo,
        Provider::Soundcloud,
        Provider::GoogleMaps,
        Provider::Miro,
        Provider::Figma,
    ];

    /// Stable identifier used on the wire and in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Youtube => "youtube",
            Provider::Vimeo => "vimeo",
            Provider::Soundcloud => "soundcloud",
            Provider::GoogleMaps => "google_maps",
            Provider::Miro => "miro",
            Provider::Figma => "figma",
        }
    }

    /// Human-readable provider name.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Youtube => "YouTube",
            Provider::Vimeo => "Vimeo",
            Provider::Soundcloud => "SoundCloud",
            Provider::GoogleMaps => "Google Maps",
            Provider::Miro => "Miro",
            Provider::Figma => "Figma",
        }
    }
}

/// Source language used to highlight the editable source view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightLang {
    Html,
    Latex,
    /// Diagram markup is highlighted with the YAML grammar.
    Yaml,
    JavaScript,
}

impl HighlightLang {
    /// Token understood by the syntax set (`find_syntax_by_token`).
    pub fn token(&self) -> &'static str {
        match self {
            HighlightLang::Html => "html",
            HighlightLang::Latex => "latex",
            HighlightLang::Yaml => "yaml",
            HighlightLang::JavaScript => "js",
        }
    }
}

/// Content kind held by an embed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Processor {
    /// Raw HTML or a third-party widget snippet.
    Html,
    /// Provider embed, usually pasted as a share URL.
    Embed(Provider),
    /// Chart script executed inside the sandbox with a charting library.
    Chart,
    /// LaTeX math, typeset inline without a sandbox.
    Latex,
    /// Diagram description rendered to SVG by an external renderer.
    Diagram,
}

impl Processor {
    pub const ALL: [Processor; 10] = [
        Processor::Html,
        Processor::Embed(Provider::Youtube),
        Processor::Embed(Provider::Vimeo),
        Processor::Embed(Provider::Soundcloud),
        Processor::Embed(Provider::GoogleMaps),
        Processor::Embed(Provider::Miro),
        Processor::Embed(Provider::Figma),
        Processor::Chart,
        Processor::Latex,
        Processor::Diagram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Processor::Html => "html",
            Processor::Embed(provider) => provider.as_str(),
            Processor::Chart => "chart",
            Processor::Latex => "latex",
            Processor::Diagram => "diagram",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Processor::Html => "HTML",
            Processor::Embed(provider) => provider.name(),
            Processor::Chart => "Chart",
            Processor::Latex => "LaTeX",
            Processor::Diagram => "Diagram",
        }
    }

    /// Icon class shown on the collapsed preview affordance.
    pub fn icon(&self) -> String {
        format!("embed-{}", self.as_str().replace('_', "-"))
    }

    pub fn is_latex(&self) -> bool {
        matches!(self, Processor::Latex)
    }

    /// Whether the source is a script rather than markup.
    pub fn is_script(&self) -> bool {
        matches!(self, Processor::Chart)
    }

    pub fn provider(&self) -> Option<Provider> {
        match self {
            Processor::Embed(provider) => Some(*provider),
            _ => None,
        }
    }

    pub fn highlight_lang(&self) -> HighlightLang {
        match self {
            Processor::Html | Processor::Embed(_) => HighlightLang::Html,
            Processor::Chart => HighlightLang::JavaScript,
            Processor::Latex => HighlightLang::Latex,
            Processor::Diagram => HighlightLang::Yaml,
        }
    }
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Processor {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        // Legacy identifier for diagram blocks.
        if needle == "mermaid" {
            return Ok(Processor::Diagram);
        }
        Processor::ALL
            .into_iter()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| CommonError::UnknownProcessor(s.to_string()))
    }
}

impl Serialize for Processor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Processor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
