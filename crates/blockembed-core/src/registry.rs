//! Per-processor presentation and render dispatch.

use blockembed_common::{HighlightLang, Processor};

/// How a processor's source turns into a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    /// Posted into a sandboxed frame.
    Sandbox,
    /// Typeset in place.
    Latex,
    /// Rendered to SVG by the diagram library.
    Diagram,
}

/// Static properties of a processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorInfo {
    pub processor: Processor,
    pub adapter: AdapterKind,
    pub lang: HighlightLang,
    /// Shown in the empty source input.
    pub placeholder: String,
    /// Shown instead of a preview when the block has no content.
    pub empty_label: String,
    /// Icon class for the preview affordance.
    pub icon: String,
}

/// Adapter for a processor. Matches exhaustively so a new processor can't be
/// added without choosing one.
pub fn adapter_kind(processor: Processor) -> AdapterKind {
    match processor {
        Processor::Html | Processor::Embed(_) | Processor::Chart => AdapterKind::Sandbox,
        Processor::Latex => AdapterKind::Latex,
        Processor::Diagram => AdapterKind::Diagram,
    }
}

pub fn info(processor: Processor) -> ProcessorInfo {
    let (placeholder, empty_label) = match processor {
        Processor::Latex => (
            "Enter a LaTeX formula".to_string(),
            "Empty formula. Click to edit".to_string(),
        ),
        other => (
            format!("Paste {} embed code or URL", other.name()),
            format!("No {} embed yet. Click to edit", other.name()),
        ),
    };

    ProcessorInfo {
        processor,
        adapter: adapter_kind(processor),
        lang: processor.highlight_lang(),
        placeholder,
        empty_label,
        icon: processor.icon(),
    }
}
