//! Render-ready projection of a block for the host's view layer.

use blockembed_common::Processor;
use smol_str::SmolStr;

use crate::registry;
use crate::state::{DisplayState, EditState};

/// Everything the host needs to draw the block chrome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockView {
    pub display: DisplayState,
    pub classes: Vec<SmolStr>,
    pub placeholder: String,
    /// Shown in place of the preview when there is no content.
    pub empty_label: Option<String>,
    /// Icon class of the collapsed preview affordance.
    pub preview_icon: Option<String>,
    /// Show the "edit source" affordance.
    pub show_edit_button: bool,
    /// Label of the template control, LaTeX only.
    pub template_label: Option<&'static str>,
    pub container_id: String,
}

impl BlockView {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

pub const TEMPLATE_LABEL: &str = "Template";

pub fn project(
    processor: Processor,
    block_id: &str,
    text: &str,
    state: EditState,
    read_only: bool,
) -> BlockView {
    let info = registry::info(processor);
    let display = state.display(processor);
    let is_empty = text.is_empty();

    let mut classes: Vec<SmolStr> = ["wrap", "resizable", "focusable"]
        .into_iter()
        .map(SmolStr::new_static)
        .collect();
    classes.push(SmolStr::new(format!("c{block_id}")));
    if is_empty {
        classes.push(SmolStr::new_static("isEmpty"));
    }
    if state.is_editing {
        classes.push(SmolStr::new_static("isEditing"));
    }
    if display != DisplayState::Collapsed && !processor.is_latex() {
        classes.push(SmolStr::new_static("withPreview"));
    }

    BlockView {
        display,
        classes,
        placeholder: info.placeholder,
        empty_label: (is_empty && !state.is_editing).then_some(info.empty_label),
        preview_icon: (display == DisplayState::Collapsed && !is_empty).then_some(info.icon),
        show_edit_button: !read_only && !state.is_editing,
        template_label: processor.is_latex().then_some(TEMPLATE_LABEL),
        container_id: crate::diagram::container_id(block_id),
    }
}
