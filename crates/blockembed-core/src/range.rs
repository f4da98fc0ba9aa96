//! Selection and value tracking for the editable source input.

use std::rc::Rc;

use blockembed_common::HighlightLang;
use blockembed_renderer::highlight::highlight_or_escape;

use crate::platform::EditableSurface;
use crate::types::{Rect, TextRange, char_len};

/// Wraps the editable input, keeping selection reads and writes consistent.
///
/// Reads hand out copies, so callers can't mutate the tracked range in place.
/// Writes are clamped to the current text length.
#[derive(Clone)]
pub struct RangeTracker {
    surface: Rc<dyn EditableSurface>,
    lang: HighlightLang,
}

impl RangeTracker {
    pub fn new(surface: Rc<dyn EditableSurface>, lang: HighlightLang) -> Self {
        Self { surface, lang }
    }

    /// Current selection, if the input has one.
    pub fn get(&self) -> Option<TextRange> {
        self.surface.selection()
    }

    /// Place the selection, clamped to the current text.
    pub fn set(&self, range: TextRange) {
        let len = char_len(&self.surface.text_value());
        self.surface.set_selection(range.clamp(len));
    }

    /// Plain text of the input.
    pub fn value(&self) -> String {
        self.surface.text_value()
    }

    /// Replace the input with highlighted `text`, keeping the selection where
    /// it was (clamped to the new text).
    pub fn set_value(&self, text: &str) {
        let range = self.get();
        let markup = highlight_or_escape(text, self.lang);
        self.surface.set_value(text, &markup);
        self.surface.placeholder_check();
        if let Some(range) = range {
            self.set(range);
        }
    }

    pub fn placeholder_check(&self) {
        self.surface.placeholder_check();
    }

    pub fn selection_rect(&self) -> Option<Rect> {
        self.surface.selection_rect()
    }
}

impl std::fmt::Debug for RangeTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeTracker")
            .field("lang", &self.lang)
            .field("range", &self.get())
            .finish()
    }
}
