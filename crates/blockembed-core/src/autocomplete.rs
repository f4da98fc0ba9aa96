//! LaTeX symbol autocomplete.
//!
//! A backslash typed in the source opens the symbol popup anchored at the
//! cursor. The explicit template control opens the same popup in template
//! mode. While the popup is open each edit narrows the filter to the text
//! typed since the trigger. A chosen item is spliced back into the source by
//! the block.

use std::rc::Rc;

use smol_str::SmolStr;

use crate::keys::{Key, KeyEvent};
use crate::platform::MenuPopup;
use crate::range::RangeTracker;
use crate::types::{Rect, TextRange, char_before, char_len, char_slice, splice};

/// Popups the block drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuId {
    /// Symbol and template picker.
    LatexSymbols,
    /// Hover preview for the highlighted symbol.
    LatexPreview,
}

impl MenuId {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuId::LatexSymbols => "blockLatex",
            MenuId::LatexPreview => "previewLatex",
        }
    }
}

/// Where the popup attaches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuAnchor {
    /// The cursor, in page coordinates.
    Selection(Rect),
    /// The block's template control.
    TemplateControl,
}

/// Filter state for an open popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuFilter {
    /// Offset right after the trigger backslash, or the cursor for templates.
    pub from: usize,
    /// Cursor offset the filter was last computed at.
    pub to: usize,
    /// Text typed since the trigger, without a leading backslash.
    pub text: String,
    pub template: bool,
}

impl MenuFilter {
    pub fn new(from: usize, template: bool) -> Self {
        Self {
            from,
            to: from,
            text: String::new(),
            template,
        }
    }

    /// Span a selected item replaces. Inline triggers include the backslash,
    /// since symbols carry their own.
    pub fn replace_range(&self) -> TextRange {
        let start = if self.template {
            self.from
        } else {
            self.from.saturating_sub(1)
        };
        TextRange::new(start, self.to.max(self.from))
    }
}

/// Parameters for opening the popup.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuParams {
    pub root_id: SmolStr,
    pub block_id: SmolStr,
    pub anchor: MenuAnchor,
    pub offset_y: f64,
    pub class_name: &'static str,
    pub filter: MenuFilter,
}

impl MenuParams {
    pub fn is_template(&self) -> bool {
        self.filter.template
    }
}

/// Incremental update for an open popup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MenuUpdate {
    pub rect: Option<Rect>,
    pub filter: Option<MenuFilter>,
}

/// Entry chosen in the popup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuItem {
    pub symbol: Option<String>,
    /// Freeform text used when the entry has no symbol.
    pub comment: Option<String>,
}

impl MenuItem {
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            comment: None,
        }
    }

    pub fn comment(comment: impl Into<String>) -> Self {
        Self {
            symbol: None,
            comment: Some(comment.into()),
        }
    }

    /// Text inserted for this entry.
    pub fn insert_text(&self) -> &str {
        self.symbol
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.comment.as_deref())
            .unwrap_or("")
    }
}

/// Popup callbacks, delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEvent {
    /// `template` echoes [`MenuFilter::template`] from the params the popup
    /// was opened with.
    Selected {
        from: usize,
        to: usize,
        template: bool,
        item: MenuItem,
    },
    Closed,
}

/// Result of applying a selected item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub value: String,
    pub cursor: usize,
}

const POPUP_OFFSET_Y: f64 = 4.0;

/// Drives the symbol popup for one block.
pub struct AutocompleteController {
    menu: Rc<dyn MenuPopup>,
    root_id: SmolStr,
    block_id: SmolStr,
    filter: Option<MenuFilter>,
}

impl AutocompleteController {
    pub fn new(menu: Rc<dyn MenuPopup>, root_id: SmolStr, block_id: SmolStr) -> Self {
        Self {
            menu,
            root_id,
            block_id,
            filter: None,
        }
    }

    pub fn filter(&self) -> Option<&MenuFilter> {
        self.filter.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.menu.is_open(MenuId::LatexSymbols)
    }

    /// Backspace at the trigger offset closes the popup.
    pub fn on_key_down(&mut self, event: &KeyEvent, range: Option<TextRange>) {
        if event.key != Key::Backspace {
            return;
        }
        let (Some(range), Some(filter)) = (range, &self.filter) else {
            return;
        };
        if range.from == filter.from {
            tracing::trace!(target: "blockembed::autocomplete", "backspace crossed trigger");
            self.close();
        }
    }

    /// Open on a fresh trigger, otherwise narrow an open popup.
    pub fn on_key_up(&mut self, source: &RangeTracker, event: &KeyEvent) {
        if event.is_special() {
            return;
        }
        let Some(range) = source.get() else {
            return;
        };
        let value = source.value();

        if char_before(&value, range.from) == Some('\\') {
            let anchor = match source.selection_rect() {
                Some(rect) => MenuAnchor::Selection(rect),
                None => MenuAnchor::TemplateControl,
            };
            self.open(MenuFilter::new(range.from, false), anchor);
            return;
        }

        if self.is_open() {
            self.refilter(&value, range);
        }
    }

    /// Open in template mode at the current cursor. No-op without a range.
    pub fn open_template(&mut self, source: &RangeTracker) -> bool {
        let Some(range) = source.get() else {
            tracing::debug!(target: "blockembed::autocomplete", "template requested without a range");
            return false;
        };
        self.open(MenuFilter::new(range.from, true), MenuAnchor::TemplateControl);
        true
    }

    fn open(&mut self, filter: MenuFilter, anchor: MenuAnchor) {
        tracing::debug!(
            target: "blockembed::autocomplete",
            from = filter.from,
            template = filter.template,
            "opening symbol menu"
        );
        let params = MenuParams {
            root_id: self.root_id.clone(),
            block_id: self.block_id.clone(),
            anchor,
            offset_y: POPUP_OFFSET_Y,
            class_name: if filter.template { "isTemplate" } else { "" },
            filter: filter.clone(),
        };
        self.filter = Some(filter);
        self.menu.open(MenuId::LatexSymbols, params);
    }

    fn refilter(&mut self, value: &str, range: TextRange) {
        let Some(filter) = &mut self.filter else {
            return;
        };
        if range.from < filter.from {
            return;
        }
        let typed = char_slice(value, filter.from, range.from);
        filter.text = typed.strip_prefix('\\').unwrap_or(typed).to_string();
        filter.to = range.from;
        tracing::trace!(target: "blockembed::autocomplete", filter = %filter.text, "refilter");

        self.menu.update(
            MenuId::LatexSymbols,
            MenuUpdate {
                filter: Some(filter.clone()),
                ..Default::default()
            },
        );
    }

    /// Move an open popup to follow the cursor.
    pub fn follow_cursor(&self, source: &RangeTracker) {
        if !self.is_open() {
            return;
        }
        if let Some(rect) = source.selection_rect() {
            self.menu.update(
                MenuId::LatexSymbols,
                MenuUpdate {
                    rect: Some(rect),
                    ..Default::default()
                },
            );
        }
    }

    /// Splice `item` into `value` over `[from, to)`. Template picks are
    /// separated from the preceding source by a space.
    pub fn apply(value: &str, from: usize, to: usize, template: bool, item: &MenuItem) -> Splice {
        let mut text = String::new();
        if template {
            text.push(' ');
        }
        text.push_str(item.insert_text());

        let range = TextRange::new(from, to).clamp(char_len(value));
        Splice {
            value: splice(value, range, &text),
            cursor: range.from + char_len(&text),
        }
    }

    /// Close the symbol popup and forget the filter.
    pub fn close(&mut self) {
        self.filter = None;
        self.menu.close(MenuId::LatexSymbols);
    }

    /// The popup closed on its own.
    pub fn on_closed(&mut self) {
        self.filter = None;
    }
}

impl std::fmt::Debug for AutocompleteController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutocompleteController")
            .field("block_id", &self.block_id)
            .field("filter", &self.filter)
            .finish()
    }
}
