//! Core value types shared across the embed block.

/// Selection inside the editable source, in character offsets.
///
/// `from == to` is a caret. Offsets are chars, not bytes, so they line up with
/// what the host reports for the editable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub from: usize,
    pub to: usize,
}

impl TextRange {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    pub fn caret(offset: usize) -> Self {
        Self {
            from: offset,
            to: offset,
        }
    }

    pub fn is_caret(&self) -> bool {
        self.from == self.to
    }

    /// Get normalized range (from <= to).
    pub fn normalize(self) -> Self {
        if self.from <= self.to {
            self
        } else {
            Self {
                from: self.to,
                to: self.from,
            }
        }
    }

    /// Normalize and clamp both ends to `len`.
    pub fn clamp(self, len: usize) -> Self {
        let range = self.normalize();
        Self {
            from: range.from.min(len),
            to: range.to.min(len),
        }
    }
}

/// Screen rectangle, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Number of chars in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of char offset `offset`, clamped to the end of `text`.
pub fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Char immediately before `offset`, if any.
pub fn char_before(text: &str, offset: usize) -> Option<char> {
    offset.checked_sub(1).and_then(|i| text.chars().nth(i))
}

/// Chars in `[from, to)`.
pub fn char_slice(text: &str, from: usize, to: usize) -> &str {
    let start = byte_index(text, from);
    let end = byte_index(text, to.max(from));
    &text[start..end]
}

/// Replace chars `[range.from, range.to)` of `text` with `insert`.
///
/// The range is clamped to the text first, so stale offsets never panic.
pub fn splice(text: &str, range: TextRange, insert: &str) -> String {
    let range = range.clamp(char_len(text));
    let start = byte_index(text, range.from);
    let end = byte_index(text, range.to);
    let mut out = String::with_capacity(text.len() - (end - start) + insert.len());
    out.push_str(&text[..start]);
    out.push_str(insert);
    out.push_str(&text[end..]);
    out
}
