//! Platform-agnostic key events for the embed block.
//!
//! Hosts convert native keyboard events into [`KeyEvent`]. The block only
//! cares about a handful of distinctions: whether a key edits text (and so
//! triggers re-render and save), whether it is Backspace, and whether the
//! combination is an undo/redo shortcut.

use smol_str::SmolStr;

/// Platform-agnostic key representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),

    /// Unknown/unidentified key.
    Unidentified,

    // === Whitespace / editing ===
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Space,

    // === Navigation ===
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,

    // === Modifiers ===
    Alt,
    AltGraph,
    CapsLock,
    Control,
    Fn,
    Meta,
    Shift,
    Super,

    // === IME / composition ===
    Compose,
    Dead,
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            "Escape" | "Esc" => Self::Escape,
            " " | "Spacebar" => Self::Space,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Alt" => Self::Alt,
            "AltGraph" => Self::AltGraph,
            "CapsLock" => Self::CapsLock,
            "Control" => Self::Control,
            "Fn" => Self::Fn,
            "Meta" | "OS" => Self::Meta,
            "Shift" => Self::Shift,
            "Super" => Self::Super,
            "Compose" => Self::Compose,
            "Dead" => Self::Dead,
            "" | "Unidentified" => Self::Unidentified,
            other if other.chars().count() == 1 => Self::character(other),
            _ => Self::Unidentified,
        }
    }

    /// Check if this is a navigation key.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::ArrowLeft
                | Self::ArrowRight
                | Self::ArrowUp
                | Self::ArrowDown
                | Self::Home
                | Self::End
                | Self::PageUp
                | Self::PageDown
        )
    }

    /// Check if this is a modifier key.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Self::Alt
                | Self::AltGraph
                | Self::CapsLock
                | Self::Control
                | Self::Fn
                | Self::Meta
                | Self::Shift
                | Self::Super
        )
    }

    /// Keys that never change the source text on key-up.
    ///
    /// Backspace counts as special: deletions arrive through the input event.
    pub fn is_special(&self) -> bool {
        self.is_navigation()
            || self.is_modifier()
            || matches!(
                self,
                Self::Escape | Self::Tab | Self::Enter | Self::Backspace | Self::Unidentified
            )
    }

    fn eq_ignore_case(&self, c: char) -> bool {
        match self {
            Self::Character(s) => {
                let mut chars = s.chars();
                matches!((chars.next(), chars.next()), (Some(k), None) if k.eq_ignore_ascii_case(&c))
            }
            _ => false,
        }
    }
}

/// Modifier key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Get the primary modifier for the platform (Cmd on Mac, Ctrl elsewhere).
    pub fn primary(is_mac: bool) -> Self {
        if is_mac { Self::META } else { Self::CTRL }
    }

    /// Get the primary modifier + Shift for the platform.
    pub fn primary_shift(is_mac: bool) -> Self {
        Self {
            shift: true,
            ..Self::primary(is_mac)
        }
    }

    fn has_primary(&self, is_mac: bool) -> bool {
        if is_mac { self.meta } else { self.ctrl }
    }
}

/// A keyboard event as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Shorthand for a plain character key.
    pub fn char(c: char) -> Self {
        Self::new(Key::character(c.to_string()))
    }

    pub fn primary(key: Key, is_mac: bool) -> Self {
        Self::with_modifiers(key, Modifiers::primary(is_mac))
    }

    pub fn primary_shift(key: Key, is_mac: bool) -> Self {
        Self::with_modifiers(key, Modifiers::primary_shift(is_mac))
    }

    pub fn is_special(&self) -> bool {
        self.key.is_special()
    }

    /// Match the history shortcuts: primary+Z undoes, primary+Shift+Z and
    /// primary+Y redo.
    pub fn history_action(&self, is_mac: bool) -> Option<HistoryAction> {
        if !self.modifiers.has_primary(is_mac) || self.modifiers.alt {
            return None;
        }
        if self.key.eq_ignore_case('z') {
            return Some(if self.modifiers.shift {
                HistoryAction::Redo
            } else {
                HistoryAction::Undo
            });
        }
        if self.key.eq_ignore_case('y') && !self.modifiers.shift {
            return Some(HistoryAction::Redo);
        }
        None
    }
}

/// Document history operation routed to the editor shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Undo,
    Redo,
}

/// Result of handling a keydown event.
#[derive(Debug, Clone, PartialEq)]
pub enum KeydownResult {
    /// Event was handled, prevent default.
    Handled,
    /// Event was not a keybinding, let platform handle it.
    NotHandled,
    /// Event was forwarded to the editor shell.
    Forwarded,
}
