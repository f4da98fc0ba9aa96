//! Edit/preview state machine.
//!
//! Transitions are pure: side effects (cursor placement, saves, rendering)
//! belong to the block that applies them.

use blockembed_common::Processor;

/// Mode flags of one block instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditState {
    /// Source input is open for typing.
    pub is_editing: bool,
    /// Preview has been requested at least once.
    pub is_showing: bool,
}

/// What the user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// Preview affordance only; nothing rendered.
    Collapsed,
    /// Rendered preview.
    Expanded,
    /// Source input plus preview.
    Editing,
}

/// User-driven state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Preview affordance clicked.
    Expand,
    /// Edit affordance clicked.
    Edit,
    /// Commit by blur or outside click.
    Commit,
}

impl EditState {
    /// Apply `transition`. Read-only blocks never enter editing.
    pub fn apply(self, transition: Transition, read_only: bool) -> Self {
        match transition {
            Transition::Expand => Self {
                is_showing: true,
                ..self
            },
            Transition::Edit if read_only => self,
            Transition::Edit => Self {
                is_editing: true,
                ..self
            },
            Transition::Commit => Self {
                is_editing: false,
                ..self
            },
        }
    }

    /// LaTeX is typeset inline and has no collapsed state.
    pub fn display(&self, processor: Processor) -> DisplayState {
        if self.is_editing {
            DisplayState::Editing
        } else if self.is_showing || processor.is_latex() {
            DisplayState::Expanded
        } else {
            DisplayState::Collapsed
        }
    }

    /// Whether the preview should be rendered at all.
    pub fn renders(&self, processor: Processor) -> bool {
        self.display(processor) != DisplayState::Collapsed
    }
}
