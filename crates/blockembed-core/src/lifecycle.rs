//! Liveness tracking for asynchronous completions.

use std::cell::Cell;
use std::rc::Rc;

/// Shared flag cleared when a block is torn down.
///
/// Deferred work (diagram renders, remote save callbacks) holds a clone and
/// checks it before touching the block's surfaces. A late completion after
/// teardown is dropped, never queued.
#[derive(Debug, Clone)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.get()
    }

    pub fn kill(&self) {
        self.0.set(false);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonic counter used to discard superseded async renders.
#[derive(Debug, Clone, Default)]
pub struct Generation(Rc<Cell<u64>>);

impl Generation {
    /// Start a new generation and return its ticket.
    pub fn bump(&self) -> u64 {
        let next = self.0.get().wrapping_add(1);
        self.0.set(next);
        next
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.0.get() == ticket
    }
}
