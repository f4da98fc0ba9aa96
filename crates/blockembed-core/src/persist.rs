//! Write-back of the source text.

use std::rc::Rc;

use smol_str::SmolStr;

use crate::platform::{DocumentStore, SaveCallback, TextSetter};
use crate::range::RangeTracker;

/// Commits the editable value to the local store, then the remote.
///
/// The local write is optimistic and happens first. Read-only blocks never
/// write anything.
pub struct PersistenceGateway {
    root_id: SmolStr,
    block_id: SmolStr,
    read_only: bool,
    store: Rc<dyn DocumentStore>,
    remote: Rc<dyn TextSetter>,
}

impl PersistenceGateway {
    pub fn new(
        root_id: SmolStr,
        block_id: SmolStr,
        read_only: bool,
        store: Rc<dyn DocumentStore>,
        remote: Rc<dyn TextSetter>,
    ) -> Self {
        Self {
            root_id,
            block_id,
            read_only,
            store,
            remote,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Save the current editable value. Returns the value written, or None
    /// for read-only blocks.
    pub fn save(&self, source: &RangeTracker, on_done: Option<SaveCallback>) -> Option<String> {
        if self.read_only {
            tracing::trace!(target: "blockembed::persist", block = %self.block_id, "read-only, skipping save");
            return None;
        }

        let value = source.value();
        tracing::debug!(
            target: "blockembed::persist",
            block = %self.block_id,
            len = value.len(),
            "saving"
        );
        self.store.update_text(&self.root_id, &self.block_id, &value);
        self.remote
            .set_text(&self.root_id, &self.block_id, &value, on_done);
        Some(value)
    }
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway")
            .field("root_id", &self.root_id)
            .field("block_id", &self.block_id)
            .field("read_only", &self.read_only)
            .finish()
    }
}
