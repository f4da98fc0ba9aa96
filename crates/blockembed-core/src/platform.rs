//! Platform abstraction traits for the embed block.
//!
//! The block never touches a DOM, a document store or a diagram library
//! directly. Each collaborator sits behind one of these traits so the same
//! state machine runs in the browser, in a native shell and against the
//! recording fakes in the test suite.
//!
//! All methods take `&self`: platform handles are shared (element handles,
//! store clients) and implementations use interior mutability where needed.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::time::Duration;

use crate::autocomplete::{MenuId, MenuParams, MenuUpdate};
use crate::keys::KeyEvent;
use crate::sandbox::{FrameSpec, SandboxMessage};
use crate::types::{Rect, TextRange};

/// Error type for platform operations.
#[derive(Debug, Clone)]
pub struct PlatformError(pub String);

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Non-`Send` boxed future; everything here runs on the UI thread.
pub type LocalBoxFuture<T> = Pin<Box<dyn Future<Output = T>>>;

/// The content-editable source input.
pub trait EditableSurface {
    /// Plain text currently in the input.
    fn text_value(&self) -> String;

    /// Replace the input content. `markup` is the highlighted rendition of
    /// `text`; its text content must equal `text`.
    fn set_value(&self, text: &str, markup: &str);

    /// Current selection, or None if the input has no selection.
    fn selection(&self) -> Option<TextRange>;

    /// Place the selection. The range is already clamped to the text.
    fn set_selection(&self, range: TextRange);

    /// Show or hide the placeholder depending on whether the input is empty.
    fn placeholder_check(&self);

    /// Page rectangle of the current selection.
    fn selection_rect(&self) -> Option<Rect>;
}

/// The rendered preview region.
pub trait PreviewSurface {
    /// Replace the content with trusted markup.
    fn set_html(&self, html: &str);

    /// Replace the content with literal text.
    fn set_text(&self, text: &str);

    fn clear(&self);

    /// Make `frame` the only child of the region.
    fn mount_frame(&self, frame: FrameId);

    /// Route anchor activation in the current content back to the block
    /// (via `EmbedBlock::on_link_activated`) instead of navigating.
    fn intercept_links(&self);
}

/// Handle to a sandboxed frame created by a [`FrameHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Creates sandboxed frames and posts content to them.
///
/// The host reports load completion through `EmbedBlock::on_frame_loaded`.
pub trait FrameHost {
    fn create_frame(&self, spec: &FrameSpec) -> Result<FrameId, PlatformError>;

    fn post_message(&self, frame: FrameId, message: &SandboxMessage) -> Result<(), PlatformError>;

    /// Address of the page hosting the editor, used to resolve the receiver.
    fn page_location(&self) -> Option<String> {
        None
    }
}

/// The editor shell that owns focus, history and the surrounding blocks.
pub trait EditorShell {
    /// Move editor focus to a block with the given selection.
    fn focus_block(&self, block_id: &str, range: TextRange);

    /// Record whether a text input currently holds keyboard focus.
    fn set_input_focus(&self, focused: bool);

    fn undo(&self, root_id: &str);

    fn redo(&self, root_id: &str);

    /// Generic block-level keydown handling (navigation between blocks, etc).
    fn block_key_down(&self, block_id: &str, event: &KeyEvent);

    fn block_key_up(&self, block_id: &str, event: &KeyEvent);

    /// Suspend or restore the editor's cross-block selection handling.
    fn set_selection_disabled(&self, disabled: bool);

    /// Open an external URL (system browser, new tab).
    fn open_url(&self, url: &str);
}

/// Autocomplete popup owned by the host's menu system.
///
/// The host reports item choice and dismissal through
/// `EmbedBlock::on_menu_event`.
pub trait MenuPopup {
    fn open(&self, id: MenuId, params: MenuParams);

    fn update(&self, id: MenuId, update: MenuUpdate);

    fn close(&self, id: MenuId);

    fn is_open(&self, id: MenuId) -> bool;
}

/// Local document store.
pub trait DocumentStore {
    fn update_text(&self, root_id: &str, block_id: &str, text: &str);
}

/// Completion callback for a remote text write.
pub type SaveCallback = Box<dyn FnOnce(Result<(), PlatformError>)>;

/// Remote text persistence command.
pub trait TextSetter {
    fn set_text(&self, root_id: &str, block_id: &str, text: &str, on_done: Option<SaveCallback>);
}

/// Post-mount hook returned by a diagram renderer (click handlers, etc).
pub type DiagramBindings = Box<dyn FnOnce(&dyn PreviewSurface)>;

/// Successful diagram render.
pub struct DiagramOutput {
    pub svg: String,
    pub bind: Option<DiagramBindings>,
}

impl DiagramOutput {
    pub fn svg(svg: impl Into<String>) -> Self {
        Self {
            svg: svg.into(),
            bind: None,
        }
    }
}

impl fmt::Debug for DiagramOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagramOutput")
            .field("svg", &self.svg)
            .field("bind", &self.bind.is_some())
            .finish()
    }
}

/// External diagram library.
pub trait DiagramRenderer {
    fn render(
        &self,
        container_id: &str,
        source: &str,
    ) -> LocalBoxFuture<Result<DiagramOutput, PlatformError>>;
}

/// Runs futures on the host's local executor.
pub trait TaskSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<()>);
}

/// Handle to a timer created by a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// One-shot timers. The host reports expiry through `EmbedBlock::on_timer`.
pub trait Scheduler {
    fn schedule(&self, delay: Duration) -> TimerId;

    fn cancel(&self, id: TimerId);
}

/// Document-level pointer listener registry.
///
/// While a subscription is held the host delivers pointer-down and
/// pointer-up events from anywhere in the document to the block.
pub trait PointerListeners {
    fn subscribe(&self, block_id: &str) -> ListenerGuard;
}

/// RAII subscription handle. Dropping it releases the listener exactly once.
#[must_use = "the listener is released when the guard is dropped"]
pub struct ListenerGuard {
    release: Option<Box<dyn FnOnce()>>,
}

impl ListenerGuard {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A guard with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Every collaborator an embed block talks to.
#[derive(Clone)]
pub struct BlockHost {
    pub shell: Rc<dyn EditorShell>,
    pub store: Rc<dyn DocumentStore>,
    pub remote: Rc<dyn TextSetter>,
    pub frames: Rc<dyn FrameHost>,
    pub menu: Rc<dyn MenuPopup>,
    pub diagrams: Rc<dyn DiagramRenderer>,
    pub spawner: Rc<dyn TaskSpawner>,
    pub scheduler: Rc<dyn Scheduler>,
    pub pointer: Rc<dyn PointerListeners>,
}
