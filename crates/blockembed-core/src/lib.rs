//! blockembed-core: the embed block state machine, free of any UI framework.
//!
//! This crate provides:
//! - [`EmbedBlock`] - edit/preview state machine driven by host events
//! - Render adapters: sandboxed frames, in-place LaTeX, async diagrams
//! - [`AutocompleteController`] - backslash-triggered LaTeX symbol popup
//! - [`PersistenceGateway`] - local-then-remote text write-back
//! - Platform traits in [`platform`] that hosts implement

pub mod autocomplete;
pub mod block;
pub mod diagram;
pub mod error;
pub mod keys;
pub mod latex;
pub mod lifecycle;
pub mod persist;
pub mod platform;
pub mod range;
pub mod registry;
pub mod render;
pub mod sandbox;
pub mod state;
pub mod types;
pub mod view;

pub use autocomplete::{
    AutocompleteController, MenuAnchor, MenuEvent, MenuFilter, MenuId, MenuItem, MenuParams,
    MenuUpdate,
};
pub use block::{BlockProps, EmbedBlock, PointerTarget};
pub use blockembed_common::{EmbedConfig, HighlightLang, Processor, Provider};
pub use error::EmbedError;
pub use keys::{HistoryAction, Key, KeyEvent, KeydownResult, Modifiers};
pub use lifecycle::Liveness;
pub use persist::PersistenceGateway;
pub use platform::{
    BlockHost, DiagramOutput, DiagramRenderer, DocumentStore, EditableSurface, EditorShell,
    FrameHost, FrameId, ListenerGuard, LocalBoxFuture, MenuPopup, PlatformError,
    PointerListeners, PreviewSurface, SaveCallback, Scheduler, TaskSpawner, TextSetter, TimerId,
};
pub use range::RangeTracker;
pub use registry::{AdapterKind, ProcessorInfo};
pub use sandbox::{FrameSpec, SandboxMessage, SandboxPermissions};
pub use smol_str::SmolStr;
pub use state::{DisplayState, EditState, Transition};
pub use types::{Rect, TextRange};
pub use view::BlockView;
