//! Recording fakes for every platform trait.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::future::{pending, ready};
use std::rc::Rc;
use std::time::Duration;

use blockembed_core::{
    BlockHost, BlockProps, DiagramOutput, DiagramRenderer, DocumentStore, EditableSurface,
    EditorShell, EmbedBlock, EmbedConfig, FrameHost, FrameId, FrameSpec, KeyEvent, ListenerGuard,
    LocalBoxFuture, MenuId, MenuParams, MenuPopup, MenuUpdate, PlatformError, PointerListeners,
    PreviewSurface, Processor, Rect, SandboxMessage, SaveCallback, Scheduler, TaskSpawner,
    TextRange, TextSetter, TimerId,
};

// === Editable input ===

#[derive(Default)]
pub struct FakeInput {
    pub text: RefCell<String>,
    pub markup: RefCell<String>,
    pub range: Cell<Option<TextRange>>,
    pub placeholder_checks: Cell<usize>,
}

impl FakeInput {
    /// Type `s` at the caret, replacing any selection.
    pub fn type_str(&self, s: &str) {
        let text = self.text.borrow().clone();
        let len = text.chars().count();
        let range = self.range.get().unwrap_or(TextRange::caret(len)).clamp(len);
        let mut chars: Vec<char> = text.chars().collect();
        chars.splice(range.from..range.to, s.chars());
        *self.text.borrow_mut() = chars.into_iter().collect();
        self.range
            .set(Some(TextRange::caret(range.from + s.chars().count())));
    }

    pub fn backspace(&self) {
        let Some(range) = self.range.get() else {
            return;
        };
        if range.from == 0 {
            return;
        }
        let mut chars: Vec<char> = self.text.borrow().chars().collect();
        chars.remove(range.from - 1);
        *self.text.borrow_mut() = chars.into_iter().collect();
        self.range.set(Some(TextRange::caret(range.from - 1)));
    }

    pub fn value(&self) -> String {
        self.text.borrow().clone()
    }
}

impl EditableSurface for FakeInput {
    fn text_value(&self) -> String {
        self.text.borrow().clone()
    }

    fn set_value(&self, text: &str, markup: &str) {
        *self.text.borrow_mut() = text.to_string();
        *self.markup.borrow_mut() = markup.to_string();
    }

    fn selection(&self) -> Option<TextRange> {
        self.range.get()
    }

    fn set_selection(&self, range: TextRange) {
        self.range.set(Some(range));
    }

    fn placeholder_check(&self) {
        self.placeholder_checks.set(self.placeholder_checks.get() + 1);
    }

    fn selection_rect(&self) -> Option<Rect> {
        self.range.get().map(|r| Rect::new(r.from as f64 * 8.0, 100.0, 1.0, 18.0))
    }
}

// === Preview ===

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOp {
    Html(String),
    Text(String),
    Clear,
    Frame(FrameId),
    InterceptLinks,
}

#[derive(Default)]
pub struct FakePreview {
    pub ops: RefCell<Vec<PreviewOp>>,
}

impl FakePreview {
    pub fn last_html(&self) -> Option<String> {
        self.ops.borrow().iter().rev().find_map(|op| match op {
            PreviewOp::Html(html) => Some(html.clone()),
            _ => None,
        })
    }

    pub fn count(&self, matches: impl Fn(&PreviewOp) -> bool) -> usize {
        self.ops.borrow().iter().filter(|op| matches(op)).count()
    }
}

impl PreviewSurface for FakePreview {
    fn set_html(&self, html: &str) {
        self.ops.borrow_mut().push(PreviewOp::Html(html.to_string()));
    }

    fn set_text(&self, text: &str) {
        self.ops.borrow_mut().push(PreviewOp::Text(text.to_string()));
    }

    fn clear(&self) {
        self.ops.borrow_mut().push(PreviewOp::Clear);
    }

    fn mount_frame(&self, frame: FrameId) {
        self.ops.borrow_mut().push(PreviewOp::Frame(frame));
    }

    fn intercept_links(&self) {
        self.ops.borrow_mut().push(PreviewOp::InterceptLinks);
    }
}

// === Frames ===

#[derive(Default)]
pub struct FakeFrames {
    pub created: RefCell<Vec<FrameSpec>>,
    pub posted: RefCell<Vec<(FrameId, SandboxMessage)>>,
    pub location: RefCell<Option<String>>,
    pub fail_create: Cell<bool>,
    next_id: Cell<u64>,
}

impl FakeFrames {
    pub fn last_frame(&self) -> FrameId {
        FrameId(self.next_id.get())
    }

    pub fn last_message(&self) -> Option<SandboxMessage> {
        self.posted.borrow().last().map(|(_, m)| m.clone())
    }
}

impl FrameHost for FakeFrames {
    fn create_frame(&self, spec: &FrameSpec) -> Result<FrameId, PlatformError> {
        if self.fail_create.get() {
            return Err("frame creation refused".into());
        }
        self.created.borrow_mut().push(spec.clone());
        self.next_id.set(self.next_id.get() + 1);
        Ok(FrameId(self.next_id.get()))
    }

    fn post_message(&self, frame: FrameId, message: &SandboxMessage) -> Result<(), PlatformError> {
        self.posted.borrow_mut().push((frame, message.clone()));
        Ok(())
    }

    fn page_location(&self) -> Option<String> {
        self.location.borrow().clone()
    }
}

// === Shell ===

#[derive(Default)]
pub struct FakeShell {
    pub calls: RefCell<Vec<String>>,
}

impl FakeShell {
    fn log(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    pub fn has(&self, call: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == call)
    }
}

impl EditorShell for FakeShell {
    fn focus_block(&self, block_id: &str, range: TextRange) {
        self.log(format!("focus {block_id} {}..{}", range.from, range.to));
    }

    fn set_input_focus(&self, focused: bool) {
        self.log(format!("input_focus {focused}"));
    }

    fn undo(&self, root_id: &str) {
        self.log(format!("undo {root_id}"));
    }

    fn redo(&self, root_id: &str) {
        self.log(format!("redo {root_id}"));
    }

    fn block_key_down(&self, block_id: &str, event: &KeyEvent) {
        self.log(format!("key_down {block_id} {:?}", event.key));
    }

    fn block_key_up(&self, block_id: &str, event: &KeyEvent) {
        self.log(format!("key_up {block_id} {:?}", event.key));
    }

    fn set_selection_disabled(&self, disabled: bool) {
        self.log(format!("selection_disabled {disabled}"));
    }

    fn open_url(&self, url: &str) {
        self.log(format!("open {url}"));
    }
}

// === Menu ===

#[derive(Default)]
pub struct FakeMenu {
    pub open: RefCell<HashSet<MenuId>>,
    pub opened: RefCell<Vec<MenuParams>>,
    pub updates: RefCell<Vec<MenuUpdate>>,
    pub closed: RefCell<Vec<MenuId>>,
}

impl FakeMenu {
    pub fn is_symbols_open(&self) -> bool {
        self.open.borrow().contains(&MenuId::LatexSymbols)
    }
}

impl MenuPopup for FakeMenu {
    fn open(&self, id: MenuId, params: MenuParams) {
        self.open.borrow_mut().insert(id);
        self.opened.borrow_mut().push(params);
    }

    fn update(&self, _id: MenuId, update: MenuUpdate) {
        self.updates.borrow_mut().push(update);
    }

    fn close(&self, id: MenuId) {
        self.open.borrow_mut().remove(&id);
        self.closed.borrow_mut().push(id);
    }

    fn is_open(&self, id: MenuId) -> bool {
        self.open.borrow().contains(&id)
    }
}

// === Persistence ===

#[derive(Default)]
pub struct FakeStore {
    pub writes: RefCell<Vec<String>>,
}

impl DocumentStore for FakeStore {
    fn update_text(&self, _root_id: &str, _block_id: &str, text: &str) {
        self.writes.borrow_mut().push(text.to_string());
    }
}

#[derive(Default)]
pub struct FakeRemote {
    pub writes: RefCell<Vec<String>>,
}

impl TextSetter for FakeRemote {
    fn set_text(&self, _root_id: &str, _block_id: &str, text: &str, on_done: Option<SaveCallback>) {
        self.writes.borrow_mut().push(text.to_string());
        if let Some(done) = on_done {
            done(Ok(()));
        }
    }
}

// === Diagrams ===

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramMode {
    Resolve(String),
    Reject(String),
    Never,
}

pub struct FakeDiagrams {
    pub mode: RefCell<DiagramMode>,
    pub requests: RefCell<Vec<(String, String)>>,
}

impl Default for FakeDiagrams {
    fn default() -> Self {
        Self {
            mode: RefCell::new(DiagramMode::Resolve("<svg>diagram</svg>".into())),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl DiagramRenderer for FakeDiagrams {
    fn render(
        &self,
        container_id: &str,
        source: &str,
    ) -> LocalBoxFuture<Result<DiagramOutput, PlatformError>> {
        self.requests
            .borrow_mut()
            .push((container_id.to_string(), source.to_string()));
        match self.mode.borrow().clone() {
            DiagramMode::Resolve(svg) => Box::pin(ready(Ok(DiagramOutput::svg(svg)))),
            DiagramMode::Reject(message) => Box::pin(ready(Err(PlatformError(message)))),
            DiagramMode::Never => Box::pin(pending()),
        }
    }
}

#[derive(Default)]
pub struct FakeSpawner {
    pub tasks: RefCell<Vec<LocalBoxFuture<()>>>,
}

impl FakeSpawner {
    /// Run every queued task that completes immediately. Tasks that stay
    /// pending are dropped, like a render that never resolves.
    pub async fn run_ready(&self) {
        let tasks: Vec<_> = self.tasks.borrow_mut().drain(..).collect();
        for task in tasks {
            tokio::select! {
                biased;
                _ = task => {}
                _ = tokio::task::yield_now() => {}
            }
        }
    }
}

impl TaskSpawner for FakeSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<()>) {
        self.tasks.borrow_mut().push(task);
    }
}

// === Timers and pointer listeners ===

#[derive(Default)]
pub struct FakeScheduler {
    pub scheduled: RefCell<Vec<(TimerId, Duration)>>,
    pub cancelled: RefCell<Vec<TimerId>>,
    next_id: Cell<u64>,
}

impl Scheduler for FakeScheduler {
    fn schedule(&self, delay: Duration) -> TimerId {
        self.next_id.set(self.next_id.get() + 1);
        let id = TimerId(self.next_id.get());
        self.scheduled.borrow_mut().push((id, delay));
        id
    }

    fn cancel(&self, id: TimerId) {
        self.cancelled.borrow_mut().push(id);
    }
}

#[derive(Default)]
pub struct FakePointer {
    pub active: Rc<Cell<usize>>,
    pub subscriptions: Cell<usize>,
}

impl PointerListeners for FakePointer {
    fn subscribe(&self, _block_id: &str) -> ListenerGuard {
        self.subscriptions.set(self.subscriptions.get() + 1);
        self.active.set(self.active.get() + 1);
        let active = self.active.clone();
        ListenerGuard::new(move || active.set(active.get() - 1))
    }
}

// === Harness ===

#[derive(Default)]
pub struct Harness {
    pub input: Rc<FakeInput>,
    pub preview: Rc<FakePreview>,
    pub frames: Rc<FakeFrames>,
    pub shell: Rc<FakeShell>,
    pub menu: Rc<FakeMenu>,
    pub store: Rc<FakeStore>,
    pub remote: Rc<FakeRemote>,
    pub diagrams: Rc<FakeDiagrams>,
    pub spawner: Rc<FakeSpawner>,
    pub scheduler: Rc<FakeScheduler>,
    pub pointer: Rc<FakePointer>,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(&self) -> BlockHost {
        BlockHost {
            shell: self.shell.clone(),
            store: self.store.clone(),
            remote: self.remote.clone(),
            frames: self.frames.clone(),
            menu: self.menu.clone(),
            diagrams: self.diagrams.clone(),
            spawner: self.spawner.clone(),
            scheduler: self.scheduler.clone(),
            pointer: self.pointer.clone(),
        }
    }

    pub fn mount(&self, processor: Processor, text: &str) -> EmbedBlock {
        self.mount_with(processor, text, false, EmbedConfig::default())
    }

    pub fn mount_read_only(&self, processor: Processor, text: &str) -> EmbedBlock {
        self.mount_with(processor, text, true, EmbedConfig::default())
    }

    pub fn mount_with(
        &self,
        processor: Processor,
        text: &str,
        read_only: bool,
        config: EmbedConfig,
    ) -> EmbedBlock {
        let props = BlockProps {
            root_id: "root".into(),
            block_id: "b1".into(),
            processor,
            text: text.to_string(),
            read_only,
        };
        EmbedBlock::mount(
            props,
            config,
            self.host(),
            self.input.clone(),
            self.preview.clone(),
        )
        .expect("mount")
    }

    /// Total persistence calls issued (local and remote are always paired).
    pub fn saves(&self) -> Vec<String> {
        let local = self.store.writes.borrow().clone();
        assert_eq!(local, *self.remote.writes.borrow(), "local and remote writes diverged");
        local
    }

    /// Type `s` one char at a time through the block's input handlers.
    pub fn type_keys(&self, block: &mut EmbedBlock, s: &str) {
        for c in s.chars() {
            let event = KeyEvent::char(c);
            block.on_key_down_input(&event);
            self.input.type_str(&c.to_string());
            block.on_input().expect("input");
            block.on_key_up_input(&event).expect("key up");
        }
    }
}
