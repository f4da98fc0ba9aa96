//! The embed block component.
//!
//! [`EmbedBlock`] is long-lived: the host mounts it once, forwards UI events
//! to the `on_*` handlers and calls [`EmbedBlock::teardown`] when the block
//! leaves the document. Handlers that can reach a platform call which may
//! fail return `Result`; everything else reports through tracing.
//!
//! Every handler is a no-op after teardown.

use std::rc::Rc;
use std::time::Duration;

use blockembed_common::{EmbedConfig, Processor};
use smol_str::SmolStr;

use crate::autocomplete::{AutocompleteController, MenuEvent, MenuFilter, MenuId};
use crate::error::EmbedError;
use crate::keys::{HistoryAction, KeyEvent, KeydownResult};
use crate::lifecycle::Liveness;
use crate::persist::PersistenceGateway;
use crate::platform::{
    BlockHost, EditableSurface, FrameId, ListenerGuard, PreviewSurface, TimerId,
};
use crate::range::RangeTracker;
use crate::render::{Adapter, RenderContext};
use crate::state::{DisplayState, EditState, Transition};
use crate::types::{TextRange, char_len, splice};
use crate::view::{self, BlockView};

/// Host-provided identity and content of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockProps {
    pub root_id: SmolStr,
    pub block_id: SmolStr,
    pub processor: Processor,
    pub text: String,
    pub read_only: bool,
}

/// Where a document-level pointer-down landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    InsideBlock,
    Outside,
}

pub struct EmbedBlock {
    root_id: SmolStr,
    block_id: SmolStr,
    processor: Processor,
    read_only: bool,
    /// Last source text handed to the renderer.
    text: String,
    state: EditState,
    theme: String,
    config: EmbedConfig,
    host: BlockHost,
    range: RangeTracker,
    preview: Rc<dyn PreviewSurface>,
    adapter: Adapter,
    autocomplete: AutocompleteController,
    persistence: PersistenceGateway,
    liveness: Liveness,
    pointer_guard: Option<ListenerGuard>,
    selection_guard: Option<ListenerGuard>,
    pending_save: Option<TimerId>,
}

impl EmbedBlock {
    /// Mount a block and render its initial content.
    pub fn mount(
        props: BlockProps,
        config: EmbedConfig,
        host: BlockHost,
        editable: Rc<dyn EditableSurface>,
        preview: Rc<dyn PreviewSurface>,
    ) -> Result<Self, EmbedError> {
        let BlockProps {
            root_id,
            block_id,
            processor,
            text,
            read_only,
        } = props;

        let autocomplete =
            AutocompleteController::new(host.menu.clone(), root_id.clone(), block_id.clone());
        let persistence = PersistenceGateway::new(
            root_id.clone(),
            block_id.clone(),
            read_only,
            host.store.clone(),
            host.remote.clone(),
        );

        let mut block = Self {
            range: RangeTracker::new(editable, processor.highlight_lang()),
            adapter: Adapter::for_processor(processor),
            theme: config.theme.clone(),
            root_id,
            block_id,
            processor,
            read_only,
            text,
            state: EditState::default(),
            config,
            host,
            preview,
            autocomplete,
            persistence,
            liveness: Liveness::new(),
            pointer_guard: None,
            selection_guard: None,
            pending_save: None,
        };

        tracing::debug!(
            target: "blockembed::block",
            block = %block.block_id,
            processor = %block.processor,
            read_only = block.read_only,
            "mounted"
        );
        block.render()?;
        Ok(block)
    }

    pub fn block_id(&self) -> &str {
        &self.block_id
    }

    pub fn processor(&self) -> Processor {
        self.processor
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn display(&self) -> DisplayState {
        self.state.display(self.processor)
    }

    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }

    /// Current selection in the source input.
    pub fn range(&self) -> Option<TextRange> {
        self.range.get()
    }

    pub fn menu_filter(&self) -> Option<&MenuFilter> {
        self.autocomplete.filter()
    }

    pub fn view(&self) -> BlockView {
        view::project(
            self.processor,
            &self.block_id,
            &self.text,
            self.state,
            self.read_only,
        )
    }

    // === Mode changes ===

    /// Edit affordance clicked. Places the cursor at the end of the text.
    pub fn on_edit(&mut self) -> Result<(), EmbedError> {
        if !self.is_alive() || self.read_only || self.state.is_editing {
            return Ok(());
        }
        self.transition(Transition::Edit)?;
        self.range.set(TextRange::caret(char_len(&self.text)));
        Ok(())
    }

    /// Preview affordance clicked. Never saves.
    pub fn on_preview(&mut self) -> Result<(), EmbedError> {
        if !self.is_alive() {
            return Ok(());
        }
        self.transition(Transition::Expand)
    }

    pub fn on_focus_block(&self) {
        if !self.is_alive() {
            return;
        }
        let start = TextRange::caret(0);
        self.host.shell.focus_block(&self.block_id, start);
        self.range.set(start);
    }

    // === Keyboard ===

    pub fn on_key_down_block(&self, event: &KeyEvent) -> KeydownResult {
        if !self.is_alive() {
            return KeydownResult::NotHandled;
        }
        if !self.state.is_editing {
            self.host.shell.block_key_down(&self.block_id, event);
            return KeydownResult::Forwarded;
        }
        match event.history_action(self.config.is_mac) {
            Some(HistoryAction::Undo) => {
                self.host.shell.undo(&self.root_id);
                KeydownResult::Handled
            }
            Some(HistoryAction::Redo) => {
                self.host.shell.redo(&self.root_id);
                KeydownResult::Handled
            }
            None => KeydownResult::NotHandled,
        }
    }

    pub fn on_key_up_block(&self, event: &KeyEvent) {
        if self.is_alive() && !self.state.is_editing {
            self.host.shell.block_key_up(&self.block_id, event);
        }
    }

    pub fn on_key_down_input(&mut self, event: &KeyEvent) {
        if !self.is_editing_live() || !self.processor.is_latex() {
            return;
        }
        self.autocomplete.on_key_down(event, self.range.get());
    }

    /// Non-special keys re-render and save.
    pub fn on_key_up_input(&mut self, event: &KeyEvent) -> Result<(), EmbedError> {
        if !self.is_editing_live() {
            return Ok(());
        }
        if self.processor.is_latex() {
            self.autocomplete.on_key_up(&self.range, event);
        }
        if event.is_special() {
            return Ok(());
        }
        let value = self.range.value();
        self.set_content(value)?;
        self.schedule_save();
        Ok(())
    }

    /// Input event: re-highlight the source and refresh the preview.
    pub fn on_input(&mut self) -> Result<(), EmbedError> {
        if !self.is_editing_live() {
            return Ok(());
        }
        let value = self.range.value();
        self.range.set_value(&value);
        self.set_content(value)
    }

    /// Insert plain clipboard text over the selection and save.
    pub fn on_paste(&mut self, clipboard: Option<&str>) -> Result<(), EmbedError> {
        if !self.is_editing_live() {
            return Ok(());
        }
        let (Some(range), Some(insert)) = (self.range.get(), clipboard) else {
            tracing::debug!(target: "blockembed::block", "paste without range or text");
            return Ok(());
        };

        let current = self.range.value();
        let range = range.clamp(char_len(&current));
        let value = splice(&current, range, insert);
        self.range.set_value(&value);
        self.range.set(TextRange::caret(range.from + char_len(insert)));
        self.set_content(value)?;
        self.cancel_pending_save();
        self.save();
        Ok(())
    }

    // === Focus ===

    pub fn on_focus_input(&self) {
        if !self.is_alive() {
            return;
        }
        self.host.shell.set_input_focus(true);
    }

    /// Blur saves. It also leaves editing unless the symbol popup holds focus.
    pub fn on_blur_input(&mut self) -> Result<(), EmbedError> {
        if !self.is_alive() {
            return Ok(());
        }
        self.host.shell.set_input_focus(false);
        if !self.state.is_editing {
            return Ok(());
        }
        self.cancel_pending_save();
        self.save();
        if self.autocomplete.is_open() {
            return Ok(());
        }
        self.leave_editing()
    }

    /// Document-level pointer-down. Returns true when the event committed the
    /// edit and should not propagate further.
    pub fn on_global_pointer_down(&mut self, target: PointerTarget) -> Result<bool, EmbedError> {
        if !self.is_editing_live() || self.autocomplete.is_open() {
            return Ok(false);
        }
        if target == PointerTarget::InsideBlock {
            return Ok(false);
        }

        tracing::debug!(target: "blockembed::block", block = %self.block_id, "outside click, committing");
        self.cancel_pending_save();
        self.range.placeholder_check();
        self.save();
        self.leave_editing()?;
        Ok(true)
    }

    /// Selection drag started in the source input.
    pub fn on_select(&mut self) {
        if !self.is_alive() {
            return;
        }
        self.host.shell.set_selection_disabled(true);
        self.selection_guard = Some(self.host.pointer.subscribe(&self.block_id));
    }

    pub fn on_global_pointer_up(&mut self) {
        if self.selection_guard.take().is_some() {
            self.host.shell.set_selection_disabled(false);
        }
    }

    // === Autocomplete ===

    /// Template control pressed. Enters editing first when needed.
    pub fn on_template(&mut self) -> Result<(), EmbedError> {
        if !self.is_alive() || self.read_only || !self.processor.is_latex() {
            return Ok(());
        }
        if !self.state.is_editing {
            self.on_edit()?;
        }
        self.autocomplete.open_template(&self.range);
        Ok(())
    }

    pub fn on_menu_event(&mut self, event: MenuEvent) -> Result<(), EmbedError> {
        if !self.is_alive() {
            return Ok(());
        }
        match event {
            MenuEvent::Selected {
                from,
                to,
                template,
                item,
            } => {
                if !self.state.is_editing {
                    return Ok(());
                }
                let spliced =
                    AutocompleteController::apply(&self.range.value(), from, to, template, &item);
                self.range.set_value(&spliced.value);
                self.range.set(TextRange::caret(spliced.cursor));
                self.set_content(spliced.value)?;
                self.cancel_pending_save();
                self.save();
            }
            MenuEvent::Closed => self.autocomplete.on_closed(),
        }
        Ok(())
    }

    // === Host notifications ===

    pub fn on_frame_loaded(&mut self, frame: FrameId) -> Result<(), EmbedError> {
        if !self.is_alive() {
            return Ok(());
        }
        let ctx = RenderContext {
            processor: self.processor,
            block_id: &self.block_id,
            theme: &self.theme,
            config: &self.config,
            host: &self.host,
            preview: &self.preview,
            liveness: &self.liveness,
        };
        self.adapter.frame_loaded(&ctx, frame, &self.text)?;
        Ok(())
    }

    /// An anchor in rendered math was activated. Only links emitted by the
    /// last render are opened.
    pub fn on_link_activated(&self, href: &str) -> bool {
        if !self.is_alive() {
            return false;
        }
        let trusted = matches!(&self.adapter, Adapter::Latex(latex) if latex.is_rendered_link(href));
        if trusted {
            self.host.shell.open_url(href);
        } else {
            tracing::debug!(target: "blockembed::latex", %href, "ignoring link not produced by render");
        }
        trusted
    }

    pub fn on_timer(&mut self, id: TimerId) {
        if !self.is_alive() || self.pending_save != Some(id) {
            return;
        }
        self.pending_save = None;
        self.save();
    }

    /// The block's text changed outside this component (undo, collaboration).
    pub fn on_block_updated(&mut self, text: String) -> Result<(), EmbedError> {
        if !self.is_alive() {
            return Ok(());
        }
        if self.state.is_editing && self.range.value() != text {
            self.range.set_value(&text);
        }
        self.set_content(text)
    }

    /// Re-render with a new theme. Sandbox frames are reused.
    pub fn set_theme(&mut self, theme: &str) -> Result<(), EmbedError> {
        if !self.is_alive() || self.theme == theme {
            return Ok(());
        }
        self.theme = theme.to_string();
        self.render()
    }

    /// Release listeners and timers. Late async completions are dropped.
    pub fn teardown(&mut self) {
        if !self.is_alive() {
            return;
        }
        tracing::debug!(target: "blockembed::block", block = %self.block_id, "teardown");
        self.liveness.kill();
        self.cancel_pending_save();
        self.pointer_guard = None;
        if self.selection_guard.take().is_some() {
            self.host.shell.set_selection_disabled(false);
        }
    }

    // === Internals ===

    fn is_editing_live(&self) -> bool {
        self.is_alive() && self.state.is_editing
    }

    fn transition(&mut self, transition: Transition) -> Result<(), EmbedError> {
        let next = self.state.apply(transition, self.read_only);
        if next == self.state {
            return Ok(());
        }
        let was_editing = self.state.is_editing;
        self.state = next;
        tracing::debug!(
            target: "blockembed::block",
            block = %self.block_id,
            ?transition,
            display = ?self.display(),
            "state change"
        );

        if next.is_editing && !was_editing {
            self.pointer_guard = Some(self.host.pointer.subscribe(&self.block_id));
            self.range.set_value(&self.text);
        } else if !next.is_editing && was_editing {
            self.pointer_guard = None;
        }
        self.render()
    }

    fn leave_editing(&mut self) -> Result<(), EmbedError> {
        self.host.menu.close(MenuId::LatexPreview);
        self.transition(Transition::Commit)
    }

    fn set_content(&mut self, text: String) -> Result<(), EmbedError> {
        self.text = text;
        self.render()
    }

    fn render(&mut self) -> Result<(), EmbedError> {
        if !self.is_alive() {
            return Ok(());
        }
        if !self.state.renders(self.processor) {
            tracing::trace!(target: "blockembed::block", block = %self.block_id, "collapsed, skipping render");
            return Ok(());
        }

        let ctx = RenderContext {
            processor: self.processor,
            block_id: &self.block_id,
            theme: &self.theme,
            config: &self.config,
            host: &self.host,
            preview: &self.preview,
            liveness: &self.liveness,
        };
        self.adapter.render(&ctx, &self.text)?;

        if self.processor.is_latex() {
            self.autocomplete.follow_cursor(&self.range);
        }
        Ok(())
    }

    fn schedule_save(&mut self) {
        if self.read_only {
            return;
        }
        match self.config.save_debounce_ms {
            Some(ms) => {
                self.cancel_pending_save();
                self.pending_save = Some(self.host.scheduler.schedule(Duration::from_millis(ms)));
            }
            None => self.save(),
        }
    }

    fn cancel_pending_save(&mut self) {
        if let Some(id) = self.pending_save.take() {
            self.host.scheduler.cancel(id);
        }
    }

    fn save(&self) {
        self.persistence.save(&self.range, None);
    }
}

impl Drop for EmbedBlock {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for EmbedBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbedBlock")
            .field("block_id", &self.block_id)
            .field("processor", &self.processor)
            .field("state", &self.state)
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}
