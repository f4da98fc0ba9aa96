//! Processor-specific preview rendering.

use std::rc::Rc;

use blockembed_common::{EmbedConfig, Processor};

use crate::diagram::{DiagramAdapter, container_id};
use crate::error::EmbedError;
use crate::latex::LatexAdapter;
use crate::lifecycle::Liveness;
use crate::platform::{BlockHost, FrameId, PreviewSurface};
use crate::registry::{AdapterKind, adapter_kind};
use crate::sandbox::{FrameSpec, SandboxBridge, SandboxMessage};

/// Borrowed view of the block state an adapter needs.
pub struct RenderContext<'a> {
    pub processor: Processor,
    pub block_id: &'a str,
    pub theme: &'a str,
    pub config: &'a EmbedConfig,
    pub host: &'a BlockHost,
    pub preview: &'a Rc<dyn PreviewSurface>,
    pub liveness: &'a Liveness,
}

/// Render adapter with its per-block state.
#[derive(Debug)]
pub enum Adapter {
    Sandbox(SandboxBridge),
    Latex(LatexAdapter),
    Diagram(DiagramAdapter),
}

impl Adapter {
    pub fn for_processor(processor: Processor) -> Self {
        match adapter_kind(processor) {
            AdapterKind::Sandbox => Adapter::Sandbox(SandboxBridge::new()),
            AdapterKind::Latex => Adapter::Latex(LatexAdapter::new()),
            AdapterKind::Diagram => Adapter::Diagram(DiagramAdapter::new()),
        }
    }

    pub fn kind(&self) -> AdapterKind {
        match self {
            Adapter::Sandbox(_) => AdapterKind::Sandbox,
            Adapter::Latex(_) => AdapterKind::Latex,
            Adapter::Diagram(_) => AdapterKind::Diagram,
        }
    }

    /// Render `text` into the preview. Empty text clears it.
    pub fn render(&mut self, ctx: &RenderContext<'_>, text: &str) -> Result<(), EmbedError> {
        if text.is_empty() {
            self.clear(ctx.preview.as_ref());
            return Ok(());
        }

        match self {
            Adapter::Sandbox(bridge) => {
                let location = ctx.host.frames.page_location();
                let spec = FrameSpec::for_processor(ctx.processor, ctx.config, location.as_deref());
                let created =
                    bridge.ensure_frame(ctx.host.frames.as_ref(), ctx.preview.as_ref(), &spec)?;
                if !created {
                    let message = SandboxMessage::build(ctx.processor, text, ctx.theme, ctx.config);
                    bridge.post(ctx.host.frames.as_ref(), &message)?;
                }
            }
            Adapter::Latex(latex) => latex.render(ctx.preview.as_ref(), text),
            Adapter::Diagram(diagram) => diagram.render(
                ctx.host.diagrams.as_ref(),
                ctx.host.spawner.as_ref(),
                ctx.preview.clone(),
                ctx.liveness.clone(),
                &container_id(ctx.block_id),
                text,
            ),
        }
        Ok(())
    }

    /// The receiver frame finished loading; post the current content.
    /// Returns whether a message was sent.
    pub fn frame_loaded(
        &mut self,
        ctx: &RenderContext<'_>,
        frame: FrameId,
        text: &str,
    ) -> Result<bool, EmbedError> {
        let Adapter::Sandbox(bridge) = self else {
            return Ok(false);
        };
        if !bridge.mark_loaded(frame) {
            tracing::debug!(target: "blockembed::sandbox", frame = frame.0, "load from unknown frame");
            return Ok(false);
        }
        if text.is_empty() {
            return Ok(false);
        }
        let message = SandboxMessage::build(ctx.processor, text, ctx.theme, ctx.config);
        Ok(bridge.post(ctx.host.frames.as_ref(), &message)?)
    }

    pub fn clear(&mut self, preview: &dyn PreviewSurface) {
        preview.clear();
        match self {
            Adapter::Sandbox(bridge) => bridge.reset(),
            Adapter::Latex(latex) => latex.clear(),
            Adapter::Diagram(diagram) => diagram.cancel(),
        }
    }
}
