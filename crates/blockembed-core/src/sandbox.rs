//! Sandboxed frame rendering for markup and script processors.
//!
//! Html, provider embeds and charts never run in the editor's own document.
//! Each block owns at most one frame that loads a local receiver page; once the
//! receiver reports load, the block posts a [`SandboxMessage`] and the receiver
//! mounts the content. Later edits re-post to the same frame.
//!
//! The frame's `sandbox` attribute is derived per processor from
//! [`SandboxPermissions::for_processor`]. Popups are never granted.

use std::borrow::Cow;

use bitflags::bitflags;
use blockembed_common::{EmbedConfig, Processor, Provider};
use blockembed_renderer::providers::rewrite_embed;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::EmbedError;
use crate::platform::{FrameHost, FrameId, PlatformError, PreviewSurface};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct SandboxPermissions: u8 {
        const SCRIPTS = 1 << 0;
        const SAME_ORIGIN = 1 << 1;
        const PRESENTATION = 1 << 2;
        const POPUPS = 1 << 3;
    }
}

impl SandboxPermissions {
    /// Grants for a processor's frame. Every frame may run scripts.
    pub fn for_processor(processor: Processor) -> Self {
        let mut permissions = Self::SCRIPTS;
        if let Some(provider) = processor.provider() {
            if same_origin_provider(provider) {
                permissions |= Self::SAME_ORIGIN;
            }
            if presentation_provider(provider) {
                permissions |= Self::PRESENTATION;
            }
        }
        permissions
    }

    /// Value for the frame's `sandbox` attribute.
    pub fn to_attribute(&self) -> String {
        let mut tokens = Vec::new();
        if self.contains(Self::SCRIPTS) {
            tokens.push("allow-scripts");
        }
        if self.contains(Self::SAME_ORIGIN) {
            tokens.push("allow-same-origin");
        }
        if self.contains(Self::PRESENTATION) {
            tokens.push("allow-presentation");
        }
        if self.contains(Self::POPUPS) {
            tokens.push("allow-popups");
        }
        tokens.join(" ")
    }
}

/// Providers whose players need their own origin (cookies, storage).
fn same_origin_provider(provider: Provider) -> bool {
    match provider {
        Provider::Youtube
        | Provider::Vimeo
        | Provider::Soundcloud
        | Provider::GoogleMaps
        | Provider::Miro => true,
        Provider::Figma => false,
    }
}

/// Providers allowed to enter fullscreen presentation.
fn presentation_provider(provider: Provider) -> bool {
    matches!(provider, Provider::Youtube | Provider::Vimeo)
}

/// Content posted to the receiver.
///
/// Exactly one of `html` or `js` is set. `libs` lists script URLs the receiver
/// loads before running `js`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub js: Option<String>,
    #[serde(default)]
    pub libs: Vec<String>,
    #[serde(default)]
    pub theme: String,
}

impl SandboxMessage {
    /// Build the message for `text` under `processor`.
    ///
    /// Provider share URLs are rewritten into embed markup first. Script
    /// processors post `js` with their environment libraries; everything else
    /// posts `html`.
    pub fn build(processor: Processor, text: &str, theme: &str, config: &EmbedConfig) -> Self {
        let payload = match processor.provider() {
            Some(provider) => rewrite_embed(provider, text),
            None => Cow::Borrowed(text),
        };

        let (html, js) = if processor.is_script() {
            (None, Some(payload.into_owned()))
        } else {
            (Some(payload.into_owned()), None)
        };

        Self {
            html,
            js,
            libs: environment_libs(processor, config),
            theme: theme.to_string(),
        }
    }

    /// Wire form posted to the receiver.
    pub fn to_json(&self) -> Result<String, EmbedError> {
        Ok(serde_json::to_string(self)?)
    }
}

fn environment_libs(processor: Processor, config: &EmbedConfig) -> Vec<String> {
    match processor {
        Processor::Chart => vec![config.chart_library_url.clone()],
        Processor::Html | Processor::Embed(_) | Processor::Latex | Processor::Diagram => Vec::new(),
    }
}

/// Element id of every receiver frame.
pub const RECEIVER_ELEMENT_ID: &str = "receiver";

/// Everything a [`FrameHost`] needs to create a receiver frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSpec {
    pub element_id: &'static str,
    pub src: String,
    pub permissions: SandboxPermissions,
    /// Rendered as `frameborder="0"` and `scrolling="no"`.
    pub borderless: bool,
}

impl FrameSpec {
    pub fn for_processor(
        processor: Processor,
        config: &EmbedConfig,
        page_location: Option<&str>,
    ) -> Self {
        Self {
            element_id: RECEIVER_ELEMENT_ID,
            src: resolve_receiver_src(&config.receiver_path, page_location),
            permissions: SandboxPermissions::for_processor(processor),
            borderless: true,
        }
    }

    pub fn sandbox_attribute(&self) -> String {
        self.permissions.to_attribute()
    }
}

/// Resolve the receiver path against the hosting page.
///
/// Packaged desktop builds serve the editor from `file://…/app.asar/index.html`
/// but the receiver lives in the unpacked archive next to it. Any other page
/// location leaves the relative path to the frame host.
pub fn resolve_receiver_src(receiver_path: &str, page_location: Option<&str>) -> String {
    let Some(location) = page_location.and_then(|l| Url::parse(l).ok()) else {
        return receiver_path.to_string();
    };
    if location.scheme() != "file" {
        return receiver_path.to_string();
    }

    let base = location
        .as_str()
        .replace("/app.asar/", "/app.asar.unpacked/")
        .replace("/index.html", "/");
    let relative = receiver_path.trim_start_matches("./");

    match Url::parse(&base).and_then(|b| b.join(relative)) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!(target: "blockembed::sandbox", %base, "cannot resolve receiver: {e}");
            receiver_path.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct MountedFrame {
    id: FrameId,
    loaded: bool,
}

/// Owns the lifecycle of one block's receiver frame.
///
/// The frame is created lazily on the first non-empty render and reused
/// afterwards. Messages are only posted once the receiver reported load.
#[derive(Debug, Default)]
pub struct SandboxBridge {
    frame: Option<MountedFrame>,
}

impl SandboxBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> Option<FrameId> {
        self.frame.map(|f| f.id)
    }

    pub fn is_loaded(&self) -> bool {
        self.frame.is_some_and(|f| f.loaded)
    }

    /// Create and mount the frame unless one exists. Returns true when a new
    /// frame was created.
    pub fn ensure_frame(
        &mut self,
        frames: &dyn FrameHost,
        preview: &dyn PreviewSurface,
        spec: &FrameSpec,
    ) -> Result<bool, PlatformError> {
        if self.frame.is_some() {
            return Ok(false);
        }

        let id = frames.create_frame(spec)?;
        preview.mount_frame(id);
        self.frame = Some(MountedFrame { id, loaded: false });
        tracing::debug!(
            target: "blockembed::sandbox",
            frame = id.0,
            sandbox = %spec.sandbox_attribute(),
            "created receiver frame"
        );
        Ok(true)
    }

    /// Record that `id` finished loading. False if it isn't this bridge's frame.
    pub fn mark_loaded(&mut self, id: FrameId) -> bool {
        match &mut self.frame {
            Some(frame) if frame.id == id => {
                frame.loaded = true;
                true
            }
            _ => false,
        }
    }

    /// Post to the frame if it has loaded. Returns whether anything was sent.
    pub fn post(
        &self,
        frames: &dyn FrameHost,
        message: &SandboxMessage,
    ) -> Result<bool, PlatformError> {
        match self.frame {
            Some(MountedFrame { id, loaded: true }) => {
                frames.post_message(id, message)?;
                Ok(true)
            }
            Some(MountedFrame { loaded: false, .. }) => {
                tracing::trace!(target: "blockembed::sandbox", "receiver not loaded yet, deferring");
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Forget the frame after the preview region was cleared.
    pub fn reset(&mut self) {
        self.frame = None;
    }
}
