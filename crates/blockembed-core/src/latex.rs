//! In-place LaTeX rendering.

use blockembed_renderer::typeset;
use smol_str::SmolStr;

use crate::platform::PreviewSurface;

/// Typesets the source into the preview and remembers which links it emitted.
///
/// Only hrefs produced by the trusted link commands in the last render are
/// ever opened; anything else the host reports is ignored.
#[derive(Debug, Default)]
pub struct LatexAdapter {
    links: Vec<SmolStr>,
}

impl LatexAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `text` in display mode. Malformed input renders as error markup.
    pub fn render(&mut self, preview: &dyn PreviewSurface, text: &str) {
        let out = typeset(text, true);
        if out.has_errors() {
            tracing::debug!(
                target: "blockembed::latex",
                errors = out.errors.len(),
                "rendered with errors"
            );
        }
        preview.set_html(&out.html);
        if !out.links.is_empty() {
            preview.intercept_links();
        }
        self.links = out.links;
    }

    pub fn links(&self) -> &[SmolStr] {
        &self.links
    }

    pub fn is_rendered_link(&self, href: &str) -> bool {
        self.links.iter().any(|link| link == href)
    }

    pub fn clear(&mut self) {
        self.links.clear();
    }
}
