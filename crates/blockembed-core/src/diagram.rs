//! Asynchronous diagram rendering.

use std::rc::Rc;

use crate::lifecycle::{Generation, Liveness};
use crate::platform::{DiagramRenderer, PreviewSurface, TaskSpawner};

/// Container element id handed to the diagram library.
pub fn container_id(block_id: &str) -> String {
    format!("block-{block_id}-container")
}

/// Hands the source to the diagram library and mounts the SVG when it
/// resolves.
///
/// Completions are dropped if the block was torn down or a newer render
/// started in the meantime. A rejected render leaves the preview as it was.
#[derive(Debug, Default)]
pub struct DiagramAdapter {
    generation: Generation,
}

impl DiagramAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &self,
        renderer: &dyn DiagramRenderer,
        spawner: &dyn TaskSpawner,
        preview: Rc<dyn PreviewSurface>,
        liveness: Liveness,
        container_id: &str,
        text: &str,
    ) {
        let ticket = self.generation.bump();
        let generation = self.generation.clone();
        let pending = renderer.render(container_id, text);
        let source = text.to_string();

        spawner.spawn_local(Box::pin(async move {
            let result = pending.await;

            if !liveness.is_alive() {
                tracing::debug!(target: "blockembed::diagram", "block torn down, dropping render");
                return;
            }
            if !generation.is_current(ticket) {
                tracing::trace!(target: "blockembed::diagram", ticket, "superseded render");
                return;
            }

            match result {
                Ok(output) => {
                    if output.svg.is_empty() {
                        preview.set_text(&source);
                    } else {
                        preview.set_html(&output.svg);
                    }
                    if let Some(bind) = output.bind {
                        bind(preview.as_ref());
                    }
                }
                Err(e) => {
                    tracing::warn!(target: "blockembed::diagram", "render rejected, keeping previous content: {e}");
                }
            }
        }));
    }

    /// Invalidate any render still in flight.
    pub fn cancel(&self) {
        self.generation.bump();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::future::ready;

    use super::*;
    use crate::platform::{DiagramOutput, FrameId, LocalBoxFuture, PlatformError};

    #[derive(Default)]
    struct Preview {
        content: RefCell<Vec<String>>,
    }

    impl PreviewSurface for Preview {
        fn set_html(&self, html: &str) {
            self.content.borrow_mut().push(format!("html:{html}"));
        }
        fn set_text(&self, text: &str) {
            self.content.borrow_mut().push(format!("text:{text}"));
        }
        fn clear(&self) {
            self.content.borrow_mut().push("clear".into());
        }
        fn mount_frame(&self, _frame: FrameId) {}
        fn intercept_links(&self) {}
    }

    struct Immediate(Result<String, String>);

    impl DiagramRenderer for Immediate {
        fn render(
            &self,
            _container_id: &str,
            _source: &str,
        ) -> LocalBoxFuture<Result<DiagramOutput, PlatformError>> {
            let result = self
                .0
                .clone()
                .map(|svg| DiagramOutput {
                    svg,
                    bind: Some(Box::new(|p: &dyn PreviewSurface| p.set_text("bound"))),
                })
                .map_err(PlatformError);
            Box::pin(ready(result))
        }
    }

    /// Collects tasks so tests decide when they run.
    #[derive(Default)]
    struct Queue(RefCell<Vec<LocalBoxFuture<()>>>);

    impl TaskSpawner for Queue {
        fn spawn_local(&self, task: LocalBoxFuture<()>) {
            self.0.borrow_mut().push(task);
        }
    }

    impl Queue {
        async fn run_all(&self) {
            let tasks: Vec<_> = self.0.borrow_mut().drain(..).collect();
            for task in tasks {
                task.await;
            }
        }
    }

    #[tokio::test]
    async fn test_mounts_svg_then_binds() {
        let preview = Rc::new(Preview::default());
        let queue = Queue::default();
        let adapter = DiagramAdapter::new();
        adapter.render(
            &Immediate(Ok("<svg/>".into())),
            &queue,
            preview.clone(),
            Liveness::new(),
            &container_id("b1"),
            "graph TD; A-->B",
        );
        queue.run_all().await;
        assert_eq!(*preview.content.borrow(), vec!["html:<svg/>", "text:bound"]);
    }

    #[tokio::test]
    async fn test_empty_svg_falls_back_to_source() {
        let preview = Rc::new(Preview::default());
        let queue = Queue::default();
        DiagramAdapter::new().render(
            &Immediate(Ok(String::new())),
            &queue,
            preview.clone(),
            Liveness::new(),
            "c",
            "graph TD",
        );
        queue.run_all().await;
        assert_eq!(preview.content.borrow()[0], "text:graph TD");
    }

    #[tokio::test]
    async fn test_rejection_keeps_content() {
        let preview = Rc::new(Preview::default());
        let queue = Queue::default();
        DiagramAdapter::new().render(
            &Immediate(Err("parse error".into())),
            &queue,
            preview.clone(),
            Liveness::new(),
            "c",
            "graph ???",
        );
        queue.run_all().await;
        assert!(preview.content.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_completion_after_teardown_is_dropped() {
        let preview = Rc::new(Preview::default());
        let queue = Queue::default();
        let alive = Liveness::new();
        DiagramAdapter::new().render(
            &Immediate(Ok("<svg/>".into())),
            &queue,
            preview.clone(),
            alive.clone(),
            "c",
            "graph TD",
        );
        alive.kill();
        queue.run_all().await;
        assert!(preview.content.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_only_latest_render_lands() {
        let preview = Rc::new(Preview::default());
        let queue = Queue::default();
        let adapter = DiagramAdapter::new();
        let alive = Liveness::new();
        adapter.render(&Immediate(Ok("<svg>old</svg>".into())), &queue, preview.clone(), alive.clone(), "c", "a");
        adapter.render(&Immediate(Ok("<svg>new</svg>".into())), &queue, preview.clone(), alive, "c", "b");
        queue.run_all().await;
        assert_eq!(preview.content.borrow()[0], "html:<svg>new</svg>");
        assert_eq!(preview.content.borrow().len(), 2);
    }

    #[test]
    fn test_container_id() {
        assert_eq!(container_id("abc"), "block-abc-container");
    }
}
