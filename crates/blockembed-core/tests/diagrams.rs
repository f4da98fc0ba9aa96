mod common;

use blockembed_core::Processor;
use common::{DiagramMode, Harness, PreviewOp};

#[tokio::test]
async fn test_resolved_svg_is_mounted() {
    let h = Harness::new();
    let mut block = h.mount(Processor::Diagram, "graph TD; A-->B");
    block.on_preview().unwrap();
    h.spawner.run_ready().await;

    assert_eq!(
        h.diagrams.requests.borrow()[0],
        ("block-b1-container".to_string(), "graph TD; A-->B".to_string())
    );
    assert_eq!(h.preview.last_html().as_deref(), Some("<svg>diagram</svg>"));
}

#[tokio::test]
async fn test_render_that_never_resolves_leaves_preview_alone() {
    let h = Harness::new();
    *h.diagrams.mode.borrow_mut() = DiagramMode::Never;
    let mut block = h.mount(Processor::Diagram, "graph TD");
    block.on_preview().unwrap();
    h.spawner.run_ready().await;

    assert!(h.preview.ops.borrow().is_empty());
    assert!(block.is_alive());
    block.teardown();
}

#[tokio::test]
async fn test_rejection_keeps_previous_svg() {
    let h = Harness::new();
    let mut block = h.mount(Processor::Diagram, "graph TD");
    block.on_preview().unwrap();
    h.spawner.run_ready().await;

    *h.diagrams.mode.borrow_mut() = DiagramMode::Reject("syntax error".into());
    block.on_block_updated("graph ???".to_string()).unwrap();
    h.spawner.run_ready().await;

    assert_eq!(h.preview.count(|op| matches!(op, PreviewOp::Html(_))), 1);
    assert_eq!(h.preview.last_html().as_deref(), Some("<svg>diagram</svg>"));
}

#[tokio::test]
async fn test_empty_svg_shows_source_text() {
    let h = Harness::new();
    *h.diagrams.mode.borrow_mut() = DiagramMode::Resolve(String::new());
    let mut block = h.mount(Processor::Diagram, "graph <LR>");
    block.on_preview().unwrap();
    h.spawner.run_ready().await;

    assert_eq!(
        h.preview.ops.borrow().last(),
        Some(&PreviewOp::Text("graph <LR>".to_string()))
    );
}

#[tokio::test]
async fn test_completion_after_teardown_is_dropped() {
    let h = Harness::new();
    let mut block = h.mount(Processor::Diagram, "graph TD");
    block.on_preview().unwrap();
    block.teardown();
    h.spawner.run_ready().await;

    assert!(h.preview.ops.borrow().is_empty());
}

#[tokio::test]
async fn test_emptying_cancels_in_flight_render() {
    let h = Harness::new();
    let mut block = h.mount(Processor::Diagram, "graph TD");
    block.on_preview().unwrap();
    block.on_block_updated(String::new()).unwrap();
    h.spawner.run_ready().await;

    assert_eq!(*h.preview.ops.borrow(), vec![PreviewOp::Clear]);
}
