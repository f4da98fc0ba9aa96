mod common;

use blockembed_core::{EmbedConfig, EmbedError, FrameId, Processor, Provider, SandboxPermissions};
use common::{Harness, PreviewOp};

#[test]
fn test_chart_posts_script_after_load() {
    let h = Harness::new();
    let mut block = h.mount(Processor::Chart, "new Chart(ctx, cfg)");
    block.on_preview().unwrap();

    let spec = h.frames.created.borrow()[0].clone();
    assert_eq!(spec.element_id, "receiver");
    assert_eq!(spec.src, "./embed/iframe.html");
    assert_eq!(spec.sandbox_attribute(), "allow-scripts");
    assert!(spec.borderless);
    assert!(h.frames.posted.borrow().is_empty());
    assert_eq!(
        *h.preview.ops.borrow(),
        vec![PreviewOp::Frame(h.frames.last_frame())]
    );

    block.on_frame_loaded(h.frames.last_frame()).unwrap();
    let message = h.frames.last_message().unwrap();
    assert_eq!(message.js.as_deref(), Some("new Chart(ctx, cfg)"));
    assert_eq!(message.html, None);
    assert_eq!(message.libs, vec![EmbedConfig::DEFAULT_CHART_LIBRARY]);
    assert_eq!(message.theme, "");
}

#[test]
fn test_edits_repost_to_the_same_frame() {
    let h = Harness::new();
    let mut block = h.mount(Processor::Html, "<p>a</p>");
    block.on_preview().unwrap();
    block.on_frame_loaded(h.frames.last_frame()).unwrap();
    block.on_edit().unwrap();
    block.on_block_updated("<p>b</p>".to_string()).unwrap();

    assert_eq!(h.frames.created.borrow().len(), 1);
    let posted = h.frames.posted.borrow();
    assert!(posted.iter().all(|(frame, _)| *frame == h.frames.last_frame()));
    assert_eq!(
        posted.last().unwrap().1.html.as_deref(),
        Some("<p>b</p>")
    );
}

#[test]
fn test_load_is_idempotent_and_ignores_foreign_frames() {
    let h = Harness::new();
    let mut block = h.mount(Processor::Html, "<p>a</p>");
    block.on_preview().unwrap();

    block.on_frame_loaded(FrameId(999)).unwrap();
    assert!(h.frames.posted.borrow().is_empty());

    block.on_frame_loaded(h.frames.last_frame()).unwrap();
    block.on_frame_loaded(h.frames.last_frame()).unwrap();
    assert_eq!(h.frames.posted.borrow().len(), 2);
    assert_eq!(h.frames.created.borrow().len(), 1);
}

#[test]
fn test_provider_url_is_rewritten_with_provider_grants() {
    let h = Harness::new();
    let mut block = h.mount(
        Processor::Embed(Provider::Vimeo),
        "https://vimeo.com/76979871",
    );
    block.on_preview().unwrap();
    block.on_frame_loaded(h.frames.last_frame()).unwrap();

    let spec = h.frames.created.borrow()[0].clone();
    assert!(spec.permissions.contains(SandboxPermissions::SAME_ORIGIN));
    assert!(spec.permissions.contains(SandboxPermissions::PRESENTATION));
    assert!(!spec.permissions.contains(SandboxPermissions::POPUPS));

    let html = h.frames.last_message().unwrap().html.unwrap();
    assert!(html.contains(r#"src="https://player.vimeo.com/video/76979871""#));
}

#[test]
fn test_unsupported_provider_text_is_posted_verbatim() {
    let h = Harness::new();
    let snippet = r#"<iframe src="https://w.soundcloud.com/player/?url=x"></iframe>"#;
    let mut block = h.mount(Processor::Embed(Provider::Soundcloud), snippet);
    block.on_preview().unwrap();
    block.on_frame_loaded(h.frames.last_frame()).unwrap();

    assert_eq!(
        h.frames.last_message().unwrap().html.as_deref(),
        Some(snippet)
    );
}

#[test]
fn test_theme_change_reposts_without_new_frame() {
    let h = Harness::new();
    let mut block = h.mount(Processor::Chart, "draw()");
    block.on_preview().unwrap();
    block.on_frame_loaded(h.frames.last_frame()).unwrap();

    block.set_theme("dark").unwrap();
    block.set_theme("dark").unwrap();

    assert_eq!(h.frames.created.borrow().len(), 1);
    assert_eq!(h.frames.posted.borrow().len(), 2);
    assert_eq!(h.frames.last_message().unwrap().theme, "dark");
}

#[test]
fn test_emptying_drops_the_frame() {
    let h = Harness::new();
    let mut block = h.mount(Processor::Html, "<p>a</p>");
    block.on_preview().unwrap();
    block.on_frame_loaded(h.frames.last_frame()).unwrap();

    block.on_block_updated(String::new()).unwrap();
    assert_eq!(h.preview.ops.borrow().last(), Some(&PreviewOp::Clear));

    block.on_block_updated("<p>b</p>".to_string()).unwrap();
    assert_eq!(h.frames.created.borrow().len(), 2);
    // the new frame hasn't loaded, so nothing more was posted
    assert_eq!(h.frames.posted.borrow().len(), 1);
}

#[test]
fn test_frame_creation_failure_surfaces() {
    let h = Harness::new();
    h.frames.fail_create.set(true);
    let mut block = h.mount(Processor::Html, "<p>a</p>");

    let err = block.on_preview().unwrap_err();
    assert!(matches!(err, EmbedError::Platform(_)));
}

#[test]
fn test_packaged_build_resolves_unpacked_receiver() {
    let h = Harness::new();
    *h.frames.location.borrow_mut() =
        Some("file:///opt/App/resources/app.asar/dist/index.html".to_string());
    let mut block = h.mount(Processor::Html, "<p>a</p>");
    block.on_preview().unwrap();

    assert_eq!(
        h.frames.created.borrow()[0].src,
        "file:///opt/App/resources/app.asar.unpacked/dist/embed/iframe.html"
    );
}
