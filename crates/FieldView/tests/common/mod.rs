#![allow(dead_code)]

use field_view::{DrawCommand, FieldOptions, FieldRenderer, QueuedLoader, RecordingSurface};

pub type TestRenderer = FieldRenderer<RecordingSurface<String>>;

/// Routes library logs to the test harness so they show up for failing tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn renderer() -> (TestRenderer, QueuedLoader) {
    renderer_on(RecordingSurface::new())
}

pub fn renderer_on(surface: RecordingSurface<String>) -> (TestRenderer, QueuedLoader) {
    init_tracing();
    let loader = QueuedLoader::new();
    let renderer = FieldRenderer::new(surface, FieldOptions::default(), loader.clone());
    (renderer, loader)
}

pub fn fills(commands: &[DrawCommand<String>]) -> Vec<&DrawCommand<String>> {
    commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::Fill { .. }))
        .collect()
}

pub fn strokes(commands: &[DrawCommand<String>]) -> Vec<&DrawCommand<String>> {
    commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::Stroke { .. }))
        .collect()
}

/// Images drawn, as `(image, alpha)`.
pub fn images(commands: &[DrawCommand<String>]) -> Vec<(&str, f64)> {
    commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Image { image, alpha, .. } => Some((image.as_str(), *alpha)),
            _ => None,
        })
        .collect()
}
