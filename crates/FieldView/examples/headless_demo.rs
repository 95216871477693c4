use field_view::model::SplineOp;
use field_view::{
    DrawCommand, FieldOptions, FieldRenderer, Op, Overlay, QueuedLoader, RecordingSurface,
    SurfaceSize,
};
use glam::DVec2;

fn main() {
    println!("=== FieldView Headless Demo ===");

    // 1. Initialize the renderer against a recording surface
    let loader = QueuedLoader::new();
    let mut renderer = FieldRenderer::new(
        RecordingSurface::<&'static str>::new(),
        FieldOptions::default(),
        loader.clone(),
    );

    // 2. Build an overlay the way a robot would stream it
    let robot = [
        DVec2::new(-9.0, -9.0),
        DVec2::new(9.0, -9.0),
        DVec2::new(9.0, 9.0),
        DVec2::new(-9.0, 9.0),
    ];
    let path = SplineOp {
        ex: 48.0,
        fx: -24.0,
        dy: 36.0,
        fy: -24.0,
        ..SplineOp::default()
    };
    let overlay = Overlay::new(vec![
        Op::Stroke {
            color: "#3f51b5".into(),
        },
        Op::StrokeWidth { width: 1.0 },
        Op::Spline(path),
        Op::Origin { x: 24.0, y: 12.0 },
        Op::Rotation { rotation: 0.4 },
        Op::polygon(&robot, true),
        Op::Fill {
            color: "orange".into(),
        },
        Op::Circle {
            x: 0.0,
            y: 0.0,
            radius: 2.0,
            stroke: false,
        },
    ]);
    match overlay.to_json() {
        Ok(json) => println!("Overlay JSON: {json}"),
        Err(err) => println!("Overlay cannot be encoded: {err}"),
    }
    renderer.set_overlay(overlay);

    // 3. Render before the field art has loaded
    let size = SurfaceSize::new(1280.0, 720.0);
    if let Err(err) = renderer.render(size) {
        println!("Render failed: {err}");
        return;
    }
    println!("Load requests: {:?}", loader.drain());

    // 4. Complete the load; the deferred pass replays by itself
    if let Err(err) = renderer.image_loaded("field.png", "field.png") {
        println!("Replay failed: {err}");
        return;
    }

    // 5. Inspect the output
    let commands = renderer.surface().commands();
    println!("Generated {} draw commands.", commands.len());
    for cmd in commands {
        match cmd {
            DrawCommand::Clear { width, height } => println!("Clear: {width}x{height}"),
            DrawCommand::Image { image, position, size, alpha } => {
                println!("Image: {image} at {position:?}, size {size:?}, alpha {alpha}")
            }
            DrawCommand::Fill { path, color, .. } => {
                println!("Fill: {} elements, {color}", path.len())
            }
            DrawCommand::Stroke { path, color, width, .. } => {
                println!("Stroke: {} elements, {color}, {width:.2}px", path.len())
            }
            DrawCommand::Text { text, position, .. } => println!("Text: {text:?} at {position:?}"),
        }
    }

    println!("Demo completed successfully.");
}
