use std::collections::HashMap;
use std::f64::consts::TAU;

use anyhow::Context;
use field_view::model::SplineOp;
use field_view::render::DrawCommand;
use field_view::{
    Color, FieldOptions, FieldRenderer, Op, Overlay, PathElement, QueuedLoader, RecordingSurface,
    SurfaceSize,
};
use glam::DVec2;
use macroquad::prelude as mq;
use tracing::{error, info, warn};

type Renderer = FieldRenderer<RecordingSurface<mq::Texture2D>>;

// Segments used to flatten a full circle.
const ARC_SEGMENTS: usize = 48;

#[macroquad::main("Field Viewer")]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        error!("{err:#}");
    }
}

async fn run() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let overlay_path = args.next();
    let options = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading options from {path}"))?;
            FieldOptions::from_json(&json).with_context(|| format!("parsing options in {path}"))?
        }
        None => FieldOptions::default(),
    };

    // 1. Initialize the renderer
    let loader = QueuedLoader::new();
    let mut renderer = FieldRenderer::new(RecordingSurface::new(), options, loader.clone());
    let mut textures: HashMap<String, Option<mq::Texture2D>> = HashMap::new();

    let fixed_overlay = match &overlay_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading overlay from {path}"))?;
            let overlay =
                Overlay::from_json(&json).with_context(|| format!("parsing overlay in {path}"))?;
            info!(path = %path, ops = overlay.ops.len(), "loaded overlay");
            Some(overlay)
        }
        None => None,
    };

    loop {
        // 2. Finish any image loads the renderer asked for
        for url in loader.drain() {
            complete_load(&mut renderer, &mut textures, url).await;
        }

        // 3. Update the overlay
        let overlay = match &fixed_overlay {
            Some(overlay) => overlay.clone(),
            None => demo_overlay(mq::get_time()),
        };
        renderer.set_overlay(overlay);

        // 4. Render
        let size = surface_size(mq::screen_width(), mq::screen_height(), mq::screen_dpi_scale());
        if let Err(err) = renderer.render(size) {
            error!(%err, "render pass aborted");
        }

        mq::clear_background(mq::Color::new(0.12, 0.12, 0.12, 1.0));
        for cmd in renderer.surface_mut().take_commands() {
            draw_command(&cmd);
        }

        mq::next_frame().await
    }
}

/// Window size in device pixels plus the display's scale, so grid widths and pixel
/// alignment hold on HiDPI screens.
fn surface_size(width: f32, height: f32, dpi_scale: f32) -> SurfaceSize {
    let ratio = if dpi_scale.is_finite() && dpi_scale > 0.0 {
        dpi_scale as f64
    } else {
        1.0
    };
    SurfaceSize::new(width as f64, height as f64).with_device_pixel_ratio(ratio)
}

async fn complete_load(
    renderer: &mut Renderer,
    textures: &mut HashMap<String, Option<mq::Texture2D>>,
    url: String,
) {
    // Image ops re-request their art every pass, so loads are cached by URL.
    if !textures.contains_key(&url) {
        let texture = match mq::load_texture(&url).await {
            Ok(texture) => Some(texture),
            Err(err) => {
                warn!(url = %url, %err, "unable to load field image");
                None
            }
        };
        textures.insert(url.clone(), texture);
    }

    match textures.get(&url).cloned().flatten() {
        Some(texture) => {
            if let Err(err) = renderer.image_loaded(&url, texture) {
                error!(%err, "deferred render aborted");
            }
        }
        None => renderer.image_failed(&url),
    }
}

/// A robot driving an S-curve, for running without telemetry.
fn demo_overlay(time: f64) -> Overlay {
    let path = SplineOp {
        ax: 0.0,
        bx: 0.0,
        cx: -96.0,
        dx: 144.0,
        ex: 0.0,
        fx: -48.0,
        ay: 0.0,
        by: 0.0,
        cy: 0.0,
        dy: 0.0,
        ey: 96.0,
        fy: -48.0,
    };
    let t = (time * 0.15).fract();
    let (x, y) = (path.x_axis(), path.y_axis());
    let position = DVec2::new(x.eval(t), y.eval(t));
    let ahead = DVec2::new(x.eval(t + 1e-3), y.eval(t + 1e-3));
    let heading = (ahead - position).to_angle();

    let robot = [
        DVec2::new(-9.0, -9.0),
        DVec2::new(9.0, -9.0),
        DVec2::new(9.0, 9.0),
        DVec2::new(-9.0, 9.0),
    ];
    let pulse = 3.0 + (time * TAU).sin();

    Overlay::new(vec![
        Op::Stroke {
            color: "#4caf50".into(),
        },
        Op::StrokeWidth { width: 1.0 },
        Op::Spline(path),
        Op::Fill {
            color: "rgba(255, 152, 0, 0.8)".into(),
        },
        Op::Circle {
            x: path.fx,
            y: path.fy,
            radius: pulse,
            stroke: false,
        },
        Op::Origin {
            x: position.x,
            y: position.y,
        },
        Op::Rotation { rotation: heading },
        Op::Stroke {
            color: "#3f51b5".into(),
        },
        Op::polygon(&robot, true),
        Op::polyline(&[DVec2::ZERO, DVec2::new(9.0, 0.0)]),
        Op::Origin { x: 0.0, y: 0.0 },
        Op::Rotation { rotation: 0.0 },
        Op::Fill {
            color: "white".into(),
        },
        Op::Text {
            text: format!("t = {t:.2}"),
            x: -68.0,
            y: -64.0,
            font: Some("14px sans-serif".into()),
            theta: 0.0,
            stroke: false,
        },
    ])
}

fn to_mq_color(color: Color, alpha: f64) -> mq::Color {
    mq::Color::new(color.r, color.g, color.b, color.a * alpha as f32)
}

fn to_mq_vec(p: DVec2) -> mq::Vec2 {
    mq::Vec2::new(p.x as f32, p.y as f32)
}

/// Splits a path into subpaths of device points, flagging the closed ones.
fn flatten(path: &[PathElement]) -> Vec<(Vec<mq::Vec2>, bool)> {
    let mut subpaths: Vec<(Vec<mq::Vec2>, bool)> = Vec::new();
    let mut current: Vec<mq::Vec2> = Vec::new();

    for element in path {
        match element {
            PathElement::MoveTo(p) => {
                if !current.is_empty() {
                    subpaths.push((std::mem::take(&mut current), false));
                }
                current.push(to_mq_vec(*p));
            }
            PathElement::LineTo(p) => current.push(to_mq_vec(*p)),
            PathElement::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => {
                let sweep = end_angle - start_angle;
                let segments = ((sweep.abs() / TAU) * ARC_SEGMENTS as f64).ceil().max(1.0) as usize;
                for i in 0..=segments {
                    let angle = start_angle + sweep * i as f64 / segments as f64;
                    let p = *center + DVec2::from_angle(angle) * *radius;
                    current.push(to_mq_vec(p));
                }
            }
            PathElement::Close => {
                if !current.is_empty() {
                    subpaths.push((std::mem::take(&mut current), true));
                }
            }
        }
    }
    if !current.is_empty() {
        subpaths.push((current, false));
    }
    subpaths
}

fn draw_command(cmd: &DrawCommand<mq::Texture2D>) {
    match cmd {
        DrawCommand::Clear { .. } => {}
        DrawCommand::Fill { path, color, alpha } => {
            let color = to_mq_color(*color, *alpha);
            if let [PathElement::Arc { center, radius, .. }] = path.as_slice() {
                mq::draw_circle(center.x as f32, center.y as f32, *radius as f32, color);
                return;
            }
            // Triangle fans are exact for the convex shapes overlays draw.
            for (points, _) in flatten(path) {
                let Some((&first, rest)) = points.split_first() else {
                    continue;
                };
                for pair in rest.windows(2) {
                    mq::draw_triangle(first, pair[0], pair[1], color);
                }
            }
        }
        DrawCommand::Stroke {
            path,
            color,
            alpha,
            width,
            ..
        } => {
            let color = to_mq_color(*color, *alpha);
            for (points, closed) in flatten(path) {
                for pair in points.windows(2) {
                    mq::draw_line(pair[0].x, pair[0].y, pair[1].x, pair[1].y, *width as f32, color);
                }
                if let (true, Some(first), Some(last)) = (closed, points.first(), points.last()) {
                    mq::draw_line(last.x, last.y, first.x, first.y, *width as f32, color);
                }
            }
        }
        DrawCommand::Text {
            text,
            position,
            transform,
            font,
            color,
            alpha,
            ..
        } => {
            let axis = transform.matrix2.x_axis;
            mq::draw_text_ex(
                text,
                position.x as f32,
                position.y as f32,
                mq::TextParams {
                    font_size: font_pixel_size(font),
                    rotation: axis.y.atan2(axis.x) as f32,
                    color: to_mq_color(*color, *alpha),
                    ..Default::default()
                },
            );
        }
        DrawCommand::Image {
            image,
            position,
            size,
            alpha,
        } => {
            mq::draw_texture_ex(
                image,
                position.x as f32,
                position.y as f32,
                mq::Color::new(1.0, 1.0, 1.0, *alpha as f32),
                mq::DrawTextureParams {
                    dest_size: Some(to_mq_vec(*size)),
                    ..Default::default()
                },
            );
        }
    }
}

/// Pixel size from a CSS font shorthand such as `"bold 14px sans-serif"`.
fn font_pixel_size(font: &str) -> u16 {
    font.split_whitespace()
        .find_map(|part| part.strip_suffix("px")?.parse::<f64>().ok())
        .map(|px| px.round().clamp(1.0, 512.0) as u16)
        .unwrap_or(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_size_carries_dpi_scale() {
        let size = surface_size(1600.0, 1200.0, 2.0);
        assert_eq!(size.device_pixel_ratio, 2.0);
        assert_eq!(size.logical(), (800.0, 600.0));
    }

    #[test]
    fn test_surface_size_rejects_bogus_scale() {
        assert_eq!(surface_size(800.0, 600.0, 0.0).device_pixel_ratio, 1.0);
        assert_eq!(surface_size(800.0, 600.0, f32::NAN).device_pixel_ratio, 1.0);
    }

    #[test]
    fn test_font_pixel_size() {
        assert_eq!(font_pixel_size("bold 14px sans-serif"), 14);
        assert_eq!(font_pixel_size("sans-serif"), 10);
    }
}
