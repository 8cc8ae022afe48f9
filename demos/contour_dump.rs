//! Contours a synthetic field and prints the drawable paths as text.
//!
//! Usage:
//! ```text
//! cargo run --example contour_dump              # 5 levels (default)
//! cargo run --example contour_dump -- 8         # 8 levels
//! RUST_LOG=trifill=debug cargo run --example contour_dump
//! ```

use trifill::contour::ContourFilled;
use trifill::levels::Levels;
use trifill::math::Point2;
use trifill::render::{Color, DrawablePath, PolygonGroupRenderer, Renderer, StyleAttrs};
use trifill::Result;

/// Prints each path instead of drawing it.
struct TextRenderer;

impl Renderer for TextRenderer {
    fn draw_path(&mut self, path: &DrawablePath) -> Result<()> {
        println!(
            "group {:>8}  rings {:>2}  vertices {:>4}  fill {:?}",
            path.group,
            path.path.ring_count(),
            path.path.len(),
            path.fill
        );
        Ok(())
    }
}

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for trifill.
    // Override with RUST_LOG env var (e.g. RUST_LOG=trifill=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("trifill=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let count = std::env::args()
        .nth(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(5);

    let mut points = Vec::new();
    for j in 0..25 {
        for i in 0..25 {
            points.push(Point2::new(f64::from(i) * 0.25, f64::from(j) * 0.25));
        }
    }
    let field: Vec<f64> = points
        .iter()
        .map(|p| (p.x * 1.3).sin() + (p.y * 0.9).cos() + 0.1 * p.x)
        .collect();

    let table = ContourFilled::new(&points, &field)
        .with_levels(Levels::Count(count))
        .execute("1")?;

    let levels: Vec<f64> = table.rows.iter().map(|r| r.level).collect();
    let (lo, hi) = levels
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &l| (a.min(l), b.max(l)));
    let rows = table.to_polygon_rows(|level| {
        let t = if hi > lo { (level - lo) / (hi - lo) } else { 0.0 };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let shade = (t * 255.0).round() as u8;
        StyleAttrs {
            fill: Some(Color::rgb(shade, 64, 255 - shade)),
            color: Some(Color::BLACK),
            ..StyleAttrs::default()
        }
    });

    let drawn = PolygonGroupRenderer::new().draw(&rows, &mut TextRenderer)?;
    println!("{drawn} paths");
    Ok(())
}
