use std::collections::HashMap;

use crate::error::{Result, StyleError};
use crate::math::{CoordTransform, Identity};
use crate::path::{close_rings, RawVertex};

use super::{DrawablePath, Paint, PolygonRow, Renderer, StyleAttrs, SIZE_FACTOR};

/// Turns a polygon table into one closed, styled path per group.
///
/// Rows are partitioned by group key in first-seen order. Every row of a
/// group must carry the same style; the first row does not silently win.
pub struct PolygonGroupRenderer {
    transform: Box<dyn CoordTransform>,
    group_order: Vec<String>,
    z_order: i32,
}

impl std::fmt::Debug for PolygonGroupRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolygonGroupRenderer")
            .field("group_order", &self.group_order)
            .field("z_order", &self.z_order)
            .finish_non_exhaustive()
    }
}

impl Default for PolygonGroupRenderer {
    fn default() -> Self {
        Self {
            transform: Box::new(Identity),
            group_order: Vec::new(),
            z_order: 0,
        }
    }
}

impl PolygonGroupRenderer {
    /// Creates a renderer with the identity transform and z-order 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `transform` to every point before paths are built.
    #[must_use]
    pub fn with_transform(mut self, transform: impl CoordTransform + 'static) -> Self {
        self.transform = Box::new(transform);
        self
    }

    /// Emits the named groups first, in this order; the rest follow in
    /// first-seen order.
    #[must_use]
    pub fn with_group_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the z-order attached to every emitted path.
    #[must_use]
    pub fn with_z_order(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }

    /// Builds one drawable path per group.
    ///
    /// # Errors
    ///
    /// Returns `StyleError::InconsistentGroupStyle` naming the group and the
    /// first attribute that differs between two of its rows.
    pub fn render(&self, rows: &[PolygonRow]) -> Result<Vec<DrawablePath>> {
        let groups = self.partition(rows);
        let mut paths = Vec::with_capacity(groups.len());

        for (key, members) in groups {
            let style = uniform_style(key, rows, &members)?;
            let synthesize = members.iter().all(|&i| rows[i].ring_start.is_none());

            let stream: Vec<RawVertex> = members
                .iter()
                .enumerate()
                .map(|(n, &i)| RawVertex {
                    point: self.transform.transform(rows[i].point),
                    ring_start: if synthesize {
                        n == 0
                    } else {
                        rows[i].ring_start.unwrap_or(false)
                    },
                })
                .collect();

            paths.push(DrawablePath {
                group: key.to_owned(),
                path: close_rings(&stream),
                fill: style
                    .fill
                    .map_or(Paint::None, |c| Paint::Solid(c.with_alpha(style.alpha))),
                edge: style.color.map_or(Paint::None, Paint::Solid),
                line_width: style.size * SIZE_FACTOR,
                line_style: style.linetype,
                z_order: self.z_order,
            });
        }

        tracing::debug!(rows = rows.len(), groups = paths.len(), "rendered polygon groups");
        Ok(paths)
    }

    /// Builds the paths and hands each one to `renderer`, in group order.
    ///
    /// Returns the number of paths drawn.
    ///
    /// # Errors
    ///
    /// Returns an error if a group's style is inconsistent or the renderer
    /// fails; nothing is drawn in the first case.
    pub fn draw(&self, rows: &[PolygonRow], renderer: &mut dyn Renderer) -> Result<usize> {
        let paths = self.render(rows)?;
        for path in &paths {
            renderer.draw_path(path)?;
        }
        Ok(paths.len())
    }

    /// Groups row indices by key, in first-seen order after any explicit order.
    fn partition<'r>(&self, rows: &'r [PolygonRow]) -> Vec<(&'r str, Vec<usize>)> {
        let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            let slot = *slots.entry(row.group.as_str()).or_insert_with(|| {
                groups.push((row.group.as_str(), Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(i);
        }

        if self.group_order.is_empty() {
            return groups;
        }
        let rank = |key: &str| {
            self.group_order
                .iter()
                .position(|k| k == key)
                .unwrap_or(self.group_order.len())
        };
        // Stable sort keeps first-seen order among unranked groups.
        groups.sort_by_key(|(key, _)| rank(key));
        groups
    }
}

/// Returns the group's style, or an error naming the first differing attribute.
fn uniform_style(key: &str, rows: &[PolygonRow], members: &[usize]) -> Result<StyleAttrs> {
    let first = rows[members[0]].style;
    for &i in &members[1..] {
        if let Some(attribute) = first.first_difference(&rows[i].style) {
            return Err(StyleError::InconsistentGroupStyle {
                group: key.to_owned(),
                attribute,
            }
            .into());
        }
    }
    Ok(first)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{RenderError, TrifillError};
    use crate::math::Point2;
    use crate::path::{split_rings, PathCode, PathOp};
    use crate::render::{Color, LineType};

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn square(group: &str, style: StyleAttrs) -> Vec<PolygonRow> {
        [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]
            .into_iter()
            .map(|pt| PolygonRow::new(pt, group, style))
            .collect()
    }

    #[derive(Default)]
    struct Recorder {
        groups: Vec<String>,
        fail_on: Option<String>,
    }

    impl Renderer for Recorder {
        fn draw_path(&mut self, path: &DrawablePath) -> crate::error::Result<()> {
            if self.fail_on.as_deref() == Some(path.group.as_str()) {
                return Err(RenderError::Failed(format!("cannot draw {}", path.group)).into());
            }
            self.groups.push(path.group.clone());
            Ok(())
        }
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let style = StyleAttrs::default();
        let mut rows = square("b", style);
        rows.extend(square("a", style));
        rows.push(PolygonRow::new(p(2.0, 2.0), "b", style));

        let paths = PolygonGroupRenderer::new().render(&rows).unwrap();
        let keys: Vec<&str> = paths.iter().map(|d| d.group.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        // Group "b" gathers its late row too: 5 points + 1 closer.
        assert_eq!(paths[0].path.len(), 6);
    }

    #[test]
    fn explicit_group_order_wins() {
        let style = StyleAttrs::default();
        let mut rows = square("b", style);
        rows.extend(square("a", style));
        rows.extend(square("c", style));

        let paths = PolygonGroupRenderer::new()
            .with_group_order(["c"])
            .render(&rows)
            .unwrap();
        let keys: Vec<&str> = paths.iter().map(|d| d.group.as_str()).collect();
        assert_eq!(keys, vec!["c", "b", "a"]);
    }

    #[test]
    fn missing_codes_make_one_ring() {
        let rows = square("g", StyleAttrs::default());
        let paths = PolygonGroupRenderer::new().render(&rows).unwrap();
        let path = &paths[0].path;
        assert_eq!(path.ring_count(), 1);
        assert_eq!(path.codes[0], PathCode::MoveTo);
        assert_eq!(path.codes[4], PathCode::ClosePoly);
        assert_eq!(path.vertices[4], p(0.0, 0.0));
    }

    #[test]
    fn explicit_codes_keep_holes() {
        let style = StyleAttrs::default();
        let mut rows: Vec<PolygonRow> = [p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0)]
            .into_iter()
            .enumerate()
            .map(|(i, pt)| PolygonRow::new(pt, "g", style).with_ring_start(i == 0))
            .collect();
        rows.extend(
            [p(1.0, 1.0), p(1.0, 2.0), p(2.0, 2.0)]
                .into_iter()
                .enumerate()
                .map(|(i, pt)| PolygonRow::new(pt, "g", style).with_ring_start(i == 0)),
        );

        let paths = PolygonGroupRenderer::new().render(&rows).unwrap();
        let path = &paths[0].path;
        assert_eq!(path.len(), rows.len() + 2);
        let rings = split_rings(path);
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[1], vec![p(1.0, 1.0), p(1.0, 2.0), p(2.0, 2.0)]);
    }

    #[test]
    fn inconsistent_style_is_rejected() {
        let style = StyleAttrs::default();
        let mut rows = square("g", style);
        rows[2].style.alpha = 0.5;
        let err = PolygonGroupRenderer::new().render(&rows).unwrap_err();
        match err {
            TrifillError::Style(StyleError::InconsistentGroupStyle { group, attribute }) => {
                assert_eq!(group, "g");
                assert_eq!(attribute, "alpha");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn every_style_attribute_is_checked() {
        let base = StyleAttrs::default();
        let variants = [
            ("alpha", StyleAttrs { alpha: 0.3, ..base }),
            (
                "color",
                StyleAttrs {
                    color: Some(Color::RED),
                    ..base
                },
            ),
            ("fill", StyleAttrs { fill: None, ..base }),
            (
                "linetype",
                StyleAttrs {
                    linetype: LineType::Dotted,
                    ..base
                },
            ),
            ("size", StyleAttrs { size: 3.0, ..base }),
        ];
        for (name, changed) in variants {
            let mut rows = square("g", base);
            rows.push(PolygonRow::new(p(0.5, 0.5), "g", changed));
            let result = PolygonGroupRenderer::new().render(&rows);
            assert!(
                matches!(
                    result,
                    Err(TrifillError::Style(StyleError::InconsistentGroupStyle { attribute, .. }))
                        if attribute == name
                ),
                "{name} change not detected"
            );
        }
    }

    #[test]
    fn style_is_resolved() {
        let style = StyleAttrs {
            alpha: 0.5,
            color: Some(Color::BLACK),
            fill: Some(Color::BLUE),
            linetype: LineType::Dashed,
            size: 2.0,
        };
        let paths = PolygonGroupRenderer::new()
            .with_z_order(3)
            .render(&square("g", style))
            .unwrap();
        let path = &paths[0];
        assert_eq!(path.fill, Paint::Solid(Color::new(0, 0, 255, 128)));
        assert_eq!(path.edge, Paint::Solid(Color::BLACK));
        assert_eq!(path.line_style, LineType::Dashed);
        assert!((path.line_width - 2.0 * SIZE_FACTOR).abs() < 1e-12);
        assert_eq!(path.z_order, 3);
    }

    #[test]
    fn unset_colors_become_none() {
        let style = StyleAttrs {
            fill: None,
            color: None,
            ..StyleAttrs::default()
        };
        let paths = PolygonGroupRenderer::new()
            .render(&square("g", style))
            .unwrap();
        assert_eq!(paths[0].fill, Paint::None);
        assert_eq!(paths[0].edge, Paint::None);
    }

    #[test]
    fn none_paint_draws_nothing() {
        let style = StyleAttrs {
            alpha: 0.7,
            fill: Color::parse_paint("none").unwrap(),
            color: Color::parse_paint("none").unwrap(),
            ..StyleAttrs::default()
        };
        let paths = PolygonGroupRenderer::new()
            .render(&square("g", style))
            .unwrap();
        assert_eq!(paths[0].fill, Paint::None);
        assert_eq!(paths[0].edge, Paint::None);
    }

    #[test]
    fn transform_is_applied() {
        let rows = square("g", StyleAttrs::default());
        let paths = PolygonGroupRenderer::new()
            .with_transform(|q: Point2| Point2::new(q.x * 10.0, q.y * 10.0))
            .render(&rows)
            .unwrap();
        let ops = paths[0].ops();
        assert_eq!(ops[2], PathOp::LineTo(p(10.0, 10.0)));
        assert_eq!(ops[4], PathOp::ClosePath);
    }

    #[test]
    fn empty_table_gives_no_paths() {
        assert!(PolygonGroupRenderer::new().render(&[]).unwrap().is_empty());
    }

    #[test]
    fn draw_forwards_in_group_order() {
        let style = StyleAttrs::default();
        let mut rows = square("x", style);
        rows.extend(square("y", style));
        let mut recorder = Recorder::default();
        let drawn = PolygonGroupRenderer::new()
            .draw(&rows, &mut recorder)
            .unwrap();
        assert_eq!(drawn, 2);
        assert_eq!(recorder.groups, vec!["x", "y"]);
    }

    #[test]
    fn renderer_failure_propagates() {
        let style = StyleAttrs::default();
        let mut rows = square("x", style);
        rows.extend(square("y", style));
        let mut recorder = Recorder {
            fail_on: Some("y".to_owned()),
            ..Recorder::default()
        };
        let result = PolygonGroupRenderer::new().draw(&rows, &mut recorder);
        assert!(matches!(
            result,
            Err(TrifillError::Render(RenderError::Failed(_)))
        ));
        assert_eq!(recorder.groups, vec!["x"]);
    }
}
