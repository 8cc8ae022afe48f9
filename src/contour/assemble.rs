use std::collections::HashSet;

use crate::math::Point2;
use crate::path::{close_rings, ClosedRings, RawVertex};
use crate::render::{PolygonRow, StyleAttrs};

use super::Band;

/// Composite group key for one band of a layer group.
///
/// A pure function of its inputs, so recomputing a contour yields the same
/// grouping. Levels print in shortest round-trip form; exponents carry an
/// explicit sign and at least two digits (`1e+20`, `1e-05`).
#[must_use]
pub fn band_group_key(original: &str, level_lo: f64) -> String {
    format!("{original}-{}", level_label(level_lo))
}

fn level_label(level: f64) -> String {
    let text = format!("{level:?}");
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// One vertex of the assembled band table.
#[derive(Debug, Clone, PartialEq)]
pub struct BandRow {
    pub point: Point2,
    pub ring_start: bool,
    /// Fill value: the band's lower level.
    pub level: f64,
    pub group: String,
}

/// All bands of one contour request as a flat table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandTable {
    pub rows: Vec<BandRow>,
}

impl BandTable {
    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if no band produced any ring.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the distinct group keys in first-seen row order.
    #[must_use]
    pub fn groups(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|row| row.group.as_str())
            .filter(|key| seen.insert(*key))
            .collect()
    }

    /// Closes the rings of one group.
    #[must_use]
    pub fn closed_group(&self, group: &str) -> ClosedRings {
        let stream: Vec<RawVertex> = self
            .rows
            .iter()
            .filter(|r| r.group == group)
            .map(|r| RawVertex {
                point: r.point,
                ring_start: r.ring_start,
            })
            .collect();
        close_rings(&stream)
    }

    /// Converts the table to polygon rows, mapping each fill level to a style.
    ///
    /// `style` plays the part of the fill scale: it is called once per row
    /// and should return the same style for the same level.
    pub fn to_polygon_rows(&self, mut style: impl FnMut(f64) -> StyleAttrs) -> Vec<PolygonRow> {
        self.rows
            .iter()
            .map(|r| PolygonRow {
                point: r.point,
                group: r.group.clone(),
                ring_start: Some(r.ring_start),
                style: style(r.level),
            })
            .collect()
    }
}

/// Flattens the bands of one contour request into a [`BandTable`].
#[derive(Debug, Clone)]
pub struct BandAssembler {
    group: String,
}

impl BandAssembler {
    /// Creates an assembler for bands computed from layer group `group`.
    #[must_use]
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
        }
    }

    /// Tags every ring vertex with its band's fill level and group key.
    ///
    /// Bands are emitted in the order given; empty bands add no rows.
    #[must_use]
    pub fn assemble(&self, bands: &[Band]) -> BandTable {
        let mut rows = Vec::with_capacity(bands.iter().map(|b| b.vertices.len()).sum());
        for band in bands {
            let group = band_group_key(&self.group, band.fill_label());
            rows.extend(band.vertices.iter().map(|v| BandRow {
                point: v.point,
                ring_start: v.ring_start,
                level: band.fill_label(),
                group: group.clone(),
            }));
        }
        BandTable { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Color;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn triangle_band(lo: f64, hi: f64, offset: f64) -> Band {
        Band {
            lo,
            hi,
            vertices: vec![
                RawVertex::start(p(offset, 0.0)),
                RawVertex::next(p(offset + 1.0, 0.0)),
                RawVertex::next(p(offset, 1.0)),
            ],
        }
    }

    #[test]
    fn group_key_format() {
        assert_eq!(band_group_key("1", 0.0), "1-0.0");
        assert_eq!(band_group_key("layer", 2.5), "layer-2.5");
        assert_eq!(band_group_key("g", -10.0), "g--10.0");
    }

    #[test]
    fn group_key_exponents_are_signed_and_padded() {
        assert_eq!(band_group_key("1", 1e20), "1-1e+20");
        assert_eq!(band_group_key("1", 1e-5), "1-1e-05");
        assert_eq!(band_group_key("1", -2.5e-7), "1--2.5e-07");
        assert_eq!(band_group_key("1", 1.5e123), "1-1.5e+123");
        assert_eq!(band_group_key("1", 0.0001), "1-0.0001");
    }

    #[test]
    fn groups_are_distinct_when_interleaved() {
        let row = |group: &str| BandRow {
            point: p(0.0, 0.0),
            ring_start: true,
            level: 0.0,
            group: group.to_owned(),
        };
        let table = BandTable {
            rows: vec![row("a"), row("b"), row("a"), row("c"), row("b")],
        };
        assert_eq!(table.groups(), vec!["a", "b", "c"]);
    }

    #[test]
    fn rows_are_tagged_per_band() {
        let bands = vec![
            triangle_band(0.0, 1.0, 0.0),
            Band {
                lo: 1.0,
                hi: 2.0,
                vertices: Vec::new(),
            },
            triangle_band(2.0, 3.0, 5.0),
        ];
        let table = BandAssembler::new("7").assemble(&bands);
        assert_eq!(table.len(), 6);
        assert_eq!(table.groups(), vec!["7-0.0", "7-2.0"]);
        assert!(table.rows[..3].iter().all(|r| (r.level - 0.0).abs() < f64::EPSILON));
        assert!(table.rows[3..].iter().all(|r| (r.level - 2.0).abs() < f64::EPSILON));
        assert!(table.rows[3].ring_start);
    }

    #[test]
    fn assembly_is_deterministic() {
        let bands = vec![triangle_band(0.0, 1.0, 0.0), triangle_band(1.0, 2.0, 3.0)];
        let first = BandAssembler::new("g").assemble(&bands);
        let second = BandAssembler::new("g").assemble(&bands);
        assert_eq!(first, second);
    }

    #[test]
    fn closed_group_closes_rings() {
        let bands = vec![triangle_band(0.0, 1.0, 0.0), triangle_band(1.0, 2.0, 3.0)];
        let table = BandAssembler::new("g").assemble(&bands);
        let closed = table.closed_group("g-1.0");
        assert_eq!(closed.len(), 4);
        assert_eq!(closed.vertices[3], p(3.0, 0.0));
        assert!(table.closed_group("missing").is_empty());
    }

    #[test]
    fn polygon_rows_carry_markers_and_style() {
        let bands = vec![triangle_band(0.0, 1.0, 0.0), triangle_band(1.0, 2.0, 3.0)];
        let table = BandAssembler::new("g").assemble(&bands);
        let rows = table.to_polygon_rows(|level| StyleAttrs {
            fill: Some(if level < 1.0 { Color::BLUE } else { Color::RED }),
            ..StyleAttrs::default()
        });
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].ring_start, Some(true));
        assert_eq!(rows[1].ring_start, Some(false));
        assert_eq!(rows[0].style.fill, Some(Color::BLUE));
        assert_eq!(rows[5].style.fill, Some(Color::RED));
        assert_eq!(rows[5].group, "g-1.0");
    }
}
