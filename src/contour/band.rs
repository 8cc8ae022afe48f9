use std::collections::{HashMap, VecDeque};

use crate::error::{GeometryError, LevelError, Result};
use crate::math::{Point2, Vector2};
use crate::mesh::Triangulation;
use crate::path::RawVertex;

use super::Band;

/// Identity of a band boundary vertex.
///
/// Crossings are keyed by their mesh edge (lower index first) and level, so
/// the two triangles sharing an edge produce the same key and the same
/// interpolated position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NodeKey {
    Vertex(usize),
    Crossing { a: usize, b: usize, upper: bool },
}

#[derive(Debug, Clone, Copy)]
struct Node {
    key: NodeKey,
    point: Point2,
    z: f64,
}

/// Extracts the region of a field lying between two levels.
///
/// Each triangle is clipped to the band, giving a convex counter-clockwise
/// piece. Piece edges shared by two triangles cancel; the remaining edges are
/// chained into rings, outer boundaries counter-clockwise and holes
/// clockwise.
///
/// A value exactly on a level belongs to the lower band: pieces lying flat
/// on `lo` are dropped unless the band includes its lower level.
#[derive(Debug)]
pub struct BandContour<'a> {
    mesh: &'a Triangulation,
    field: &'a [f64],
    lo: f64,
    hi: f64,
    include_lower: bool,
}

impl<'a> BandContour<'a> {
    /// Creates a new `BandContour` for the band `[lo, hi]`.
    #[must_use]
    pub fn new(mesh: &'a Triangulation, field: &'a [f64], lo: f64, hi: f64) -> Self {
        Self {
            mesh,
            field,
            lo,
            hi,
            include_lower: true,
        }
    }

    /// Sets whether regions lying exactly on `lo` belong to this band.
    ///
    /// Only the bottom band of a level sequence should include them.
    #[must_use]
    pub fn include_lower(mut self, include_lower: bool) -> Self {
        self.include_lower = include_lower;
        self
    }

    /// Executes the extraction.
    ///
    /// A constant field yields an empty band.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::FieldMismatch` if the field length differs
    /// from the mesh point count, `GeometryError::NonFiniteValue` for a
    /// non-finite field value, or `LevelError::InvalidLevels` if `lo < hi`
    /// does not hold.
    pub fn execute(&self) -> Result<Band> {
        check_field(self.mesh, self.field)?;
        if !self.lo.is_finite() || !self.hi.is_finite() || self.lo >= self.hi {
            return Err(LevelError::InvalidLevels(format!(
                "band ({}, {}) is not an ascending pair",
                self.lo, self.hi
            ))
            .into());
        }

        let mut band = Band {
            lo: self.lo,
            hi: self.hi,
            vertices: Vec::new(),
        };
        if is_constant(self.field) {
            return Ok(band);
        }

        let mut edges = EdgeSet::default();
        for tri in self.mesh.triangles() {
            let piece = self.clip_triangle(*tri);
            if piece.len() < 3 || self.is_flat_on_lower(&piece) {
                continue;
            }
            for i in 0..piece.len() {
                edges.add(piece[i], piece[(i + 1) % piece.len()]);
            }
        }

        for ring in edges.into_rings() {
            band.vertices.push(RawVertex::start(ring[0]));
            band.vertices
                .extend(ring[1..].iter().map(|&p| RawVertex::next(p)));
        }

        tracing::trace!(
            lo = self.lo,
            hi = self.hi,
            rings = band.ring_count(),
            vertices = band.vertices.len(),
            "band contoured"
        );

        Ok(band)
    }

    /// Returns the part of triangle `tri` inside `[lo, hi]`, in CCW order.
    fn clip_triangle(&self, tri: [usize; 3]) -> Vec<Node> {
        let mut piece = Vec::with_capacity(5);
        for e in 0..3 {
            let a = tri[e];
            let b = tri[(e + 1) % 3];
            let za = self.field[a];
            let zb = self.field[b];

            if self.lo <= za && za <= self.hi {
                piece.push(Node {
                    key: NodeKey::Vertex(a),
                    point: self.mesh.points()[a],
                    z: za,
                });
            }

            let crossings = if za < zb {
                [(self.lo, false), (self.hi, true)]
            } else {
                [(self.hi, true), (self.lo, false)]
            };
            for (level, upper) in crossings {
                if (za < level && level < zb) || (zb < level && level < za) {
                    piece.push(self.crossing(a, b, level, upper));
                }
            }
        }
        piece
    }

    fn crossing(&self, a: usize, b: usize, level: f64, upper: bool) -> Node {
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        let pa = self.mesh.points()[a];
        let pb = self.mesh.points()[b];
        let t = (level - self.field[a]) / (self.field[b] - self.field[a]);
        Node {
            key: NodeKey::Crossing { a, b, upper },
            point: pa + (pb - pa) * t,
            z: level,
        }
    }

    #[allow(clippy::float_cmp)]
    fn is_flat_on_lower(&self, piece: &[Node]) -> bool {
        !self.include_lower && piece.iter().all(|n| n.z == self.lo)
    }
}

/// Checks that `field` has one finite value per mesh point.
pub(crate) fn check_field(mesh: &Triangulation, field: &[f64]) -> Result<()> {
    if field.len() != mesh.points().len() {
        return Err(GeometryError::FieldMismatch {
            points: mesh.points().len(),
            values: field.len(),
        }
        .into());
    }
    if let Some(index) = field.iter().position(|z| !z.is_finite()) {
        return Err(GeometryError::NonFiniteValue { index }.into());
    }
    Ok(())
}

#[allow(clippy::float_cmp)]
fn is_constant(field: &[f64]) -> bool {
    field.windows(2).all(|w| w[0] == w[1])
}

/// Directed boundary edges with cancellation of opposite pairs.
#[derive(Debug, Default)]
struct EdgeSet {
    edges: Vec<(Node, Node)>,
    alive: Vec<bool>,
    open: HashMap<(NodeKey, NodeKey), usize>,
}

impl EdgeSet {
    fn add(&mut self, from: Node, to: Node) {
        if let Some(twin) = self.open.remove(&(to.key, from.key)) {
            self.alive[twin] = false;
            return;
        }
        self.open.insert((from.key, to.key), self.edges.len());
        self.edges.push((from, to));
        self.alive.push(true);
    }

    /// Chains the surviving edges into closed rings, in emission order.
    fn into_rings(self) -> Vec<Vec<Point2>> {
        let mut outgoing: HashMap<NodeKey, VecDeque<usize>> = HashMap::new();
        for (i, (from, _)) in self.edges.iter().enumerate() {
            if self.alive[i] {
                outgoing.entry(from.key).or_default().push_back(i);
            }
        }

        let mut used = vec![false; self.edges.len()];
        let mut rings = Vec::new();

        for first in 0..self.edges.len() {
            if !self.alive[first] || used[first] {
                continue;
            }
            used[first] = true;
            let (start, mut current) = self.edges[first];
            let mut heading = current.point - start.point;
            let mut ring = vec![start.point];

            while current.key != start.key {
                ring.push(current.point);
                let Some(next) = self.next_edge(&mut outgoing, &used, current.key, heading)
                else {
                    break;
                };
                used[next] = true;
                let (from, to) = self.edges[next];
                heading = to.point - from.point;
                current = to;
            }

            if ring.len() >= 3 {
                rings.push(ring);
            }
        }

        rings
    }

    /// Picks the unused edge leaving `at`, turning furthest left at pinches.
    fn next_edge(
        &self,
        outgoing: &mut HashMap<NodeKey, VecDeque<usize>>,
        used: &[bool],
        at: NodeKey,
        heading: Vector2,
    ) -> Option<usize> {
        let candidates = outgoing.get_mut(&at)?;
        candidates.retain(|&i| !used[i]);
        match candidates.len() {
            0 => None,
            1 => candidates.pop_front(),
            _ => {
                let mut best = 0;
                let mut best_turn = f64::NEG_INFINITY;
                for (slot, &i) in candidates.iter().enumerate() {
                    let (from, to) = self.edges[i];
                    let turn = turn_angle(heading, to.point - from.point);
                    if turn > best_turn {
                        best_turn = turn;
                        best = slot;
                    }
                }
                candidates.remove(best)
            }
        }
    }
}

/// Signed angle from `a` to `b`, positive counter-clockwise.
fn turn_angle(a: Vector2, b: Vector2) -> f64 {
    let cross = a.x * b.y - a.y * b.x;
    cross.atan2(a.dot(&b))
}
