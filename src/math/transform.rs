use super::Point2;

/// Maps points from one coordinate space to another (e.g. data to panel).
///
/// All points of one request must pass through the same transform.
pub trait CoordTransform: Send + Sync {
    /// Transforms a single point.
    fn transform(&self, p: Point2) -> Point2;
}

/// Leaves points unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl CoordTransform for Identity {
    fn transform(&self, p: Point2) -> Point2 {
        p
    }
}

impl<F> CoordTransform for F
where
    F: Fn(Point2) -> Point2 + Send + Sync,
{
    fn transform(&self, p: Point2) -> Point2 {
        self(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_a_no_op() {
        let p = Point2::new(1.5, -2.0);
        assert_eq!(Identity.transform(p), p);
    }

    #[test]
    fn closures_are_transforms() {
        let flip = |p: Point2| Point2::new(p.x, 10.0 - p.y);
        assert_eq!(flip.transform(Point2::new(1.0, 2.0)), Point2::new(1.0, 8.0));
    }
}
