//! Geometric primitives, like points, and the exact predicates the sweep uses on them.

use crate::num::CheapOrderedFloat;

/// The largest coordinate magnitude that contours may have.
///
/// Within this bound, products of coordinate differences can't overflow.
pub const MAX_COORD: f64 = 1e150;

/// A two-dimensional point.
///
/// Points are sorted by `y` and then by `x`. Throughout this crate larger
/// values of `y` are "down", and the sweep line moves upwards: it starts at
/// the largest `y` and finishes at the smallest.
#[derive(Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    /// Vertical coordinate.
    pub y: f64,
    /// Horizontal coordinate.
    pub x: f64,
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (
            CheapOrderedFloat::from(self.y),
            CheapOrderedFloat::from(self.x),
        )
            .cmp(&(
                CheapOrderedFloat::from(other.y),
                CheapOrderedFloat::from(other.x),
            ))
    }
}

impl PartialOrd for Point {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Point {}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl Point {
    /// Create a new point.
    ///
    /// Note that the `x` coordinate comes first. This might be a tiny bit
    /// confusing because we're sorting by `y` coordinate first, but `(x, y)` is
    /// the only sane order.
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Are both coordinates finite?
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Converts to a `kurbo` point.
    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Do `p1 -> p2` and `p2 -> p3` have the same slope?
///
/// This is an exact comparison of cross products, so it's only reliable when
/// the products are exactly representable (e.g. for integer coordinates of
/// moderate size). That's also the regime where the answer matters most.
pub(crate) fn slopes_equal(p1: Point, p2: Point, p3: Point) -> bool {
    (p1.y - p2.y) * (p2.x - p3.x) == (p1.x - p2.x) * (p2.y - p3.y)
}

/// Do the lines `p1 -> p2` and `p3 -> p4` have the same slope?
pub(crate) fn slopes_equal4(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    (p1.y - p2.y) * (p3.x - p4.x) == (p1.x - p2.x) * (p3.y - p4.y)
}

/// Is `p2` strictly between `p1` and `p3`, assuming the three are collinear?
///
/// When this is false, the middle point is the tip of a spike.
pub(crate) fn pt2_is_between(p1: Point, p2: Point, p3: Point) -> bool {
    if p1 == p3 || p1 == p2 || p3 == p2 {
        false
    } else if p1.x != p3.x {
        (p2.x > p1.x) == (p2.x < p3.x)
    } else {
        (p2.y > p1.y) == (p2.y < p3.y)
    }
}

/// Do the horizontal spans `[a1, a2]` and `[b1, b2]` overlap in more than a point?
///
/// The endpoints of each span can come in either order.
pub(crate) fn horz_segments_overlap(a1: f64, a2: f64, b1: f64, b2: f64) -> bool {
    let (a1, a2) = if a1 > a2 { (a2, a1) } else { (a1, a2) };
    let (b1, b2) = if b1 > b2 { (b2, b1) } else { (b1, b2) };
    a1 < b2 && b1 < a2
}

/// The intersection of the spans `[a1, a2]` and `[b1, b2]`, if it has positive length.
pub(crate) fn overlap(a1: f64, a2: f64, b1: f64, b2: f64) -> Option<(f64, f64)> {
    let (a_lo, a_hi) = if a1 < a2 { (a1, a2) } else { (a2, a1) };
    let (b_lo, b_hi) = if b1 < b2 { (b1, b2) } else { (b2, b1) };
    let left = a_lo.max(b_lo);
    let right = a_hi.min(b_hi);
    (left < right).then_some((left, right))
}

/// Where a point is relative to a closed ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Containment {
    Outside,
    Inside,
    Boundary,
}

/// Classifies `pt` against the closed ring made of the segments `(p, next)`.
///
/// This is the even-odd crossing test of Hormann and Agathos, which is exact
/// about points on the boundary (up to the exactness of the one cross product
/// it computes).
pub(crate) fn point_in_ring(
    pt: Point,
    segments: impl IntoIterator<Item = (Point, Point)>,
) -> Containment {
    let mut inside = false;
    for (p, next) in segments {
        if next.y == pt.y && (next.x == pt.x || (p.y == pt.y && ((next.x > pt.x) == (p.x < pt.x))))
        {
            return Containment::Boundary;
        }
        if (p.y < pt.y) == (next.y < pt.y) {
            continue;
        }
        if p.x >= pt.x && next.x > pt.x {
            inside = !inside;
        } else if p.x >= pt.x || next.x > pt.x {
            let d = (p.x - pt.x) * (next.y - pt.y) - (next.x - pt.x) * (p.y - pt.y);
            if d == 0.0 {
                return Containment::Boundary;
            }
            if (d > 0.0) == (next.y > p.y) {
                inside = !inside;
            }
        }
    }
    if inside {
        Containment::Inside
    } else {
        Containment::Outside
    }
}

/// Relative distance below which a point counts as touching a segment.
const NEAR_BOUNDARY: f64 = 1e-9;

/// Is `pt` within rounding error of the segment from `p` to `q`?
///
/// Each axis is measured relative to the largest coordinate on that axis, so
/// this doesn't depend on the scale of either axis.
pub(crate) fn near_segment(pt: Point, p: Point, q: Point) -> bool {
    let scale = |a: f64, b: f64, c: f64| {
        let m = a.abs().max(b.abs()).max(c.abs());
        if m == 0.0 {
            1.0
        } else {
            m
        }
    };
    let (sx, sy) = (scale(pt.x, p.x, q.x), scale(pt.y, p.y, q.y));
    let (x, y) = (pt.x / sx, pt.y / sy);
    let (px, py) = (p.x / sx, p.y / sy);
    let (dx, dy) = (q.x / sx - px, q.y / sy - py);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((x - px) * dx + (y - py) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (ex, ey) = (px + t * dx - x, py + t * dy - y);
    ex * ex + ey * ey <= NEAR_BOUNDARY * NEAR_BOUNDARY
}

/// Like [`point_in_ring`], but points that are within rounding error of the
/// ring are on the boundary.
///
/// Computed intersection points are usually not exactly on the segments they
/// were computed from, and the exact test would put them on an arbitrary side.
pub(crate) fn point_in_ring_tolerant(pt: Point, ring: &[Point]) -> Containment {
    if cyclic_pairs(ring).any(|(p, q)| near_segment(pt, p, q)) {
        Containment::Boundary
    } else {
        point_in_ring(pt, cyclic_pairs(ring))
    }
}

/// Iterates over the segments of a closed polyline.
pub(crate) fn cyclic_pairs(xs: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    xs.windows(2)
        .map(|pair| (pair[0], pair[1]))
        .chain(xs.last().copied().zip(xs.first().copied()))
}

/// The signed area of a closed polyline.
///
/// With `y` pointing down, this is positive for contours that go clockwise
/// on the screen.
pub fn signed_area(points: &[Point]) -> f64 {
    let Some(last) = points.last() else {
        return 0.0;
    };
    let mut prev = *last;
    let mut twice_area = 0.0;
    for &p in points {
        twice_area += prev.x * p.y - p.x * prev.y;
        prev = p;
    }
    twice_area / 2.0
}

#[cfg(test)]
pub(crate) mod tests {
    use proptest::prelude::*;

    use crate::num::tests::Reasonable;

    use super::*;

    impl Reasonable for Point {
        type Strategy = BoxedStrategy<Point>;

        fn reasonable() -> Self::Strategy {
            (f64::reasonable(), f64::reasonable())
                .prop_map(|(x, y)| Point::new(x, y))
                .boxed()
        }
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn collinear() {
        assert!(slopes_equal(p(0.0, 0.0), p(1.0, 1.0), p(5.0, 5.0)));
        assert!(!slopes_equal(p(0.0, 0.0), p(1.0, 1.0), p(5.0, 6.0)));
        assert!(slopes_equal4(
            p(0.0, 0.0),
            p(2.0, 1.0),
            p(10.0, 10.0),
            p(14.0, 12.0)
        ));
    }

    #[test]
    fn between() {
        assert!(pt2_is_between(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)));
        // A spike doubling back on itself.
        assert!(!pt2_is_between(p(0.0, 0.0), p(2.0, 0.0), p(1.0, 0.0)));
        assert!(pt2_is_between(p(3.0, 0.0), p(3.0, 1.0), p(3.0, 2.0)));
        assert!(!pt2_is_between(p(3.0, 0.0), p(3.0, 0.0), p(3.0, 2.0)));
    }

    #[test]
    fn spans() {
        assert!(horz_segments_overlap(0.0, 2.0, 3.0, 1.0));
        assert!(!horz_segments_overlap(0.0, 2.0, 2.0, 4.0));
        assert_eq!(overlap(0.0, 2.0, 3.0, 1.0), Some((1.0, 2.0)));
        assert_eq!(overlap(0.0, 2.0, 2.0, 4.0), None);
    }

    #[test]
    fn containment() {
        let tri = [p(0.0, 0.0), p(10.0, 0.0), p(0.0, 10.0)];
        let classify = |q| point_in_ring(q, cyclic_pairs(&tri));
        assert_eq!(classify(p(1.0, 1.0)), Containment::Inside);
        assert_eq!(classify(p(6.0, 6.0)), Containment::Outside);
        assert_eq!(classify(p(-1.0, 0.0)), Containment::Outside);
        assert_eq!(classify(p(5.0, 5.0)), Containment::Boundary);
        assert_eq!(classify(p(5.0, 0.0)), Containment::Boundary);
        assert_eq!(classify(p(0.0, 10.0)), Containment::Boundary);
        assert_eq!(classify(p(0.0, 3.0)), Containment::Boundary);
    }

    #[test]
    fn containment_near_a_computed_vertex() {
        // (4, 4) is on the segment from (11/3, 25/6) to (6, 3), but the
        // endpoint isn't representable.
        let ring = [p(11.0 / 3.0, 25.0 / 6.0), p(6.0, 3.0), p(6.0, 8.0)];
        assert!(near_segment(p(4.0, 4.0), ring[0], ring[1]));
        assert!(!near_segment(p(4.0, 4.1), ring[0], ring[1]));
        assert_eq!(point_in_ring_tolerant(p(4.0, 4.0), &ring), Containment::Boundary);
        assert_eq!(point_in_ring_tolerant(p(5.0, 5.0), &ring), Containment::Inside);
        assert_eq!(point_in_ring_tolerant(p(5.0, 3.0), &ring), Containment::Outside);

        // The tolerance scales with each axis.
        let big: Vec<_> = ring.iter().map(|q| p(q.x * 1e12, q.y * 1e12)).collect();
        assert_eq!(
            point_in_ring_tolerant(p(4e12, 4e12), &big),
            Containment::Boundary
        );
        let wide: Vec<_> = ring.iter().map(|q| p(q.x * 1e40, q.y)).collect();
        assert_eq!(
            point_in_ring_tolerant(p(4e40, 4.0), &wide),
            Containment::Boundary
        );
        assert_eq!(
            point_in_ring_tolerant(p(4e40, 3.9), &wide),
            Containment::Outside
        );
    }

    #[test]
    fn area_sign() {
        // Clockwise on screen, with y pointing down.
        let square = [p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)];
        assert_eq!(signed_area(&square), 100.0);
        let mut rev = square;
        rev.reverse();
        assert_eq!(signed_area(&rev), -100.0);
        assert_eq!(signed_area(&[]), 0.0);
    }

    proptest! {
        #[test]
        fn area_is_translation_invariant(
            pts in proptest::collection::vec(Point::reasonable(), 3..8),
            (dx, dy) in <(f64, f64)>::reasonable(),
        ) {
            let a = signed_area(&pts);
            let moved: Vec<_> = pts.iter().map(|q| p(q.x + dx, q.y + dy)).collect();
            let b = signed_area(&moved);
            // Coordinates are up to 2e6 in magnitude, so products are around 4e12
            // and each carries roughly 1e-3 of rounding error.
            prop_assert!((a - b).abs() <= 1.0);
        }
    }
}
