//! Edges and the rings they live in.
//!
//! Each input contour becomes a cyclic ring of edges, one per segment. The
//! ring is then cut into *bounds*: maximal runs of edges that head monotonically
//! upwards (towards smaller `y`) from a local minimum. Each local minimum has a
//! left bound and a right bound, and the sweep activates both of them when it
//! reaches the minimum's height.
//!
//! ```text
//!           top         top
//!            \          /
//!   left bound\        /right bound
//!              \      /
//!               \____/
//!           local minimum (possibly with a horizontal run)
//! ```

use crate::geom::{pt2_is_between, slopes_equal, Point, MAX_COORD};
use crate::outrec::OutRecIdx;
use crate::{InvalidInput, PolyType, SourceId};

/// The slope we give to horizontal edges. It's smaller than any real slope
/// (those are clamped to be finite), which is what the bound-classification
/// comparisons want.
pub(crate) const HORIZONTAL: f64 = f64::NEG_INFINITY;

typed_vec!(pub(crate) EdgeVec, EdgeIdx, "e");

/// Which side of its output ring an edge is building.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub(crate) struct Edge {
    /// The lower endpoint (the one with larger `y`).
    pub bot: Point,
    /// Where the edge meets the sweep line.
    pub curr: Point,
    /// The upper endpoint.
    pub top: Point,
    /// `dx / dy`, or [`HORIZONTAL`].
    pub dx: f64,
    pub poly_type: PolyType,
    pub source: SourceId,
    pub side: Side,
    /// +1 or -1, depending on the direction of the contour along this edge.
    pub wind_delta: i32,
    /// Winding count with respect to edges of the same type.
    pub wind_cnt: i32,
    /// Winding count with respect to edges of the other type.
    pub wind_cnt2: i32,
    pub out_idx: Option<OutRecIdx>,

    // The contour ring.
    pub next: EdgeIdx,
    pub prev: EdgeIdx,
    /// The next edge in this edge's bound.
    pub next_in_lml: Option<EdgeIdx>,

    pub next_in_ael: Option<EdgeIdx>,
    pub prev_in_ael: Option<EdgeIdx>,
    pub next_in_sel: Option<EdgeIdx>,
    pub prev_in_sel: Option<EdgeIdx>,
}

impl Edge {
    fn new(
        start: Point,
        end: Point,
        poly_type: PolyType,
        source: SourceId,
        next: EdgeIdx,
        prev: EdgeIdx,
    ) -> Edge {
        let (bot, top) = if start.y >= end.y {
            (start, end)
        } else {
            (end, start)
        };
        let dy = top.y - bot.y;
        let dx = if dy == 0.0 {
            HORIZONTAL
        } else {
            ((top.x - bot.x) / dy).clamp(f64::MIN, f64::MAX)
        };
        Edge {
            bot,
            curr: start,
            top,
            dx,
            poly_type,
            source,
            side: Side::Left,
            wind_delta: 0,
            wind_cnt: 0,
            wind_cnt2: 0,
            out_idx: None,
            next,
            prev,
            next_in_lml: None,
            next_in_ael: None,
            prev_in_ael: None,
            next_in_sel: None,
            prev_in_sel: None,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.dx == HORIZONTAL
    }

    /// The horizontal position of this edge at height `y`.
    ///
    /// The endpoints are reproduced exactly.
    pub fn top_x(&self, y: f64) -> f64 {
        if y == self.top.y {
            self.top.x
        } else if y == self.bot.y {
            self.bot.x
        } else {
            self.bot.x + self.dx * (y - self.bot.y)
        }
    }

    fn reverse_horizontal(&mut self) {
        std::mem::swap(&mut self.top.x, &mut self.bot.x);
    }
}

/// Are the two edges parallel?
pub(crate) fn edges_parallel(e1: &Edge, e2: &Edge) -> bool {
    (e1.top.y - e1.bot.y) * (e2.top.x - e2.bot.x) == (e1.top.x - e1.bot.x) * (e2.top.y - e2.bot.y)
}

/// A place where the sweep has to activate a pair of bounds.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LocalMinimum {
    pub y: f64,
    pub left: EdgeIdx,
    pub right: EdgeIdx,
}

#[derive(Clone, Copy, Debug)]
struct Vertex {
    pt: Point,
    prev: usize,
    next: usize,
}

fn unlink(ring: &mut [Vertex], v: usize) -> usize {
    let Vertex { prev, next, .. } = ring[v];
    ring[prev].next = next;
    ring[next].prev = prev;
    next
}

/// Cleans up a closed contour, returning the points of the ring that remains.
///
/// Repeated points are dropped, and so are collinear points (or, if
/// `preserve_collinear` is set, only the tips of spikes).
pub(crate) fn clean_ring(
    points: &[Point],
    preserve_collinear: bool,
) -> Result<Vec<Point>, InvalidInput> {
    if points.iter().any(|p| !p.is_finite()) {
        return Err(InvalidInput::NonFinite);
    }
    if points
        .iter()
        .any(|p| p.x.abs() > MAX_COORD || p.y.abs() > MAX_COORD)
    {
        return Err(InvalidInput::OutOfRange);
    }
    let Some(mut hi) = points.len().checked_sub(1) else {
        return Err(InvalidInput::TooFewPoints { distinct: 0 });
    };
    while hi > 0 && points[hi] == points[0] {
        hi -= 1;
    }
    while hi > 0 && points[hi] == points[hi - 1] {
        hi -= 1;
    }
    if hi < 2 {
        return Err(InvalidInput::TooFewPoints { distinct: hi + 1 });
    }

    let n = hi + 1;
    let mut ring: Vec<Vertex> = points[..n]
        .iter()
        .enumerate()
        .map(|(i, &pt)| Vertex {
            pt,
            prev: (i + n - 1) % n,
            next: (i + 1) % n,
        })
        .collect();

    let mut start = 0;
    let mut v = 0;
    let mut loop_stop = 0;
    loop {
        let Vertex { pt, prev, next } = ring[v];
        if pt == ring[next].pt {
            if next == v {
                break;
            }
            if v == start {
                start = next;
            }
            v = unlink(&mut ring, v);
            loop_stop = v;
            continue;
        }
        if prev == next {
            break;
        }
        let (prev_pt, next_pt) = (ring[prev].pt, ring[next].pt);
        if slopes_equal(prev_pt, pt, next_pt)
            && (!preserve_collinear || !pt2_is_between(prev_pt, pt, next_pt))
        {
            if v == start {
                start = next;
            }
            unlink(&mut ring, v);
            v = prev;
            loop_stop = v;
            continue;
        }
        v = next;
        if v == loop_stop {
            break;
        }
    }

    if ring[v].prev == ring[v].next {
        let distinct = if ring[v].next == v { 1 } else { 2 };
        return Err(InvalidInput::TooFewPoints { distinct });
    }

    let mut ret = Vec::new();
    let mut v = start;
    loop {
        ret.push(ring[v].pt);
        v = ring[v].next;
        if v == start {
            break;
        }
    }

    if ret.iter().all(|p| p.y == ret[0].y) {
        return Err(InvalidInput::Flat);
    }
    Ok(ret)
}

/// Adds a cleaned-up ring to the edge arena, and returns the local minima
/// of the new edges.
pub(crate) fn add_ring(
    edges: &mut EdgeVec<Edge>,
    ring: &[Point],
    poly_type: PolyType,
    source: SourceId,
) -> Vec<LocalMinimum> {
    let n = ring.len();
    let base = edges.len();
    for (i, &p) in ring.iter().enumerate() {
        let next = (i + 1) % n;
        let prev = (i + n - 1) % n;
        edges.push(Edge::new(
            p,
            ring[next],
            poly_type,
            source,
            EdgeIdx(base + next),
            EdgeIdx(base + prev),
        ));
    }
    let minima = local_minima(edges, EdgeIdx(base));
    log::trace!("{n} edges from {source:?}, {} local minima", minima.len());
    minima
}

fn local_minima(edges: &mut EdgeVec<Edge>, start: EdgeIdx) -> Vec<LocalMinimum> {
    let mut ret = Vec::new();
    let mut e = start;
    let mut loop_breaker = None;
    loop {
        e = find_next_loc_min(edges, e);
        if Some(e) == loop_breaker {
            break;
        }
        loop_breaker.get_or_insert(e);

        // e and e.prev now share a local minimum (left-aligned if horizontal).
        // Work out which is the left bound and which is the right.
        let prev = edges[e].prev;
        let (left, right, left_is_forward) = if edges[e].dx < edges[prev].dx {
            (prev, e, false)
        } else {
            (e, prev, true)
        };
        edges[left].side = Side::Left;
        edges[right].side = Side::Right;
        let delta = if edges[left].next == right { -1 } else { 1 };
        edges[left].wind_delta = delta;
        edges[right].wind_delta = -delta;

        let after_left = process_bound(edges, left, left_is_forward);
        let after_right = process_bound(edges, right, !left_is_forward);
        ret.push(LocalMinimum {
            y: edges[left].bot.y,
            left,
            right,
        });
        e = if left_is_forward {
            after_left
        } else {
            after_right
        };
    }
    ret
}

fn find_next_loc_min(edges: &EdgeVec<Edge>, mut e: EdgeIdx) -> EdgeIdx {
    loop {
        while edges[e].bot != edges[edges[e].prev].bot || edges[e].curr == edges[e].top {
            e = edges[e].next;
        }
        if !edges[e].is_horizontal() && !edges[edges[e].prev].is_horizontal() {
            return e;
        }
        while edges[edges[e].prev].is_horizontal() {
            e = edges[e].prev;
        }
        let first_horizontal = e;
        while edges[e].is_horizontal() {
            e = edges[e].next;
        }
        if edges[e].top.y == edges[edges[e].prev].bot.y {
            // Just an intermediate horizontal.
            continue;
        }
        if edges[edges[first_horizontal].prev].bot.x < edges[e].bot.x {
            e = first_horizontal;
        }
        return e;
    }
}

/// Links up the bound starting at `e` (through `next_in_lml`), orienting its
/// horizontal edges so that they point along the bound. Returns the first
/// edge past the end of the bound.
fn process_bound(edges: &mut EdgeVec<Edge>, mut e: EdgeIdx, forward: bool) -> EdgeIdx {
    let step = |edges: &EdgeVec<Edge>, e: EdgeIdx| {
        if forward {
            edges[e].next
        } else {
            edges[e].prev
        }
    };
    let back = |edges: &EdgeVec<Edge>, e: EdgeIdx| {
        if forward {
            edges[e].prev
        } else {
            edges[e].next
        }
    };

    if edges[e].is_horizontal() {
        // A horizontal at the bottom of a bound should start where the
        // adjoining edge ends. Consecutive horizontals might head left before
        // going right, though.
        let before = back(edges, e);
        let bot_x = edges[e].bot.x;
        let reverse = if edges[before].is_horizontal() {
            edges[before].bot.x != bot_x && edges[before].top.x != bot_x
        } else {
            edges[before].bot.x != bot_x
        };
        if reverse {
            edges[e].reverse_horizontal();
        }
    }

    let start = e;
    let mut result = e;
    while edges[result].top.y == edges[step(edges, result)].bot.y {
        result = step(edges, result);
    }
    if edges[result].is_horizontal() {
        // At the top of a bound, horizontals are only added to the bound if the
        // preceding edge attaches to the horizontal's left vertex.
        let mut horz = result;
        while edges[back(edges, horz)].is_horizontal() {
            horz = back(edges, horz);
        }
        let before_x = edges[back(edges, horz)].top.x;
        let after_x = edges[step(edges, result)].top.x;
        let cut = if forward {
            before_x > after_x
        } else {
            before_x >= after_x
        };
        if cut {
            result = back(edges, horz);
        }
    }

    loop {
        let is_last = e == result;
        if !is_last {
            edges[e].next_in_lml = Some(step(edges, e));
        }
        let behind = back(edges, e);
        if edges[e].is_horizontal() && e != start && edges[e].bot.x != edges[behind].top.x {
            edges[e].reverse_horizontal();
        }
        if is_last {
            break;
        }
        e = step(edges, e);
    }
    step(edges, result)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&p| p.into()).collect()
    }

    #[test]
    fn clean_drops_repeats_and_collinear() {
        let ring = clean_ring(
            &pts(&[
                (0.0, 0.0),
                (5.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (10.0, 10.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ]),
            false,
        )
        .unwrap();
        assert_eq!(
            ring,
            pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])
        );
    }

    #[test]
    fn preserve_collinear_keeps_midpoints() {
        let ring = clean_ring(
            &pts(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (10.0, 10.0)]),
            true,
        )
        .unwrap();
        assert_eq!(ring.len(), 4);

        // But the tip of a spike goes.
        let ring = clean_ring(
            &pts(&[(0.0, 0.0), (10.0, 0.0), (5.0, 0.0), (5.0, 10.0)]),
            true,
        )
        .unwrap();
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn clean_rejects_degenerate() {
        assert_matches!(
            clean_ring(&pts(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]), false),
            Err(InvalidInput::TooFewPoints { distinct: 2 })
        );
        assert_matches!(
            clean_ring(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]), false),
            Err(InvalidInput::TooFewPoints { .. })
        );
        assert_matches!(
            clean_ring(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]), true),
            Err(InvalidInput::TooFewPoints { .. })
        );
        assert_matches!(
            clean_ring(&pts(&[(0.0, 0.0), (f64::NAN, 1.0), (2.0, 2.0)]), false),
            Err(InvalidInput::NonFinite)
        );
        assert_matches!(
            clean_ring(&pts(&[(0.0, 0.0), (1e200, 1.0), (2.0, 2.0)]), false),
            Err(InvalidInput::OutOfRange)
        );
        assert!(clean_ring(&pts(&[(0.0, 0.0), (MAX_COORD, 1.0), (2.0, -MAX_COORD)]), false).is_ok());
        assert_matches!(
            clean_ring(&[], false),
            Err(InvalidInput::TooFewPoints { distinct: 0 })
        );
    }

    #[test]
    fn triangle_has_one_minimum() {
        let mut edges = EdgeVec::default();
        let ring = pts(&[(0.0, 0.0), (10.0, 10.0), (-10.0, 10.0)]);
        let minima = add_ring(&mut edges, &ring, PolyType::Subject, SourceId(0));
        assert_eq!(minima.len(), 1);
        let min = minima[0];
        assert_eq!(min.y, 10.0);

        // The left bound goes up to (0, 0) from (-10, 10), and then stops.
        let left = &edges[min.left];
        assert_eq!(left.side, Side::Left);
        assert_eq!(left.top, Point::new(0.0, 0.0));
        assert!(left.next_in_lml.is_none());
        assert_eq!(left.wind_delta, -edges[min.right].wind_delta);

        // The bottom of the triangle is horizontal. It starts the right bound,
        // pointing left-to-right, and the bound then continues up to (0, 0).
        let right = &edges[min.right];
        assert!(right.is_horizontal());
        assert_eq!(right.bot, Point::new(-10.0, 10.0));
        assert_eq!(right.top, Point::new(10.0, 10.0));
        let up = right.next_in_lml.unwrap();
        assert_eq!(edges[up].top, Point::new(0.0, 0.0));
        assert!(edges[up].next_in_lml.is_none());
    }

    #[test]
    fn zigzag_minima() {
        // A "W" shape has two local minima.
        let mut edges = EdgeVec::default();
        let ring = pts(&[
            (0.0, 0.0),
            (2.0, 10.0),
            (4.0, 2.0),
            (6.0, 10.0),
            (8.0, 0.0),
        ]);
        let minima = add_ring(&mut edges, &ring, PolyType::Clip, SourceId(3));
        assert_eq!(minima.len(), 2);
        let mut xs: Vec<f64> = minima.iter().map(|m| edges[m.left].bot.x).collect();
        xs.sort_by(f64::total_cmp);
        assert_eq!(xs, vec![2.0, 6.0]);
        assert!(edges.iter().all(|(_, e)| e.poly_type == PolyType::Clip));
    }

    #[test]
    fn top_x_is_exact_at_endpoints() {
        let mut edges = EdgeVec::default();
        let ring = pts(&[(0.1, 0.3), (10.7, 10.9), (-10.0, 7.0)]);
        add_ring(&mut edges, &ring, PolyType::Subject, SourceId(0));
        for (_, e) in edges.iter() {
            assert_eq!(e.top_x(e.top.y), e.top.x);
            if !e.is_horizontal() {
                assert_eq!(e.top_x(e.bot.y), e.bot.x);
            }
        }
    }
}
