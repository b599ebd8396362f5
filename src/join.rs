//! Reconciling output rings after the sweep.
//!
//! During the sweep, whenever two output rings run along the same line
//! (or touch at a vertex, in strictly-simple mode), we record a [`Join`]
//! instead of trying to fix things up on the spot. Once the sweep is done,
//! each join either fuses two rings into one, or splits a ring in two, and
//! then the `first_left` containment links of the other rings get repaired.

use crate::geom::{
    cyclic_pairs, overlap, point_in_ring_tolerant, slopes_equal, Containment, Point,
};
use crate::outrec::{OutPt, OutPtIdx, OutRecIdx};
use crate::sweep::ClipContext;

/// Two output points that coincide, and should be fused (or split apart).
///
/// `off_pt` is another point on the common line, which tells us the direction
/// of the shared edge.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Join {
    pub op1: OutPtIdx,
    pub op2: OutPtIdx,
    pub off_pt: Point,
}

/// The end of a horizontal output run, which might become a join if another
/// horizontal run overlaps it later in the same scanbeam.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GhostJoin {
    pub op: OutPtIdx,
    pub off_pt: Point,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dir {
    LeftToRight,
    RightToLeft,
}

impl ClipContext {
    pub(crate) fn add_join(&mut self, op1: OutPtIdx, op2: OutPtIdx, off_pt: Point) {
        self.joins.push(Join { op1, op2, off_pt });
    }

    pub(crate) fn add_ghost_join(&mut self, op: OutPtIdx, off_pt: Point) {
        self.ghost_joins.push(GhostJoin { op, off_pt });
    }

    /// Inserts a copy of `op` next to it in its ring.
    fn dup_out_pt(&mut self, op: OutPtIdx, insert_after: bool) -> OutPtIdx {
        let OutPt { idx, pt, next, prev } = self.pts[op];
        let dup = self.new_out_pt(idx, pt);
        if insert_after {
            self.pts[dup].next = next;
            self.pts[dup].prev = op;
            self.pts[next].prev = dup;
            self.pts[op].next = dup;
        } else {
            self.pts[dup].prev = prev;
            self.pts[dup].next = op;
            self.pts[prev].next = dup;
            self.pts[op].prev = dup;
        }
        dup
    }

    /// Is the ring at `inner` inside the ring at `outer`?
    ///
    /// Every vertex of `inner` votes, except for the ones on (or within
    /// rounding error of) the boundary of `outer`. If they all abstain, the
    /// midpoints of `inner`'s edges vote instead; if those abstain too, the
    /// answer is yes.
    fn poly2_contains_poly1(&self, inner: OutPtIdx, outer: OutPtIdx) -> bool {
        let outer = self.ring_points(outer);
        let vertices = self.ring_points(inner);
        let midpoints: Vec<Point> = cyclic_pairs(&vertices)
            .map(|(p, q)| Point::new((p.x + q.x) / 2.0, (p.y + q.y) / 2.0))
            .collect();

        for candidates in [&vertices, &midpoints] {
            let (mut inside, mut outside) = (0usize, 0usize);
            for &pt in candidates {
                match point_in_ring_tolerant(pt, &outer) {
                    Containment::Inside => inside += 1,
                    Containment::Outside => outside += 1,
                    Containment::Boundary => {}
                }
            }
            if inside != outside {
                return inside > outside;
            }
        }
        true
    }

    /// Resolves all the joins recorded during the sweep, in order.
    pub(crate) fn join_common_edges(&mut self) {
        let joins = std::mem::take(&mut self.joins);
        for mut join in joins {
            let rec1 = self.resolve(self.pts[join.op1].idx);
            let rec2 = self.resolve(self.pts[join.op2].idx);

            if self.outs[rec1].pts.is_none() || self.outs[rec2].pts.is_none() {
                continue;
            }
            if self.outs[rec1].is_open || self.outs[rec2].is_open {
                continue;
            }

            // Figure out which fragment has the right hole state before joining.
            let hole_state_rec = if rec1 == rec2 {
                rec1
            } else if self.outrec1_right_of_outrec2(rec1, rec2) {
                rec2
            } else if self.outrec1_right_of_outrec2(rec2, rec1) {
                rec1
            } else {
                self.lowermost_rec(rec1, rec2)
            };

            if !self.join_points(&mut join, rec1, rec2) {
                continue;
            }
            log::trace!("joined {rec1:?} and {rec2:?} at {:?}", self.pts[join.op1].pt);

            if rec1 == rec2 {
                self.split_after_join(rec1, join.op1, join.op2);
            } else {
                // Two rings became one.
                self.outs[rec2].pts = None;
                self.outs[rec2].bottom_pt = None;
                self.outs[rec2].idx = self.outs[rec1].idx;
                if self.outs[rec1].source != self.outs[rec2].source {
                    self.outs[rec1].source = None;
                }

                self.outs[rec1].is_hole = self.outs[hole_state_rec].is_hole;
                if hole_state_rec == rec2 && self.outs[rec2].first_left != Some(rec1) {
                    self.outs[rec1].first_left = self.outs[rec2].first_left;
                }
                self.outs[rec2].first_left = Some(rec1);
                self.fixup_first_lefts3(rec2, rec1);
            }

            #[cfg(feature = "slow-asserts")]
            self.check_rings();
        }
    }

    /// A join (or a self-touching vertex) has cut the ring of `rec` in two.
    /// The piece containing `op1` stays with `rec`; the piece containing
    /// `op2` gets a new record.
    fn split_after_join(&mut self, rec: OutRecIdx, op1: OutPtIdx, op2: OutPtIdx) {
        self.outs[rec].pts = Some(op1);
        self.outs[rec].bottom_pt = None;
        self.outs[rec].source = None;
        let rec2 = self.create_out_rec();
        self.outs[rec2].pts = Some(op2);
        self.update_out_pt_idxs(rec2);
        log::trace!("split {rec2:?} off {rec:?}");

        if self.poly2_contains_poly1(op2, op1) {
            // The new ring is inside the old one.
            self.outs[rec2].is_hole = !self.outs[rec].is_hole;
            self.outs[rec2].first_left = Some(rec);
            self.fixup_first_lefts2(rec2, rec);
            if self.outs[rec2].is_hole == (self.ring_area(op2) > 0.0) {
                self.reverse_ring(op2);
            }
        } else if self.poly2_contains_poly1(op1, op2) {
            // The old ring is inside the new one.
            self.outs[rec2].is_hole = self.outs[rec].is_hole;
            self.outs[rec].is_hole = !self.outs[rec2].is_hole;
            self.outs[rec2].first_left = self.outs[rec].first_left;
            self.outs[rec].first_left = Some(rec2);
            self.fixup_first_lefts2(rec, rec2);
            if self.outs[rec].is_hole == (self.ring_area(op1) > 0.0) {
                self.reverse_ring(op1);
            }
        } else {
            // The two rings are side by side.
            self.outs[rec2].is_hole = self.outs[rec].is_hole;
            self.outs[rec2].first_left = self.outs[rec].first_left;
            self.fixup_first_lefts1(rec, rec2);
        }
    }

    fn join_points(&mut self, join: &mut Join, rec1: OutRecIdx, rec2: OutRecIdx) -> bool {
        let (mut op1, mut op2) = (join.op1, join.op2);
        let off = join.off_pt;
        let pt = |ctx: &Self, op: OutPtIdx| ctx.pts[op].pt;
        let next = |ctx: &Self, op: OutPtIdx| ctx.pts[op].next;
        let prev = |ctx: &Self, op: OutPtIdx| ctx.pts[op].prev;

        // There are three kinds of joins: the kind that comes from two edges
        // touching at a vertex (only in strictly-simple mode), the kind where
        // two horizontal runs overlap, and the general kind where two edges
        // overlap along some slanted line.
        let is_horizontal = pt(self, op1).y == off.y;

        if is_horizontal && off == pt(self, op1) && off == pt(self, op2) {
            if rec1 != rec2 {
                return false;
            }
            let mut op1b = next(self, op1);
            while op1b != op1 && pt(self, op1b) == off {
                op1b = next(self, op1b);
            }
            let reverse1 = pt(self, op1b).y > off.y;
            let mut op2b = next(self, op2);
            while op2b != op2 && pt(self, op2b) == off {
                op2b = next(self, op2b);
            }
            let reverse2 = pt(self, op2b).y > off.y;
            if reverse1 == reverse2 {
                return false;
            }
            join.op2 = self.splice(op1, op2, reverse1);
            true
        } else if is_horizontal {
            // We don't know yet where along the horizontals the overlap is,
            // so find the extent of both horizontal runs.
            let mut op1b = op1;
            while pt(self, prev(self, op1)).y == pt(self, op1).y
                && prev(self, op1) != op1b
                && prev(self, op1) != op2
            {
                op1 = prev(self, op1);
            }
            while pt(self, next(self, op1b)).y == pt(self, op1b).y
                && next(self, op1b) != op1
                && next(self, op1b) != op2
            {
                op1b = next(self, op1b);
            }
            if next(self, op1b) == op1 || next(self, op1b) == op2 {
                // A flat ring.
                return false;
            }

            let mut op2b = op2;
            while pt(self, prev(self, op2)).y == pt(self, op2).y
                && prev(self, op2) != op2b
                && prev(self, op2) != op1b
            {
                op2 = prev(self, op2);
            }
            while pt(self, next(self, op2b)).y == pt(self, op2b).y
                && next(self, op2b) != op2
                && next(self, op2b) != op1
            {
                op2b = next(self, op2b);
            }
            if next(self, op2b) == op2 || next(self, op2b) == op1 {
                return false;
            }

            let (p1, p1b, p2, p2b) = (
                pt(self, op1),
                pt(self, op1b),
                pt(self, op2),
                pt(self, op2b),
            );
            let Some((left, right)) = overlap(p1.x, p1b.x, p2.x, p2b.x) else {
                return false;
            };

            // Joining overlapping horizontals leaves a spike, which gets
            // cleaned up later. Make sure op1 and op2 don't end up on the
            // spike, since other joins might still need them.
            let in_range = |x: f64| x >= left && x <= right;
            let (join_pt, discard_left) = if in_range(p1.x) {
                (p1, p1.x > p1b.x)
            } else if in_range(p2.x) {
                (p2, p2.x > p2b.x)
            } else if in_range(p1b.x) {
                (p1b, p1b.x > p1.x)
            } else {
                (p2b, p2b.x > p2.x)
            };
            join.op1 = op1;
            join.op2 = op2;
            self.join_horz(op1, op1b, op2, op2b, join_pt, discard_left)
        } else {
            // For non-horizontal joins, op1 and op2 are at the same height and
            // the off-point is above them. Work out which way each ring heads
            // along the shared line.
            let along = |ctx: &Self, op: OutPtIdx, forward: bool| {
                let mut b = if forward { next(ctx, op) } else { prev(ctx, op) };
                while pt(ctx, b) == pt(ctx, op) && b != op {
                    b = if forward { next(ctx, b) } else { prev(ctx, b) };
                }
                b
            };
            let heads_off = |ctx: &Self, op: OutPtIdx, b: OutPtIdx| {
                pt(ctx, b).y <= pt(ctx, op).y && slopes_equal(pt(ctx, op), pt(ctx, b), off)
            };

            let mut op1b = along(self, op1, true);
            let reverse1 = !heads_off(self, op1, op1b);
            if reverse1 {
                op1b = along(self, op1, false);
                if !heads_off(self, op1, op1b) {
                    return false;
                }
            }
            let mut op2b = along(self, op2, true);
            let reverse2 = !heads_off(self, op2, op2b);
            if reverse2 {
                op2b = along(self, op2, false);
                if !heads_off(self, op2, op2b) {
                    return false;
                }
            }

            if op1b == op1 || op2b == op2 || op1b == op2b || (rec1 == rec2 && reverse1 == reverse2)
            {
                return false;
            }
            join.op2 = self.splice(op1, op2, reverse1);
            true
        }
    }

    // Cross-links two rings at the coincident points op1 and op2, duplicating
    // both so that each side of the cut keeps a copy. Returns the copy of op1,
    // which ends up in the other ring from op1 when a ring is being split.
    fn splice(&mut self, op1: OutPtIdx, op2: OutPtIdx, reverse1: bool) -> OutPtIdx {
        let op1b = self.dup_out_pt(op1, !reverse1);
        let op2b = self.dup_out_pt(op2, reverse1);
        if reverse1 {
            self.pts[op1].prev = op2;
            self.pts[op2].next = op1;
            self.pts[op1b].next = op2b;
            self.pts[op2b].prev = op1b;
        } else {
            self.pts[op1].next = op2;
            self.pts[op2].prev = op1;
            self.pts[op1b].prev = op2b;
            self.pts[op2b].next = op1b;
        }
        op1b
    }

    // Walks `op` along a horizontal run towards `at` and makes sure there are
    // two consecutive vertices at `at`, returning them.
    fn horz_cut(
        &mut self,
        mut op: OutPtIdx,
        dir: Dir,
        at: Point,
        discard_left: bool,
    ) -> (OutPtIdx, OutPtIdx) {
        let (insert_after, step_past) = match dir {
            Dir::LeftToRight => {
                loop {
                    let n = self.pts[self.pts[op].next].pt;
                    if n.x <= at.x && n.x >= self.pts[op].pt.x && n.y == at.y {
                        op = self.pts[op].next;
                    } else {
                        break;
                    }
                }
                (!discard_left, discard_left)
            }
            Dir::RightToLeft => {
                loop {
                    let n = self.pts[self.pts[op].next].pt;
                    if n.x >= at.x && n.x <= self.pts[op].pt.x && n.y == at.y {
                        op = self.pts[op].next;
                    } else {
                        break;
                    }
                }
                (discard_left, !discard_left)
            }
        };
        if step_past && self.pts[op].pt.x != at.x {
            op = self.pts[op].next;
        }
        let mut opb = self.dup_out_pt(op, insert_after);
        if self.pts[opb].pt != at {
            op = opb;
            self.pts[op].pt = at;
            opb = self.dup_out_pt(op, insert_after);
        }
        (op, opb)
    }

    fn join_horz(
        &mut self,
        op1: OutPtIdx,
        op1b: OutPtIdx,
        op2: OutPtIdx,
        op2b: OutPtIdx,
        at: Point,
        discard_left: bool,
    ) -> bool {
        let dir = |a: Point, b: Point| {
            if a.x > b.x {
                Dir::RightToLeft
            } else {
                Dir::LeftToRight
            }
        };
        let dir1 = dir(self.pts[op1].pt, self.pts[op1b].pt);
        let dir2 = dir(self.pts[op2].pt, self.pts[op2b].pt);
        if dir1 == dir2 {
            return false;
        }

        let (op1, op1b) = self.horz_cut(op1, dir1, at, discard_left);
        let (op2, op2b) = self.horz_cut(op2, dir2, at, discard_left);

        if (dir1 == Dir::LeftToRight) == discard_left {
            self.pts[op1].prev = op2;
            self.pts[op2].next = op1;
            self.pts[op1b].next = op2b;
            self.pts[op2b].prev = op1b;
        } else {
            self.pts[op1].next = op2;
            self.pts[op2].prev = op1;
            self.pts[op1b].prev = op2b;
            self.pts[op2b].next = op1b;
        }
        true
    }

    /// Follows `first_left` past records whose rings are gone.
    pub(crate) fn parse_first_left(&self, mut first_left: Option<OutRecIdx>) -> Option<OutRecIdx> {
        while let Some(fl) = first_left {
            if self.outs[fl].pts.is_some() {
                break;
            }
            first_left = self.outs[fl].first_left;
        }
        first_left
    }

    // `new` was split off from `old`, and they're side by side. Anything that
    // was in `old` might be in `new` now.
    fn fixup_first_lefts1(&mut self, old: OutRecIdx, new: OutRecIdx) {
        let Some(new_pts) = self.outs[new].pts else {
            return;
        };
        for rec in self.outs.indices() {
            let Some(pts) = self.outs[rec].pts else {
                continue;
            };
            if rec == new || self.parse_first_left(self.outs[rec].first_left) != Some(old) {
                continue;
            }
            if self.poly2_contains_poly1(pts, new_pts) {
                self.outs[rec].first_left = Some(new);
            }
        }
    }

    // `inner` and `outer` came from splitting a ring, with one now inside the
    // other. Rings that were next to (or inside) the original might now be
    // inside either.
    fn fixup_first_lefts2(&mut self, inner: OutRecIdx, outer: OutRecIdx) {
        let (Some(inner_pts), Some(outer_pts)) = (self.outs[inner].pts, self.outs[outer].pts) else {
            return;
        };
        let orfl = self.outs[outer].first_left;
        for rec in self.outs.indices() {
            let Some(pts) = self.outs[rec].pts else {
                continue;
            };
            if rec == outer || rec == inner {
                continue;
            }
            let first_left = self.parse_first_left(self.outs[rec].first_left);
            if first_left != orfl && first_left != Some(inner) && first_left != Some(outer) {
                continue;
            }
            if self.poly2_contains_poly1(pts, inner_pts) {
                self.outs[rec].first_left = Some(inner);
            } else if self.poly2_contains_poly1(pts, outer_pts) {
                self.outs[rec].first_left = Some(outer);
            } else if self.outs[rec].first_left == Some(inner)
                || self.outs[rec].first_left == Some(outer)
            {
                self.outs[rec].first_left = orfl;
            }
        }
    }

    // `old` was absorbed into `new`, so anything inside `old` is inside `new`.
    fn fixup_first_lefts3(&mut self, old: OutRecIdx, new: OutRecIdx) {
        for rec in self.outs.indices() {
            if self.outs[rec].pts.is_some() && self.outs[rec].first_left == Some(old) {
                self.outs[rec].first_left = Some(new);
            }
        }
    }

    /// Splits every ring that touches itself at a vertex.
    pub(crate) fn do_simple_polygons(&mut self) {
        let mut i = 0;
        while i < self.outs.len() {
            let rec = OutRecIdx(i);
            i += 1;
            if self.outs[rec].is_open {
                continue;
            }
            let Some(mut op) = self.outs[rec].pts else {
                continue;
            };
            loop {
                let mut op2 = self.pts[op].next;
                while Some(op2) != self.outs[rec].pts {
                    if self.pts[op].pt == self.pts[op2].pt
                        && self.pts[op2].next != op
                        && self.pts[op2].prev != op
                    {
                        let op3 = self.pts[op].prev;
                        let op4 = self.pts[op2].prev;
                        self.pts[op].prev = op4;
                        self.pts[op4].next = op;
                        self.pts[op2].prev = op3;
                        self.pts[op3].next = op2;
                        self.split_after_join(rec, op, op2);
                        op2 = op;
                    }
                    op2 = self.pts[op2].next;
                }
                op = self.pts[op].next;
                if Some(op) == self.outs[rec].pts {
                    break;
                }
            }
        }
    }
}
