//! Output rings.
//!
//! Each output contour under construction is an [`OutRec`], which owns a
//! circular doubly-linked ring of [`OutPt`]s. While the sweep is running, the
//! ring's head is its left-most end (the end that the left-side edge is
//! extending) and the head's `prev` is the right-most end.
//!
//! When two rings are merged, the absorbed `OutRec` is not deleted: its `idx`
//! is redirected at the surviving record, so that stale references (held by
//! output points, and by joins) can still be followed. [`ClipContext::resolve`]
//! follows those redirections.

use crate::edge::{EdgeIdx, Side, HORIZONTAL};
use crate::geom::{pt2_is_between, slopes_equal, slopes_equal4, Point};
use crate::sweep::ClipContext;
use crate::SourceId;

typed_vec!(pub(crate) OutRecVec, OutRecIdx, "or");
typed_vec!(pub(crate) OutPtVec, OutPtIdx, "op");

#[derive(Clone, Debug)]
pub(crate) struct OutRec {
    /// Points at `self` unless this record has been merged into another one.
    pub idx: OutRecIdx,
    pub is_hole: bool,
    pub is_open: bool,
    /// The record whose ring contains this one, as far as we know.
    pub first_left: Option<OutRecIdx>,
    /// The head of the ring; `None` once the ring is gone.
    pub pts: Option<OutPtIdx>,
    pub bottom_pt: Option<OutPtIdx>,
    /// The input contour that all of this ring's points came from, if there's
    /// only one.
    pub source: Option<SourceId>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct OutPt {
    /// The record this point was created for (possibly since redirected).
    pub idx: OutRecIdx,
    pub pt: Point,
    pub next: OutPtIdx,
    pub prev: OutPtIdx,
}

fn dx(p1: Point, p2: Point) -> f64 {
    if p1.y == p2.y {
        HORIZONTAL
    } else {
        (p2.x - p1.x) / (p2.y - p1.y)
    }
}

impl ClipContext {
    pub(crate) fn create_out_rec(&mut self) -> OutRecIdx {
        let idx = self.outs.next_index();
        self.outs.push(OutRec {
            idx,
            is_hole: false,
            is_open: false,
            first_left: None,
            pts: None,
            bottom_pt: None,
            source: None,
        })
    }

    pub(crate) fn new_out_pt(&mut self, idx: OutRecIdx, pt: Point) -> OutPtIdx {
        let op = self.pts.next_index();
        self.pts.push(OutPt {
            idx,
            pt,
            next: op,
            prev: op,
        })
    }

    /// Follows merge redirections to the live record, compressing the path
    /// along the way.
    pub(crate) fn resolve(&mut self, idx: OutRecIdx) -> OutRecIdx {
        let mut root = idx;
        while self.outs[root].idx != root {
            root = self.outs[root].idx;
        }
        let mut cur = idx;
        while cur != root {
            let next = self.outs[cur].idx;
            self.outs[cur].idx = root;
            cur = next;
        }
        root
    }

    /// Adds a point to the output ring of `e`, creating the ring if necessary.
    pub(crate) fn add_out_pt(&mut self, e: EdgeIdx, pt: Point) -> OutPtIdx {
        let edge = &self.edges[e];
        let (side, source, is_open) = (edge.side, edge.source, edge.wind_delta == 0);

        let Some(rec) = edge.out_idx else {
            let rec = self.create_out_rec();
            self.outs[rec].is_open = is_open;
            self.outs[rec].source = Some(source);
            let op = self.new_out_pt(rec, pt);
            self.outs[rec].pts = Some(op);
            if !is_open {
                self.set_hole_state(e, rec);
            }
            self.edges[e].out_idx = Some(rec);
            return op;
        };

        if self.outs[rec].source != Some(source) {
            self.outs[rec].source = None;
        }
        let Some(head) = self.outs[rec].pts else {
            let op = self.new_out_pt(rec, pt);
            self.outs[rec].pts = Some(op);
            return op;
        };

        let to_front = side == Side::Left;
        let tail = self.pts[head].prev;
        if to_front && pt == self.pts[head].pt {
            return head;
        }
        if !to_front && pt == self.pts[tail].pt {
            return tail;
        }

        let op = self.new_out_pt(rec, pt);
        self.pts[op].next = head;
        self.pts[op].prev = tail;
        self.pts[tail].next = op;
        self.pts[head].prev = op;
        if to_front {
            self.outs[rec].pts = Some(op);
        }
        op
    }

    /// Forgets the source of `e`'s ring, if `e` came from some other contour.
    pub(crate) fn note_source(&mut self, e: EdgeIdx) {
        let edge = &self.edges[e];
        if let Some(rec) = edge.out_idx {
            if self.outs[rec].source != Some(edge.source) {
                self.outs[rec].source = None;
            }
        }
    }

    /// The most recently added point of `e`'s ring.
    pub(crate) fn last_out_pt(&self, e: EdgeIdx) -> Option<OutPtIdx> {
        let edge = &self.edges[e];
        let head = self.outs[edge.out_idx?].pts?;
        Some(match edge.side {
            Side::Left => head,
            Side::Right => self.pts[head].prev,
        })
    }

    /// Decides whether a new ring is a hole, by counting the rings to its left.
    fn set_hole_state(&mut self, e: EdgeIdx, rec: OutRecIdx) {
        let mut e2 = self.edges[e].prev_in_ael;
        let mut tmp: Option<EdgeIdx> = None;
        while let Some(cur) = e2 {
            let edge = &self.edges[cur];
            if edge.out_idx.is_some() && edge.wind_delta != 0 {
                match tmp {
                    None => tmp = Some(cur),
                    Some(t) if self.edges[t].out_idx == edge.out_idx => tmp = None,
                    Some(_) => {}
                }
            }
            e2 = edge.prev_in_ael;
        }

        match tmp.and_then(|t| self.edges[t].out_idx) {
            None => {
                self.outs[rec].first_left = None;
                self.outs[rec].is_hole = false;
            }
            Some(left) => {
                self.outs[rec].first_left = Some(left);
                self.outs[rec].is_hole = !self.outs[left].is_hole;
            }
        }
    }

    /// Starts a new ring at a local minimum formed by `e1` and `e2`.
    pub(crate) fn add_local_min_poly(&mut self, e1: EdgeIdx, e2: EdgeIdx, pt: Point) -> OutPtIdx {
        let (result, e, prev_e) =
            if self.edges[e2].is_horizontal() || self.edges[e1].dx > self.edges[e2].dx {
                let result = self.add_out_pt(e1, pt);
                self.edges[e2].out_idx = self.edges[e1].out_idx;
                self.edges[e1].side = Side::Left;
                self.edges[e2].side = Side::Right;
                let prev_e = if self.edges[e1].prev_in_ael == Some(e2) {
                    self.edges[e2].prev_in_ael
                } else {
                    self.edges[e1].prev_in_ael
                };
                (result, e1, prev_e)
            } else {
                let result = self.add_out_pt(e2, pt);
                self.edges[e1].out_idx = self.edges[e2].out_idx;
                self.edges[e1].side = Side::Right;
                self.edges[e2].side = Side::Left;
                let prev_e = if self.edges[e2].prev_in_ael == Some(e1) {
                    self.edges[e1].prev_in_ael
                } else {
                    self.edges[e2].prev_in_ael
                };
                (result, e2, prev_e)
            };
        self.note_source(e1);
        self.note_source(e2);

        // If the new ring starts on top of an edge that's already producing
        // output, and they're going in the same direction, they'll need to be
        // joined.
        if let Some(prev_e) = prev_e {
            let (p, edge) = (&self.edges[prev_e], &self.edges[e]);
            if p.out_idx.is_some() && p.top.y < pt.y && edge.top.y < pt.y {
                let x_prev = p.top_x(pt.y);
                let x_e = edge.top_x(pt.y);
                if x_prev == x_e
                    && edge.wind_delta != 0
                    && p.wind_delta != 0
                    && slopes_equal4(
                        Point::new(x_prev, pt.y),
                        p.top,
                        Point::new(x_e, pt.y),
                        edge.top,
                    )
                {
                    let off = edge.top;
                    let op = self.add_out_pt(prev_e, pt);
                    self.add_join(result, op, off);
                }
            }
        }
        result
    }

    /// Closes off a local maximum formed by `e1` and `e2`, merging their rings
    /// if they're different.
    pub(crate) fn add_local_max_poly(&mut self, e1: EdgeIdx, e2: EdgeIdx, pt: Point) {
        self.add_out_pt(e1, pt);
        if self.edges[e2].wind_delta == 0 {
            self.add_out_pt(e2, pt);
        }
        self.note_source(e2);
        let (o1, o2) = (self.edges[e1].out_idx, self.edges[e2].out_idx);
        if o1 == o2 {
            self.edges[e1].out_idx = None;
            self.edges[e2].out_idx = None;
        } else if o1 < o2 {
            self.append_polygon(e1, e2);
        } else {
            self.append_polygon(e2, e1);
        }
    }

    /// Merges the ring of `e2` into the ring of `e1`.
    fn append_polygon(&mut self, e1: EdgeIdx, e2: EdgeIdx) {
        let (Some(rec1), Some(rec2)) = (self.edges[e1].out_idx, self.edges[e2].out_idx) else {
            return;
        };
        let (Some(p1_lft), Some(p2_lft)) = (self.outs[rec1].pts, self.outs[rec2].pts) else {
            return;
        };
        log::trace!("appending {rec2:?} to {rec1:?}");

        let hole_state_rec = if self.outrec1_right_of_outrec2(rec1, rec2) {
            rec2
        } else if self.outrec1_right_of_outrec2(rec2, rec1) {
            rec1
        } else {
            self.lowermost_rec(rec1, rec2)
        };

        let p1_rt = self.pts[p1_lft].prev;
        let p2_rt = self.pts[p2_lft].prev;
        let (side1, side2) = (self.edges[e1].side, self.edges[e2].side);
        match (side1, side2) {
            (Side::Left, Side::Left) => {
                // z y x a b c
                self.reverse_ring(p2_lft);
                self.pts[p2_lft].next = p1_lft;
                self.pts[p1_lft].prev = p2_lft;
                self.pts[p1_rt].next = p2_rt;
                self.pts[p2_rt].prev = p1_rt;
                self.outs[rec1].pts = Some(p2_rt);
            }
            (Side::Left, Side::Right) => {
                // x y z a b c
                self.pts[p2_rt].next = p1_lft;
                self.pts[p1_lft].prev = p2_rt;
                self.pts[p2_lft].prev = p1_rt;
                self.pts[p1_rt].next = p2_lft;
                self.outs[rec1].pts = Some(p2_lft);
            }
            (Side::Right, Side::Right) => {
                // a b c z y x
                self.reverse_ring(p2_lft);
                self.pts[p1_rt].next = p2_rt;
                self.pts[p2_rt].prev = p1_rt;
                self.pts[p2_lft].next = p1_lft;
                self.pts[p1_lft].prev = p2_lft;
            }
            (Side::Right, Side::Left) => {
                // a b c x y z
                self.pts[p1_rt].next = p2_lft;
                self.pts[p2_lft].prev = p1_rt;
                self.pts[p1_lft].prev = p2_rt;
                self.pts[p2_rt].next = p1_lft;
            }
        }

        self.outs[rec1].bottom_pt = None;
        if hole_state_rec == rec2 {
            if self.outs[rec2].first_left != Some(rec1) {
                self.outs[rec1].first_left = self.outs[rec2].first_left;
            }
            self.outs[rec1].is_hole = self.outs[rec2].is_hole;
        }
        if self.outs[rec1].source != self.outs[rec2].source {
            self.outs[rec1].source = None;
        }
        self.outs[rec2].pts = None;
        self.outs[rec2].bottom_pt = None;
        self.outs[rec2].first_left = Some(rec1);

        self.edges[e1].out_idx = None;
        self.edges[e2].out_idx = None;

        let mut e = self.active;
        while let Some(cur) = e {
            if self.edges[cur].out_idx == Some(rec2) {
                self.edges[cur].out_idx = Some(rec1);
                self.edges[cur].side = side1;
                break;
            }
            e = self.edges[cur].next_in_ael;
        }

        self.outs[rec2].idx = self.outs[rec1].idx;
    }

    /// Is `rec2` somewhere in the `first_left` chain of `rec1`?
    pub(crate) fn outrec1_right_of_outrec2(&self, rec1: OutRecIdx, rec2: OutRecIdx) -> bool {
        let mut rec = self.outs[rec1].first_left;
        while let Some(r) = rec {
            if r == rec2 {
                return true;
            }
            rec = self.outs[r].first_left;
        }
        false
    }

    /// Of two rings, which one has the lowest (and then left-most) point?
    ///
    /// This is the one whose hole state is right, when we're merging two rings
    /// that aren't nested in one another.
    pub(crate) fn lowermost_rec(&mut self, rec1: OutRecIdx, rec2: OutRecIdx) -> OutRecIdx {
        let (Some(op1), Some(op2)) = (self.bottom_pt(rec1), self.bottom_pt(rec2)) else {
            return rec1;
        };
        let (p1, p2) = (self.pts[op1].pt, self.pts[op2].pt);
        if p1.y > p2.y {
            rec1
        } else if p1.y < p2.y {
            rec2
        } else if p1.x < p2.x {
            rec1
        } else if p1.x > p2.x {
            rec2
        } else if self.pts[op1].next == op1 {
            rec2
        } else if self.pts[op2].next == op2 || self.first_is_bottom_pt(op1, op2) {
            rec1
        } else {
            rec2
        }
    }

    fn bottom_pt(&mut self, rec: OutRecIdx) -> Option<OutPtIdx> {
        if self.outs[rec].bottom_pt.is_none() {
            let head = self.outs[rec].pts?;
            self.outs[rec].bottom_pt = Some(self.find_bottom_pt(head));
        }
        self.outs[rec].bottom_pt
    }

    fn find_bottom_pt(&self, mut pp: OutPtIdx) -> OutPtIdx {
        let mut dups = None;
        let mut p = self.pts[pp].next;
        while p != pp {
            let (pt, best) = (self.pts[p].pt, self.pts[pp].pt);
            if pt.y > best.y {
                pp = p;
                dups = None;
            } else if pt.y == best.y && pt.x <= best.x {
                if pt.x < best.x {
                    dups = None;
                    pp = p;
                } else if self.pts[p].next != pp && self.pts[p].prev != pp {
                    dups = Some(p);
                }
            }
            p = self.pts[p].next;
        }

        // There are at least two vertices at the bottom point, so we need to
        // look at their neighbors to pick one.
        if let Some(mut dup) = dups {
            while dup != p {
                if !self.first_is_bottom_pt(p, dup) {
                    pp = dup;
                }
                dup = self.pts[dup].next;
                while self.pts[dup].pt != self.pts[pp].pt {
                    dup = self.pts[dup].next;
                }
            }
        }
        pp
    }

    // Given two ring vertices at the same point, is the first one's ring the
    // lower one immediately around that point?
    fn first_is_bottom_pt(&self, btm1: OutPtIdx, btm2: OutPtIdx) -> bool {
        let abs_dx = |btm: OutPtIdx, forward: bool| {
            let step = |p: OutPtIdx| {
                if forward {
                    self.pts[p].next
                } else {
                    self.pts[p].prev
                }
            };
            let pt = self.pts[btm].pt;
            let mut p = step(btm);
            while self.pts[p].pt == pt && p != btm {
                p = step(p);
            }
            dx(pt, self.pts[p].pt).abs()
        };
        let (dx1p, dx1n) = (abs_dx(btm1, false), abs_dx(btm1, true));
        let (dx2p, dx2n) = (abs_dx(btm2, false), abs_dx(btm2, true));

        if dx1p.max(dx1n) == dx2p.max(dx2n) && dx1p.min(dx1n) == dx2p.min(dx2n) {
            self.ring_area(btm1) > 0.0
        } else {
            (dx1p >= dx2p && dx1p >= dx2n) || (dx1n >= dx2p && dx1n >= dx2n)
        }
    }

    /// The area of the ring containing `op`, walking forwards.
    ///
    /// With `y` pointing down, outer rings end up with positive area.
    pub(crate) fn ring_area(&self, op: OutPtIdx) -> f64 {
        let mut a = 0.0;
        let mut p = op;
        loop {
            let prev = self.pts[self.pts[p].prev].pt;
            let pt = self.pts[p].pt;
            a += (prev.x + pt.x) * (prev.y - pt.y);
            p = self.pts[p].next;
            if p == op {
                break;
            }
        }
        a * 0.5
    }

    pub(crate) fn reverse_ring(&mut self, op: OutPtIdx) {
        let mut p = op;
        loop {
            let OutPt { next, prev, .. } = self.pts[p];
            self.pts[p].next = prev;
            self.pts[p].prev = next;
            p = next;
            if p == op {
                break;
            }
        }
    }

    pub(crate) fn point_count(&self, op: OutPtIdx) -> usize {
        let mut count = 0;
        let mut p = op;
        loop {
            count += 1;
            p = self.pts[p].next;
            if p == op {
                return count;
            }
        }
    }

    /// Points every vertex of `rec`'s ring back at `rec`.
    pub(crate) fn update_out_pt_idxs(&mut self, rec: OutRecIdx) {
        let Some(head) = self.outs[rec].pts else {
            return;
        };
        let mut p = head;
        loop {
            self.pts[p].idx = rec;
            p = self.pts[p].prev;
            if p == head {
                break;
            }
        }
    }

    /// Removes repeated points and redundant collinear points from a closed
    /// ring, discarding the ring completely if it collapses.
    pub(crate) fn fixup_out_polygon(&mut self, rec: OutRecIdx) {
        let preserve_col = self.options.preserve_collinear || self.options.strictly_simple;
        self.outs[rec].bottom_pt = None;
        let Some(mut pp) = self.outs[rec].pts else {
            return;
        };
        let mut last_ok = None;
        loop {
            let OutPt { pt, prev, next, .. } = self.pts[pp];
            if prev == pp || prev == next {
                self.outs[rec].pts = None;
                return;
            }
            let (prev_pt, next_pt) = (self.pts[prev].pt, self.pts[next].pt);
            if pt == next_pt
                || pt == prev_pt
                || (slopes_equal(prev_pt, pt, next_pt)
                    && (!preserve_col || !pt2_is_between(prev_pt, pt, next_pt)))
            {
                last_ok = None;
                self.pts[prev].next = next;
                self.pts[next].prev = prev;
                pp = prev;
            } else if Some(pp) == last_ok {
                break;
            } else {
                last_ok.get_or_insert(pp);
                pp = next;
            }
        }
        self.outs[rec].pts = Some(pp);
    }

    /// Removes repeated points from an open ring.
    pub(crate) fn fixup_out_polyline(&mut self, rec: OutRecIdx) {
        let Some(head) = self.outs[rec].pts else {
            return;
        };
        let mut pp = head;
        let mut last_pp = self.pts[pp].prev;
        while pp != last_pp {
            pp = self.pts[pp].next;
            let prev = self.pts[pp].prev;
            if self.pts[pp].pt == self.pts[prev].pt {
                if pp == last_pp {
                    last_pp = prev;
                }
                let before = self.pts[prev].prev;
                self.pts[before].next = pp;
                self.pts[pp].prev = before;
            }
        }
        if pp == self.pts[pp].prev {
            self.outs[rec].pts = None;
        } else {
            self.outs[rec].pts = Some(pp);
        }
    }

    /// The points of a ring, starting at `op` and walking backwards.
    pub(crate) fn ring_points(&self, op: OutPtIdx) -> Vec<Point> {
        let mut ret = Vec::new();
        let mut p = self.pts[op].prev;
        loop {
            ret.push(self.pts[p].pt);
            if p == op {
                return ret;
            }
            p = self.pts[p].prev;
        }
    }

    #[cfg(feature = "slow-asserts")]
    pub(crate) fn check_rings(&self) {
        for (_, rec) in self.outs.iter() {
            let Some(head) = rec.pts else {
                continue;
            };
            let mut p = head;
            loop {
                let next = self.pts[p].next;
                assert_eq!(self.pts[next].prev, p, "broken ring at {p:?}");
                p = next;
                if p == head {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClipOptions;

    fn ring(ctx: &mut ClipContext, coords: &[(f64, f64)]) -> OutRecIdx {
        let rec = ctx.create_out_rec();
        let mut head: Option<OutPtIdx> = None;
        for &c in coords {
            let op = ctx.new_out_pt(rec, c.into());
            if let Some(h) = head {
                let tail = ctx.pts[h].prev;
                ctx.pts[op].prev = tail;
                ctx.pts[op].next = h;
                ctx.pts[tail].next = op;
                ctx.pts[h].prev = op;
            } else {
                head = Some(op);
            }
        }
        ctx.outs[rec].pts = head;
        rec
    }

    fn points(ctx: &ClipContext, rec: OutRecIdx) -> Vec<(f64, f64)> {
        let Some(head) = ctx.outs[rec].pts else {
            return Vec::new();
        };
        let mut ret = Vec::new();
        let mut p = head;
        loop {
            ret.push((ctx.pts[p].pt.x, ctx.pts[p].pt.y));
            p = ctx.pts[p].next;
            if p == head {
                return ret;
            }
        }
    }

    #[test]
    fn fixup_polygon_drops_junk() {
        let mut ctx = ClipContext::empty(ClipOptions::default());
        let rec = ring(
            &mut ctx,
            &[
                (0.0, 0.0),
                (5.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (10.0, 10.0),
                (0.0, 10.0),
            ],
        );
        ctx.fixup_out_polygon(rec);
        let mut pts = points(&ctx, rec);
        pts.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(
            pts,
            vec![(0.0, 0.0), (0.0, 10.0), (10.0, 0.0), (10.0, 10.0)]
        );
    }

    #[test]
    fn fixup_polygon_discards_slivers() {
        let mut ctx = ClipContext::empty(ClipOptions::default());
        let rec = ring(&mut ctx, &[(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)]);
        ctx.fixup_out_polygon(rec);
        assert!(ctx.outs[rec].pts.is_none());
    }

    #[test]
    fn fixup_polyline_drops_repeats() {
        let mut ctx = ClipContext::empty(ClipOptions::default());
        let rec = ring(&mut ctx, &[(0.0, 0.0), (0.0, 0.0), (5.0, 0.0), (5.0, 5.0)]);
        ctx.outs[rec].is_open = true;
        ctx.fixup_out_polyline(rec);
        assert_eq!(points(&ctx, rec).len(), 3);

        let rec = ring(&mut ctx, &[(1.0, 1.0), (1.0, 1.0), (2.0, 2.0)]);
        ctx.fixup_out_polyline(rec);
        assert_eq!(points(&ctx, rec).len(), 2);
    }

    #[test]
    fn area_and_reverse() {
        let mut ctx = ClipContext::empty(ClipOptions::default());
        let rec = ring(&mut ctx, &[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]);
        let head = ctx.outs[rec].pts.unwrap();
        let area = ctx.ring_area(head);
        assert_eq!(area.abs(), 100.0);
        ctx.reverse_ring(head);
        assert_eq!(ctx.ring_area(head), -area);
        assert_eq!(ctx.point_count(head), 4);
    }

    #[test]
    fn resolve_compresses() {
        let mut ctx = ClipContext::empty(ClipOptions::default());
        let a = ctx.create_out_rec();
        let b = ctx.create_out_rec();
        let c = ctx.create_out_rec();
        ctx.outs[a].idx = b;
        ctx.outs[b].idx = c;
        assert_eq!(ctx.resolve(a), c);
        assert_eq!(ctx.outs[a].idx, c);
        assert_eq!(ctx.resolve(c), c);
    }

    #[test]
    fn lowermost() {
        let mut ctx = ClipContext::empty(ClipOptions::default());
        let high = ring(&mut ctx, &[(0.0, 0.0), (10.0, 0.0), (10.0, 5.0)]);
        let low = ring(&mut ctx, &[(0.0, 0.0), (10.0, 0.0), (10.0, 7.0)]);
        assert_eq!(ctx.lowermost_rec(high, low), low);
        assert_eq!(ctx.lowermost_rec(low, high), low);
    }
}
