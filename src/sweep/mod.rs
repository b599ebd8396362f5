//! The sweep itself.
//!
//! The sweep line moves from the bottom of the input (largest `y`) to the top,
//! stopping at every *scanbeam*: every height where some edge starts or ends.
//! Between two consecutive stops, the set of edges crossing the sweep line
//! (the active edge list, or AEL) only changes by edges crossing one another,
//! and those crossings are found and processed in bulk, one scanbeam at a
//! time.
//!
//! Horizontal edges don't fit into this scheme, because they start and end at
//! the same height. They get queued on the sorted edge list (SEL) instead and
//! processed separately, at the bottom of each scanbeam.

use std::collections::BinaryHeap;

use crate::edge::{Edge, EdgeIdx, EdgeVec, LocalMinimum};
use crate::geom::{horz_segments_overlap, slopes_equal4, Point};
use crate::join::{GhostJoin, Join};
use crate::num::CheapOrderedFloat;
use crate::outrec::{OutPt, OutPtIdx, OutPtVec, OutRec, OutRecVec};
use crate::{AlgorithmFailure, ClipOptions};

mod active;
mod horizontal;
mod intersect;
mod winding;

pub(crate) use active::List;
use intersect::IntersectNode;

/// All the state of one run of the clipping algorithm.
pub(crate) struct ClipContext {
    pub(crate) edges: EdgeVec<Edge>,
    /// Sorted from the bottom up.
    pub(crate) minima: Vec<LocalMinimum>,
    pub(crate) next_minimum: usize,
    pub(crate) scanbeam: BinaryHeap<CheapOrderedFloat>,
    /// The `x` coordinates of local maxima at the top of the current scanbeam.
    pub(crate) maxima: Vec<f64>,
    /// The head of the active edge list.
    pub(crate) active: Option<EdgeIdx>,
    /// The head of the sorted edge list.
    pub(crate) sorted: Option<EdgeIdx>,
    pub(crate) intersections: Vec<IntersectNode>,
    pub(crate) joins: Vec<Join>,
    pub(crate) ghost_joins: Vec<GhostJoin>,
    pub(crate) outs: OutRecVec<OutRec>,
    pub(crate) pts: OutPtVec<OutPt>,
    pub(crate) options: ClipOptions,
}

impl ClipContext {
    pub(crate) fn new(
        mut edges: EdgeVec<Edge>,
        mut minima: Vec<LocalMinimum>,
        options: ClipOptions,
    ) -> Self {
        // This is a stable sort, so minima at the same height stay in the
        // order they were added.
        minima.sort_by(|a, b| CheapOrderedFloat::from(b.y).cmp(&CheapOrderedFloat::from(a.y)));
        let scanbeam = minima.iter().map(|m| m.y.into()).collect();
        for m in &minima {
            for e in [m.left, m.right] {
                edges[e].curr = edges[e].bot;
                edges[e].out_idx = None;
            }
        }

        ClipContext {
            edges,
            minima,
            next_minimum: 0,
            scanbeam,
            maxima: Vec::new(),
            active: None,
            sorted: None,
            intersections: Vec::new(),
            joins: Vec::new(),
            ghost_joins: Vec::new(),
            outs: OutRecVec::default(),
            pts: OutPtVec::default(),
            options,
        }
    }

    #[cfg(test)]
    pub(crate) fn empty(options: ClipOptions) -> Self {
        Self::new(EdgeVec::default(), Vec::new(), options)
    }

    /// Runs the sweep, and then tidies up the output rings.
    pub(crate) fn execute(&mut self) -> Result<(), AlgorithmFailure> {
        log::debug!(
            "sweeping {} edges from {} local minima",
            self.edges.len(),
            self.minima.len()
        );
        let Some(mut bot_y) = self.pop_scanbeam() else {
            return Ok(());
        };
        self.insert_local_minima_into_ael(bot_y);
        while let Some(top_y) = self.pop_scanbeam() {
            log::trace!("scanbeam from {bot_y} to {top_y}");
            self.process_horizontals()?;
            self.ghost_joins.clear();
            self.process_intersections(top_y)?;
            self.process_edges_at_top_of_scanbeam(top_y)?;
            bot_y = top_y;
            self.insert_local_minima_into_ael(bot_y);
        }
        debug_assert!(self.next_minimum == self.minima.len());
        debug_assert!(self.active.is_none());

        // Join resolution needs rings to be oriented consistently.
        for rec in self.outs.indices() {
            let rec = &self.outs[rec];
            if let (Some(pts), false) = (rec.pts, rec.is_open) {
                if rec.is_hole == (self.ring_area(pts) > 0.0) {
                    self.reverse_ring(pts);
                }
            }
        }

        log::debug!("resolving {} joins", self.joins.len());
        self.join_common_edges();

        for rec in self.outs.indices() {
            if self.outs[rec].pts.is_none() {
                continue;
            }
            if self.outs[rec].is_open {
                self.fixup_out_polyline(rec);
            } else {
                self.fixup_out_polygon(rec);
            }
        }

        if self.options.strictly_simple {
            self.do_simple_polygons();
        }

        #[cfg(feature = "slow-asserts")]
        self.check_rings();

        Ok(())
    }

    pub(crate) fn insert_scanbeam(&mut self, y: f64) {
        self.scanbeam.push(y.into());
    }

    /// Pops the next (i.e. largest) scanbeam height, skipping duplicates.
    fn pop_scanbeam(&mut self) -> Option<f64> {
        let y = self.scanbeam.pop()?;
        while self.scanbeam.peek() == Some(&y) {
            self.scanbeam.pop();
        }
        Some(y.into_inner())
    }

    fn pop_local_minimum(&mut self, y: f64) -> Option<LocalMinimum> {
        let m = *self.minima.get(self.next_minimum)?;
        if m.y != y {
            return None;
        }
        self.next_minimum += 1;
        Some(m)
    }

    fn insert_local_minima_into_ael(&mut self, bot_y: f64) {
        while let Some(LocalMinimum { left, right, .. }) = self.pop_local_minimum(bot_y) {
            self.insert_edge_into_ael(left, None);
            self.insert_edge_into_ael(right, Some(left));
            self.set_winding_count(left);
            self.edges[right].wind_cnt = self.edges[left].wind_cnt;
            self.edges[right].wind_cnt2 = self.edges[left].wind_cnt2;

            let op1 = if self.is_contributing(left) {
                let bot = self.edges[left].bot;
                Some(self.add_local_min_poly(left, right, bot))
            } else {
                None
            };
            self.insert_scanbeam(self.edges[left].top.y);

            if self.edges[right].is_horizontal() {
                if let Some(next) = self.edges[right].next_in_lml {
                    self.insert_scanbeam(self.edges[next].top.y);
                }
                self.add_edge_to_sel(right);
            } else {
                self.insert_scanbeam(self.edges[right].top.y);
            }

            if let Some(op1) = op1 {
                self.minimum_joins(left, right, op1);
            }

            if self.edges[left].next_in_ael != Some(right) {
                let mut e = self.edges[left].next_in_ael;
                while let Some(cur) = e {
                    if cur == right {
                        break;
                    }
                    // The right bound is to the right of everything in between
                    // above the minimum, which is the order intersect_edges wants.
                    let curr = self.edges[left].curr;
                    self.intersect_edges(right, cur, curr);
                    e = self.edges[cur].next_in_ael;
                }
            }
        }
    }

    // Records joins for a new ring that starts on top of some other ring.
    fn minimum_joins(&mut self, left: EdgeIdx, right: EdgeIdx, op1: OutPtIdx) {
        let r = &self.edges[right];

        // If the new minimum is at the bottom of a horizontal, it might overlap
        // some horizontal that finished earlier in this scanbeam.
        if r.is_horizontal() && r.wind_delta != 0 {
            let (bot_x, top_x) = (r.bot.x, r.top.x);
            let ghosts: Vec<GhostJoin> = self
                .ghost_joins
                .iter()
                .filter(|g| horz_segments_overlap(self.pts[g.op].pt.x, g.off_pt.x, bot_x, top_x))
                .copied()
                .collect();
            for g in ghosts {
                self.add_join(g.op, op1, g.off_pt);
            }
        }

        let l = &self.edges[left];
        if let Some(prev) = l.prev_in_ael {
            let p = &self.edges[prev];
            if l.out_idx.is_some()
                && p.curr.x == l.bot.x
                && p.out_idx.is_some()
                && slopes_equal4(p.bot, p.top, l.curr, l.top)
                && l.wind_delta != 0
                && p.wind_delta != 0
            {
                let (bot, top) = (l.bot, l.top);
                let op2 = self.add_out_pt(prev, bot);
                self.add_join(op1, op2, top);
            }
        }

        if self.edges[left].next_in_ael != Some(right) {
            let r = &self.edges[right];
            if let Some(prev) = r.prev_in_ael {
                let p = &self.edges[prev];
                if r.out_idx.is_some()
                    && p.out_idx.is_some()
                    && slopes_equal4(p.curr, p.top, r.curr, r.top)
                    && r.wind_delta != 0
                    && p.wind_delta != 0
                {
                    let (bot, top) = (r.bot, r.top);
                    let op2 = self.add_out_pt(prev, bot);
                    self.add_join(op1, op2, top);
                }
            }
        }
    }

    /// Replaces `e` in the AEL by the next edge in its bound.
    pub(crate) fn update_edge_into_ael(&mut self, e: EdgeIdx) -> Result<EdgeIdx, AlgorithmFailure> {
        let Some(next) = self.edges[e].next_in_lml else {
            return Err(AlgorithmFailure::BoundOverrun);
        };
        let old = self.edges[e].clone();
        match old.prev_in_ael {
            Some(p) => self.edges[p].next_in_ael = Some(next),
            None => self.active = Some(next),
        }
        if let Some(n) = old.next_in_ael {
            self.edges[n].prev_in_ael = Some(next);
        }

        let edge = &mut self.edges[next];
        edge.out_idx = old.out_idx;
        edge.side = old.side;
        edge.wind_delta = old.wind_delta;
        edge.wind_cnt = old.wind_cnt;
        edge.wind_cnt2 = old.wind_cnt2;
        edge.curr = edge.bot;
        edge.prev_in_ael = old.prev_in_ael;
        edge.next_in_ael = old.next_in_ael;
        let (horizontal, top_y) = (edge.is_horizontal(), edge.top.y);

        self.edges[e].prev_in_ael = None;
        self.edges[e].next_in_ael = None;
        if !horizontal {
            self.insert_scanbeam(top_y);
        }
        Ok(next)
    }

    fn is_maxima(&self, e: EdgeIdx, y: f64) -> bool {
        self.edges[e].top.y == y && self.edges[e].next_in_lml.is_none()
    }

    fn is_intermediate(&self, e: EdgeIdx, y: f64) -> bool {
        self.edges[e].top.y == y && self.edges[e].next_in_lml.is_some()
    }

    fn process_edges_at_top_of_scanbeam(&mut self, top_y: f64) -> Result<(), AlgorithmFailure> {
        let mut e = self.active;
        while let Some(mut cur) = e {
            // Maxima get treated as if they were bent horizontal edges, unless
            // they actually have a horizontal edge at the top.
            let mut is_maxima_edge = self.is_maxima(cur, top_y);
            if is_maxima_edge {
                let pair = self.maxima_pair_ex(cur);
                is_maxima_edge = pair.map_or(true, |p| !self.edges[p].is_horizontal());
            }

            if is_maxima_edge {
                if self.options.strictly_simple {
                    self.maxima.push(self.edges[cur].top.x);
                }
                let prev = self.edges[cur].prev_in_ael;
                self.do_maxima(cur)?;
                e = match prev {
                    None => self.active,
                    Some(p) => self.edges[p].next_in_ael,
                };
                continue;
            }

            // Horizontals get promoted here; everything else just moves up.
            if self.is_intermediate(cur, top_y)
                && self.edges[cur]
                    .next_in_lml
                    .is_some_and(|n| self.edges[n].is_horizontal())
            {
                cur = self.update_edge_into_ael(cur)?;
                if self.edges[cur].out_idx.is_some() {
                    let bot = self.edges[cur].bot;
                    self.add_out_pt(cur, bot);
                }
                self.add_edge_to_sel(cur);
            } else {
                let x = self.edges[cur].top_x(top_y);
                self.edges[cur].curr = Point::new(x, top_y);
            }

            // In strictly-simple mode, two contributing edges touching at a
            // vertex both need a vertex there.
            if self.options.strictly_simple {
                let edge = &self.edges[cur];
                if let Some(prev) = edge.prev_in_ael {
                    let p = &self.edges[prev];
                    if edge.out_idx.is_some()
                        && edge.wind_delta != 0
                        && p.out_idx.is_some()
                        && p.curr.x == edge.curr.x
                        && p.wind_delta != 0
                    {
                        let pt = edge.curr;
                        let op = self.add_out_pt(prev, pt);
                        let op2 = self.add_out_pt(cur, pt);
                        self.add_join(op, op2, pt);
                    }
                }
            }

            e = self.edges[cur].next_in_ael;
        }

        self.maxima.sort_by(f64::total_cmp);
        self.process_horizontals()?;
        self.maxima.clear();

        // Move edges past intermediate vertices.
        let mut e = self.active;
        while let Some(mut cur) = e {
            if self.is_intermediate(cur, top_y) {
                let op = if self.edges[cur].out_idx.is_some() {
                    let top = self.edges[cur].top;
                    Some(self.add_out_pt(cur, top))
                } else {
                    None
                };
                cur = self.update_edge_into_ael(cur)?;

                // If output rings share an edge, they'll need joining later.
                if let Some(op) = op {
                    let edge = &self.edges[cur];
                    let shares_edge = |other: Option<EdgeIdx>| {
                        other.filter(|&o| {
                            let o = &self.edges[o];
                            o.curr == edge.bot
                                && o.out_idx.is_some()
                                && o.curr.y > o.top.y
                                && slopes_equal4(edge.curr, edge.top, o.curr, o.top)
                                && edge.wind_delta != 0
                                && o.wind_delta != 0
                        })
                    };
                    let other = shares_edge(edge.prev_in_ael).or_else(|| shares_edge(edge.next_in_ael));
                    if let Some(other) = other {
                        let (bot, top) = (edge.bot, edge.top);
                        let op2 = self.add_out_pt(other, bot);
                        self.add_join(op, op2, top);
                    }
                }
            }
            e = self.edges[cur].next_in_ael;
        }
        Ok(())
    }

    fn do_maxima(&mut self, e: EdgeIdx) -> Result<(), AlgorithmFailure> {
        let top = self.edges[e].top;
        let Some(pair) = self.maxima_pair_ex(e) else {
            if self.edges[e].out_idx.is_some() {
                self.add_out_pt(e, top);
            }
            self.delete_from(e, List::Active);
            return Ok(());
        };

        let mut next = self.edges[e].next_in_ael;
        while let Some(n) = next {
            if n == pair {
                break;
            }
            self.intersect_edges(e, n, top);
            self.swap_positions(e, n, List::Active);
            next = self.edges[e].next_in_ael;
        }

        match (self.edges[e].out_idx, self.edges[pair].out_idx) {
            (None, None) => {}
            (Some(_), Some(_)) => self.add_local_max_poly(e, pair, top),
            _ => return Err(AlgorithmFailure::MaximaPair { at: top }),
        }
        self.delete_from(e, List::Active);
        self.delete_from(pair, List::Active);
        Ok(())
    }
}
