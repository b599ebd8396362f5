//! Winding counts, and what happens when two active edges cross.
//!
//! Both subjects and clips are filled with the even-odd rule, so a winding
//! count only ever needs to say "inside" or "outside". We still carry the
//! counts around as integers, because a freshly-activated edge starts with its
//! winding delta as its count.

use crate::edge::{EdgeIdx, Side};
use crate::geom::Point;
use crate::PolyType;

use super::ClipContext;

impl ClipContext {
    /// Computes the winding counts of a newly-activated edge from its neighbors to the left.
    pub(crate) fn set_winding_count(&mut self, e: EdgeIdx) {
        let poly_type = self.edges[e].poly_type;
        let mut same = self.edges[e].prev_in_ael;
        while let Some(cur) = same {
            let c = &self.edges[cur];
            if c.poly_type == poly_type && c.wind_delta != 0 {
                break;
            }
            same = c.prev_in_ael;
        }

        self.edges[e].wind_cnt = self.edges[e].wind_delta;
        let (mut wind_cnt2, mut other) = match same {
            None => (0, self.active),
            Some(s) => (self.edges[s].wind_cnt2, self.edges[s].next_in_ael),
        };

        // Every edge of the other type between here and there flips the count.
        while let Some(cur) = other {
            if cur == e {
                break;
            }
            if self.edges[cur].wind_delta != 0 {
                wind_cnt2 = i32::from(wind_cnt2 == 0);
            }
            other = self.edges[cur].next_in_ael;
        }
        self.edges[e].wind_cnt2 = wind_cnt2;
    }

    /// Does this edge bound the result of `subject - clip`?
    pub(crate) fn is_contributing(&self, e: EdgeIdx) -> bool {
        let edge = &self.edges[e];
        if edge.wind_delta == 0 && edge.wind_cnt != 1 {
            return false;
        }
        match edge.poly_type {
            PolyType::Subject => edge.wind_cnt2 == 0,
            PolyType::Clip => edge.wind_cnt2 != 0,
        }
    }

    /// Handles `e1` and `e2` crossing at `pt`.
    ///
    /// Above the crossing, `e1` is to the right of `e2`.
    pub(crate) fn intersect_edges(&mut self, e1: EdgeIdx, e2: EdgeIdx, pt: Point) {
        let e1_contributing = self.edges[e1].out_idx.is_some();
        let e2_contributing = self.edges[e2].out_idx.is_some();

        if self.edges[e1].poly_type == self.edges[e2].poly_type {
            let w1 = self.edges[e1].wind_cnt;
            self.edges[e1].wind_cnt = self.edges[e2].wind_cnt;
            self.edges[e2].wind_cnt = w1;
        } else {
            let edge1 = &mut self.edges[e1];
            edge1.wind_cnt2 = i32::from(edge1.wind_cnt2 == 0);
            let edge2 = &mut self.edges[e2];
            edge2.wind_cnt2 = i32::from(edge2.wind_cnt2 == 0);
        }

        let e1_wc = self.edges[e1].wind_cnt.abs();
        let e2_wc = self.edges[e2].wind_cnt.abs();
        let e1_unit = e1_wc == 0 || e1_wc == 1;
        let e2_unit = e2_wc == 0 || e2_wc == 1;
        let same_type = self.edges[e1].poly_type == self.edges[e2].poly_type;

        if e1_contributing && e2_contributing {
            if !e1_unit || !e2_unit || !same_type {
                self.add_local_max_poly(e1, e2, pt);
            } else {
                self.add_out_pt(e1, pt);
                self.add_out_pt(e2, pt);
                self.swap_sides_and_outputs(e1, e2);
            }
        } else if e1_contributing {
            if e2_unit {
                self.add_out_pt(e1, pt);
                self.swap_sides_and_outputs(e1, e2);
            }
        } else if e2_contributing {
            if e1_unit {
                self.add_out_pt(e2, pt);
                self.swap_sides_and_outputs(e1, e2);
            }
        } else if e1_unit && e2_unit {
            // Neither edge is contributing yet, but they might start a new ring.
            let e1_wc2 = self.edges[e1].wind_cnt2.abs();
            let e2_wc2 = self.edges[e2].wind_cnt2.abs();
            if !same_type {
                self.add_local_min_poly(e1, e2, pt);
            } else if e1_wc == 1 && e2_wc == 1 {
                let starts_ring = match self.edges[e1].poly_type {
                    PolyType::Clip => e1_wc2 > 0 && e2_wc2 > 0,
                    PolyType::Subject => e1_wc2 <= 0 && e2_wc2 <= 0,
                };
                if starts_ring {
                    self.add_local_min_poly(e1, e2, pt);
                }
            } else {
                self.swap_sides(e1, e2);
            }
        }
    }

    fn swap_sides(&mut self, e1: EdgeIdx, e2: EdgeIdx) {
        let side: Side = self.edges[e1].side;
        self.edges[e1].side = self.edges[e2].side;
        self.edges[e2].side = side;
    }

    fn swap_sides_and_outputs(&mut self, e1: EdgeIdx, e2: EdgeIdx) {
        self.swap_sides(e1, e2);
        let out = self.edges[e1].out_idx;
        self.edges[e1].out_idx = self.edges[e2].out_idx;
        self.edges[e2].out_idx = out;
        self.note_source(e1);
        self.note_source(e2);
    }
}
