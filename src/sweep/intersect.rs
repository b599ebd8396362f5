//! Crossings between active edges within a scanbeam.

use crate::edge::EdgeIdx;
use crate::geom::Point;
use crate::AlgorithmFailure;

use super::active::List;
use super::ClipContext;

/// Two edges that swap positions somewhere inside the current scanbeam.
#[derive(Clone, Copy, Debug)]
pub(crate) struct IntersectNode {
    pub e1: EdgeIdx,
    pub e2: EdgeIdx,
    pub pt: Point,
}

impl ClipContext {
    /// Finds and processes all the crossings below `top_y`.
    pub(crate) fn process_intersections(&mut self, top_y: f64) -> Result<(), AlgorithmFailure> {
        if self.active.is_none() {
            return Ok(());
        }
        self.build_intersect_list(top_y);
        if self.intersections.is_empty() {
            return Ok(());
        }
        log::trace!("{} crossings below {top_y}", self.intersections.len());

        let ret = if self.intersections.len() == 1 || self.fixup_intersection_order() {
            self.process_intersect_list();
            Ok(())
        } else {
            self.intersections.clear();
            Err(AlgorithmFailure::IntersectionOrder { y: top_y })
        };
        self.sorted = None;
        ret
    }

    /// Bubble-sorts a copy of the active edge list by position at `top_y`,
    /// recording a crossing for every swap.
    fn build_intersect_list(&mut self, top_y: f64) {
        self.sorted = self.active;
        let mut e = self.active;
        while let Some(cur) = e {
            let edge = &mut self.edges[cur];
            edge.prev_in_sel = edge.prev_in_ael;
            edge.next_in_sel = edge.next_in_ael;
            edge.curr.x = edge.top_x(top_y);
            e = edge.next_in_ael;
        }

        loop {
            let Some(mut e) = self.sorted else {
                break;
            };
            let mut modified = false;
            while let Some(next) = self.edges[e].next_in_sel {
                if self.edges[e].curr.x > self.edges[next].curr.x {
                    let mut pt = self.intersect_point(e, next);
                    if pt.y < top_y {
                        pt = Point::new(self.edges[e].top_x(top_y), top_y);
                    }
                    self.intersections.push(IntersectNode { e1: e, e2: next, pt });
                    self.swap_positions(e, next, List::Sorted);
                    modified = true;
                } else {
                    e = next;
                }
            }
            // The last edge is now in its final position.
            match self.edges[e].prev_in_sel {
                Some(prev) => self.edges[prev].next_in_sel = None,
                None => break,
            }
            if !modified {
                break;
            }
        }
        self.sorted = None;
    }

    /// Where `e1` and `e2` cross.
    ///
    /// The result is clamped to lie inside the current scanbeam, and exactly
    /// on any vertical or horizontal edge involved.
    fn intersect_point(&self, e1: EdgeIdx, e2: EdgeIdx) -> Point {
        let (edge1, edge2) = (&self.edges[e1], &self.edges[e2]);
        if edge1.dx == edge2.dx {
            let y = edge1.curr.y;
            return Point::new(edge1.top_x(y), y);
        }

        let (x, y);
        if edge1.bot.x == edge1.top.x {
            x = edge1.bot.x;
            y = if edge2.is_horizontal() {
                edge2.bot.y
            } else {
                let b2 = edge2.bot.y - edge2.bot.x / edge2.dx;
                x / edge2.dx + b2
            };
        } else if edge2.bot.x == edge2.top.x {
            x = edge2.bot.x;
            y = if edge1.is_horizontal() {
                edge1.bot.y
            } else {
                let b1 = edge1.bot.y - edge1.bot.x / edge1.dx;
                x / edge1.dx + b1
            };
        } else {
            let b1 = edge1.bot.x - edge1.bot.y * edge1.dx;
            let b2 = edge2.bot.x - edge2.bot.y * edge2.dx;
            let q = (b2 - b1) / (edge1.dx - edge2.dx);
            y = q;
            x = if edge1.dx.abs() < edge2.dx.abs() {
                edge1.dx * q + b1
            } else {
                edge2.dx * q + b2
            };
        }
        let mut ip = Point::new(x, y);

        // Clamp to the scanbeam, using whichever edge is steeper to compute x.
        if ip.y < edge1.top.y || ip.y < edge2.top.y {
            ip.y = edge1.top.y.max(edge2.top.y);
            ip.x = if edge1.dx.abs() < edge2.dx.abs() {
                edge1.top_x(ip.y)
            } else {
                edge2.top_x(ip.y)
            };
        }
        if ip.y > edge1.curr.y {
            ip.y = edge1.curr.y;
            ip.x = if edge1.dx.abs() > edge2.dx.abs() {
                edge2.top_x(ip.y)
            } else {
                edge1.top_x(ip.y)
            };
        }
        ip
    }

    fn edges_adjacent(&self, node: &IntersectNode) -> bool {
        let e1 = &self.edges[node.e1];
        e1.next_in_sel == Some(node.e2) || e1.prev_in_sel == Some(node.e2)
    }

    /// Reorders crossings so that every crossing is between edges that are
    /// adjacent at the time it gets processed.
    ///
    /// Returns false if that's impossible, which can happen when rounding
    /// errors leave the crossings inconsistent.
    fn fixup_intersection_order(&mut self) -> bool {
        self.copy_ael_to_sel();
        // Bottom-most first. Crossings at the same height stay in the order the
        // bubble sort found them.
        self.intersections.sort_by(|a, b| b.pt.y.total_cmp(&a.pt.y));

        let n = self.intersections.len();
        for i in 0..n {
            if !self.edges_adjacent(&self.intersections[i]) {
                let Some(j) = (i + 1..n).find(|&j| self.edges_adjacent(&self.intersections[j])) else {
                    return false;
                };
                self.intersections.swap(i, j);
            }
            let IntersectNode { e1, e2, .. } = self.intersections[i];
            self.swap_positions(e1, e2, List::Sorted);
        }
        true
    }

    fn process_intersect_list(&mut self) {
        for IntersectNode { e1, e2, pt } in std::mem::take(&mut self.intersections) {
            self.intersect_edges(e1, e2, pt);
            self.swap_positions(e1, e2, List::Active);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::edge::{add_ring, EdgeVec};
    use crate::{ClipOptions, PolyType, SourceId};

    use super::*;

    #[test]
    fn crossing_of_an_x() {
        // Two triangles whose inner edges cross at (5, 5).
        let left = [Point::new(0.0, 10.0), Point::new(10.0, 0.0), Point::new(-5.0, 0.0)];
        let right = [Point::new(10.0, 10.0), Point::new(15.0, 0.0), Point::new(0.0, 0.0)];
        let mut edges = EdgeVec::default();
        let mut minima = add_ring(&mut edges, &left, PolyType::Subject, SourceId(0));
        minima.extend(add_ring(&mut edges, &right, PolyType::Clip, SourceId(1)));
        let mut ctx = ClipContext::new(edges, minima, ClipOptions::default());
        for m in ctx.minima.clone() {
            ctx.insert_edge_into_ael(m.left, None);
            ctx.insert_edge_into_ael(m.right, Some(m.left));
        }

        ctx.build_intersect_list(0.0);
        assert_eq!(ctx.intersections.len(), 1);
        assert_eq!(ctx.intersections[0].pt, Point::new(5.0, 5.0));
    }

    #[test]
    fn vertical_crossing_is_exact() {
        let mut edges = EdgeVec::default();
        let vert = [Point::new(3.0, 10.0), Point::new(3.0, 0.0), Point::new(-1.0, 5.0)];
        let slant = [Point::new(0.0, 10.0), Point::new(9.0, 1.0), Point::new(9.0, 10.0)];
        add_ring(&mut edges, &vert, PolyType::Subject, SourceId(0));
        add_ring(&mut edges, &slant, PolyType::Clip, SourceId(1));
        let ctx = ClipContext::new(edges, Vec::new(), ClipOptions::default());

        let find = |a: Point, b: Point| {
            ctx.edges
                .indices()
                .find(|&e| {
                    let e = &ctx.edges[e];
                    (e.bot == a && e.top == b) || (e.bot == b && e.top == a)
                })
                .unwrap()
        };
        let v = find(Point::new(3.0, 10.0), Point::new(3.0, 0.0));
        let s = find(Point::new(0.0, 10.0), Point::new(9.0, 1.0));
        let mut ctx = ctx;
        ctx.edges[v].curr = ctx.edges[v].bot;
        ctx.edges[s].curr = ctx.edges[s].bot;
        let pt = ctx.intersect_point(v, s);
        assert_eq!(pt.x, 3.0);
        assert_eq!(pt.y, 7.0);
    }
}
