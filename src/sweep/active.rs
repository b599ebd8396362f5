//! Maintenance of the two intrusive edge lists: the active edge list, ordered
//! by position along the sweep line, and the sorted edge list, which is used
//! as scratch space for sorting crossings and as a queue of pending horizontals.

use crate::edge::EdgeIdx;

use super::ClipContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum List {
    Active,
    Sorted,
}

/// The direction we're walking along a horizontal edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    LeftToRight,
    RightToLeft,
}

impl ClipContext {
    fn head(&mut self, list: List) -> &mut Option<EdgeIdx> {
        match list {
            List::Active => &mut self.active,
            List::Sorted => &mut self.sorted,
        }
    }

    fn prev_in(&self, e: EdgeIdx, list: List) -> Option<EdgeIdx> {
        match list {
            List::Active => self.edges[e].prev_in_ael,
            List::Sorted => self.edges[e].prev_in_sel,
        }
    }

    fn next_in(&self, e: EdgeIdx, list: List) -> Option<EdgeIdx> {
        match list {
            List::Active => self.edges[e].next_in_ael,
            List::Sorted => self.edges[e].next_in_sel,
        }
    }

    fn set_prev(&mut self, e: EdgeIdx, list: List, prev: Option<EdgeIdx>) {
        match list {
            List::Active => self.edges[e].prev_in_ael = prev,
            List::Sorted => self.edges[e].prev_in_sel = prev,
        }
    }

    fn set_next(&mut self, e: EdgeIdx, list: List, next: Option<EdgeIdx>) {
        match list {
            List::Active => self.edges[e].next_in_ael = next,
            List::Sorted => self.edges[e].next_in_sel = next,
        }
    }

    /// Does `e2` belong before `e1` in the active edge list, where `e1` is
    /// already in the list and `e2` is being inserted at its bottom point?
    fn e2_inserts_before_e1(&self, e1: EdgeIdx, e2: EdgeIdx) -> bool {
        let (e1, e2) = (&self.edges[e1], &self.edges[e2]);
        if e2.curr.x == e1.curr.x {
            if e2.top.y > e1.top.y {
                e2.top.x < e1.top_x(e2.top.y)
            } else {
                e1.top.x > e2.top_x(e1.top.y)
            }
        } else {
            e2.curr.x < e1.curr.x
        }
    }

    /// Inserts `e` into the active edge list, searching for its spot starting at `start`.
    pub(crate) fn insert_edge_into_ael(&mut self, e: EdgeIdx, start: Option<EdgeIdx>) {
        let Some(head) = self.active else {
            self.edges[e].prev_in_ael = None;
            self.edges[e].next_in_ael = None;
            self.active = Some(e);
            return;
        };

        if start.is_none() && self.e2_inserts_before_e1(head, e) {
            self.edges[e].prev_in_ael = None;
            self.edges[e].next_in_ael = Some(head);
            self.edges[head].prev_in_ael = Some(e);
            self.active = Some(e);
            return;
        }

        let mut start = start.unwrap_or(head);
        while let Some(next) = self.edges[start].next_in_ael {
            if self.e2_inserts_before_e1(next, e) {
                break;
            }
            start = next;
        }
        let next = self.edges[start].next_in_ael;
        self.edges[e].next_in_ael = next;
        if let Some(next) = next {
            self.edges[next].prev_in_ael = Some(e);
        }
        self.edges[e].prev_in_ael = Some(start);
        self.edges[start].next_in_ael = Some(e);
    }

    /// Unlinks `e` from `list`. Does nothing if it wasn't there.
    pub(crate) fn delete_from(&mut self, e: EdgeIdx, list: List) {
        let prev = self.prev_in(e, list);
        let next = self.next_in(e, list);
        if prev.is_none() && next.is_none() && *self.head(list) != Some(e) {
            return;
        }
        match prev {
            Some(p) => self.set_next(p, list, next),
            None => *self.head(list) = next,
        }
        if let Some(n) = next {
            self.set_prev(n, list, prev);
        }
        self.set_prev(e, list, None);
        self.set_next(e, list, None);
    }

    /// Exchanges the positions of two edges in `list`.
    pub(crate) fn swap_positions(&mut self, e1: EdgeIdx, e2: EdgeIdx, list: List) {
        // Either edge might already have been removed.
        let unlinked = |ctx: &Self, e| ctx.prev_in(e, list).is_none() && ctx.next_in(e, list).is_none();
        if unlinked(self, e1) || unlinked(self, e2) {
            return;
        }

        if self.next_in(e1, list) == Some(e2) {
            let next = self.next_in(e2, list);
            let prev = self.prev_in(e1, list);
            if let Some(n) = next {
                self.set_prev(n, list, Some(e1));
            }
            if let Some(p) = prev {
                self.set_next(p, list, Some(e2));
            }
            self.set_prev(e2, list, prev);
            self.set_next(e2, list, Some(e1));
            self.set_prev(e1, list, Some(e2));
            self.set_next(e1, list, next);
        } else if self.next_in(e2, list) == Some(e1) {
            let next = self.next_in(e1, list);
            let prev = self.prev_in(e2, list);
            if let Some(n) = next {
                self.set_prev(n, list, Some(e2));
            }
            if let Some(p) = prev {
                self.set_next(p, list, Some(e1));
            }
            self.set_prev(e1, list, prev);
            self.set_next(e1, list, Some(e2));
            self.set_prev(e2, list, Some(e1));
            self.set_next(e2, list, next);
        } else {
            let next1 = self.next_in(e1, list);
            let prev1 = self.prev_in(e1, list);
            let next2 = self.next_in(e2, list);
            let prev2 = self.prev_in(e2, list);
            self.set_next(e1, list, next2);
            if let Some(n) = next2 {
                self.set_prev(n, list, Some(e1));
            }
            self.set_prev(e1, list, prev2);
            if let Some(p) = prev2 {
                self.set_next(p, list, Some(e1));
            }
            self.set_next(e2, list, next1);
            if let Some(n) = next1 {
                self.set_prev(n, list, Some(e2));
            }
            self.set_prev(e2, list, prev1);
            if let Some(p) = prev1 {
                self.set_next(p, list, Some(e2));
            }
        }

        if self.prev_in(e1, list).is_none() {
            *self.head(list) = Some(e1);
        } else if self.prev_in(e2, list).is_none() {
            *self.head(list) = Some(e2);
        }
    }

    /// Pushes `e` onto the front of the sorted edge list.
    pub(crate) fn add_edge_to_sel(&mut self, e: EdgeIdx) {
        self.edges[e].prev_in_sel = None;
        self.edges[e].next_in_sel = self.sorted;
        if let Some(head) = self.sorted {
            self.edges[head].prev_in_sel = Some(e);
        }
        self.sorted = Some(e);
    }

    pub(crate) fn pop_edge_from_sel(&mut self) -> Option<EdgeIdx> {
        let e = self.sorted?;
        self.delete_from(e, List::Sorted);
        Some(e)
    }

    /// Makes the sorted edge list a copy of the active edge list.
    pub(crate) fn copy_ael_to_sel(&mut self) {
        self.sorted = self.active;
        let mut e = self.active;
        while let Some(cur) = e {
            let edge = &mut self.edges[cur];
            edge.prev_in_sel = edge.prev_in_ael;
            edge.next_in_sel = edge.next_in_ael;
            e = edge.next_in_ael;
        }
    }

    pub(crate) fn next_in_ael(&self, e: EdgeIdx, dir: Direction) -> Option<EdgeIdx> {
        match dir {
            Direction::LeftToRight => self.edges[e].next_in_ael,
            Direction::RightToLeft => self.edges[e].prev_in_ael,
        }
    }

    /// The edge that finishes at the same local maximum as `e`, if there is one.
    pub(crate) fn maxima_pair(&self, e: EdgeIdx) -> Option<EdgeIdx> {
        let edge = &self.edges[e];
        [edge.next, edge.prev].into_iter().find(|&other| {
            let o = &self.edges[other];
            o.top == edge.top && o.next_in_lml.is_none()
        })
    }

    /// Like [`ClipContext::maxima_pair`], but only returns a pair that's
    /// still active, or a horizontal that's waiting to become active.
    pub(crate) fn maxima_pair_ex(&self, e: EdgeIdx) -> Option<EdgeIdx> {
        let pair = self.maxima_pair(e)?;
        let p = &self.edges[pair];
        let detached = p.next_in_ael == p.prev_in_ael && self.active != Some(pair);
        (!detached || p.is_horizontal()).then_some(pair)
    }
}

#[cfg(test)]
mod tests {
    use crate::edge::{add_ring, EdgeVec};
    use crate::geom::Point;
    use crate::{ClipOptions, PolyType, SourceId};

    use super::*;

    fn ctx_with_squares(n: usize) -> ClipContext {
        let mut edges = EdgeVec::default();
        let mut minima = Vec::new();
        for i in 0..n {
            let x = 10.0 * i as f64;
            let ring = [
                Point::new(x, 0.0),
                Point::new(x + 5.0, 0.0),
                Point::new(x + 5.0, 5.0),
                Point::new(x, 5.0),
            ];
            minima.extend(add_ring(&mut edges, &ring, PolyType::Subject, SourceId(i)));
        }
        ClipContext::new(edges, minima, ClipOptions::default())
    }

    fn active_list(ctx: &ClipContext) -> Vec<EdgeIdx> {
        let mut ret = Vec::new();
        let mut e = ctx.active;
        while let Some(cur) = e {
            ret.push(cur);
            e = ctx.edges[cur].next_in_ael;
        }
        ret
    }

    #[test]
    fn insertion_is_sorted() {
        let mut ctx = ctx_with_squares(3);
        let minima = ctx.minima.clone();
        // Insert them backwards, to make sure the search does something.
        for m in minima.iter().rev() {
            ctx.insert_edge_into_ael(m.left, None);
            ctx.insert_edge_into_ael(m.right, Some(m.left));
        }
        let xs: Vec<f64> = active_list(&ctx)
            .into_iter()
            .map(|e| ctx.edges[e].curr.x)
            .collect();
        assert_eq!(xs.len(), 6);
        assert!(xs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn swap_and_delete() {
        let mut ctx = ctx_with_squares(2);
        let minima = ctx.minima.clone();
        for m in &minima {
            ctx.insert_edge_into_ael(m.left, None);
            ctx.insert_edge_into_ael(m.right, Some(m.left));
        }
        let before = active_list(&ctx);
        assert_eq!(before.len(), 4);

        // Adjacent, in both orders.
        ctx.swap_positions(before[0], before[1], List::Active);
        assert_eq!(active_list(&ctx), vec![before[1], before[0], before[2], before[3]]);
        ctx.swap_positions(before[0], before[1], List::Active);
        assert_eq!(active_list(&ctx), before);

        // Not adjacent.
        ctx.swap_positions(before[0], before[3], List::Active);
        assert_eq!(active_list(&ctx), vec![before[3], before[1], before[2], before[0]]);

        ctx.delete_from(before[1], List::Active);
        assert_eq!(active_list(&ctx), vec![before[3], before[2], before[0]]);
        // Deleting twice is harmless, and so is swapping with a deleted edge.
        ctx.delete_from(before[1], List::Active);
        ctx.swap_positions(before[1], before[2], List::Active);
        assert_eq!(active_list(&ctx), vec![before[3], before[2], before[0]]);
    }

    #[test]
    fn sel_is_a_stack() {
        let mut ctx = ctx_with_squares(2);
        let a = ctx.minima[0].left;
        let b = ctx.minima[1].left;
        ctx.add_edge_to_sel(a);
        ctx.add_edge_to_sel(b);
        assert_eq!(ctx.pop_edge_from_sel(), Some(b));
        assert_eq!(ctx.pop_edge_from_sel(), Some(a));
        assert_eq!(ctx.pop_edge_from_sel(), None);
    }
}
