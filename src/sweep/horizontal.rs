//! Horizontal edges.
//!
//! A horizontal edge crosses every active edge between its two endpoints, all
//! at the same height. We process these crossings by walking the horizontal
//! through the active edge list, swapping it past each edge it meets.

use crate::edge::{edges_parallel, EdgeIdx};
use crate::geom::{horz_segments_overlap, Point};
use crate::outrec::OutPtIdx;
use crate::AlgorithmFailure;

use super::active::{Direction, List};
use super::ClipContext;

impl ClipContext {
    pub(crate) fn process_horizontals(&mut self) -> Result<(), AlgorithmFailure> {
        while let Some(e) = self.pop_edge_from_sel() {
            log::trace!("horizontal {e:?} from {:?} to {:?}", self.edges[e].bot, self.edges[e].top);
            self.process_horizontal(e)?;
        }
        Ok(())
    }

    fn horz_direction(&self, e: EdgeIdx) -> (Direction, f64, f64) {
        let edge = &self.edges[e];
        if edge.bot.x < edge.top.x {
            (Direction::LeftToRight, edge.bot.x, edge.top.x)
        } else {
            (Direction::RightToLeft, edge.top.x, edge.bot.x)
        }
    }

    /// Joins `op` with the last point of every queued horizontal that overlaps `horz`.
    fn join_overlapping_horizontals(&mut self, horz: EdgeIdx, op: OutPtIdx) {
        let (bot_x, top_x) = (self.edges[horz].bot.x, self.edges[horz].top.x);
        let mut next = self.sorted;
        while let Some(other) = next {
            let o = &self.edges[other];
            if o.out_idx.is_some() && horz_segments_overlap(bot_x, top_x, o.bot.x, o.top.x) {
                let off_pt = o.top;
                if let Some(op2) = self.last_out_pt(other) {
                    self.add_join(op2, op, off_pt);
                }
            }
            next = self.edges[other].next_in_sel;
        }
    }

    /// Runs a horizontal edge (and any horizontals immediately following it
    /// in its bound) through the active edge list.
    fn process_horizontal(&mut self, mut horz: EdgeIdx) -> Result<(), AlgorithmFailure> {
        let is_open = self.edges[horz].wind_delta == 0;
        let (mut dir, mut horz_left, mut horz_right) = self.horz_direction(horz);

        let mut last_horz = horz;
        while let Some(next) = self.edges[last_horz].next_in_lml {
            if !self.edges[next].is_horizontal() {
                break;
            }
            last_horz = next;
        }
        let max_pair = if self.edges[last_horz].next_in_lml.is_none() {
            self.maxima_pair(last_horz)
        } else {
            None
        };

        // Cursors into the maxima that this horizontal passes over. Contributing
        // horizontals get a vertex at each of them.
        let bot_x = self.edges[horz].bot.x;
        let last_top_x = self.edges[last_horz].top.x;
        let below = self.maxima.partition_point(|&x| x <= bot_x);
        let mut max_fwd = (below < self.maxima.len() && self.maxima[below] < last_top_x)
            .then_some(below);
        let mut max_rev = (below > 0 && self.maxima[below - 1] > last_top_x).then(|| below - 1);
        match dir {
            Direction::LeftToRight => max_rev = None,
            Direction::RightToLeft => max_fwd = None,
        }

        let mut op1 = None;
        loop {
            let is_last_horz = horz == last_horz;
            let mut e = self.next_in_ael(horz, dir);
            while let Some(cur) = e {
                let cur_x = self.edges[cur].curr.x;
                let contributing = self.edges[horz].out_idx.is_some() && !is_open;
                let horz_y = self.edges[horz].bot.y;
                match dir {
                    Direction::LeftToRight => {
                        while let Some(i) = max_fwd {
                            if self.maxima[i] >= cur_x {
                                break;
                            }
                            if contributing {
                                self.add_out_pt(horz, Point::new(self.maxima[i], horz_y));
                            }
                            max_fwd = Some(i + 1).filter(|&j| j < self.maxima.len());
                        }
                    }
                    Direction::RightToLeft => {
                        while let Some(i) = max_rev {
                            if self.maxima[i] <= cur_x {
                                break;
                            }
                            if contributing {
                                self.add_out_pt(horz, Point::new(self.maxima[i], horz_y));
                            }
                            max_rev = i.checked_sub(1);
                        }
                    }
                }

                if (dir == Direction::LeftToRight && cur_x > horz_right)
                    || (dir == Direction::RightToLeft && cur_x < horz_left)
                {
                    break;
                }

                // If the horizontal ends where it meets an edge that's going
                // to stay to its left, stop without crossing it.
                let h = &self.edges[horz];
                if cur_x == h.top.x {
                    if let Some(next) = h.next_in_lml {
                        if self.edges[cur].dx < self.edges[next].dx {
                            break;
                        }
                    }
                }

                if contributing {
                    let pt = self.edges[cur].curr;
                    let op = self.add_out_pt(horz, pt);
                    op1 = Some(op);
                    self.join_overlapping_horizontals(horz, op);
                    let bot = self.edges[horz].bot;
                    self.add_ghost_join(op, bot);
                }

                if Some(cur) == max_pair && is_last_horz {
                    if self.edges[horz].out_idx.is_some() {
                        let top = self.edges[horz].top;
                        self.add_local_max_poly(horz, cur, top);
                    }
                    self.delete_from(horz, List::Active);
                    self.delete_from(cur, List::Active);
                    return Ok(());
                }

                let pt = Point::new(cur_x, self.edges[horz].curr.y);
                match dir {
                    Direction::LeftToRight => self.intersect_edges(horz, cur, pt),
                    Direction::RightToLeft => self.intersect_edges(cur, horz, pt),
                }
                let next = self.next_in_ael(cur, dir);
                self.swap_positions(horz, cur, List::Active);
                e = next;
            }

            match self.edges[horz].next_in_lml {
                Some(next) if self.edges[next].is_horizontal() => {}
                _ => break,
            }
            horz = self.update_edge_into_ael(horz)?;
            if self.edges[horz].out_idx.is_some() {
                let bot = self.edges[horz].bot;
                self.add_out_pt(horz, bot);
            }
            (dir, horz_left, horz_right) = self.horz_direction(horz);
        }

        if self.edges[horz].out_idx.is_some() && op1.is_none() {
            if let Some(op) = self.last_out_pt(horz) {
                self.join_overlapping_horizontals(horz, op);
                let top = self.edges[horz].top;
                self.add_ghost_join(op, top);
            }
        }

        if self.edges[horz].next_in_lml.is_none() {
            if self.edges[horz].out_idx.is_some() {
                let top = self.edges[horz].top;
                self.add_out_pt(horz, top);
            }
            self.delete_from(horz, List::Active);
            return Ok(());
        }

        if self.edges[horz].out_idx.is_none() {
            self.update_edge_into_ael(horz)?;
            return Ok(());
        }

        let top = self.edges[horz].top;
        let op = self.add_out_pt(horz, top);
        let horz = self.update_edge_into_ael(horz)?;
        if self.edges[horz].wind_delta == 0 {
            return Ok(());
        }

        // The new edge might share its bottom with a neighboring output edge.
        let h = &self.edges[horz];
        let shares_edge = |other: Option<EdgeIdx>| {
            other.filter(|&o| {
                let o = &self.edges[o];
                o.curr == h.bot
                    && o.wind_delta != 0
                    && o.out_idx.is_some()
                    && o.curr.y > o.top.y
                    && edges_parallel(h, o)
            })
        };
        if let Some(other) = shares_edge(h.prev_in_ael).or_else(|| shares_edge(h.next_in_ael)) {
            let (bot, top) = (h.bot, h.top);
            let op2 = self.add_out_pt(other, bot);
            self.add_join(op, op2, top);
        }
        Ok(())
    }
}
