//! The nested output of a clip operation.
//!
//! Output contours are arranged in a forest: the roots are outer contours,
//! their children are holes in them, the holes' children are islands in the
//! holes, and so on. [`PolyTree::flatten`] turns this into a list of
//! [`Shape`]s, which is usually more convenient.

use std::sync::Arc;

use crate::clipper::{SourceId, SourceVec};
use crate::geom::{signed_area, Point};
use crate::outrec::OutRecIdx;
use crate::shape::{Contour, Shape};
use crate::sweep::ClipContext;

/// An index into a [`PolyTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct NodeId(pub usize);

/// One contour in a [`PolyTree`].
#[derive(Clone, Debug, serde::Serialize)]
pub struct PolyNode {
    contour: Contour,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
}

impl PolyNode {
    /// This node's contour.
    ///
    /// Outer contours have positive signed area, and holes have negative signed area.
    pub fn contour(&self) -> &Contour {
        &self.contour
    }

    /// The contour immediately enclosing this one.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The contours immediately inside this one.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// How many contours enclose this one.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Is this contour a hole? Holes are the ones with odd depth.
    pub fn is_hole(&self) -> bool {
        self.depth % 2 == 1
    }
}

/// A forest of nested contours.
///
/// Can be indexed with a [`NodeId`].
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct PolyTree {
    nodes: Vec<PolyNode>,
    roots: Vec<NodeId>,
}

impl PolyTree {
    /// The outermost contours.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Looks up a node.
    pub fn node(&self, id: NodeId) -> &PolyNode {
        &self.nodes[id.0]
    }

    /// The total number of contours.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Are there no contours at all?
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all of the nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &PolyNode)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Converts this tree into a list of shapes.
    ///
    /// There is one shape for every outer contour, and its holes are the
    /// outer contour's children. Islands inside the holes get their own
    /// shapes, which come after the shape they're inside.
    pub fn flatten(&self) -> Vec<Shape> {
        let mut ret = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if node.is_hole() {
                stack.extend(node.children.iter().rev());
                continue;
            }
            ret.push(Shape {
                outline: node.contour.clone(),
                holes: node
                    .children
                    .iter()
                    .map(|&c| self.node(c).contour.clone())
                    .collect(),
            });
            stack.extend(node.children.iter().rev());
        }
        ret
    }

    pub(crate) fn build(ctx: &ClipContext, sources: &SourceVec<Arc<[Point]>>) -> PolyTree {
        let mut first_left: Vec<Option<OutRecIdx>> =
            ctx.outs.iter().map(|(_, rec)| rec.first_left).collect();
        let mut node_of: Vec<Option<NodeId>> = vec![None; ctx.outs.len()];
        let mut rings = Vec::new();

        for (idx, rec) in ctx.outs.iter() {
            let Some(pts) = rec.pts else {
                continue;
            };
            if rec.is_open || ctx.point_count(pts) < 3 {
                continue;
            }
            fix_hole_linkage(ctx, &mut first_left, idx);
            node_of[idx.index()] = Some(NodeId(rings.len()));
            rings.push((idx, ctx.ring_points(pts)));
        }

        let parents: Vec<Option<NodeId>> = rings
            .iter()
            .map(|(idx, _)| first_left[idx.index()].and_then(|fl| node_of[fl.index()]))
            .collect();
        let mut children = vec![Vec::new(); rings.len()];
        let mut roots = Vec::new();
        for (i, parent) in parents.iter().enumerate() {
            match parent {
                Some(p) => children[p.0].push(NodeId(i)),
                None => roots.push(NodeId(i)),
            }
        }

        let mut depths = vec![0; rings.len()];
        let mut stack = roots.clone();
        while let Some(id) = stack.pop() {
            for &c in &children[id.0] {
                depths[c.0] = depths[id.0] + 1;
                stack.push(c);
            }
        }

        let nodes = rings
            .into_iter()
            .zip(parents)
            .zip(children)
            .zip(depths)
            .map(|((((idx, mut points), parent), children), depth)| {
                // Outer contours go one way, holes go the other.
                let area = signed_area(&points);
                if (depth % 2 == 0) != (area > 0.0) {
                    points.reverse();
                }
                let source = ctx.outs[idx].source;
                let points = reused_source(&points, source, sources)
                    .unwrap_or_else(|| points.into());
                PolyNode {
                    contour: Contour::new(points, source),
                    parent,
                    children,
                    depth,
                }
            })
            .collect();

        PolyTree { nodes, roots }
    }

    /// Draws this tree, with outer contours in one color and holes in another.
    #[cfg(feature = "debug-svg")]
    pub fn dump_svg(&self) -> svg::Document {
        let mut bbox: Option<kurbo::Rect> = None;
        let mut document = svg::Document::new();
        for node in &self.nodes {
            let r = node.contour.bounding_box();
            bbox = Some(bbox.map_or(r, |b| b.union(r)));

            let mut points = node.contour.points().iter();
            let Some(first) = points.next() else {
                continue;
            };
            let mut data = svg::node::element::path::Data::new().move_to((first.x, first.y));
            for p in points {
                data = data.line_to((p.x, p.y));
            }
            data = data.close();
            let color = if node.is_hole() { "red" } else { "blue" };
            let path = svg::node::element::Path::new()
                .set("stroke", color)
                .set("stroke-width", "1")
                .set("vector-effect", "non-scaling-stroke")
                .set("fill", "none")
                .set("d", data);
            document = document.add(path);
        }
        let bbox = bbox.unwrap_or(kurbo::Rect::ZERO).inflate(1.0, 1.0);
        document.set("viewBox", (bbox.x0, bbox.y0, bbox.width(), bbox.height()))
    }
}

impl std::ops::Index<NodeId> for PolyTree {
    type Output = PolyNode;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.nodes[index.0]
    }
}

/// Makes sure that a ring's first-left is a live ring of the opposite hole
/// state, by walking up the first-left chain.
fn fix_hole_linkage(ctx: &ClipContext, first_left: &mut [Option<OutRecIdx>], rec: OutRecIdx) {
    let outs = &ctx.outs;
    let is_hole = outs[rec].is_hole;
    let owns = |o: OutRecIdx| outs[o].is_hole != is_hole && outs[o].pts.is_some();

    let Some(fl) = first_left[rec.index()] else {
        return;
    };
    if owns(fl) {
        return;
    }
    let mut orfl = Some(fl);
    // The chain is acyclic, but bound the walk anyway.
    for _ in 0..outs.len() {
        match orfl {
            Some(o) if !owns(o) => orfl = first_left[o.index()],
            _ => break,
        }
    }
    first_left[rec.index()] = orfl;
}

/// If `points` is exactly the contour that was added as `source` (up to the
/// starting vertex), returns that contour's allocation.
fn reused_source(
    points: &[Point],
    source: Option<SourceId>,
    sources: &SourceVec<Arc<[Point]>>,
) -> Option<Arc<[Point]>> {
    let orig = &sources[source?];
    let n = orig.len();
    if n != points.len() {
        return None;
    }
    let is_rotation = (0..n)
        .filter(|&shift| orig[shift] == points[0])
        .any(|shift| (0..n).all(|i| orig[(i + shift) % n] == points[i]));
    is_rotation.then(|| Arc::clone(orig))
}

#[cfg(test)]
mod tests {
    use crate::{Clipper, PolyType};

    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Vec<(f64, f64)> {
        vec![(x, y), (x + size, y), (x + size, y + size), (x, y + size)]
    }

    fn nested() -> (Clipper, Vec<SourceId>) {
        let mut clipper = Clipper::new();
        let mut ids = clipper
            .add([square(0.0, 0.0, 30.0)], PolyType::Subject)
            .unwrap();
        ids.extend(
            clipper
                .add(
                    [square(5.0, 5.0, 20.0), square(10.0, 10.0, 10.0)],
                    PolyType::Clip,
                )
                .unwrap(),
        );
        (clipper, ids)
    }

    #[test]
    fn island_in_a_hole() {
        let (clipper, _) = nested();
        let tree = clipper.execute_tree().unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.roots().len(), 1);

        let outer = &tree[tree.roots()[0]];
        assert_eq!(outer.depth(), 0);
        assert!(!outer.is_hole());
        assert_eq!(outer.contour().signed_area(), 900.0);
        assert_eq!(outer.children().len(), 1);

        let hole_id = outer.children()[0];
        let hole = &tree[hole_id];
        assert!(hole.is_hole());
        assert_eq!(hole.parent(), Some(tree.roots()[0]));
        assert_eq!(hole.contour().signed_area(), -400.0);
        assert_eq!(hole.children().len(), 1);

        let island = &tree[hole.children()[0]];
        assert_eq!(island.depth(), 2);
        assert_eq!(island.parent(), Some(hole_id));
        assert_eq!(island.contour().signed_area(), 100.0);
    }

    #[test]
    fn flatten_separates_islands() {
        let (clipper, ids) = nested();
        let shapes = clipper.execute_tree().unwrap().flatten();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].holes.len(), 1);
        assert!(shapes[1].holes.is_empty());

        // The outline and the island are unchanged, so they share their points
        // with the input. The hole has the opposite orientation from its input.
        assert!(Arc::ptr_eq(
            shapes[0].outline.points_arc(),
            clipper.source(ids[0])
        ));
        assert!(Arc::ptr_eq(
            shapes[1].outline.points_arc(),
            clipper.source(ids[2])
        ));
        assert_eq!(shapes[0].holes[0].source(), Some(ids[1]));
        assert!(!Arc::ptr_eq(
            shapes[0].holes[0].points_arc(),
            clipper.source(ids[1])
        ));
    }

    #[test]
    fn reuse_needs_the_same_cyclic_order() {
        let pts = |coords: &[(f64, f64)]| -> Vec<Point> { coords.iter().map(|&c| c.into()).collect() };
        let mut sources = SourceVec::default();
        let id = sources.push(Arc::from(pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])));

        let rotated = pts(&[(10.0, 10.0), (0.0, 10.0), (0.0, 0.0), (10.0, 0.0)]);
        let reused = reused_source(&rotated, Some(id), &sources).unwrap();
        assert!(Arc::ptr_eq(&reused, &sources[id]));

        let reversed = pts(&[(0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)]);
        assert!(reused_source(&reversed, Some(id), &sources).is_none());
        // Same vertices, traced as a bowtie.
        let crossed = pts(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0)]);
        assert!(reused_source(&crossed, Some(id), &sources).is_none());
        assert!(reused_source(&rotated, None, &sources).is_none());
    }

    #[test]
    fn empty_result() {
        let tree = Clipper::new().execute_tree().unwrap();
        assert!(tree.is_empty());
        assert!(tree.flatten().is_empty());
    }
}
