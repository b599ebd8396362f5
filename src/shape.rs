//! Output shapes.

use std::sync::Arc;

use crate::clipper::SourceId;
use crate::geom::{cyclic_pairs, point_in_ring, signed_area, Containment, Point};

/// A closed contour in the output of a clip operation.
///
/// Contours are cheap to clone. A contour that passed through the clip
/// untouched shares its points with the contour that was added.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Contour {
    points: Arc<[Point]>,
    source: Option<SourceId>,
}

impl Contour {
    pub(crate) fn new(points: Arc<[Point]>, source: Option<SourceId>) -> Self {
        Contour { points, source }
    }

    /// The vertices of this contour. The last one connects back to the first.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The vertices of this contour, in their shared allocation.
    pub fn points_arc(&self) -> &Arc<[Point]> {
        &self.points
    }

    /// The input contour that this contour came from, if it came from exactly one.
    ///
    /// This is `Some` if every edge of this contour came from the same input
    /// contour. That doesn't mean the input contour was unchanged: it might
    /// have had a corner cut off by a clip contour, for example.
    pub fn source(&self) -> Option<SourceId> {
        self.source
    }

    /// The number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Does this contour have no vertices at all?
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The signed area of this contour: positive for outlines, negative for holes.
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    /// The smallest axis-aligned rectangle containing this contour.
    pub fn bounding_box(&self) -> kurbo::Rect {
        let mut points = self.points.iter();
        let Some(first) = points.next() else {
            return kurbo::Rect::ZERO;
        };
        points.fold(kurbo::Rect::from_points(first.to_kurbo(), first.to_kurbo()), |r, p| {
            r.union_pt(p.to_kurbo())
        })
    }

    fn classify(&self, pt: Point) -> Containment {
        point_in_ring(pt, cyclic_pairs(&self.points))
    }

    fn append_to(&self, path: &mut kurbo::BezPath) {
        let mut points = self.points.iter();
        if let Some(first) = points.next() {
            path.move_to(first.to_kurbo());
            for p in points {
                path.line_to(p.to_kurbo());
            }
            path.close_path();
        }
    }
}

/// A connected piece of the output: an outline together with the holes in it.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Shape {
    /// The outer boundary.
    pub outline: Contour,
    /// The holes, if any. Every hole is inside the outline, and the holes don't overlap.
    pub holes: Vec<Contour>,
}

impl Shape {
    /// Is `pt` in this shape?
    ///
    /// Points on the boundary count as being in the shape.
    pub fn contains(&self, pt: Point) -> bool {
        let mut inside = false;
        for c in std::iter::once(&self.outline).chain(&self.holes) {
            match c.classify(pt) {
                Containment::Boundary => return true,
                Containment::Inside => inside = !inside,
                Containment::Outside => {}
            }
        }
        inside
    }

    /// Converts this shape to a path, with one closed subpath per contour.
    pub fn to_bez_path(&self) -> kurbo::BezPath {
        let mut path = kurbo::BezPath::new();
        self.outline.append_to(&mut path);
        for h in &self.holes {
            h.append_to(&mut path);
        }
        path
    }

    /// The total area of this shape.
    pub fn area(&self) -> f64 {
        self.outline.signed_area() + self.holes.iter().map(Contour::signed_area).sum::<f64>()
    }
}
