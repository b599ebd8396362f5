//! The public entry point: collecting contours and running the sweep over them.

use std::sync::Arc;

use crate::edge::{add_ring, clean_ring, Edge, EdgeVec, LocalMinimum};
use crate::geom::Point;
use crate::shape::Shape;
use crate::sweep::ClipContext;
use crate::tree::PolyTree;
use crate::{ClipOptions, Error, InvalidInput, PolyType};

typed_vec!(
    /// Identifies a contour that was added to a [`Clipper`].
    pub SourceVec,
    SourceId,
    "src"
);

/// Carves clip contours out of subject contours.
///
/// Add contours with [`Clipper::add_path`] (or one of its variants), and then
/// call [`Clipper::execute`]. The result covers every point that's inside an
/// odd number of subject contours and an even number of clip contours.
///
/// A `Clipper` can be executed any number of times, and more contours can be
/// added between executions.
#[derive(Clone, Debug, Default)]
pub struct Clipper {
    edges: EdgeVec<Edge>,
    minima: Vec<LocalMinimum>,
    sources: SourceVec<Arc<[Point]>>,
    options: ClipOptions,
}

impl Clipper {
    /// Creates a new `Clipper` with the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `Clipper` with some custom options.
    pub fn with_options(options: ClipOptions) -> Self {
        Clipper {
            options,
            ..Self::default()
        }
    }

    /// The options this `Clipper` was created with.
    pub fn options(&self) -> ClipOptions {
        self.options
    }

    /// Adds a closed contour.
    ///
    /// The last point connects back to the first one, so there's no need to
    /// repeat it. If the contour can't enclose any area (for example, because
    /// it has fewer than three distinct points or they're all collinear), it
    /// is rejected and nothing gets added.
    pub fn add_path(
        &mut self,
        points: impl IntoIterator<Item = impl Into<Point>>,
        poly_type: PolyType,
    ) -> Result<SourceId, Error> {
        let points: Arc<[Point]> = points.into_iter().map(Into::into).collect();
        self.add_contour(points, poly_type)
    }

    /// Adds a closed contour that's already in an `Arc`.
    ///
    /// If the contour makes it through the clip operation untouched, the output
    /// will contain a clone of this same `Arc`.
    pub fn add_contour(
        &mut self,
        points: Arc<[Point]>,
        poly_type: PolyType,
    ) -> Result<SourceId, Error> {
        let ring = clean_ring(&points, self.options.preserve_collinear)?;
        Ok(self.commit(ring, points, poly_type))
    }

    /// Adds a collection of closed contours.
    ///
    /// Either all of them get added, or (if any of them is rejected) none.
    pub fn add<P: Into<Point>>(
        &mut self,
        contours: impl IntoIterator<Item = impl IntoIterator<Item = P>>,
        poly_type: PolyType,
    ) -> Result<Vec<SourceId>, Error> {
        let cleaned = contours
            .into_iter()
            .map(|c| {
                let points: Arc<[Point]> = c.into_iter().map(Into::into).collect();
                let ring = clean_ring(&points, self.options.preserve_collinear)?;
                Ok((ring, points))
            })
            .collect::<Result<Vec<_>, InvalidInput>>()?;

        Ok(cleaned
            .into_iter()
            .map(|(ring, points)| self.commit(ring, points, poly_type))
            .collect())
    }

    /// Flattens a Bézier path into closed contours, and adds them all.
    ///
    /// Every subpath is treated as closed, whether or not it ends with a
    /// `ClosePath`. Curves are approximated to within `tolerance`.
    pub fn add_bez_path(
        &mut self,
        path: &kurbo::BezPath,
        poly_type: PolyType,
        tolerance: f64,
    ) -> Result<Vec<SourceId>, Error> {
        let mut rings = Vec::new();
        let mut points = Vec::<Point>::new();
        kurbo::flatten(path, tolerance, |el| match el {
            kurbo::PathEl::MoveTo(p) => {
                if points.len() > 1 {
                    rings.push(std::mem::take(&mut points));
                }
                points.clear();
                points.push(p.into());
            }
            kurbo::PathEl::LineTo(p) => {
                points.push(p.into());
            }
            kurbo::PathEl::ClosePath => {
                let first = points.first().copied();
                if points.len() > 1 {
                    rings.push(std::mem::take(&mut points));
                }
                points.clear();
                // A subpath that keeps going after a close starts where the last one started.
                points.extend(first);
            }
            kurbo::PathEl::QuadTo(..) | kurbo::PathEl::CurveTo(..) => {}
        });
        if points.len() > 1 {
            rings.push(points);
        }
        self.add(rings, poly_type)
    }

    /// The contour that was added under the id `id`, exactly as it was given.
    pub fn source(&self, id: SourceId) -> &Arc<[Point]> {
        &self.sources[id]
    }

    /// Removes all the contours.
    pub fn clear(&mut self) {
        self.edges = EdgeVec::default();
        self.minima.clear();
        self.sources = SourceVec::default();
    }

    fn commit(&mut self, ring: Vec<Point>, original: Arc<[Point]>, poly_type: PolyType) -> SourceId {
        let id = self.sources.push(original);
        let minima = add_ring(&mut self.edges, &ring, poly_type, id);
        log::trace!(
            "added {poly_type:?} contour {id:?} with {} edges and {} local minima",
            ring.len(),
            minima.len()
        );
        self.minima.extend(minima);
        id
    }

    fn run(&self) -> Result<ClipContext, Error> {
        let mut ctx = ClipContext::new(self.edges.clone(), self.minima.clone(), self.options);
        if let Err(e) = ctx.execute() {
            log::debug!("clip failed: {e}");
            return Err(e.into());
        }
        Ok(ctx)
    }

    /// Runs the clip operation, returning the result as a tree of nested contours.
    pub fn execute_tree(&self) -> Result<PolyTree, Error> {
        let ctx = self.run()?;
        let tree = PolyTree::build(&ctx, &self.sources);
        log::debug!("clip produced {} contours", tree.len());
        Ok(tree)
    }

    /// Runs the clip operation.
    ///
    /// The result is a list of shapes, each with one outer contour and any
    /// number of holes. Islands inside holes come out as separate shapes.
    /// Outer contours have positive [signed area](crate::signed_area), and
    /// holes have negative signed area.
    pub fn execute(&self) -> Result<Vec<Shape>, Error> {
        Ok(self.execute_tree()?.flatten())
    }
}
