#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

#[macro_use]
mod typed_vec;

#[cfg(any(test, feature = "arbitrary"))]
pub mod arbitrary;
mod clipper;
mod edge;
mod geom;
mod join;
mod num;
mod outrec;
mod shape;
mod sweep;
pub mod tree;

#[cfg(feature = "generators")]
pub mod generators;

pub use clipper::{Clipper, SourceId};
pub use geom::{signed_area, Point, MAX_COORD};
pub use shape::{Contour, Shape};
pub use tree::PolyTree;

/// Which of the two input sets a contour belongs to.
///
/// The result of a clip is everything covered by an odd number of subject
/// contours and by an even number of clip contours.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize)]
pub enum PolyType {
    /// The shape being carved.
    Subject,
    /// The shape being carved out.
    Clip,
}

/// Knobs for a [`Clipper`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct ClipOptions {
    /// If set, no output contour touches itself: a contour that would pinch at
    /// a vertex is split into two contours there.
    pub strictly_simple: bool,
    /// If set, collinear vertices are kept (both in the input and the output).
    /// Only repeated points and spikes are removed.
    pub preserve_collinear: bool,
}

/// A contour was rejected when it was added.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InvalidInput {
    /// After removing repeated and collinear points, there weren't enough left
    /// to enclose any area.
    TooFewPoints {
        /// How many distinct points were left.
        distinct: usize,
    },
    /// All the points were at the same height.
    Flat,
    /// One of the coordinates was infinite or NaN.
    NonFinite,
    /// One of the coordinates was larger in magnitude than [`MAX_COORD`].
    OutOfRange,
}

/// The sweep reached a state it can't make sense of.
///
/// These mostly come from floating-point trouble with nearly-coincident
/// edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AlgorithmFailure {
    /// The crossings found in a scanbeam couldn't be ordered so that each one
    /// happens between neighboring edges.
    IntersectionOrder {
        /// The top of the offending scanbeam.
        y: f64,
    },
    /// Two edges meeting at a local maximum disagreed about whether they were
    /// producing output.
    MaximaPair {
        /// The maximum.
        at: Point,
    },
    /// An edge was advanced past the end of its bound.
    BoundOverrun,
}

/// The error type of this crate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Error {
    /// One of the input contours was no good.
    InvalidInput(InvalidInput),
    /// Clipping failed.
    AlgorithmFailure(AlgorithmFailure),
}

impl From<InvalidInput> for Error {
    fn from(e: InvalidInput) -> Self {
        Error::InvalidInput(e)
    }
}

impl From<AlgorithmFailure> for Error {
    fn from(e: AlgorithmFailure) -> Self {
        Error::AlgorithmFailure(e)
    }
}

impl std::fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidInput::TooFewPoints { distinct } => {
                write!(f, "a contour had only {distinct} distinct points")
            }
            InvalidInput::Flat => write!(f, "a contour was completely flat"),
            InvalidInput::NonFinite => write!(f, "a contour had an infinite or NaN coordinate"),
            InvalidInput::OutOfRange => {
                write!(f, "a contour had a coordinate larger than {MAX_COORD:e}")
            }
        }
    }
}

impl std::fmt::Display for AlgorithmFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlgorithmFailure::IntersectionOrder { y } => {
                write!(f, "failed to order the intersections below y = {y}")
            }
            AlgorithmFailure::MaximaPair { at } => {
                write!(f, "inconsistent edges at the local maximum {at:?}")
            }
            AlgorithmFailure::BoundOverrun => write!(f, "an edge ran past the end of its bound"),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidInput(e) => write!(f, "invalid input: {e}"),
            Error::AlgorithmFailure(e) => write!(f, "clipping failed: {e}"),
        }
    }
}

impl std::error::Error for InvalidInput {}
impl std::error::Error for AlgorithmFailure {}
impl std::error::Error for Error {}

/// Carves the clip contours out of the subject contours.
///
/// This is a shortcut for adding everything to a default [`Clipper`] and
/// executing it.
pub fn carve<S, C, P, Q>(subjects: S, clips: C) -> Result<Vec<Shape>, Error>
where
    S: IntoIterator,
    S::Item: IntoIterator<Item = P>,
    P: Into<Point>,
    C: IntoIterator,
    C::Item: IntoIterator<Item = Q>,
    Q: Into<Point>,
{
    let mut clipper = Clipper::new();
    clipper.add(subjects, PolyType::Subject)?;
    clipper.add(clips, PolyType::Clip)?;
    clipper.execute()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn errors_display() {
        let e = Error::from(InvalidInput::TooFewPoints { distinct: 2 });
        assert_eq!(
            e.to_string(),
            "invalid input: a contour had only 2 distinct points"
        );
        let e = Error::from(AlgorithmFailure::IntersectionOrder { y: 3.0 });
        assert_eq!(
            e.to_string(),
            "clipping failed: failed to order the intersections below y = 3"
        );
        assert_eq!(
            Error::from(InvalidInput::OutOfRange).to_string(),
            "invalid input: a contour had a coordinate larger than 1e150"
        );
    }

    #[test]
    fn carve_squares() {
        let subject = vec![vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]];
        let clip = vec![vec![(5.0, -5.0), (15.0, -5.0), (15.0, 5.0), (5.0, 5.0)]];
        let shapes = carve(subject, clip).unwrap();
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].holes.is_empty());
        assert_eq!(shapes[0].outline.len(), 6);
        assert!(shapes[0].contains(Point::new(2.0, 2.0)));
        assert!(!shapes[0].contains(Point::new(7.0, 2.0)));
        assert!(shapes[0].contains(Point::new(7.0, 7.0)));
    }

    #[test]
    fn carve_rejects_degenerate() {
        let subject = vec![vec![(0.0, 0.0), (10.0, 0.0)]];
        let clip: Vec<Vec<(f64, f64)>> = vec![];
        assert_matches!(
            carve(subject, clip),
            Err(Error::InvalidInput(InvalidInput::TooFewPoints { distinct: 2 }))
        );
    }
}
