//! Utilities for fuzz and/or property testing using `arbitrary`.
//!
//! Random contours with coordinates drawn from the whole real line almost
//! never have coincident vertices or collinear edges, and those are exactly
//! the cases that the sweep finds hardest. So the generators here draw most
//! coordinates from a small grid, and give each new point a chance to share
//! a coordinate with the previous one.

use arbitrary::Unstructured;

use crate::{AlgorithmFailure, ClipOptions, Clipper, Error, Point, PolyType};

/// Generate an arbitrary float in some range.
pub fn float_in_range(
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let num: u32 = u.arbitrary()?;
    let t = num as f64 / u32::MAX as f64;
    Ok((1.0 - t) * start + t * end)
}

/// Generate a coordinate, usually (but not always) an integer in `[-size, size]`.
fn coord(size: f64, u: &mut Unstructured<'_>) -> Result<f64, arbitrary::Error> {
    if u.ratio(7u8, 8u8)? {
        let size = size as i32;
        Ok(f64::from(u.int_in_range(-size..=size)?))
    } else {
        float_in_range(-size, size, u)
    }
}

/// Generate a coordinate that has a chance to be equal to `orig`.
fn another_coord(orig: f64, size: f64, u: &mut Unstructured<'_>) -> Result<f64, arbitrary::Error> {
    if u.ratio(1u8, 4u8)? {
        Ok(orig)
    } else {
        coord(size, u)
    }
}

/// Generate an arbitrary point with coordinates of roughly the scale `size`.
pub fn point(size: f64, u: &mut Unstructured<'_>) -> Result<Point, arbitrary::Error> {
    Ok(Point::new(coord(size, u)?, coord(size, u)?))
}

/// Generate an arbitrary closed contour, with between 3 and `max_len` points.
///
/// The contour is allowed to intersect itself, and to have repeated or
/// collinear points.
pub fn contour(
    size: f64,
    max_len: usize,
    u: &mut Unstructured<'_>,
) -> Result<Vec<Point>, arbitrary::Error> {
    let len = u.int_in_range(3..=max_len.max(3))?;
    let mut ret = vec![point(size, u)?];
    while ret.len() < len {
        let prev = ret[ret.len() - 1];
        ret.push(Point::new(
            another_coord(prev.x, size, u)?,
            another_coord(prev.y, size, u)?,
        ));
    }
    Ok(ret)
}

/// Generate a collection of contours.
pub fn contours(
    size: f64,
    max_count: usize,
    u: &mut Unstructured<'_>,
) -> Result<Vec<Vec<Point>>, arbitrary::Error> {
    let count = u.int_in_range(0..=max_count)?;
    (0..count).map(|_| contour(size, 8, u)).collect()
}

/// Generate a subject and a clip.
pub fn clip_input(
    u: &mut Unstructured<'_>,
) -> Result<(Vec<Vec<Point>>, Vec<Vec<Point>>), arbitrary::Error> {
    let size = float_in_range(4.0, 1000.0, u)?.round();
    Ok((contours(size, 4, u)?, contours(size, 4, u)?))
}

/// Carves arbitrary input with arbitrary options, and checks that the output
/// follows the output conventions: outlines are positively oriented, holes
/// are negatively oriented, and every hole is inside its outline.
///
/// Rejected input contours are skipped. Panics if the sweep fails in a way
/// that indicates a bug, rather than numerical trouble.
pub fn carve_conventions(u: &mut Unstructured<'_>) -> Result<(), arbitrary::Error> {
    let (subjects, clips) = clip_input(u)?;
    let mut clipper = Clipper::with_options(ClipOptions {
        strictly_simple: u.arbitrary()?,
        preserve_collinear: u.arbitrary()?,
    });
    for c in subjects {
        let _ = clipper.add_path(c, PolyType::Subject);
    }
    for c in clips {
        let _ = clipper.add_path(c, PolyType::Clip);
    }

    let shapes = match clipper.execute() {
        Ok(shapes) => shapes,
        Err(Error::AlgorithmFailure(AlgorithmFailure::IntersectionOrder { .. })) => {
            return Ok(())
        }
        Err(e) => panic!("{e}"),
    };
    for shape in shapes {
        assert!(shape.outline.len() >= 3);
        assert!(shape.outline.signed_area() >= 0.0);
        let bbox = shape.outline.bounding_box();
        for hole in &shape.holes {
            assert!(hole.len() >= 3);
            assert!(hole.signed_area() <= 0.0);
            assert_eq!(bbox.union(hole.bounding_box()), bbox);
        }
    }
    Ok(())
}
