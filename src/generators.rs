//! Utilities for generating examples, benchmarks, and test cases.
//!
//! Every generator returns a pair of contour collections, meant to be used as
//! the subject and the clip of a [`Clipper`](crate::Clipper).

use crate::Point;

type Contours = Vec<Vec<Point>>;

/// Generate a bunch of squares, arranged in a grid.
///
/// The top-left of the first square is at (x0, y0). Each square has size `size
/// x size`, and the distance between squares (both horizontally and vertically)
/// is `offset`.
///
/// If `slant` is non-zero, generates parallelograms instead of squares: the
/// right-hand side of each square gets translated down by `slant`.
fn squares((x0, y0): (f64, f64), size: f64, offset: f64, slant: f64, count: usize) -> Contours {
    let mut ret = Vec::new();
    for i in 0..count {
        let x = x0 + i as f64 * offset;
        for j in 0..count {
            let y = y0 + j as f64 * offset;
            ret.push(vec![
                Point::new(x, y),
                Point::new(x + size, y + slant),
                Point::new(x + size, y + size + slant),
                Point::new(x, y + size),
            ]);
        }
    }

    ret
}

/// Generate an `n` by `n` checkerboard-like pattern with overlapping squares.
/// For `n = 3`, it looks like:
///
/// ```text
/// ┌────┐ ┌────┐ ┌────┐
/// │    │ │    │ │    │
/// │  ┌─┼─┼─┐┌─┼─┼─┐  │
/// └──┼─┘ └─┼┼─┘ └─┼──┘
/// ┌──┼─┐ ┌─┼┼─┐ ┌─┼──┐
/// │  └─┼─┼─┘└─┼─┼─┘  │
/// │  ┌─┼─┼─┐┌─┼─┼─┐  │
/// └──┼─┘ └─┼┼─┘ └─┼──┘
/// ┌──┼─┐ ┌─┼┼─┐ ┌─┼──┐
/// │  └─┼─┼─┘└─┼─┼─┘  │
/// │    │ │    │ │    │
/// └────┘ └────┘ └────┘
/// ```
///
/// The subject is the outer collection of `n x n` non-overlapping squares, and
/// the clip is the inner collection of `(n - 1) x (n - 1)` non-overlapping
/// squares, so carving the clip out of the subject leaves every outer square
/// with its corners bitten off.
pub fn checkerboard(n: usize) -> (Contours, Contours) {
    (
        squares((0.0, 0.0), 30.0, 40.0, 0.0, n),
        squares((20.0, 20.0), 30.0, 40.0, 0.0, n.saturating_sub(1)),
    )
}

/// Like `checkerboard`, but with no exactly-horizontal lines.
///
/// Horizontal lines have special handling in the sweep-line algorithm, so
/// their presence or absence can affect performance.
pub fn slanted_checkerboard(n: usize) -> (Contours, Contours) {
    (
        squares((0.0, 0.0), 30.0, 40.0, 1.0, n),
        squares((20.0, 20.0), 30.0, 40.0, 1.0, n.saturating_sub(1)),
    )
}

/// The subjects are a bunch of long, skinny parallelograms going from top-left
/// to bottom-right. The clips go from top-right to bottom-left, so every
/// subject crosses every clip.
pub fn slanties(n: usize) -> (Contours, Contours) {
    let h = 20.0 * n as f64;

    let mut subjects = Vec::new();
    let mut clips = Vec::new();
    for i in 0..n {
        let x_off = 20.0 * i as f64;
        subjects.push(vec![
            Point::new(x_off, 0.0),
            Point::new(x_off + h, h),
            Point::new(x_off + h + 10.0, h),
            Point::new(x_off + 10.0, 0.0),
        ]);

        clips.push(vec![
            Point::new(x_off + h, 0.0),
            Point::new(x_off, h),
            Point::new(x_off + 10.0, h),
            Point::new(x_off + h + 10.0, 0.0),
        ]);
    }

    (subjects, clips)
}

/// `n` concentric square frames, alternating between subject and clip.
///
/// Both collections are filled even-odd, so the carved result keeps every
/// fourth ring: an outer frame, an island inside its hole, a frame inside that
/// island's hole, and so on. For large `n` this nests deeply.
pub fn target(n: usize) -> (Contours, Contours) {
    let mut subjects = Vec::new();
    let mut clips = Vec::new();
    for i in 0..n {
        let inset = 10.0 * i as f64;
        let size = 20.0 * n as f64 - 2.0 * inset;
        let square = squares((inset, inset), size, 0.0, 0.0, 1);
        if i % 2 == 0 {
            subjects.extend(square);
        } else {
            clips.extend(square);
        }
    }
    (subjects, clips)
}
