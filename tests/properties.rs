use proptest::prelude::*;

use polycarve::{carve, ClipOptions, Clipper, Error, Point, PolyType, Shape};

const GRID: i32 = 24;

#[derive(Clone, Copy, Debug)]
struct Rect {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl Rect {
    fn contour(&self) -> Vec<(f64, f64)> {
        let (x0, y0, x1, y1) = (
            f64::from(self.x0),
            f64::from(self.y0),
            f64::from(self.x1),
            f64::from(self.y1),
        );
        vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
    }

    fn contains_cell(&self, i: i32, j: i32) -> bool {
        self.x0 <= i && i < self.x1 && self.y0 <= j && j < self.y1
    }
}

fn rect() -> impl Strategy<Value = Rect> {
    (0..16, 0..16, 1..9, 1..9).prop_map(|(x0, y0, w, h)| Rect {
        x0,
        y0,
        x1: x0 + w,
        y1: y0 + h,
    })
}

fn rects() -> impl Strategy<Value = Vec<Rect>> {
    prop::collection::vec(rect(), 0..5)
}

/// Is the unit cell with top-left corner `(i, j)` in the carved region?
fn in_model(subjects: &[Rect], clips: &[Rect], i: i32, j: i32) -> bool {
    let count = |rs: &[Rect]| rs.iter().filter(|r| r.contains_cell(i, j)).count();
    count(subjects) % 2 == 1 && count(clips) % 2 == 0
}

fn crossings(shapes: &[Shape], y: f64) -> usize {
    shapes
        .iter()
        .flat_map(|s| std::iter::once(&s.outline).chain(&s.holes))
        .map(|c| {
            let pts = c.points();
            (0..pts.len())
                .filter(|&i| {
                    let p = pts[i];
                    let q = pts[(i + 1) % pts.len()];
                    p.y != q.y && p.y.min(q.y) < y && y <= p.y.max(q.y)
                })
                .count()
        })
        .sum()
}

/// Even-odd containment in a single input contour.
fn in_contour(contour: &[(i32, i32)], (x, y): (f64, f64)) -> bool {
    let mut inside = false;
    for (i, &(x0, y0)) in contour.iter().enumerate() {
        let (x1, y1) = contour[(i + 1) % contour.len()];
        let (x0, y0, x1, y1) = (f64::from(x0), f64::from(y0), f64::from(x1), f64::from(y1));
        if (y0 > y) != (y1 > y) && x < x0 + (y - y0) * (x1 - x0) / (y1 - y0) {
            inside = !inside;
        }
    }
    inside
}

fn integer_contours() -> impl Strategy<Value = Vec<Vec<(i32, i32)>>> {
    prop::collection::vec(prop::collection::vec((-20i32..20, -20i32..20), 3..7), 0..4)
}

fn clip_options() -> impl Strategy<Value = ClipOptions> {
    (any::<bool>(), any::<bool>()).prop_map(|(strictly_simple, preserve_collinear)| ClipOptions {
        strictly_simple,
        preserve_collinear,
    })
}

fn carve_or_skip(
    subjects: impl IntoIterator<Item = Vec<(f64, f64)>>,
    clips: impl IntoIterator<Item = Vec<(f64, f64)>>,
) -> Option<Vec<Shape>> {
    match carve(subjects, clips) {
        Ok(shapes) => Some(shapes),
        Err(Error::AlgorithmFailure(e)) => {
            log::warn!("skipping input: {e}");
            None
        }
        Err(e) => panic!("unexpected error {e}"),
    }
}

fn check_conventions(shapes: &[Shape]) -> Result<(), TestCaseError> {
    for s in shapes {
        prop_assert!(s.outline.len() >= 3);
        prop_assert!(s.outline.signed_area() > 0.0);
        let bbox = s.outline.bounding_box();
        for h in &s.holes {
            prop_assert!(h.len() >= 3);
            prop_assert!(h.signed_area() < 0.0);
            prop_assert_eq!(bbox.union(h.bounding_box()), bbox);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn rectangles_match_grid_model(subjects in rects(), clips in rects()) {
        let _ = env_logger::builder().is_test(true).try_init();
        let Some(shapes) = carve_or_skip(
            subjects.iter().map(Rect::contour),
            clips.iter().map(Rect::contour),
        ) else {
            return Ok(());
        };
        check_conventions(&shapes)?;

        let mut expected_area = 0.0;
        for i in 0..GRID {
            for j in 0..GRID {
                let expected = in_model(&subjects, &clips, i, j);
                if expected {
                    expected_area += 1.0;
                }
                let center = Point::new(f64::from(i) + 0.5, f64::from(j) + 0.5);
                let hits = shapes.iter().filter(|s| s.contains(center)).count();
                prop_assert_eq!(hits, usize::from(expected), "cell ({}, {})", i, j);
            }
        }

        let area: f64 = shapes.iter().map(Shape::area).sum();
        prop_assert_eq!(area, expected_area);
    }

    #[test]
    fn crossings_are_even(
        subjects in prop::collection::vec(prop::collection::vec((-50i32..50, -50i32..50), 3..7), 0..4),
        clips in prop::collection::vec(prop::collection::vec((-50i32..50, -50i32..50), 3..7), 0..4),
        y in -60i32..60,
    ) {
        let _ = env_logger::builder().is_test(true).try_init();
        let to_f64 = |cs: Vec<Vec<(i32, i32)>>| -> Vec<Vec<(f64, f64)>> {
            cs.into_iter()
                .map(|c| c.into_iter().map(|(x, y)| (f64::from(x), f64::from(y))).collect())
                .collect()
        };

        let mut clipper = Clipper::new();
        for c in to_f64(subjects) {
            // Degenerate contours are allowed to fail; the rest should still work.
            let _ = clipper.add_path(c, PolyType::Subject);
        }
        for c in to_f64(clips) {
            let _ = clipper.add_path(c, PolyType::Clip);
        }
        let shapes = match clipper.execute() {
            Ok(shapes) => shapes,
            Err(Error::AlgorithmFailure(_)) => return Ok(()),
            Err(e) => panic!("unexpected error {e}"),
        };

        prop_assert_eq!(crossings(&shapes, f64::from(y) + 0.25) % 2, 0);
        prop_assert_eq!(crossings(&shapes, f64::from(y)) % 2, 0);
    }

    #[test]
    fn coverage_matches_even_odd(
        subjects in integer_contours(),
        clips in integer_contours(),
        options in clip_options(),
        stretch in prop::sample::select(vec![1.0, 2f64.powi(130)]),
    ) {
        let _ = env_logger::builder().is_test(true).try_init();
        // Scaling x by a power of two is exact, so stretching shouldn't change anything.
        let to_f64 = |cs: &[Vec<(i32, i32)>]| -> Vec<Vec<(f64, f64)>> {
            cs.iter()
                .map(|c| c.iter().map(|&(x, y)| (f64::from(x) * stretch, f64::from(y))).collect())
                .collect()
        };

        let mut clipper = Clipper::with_options(options);
        for c in to_f64(&subjects) {
            let _ = clipper.add_path(c, PolyType::Subject);
        }
        for c in to_f64(&clips) {
            let _ = clipper.add_path(c, PolyType::Clip);
        }
        let shapes = match clipper.execute() {
            Ok(shapes) => shapes,
            Err(Error::AlgorithmFailure(_)) => return Ok(()),
            Err(e) => panic!("unexpected error {e}"),
        };
        check_conventions(&shapes)?;

        // The offsets keep the samples away from every line through two grid points.
        for i in 0..82 {
            for j in 0..82 {
                let pt = (-20.5 + 0.5 * f64::from(i) + 0.0123, -20.5 + 0.5 * f64::from(j) + 0.0371);
                let subject_count = subjects.iter().filter(|c| in_contour(c, pt)).count();
                let clip_count = clips.iter().filter(|c| in_contour(c, pt)).count();
                let expected = subject_count % 2 == 1 && clip_count % 2 == 0;
                let hits = shapes
                    .iter()
                    .filter(|s| s.contains(Point::new(pt.0 * stretch, pt.1)))
                    .count();
                prop_assert_eq!(hits, usize::from(expected), "at {:?}", pt);
            }
        }
    }
}
