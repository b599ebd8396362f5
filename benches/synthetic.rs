use criterion::{black_box, criterion_group, criterion_main, Criterion};

use polycarve::{
    generators::{checkerboard, slanted_checkerboard, slanties, target},
    Clipper, ClipOptions, Point, PolyType,
};

type Contours = Vec<Vec<Point>>;

fn clipper_for((subjects, clips): (Contours, Contours), options: ClipOptions) -> Clipper {
    let mut clipper = Clipper::with_options(options);
    clipper.add(subjects, PolyType::Subject).unwrap();
    clipper.add(clips, PolyType::Clip).unwrap();
    clipper
}

fn add_contours(c: &mut Criterion) {
    let (subjects, clips) = checkerboard(10);

    c.bench_function("add contours", |b| {
        b.iter(|| {
            let mut clipper = Clipper::new();
            clipper.add(subjects.iter().cloned(), PolyType::Subject).unwrap();
            clipper.add(clips.iter().cloned(), PolyType::Clip).unwrap();
            black_box(clipper)
        })
    });
}

fn carve(c: &mut Criterion) {
    let inputs = [
        ("checkerboard", checkerboard(10)),
        ("slanted checkerboard", slanted_checkerboard(10)),
        ("slanties", slanties(10)),
        ("target", target(20)),
    ];

    for (name, input) in inputs {
        let clipper = clipper_for(input, ClipOptions::default());
        c.bench_function(&format!("carve {name}"), |b| {
            b.iter(|| black_box(clipper.execute()))
        });
    }
}

fn carve_strictly_simple(c: &mut Criterion) {
    let options = ClipOptions {
        strictly_simple: true,
        ..ClipOptions::default()
    };
    let clipper = clipper_for(checkerboard(10), options);

    c.bench_function("carve checkerboard, strictly simple", |b| {
        b.iter(|| black_box(clipper.execute()))
    });
}

fn tree_only(c: &mut Criterion) {
    let clipper = clipper_for(target(20), ClipOptions::default());

    c.bench_function("carve target, unflattened", |b| {
        b.iter(|| black_box(clipper.execute_tree()))
    });
}

criterion_group!(benches, add_contours, carve, carve_strictly_simple, tree_only);
criterion_main!(benches);
