use std::path::PathBuf;

use clap::Parser;
use svg::Document;

use polycarve::{generators, ClipOptions, Clipper, Point, PolyType, Shape};

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum Example {
    Checkerboard,
    SlantedCheckerboard,
    Slanties,
    Target,
}

#[derive(Parser)]
struct Cli {
    #[arg(long)]
    output: PathBuf,

    #[arg(long, value_enum)]
    example: Example,

    #[arg(long, default_value_t = 5)]
    size: usize,

    #[arg(long)]
    strictly_simple: bool,

    #[arg(long)]
    preserve_collinear: bool,
}

type Contours = Vec<Vec<Point>>;

fn get_contours(example: Example, size: usize) -> (Contours, Contours) {
    match example {
        Example::Checkerboard => generators::checkerboard(size),
        Example::SlantedCheckerboard => generators::slanted_checkerboard(size),
        Example::Slanties => generators::slanties(size),
        Example::Target => generators::target(size),
    }
}

fn bounds<'a>(points: impl Iterator<Item = &'a Point>) -> kurbo::Rect {
    points.fold(kurbo::Rect::new(0.0, 0.0, 0.0, 0.0), |r, p| {
        r.union_pt(p.to_kurbo())
    })
}

pub fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();
    let (subjects, clips) = get_contours(args.example, args.size);

    let mut clipper = Clipper::with_options(ClipOptions {
        strictly_simple: args.strictly_simple,
        preserve_collinear: args.preserve_collinear,
    });
    clipper.add(subjects.iter().cloned(), PolyType::Subject)?;
    clipper.add(clips.iter().cloned(), PolyType::Clip)?;
    let shapes = clipper.execute()?;
    log::info!("carved {} shapes", shapes.len());

    let bbox = bounds(subjects.iter().chain(&clips).flatten());
    let pad = 1.0;
    let one_width = bbox.width() + 2.0 * pad;
    let one_height = bbox.height() + 2.0 * pad;
    let stroke_width = bbox.width().max(bbox.height()) / 512.0;
    let mut document = svg::Document::new().set(
        "viewBox",
        (bbox.x0 - pad, bbox.y0 - pad, one_width * 2.0, one_height),
    );

    // Draw the input on the left.
    for (contours, color) in [(&subjects, "black"), (&clips, "red")] {
        for c in contours {
            let Some(p) = c.first() else {
                continue;
            };
            let mut data = svg::node::element::path::Data::new();
            data = data.move_to((p.x, p.y));
            for p in &c[1..] {
                data = data.line_to((p.x, p.y));
            }
            data = data.close();

            let path = svg::node::element::Path::new()
                .set("stroke", color)
                .set("stroke-width", stroke_width)
                .set("stroke-linecap", "round")
                .set("stroke-linejoin", "round")
                .set("opacity", 0.5)
                .set("fill", "none")
                .set("d", data);
            document = document.add(path);
        }
    }

    // And the output on the right.
    document = add_shapes(document, &shapes, one_width, stroke_width);

    svg::save(&args.output, &document)?;

    Ok(())
}

fn add_shapes(mut doc: Document, shapes: &[Shape], x_off: f64, stroke_width: f64) -> Document {
    let colors = [
        "#005F73", "#0A9396", "#94D2BD", "#E9D8A6", "#EE9B00", "#CA6702", "#BB3E03", "#AE2012",
        "#9B2226",
    ];

    for (shape, color) in shapes.iter().zip(colors.iter().cycle()) {
        let mut data = svg::node::element::path::Data::new();

        for contour in std::iter::once(&shape.outline).chain(&shape.holes) {
            let mut points = contour.points().iter();
            let Some(p) = points.next() else {
                continue;
            };

            data = data.move_to((p.x + x_off, p.y));
            for p in points {
                data = data.line_to((p.x + x_off, p.y));
            }
            data = data.close();
        }
        let path = svg::node::element::Path::new()
            .set("d", data)
            .set("stroke", "black")
            .set("stroke-width", stroke_width)
            .set("stroke-linecap", "round")
            .set("stroke-linejoin", "round")
            .set("fill-rule", "evenodd")
            .set("fill", *color);
        doc = doc.add(path);
    }
    doc
}
