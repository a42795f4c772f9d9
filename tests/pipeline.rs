//! End-to-end pipeline tests on a small measurement sample.

use std::sync::Arc;

use layerplot::data::FrameSchema;
use layerplot::geom::{Geom, GeomBar, Position};
use layerplot::grob::Grob;
use layerplot::stat::Stat;
use layerplot::{AesMapping, DataFrame, Faceting, Layer, Plot, StringPool};

struct Obs {
    age: i64,
    origin: &'static str,
    weight: f64,
    height: f64,
}

impl Obs {
    fn bmi(&self) -> f64 {
        self.weight / (self.height * self.height)
    }

    fn group(&self) -> i64 {
        10 * (self.age / 10) + 5
    }
}

#[rustfmt::skip]
fn measurements() -> Vec<Obs> {
    vec![
        Obs { age: 20, origin: "de", weight: 80.0, height: 1.88 },
        Obs { age: 22, origin: "de", weight: 85.0, height: 1.85 },
        Obs { age: 20, origin: "de", weight: 90.0, height: 1.95 },
        Obs { age: 25, origin: "de", weight: 90.0, height: 1.72 },
        Obs { age: 20, origin: "ch", weight: 77.0, height: 1.78 },
        Obs { age: 20, origin: "ch", weight: 82.0, height: 1.75 },
        Obs { age: 28, origin: "ch", weight: 85.0, height: 1.80 },
        Obs { age: 20, origin: "ch", weight: 84.0, height: 1.62 },
        Obs { age: 31, origin: "de", weight: 85.0, height: 1.88 },
        Obs { age: 30, origin: "de", weight: 90.0, height: 1.85 },
        Obs { age: 30, origin: "de", weight: 99.0, height: 1.95 },
        Obs { age: 42, origin: "de", weight: 95.0, height: 1.72 },
        Obs { age: 30, origin: "ch", weight: 80.0, height: 1.78 },
        Obs { age: 30, origin: "ch", weight: 85.0, height: 1.75 },
        Obs { age: 37, origin: "ch", weight: 87.0, height: 1.80 },
        Obs { age: 47, origin: "ch", weight: 90.0, height: 1.62 },
        Obs { age: 42, origin: "uk", weight: 60.0, height: 1.68 },
        Obs { age: 42, origin: "uk", weight: 65.0, height: 1.65 },
        Obs { age: 44, origin: "uk", weight: 55.0, height: 1.52 },
        Obs { age: 44, origin: "uk", weight: 70.0, height: 1.72 },
    ]
}

fn schema() -> FrameSchema<Obs> {
    FrameSchema::new("measurements")
        .int("Age", |o: &Obs| o.age)
        .str_("Origin", |o| o.origin.to_string())
        .float("Weight", |o| o.weight)
        .float("Height", |o| o.height)
        .float("BMI", |o| o.bmi())
        .int("Group", |o| o.group())
}

fn sample_frame() -> DataFrame {
    let _ = env_logger::builder().is_test(true).try_init();
    let pool = Arc::new(StringPool::new());
    schema().build(&measurements(), &pool).unwrap()
}

#[test]
fn scatter_with_linear_fit() {
    let mut plot = Plot::from_records(
        &measurements(),
        &schema(),
        AesMapping::from([("x", "Height"), ("y", "Weight")]),
    )
    .unwrap();
    plot.add_layer(Layer {
        name: "raw data".into(),
        geom: Some(Geom::point()),
        ..Layer::default()
    });
    plot.add_layer(Layer {
        name: "linear regression".into(),
        stat: Some(Stat::lin_reg()),
        geom: Some(Geom::abline()),
        ..Layer::default()
    });
    plot.compute().unwrap();

    assert_eq!(plot.panels.len(), 1);
    assert_eq!(plot.panels[0].len(), 1);

    let sx = plot.panel_scale(0, 0, "x").unwrap();
    assert!(sx.domain_min <= 1.52);
    assert!(sx.domain_max >= 1.95);
    assert!(sx.finalized);

    let points = &plot.panels[0][0].layers[0].grobs;
    assert_eq!(points.len(), 20);
    assert!(points.iter().all(|g| matches!(g, Grob::Point { .. })));
    // every point lands inside the unit square of the panel
    for g in points {
        let Grob::Point { x, y, .. } = g else { unreachable!() };
        assert!((0.0..=1.0).contains(x) && (0.0..=1.0).contains(y));
    }

    let fit = &plot.panels[0][0].layers[1];
    assert_eq!(fit.grobs.len(), 1);
    let Grob::Line { x0, y0, x1, y1, .. } = &fit.grobs[0] else {
        panic!("fit layer did not produce a line");
    };
    // the line spans the trained x domain
    let sy = plot.panel_scale(0, 0, "y").unwrap();
    let sx = plot.panel_scale(0, 0, "x").unwrap();
    assert!((x0 - sx.pos(sx.domain_min)).abs() < 1e-9);
    assert!((x1 - sx.pos(sx.domain_max)).abs() < 1e-9);
    let slope = fit.data.as_ref().unwrap().columns["slope"].data[0];
    let intercept = fit.data.as_ref().unwrap().columns["intercept"].data[0];
    assert!((y0 - sy.pos(slope * sx.domain_min + intercept)).abs() < 1e-9);
    assert!((y1 - sy.pos(slope * sx.domain_max + intercept)).abs() < 1e-9);
}

#[test]
fn histogram_of_bmi() {
    let mut plot = Plot::from_records(
        &measurements(),
        &schema(),
        AesMapping::from([("x", "BMI")]),
    )
    .unwrap();
    plot.add_layer(Layer {
        name: "histogram".into(),
        stat: Some(Stat::Bin(layerplot::stat::StatBin {
            bin_width: 2.0,
            drop: true,
            origin: None,
        })),
        stat_mapping: AesMapping::from([("y", "count")]),
        geom: Some(Geom::bar()),
        ..Layer::default()
    });
    plot.compute().unwrap();

    assert_eq!(plot.panels.len(), 1);
    let layer = &plot.panels[0][0].layers[0];
    let data = layer.data.as_ref().unwrap();
    // BMI spans [21.26, 34.29]: 7 occupied bins of width 2
    assert_eq!(data.n, 7);
    // count was wired to y; the normalized columns ride along
    for field in ["x", "y", "ncount", "density", "ndensity"] {
        assert!(data.has(field), "missing {}", field);
    }
    let total: f64 = data.columns["y"].data.iter().sum();
    assert_eq!(total, 20.0);

    // one rect per occupied bin, blank border
    let rects = layer
        .grobs
        .iter()
        .filter(|g| matches!(g, Grob::Rect { .. }))
        .count();
    assert_eq!(rects, 7);
    assert_eq!(layer.grobs.len(), 7);
}

#[test]
fn filter_and_levels() {
    let df = sample_frame();
    let uk = df.filter("Origin", "uk");
    assert_eq!(uk.n, 4);
    let origin = &uk.columns["Origin"];
    assert!(origin.data.iter().all(|o| origin.format_value(*o) == "uk"));

    let levels = df.levels("Origin").unwrap();
    let mut names = df.columns["Origin"].format_values(&levels);
    names.sort();
    assert_eq!(names, ["ch", "de", "uk"]);
}

#[test]
fn facet_grid_with_totals() {
    let mut plot = Plot::from_records(
        &measurements(),
        &schema(),
        AesMapping::from([("x", "Height"), ("y", "Weight")]),
    )
    .unwrap();
    plot.faceting = Faceting {
        rows: "Origin".into(),
        columns: "Group".into(),
        totals: true,
        ..Faceting::default()
    };
    plot.add_layer(Layer::with_geom(Geom::point()));
    plot.compute().unwrap();

    // (3 origins + totals) x (3 age groups + totals)
    assert_eq!(plot.panels.len(), 4);
    assert!(plot.panels.iter().all(|row| row.len() == 4));

    // the bottom-right margin panel holds everything
    assert_eq!(plot.panels[3][3].data.n, 20);

    // row margins hold their row's data
    let row0: usize = (0..3).map(|c| plot.panels[0][c].data.n).sum();
    assert_eq!(plot.panels[0][3].data.n, row0);
}

#[test]
fn faceting_partitions_data() {
    let mut plot = Plot::from_records(
        &measurements(),
        &schema(),
        AesMapping::from([("x", "Height"), ("y", "Weight")]),
    )
    .unwrap();
    plot.faceting = Faceting {
        rows: "Origin".into(),
        columns: "Group".into(),
        ..Faceting::default()
    };
    plot.add_layer(Layer::with_geom(Geom::point()));
    plot.compute().unwrap();

    assert_eq!(plot.panels.len(), 3);
    assert_eq!(plot.panels[0].len(), 3);
    let total: usize = plot
        .panels
        .iter()
        .flatten()
        .map(|panel| panel.data.n)
        .sum();
    assert_eq!(total, 20);
}

#[test]
fn free_x_scales_differ_per_column() {
    let mut plot = Plot::from_records(
        &measurements(),
        &schema(),
        AesMapping::from([("x", "Height"), ("y", "Weight")]),
    )
    .unwrap();
    plot.faceting = Faceting {
        columns: "Origin".into(),
        free_scale: "x".into(),
        ..Faceting::default()
    };
    plot.add_layer(Layer::with_geom(Geom::point()));
    plot.compute().unwrap();

    assert_eq!(plot.panels[0].len(), 3);
    // uk heights stop at 1.72 while de reaches 1.95, so the free
    // per-column domains differ
    let domains: Vec<(f64, f64)> = (0..3)
        .map(|c| {
            let s = plot.panel_scale(0, c, "x").unwrap();
            (s.domain_min, s.domain_max)
        })
        .collect();
    assert!(domains.iter().any(|d| *d != domains[0]));
    // y stays shared
    let y0 = plot.panel_scale(0, 0, "y").unwrap();
    let y2 = plot.panel_scale(0, 2, "y").unwrap();
    assert_eq!((y0.domain_min, y0.domain_max), (y2.domain_min, y2.domain_max));
}

#[test]
fn mapped_color_varies_points() {
    let mut plot = Plot::from_records(
        &measurements(),
        &schema(),
        AesMapping::from([("x", "Height"), ("y", "Weight"), ("color", "BMI")]),
    )
    .unwrap();
    plot.add_layer(Layer::with_geom(Geom::point()));
    plot.compute().unwrap();

    let grobs = &plot.panels[0][0].layers[0].grobs;
    let mut colors: Vec<String> = grobs
        .iter()
        .map(|g| {
            let Grob::Point { color, .. } = g else { unreachable!() };
            format!("{}", color)
        })
        .collect();
    colors.sort();
    colors.dedup();
    assert!(colors.len() > 1, "mapped color produced a single color");
}

#[test]
fn dodged_bars_are_disjoint() {
    let pool = Arc::new(StringPool::new());
    let rows: Vec<(f64, f64)> = vec![(1.0, 2.0), (1.0, 3.0), (1.0, 4.0)];
    let schema: FrameSchema<(f64, f64)> = FrameSchema::new("bars")
        .float("pos", |r: &(f64, f64)| r.0)
        .float("height", |r: &(f64, f64)| r.1);
    let data = schema.build(&rows, &pool).unwrap();

    let mut plot = Plot::new(data, AesMapping::from([("x", "pos"), ("y", "height")]));
    plot.add_layer(Layer {
        geom: Some(Geom::Bar(GeomBar {
            width: Some(0.9),
            ..GeomBar::default()
        })),
        position: Position::Dodge,
        ..Layer::default()
    });
    plot.compute().unwrap();

    let fund = &plot.panels[0][0].layers[0].fundamentals[0];
    let xmin = &fund.data.columns["xmin"].data;
    let xmax = &fund.data.columns["xmax"].data;
    for i in 0..3 {
        assert!((xmax[i] - xmin[i] - 0.3).abs() < 1e-9);
        assert!(xmin[i] >= 0.55 - 1e-9);
        assert!(xmax[i] <= 1.45 + 1e-9);
    }
    for i in 0..2 {
        assert!(xmax[i] <= xmin[i + 1] + 1e-9);
    }
}

#[test]
fn age_labels_render_as_text() {
    let mut plot = Plot::from_records(
        &measurements(),
        &schema(),
        AesMapping::from([("x", "Height"), ("y", "Weight")]),
    )
    .unwrap();
    plot.add_layer(Layer {
        name: "age label".into(),
        data_mapping: AesMapping::from([("value", "Age")]),
        stat: Some(Stat::label(|v| format!("{:.0} years", v))),
        geom: Some(Geom::text()),
        ..Layer::default()
    });
    plot.compute().unwrap();

    let grobs = &plot.panels[0][0].layers[0].grobs;
    assert_eq!(grobs.len(), 20);
    assert!(grobs.iter().any(|g| {
        matches!(g, Grob::Text { text, .. } if text == "20 years")
    }));
}

#[test]
fn missing_stat_input_degrades_layer_only() {
    let mut plot = Plot::from_records(
        &measurements(),
        &schema(),
        AesMapping::from([("x", "Height")]),
    )
    .unwrap();
    // boxplot needs y, which is not mapped: the layer must degrade
    plot.add_layer(Layer {
        name: "broken".into(),
        stat: Some(Stat::boxplot()),
        geom: Some(Geom::boxplot()),
        ..Layer::default()
    });
    plot.add_layer(Layer {
        name: "histogram".into(),
        stat: Some(Stat::bin()),
        stat_mapping: AesMapping::from([("y", "count")]),
        geom: Some(Geom::bar()),
        ..Layer::default()
    });
    plot.compute().unwrap();

    let panel = &plot.panels[0][0];
    assert!(panel.layers[0].geom.is_none());
    assert!(panel.layers[0].grobs.is_empty());
    assert!(!panel.layers[1].grobs.is_empty());
}

#[test]
fn boxplot_pipeline_produces_boxes_whiskers_points() {
    let mut plot = Plot::from_records(
        &measurements(),
        &schema(),
        AesMapping::from([("x", "Origin"), ("y", "Weight")]),
    )
    .unwrap();
    plot.add_layer(Layer {
        name: "boxes".into(),
        stat: Some(Stat::boxplot()),
        geom: Some(Geom::boxplot()),
        ..Layer::default()
    });
    plot.compute().unwrap();

    let layer = &plot.panels[0][0].layers[0];
    // three boxes (rects with their border paths), and two whiskers
    // plus a median bar per box from the grouped line geom
    let rects = layer
        .grobs
        .iter()
        .filter(|g| matches!(g, Grob::Rect { .. }))
        .count();
    assert_eq!(rects, 3);
    let segments = layer
        .grobs
        .iter()
        .filter(|g| matches!(g, Grob::Path { points, .. } if points.len() == 2))
        .count();
    assert_eq!(segments, 9);
    let borders = layer
        .grobs
        .iter()
        .filter(|g| matches!(g, Grob::Path { points, .. } if points.len() == 5))
        .count();
    assert_eq!(borders, 3);
}

#[test]
fn compute_is_idempotent() {
    let mut plot = Plot::from_records(
        &measurements(),
        &schema(),
        AesMapping::from([("x", "Height"), ("y", "Weight")]),
    )
    .unwrap();
    plot.add_layer(Layer::with_geom(Geom::point()));
    plot.compute().unwrap();
    let before = plot.panels[0][0].layers[0].grobs.len();
    plot.compute().unwrap();
    assert_eq!(plot.panels[0][0].layers[0].grobs.len(), before);
}

#[test]
fn title_and_axis_labels_drawn() {
    use layerplot::canvas::{Canvas, FontMetrics, PathElement};
    use layerplot::Color;

    #[derive(Default)]
    struct CountingCanvas {
        texts: Vec<String>,
        strokes: usize,
        fills: usize,
        depth: i32,
    }

    impl FontMetrics for CountingCanvas {
        fn text_width(&self, text: &str, size: f64, _family: &str) -> f64 {
            0.6 * size * text.len() as f64
        }
        fn ascent(&self, size: f64, _family: &str) -> f64 {
            0.75 * size
        }
    }

    impl Canvas for CountingCanvas {
        fn push(&mut self) {
            self.depth += 1;
        }
        fn pop(&mut self) {
            self.depth -= 1;
        }
        fn set_color(&mut self, _color: Color) {}
        fn set_line_width(&mut self, _width: f64) {}
        fn set_line_dash(&mut self, _dashes: &[f64], _offset: f64) {}
        fn set_font(&mut self, _family: &str, _size: f64) {}
        fn stroke(&mut self, _path: &[PathElement]) {
            self.strokes += 1;
        }
        fn fill(&mut self, _path: &[PathElement]) {
            self.fills += 1;
        }
        fn fill_text(&mut self, _x: f64, _y: f64, text: &str) {
            self.texts.push(text.to_string());
        }
        fn translate(&mut self, _x: f64, _y: f64) {}
        fn rotate(&mut self, _angle: f64) {}
        fn dpi(&self) -> f64 {
            72.0
        }
    }

    let mut plot = Plot::from_records(
        &measurements(),
        &schema(),
        AesMapping::from([("x", "Height"), ("y", "Weight")]),
    )
    .unwrap();
    plot.title = Some("Sample 12.3".into());
    plot.add_layer(Layer::with_geom(Geom::point()));

    let mut canvas = CountingCanvas::default();
    plot.dump_to(&mut canvas, 800.0, 600.0).unwrap();

    assert!(canvas.texts.iter().any(|t| t == "Sample 12.3"));
    assert!(canvas.texts.iter().any(|t| t == "Height"));
    assert!(canvas.texts.iter().any(|t| t == "Weight"));
    // background fill, grid strokes, 20 points
    assert!(canvas.fills > 0);
    assert!(canvas.strokes > 20);
    // every push was matched by a pop
    assert_eq!(canvas.depth, 0);
}
