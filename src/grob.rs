//! Primitive graphical objects
//!
//! A grob is the atom the pipeline renders: points, lines, paths,
//! rectangles, text and groups, all with coordinates normalized to
//! `[0,1]` inside their owning viewport. Drawing replays grobs onto a
//! [`Canvas`] backend.

use std::fmt;

use crate::canvas::{Canvas, FontMetrics, PathElement, Viewport};
use crate::style::{Color, LineType, PointShape};

/// A primitive graphical object in normalized viewport coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Grob {
    Point {
        x: f64,
        y: f64,
        size: f64,
        shape: PointShape,
        color: Color,
    },
    Line {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        size: f64,
        linetype: LineType,
        color: Color,
    },
    Path {
        points: Vec<(f64, f64)>,
        size: f64,
        linetype: LineType,
        color: Color,
    },
    Rect {
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
        fill: Color,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        size: f64,
        color: Color,
        /// Rotation in radians, counter-clockwise.
        angle: f64,
        hjust: f64,
        vjust: f64,
        font: String,
        lineheight: f64,
    },
    Group {
        x0: f64,
        y0: f64,
        children: Vec<Grob>,
    },
}

impl Grob {
    /// Width and height of the grob in canvas units. Only text (and
    /// groups of text) have an extent independent of their viewport.
    pub fn bounding_box(&self, metrics: &dyn FontMetrics) -> (f64, f64) {
        match self {
            Grob::Text {
                text, size, angle, font, ..
            } => {
                let w = metrics.text_width(text, *size, font);
                let h = metrics.ascent(*size, font);
                let s = angle.sin().abs();
                let z = (1.0 - s * s).sqrt();
                (w * z + h * s, w * s + h * z)
            }
            Grob::Group { children, .. } => children.iter().fold((0.0, 0.0), |(w, h), g| {
                let (gw, gh) = g.bounding_box(metrics);
                (w.max(gw), h.max(gh))
            }),
            _ => (0.0, 0.0),
        }
    }

    /// Replay this grob onto `canvas`, mapping coordinates through `vp`.
    pub fn draw(&self, vp: &Viewport, canvas: &mut dyn Canvas) {
        match self {
            Grob::Point { x, y, size, shape, color } => {
                draw_point(vp, canvas, *x, *y, *size, *shape, *color)
            }
            Grob::Line { x0, y0, x1, y1, size, linetype, color } => {
                canvas.push();
                canvas.set_color(*color);
                canvas.set_line_width(*size);
                canvas.set_line_dash(linetype.dashes(), 0.0);
                canvas.stroke(&[
                    PathElement::Move(vp.x(*x0), vp.y(*y0)),
                    PathElement::Line(vp.x(*x1), vp.y(*y1)),
                ]);
                canvas.pop();
            }
            Grob::Path { points, size, linetype, color } => {
                if points.is_empty() {
                    return;
                }
                canvas.push();
                canvas.set_color(*color);
                canvas.set_line_width(*size);
                canvas.set_line_dash(linetype.dashes(), 0.0);
                let mut path = Vec::with_capacity(points.len());
                path.push(PathElement::Move(vp.x(points[0].0), vp.y(points[0].1)));
                for (x, y) in &points[1..] {
                    path.push(PathElement::Line(vp.x(*x), vp.y(*y)));
                }
                canvas.stroke(&path);
                canvas.pop();
            }
            Grob::Rect { xmin, ymin, xmax, ymax, fill } => {
                canvas.push();
                canvas.set_color(*fill);
                let (x0, y0) = (vp.x(*xmin), vp.y(*ymin));
                let (x1, y1) = (vp.x(*xmax), vp.y(*ymax));
                canvas.fill(&[
                    PathElement::Move(x0, y0),
                    PathElement::Line(x1, y0),
                    PathElement::Line(x1, y1),
                    PathElement::Line(x0, y1),
                    PathElement::Close,
                ]);
                canvas.pop();
            }
            Grob::Text {
                x, y, text, size, color, angle, hjust, vjust, font, ..
            } => {
                canvas.push();
                canvas.set_color(*color);
                canvas.set_font(font, *size);
                let (w, h) = self.bounding_box(canvas.as_metrics());
                let dx = w * hjust;
                let dy = h * vjust;
                canvas.translate(vp.x(*x) - dx, vp.y(*y) - dy);
                canvas.rotate(*angle);
                canvas.fill_text(0.0, 0.0, text);
                canvas.pop();
            }
            Grob::Group { x0, y0, children } => {
                canvas.push();
                canvas.translate(vp.x(*x0), vp.y(*y0));
                for child in children {
                    child.draw(vp, canvas);
                }
                canvas.pop();
            }
        }
    }
}

/// Up-cast helper so draw code can measure through the canvas.
trait AsMetrics {
    fn as_metrics(&self) -> &dyn FontMetrics;
}

impl<'a> AsMetrics for dyn Canvas + 'a {
    fn as_metrics(&self) -> &dyn FontMetrics {
        self
    }
}

fn draw_point(
    vp: &Viewport,
    canvas: &mut dyn Canvas,
    x: f64,
    y: f64,
    size: f64,
    shape: PointShape,
    color: Color,
) {
    use PathElement::{Arc, Close, Line, Move};

    if shape == PointShape::Blank {
        return;
    }

    canvas.push();
    canvas.set_color(color);
    canvas.set_line_width(1.0);
    canvas.set_line_dash(&[], 0.0);
    let (x, y) = (vp.x(x), vp.y(y));
    let s = size;
    let filled = shape.solid();

    let paint = |canvas: &mut dyn Canvas, path: &[PathElement]| {
        if filled {
            canvas.fill(path);
        } else {
            canvas.stroke(path);
        }
    };

    match shape {
        PointShape::Blank => {}
        PointShape::Dot => {
            let r = 72.0 / canvas.dpi();
            canvas.fill(&[Arc { x, y, radius: r, start: 0.0, end: std::f64::consts::TAU }, Close]);
        }
        PointShape::Circle | PointShape::SolidCircle => {
            paint(&mut *canvas, &[Arc { x, y, radius: s, start: 0.0, end: std::f64::consts::TAU }, Close]);
        }
        PointShape::Square | PointShape::SolidSquare => {
            paint(&mut *canvas, &[
                Move(x - s, y - s),
                Line(x + s, y - s),
                Line(x + s, y + s),
                Line(x - s, y + s),
                Close,
            ]);
        }
        PointShape::Diamond | PointShape::SolidDiamond => {
            paint(&mut *canvas, &[
                Move(x, y - s),
                Line(x + s, y),
                Line(x, y + s),
                Line(x - s, y),
                Close,
            ]);
        }
        PointShape::Delta | PointShape::SolidDelta => {
            let ss = 0.57735 * s;
            paint(&mut *canvas, &[
                Move(x, y + 2.0 * ss),
                Line(x - s, y - ss),
                Line(x + s, y - ss),
                Close,
            ]);
        }
        PointShape::Nabla | PointShape::SolidNabla => {
            let ss = 0.57735 * s;
            paint(&mut *canvas, &[
                Move(x, y - 2.0 * ss),
                Line(x - s, y + ss),
                Line(x + s, y + ss),
                Close,
            ]);
        }
        PointShape::Cross => {
            let ss = s / 1.3;
            canvas.stroke(&[
                Move(x - ss, y - ss),
                Line(x + ss, y + ss),
                Move(x - ss, y + ss),
                Line(x + ss, y - ss),
            ]);
        }
        PointShape::Plus => {
            canvas.stroke(&[
                Move(x - s, y),
                Line(x + s, y),
                Move(x, y - s),
                Line(x, y + s),
            ]);
        }
        PointShape::Star => {
            let ss = s / 1.3;
            canvas.stroke(&[
                Move(x - ss, y - ss),
                Line(x + ss, y + ss),
                Move(x - ss, y + ss),
                Line(x + ss, y - ss),
                Move(x - s, y),
                Line(x + s, y),
                Move(x, y - s),
                Line(x, y + s),
            ]);
        }
    }
    canvas.pop();
}

impl fmt::Display for Grob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grob::Point { x, y, size, shape, color } => {
                write!(f, "Point({:.3},{:.3} {} {} {:.1})", x, y, color, shape, size)
            }
            Grob::Line { x0, y0, x1, y1, size, linetype, color } => write!(
                f,
                "Line({:.3},{:.3} - {:.3},{:.3} {} {} {:.1})",
                x0, y0, x1, y1, color, linetype, size
            ),
            Grob::Path { points, size, linetype, color } => {
                let ppp = |pts: &[(f64, f64)]| {
                    pts.iter()
                        .map(|(x, y)| format!("{:.2},{:.2}", x, y))
                        .collect::<Vec<_>>()
                        .join(" - ")
                };
                let pts = if points.len() <= 6 {
                    ppp(points)
                } else {
                    format!(
                        "{} ... {}",
                        ppp(&points[..3]),
                        ppp(&points[points.len() - 3..])
                    )
                };
                write!(f, "Path({} {} {} {:.1})", pts, color, linetype, size)
            }
            Grob::Rect { xmin, ymin, xmax, ymax, fill } => write!(
                f,
                "Rect({:.3},{:.3} - {:.3},{:.3} {})",
                xmin, ymin, xmax, ymax, fill
            ),
            Grob::Text { x, y, text, color, angle, .. } => write!(
                f,
                "Text({:.3},{:.3} {:?} {} {:.0}°)",
                x,
                y,
                text,
                color,
                angle.to_degrees()
            ),
            Grob::Group { children, .. } => write!(f, "Group of {}", children.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::tests::RecordingCanvas;
    use crate::canvas::SimpleMetrics;

    #[test]
    fn test_text_bounding_box_unrotated() {
        let text = Grob::Text {
            x: 0.0,
            y: 0.0,
            text: "abcd".into(),
            size: 10.0,
            color: Color::rgb(0, 0, 0),
            angle: 0.0,
            hjust: 0.0,
            vjust: 0.0,
            font: "Helvetica".into(),
            lineheight: 15.0,
        };
        let (w, h) = text.bounding_box(&SimpleMetrics);
        assert!((w - 24.0).abs() < 1e-9);
        assert!((h - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_text_bounding_box_rotation_swaps_extent() {
        let make = |angle: f64| Grob::Text {
            x: 0.0,
            y: 0.0,
            text: "abcd".into(),
            size: 10.0,
            color: Color::rgb(0, 0, 0),
            angle,
            hjust: 0.0,
            vjust: 0.0,
            font: "Helvetica".into(),
            lineheight: 15.0,
        };
        let (w0, h0) = make(0.0).bounding_box(&SimpleMetrics);
        let (w90, h90) = make(std::f64::consts::FRAC_PI_2).bounding_box(&SimpleMetrics);
        assert!((w90 - h0).abs() < 1e-9);
        assert!((h90 - w0).abs() < 1e-9);
    }

    #[test]
    fn test_line_draw_is_bracketed() {
        let mut canvas = RecordingCanvas::default();
        let vp = Viewport::new(0.0, 0.0, 100.0, 100.0);
        Grob::Line {
            x0: 0.0,
            y0: 0.0,
            x1: 1.0,
            y1: 1.0,
            size: 2.0,
            linetype: LineType::Solid,
            color: Color::rgb(0, 0, 0),
        }
        .draw(&vp, &mut canvas);
        assert_eq!(canvas.ops.first().map(String::as_str), Some("push"));
        assert_eq!(canvas.ops.last().map(String::as_str), Some("pop"));
        assert!(canvas.ops.iter().any(|op| op.starts_with("stroke")));
    }

    #[test]
    fn test_blank_point_draws_nothing() {
        let mut canvas = RecordingCanvas::default();
        let vp = Viewport::new(0.0, 0.0, 100.0, 100.0);
        Grob::Point {
            x: 0.5,
            y: 0.5,
            size: 5.0,
            shape: PointShape::Blank,
            color: Color::rgb(0, 0, 0),
        }
        .draw(&vp, &mut canvas);
        assert!(canvas.ops.is_empty());
    }

    #[test]
    fn test_display_forms() {
        let line = Grob::Line {
            x0: 0.0,
            y0: 0.0,
            x1: 1.0,
            y1: 0.5,
            size: 1.0,
            linetype: LineType::Dashed,
            color: Color::rgb(0xff, 0, 0),
        };
        assert_eq!(
            format!("{}", line),
            "Line(0.000,0.000 - 1.000,0.500 #ff0000 dashed 1.0)"
        );
    }
}
