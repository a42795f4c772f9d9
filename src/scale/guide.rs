//! Legend (guide) rendering
//!
//! Every non-positional scale renders into a legend group: discrete and
//! style scales as a key/label list, continuous color scales as a color
//! ramp with tick marks. Guide grobs use canvas units directly; the
//! layout places them in a unit-scaled viewport.

use crate::canvas::FontMetrics;
use crate::grob::Grob;
use crate::style::{builtin_color, Color, LineType, PointShape, MM};

use super::Scale;

impl Scale {
    /// Render this scale's legend, returning the group plus its width
    /// and height in canvas units.
    pub fn render_guide(&self, metrics: &dyn FontMetrics) -> (Grob, f64, f64) {
        if !self.discrete && (self.aesthetic == "color" || self.aesthetic == "fill") {
            self.render_color_ramp(metrics)
        } else {
            self.render_key_list(metrics)
        }
    }

    fn render_key_list(&self, metrics: &dyn FontMetrics) -> (Grob, f64, f64) {
        let size = 6.0 * MM;
        let dx = 2.0 * MM;
        let dy = 2.0 * MM;
        let bg = builtin_color("gray80").unwrap();
        let black = builtin_color("black").unwrap();
        let blue = builtin_color("blue").unwrap();

        let mut grobs = Vec::new();
        let mut width: f64 = 0.0;
        let mut y = 0.0;
        for (i, &v) in self.breaks.iter().enumerate() {
            grobs.push(Grob::Rect {
                xmin: 0.0,
                xmax: size,
                ymin: y,
                ymax: y + size,
                fill: bg,
            });

            let key = match self.aesthetic.as_str() {
                // key size must match the re-ranging done by the point geom
                "size" => Grob::Point {
                    x: size / 2.0,
                    y: y + size / 2.0,
                    size: 1.0 + 9.0 * self.pos(v),
                    shape: PointShape::SolidCircle,
                    color: blue,
                },
                "shape" => Grob::Point {
                    x: size / 2.0,
                    y: y + size / 2.0,
                    size: 5.0,
                    shape: PointShape::from_index(self.style(v)),
                    color: blue,
                },
                "linetype" => Grob::Line {
                    x0: 0.0,
                    y0: y + size / 2.0,
                    x1: size,
                    y1: y + size / 2.0,
                    size: 1.5,
                    linetype: LineType::from_index(self.style(v)),
                    color: blue,
                },
                _ => Grob::Point {
                    x: size / 2.0,
                    y: y + size / 2.0,
                    size: 6.0,
                    shape: PointShape::SolidCircle,
                    color: self.color(v),
                },
            };
            grobs.push(key);

            let label = text_grob(
                size + dx,
                y + size / 2.0,
                &self.labels[i],
                12.0,
                black,
                0.0,
                0.5,
            );
            let (lw, _) = label.bounding_box(metrics);
            width = width.max(lw);
            grobs.push(label);

            y += size + dy;
        }

        let title = text_grob(0.0, y, &self.name, 12.0, black, 0.0, 0.0);
        let (tw, th) = title.bounding_box(metrics);
        width = width.max(tw);
        grobs.push(title);

        width += size + dx;
        let height = y + th;
        (Grob::Group { x0: 0.0, y0: 0.0, children: grobs }, width, height)
    }

    fn render_color_ramp(&self, metrics: &dyn FontMetrics) -> (Grob, f64, f64) {
        let size_x = 6.0 * MM;
        let size_y = 50.0 * MM;
        let sep = 2.0 * MM;
        let tic = 1.5 * MM;
        let black = builtin_color("black").unwrap();
        let white = builtin_color("white").unwrap();

        let mut grobs = Vec::new();
        let mut width: f64 = 0.0;

        // The gradient, drawn as 50 slightly overlapping slabs.
        let steps = 50;
        let dy = size_y / steps as f64;
        let dv = (self.max - self.min) / steps as f64;
        let overlap = 0.4;
        for i in 0..steps {
            let y = i as f64 * dy;
            let v = self.min + i as f64 * dv;
            grobs.push(Grob::Rect {
                xmin: 0.0,
                xmax: size_x,
                ymin: y - overlap,
                ymax: y + dy + overlap,
                fill: self.color(v),
            });
        }

        for (i, &v) in self.breaks.iter().enumerate() {
            let y = self.pos(v) * size_y;
            for (x0, x1) in [(0.0, tic), (size_x - tic, size_x)] {
                grobs.push(Grob::Line {
                    x0,
                    y0: y,
                    x1,
                    y1: y,
                    size: 1.0,
                    linetype: LineType::Solid,
                    color: white,
                });
            }
            let txt = &self.labels[i];
            if !txt.is_empty() {
                let label = text_grob(size_x + sep, y, txt, 12.0, black, 0.0, 0.5);
                let (lw, _) = label.bounding_box(metrics);
                width = width.max(lw);
                grobs.push(label);
            }
        }

        let title = text_grob(0.0, size_y + sep, &self.name, 12.0, black, 0.0, 0.0);
        let (tw, th) = title.bounding_box(metrics);
        width = width.max(tw);
        grobs.push(title);

        width += size_x + sep;
        let height = size_y + sep + th;
        (Grob::Group { x0: 0.0, y0: 0.0, children: grobs }, width, height)
    }
}

fn text_grob(x: f64, y: f64, text: &str, size: f64, color: Color, hjust: f64, vjust: f64) -> Grob {
    Grob::Text {
        x,
        y,
        text: text.to_string(),
        size,
        color,
        angle: 0.0,
        hjust,
        vjust,
        font: "Helvetica".into(),
        lineheight: 15.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::SimpleMetrics;
    use crate::data::tests::sample_frame;
    use crate::data::FieldType;

    #[test]
    fn test_discrete_guide_has_key_per_level() {
        let df = sample_frame();
        let mut scale = Scale::new("color", "Origin", FieldType::String);
        scale.train(&df.columns["Origin"]);
        scale.finalize(&df.pool).unwrap();
        let (guide, w, h) = scale.render_guide(&SimpleMetrics);
        let Grob::Group { children, .. } = guide else {
            panic!("guide is not a group");
        };
        // rect + key + label per level, plus the title
        assert_eq!(children.len(), 3 * 3 + 1);
        assert!(w > 0.0 && h > 0.0);
    }

    #[test]
    fn test_continuous_color_guide_is_ramp() {
        let mut scale = Scale::new("color", "Weight", FieldType::Float);
        scale.train_by_value(&[0.0, 100.0]).unwrap();
        scale
            .finalize(&std::sync::Arc::new(crate::pool::StringPool::new()))
            .unwrap();
        let (guide, w, h) = scale.render_guide(&SimpleMetrics);
        let Grob::Group { children, .. } = guide else {
            panic!("guide is not a group");
        };
        let rects = children
            .iter()
            .filter(|g| matches!(g, Grob::Rect { .. }))
            .count();
        assert_eq!(rects, 50);
        assert!(w > 0.0 && h > 50.0 * MM);
    }
}
