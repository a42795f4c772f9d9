//! Line geom

use crate::aes::AesMapping;
use crate::data::DataFrame;
use crate::grob::Grob;
use crate::scale::ScalesView;
use crate::style::{ColorAccessor, LineType, PosAccessor, StyleAccessor};

/// A polyline through the rows, in row order.
///
/// If any of color, size, alpha or linetype is mapped the polyline
/// degrades to one line grob per adjacent pair so each segment can
/// carry its own style; otherwise a single path grob is emitted. A
/// `group` column partitions the rows into independent polylines.
#[derive(Debug, Clone, Default)]
pub struct GeomLine {
    pub style: AesMapping,
}

impl GeomLine {
    pub(super) fn render(
        &self,
        data: &DataFrame,
        style: &AesMapping,
        scales: &ScalesView<'_>,
    ) -> Vec<Grob> {
        if data.has("group") {
            let Ok(levels) = data.levels("group") else {
                return Vec::new();
            };
            return data
                .partition("group", &levels)
                .iter()
                .flat_map(|part| self.render_polyline(part, style, scales))
                .collect();
        }
        self.render_polyline(data, style, scales)
    }

    fn render_polyline(
        &self,
        data: &DataFrame,
        style: &AesMapping,
        scales: &ScalesView<'_>,
    ) -> Vec<Grob> {
        let (Some(sx), Some(sy)) = (scales.get("x"), scales.get("y")) else {
            return Vec::new();
        };
        if data.n == 0 {
            return Vec::new();
        }
        let xs = &data.columns["x"].data;
        let ys = &data.columns["y"].data;

        let color = ColorAccessor::new("color", data, scales, style);
        let size = PosAccessor::new("size", data, scales, style, 0.0, 10.0);
        let alpha = PosAccessor::new("alpha", data, scales, style, 0.0, 1.0);
        let linetype = StyleAccessor::new("linetype", data, scales, style);

        let mapped = ["color", "size", "alpha", "linetype"]
            .iter()
            .any(|&a| data.has(a));
        if mapped {
            // Per-segment styles cannot ride in a single path.
            (0..data.n.saturating_sub(1))
                .map(|i| Grob::Line {
                    x0: sx.pos(xs[i]),
                    y0: sy.pos(ys[i]),
                    x1: sx.pos(xs[i + 1]),
                    y1: sy.pos(ys[i + 1]),
                    size: size.at(i),
                    linetype: LineType::from_index(linetype.at(i)),
                    color: color.at(i).with_alpha(alpha.at(i)),
                })
                .collect()
        } else {
            let points: Vec<(f64, f64)> = (0..data.n)
                .map(|i| (sx.pos(xs[i]), sy.pos(ys[i])))
                .collect();
            vec![Grob::Path {
                points,
                size: size.at(0),
                linetype: LineType::from_index(linetype.at(0)),
                color: color.at(0).with_alpha(alpha.at(0)),
            }]
        }
    }
}
