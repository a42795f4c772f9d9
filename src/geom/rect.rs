//! Rect geom

use crate::aes::AesMapping;
use crate::data::DataFrame;
use crate::grob::Grob;
use crate::scale::ScalesView;
use crate::style::{ColorAccessor, LineType, PosAccessor, StyleAccessor};

/// One filled rectangle per row, with an optional border path.
#[derive(Debug, Clone, Default)]
pub struct GeomRect {
    pub style: AesMapping,
}

impl GeomRect {
    pub(super) fn render(
        &self,
        data: &DataFrame,
        style: &AesMapping,
        scales: &ScalesView<'_>,
    ) -> Vec<Grob> {
        let (Some(sx), Some(sy)) = (scales.get("x"), scales.get("y")) else {
            return Vec::new();
        };
        let xmin = &data.columns["xmin"].data;
        let xmax = &data.columns["xmax"].data;
        let ymin = &data.columns["ymin"].data;
        let ymax = &data.columns["ymax"].data;

        let fill = ColorAccessor::new("fill", data, scales, style);
        let border = ColorAccessor::new("color", data, scales, style);
        let alpha = PosAccessor::new("alpha", data, scales, style, 0.0, 1.0);
        let linetype = StyleAccessor::new("linetype", data, scales, style);
        let size = PosAccessor::new("size", data, scales, style, 0.0, 10.0);

        let mut grobs = Vec::new();
        for i in 0..data.n {
            let a = alpha.at(i);
            if a == 0.0 {
                continue;
            }
            let (x0, x1) = (sx.pos(xmin[i]), sx.pos(xmax[i]));
            let (y0, y1) = (sy.pos(ymin[i]), sy.pos(ymax[i]));
            grobs.push(Grob::Rect {
                xmin: x0,
                ymin: y0,
                xmax: x1,
                ymax: y1,
                fill: fill.at(i).with_alpha(a),
            });

            let lt = LineType::from_index(linetype.at(i));
            if lt != LineType::Blank {
                grobs.push(Grob::Path {
                    points: vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)],
                    size: size.at(i),
                    linetype: lt,
                    color: border.at(i),
                });
            }
        }
        grobs
    }
}
