//! Point geom

use crate::aes::AesMapping;
use crate::data::DataFrame;
use crate::grob::Grob;
use crate::scale::{ScalesMut, ScalesView};
use crate::style::{ColorAccessor, PointShape, PosAccessor, StyleAccessor};
use crate::Result;

use super::{position, Fundamental, Geom, Position};

/// One marker per row.
#[derive(Debug, Clone, Default)]
pub struct GeomPoint {
    /// Fixed (non-mapped) aesthetics for this layer.
    pub style: AesMapping,
}

impl GeomPoint {
    pub(super) fn construct(
        &self,
        mut data: DataFrame,
        pos: Position,
        scales: &mut ScalesMut<'_>,
    ) -> Result<Vec<Fundamental>> {
        if pos == Position::Jitter {
            position::jitter(&mut data);
            scales.train_fields("x:x", &data);
        }
        Ok(vec![Fundamental {
            geom: Geom::Point(self.clone()),
            data,
        }])
    }

    pub(super) fn render(
        &self,
        data: &DataFrame,
        style: &AesMapping,
        scales: &ScalesView<'_>,
    ) -> Vec<Grob> {
        let (Some(sx), Some(sy)) = (scales.get("x"), scales.get("y")) else {
            return Vec::new();
        };
        let xs = &data.columns["x"].data;
        let ys = &data.columns["y"].data;

        let color = ColorAccessor::new("color", data, scales, style);
        let size = PosAccessor::new("size", data, scales, style, 1.0, 10.0);
        let alpha = PosAccessor::new("alpha", data, scales, style, 0.0, 1.0);
        let shape = StyleAccessor::new("shape", data, scales, style);

        (0..data.n)
            .map(|i| Grob::Point {
                x: sx.pos(xs[i]),
                y: sy.pos(ys[i]),
                size: size.at(i),
                shape: PointShape::from_index(shape.at(i)),
                color: color.at(i).with_alpha(alpha.at(i)),
            })
            .collect()
    }
}
