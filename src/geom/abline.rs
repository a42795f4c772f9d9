//! Intercept/slope line geom

use crate::aes::AesMapping;
use crate::data::DataFrame;
use crate::grob::Grob;
use crate::scale::{ScalesMut, ScalesView};
use crate::style::{ColorAccessor, LineType, PosAccessor, StyleAccessor};
use crate::Result;

use super::{Fundamental, Geom};

/// One line per `(intercept, slope)` row, spanning the x domain.
#[derive(Debug, Clone, Default)]
pub struct GeomABLine {
    pub style: AesMapping,
}

impl GeomABLine {
    /// Pre-train the y scale on the line endpoints so the lines stay
    /// inside the finalized range.
    pub(super) fn construct(
        &self,
        data: DataFrame,
        scales: &mut ScalesMut<'_>,
    ) -> Result<Fundamental> {
        if let Some((xmin, xmax)) = scales.get("x").map(|s| (s.domain_min, s.domain_max)) {
            let ic = data.columns["intercept"].data.clone();
            let sc = data.columns["slope"].data.clone();
            if let Some(sy) = scales.get_mut("y") {
                for (intercept, slope) in ic.iter().zip(&sc) {
                    sy.train_by_value(&[
                        slope * xmin + intercept,
                        slope * xmax + intercept,
                    ])?;
                }
            }
        }
        Ok(Fundamental {
            geom: Geom::ABLine(self.clone()),
            data,
        })
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
        let ic = &data.columns["intercept"].data;
        let sc = &data.columns["slope"].data;

        let color = ColorAccessor::new("color", data, scales, style);
        let size = PosAccessor::new("size", data, scales, style, 0.0, 10.0);
        let alpha = PosAccessor::new("alpha", data, scales, style, 0.0, 1.0);
        let linetype = StyleAccessor::new("linetype", data, scales, style);

        let (xmin, xmax) = (sx.domain_min, sx.domain_max);
        (0..data.n)
            .map(|i| Grob::Line {
                x0: sx.pos(xmin),
                y0: sy.pos(sc[i] * xmin + ic[i]),
                x1: sx.pos(xmax),
                y1: sy.pos(sc[i] * xmax + ic[i]),
                size: size.at(i),
                linetype: LineType::from_index(linetype.at(i)),
                color: color.at(i).with_alpha(alpha.at(i)),
            })
            .collect()
    }
}
