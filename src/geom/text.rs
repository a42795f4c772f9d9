//! Text geom

use crate::aes::AesMapping;
use crate::data::DataFrame;
use crate::grob::Grob;
use crate::scale::ScalesView;
use crate::style::{parse_float, ColorAccessor, PosAccessor};

/// One text label per row, the string taken from the `text` column.
#[derive(Debug, Clone, Default)]
pub struct GeomText {
    pub style: AesMapping,
}

impl GeomText {
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
        let text = &data.columns["text"];

        let color = ColorAccessor::new("color", data, scales, style);
        let size = PosAccessor::new("size", data, scales, style, 1.0, 10.0);
        let alpha = PosAccessor::new("alpha", data, scales, style, 0.0, 1.0);
        let angle = parse_float(style.get("angle").unwrap_or("0"), 0.0, std::f64::consts::TAU);
        let hjust = parse_float(style.get("hjust").unwrap_or("0.5"), 0.0, 1.0);
        let vjust = parse_float(style.get("vjust").unwrap_or("0.5"), 0.0, 1.0);
        let font = style.get("family").unwrap_or("Helvetica").to_string();
        let lineheight = parse_float(style.get("lineheight").unwrap_or("15"), 0.0, 100.0);

        (0..data.n)
            .map(|i| Grob::Text {
                x: sx.pos(xs[i]),
                y: sy.pos(ys[i]),
                text: text.format_value(text.data[i]),
                size: size.at(i),
                color: color.at(i).with_alpha(alpha.at(i)),
                angle,
                hjust,
                vjust,
                font: font.clone(),
                lineheight,
            })
            .collect()
    }
}
