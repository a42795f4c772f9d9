//! Bar geom

use std::sync::Arc;

use crate::aes::{merge_styles, AesMapping};
use crate::data::{Column, DataFrame, FieldType};
use crate::scale::ScalesMut;
use crate::style::parse_float;
use crate::Result;

use super::{position, Fundamental, Geom, GeomRect, Position};

/// Vertical bars at x with height y.
///
/// Construction reparametrizes into rects: each bar becomes
/// `[x - w/2, x + w/2] x [0, y]`, the position adjustment shifts
/// overlapping bars, and the x/y scales are re-trained on the rect
/// corners so bars never stick out of the panel.
#[derive(Debug, Clone, Default)]
pub struct GeomBar {
    pub style: AesMapping,
    /// Bar width; `None` selects 0.9 times the x column resolution.
    pub width: Option<f64>,
}

impl GeomBar {
    fn bar_width(&self, data: &DataFrame) -> f64 {
        if let Some(w) = self.width {
            return w;
        }
        if let Some(w) = self.style.get("width") {
            return parse_float(w, 0.0, f64::INFINITY);
        }
        let resolution = data.columns["x"].resolution();
        if resolution.is_finite() {
            0.9 * resolution
        } else {
            0.9
        }
    }

    pub(super) fn construct(
        &self,
        mut data: DataFrame,
        pos: Position,
        scales: &mut ScalesMut<'_>,
    ) -> Result<Vec<Fundamental>> {
        // Width comes from the unperturbed spacing; jitter moves the
        // bars afterwards so the rect corners below pick it up.
        let width = self.bar_width(&data);
        if pos == Position::Jitter {
            position::jitter(&mut data);
        }

        // Reparametrize to rect corners.
        let mut rects = DataFrame::new(format!("{} as bars", data.name), Arc::clone(&data.pool));
        rects.n = data.n;
        let xs = &data.columns["x"].data;
        let ys = &data.columns["y"].data;
        let float_col = |values: Vec<f64>| Column {
            ftype: FieldType::Float,
            data: values,
            origin: 0,
            pool: Arc::clone(&data.pool),
        };
        rects.columns.insert(
            "xmin".into(),
            float_col(xs.iter().map(|x| x - width / 2.0).collect()),
        );
        rects.columns.insert(
            "xmax".into(),
            float_col(xs.iter().map(|x| x + width / 2.0).collect()),
        );
        rects
            .columns
            .insert("ymin".into(), float_col(vec![0.0; data.n]));
        rects.columns.insert("ymax".into(), float_col(ys.clone()));
        rects.columns.insert("x".into(), data.columns["x"].clone());
        for aes in ["fill", "color", "alpha", "linetype"] {
            if let Some(col) = data.columns.get(aes) {
                rects.columns.insert(aes.to_string(), col.clone());
            }
        }

        match pos {
            // Jitter was applied to x before the corners were computed.
            Position::Identity | Position::Jitter => {}
            Position::Stack => position::stack(&mut rects),
            Position::Fill => position::fill(&mut rects),
            Position::Dodge => position::dodge(&mut rects),
        }
        rects.delete("x");

        scales.train_fields("x:xmin,xmax y:ymin,ymax", &rects);

        // The bar's look flows into the rect so user styling survives
        // reparametrization.
        let style = merge_styles(&[&self.style, &crate::theme::Theme::built_in().bar_style]);
        Ok(vec![Fundamental {
            geom: Geom::Rect(GeomRect { style }),
            data: rects,
        }])
    }
}
