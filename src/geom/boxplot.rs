//! Boxplot geom

use std::sync::Arc;

use crate::aes::AesMapping;
use crate::data::{Column, DataFrame, FieldType};
use crate::scale::ScalesMut;
use crate::Result;

use super::{Fundamental, Geom, GeomLine, GeomPoint, GeomRect};

/// Box-and-whisker display of the boxplot stat's summary.
///
/// Construction reparametrizes into three fundamentals: rects for the
/// q1..q3 boxes, grouped line segments for whiskers and the median
/// bar, and points for the outliers. The stat encodes outliers as
/// trailing rows whose summary columns are NaN and whose `outlier`
/// column holds the value; rows are split on that marker here.
#[derive(Debug, Clone, Default)]
pub struct GeomBoxplot {
    pub style: AesMapping,
    /// Box width; `None` selects 0.9 times the x resolution.
    pub width: Option<f64>,
}

impl GeomBoxplot {
    pub(super) fn construct(
        &self,
        data: DataFrame,
        scales: &mut ScalesMut<'_>,
    ) -> Result<Vec<Fundamental>> {
        let outlier_marks = data
            .columns
            .get("outlier")
            .map(|c| c.data.clone())
            .unwrap_or_else(|| vec![f64::NAN; data.n]);
        let summary_rows: Vec<usize> =
            (0..data.n).filter(|i| outlier_marks[*i].is_nan()).collect();
        let outlier_rows: Vec<usize> =
            (0..data.n).filter(|i| !outlier_marks[*i].is_nan()).collect();

        let x_col = &data.columns["x"];
        let width = self.width.unwrap_or_else(|| {
            let mut xs: Vec<f64> = summary_rows.iter().map(|i| x_col.data[*i]).collect();
            xs.sort_by(|a, b| a.total_cmp(b));
            let resolution = xs
                .windows(2)
                .map(|w| w[1] - w[0])
                .fold(f64::INFINITY, f64::min);
            if resolution.is_finite() {
                0.9 * resolution
            } else {
                0.9
            }
        });
        let pool = Arc::clone(&data.pool);
        let float_col = |values: Vec<f64>| Column {
            ftype: FieldType::Float,
            data: values,
            origin: 0,
            pool: Arc::clone(&pool),
        };
        let field = |name: &str, i: usize| data.columns[name].data[i];

        // Boxes: one rect from q1 to q3 per level.
        let mut boxes = DataFrame::new(format!("{} boxes", data.name), Arc::clone(&pool));
        boxes.n = summary_rows.len();
        let xs: Vec<f64> = summary_rows.iter().map(|i| x_col.data[*i]).collect();
        boxes.columns.insert(
            "xmin".into(),
            float_col(xs.iter().map(|x| x - width / 2.0).collect()),
        );
        boxes.columns.insert(
            "xmax".into(),
            float_col(xs.iter().map(|x| x + width / 2.0).collect()),
        );
        boxes.columns.insert(
            "ymin".into(),
            float_col(summary_rows.iter().map(|i| field("q1", *i)).collect()),
        );
        boxes.columns.insert(
            "ymax".into(),
            float_col(summary_rows.iter().map(|i| field("q3", *i)).collect()),
        );

        // Whiskers and median bar: 2-point segments, one group each.
        let mut segments = DataFrame::new(format!("{} whiskers", data.name), Arc::clone(&pool));
        let mut seg_x = Vec::new();
        let mut seg_y = Vec::new();
        let mut seg_group = Vec::new();
        let mut group = 0.0;
        for (k, &i) in summary_rows.iter().enumerate() {
            let x = xs[k];
            for (y0, y1) in [
                (field("low", i), field("q1", i)),
                (field("q3", i), field("high", i)),
            ] {
                seg_x.extend([x, x]);
                seg_y.extend([y0, y1]);
                seg_group.extend([group, group]);
                group += 1.0;
            }
            seg_x.extend([x - width / 2.0, x + width / 2.0]);
            seg_y.extend([field("mid", i), field("mid", i)]);
            seg_group.extend([group, group]);
            group += 1.0;
        }
        segments.n = seg_x.len();
        segments.columns.insert("x".into(), float_col(seg_x));
        segments.columns.insert("y".into(), float_col(seg_y));
        let mut group_col = float_col(seg_group);
        group_col.ftype = FieldType::Int;
        segments.columns.insert("group".into(), group_col);

        // Outlier points.
        let mut outliers = DataFrame::new(format!("{} outliers", data.name), Arc::clone(&pool));
        outliers.n = outlier_rows.len();
        outliers.columns.insert(
            "x".into(),
            float_col(outlier_rows.iter().map(|i| x_col.data[*i]).collect()),
        );
        outliers.columns.insert(
            "y".into(),
            float_col(outlier_rows.iter().map(|i| outlier_marks[*i]).collect()),
        );

        scales.train_fields("x:xmin,xmax", &boxes);
        scales.train_fields("y:min,max,outlier", &data);

        let mut funds = vec![
            Fundamental {
                geom: Geom::Rect(GeomRect { style: self.style.clone() }),
                data: boxes,
            },
            Fundamental {
                geom: Geom::Line(GeomLine { style: self.style.clone() }),
                data: segments,
            },
        ];
        if outliers.n > 0 {
            funds.push(Fundamental {
                geom: Geom::Point(GeomPoint { style: self.style.clone() }),
                data: outliers,
            });
        }
        Ok(funds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::sample_frame;
    use crate::scale::{Scale, ScaleArena, ScaleId};
    use crate::stat::StatBoxplot;
    use std::collections::HashMap;

    #[test]
    fn test_reparametrizes_to_three_fundamentals() {
        let mut df = sample_frame();
        df.rename("Origin", "x");
        df.rename("Weight", "y");
        for f in ["Age", "Height", "BMI", "Group"] {
            df.delete(f);
        }
        // force an outlier
        df.columns.get_mut("y").unwrap().data[0] = 500.0;
        let summary = StatBoxplot.apply(&df).unwrap().unwrap();

        let mut arena = ScaleArena::default();
        let mut ids: HashMap<String, ScaleId> = HashMap::new();
        ids.insert(
            "x".into(),
            arena.alloc(Scale::new("x", "x", FieldType::String)),
        );
        ids.insert(
            "y".into(),
            arena.alloc(Scale::new("y", "y", FieldType::Float)),
        );
        let mut scales = ScalesMut::new(&ids, &mut arena);
        let funds = GeomBoxplot::default()
            .construct(summary, &mut scales)
            .unwrap();

        assert_eq!(funds.len(), 3);
        assert!(matches!(funds[0].geom, Geom::Rect(_)));
        assert!(matches!(funds[1].geom, Geom::Line(_)));
        assert!(matches!(funds[2].geom, Geom::Point(_)));

        // 3 levels: 3 boxes, 9 segments of 2 points, 1 outlier
        assert_eq!(funds[0].data.n, 3);
        assert_eq!(funds[1].data.n, 18);
        assert_eq!(funds[2].data.n, 1);
        assert_eq!(funds[2].data.columns["y"].data[0], 500.0);

        // y scale saw the outlier
        assert_eq!(arena.get(ids["y"]).domain_max, 500.0);
    }
}
