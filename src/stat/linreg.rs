//! Simple linear regression

use std::sync::Arc;

use crate::data::{Column, DataFrame, FieldType};
use crate::Result;

/// Least-squares fit of y against x.
///
/// Emits a single row with `intercept`, `slope`, `interceptErr` and
/// `slopeErr`. The error columns are reserved fields populated with a
/// coarse placeholder (20% of the intercept, 10% of the slope) until a
/// proper confidence interval is wired in. A mapped `weight` aesthetic
/// turns the fit into weighted least squares.
#[derive(Debug, Clone, Copy)]
pub struct StatLinReg;

/// Fitted coefficients, shared with the smoother.
pub(crate) struct Fit {
    pub intercept: f64,
    pub slope: f64,
    pub intercept_err: f64,
    pub slope_err: f64,
}

pub(crate) fn fit(data: &DataFrame) -> Option<Fit> {
    if data.n == 0 {
        return None;
    }
    let xc = &data.columns["x"].data;
    let yc = &data.columns["y"].data;
    let wc = data.columns.get("weight").map(|c| &c.data);
    let weight = |i: usize| wc.map_or(1.0, |w| w[i]);

    let wsum: f64 = (0..data.n).map(weight).sum();
    if wsum == 0.0 {
        return None;
    }
    let mut xm = 0.0;
    let mut ym = 0.0;
    for i in 0..data.n {
        xm += weight(i) * xc[i];
        ym += weight(i) * yc[i];
    }
    xm /= wsum;
    ym /= wsum;

    let mut sx = 0.0;
    let mut sy = 0.0;
    for i in 0..data.n {
        let dx = xc[i] - xm;
        sx += weight(i) * dx * dx;
        sy += weight(i) * dx * (yc[i] - ym);
    }

    let slope = sy / sx;
    let intercept = ym - slope * xm;
    Some(Fit {
        intercept,
        slope,
        intercept_err: 0.2 * intercept,
        slope_err: 0.1 * slope,
    })
}

impl StatLinReg {
    pub fn apply(&self, data: &DataFrame) -> Result<Option<DataFrame>> {
        let Some(fit) = fit(data) else {
            return Ok(None);
        };

        let pool = Arc::clone(&data.pool);
        let mut result =
            DataFrame::new(format!("linear regression of {}", data.name), Arc::clone(&pool));
        result.n = 1;
        for (name, value) in [
            ("intercept", fit.intercept),
            ("slope", fit.slope),
            ("interceptErr", fit.intercept_err),
            ("slopeErr", fit.slope_err),
        ] {
            let mut col = Column::new(1, FieldType::Float, Arc::clone(&pool));
            col.data[0] = value;
            result.columns.insert(name.into(), col);
        }
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::sample_frame;

    fn xy_frame() -> DataFrame {
        let mut df = sample_frame();
        df.rename("Height", "x");
        df.rename("Weight", "y");
        for f in ["Age", "Origin", "BMI", "Group"] {
            df.delete(f);
        }
        df
    }

    #[test]
    fn test_single_row_output() {
        let out = StatLinReg.apply(&xy_frame()).unwrap().unwrap();
        assert_eq!(out.n, 1);
        assert_eq!(
            out.field_names(),
            ["intercept", "interceptErr", "slope", "slopeErr"]
        );
    }

    #[test]
    fn test_fit_on_sample() {
        let out = StatLinReg.apply(&xy_frame()).unwrap().unwrap();
        let slope = out.columns["slope"].data[0];
        let intercept = out.columns["intercept"].data[0];
        assert!((slope - 59.609).abs() < 0.01, "slope {}", slope);
        assert!((intercept + 23.421).abs() < 0.01, "intercept {}", intercept);
    }

    #[test]
    fn test_exact_line() {
        let pool = Arc::new(crate::pool::StringPool::new());
        let mut df = DataFrame::new("line", Arc::clone(&pool));
        df.n = 4;
        let mut x = Column::new(4, FieldType::Float, Arc::clone(&pool));
        let mut y = Column::new(4, FieldType::Float, Arc::clone(&pool));
        x.data = vec![0.0, 1.0, 2.0, 3.0];
        y.data = vec![1.0, 3.0, 5.0, 7.0];
        df.columns.insert("x".into(), x);
        df.columns.insert("y".into(), y);
        let out = StatLinReg.apply(&df).unwrap().unwrap();
        assert!((out.columns["slope"].data[0] - 2.0).abs() < 1e-12);
        assert!((out.columns["intercept"].data[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input() {
        let df = xy_frame().filter("x", 1234.5);
        assert!(StatLinReg.apply(&df).unwrap().is_none());
    }
}
