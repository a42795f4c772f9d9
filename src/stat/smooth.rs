//! Smoothed conditional mean

use std::sync::Arc;

use crate::data::{Column, DataFrame, FieldType};
use crate::Result;

use super::linreg;

/// Sample a fitted trend line with a confidence envelope.
///
/// The model is the same simple linear fit as the regression stat; the
/// stable contract is the output shape: `n` rows of `x`, `y`, `ymin`,
/// `ymax` spanning the training x range, the envelope offset by the
/// fit's error placeholders.
#[derive(Debug, Clone, Copy)]
pub struct StatSmooth {
    /// Number of samples along the x range.
    pub n: usize,
}

impl Default for StatSmooth {
    fn default() -> Self {
        StatSmooth { n: 100 }
    }
}

impl StatSmooth {
    pub fn apply(&self, data: &DataFrame) -> Result<Option<DataFrame>> {
        let Some(fit) = linreg::fit(data) else {
            return Ok(None);
        };
        let Some((min_x, max_x, _, _)) = data.min_max("x") else {
            return Ok(None);
        };
        let n = self.n.max(2);

        let pool = Arc::clone(&data.pool);
        let mut result = DataFrame::new(format!("smooth of {}", data.name), Arc::clone(&pool));
        result.n = n;
        let mut xf = Column::new(n, FieldType::Float, Arc::clone(&pool));
        let mut yf = Column::new(n, FieldType::Float, Arc::clone(&pool));
        let mut ymin = Column::new(n, FieldType::Float, Arc::clone(&pool));
        let mut ymax = Column::new(n, FieldType::Float, Arc::clone(&pool));

        let x_range = max_x - min_x;
        for i in 0..n {
            let x = min_x + i as f64 * x_range / (n - 1) as f64;
            xf.data[i] = x;
            yf.data[i] = fit.slope * x + fit.intercept;
            ymin.data[i] = (fit.slope - fit.slope_err) * x + fit.intercept - fit.intercept_err;
            ymax.data[i] = (fit.slope + fit.slope_err) * x + fit.intercept + fit.intercept_err;
        }

        result.columns.insert("x".into(), xf);
        result.columns.insert("y".into(), yf);
        result.columns.insert("ymin".into(), ymin);
        result.columns.insert("ymax".into(), ymax);
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::sample_frame;

    #[test]
    fn test_output_shape() {
        let mut df = sample_frame();
        df.rename("Height", "x");
        df.rename("Weight", "y");
        for f in ["Age", "Origin", "BMI", "Group"] {
            df.delete(f);
        }
        let out = StatSmooth::default().apply(&df).unwrap().unwrap();
        assert_eq!(out.n, 100);
        assert_eq!(out.field_names(), ["x", "y", "ymax", "ymin"]);
        // samples span the training x range
        let (min_x, max_x, _, _) = df.min_max("x").unwrap();
        assert_eq!(out.columns["x"].data[0], min_x);
        assert!((out.columns["x"].data[99] - max_x).abs() < 1e-12);
        // the envelope brackets the fit
        for i in 0..out.n {
            let y = out.columns["y"].data[i];
            let lo = out.columns["ymin"].data[i];
            let hi = out.columns["ymax"].data[i];
            assert!(lo.min(hi) <= y && y <= lo.max(hi));
        }
    }
}
