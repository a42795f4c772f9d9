//! Five-number summaries for box-and-whisker plots

use std::sync::Arc;

use crate::data::{DataFrame, FieldType};
use crate::{PlotError, Result};

/// Summarize y per distinct x into box-and-whisker statistics.
///
/// For each x level the sorted y subset yields `min`, `q1` (`y[n/4]`),
/// `mid` (median), `q3` (`y[3n/4]`), `max`, and the whisker ends `low`
/// and `high`: the extreme values still within 1.5 IQR of the quartile
/// fences. Values outside the fences are outliers.
///
/// Columns are uniformly `f64`, so per-level outlier lists cannot ride
/// in a single cell: the output holds one summary row per level
/// (`outlier` NaN) followed by one row per outlier observation (only
/// `x` and `outlier` set). Scale training ignores NaN, so the encoding
/// is invisible downstream; box construction splits rows on
/// `outlier.is_nan()`.
#[derive(Debug, Clone, Copy)]
pub struct StatBoxplot;

struct Summary {
    min: f64,
    low: f64,
    q1: f64,
    mid: f64,
    q3: f64,
    high: f64,
    max: f64,
    outliers: Vec<f64>,
}

fn summarize(values: &mut Vec<f64>) -> Summary {
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();

    let min = values[0];
    let max = values[n - 1];
    let mid = if n % 2 == 1 {
        values[(n - 1) / 2]
    } else {
        (values[n / 2] + values[n / 2 - 1]) / 2.0
    };
    let q1 = values[n / 4];
    let q3 = values[(3 * n / 4).min(n - 1)];

    let iqr = q3 - q1;
    let (fence_lo, fence_hi) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
    let mut low = max;
    let mut high = min;
    let mut outliers = Vec::new();
    for &y in values.iter() {
        if y >= fence_lo && y < low {
            low = y;
        }
        if y <= fence_hi && y > high {
            high = y;
        }
        if y < fence_lo || y > fence_hi {
            outliers.push(y);
        }
    }

    Summary { min, low, q1, mid, q3, high, max, outliers }
}

const SUMMARY_FIELDS: [&str; 7] = ["min", "low", "q1", "mid", "q3", "high", "max"];

impl StatBoxplot {
    pub fn apply(&self, data: &DataFrame) -> Result<Option<DataFrame>> {
        if data.n == 0 {
            return Ok(None);
        }
        let x_col = &data.columns["x"];
        if !x_col.discrete() {
            return Err(PlotError::NotDiscrete {
                frame: data.name.clone(),
                field: "x".to_string(),
            });
        }
        let levels = data.levels("x")?;
        let xd = &x_col.data;
        let yd = &data.columns["y"].data;

        let pool = Arc::clone(&data.pool);
        let mut result = DataFrame::new(format!("boxplot of {}", data.name), Arc::clone(&pool));
        let mut xf = x_col.copy_meta();
        let mut cols: Vec<Vec<f64>> = vec![Vec::new(); SUMMARY_FIELDS.len()];
        let mut outlier_col = Vec::new();
        let mut outlier_rows: Vec<(f64, f64)> = Vec::new();

        for &level in &levels {
            let mut ys: Vec<f64> = (0..data.n)
                .filter(|i| xd[*i].to_bits() == level.to_bits())
                .map(|i| yd[i])
                .collect();
            let s = summarize(&mut ys);
            xf.data.push(level);
            for (col, v) in cols
                .iter_mut()
                .zip([s.min, s.low, s.q1, s.mid, s.q3, s.high, s.max])
            {
                col.push(v);
            }
            outlier_col.push(f64::NAN);
            outlier_rows.extend(s.outliers.iter().map(|y| (level, *y)));
        }
        for (level, y) in outlier_rows {
            xf.data.push(level);
            for col in &mut cols {
                col.push(f64::NAN);
            }
            outlier_col.push(y);
        }

        result.n = xf.data.len();
        result.columns.insert("x".into(), xf);
        for (name, data_vec) in SUMMARY_FIELDS.iter().zip(cols) {
            result.columns.insert(
                name.to_string(),
                crate::data::Column {
                    ftype: FieldType::Float,
                    data: data_vec,
                    origin: 0,
                    pool: Arc::clone(&pool),
                },
            );
        }
        result.columns.insert(
            "outlier".into(),
            crate::data::Column {
                ftype: FieldType::Float,
                data: outlier_col,
                origin: 0,
                pool: Arc::clone(&pool),
            },
        );
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::sample_frame;

    fn boxplot_frame() -> DataFrame {
        let mut df = sample_frame();
        df.rename("Origin", "x");
        df.rename("Weight", "y");
        for f in ["Age", "Height", "BMI", "Group"] {
            df.delete(f);
        }
        df
    }

    #[test]
    fn test_summary_ordering() {
        let out = StatBoxplot.apply(&boxplot_frame()).unwrap().unwrap();
        let summaries: Vec<usize> = (0..out.n)
            .filter(|i| out.columns["outlier"].data[*i].is_nan())
            .collect();
        assert_eq!(summaries.len(), 3);
        for &i in &summaries {
            let get = |f: &str| out.columns[f].data[i];
            assert!(get("min") <= get("low"));
            assert!(get("low") <= get("q1"));
            assert!(get("q1") <= get("mid"));
            assert!(get("mid") <= get("q3"));
            assert!(get("q3") <= get("high"));
            assert!(get("high") <= get("max"));
        }
    }

    #[test]
    fn test_outliers_reconstruct_input() {
        // One level with a far-away observation.
        let mut df = boxplot_frame();
        // push the heaviest uk observation far out
        let uk_level = {
            let levels = df.levels("x").unwrap();
            *levels
                .iter()
                .find(|l| df.columns["x"].format_value(**l) == "uk")
                .unwrap()
        };
        for i in 0..df.n {
            if df.columns["x"].data[i] == uk_level && df.columns["y"].data[i] == 70.0 {
                df.columns.get_mut("y").unwrap().data[i] = 500.0;
            }
        }
        let out = StatBoxplot.apply(&df).unwrap().unwrap();
        let outliers: Vec<f64> = out.columns["outlier"]
            .data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .collect();
        assert_eq!(outliers, vec![500.0]);
        // whiskers for uk exclude the outlier
        let uk_row = (0..out.n)
            .find(|i| {
                out.columns["x"].data[*i] == uk_level
                    && out.columns["outlier"].data[*i].is_nan()
            })
            .unwrap();
        assert!(out.columns["high"].data[uk_row] < 500.0);
        assert_eq!(out.columns["max"].data[uk_row], 500.0);
    }

    #[test]
    fn test_median_even_count() {
        let mut values = vec![1.0, 2.0, 3.0, 4.0];
        let s = summarize(&mut values);
        assert_eq!(s.mid, 2.5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
    }

    #[test]
    fn test_continuous_x_fails() {
        let mut df = sample_frame();
        df.rename("Height", "x");
        df.rename("Weight", "y");
        assert!(StatBoxplot.apply(&df).is_err());
    }
}
