//! Binning (histogram counts)

use std::sync::Arc;

use crate::data::{DataFrame, FieldType};
use crate::Result;

/// Group x values into equal-width bins and count occurrences.
///
/// Emits one row per bin with the bin center `x`, `count`, `ncount`
/// (count / max count), `density` (count / (width * N)) and `ndensity`
/// (density / max density). Counts are plain occurrence counts, so
/// `sum(count)` always equals the input row count; a mapped `weight`
/// aesthetic is accepted by the contract but does not enter them.
#[derive(Debug, Clone, Default)]
pub struct StatBin {
    /// Bin width; 0 selects range/30 automatically.
    pub bin_width: f64,
    /// Omit empty bins from the output.
    pub drop: bool,
    /// Left edge of the bin grid; defaults to `floor(min/width)*width`.
    pub origin: Option<f64>,
}

impl StatBin {
    pub fn apply(&self, data: &DataFrame) -> Result<Option<DataFrame>> {
        if data.n == 0 {
            return Ok(None);
        }
        let Some((mut min, mut max, _, _)) = data.min_max("x") else {
            return Ok(None);
        };
        if min == max {
            min -= 1.0;
            max += 1.0;
        }

        let bin_width = if self.bin_width == 0.0 {
            (max - min) / 30.0
        } else {
            self.bin_width
        };
        let origin = self
            .origin
            .unwrap_or_else(|| (min / bin_width).floor() * bin_width);

        let nbins = ((max - min) / bin_width).ceil() as usize + 1;
        let x2bin = |x: f64| (((x - origin) / bin_width) as usize).min(nbins - 1);
        let bin2x = |b: usize| b as f64 * bin_width + bin_width / 2.0 + origin;

        let xs = &data.columns["x"].data;
        let mut counts = vec![0.0f64; nbins];
        for i in 0..data.n {
            counts[x2bin(xs[i])] += 1.0;
        }
        let max_count = counts.iter().cloned().fold(0.0, f64::max);
        let total = data.n as f64;

        let pool = Arc::clone(&data.pool);
        let mut result = DataFrame::new(format!("{} binned by x", data.name), Arc::clone(&pool));
        let mut x_col = data.columns["x"].copy_meta();
        let mut count = Vec::new();
        let mut ncount = Vec::new();
        let mut density = Vec::new();
        for (bin, &c) in counts.iter().enumerate() {
            if c == 0.0 && self.drop {
                continue;
            }
            x_col.data.push(bin2x(bin));
            count.push(c);
            ncount.push(c / max_count);
            density.push(c / bin_width / total);
        }
        let max_density = density.iter().cloned().fold(0.0, f64::max);
        let ndensity: Vec<f64> = density.iter().map(|d| d / max_density).collect();

        result.n = count.len();
        let float_col = |data: Vec<f64>| crate::data::Column {
            ftype: FieldType::Float,
            data,
            origin: 0,
            pool: Arc::clone(&pool),
        };
        result.columns.insert("x".into(), x_col);
        result.columns.insert("count".into(), float_col(count));
        result.columns.insert("ncount".into(), float_col(ncount));
        result.columns.insert("density".into(), float_col(density));
        result.columns.insert("ndensity".into(), float_col(ndensity));
        Ok(Some(result))
    }
}
