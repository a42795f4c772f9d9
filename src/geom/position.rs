//! Position adjustments
//!
//! Geoms that overlap at a common x can be shifted apart before
//! rendering: stacked, normalized to a filled unit column, dodged side
//! by side, or jittered with uniform noise.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::DataFrame;

/// Per-layer position adjustment policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Identity,
    /// Perturb x by small uniform noise.
    Jitter,
    /// Accumulate bars at the same x upward.
    Stack,
    /// Stack, then rescale every column of bars to sum to one.
    Fill,
    /// Place bars at the same x side by side.
    Dodge,
}

/// Stack bars: rows sharing an x have their `[ymin, ymax]` shifted up
/// by the running sum of the heights before them.
pub fn stack(df: &mut DataFrame) {
    let xs = df.columns["x"].data.clone();
    let mut ymin = df.columns["ymin"].data.clone();
    let mut ymax = df.columns["ymax"].data.clone();
    let mut cum: HashMap<u64, f64> = HashMap::new();
    for i in 0..df.n {
        let base = cum.entry(xs[i].to_bits()).or_insert(0.0);
        let height = ymax[i] - ymin[i];
        ymin[i] = *base;
        ymax[i] = *base + height;
        *base += height;
    }
    df.columns.get_mut("ymin").unwrap().data = ymin;
    df.columns.get_mut("ymax").unwrap().data = ymax;
}

/// Stack, then divide every bar at an x by that column's total height.
pub fn fill(df: &mut DataFrame) {
    stack(df);
    let xs = df.columns["x"].data.clone();
    let mut totals: HashMap<u64, f64> = HashMap::new();
    for (i, x) in xs.iter().enumerate() {
        let top = df.columns["ymax"].data[i];
        let t = totals.entry(x.to_bits()).or_insert(0.0);
        if top > *t {
            *t = top;
        }
    }
    for field in ["ymin", "ymax"] {
        let col = &mut df.columns.get_mut(field).unwrap().data;
        for (i, x) in xs.iter().enumerate() {
            let total = totals[&x.to_bits()];
            if total != 0.0 {
                col[i] /= total;
            }
        }
    }
}

/// Dodge bars: the `n` bars at an x split the original bar width into
/// `n` adjacent sub-intervals, in row order.
pub fn dodge(df: &mut DataFrame) {
    let xs = df.columns["x"].data.clone();
    let mut counts: HashMap<u64, usize> = HashMap::new();
    for x in &xs {
        *counts.entry(x.to_bits()).or_insert(0) += 1;
    }

    let mut seen: HashMap<u64, usize> = HashMap::new();
    let widths: Vec<f64> = (0..df.n)
        .map(|i| df.columns["xmax"].data[i] - df.columns["xmin"].data[i])
        .collect();
    for i in 0..df.n {
        let bits = xs[i].to_bits();
        let n = counts[&bits];
        let j = {
            let s = seen.entry(bits).or_insert(0);
            let j = *s;
            *s += 1;
            j
        };
        let wh = widths[i] / 2.0;
        let we = widths[i] / n as f64;
        let left = xs[i] - wh + j as f64 * we;
        df.columns.get_mut("xmin").unwrap().data[i] = left;
        df.columns.get_mut("xmax").unwrap().data[i] = left + we;
    }
}

/// Perturb the x column by uniform noise of up to ±0.4 of its
/// resolution.
pub fn jitter(df: &mut DataFrame) {
    let resolution = df.columns["x"].resolution();
    let amount = if resolution.is_finite() {
        0.4 * resolution
    } else {
        0.4
    };
    let mut rng = rand::thread_rng();
    for x in &mut df.columns.get_mut("x").unwrap().data {
        *x += rng.gen_range(-amount..=amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Column, FieldType};
    use crate::pool::StringPool;
    use std::sync::Arc;

    fn bars(xs: &[f64], ymins: &[f64], ymaxs: &[f64]) -> DataFrame {
        let pool = Arc::new(StringPool::new());
        let mut df = DataFrame::new("bars", Arc::clone(&pool));
        df.n = xs.len();
        let col = |data: &[f64]| Column {
            ftype: FieldType::Float,
            data: data.to_vec(),
            origin: 0,
            pool: Arc::clone(&pool),
        };
        df.columns.insert("x".into(), col(xs));
        df.columns.insert("ymin".into(), col(ymins));
        df.columns.insert("ymax".into(), col(ymaxs));
        let xmins: Vec<f64> = xs.iter().map(|x| x - 0.45).collect();
        let xmaxs: Vec<f64> = xs.iter().map(|x| x + 0.45).collect();
        df.columns.insert("xmin".into(), col(&xmins));
        df.columns.insert("xmax".into(), col(&xmaxs));
        df
    }

    #[test]
    fn test_stack() {
        let mut df = bars(&[1.0, 1.0, 1.0], &[0.0; 3], &[2.0, 3.0, 5.0]);
        stack(&mut df);
        assert_eq!(df.columns["ymin"].data, vec![0.0, 2.0, 5.0]);
        assert_eq!(df.columns["ymax"].data, vec![2.0, 5.0, 10.0]);
    }

    #[test]
    fn test_fill_sums_to_one() {
        let mut df = bars(&[1.0, 1.0, 2.0, 2.0], &[0.0; 4], &[2.0, 6.0, 1.0, 3.0]);
        fill(&mut df);
        let ymin = &df.columns["ymin"].data;
        let ymax = &df.columns["ymax"].data;
        let total_at = |x: f64| -> f64 {
            (0..df.n)
                .filter(|i| df.columns["x"].data[*i] == x)
                .map(|i| ymax[i] - ymin[i])
                .sum()
        };
        assert!((total_at(1.0) - 1.0).abs() < 1e-12);
        assert!((total_at(2.0) - 1.0).abs() < 1e-12);
        assert!((ymax[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_dodge_disjoint_intervals() {
        let mut df = bars(&[1.0, 1.0, 1.0], &[0.0; 3], &[1.0; 3]);
        dodge(&mut df);
        let xmin = &df.columns["xmin"].data;
        let xmax = &df.columns["xmax"].data;
        assert!((xmin[0] - 0.55).abs() < 1e-12);
        assert!((xmax[2] - 1.45).abs() < 1e-12);
        for i in 0..3 {
            assert!((xmax[i] - xmin[i] - 0.3).abs() < 1e-12);
        }
        for i in 0..2 {
            assert!((xmax[i] - xmin[i + 1]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_jitter_stays_close() {
        let mut df = bars(&[1.0, 2.0, 3.0], &[0.0; 3], &[1.0; 3]);
        jitter(&mut df);
        for (i, x) in df.columns["x"].data.iter().enumerate() {
            assert!((x - (i as f64 + 1.0)).abs() <= 0.4 + 1e-12);
        }
    }
}
