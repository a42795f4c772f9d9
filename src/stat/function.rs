//! Function sampling

use std::sync::Arc;

use crate::data::{Column, DataFrame, FieldType};
use crate::Result;

use super::StatContext;

/// Draw a user function by sampling it across the panel's x domain.
#[derive(Clone)]
pub struct StatFunction {
    pub f: Arc<dyn Fn(f64) -> f64 + Send + Sync>,
    /// Number of samples; 0 selects the default of 101, and fewer than
    /// 2 samples are never used.
    pub n: usize,
}

impl std::fmt::Debug for StatFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StatFunction(n={})", self.n)
    }
}

impl StatFunction {
    pub fn apply(&self, data: &DataFrame, ctx: &StatContext) -> Result<Option<DataFrame>> {
        let (xmin, xmax) = ctx.x_domain;
        if !xmin.is_finite() || !xmax.is_finite() {
            return Ok(None);
        }
        let n = if self.n == 0 { 101 } else { self.n.max(2) };

        let pool = Arc::clone(&data.pool);
        let mut result = DataFrame::new("function", Arc::clone(&pool));
        result.n = n;
        let mut xf = Column::new(n, FieldType::Float, Arc::clone(&pool));
        let mut yf = Column::new(n, FieldType::Float, Arc::clone(&pool));

        let delta = (xmax - xmin) / (n - 1) as f64;
        for i in 0..n {
            let x = xmin + i as f64 * delta;
            xf.data[i] = x;
            yf.data[i] = (self.f)(x);
        }
        result.columns.insert("x".into(), xf);
        result.columns.insert("y".into(), yf);
        Ok(Some(result))
    }
}
