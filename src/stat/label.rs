//! Value labeling

use std::sync::Arc;

use crate::data::{Column, DataFrame, FieldType};
use crate::Result;

/// Turn a `value` column into interned text at (x, y).
///
/// Emits `x`, `y` and `text`, plus `color` when it was mapped. The
/// formatter runs per value and its output is stored through the string
/// pool.
#[derive(Clone)]
pub struct StatLabel {
    pub format: Arc<dyn Fn(f64) -> String + Send + Sync>,
}

impl std::fmt::Debug for StatLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StatLabel")
    }
}

impl StatLabel {
    pub fn apply(&self, data: &DataFrame) -> Result<Option<DataFrame>> {
        let pool = Arc::clone(&data.pool);
        let mut result = DataFrame::new(format!("labeling {}", data.name), Arc::clone(&pool));
        result.n = data.n;

        let mut text = Column::new(data.n, FieldType::String, Arc::clone(&pool));
        let values = &data.columns["value"].data;
        for i in 0..data.n {
            text.data[i] = pool.add(&(self.format)(values[i])) as f64;
        }

        result.columns.insert("x".into(), data.columns["x"].clone());
        result.columns.insert("y".into(), data.columns["y"].clone());
        result.columns.insert("text".into(), text);
        if let Some(color) = data.columns.get("color") {
            result.columns.insert("color".into(), color.clone());
        }
        Ok(Some(result))
    }
}
