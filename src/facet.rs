//! Faceting specification
//!
//! Faceting partitions the plot data into a grid of panels by one or
//! two discrete fields. The zero value means no faceting.

use serde::{Deserialize, Serialize};

/// How to split data into a panel grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faceting {
    /// Field whose levels become panel columns; empty for none.
    pub columns: String,
    /// Field whose levels become panel rows; empty for none.
    pub rows: String,

    /// Add margin panels: a rightmost column per row with the row's
    /// full data, a bottom row per column with the column's full data,
    /// and a bottom-right panel with everything.
    pub totals: bool,

    /// Which positional scales are free, i.e. not shared across the
    /// whole grid: `""` (all shared), `"x"` (per panel column), `"y"`
    /// (per panel row) or `"xy"`.
    pub free_scale: String,

    /// Strip labels, populated during panel creation.
    #[serde(skip)]
    pub col_strips: Vec<String>,
    #[serde(skip)]
    pub row_strips: Vec<String>,
}

impl Faceting {
    pub fn is_grid(&self) -> bool {
        !self.columns.is_empty() || !self.rows.is_empty()
    }

    pub fn free_x(&self) -> bool {
        self.free_scale.contains('x')
    }

    pub fn free_y(&self) -> bool {
        self.free_scale.contains('y')
    }
}
