//! Column-store data frame with string interning
//!
//! A [`DataFrame`] is a named collection of equal-length [`Column`]s.
//! Every column stores `f64` values regardless of its semantic
//! [`FieldType`]: integers are stored relative to a per-column origin,
//! strings as pool indices, times as seconds since a per-column origin.
//! The frame exists to feed the plot pipeline, not to be a general data
//! library; operations are limited to what faceting, stats and geoms
//! need.

use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::pool::StringPool;
use crate::{PlotError, Result};

// =============================================================================
// Field types
// =============================================================================

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    Float,
    String,
    Time,
    Vector,
}

impl FieldType {
    /// Int and String columns are discrete; everything else is continuous.
    pub fn discrete(&self) -> bool {
        matches!(self, FieldType::Int | FieldType::String)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Int => "Int",
            FieldType::Float => "Float",
            FieldType::String => "String",
            FieldType::Time => "Time",
            FieldType::Vector => "Vector",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Float sets
// =============================================================================

/// A set of `f64` values, compared bitwise.
///
/// Discrete levels are exact encodings (integers, pool indices), so
/// bitwise equality is the right notion here.
#[derive(Debug, Clone, Default)]
pub struct FloatSet {
    items: HashSet<u64>,
}

impl FloatSet {
    pub fn new() -> Self {
        FloatSet::default()
    }

    pub fn add(&mut self, x: f64) {
        self.items.insert(x.to_bits());
    }

    pub fn contains(&self, x: f64) -> bool {
        self.items.contains(&x.to_bits())
    }

    /// Add all elements of `other`.
    pub fn join(&mut self, other: &FloatSet) {
        self.items.extend(&other.items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements in ascending order.
    pub fn elements(&self) -> Vec<f64> {
        let mut elems: Vec<f64> = self.items.iter().map(|b| f64::from_bits(*b)).collect();
        elems.sort_by(|a, b| a.total_cmp(b));
        elems
    }
}

impl FromIterator<f64> for FloatSet {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut set = FloatSet::new();
        for x in iter {
            set.add(x);
        }
        set
    }
}

// =============================================================================
// Column
// =============================================================================

/// One column of a data frame: a dense `f64` vector plus the metadata
/// needed to interpret it.
#[derive(Debug, Clone)]
pub struct Column {
    pub ftype: FieldType,
    pub data: Vec<f64>,
    /// Integers are stored as `value - origin`, times as
    /// `seconds_since_epoch - origin`.
    pub origin: i64,
    pub pool: Arc<StringPool>,
}

impl Column {
    pub fn new(n: usize, ftype: FieldType, pool: Arc<StringPool>) -> Self {
        Column {
            ftype,
            data: vec![0.0; n],
            origin: 0,
            pool,
        }
    }

    /// A copy carrying type, origin and pool but no data.
    pub fn copy_meta(&self) -> Column {
        Column {
            ftype: self.ftype,
            data: Vec::new(),
            origin: self.origin,
            pool: Arc::clone(&self.pool),
        }
    }

    /// A column with the same metadata holding `n` copies of `x`.
    pub fn constant(&self, x: f64, n: usize) -> Column {
        Column {
            ftype: self.ftype,
            data: vec![x; n],
            origin: self.origin,
            pool: Arc::clone(&self.pool),
        }
    }

    pub fn discrete(&self) -> bool {
        self.ftype.discrete()
    }

    /// Map `f` over the stored values in place. String columns cannot be
    /// transformed numerically.
    pub fn apply(&mut self, f: impl Fn(f64) -> f64) -> Result<()> {
        if self.ftype == FieldType::String {
            return Err(PlotError::ApplyOnStringColumn("<column>".into()));
        }
        for v in &mut self.data {
            *v = f(*v);
        }
        Ok(())
    }

    /// Decode one stored value as an integer.
    pub fn int(&self, x: f64) -> i64 {
        x.floor() as i64 + self.origin
    }

    /// Decode one stored value as a UTC time.
    pub fn time(&self, x: f64) -> DateTime<Utc> {
        DateTime::from_timestamp(x.floor() as i64 + self.origin, 0).unwrap_or_default()
    }

    /// Render one stored value according to the column type.
    pub fn format_value(&self, x: f64) -> String {
        match self.ftype {
            FieldType::Float | FieldType::Vector => format!("{}", x),
            FieldType::Int => format!("{}", self.int(x)),
            FieldType::Time => self.time(x).format("%Y-%m-%d %H:%M:%S").to_string(),
            FieldType::String => self.pool.get(x as i64),
        }
    }

    pub fn format_values(&self, xs: &[f64]) -> Vec<String> {
        xs.iter().map(|x| self.format_value(*x)).collect()
    }

    pub fn as_int(&self) -> Vec<i64> {
        self.data.iter().map(|x| self.int(*x)).collect()
    }

    pub fn as_string(&self) -> Vec<String> {
        self.data.iter().map(|x| self.format_value(*x)).collect()
    }

    pub fn as_time(&self) -> Vec<DateTime<Utc>> {
        self.data.iter().map(|x| self.time(*x)).collect()
    }

    /// Distinct values of a discrete column.
    pub fn levels(&self) -> FloatSet {
        debug_assert!(self.discrete(), "levels on a continuous column");
        self.data.iter().copied().collect()
    }

    /// Minimum and maximum stored value with their indices, skipping
    /// NaN. `None` when the column is empty or all-NaN.
    pub fn min_max(&self) -> Option<(f64, f64, usize, usize)> {
        let mut out: Option<(f64, f64, usize, usize)> = None;
        for (i, &v) in self.data.iter().enumerate() {
            if v.is_nan() {
                continue;
            }
            match &mut out {
                None => out = Some((v, v, i, i)),
                Some((min, max, imin, imax)) => {
                    if v < *min {
                        *min = v;
                        *imin = i;
                    } else if v > *max {
                        *max = v;
                        *imax = i;
                    }
                }
            }
        }
        out
    }

    /// Minimum absolute difference between consecutive values; `+inf`
    /// for columns with fewer than two rows.
    pub fn resolution(&self) -> f64 {
        let mut resolution = f64::INFINITY;
        for w in self.data.windows(2) {
            let r = (w[0] - w[1]).abs();
            if r < resolution {
                resolution = r;
            }
        }
        resolution
    }
}

// =============================================================================
// Values
// =============================================================================

/// A typed value used for row filtering. Converted to the target
/// column's internal `f64` encoding before comparison.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Time(DateTime<Utc>),
}

impl From<i64> for Value {
    fn from(x: i64) -> Self {
        Value::Int(x)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(x) => write!(f, "{}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
            Value::Time(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

// =============================================================================
// DataFrame
// =============================================================================

/// A named collection of equal-length columns.
///
/// Invariant: `columns[name].data.len() == n` for every column.
#[derive(Debug, Clone)]
pub struct DataFrame {
    pub name: String,
    pub n: usize,
    pub columns: HashMap<String, Column>,
    pub pool: Arc<StringPool>,
}

impl DataFrame {
    pub fn new(name: impl Into<String>, pool: Arc<StringPool>) -> Self {
        DataFrame {
            name: name.into(),
            n: 0,
            columns: HashMap::new(),
            pool,
        }
    }

    pub fn has(&self, field: &str) -> bool {
        self.columns.contains_key(field)
    }

    /// Column names in ascending order.
    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.columns.keys().cloned().collect();
        names.sort();
        names
    }

    /// A copy sharing only the metadata (columns are empty, `n` is 0).
    pub fn copy_meta(&self) -> DataFrame {
        DataFrame {
            name: self.name.clone(),
            n: 0,
            columns: self
                .columns
                .iter()
                .map(|(name, col)| (name.clone(), col.copy_meta()))
                .collect(),
            pool: Arc::clone(&self.pool),
        }
    }

    /// Move the column `old` to the name `new`. No-op when equal or when
    /// `old` is absent.
    pub fn rename(&mut self, old: &str, new: &str) {
        if old == new {
            return;
        }
        if let Some(col) = self.columns.remove(old) {
            self.columns.insert(new.to_string(), col);
        }
    }

    pub fn delete(&mut self, field: &str) {
        self.columns.remove(field);
    }

    /// Append the rows of `other`. The two frames must carry exactly the
    /// same column names.
    pub fn append(&mut self, other: &DataFrame) -> Result<()> {
        if self.field_names() != other.field_names() {
            return Err(PlotError::SchemaMismatch {
                frame: self.name.clone(),
                other: other.name.clone(),
            });
        }
        for (name, col) in &mut self.columns {
            col.data.extend_from_slice(&other.columns[name].data);
        }
        self.n += other.n;
        Ok(())
    }

    /// Map `f` over one column in place.
    pub fn apply(&mut self, field: &str, f: impl Fn(f64) -> f64) -> Result<()> {
        let col = self.columns.get_mut(field).ok_or_else(|| PlotError::MissingField {
            frame: self.name.clone(),
            field: field.to_string(),
        })?;
        if col.ftype == FieldType::String {
            return Err(PlotError::ApplyOnStringColumn(field.to_string()));
        }
        col.apply(f)
    }

    /// Extract the rows where `field` equals `value`.
    ///
    /// A missing field returns a plain copy. A string value that was
    /// never interned matches nothing and yields an empty selection.
    pub fn filter(&self, field: &str, value: impl Into<Value>) -> DataFrame {
        let value = value.into();
        let col = match self.columns.get(field) {
            Some(c) => c,
            None => return self.clone(),
        };

        let float_val = match &value {
            Value::Int(x) => Some(*x as f64),
            Value::Float(x) => Some(*x),
            Value::Str(s) => self.pool.find(s).map(|i| i as f64),
            Value::Time(t) => Some((t.timestamp() - col.origin) as f64),
        };

        let mut result = self.copy_meta();
        result.name = format!("{}|{}={}", self.name, field, value);
        let float_val = match float_val {
            Some(v) => v,
            None => return result,
        };

        let key = &col.data;
        for (name, col) in &self.columns {
            let out = &mut result.columns.get_mut(name).unwrap().data;
            for i in 0..self.n {
                if key[i].to_bits() == float_val.to_bits() {
                    out.push(col.data[i]);
                }
            }
        }
        result.n = result.columns.values().next().map_or(0, |c| c.data.len());
        result
    }

    /// Split into one sub-frame per level of `field`. The partitioning
    /// column is removed from the sub-frames; row order is stable.
    pub fn partition(&self, field: &str, levels: &[f64]) -> Vec<DataFrame> {
        let mut parts: Vec<DataFrame> = levels
            .iter()
            .map(|_| {
                let mut p = self.copy_meta();
                p.delete(field);
                p
            })
            .collect();
        let mut index: HashMap<u64, usize> = HashMap::new();
        for (i, level) in levels.iter().enumerate() {
            index.insert(level.to_bits(), i);
        }

        let key = &self.columns[field].data;
        for j in 0..self.n {
            let Some(&i) = index.get(&key[j].to_bits()) else {
                continue;
            };
            for (name, col) in &self.columns {
                if name == field {
                    continue;
                }
                parts[i].columns.get_mut(name).unwrap().data.push(col.data[j]);
            }
            parts[i].n += 1;
        }
        parts
    }

    /// Distinct values of a discrete field, ascending.
    pub fn levels(&self, field: &str) -> Result<Vec<f64>> {
        let col = self.columns.get(field).ok_or_else(|| PlotError::MissingField {
            frame: self.name.clone(),
            field: field.to_string(),
        })?;
        if !col.discrete() {
            return Err(PlotError::NotDiscrete {
                frame: self.name.clone(),
                field: field.to_string(),
            });
        }
        Ok(col.levels().elements())
    }

    /// Min/max of the raw stored values of `field` with their indices;
    /// `None` for a missing or empty column.
    pub fn min_max(&self, field: &str) -> Option<(f64, f64, usize, usize)> {
        self.columns.get(field)?.min_max()
    }

    /// Synthesize a String column whose values join the renderings of
    /// the named discrete columns with `" | "`.
    pub fn grouping_field(&self, names: &[&str]) -> Result<Column> {
        for n in names {
            let col = self.columns.get(*n).ok_or_else(|| PlotError::MissingField {
                frame: self.name.clone(),
                field: n.to_string(),
            })?;
            if !col.discrete() {
                return Err(PlotError::NotDiscrete {
                    frame: self.name.clone(),
                    field: n.to_string(),
                });
            }
        }

        let mut field = Column::new(self.n, FieldType::String, Arc::clone(&self.pool));
        for i in 0..self.n {
            let mut group = String::new();
            for name in names {
                let col = &self.columns[*name];
                if !group.is_empty() {
                    group.push_str(" | ");
                }
                group.push_str(&col.format_value(col.data[i]));
            }
            field.data[i] = self.pool.add(&group) as f64;
        }
        Ok(field)
    }
}

impl Default for DataFrame {
    /// An empty frame with its own pool.
    fn default() -> Self {
        DataFrame::new("", Arc::new(StringPool::new()))
    }
}

impl fmt::Display for DataFrame {
    /// Aligned table dump, one row per line, values rendered per column
    /// type.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.field_names();
        writeln!(f, "Data frame {:?}:", self.name)?;

        let mut widths: Vec<usize> = names.iter().map(|n| n.len()).collect();
        let mut cells: Vec<Vec<String>> = Vec::with_capacity(self.n);
        for i in 0..self.n {
            let row: Vec<String> = names
                .iter()
                .map(|n| {
                    let col = &self.columns[n];
                    col.format_value(col.data[i])
                })
                .collect();
            for (w, cell) in widths.iter_mut().zip(&row) {
                *w = (*w).max(cell.len());
            }
            cells.push(row);
        }

        write!(f, "     ")?;
        for (name, w) in names.iter().zip(&widths) {
            write!(f, "  {:>width$}", name, width = *w)?;
        }
        writeln!(f)?;
        for (i, row) in cells.iter().enumerate() {
            write!(f, "{:5}", i)?;
            for (cell, w) in row.iter().zip(&widths) {
                write!(f, "  {:>width$}", cell, width = *w)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// =============================================================================
// Record conversion
// =============================================================================

/// A typed accessor extracting one field from a record.
pub enum Accessor<R> {
    Int(Box<dyn Fn(&R) -> i64 + Send + Sync>),
    Float(Box<dyn Fn(&R) -> f64 + Send + Sync>),
    Str(Box<dyn Fn(&R) -> String + Send + Sync>),
    Time(Box<dyn Fn(&R) -> DateTime<Utc> + Send + Sync>),
}

/// An explicit descriptor for converting a slice of records into a
/// [`DataFrame`]: one named accessor per column, computed columns
/// included. Replaces runtime reflection over record types.
///
/// # Example
///
/// ```rust,ignore
/// let schema = FrameSchema::new("obs")
///     .int("Age", |o: &Obs| o.age)
///     .str_("Origin", |o| o.origin.clone())
///     .float("Weight", |o| o.weight)
///     .float("BMI", |o| o.weight / (o.height * o.height));
/// let frame = schema.build(&observations, &pool)?;
/// ```
pub struct FrameSchema<R> {
    name: String,
    fields: Vec<(String, Accessor<R>)>,
}

impl<R> FrameSchema<R> {
    pub fn new(name: impl Into<String>) -> Self {
        FrameSchema {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn int(mut self, name: &str, f: impl Fn(&R) -> i64 + Send + Sync + 'static) -> Self {
        self.fields.push((name.to_string(), Accessor::Int(Box::new(f))));
        self
    }

    pub fn float(mut self, name: &str, f: impl Fn(&R) -> f64 + Send + Sync + 'static) -> Self {
        self.fields.push((name.to_string(), Accessor::Float(Box::new(f))));
        self
    }

    pub fn str_(mut self, name: &str, f: impl Fn(&R) -> String + Send + Sync + 'static) -> Self {
        self.fields.push((name.to_string(), Accessor::Str(Box::new(f))));
        self
    }

    pub fn time(
        mut self,
        name: &str,
        f: impl Fn(&R) -> DateTime<Utc> + Send + Sync + 'static,
    ) -> Self {
        self.fields.push((name.to_string(), Accessor::Time(Box::new(f))));
        self
    }

    /// Build a data frame from `rows`, interning strings into `pool`.
    /// Time columns take the first row's timestamp as their origin.
    pub fn build(&self, rows: &[R], pool: &Arc<StringPool>) -> Result<DataFrame> {
        if self.fields.is_empty() {
            return Err(PlotError::UnsupportedDataSource(self.name.clone()));
        }

        let mut df = DataFrame::new(self.name.clone(), Arc::clone(pool));
        df.n = rows.len();
        for (name, accessor) in &self.fields {
            let mut col = match accessor {
                Accessor::Int(_) => Column::new(rows.len(), FieldType::Int, Arc::clone(pool)),
                Accessor::Float(_) => Column::new(rows.len(), FieldType::Float, Arc::clone(pool)),
                Accessor::Str(_) => Column::new(rows.len(), FieldType::String, Arc::clone(pool)),
                Accessor::Time(_) => Column::new(rows.len(), FieldType::Time, Arc::clone(pool)),
            };
            match accessor {
                Accessor::Int(f) => {
                    for (j, r) in rows.iter().enumerate() {
                        col.data[j] = f(r) as f64;
                    }
                }
                Accessor::Float(f) => {
                    for (j, r) in rows.iter().enumerate() {
                        col.data[j] = f(r);
                    }
                }
                Accessor::Str(f) => {
                    for (j, r) in rows.iter().enumerate() {
                        col.data[j] = pool.add(&f(r)) as f64;
                    }
                }
                Accessor::Time(f) => {
                    if let Some(first) = rows.first() {
                        col.origin = f(first).timestamp();
                    }
                    for (j, r) in rows.iter().enumerate() {
                        col.data[j] = (f(r).timestamp() - col.origin) as f64;
                    }
                }
            }
            df.columns.insert(name.clone(), col);
        }
        Ok(df)
    }
}
