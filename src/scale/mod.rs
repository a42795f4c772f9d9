//! Scales
//!
//! A scale owns everything about one aesthetic: the empirical domain
//! gathered during training, an optional transform, tick breaks and
//! labels, and - once finalized - the functions mapping a training-space
//! value to a normalized position, a color or a discrete style index.
//!
//! # Life cycle
//!
//! Scales move through two phases. During passes 2-5 of the pipeline
//! they are *trained*: every column mapped to the aesthetic widens the
//! domain. Pass 6 *finalizes* them: the working `[min, max]` range,
//! breaks and labels are fixed and the mapping functions become
//! available. Finalization is idempotent and guarded by `finalized`;
//! after it the scale is read-only.
//!
//! Within a plot a scale instance may be shared by every panel, or
//! copied per panel column (free x) / per panel row (free y). Instances
//! live in a plot-owned [`ScaleArena`] and panels address them by
//! [`ScaleId`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::data::{Column, DataFrame, FieldType, FloatSet};
use crate::pool::StringPool;
use crate::style::Color;
use crate::{PlotError, Result};

pub mod breaks;
mod guide;
pub mod transform;

pub use transform::Transform;

/// Default number of breaks requested on a continuous scale.
const DEFAULT_BREAK_COUNT: usize = 5;

/// Scale state for one aesthetic.
#[derive(Debug, Clone)]
pub struct Scale {
    /// Aesthetic this scale maps (x, y, color, ...).
    pub aesthetic: String,
    /// Human title, used for axis labels and legend headers.
    pub name: String,

    pub domain_type: FieldType,
    pub discrete: bool,
    pub time: bool,

    pub transform: Transform,

    /// Manual domain override for continuous scales; unset while
    /// `fix_min == fix_max`.
    pub fix_min: f64,
    pub fix_max: f64,

    /// Relative and absolute expansion applied to the working range.
    pub expand_rel: f64,
    pub expand_abs: f64,

    /// Tick positions; empty means automatic selection at finalize.
    pub breaks: Vec<f64>,
    /// Tick labels; empty means render the breaks.
    pub labels: Vec<String>,

    /// Empirical domain collected by training.
    pub domain_min: f64,
    pub domain_max: f64,
    pub domain_levels: FloatSet,

    /// Finalized working range. All finalized scales are continuous in
    /// this range; discrete levels sit on 1..=n within it.
    pub min: f64,
    pub max: f64,

    /// Saturation and value of the HSV color ramp.
    pub hsv_saturation: f64,
    pub hsv_value: f64,

    pub finalized: bool,

    /// Sorted levels, fixed by discrete finalization.
    levels: Vec<f64>,
}

impl Scale {
    /// A fresh scale for `aesthetic`, typed after the column that first
    /// mapped to it.
    pub fn new(aesthetic: &str, name: &str, ftype: FieldType) -> Scale {
        Scale {
            aesthetic: aesthetic.to_string(),
            name: name.to_string(),
            domain_type: ftype,
            discrete: ftype.discrete(),
            time: ftype == FieldType::Time,
            transform: Transform::Identity,
            fix_min: 0.0,
            fix_max: 0.0,
            expand_rel: 0.05,
            expand_abs: 0.0,
            breaks: Vec::new(),
            labels: Vec::new(),
            domain_min: f64::INFINITY,
            domain_max: f64::NEG_INFINITY,
            domain_levels: FloatSet::new(),
            min: 0.0,
            max: 0.0,
            hsv_saturation: 1.0,
            hsv_value: 0.8,
            finalized: false,
            levels: Vec::new(),
        }
    }

    /// Attach a transform. Discrete and time scales cannot be
    /// transformed.
    pub fn set_transform(&mut self, transform: Transform) -> Result<()> {
        if transform != Transform::Identity && (self.discrete || self.time) {
            return Err(PlotError::CannotTransform {
                aes: self.aesthetic.clone(),
                kind: if self.discrete { "discrete" } else { "time" },
            });
        }
        self.transform = transform;
        Ok(())
    }

    // -------------------------------------------------------------------
    // Training

    /// Widen the domain to cover the data in `col`.
    pub fn train(&mut self, col: &Column) {
        if col.discrete() {
            self.domain_levels.join(&col.levels());
            let levels = self.domain_levels.elements();
            if let (Some(first), Some(last)) = (levels.first(), levels.last()) {
                self.domain_min = self.domain_min.min(*first);
                self.domain_max = self.domain_max.max(*last);
            }
        } else if let Some((min, max, _, _)) = col.min_max() {
            self.domain_min = self.domain_min.min(min);
            self.domain_max = self.domain_max.max(max);
        }
        log::debug!(
            "trained scale {} on {} values -> domain [{}, {}], {} levels",
            self.aesthetic,
            col.data.len(),
            self.domain_min,
            self.domain_max,
            self.domain_levels.len()
        );
    }

    /// Widen a continuous domain with bare values (NaN ignored).
    pub fn train_by_value(&mut self, xs: &[f64]) -> Result<()> {
        if self.discrete {
            return Err(PlotError::DiscreteTrainByValue(self.aesthetic.clone()));
        }
        for &x in xs {
            if x.is_nan() {
                continue;
            }
            self.domain_min = self.domain_min.min(x);
            self.domain_max = self.domain_max.max(x);
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Finalization

    /// Fix the working range, breaks and labels and make the mapping
    /// functions available. Idempotent.
    pub fn finalize(&mut self, pool: &Arc<StringPool>) -> Result<()> {
        if self.finalized {
            return Ok(());
        }
        if self.discrete {
            self.finalize_discrete(pool);
        } else {
            self.finalize_continuous()?;
        }
        self.finalized = true;
        Ok(())
    }

    fn finalize_discrete(&mut self, pool: &Arc<StringPool>) {
        let levels = self.domain_levels.elements();
        let n = levels.len();

        // Levels sit on 1..=n, but position-adjusted geoms may have
        // trained coordinates with sub-unit offsets around them.
        self.min = 1.0;
        self.max = n as f64;
        let lo = discrete_to_cont(self.domain_min, &levels);
        let hi = discrete_to_cont(self.domain_max, &levels);
        self.min = self.min.min(lo);
        self.max = self.max.max(hi);

        let expand = ((self.max - self.min) * self.expand_rel + self.expand_abs).max(0.1);
        self.min -= expand;
        self.max += expand;

        self.breaks = levels.clone();
        self.labels = levels
            .iter()
            .map(|l| match self.domain_type {
                FieldType::String => pool.get(*l as i64),
                FieldType::Int => format!("{}", *l as i64),
                other => panic!(
                    "discrete scale {} with domain type {}",
                    self.aesthetic, other
                ),
            })
            .collect();
        self.levels = levels;
    }

    fn finalize_continuous(&mut self) -> Result<()> {
        self.min = self.domain_min;
        self.max = self.domain_max;
        if self.fix_min != self.fix_max {
            self.min = self.fix_min;
            self.max = self.fix_max;
        }
        let expand = (self.max - self.min) * self.expand_rel + self.expand_abs;
        self.min -= expand;
        self.max += expand;

        if self.breaks.is_empty() {
            self.breaks = if self.time {
                breaks::time_breaks(self.min, self.max)
            } else {
                breaks::continuous_breaks(self.min, self.max, DEFAULT_BREAK_COUNT, self.domain_max)
            };
        }
        self.prepare_labels()
    }

    fn prepare_labels(&mut self) -> Result<()> {
        if self.breaks.is_empty() {
            return Ok(());
        }
        if self.labels.is_empty() {
            self.labels = self
                .breaks
                .iter()
                .map(|b| {
                    if self.time {
                        format_time(*b)
                    } else {
                        self.transform.format(*b, &format!("{:.1}", b))
                    }
                })
                .collect();
            return Ok(());
        }
        // User-provided labels: truncate excess, refuse to invent more.
        if self.labels.len() > self.breaks.len() {
            self.labels.truncate(self.breaks.len());
        } else if self.labels.len() < self.breaks.len() {
            return Err(PlotError::LabelCountMismatch {
                labels: self.labels.len(),
                breaks: self.breaks.len(),
            });
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Mapping (available after finalization)

    /// Map a training-space value to a canvas-normalized position in
    /// `[0, 1]`.
    pub fn pos(&self, x: f64) -> f64 {
        debug_assert!(self.finalized, "pos on unfinalized scale {}", self.aesthetic);
        let full_range = self.max - self.min;
        if self.discrete {
            (discrete_to_cont(x, &self.levels) - self.min) / full_range
        } else {
            (x - self.min) / full_range
        }
    }

    /// Map a training-space value to a color on the HSV ramp. The
    /// position is rescaled to hue in `[0, 5/6]` to keep the ramp
    /// non-cyclic.
    pub fn color(&self, x: f64) -> Color {
        let h = self.pos(x) * (5.0 / 6.0);
        Color::from_hsv(h, self.hsv_saturation, self.hsv_value)
    }

    /// Map a training-space value to a discrete style index in
    /// `[0, PointShape::MAX]`.
    pub fn style(&self, x: f64) -> i32 {
        use crate::style::PointShape;
        (self.pos(x) * PointShape::MAX as f64) as i32
    }
}

/// Re-map a discrete coordinate (a level value plus a sub-unit
/// adjustment in (-0.5, 0.5)) to the continuous 1..=n level axis.
fn discrete_to_cont(x: f64, levels: &[f64]) -> f64 {
    let xi = (x + 0.5).floor();
    let dx = x - xi;
    let i = levels
        .iter()
        .position(|v| *v == xi)
        .map(|i| i as i64)
        .unwrap_or(-1);
    (i + 1) as f64 + dx
}

fn format_time(x: f64) -> String {
    chrono::DateTime::from_timestamp(x as i64, 0)
        .unwrap_or_default()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scale {:?} named {:?}: ", self.aesthetic, self.name)?;
        if self.discrete {
            write!(f, "discrete\n    Domain:    {:?}", self.domain_levels.elements())?;
        } else if self.time {
            write!(
                f,
                "time\n    Domain:    {} -- {}",
                format_time(self.domain_min),
                format_time(self.domain_max)
            )?;
        } else {
            write!(
                f,
                "continuous\n    Domain:    {:.2} -- {:.2}",
                self.domain_min, self.domain_max
            )?;
        }
        write!(f, "\n    Transform: {}", self.transform)?;
        write!(f, "\n    Breaks:   ")?;
        if self.breaks.is_empty() {
            write!(f, " - empty -")?;
        } else {
            for b in &self.breaks {
                write!(f, "{:8.1}", b)?;
            }
            write!(f, "\n    Labels:   ")?;
            for l in &self.labels {
                write!(f, "{:>8}", if l.len() >= 8 { &l[..7] } else { l.as_str() })?;
            }
        }
        write!(
            f,
            "\n    Status:    {}",
            if self.finalized { "finalized" } else { "training" }
        )
    }
}

// =============================================================================
// Arena and panel views
// =============================================================================

/// Handle of a scale instance inside a plot's [`ScaleArena`].
pub type ScaleId = usize;

/// Plot-owned storage for every live scale instance. Panels address
/// scales by id, which makes sharing an instance across panels a matter
/// of storing the same id.
#[derive(Debug, Default)]
pub struct ScaleArena {
    items: Vec<Scale>,
}

impl ScaleArena {
    pub fn alloc(&mut self, scale: Scale) -> ScaleId {
        self.items.push(scale);
        self.items.len() - 1
    }

    pub fn get(&self, id: ScaleId) -> &Scale {
        &self.items[id]
    }

    pub fn get_mut(&mut self, id: ScaleId) -> &mut Scale {
        &mut self.items[id]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Read-only view of one panel's scales, used during rendering.
pub struct ScalesView<'a> {
    ids: &'a HashMap<String, ScaleId>,
    arena: &'a ScaleArena,
}

impl<'a> ScalesView<'a> {
    pub fn new(ids: &'a HashMap<String, ScaleId>, arena: &'a ScaleArena) -> Self {
        ScalesView { ids, arena }
    }

    pub fn get(&self, aesthetic: &str) -> Option<&Scale> {
        self.ids.get(aesthetic).map(|id| self.arena.get(*id))
    }
}

/// Mutable view of one panel's scales, used while constructing geoms
/// re-trains them.
pub struct ScalesMut<'a> {
    ids: &'a HashMap<String, ScaleId>,
    arena: &'a mut ScaleArena,
}

impl<'a> ScalesMut<'a> {
    pub fn new(ids: &'a HashMap<String, ScaleId>, arena: &'a mut ScaleArena) -> Self {
        ScalesMut { ids, arena }
    }

    pub fn get(&self, aesthetic: &str) -> Option<&Scale> {
        self.ids.get(aesthetic).map(|id| self.arena.get(*id))
    }

    pub fn get_mut(&mut self, aesthetic: &str) -> Option<&mut Scale> {
        let id = *self.ids.get(aesthetic)?;
        Some(self.arena.get_mut(id))
    }

    /// Train scales according to a spec of the form
    /// `"x:xmin,xmax y:ymin,ymax"`: for each aesthetic, every listed
    /// field present in `data` is trained into the matching scale.
    pub fn train_fields(&mut self, spec: &str, data: &DataFrame) {
        for part in spec.split_whitespace() {
            let Some((aes, fields)) = part.split_once(':') else {
                continue;
            };
            let Some(&id) = self.ids.get(aes) else {
                continue;
            };
            for field in fields.split(',') {
                if let Some(col) = data.columns.get(field) {
                    self.arena.get_mut(id).train(col);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::sample_frame;

    fn trained_weight_scale() -> (Scale, Arc<StringPool>) {
        let df = sample_frame();
        let mut scale = Scale::new("y", "Weight", FieldType::Float);
        scale.train(&df.columns["Weight"]);
        (scale, Arc::clone(&df.pool))
    }

    #[test]
    fn test_train_continuous() {
        let (scale, _) = trained_weight_scale();
        assert_eq!(scale.domain_min, 55.0);
        assert_eq!(scale.domain_max, 99.0);
    }

    #[test]
    fn test_finalize_continuous_endpoints() {
        let (mut scale, pool) = trained_weight_scale();
        scale.finalize(&pool).unwrap();
        assert!(scale.pos(scale.min).abs() < 1e-12);
        assert!((scale.pos(scale.max) - 1.0).abs() < 1e-12);
        assert!(!scale.breaks.is_empty());
        assert_eq!(scale.breaks.len(), scale.labels.len());
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let (mut scale, pool) = trained_weight_scale();
        scale.finalize(&pool).unwrap();
        let snapshot = (
            scale.min,
            scale.max,
            scale.breaks.clone(),
            scale.labels.clone(),
        );
        scale.finalize(&pool).unwrap();
        assert_eq!(
            snapshot,
            (scale.min, scale.max, scale.breaks, scale.labels)
        );
    }

    #[test]
    fn test_fixed_domain_override() {
        let (mut scale, pool) = trained_weight_scale();
        scale.fix_min = 0.0;
        scale.fix_max = 100.0;
        scale.expand_rel = 0.0;
        scale.finalize(&pool).unwrap();
        assert_eq!((scale.min, scale.max), (0.0, 100.0));
    }

    #[test]
    fn test_discrete_finalize() {
        let df = sample_frame();
        let mut scale = Scale::new("x", "Origin", FieldType::String);
        scale.train(&df.columns["Origin"]);
        scale.finalize(&df.pool).unwrap();
        assert_eq!(scale.breaks.len(), 3);
        let mut labels = scale.labels.clone();
        labels.sort();
        assert_eq!(labels, ["ch", "de", "uk"]);
        // Levels sit on 1..=3 of the working range.
        let positions: Vec<f64> = scale.breaks.iter().map(|b| scale.pos(*b)).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(positions.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_discrete_pos_keeps_offsets() {
        let df = sample_frame();
        let mut scale = Scale::new("x", "Origin", FieldType::String);
        scale.train(&df.columns["Origin"]);
        scale.finalize(&df.pool).unwrap();
        let level = scale.breaks[1];
        let lo = scale.pos(level - 0.3);
        let mid = scale.pos(level);
        let hi = scale.pos(level + 0.3);
        assert!(lo < mid && mid < hi);
        assert!(((hi - lo) - 0.6 / (scale.max - scale.min)).abs() < 1e-12);
    }

    #[test]
    fn test_color_ramp() {
        let mut scale = Scale::new("color", "v", FieldType::Float);
        scale.train_by_value(&[0.0, 100.0]).unwrap();
        scale.expand_rel = 0.0;
        scale.finalize(&Arc::new(StringPool::new())).unwrap();
        let lo = scale.color(0.0);
        let mid = scale.color(50.0);
        let hi = scale.color(100.0);
        assert_ne!(lo, hi);
        // endpoints and midpoint land on the expected hues
        assert_eq!(lo, Color::from_hsv(0.0, 1.0, 0.8));
        assert_eq!(mid, Color::from_hsv(0.5 * (5.0 / 6.0), 1.0, 0.8));
        assert_eq!(hi, Color::from_hsv(5.0 / 6.0, 1.0, 0.8));
    }

    #[test]
    fn test_style_range() {
        let (mut scale, pool) = trained_weight_scale();
        scale.finalize(&pool).unwrap();
        for x in [55.0, 70.0, 99.0] {
            let s = scale.style(x);
            assert!((0..=crate::style::PointShape::MAX).contains(&s));
        }
    }

    #[test]
    fn test_transform_rejected_on_discrete() {
        let mut scale = Scale::new("x", "Origin", FieldType::String);
        assert!(matches!(
            scale.set_transform(Transform::Log10),
            Err(PlotError::CannotTransform { .. })
        ));
        assert_eq!(scale.transform, Transform::Identity);
    }

    #[test]
    fn test_train_by_value_discrete_fails() {
        let mut scale = Scale::new("x", "Origin", FieldType::String);
        assert!(matches!(
            scale.train_by_value(&[1.0]),
            Err(PlotError::DiscreteTrainByValue(_))
        ));
    }

    #[test]
    fn test_label_mismatch() {
        let (mut scale, pool) = trained_weight_scale();
        scale.labels = vec!["one".into()];
        assert!(matches!(
            scale.finalize(&pool),
            Err(PlotError::LabelCountMismatch { .. })
        ));
    }

    #[test]
    fn test_user_labels_truncated() {
        let (mut scale, pool) = trained_weight_scale();
        scale.breaks = vec![60.0, 80.0];
        scale.labels = vec!["a".into(), "b".into(), "c".into()];
        scale.finalize(&pool).unwrap();
        assert_eq!(scale.labels, ["a", "b"]);
    }

    #[test]
    fn test_log10_label_format() {
        let mut scale = Scale::new("x", "v", FieldType::Float);
        scale.set_transform(Transform::Log10).unwrap();
        scale.train_by_value(&[0.0, 4.0]).unwrap();
        scale.expand_rel = 0.0;
        scale.finalize(&Arc::new(StringPool::new())).unwrap();
        assert!(scale.labels.iter().all(|l| l.starts_with("10^{")));
    }
}
