//! Statistical transforms
//!
//! A stat is a pure function from a data frame (plus panel context) to
//! a data frame. Each declares the aesthetics it needs, the ones it can
//! use, and how to handle extra fields: ignore them, refuse to run, or
//! partition the data on them and re-apply itself per group.
//!
//! # Architecture
//!
//! - `Stat`: enum of all transforms, the unit of dispatch
//! - `StatInfo`: needed/optional aesthetics and extra-field policy
//! - [`apply_with_policy`]: the entry point the pipeline uses; it
//!   enforces the declared contract before delegating to the transform

use std::sync::Arc;

use crate::data::DataFrame;
use crate::{PlotError, Result};

mod bin;
mod boxplot;
mod function;
mod label;
mod linreg;
mod smooth;

pub use bin::StatBin;
pub use boxplot::StatBoxplot;
pub use function::StatFunction;
pub use label::StatLabel;
pub use linreg::StatLinReg;
pub use smooth::StatSmooth;

/// How a stat treats input fields outside its declared aesthetics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraFields {
    /// Pass the whole frame through untouched.
    Ignore,
    /// Refuse to run when extras are present.
    Fail,
    /// Partition recursively on each extra field (which must be
    /// discrete), apply per leaf, re-attach the field as a constant
    /// column and append the leaf results.
    Group,
}

/// Declared contract of a stat.
#[derive(Debug, Clone, Copy)]
pub struct StatInfo {
    pub needed: &'static [&'static str],
    pub optional: &'static [&'static str],
    pub extra: ExtraFields,
}

/// Panel context available to a stat.
#[derive(Debug, Clone, Copy)]
pub struct StatContext {
    /// Trained domain of the panel's x scale.
    pub x_domain: (f64, f64),
}

impl Default for StatContext {
    fn default() -> Self {
        StatContext {
            x_domain: (f64::INFINITY, f64::NEG_INFINITY),
        }
    }
}

/// A statistical transform.
#[derive(Clone)]
pub enum Stat {
    /// Pass data through unchanged.
    Identity,
    Bin(StatBin),
    LinReg(StatLinReg),
    Smooth(StatSmooth),
    Label(StatLabel),
    Function(StatFunction),
    Boxplot(StatBoxplot),
}

impl Stat {
    pub fn bin() -> Stat {
        Stat::Bin(StatBin::default())
    }

    pub fn lin_reg() -> Stat {
        Stat::LinReg(StatLinReg)
    }

    pub fn smooth() -> Stat {
        Stat::Smooth(StatSmooth::default())
    }

    /// Label values through `format`.
    pub fn label(format: impl Fn(f64) -> String + Send + Sync + 'static) -> Stat {
        Stat::Label(StatLabel {
            format: Arc::new(format),
        })
    }

    /// Sample a user function across the panel's x domain.
    pub fn function(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Stat {
        Stat::Function(StatFunction {
            f: Arc::new(f),
            n: 0,
        })
    }

    pub fn boxplot() -> Stat {
        Stat::Boxplot(StatBoxplot)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stat::Identity => "identity",
            Stat::Bin(_) => "bin",
            Stat::LinReg(_) => "linreg",
            Stat::Smooth(_) => "smooth",
            Stat::Label(_) => "label",
            Stat::Function(_) => "function",
            Stat::Boxplot(_) => "boxplot",
        }
    }

    pub fn info(&self) -> StatInfo {
        match self {
            Stat::Identity => StatInfo {
                needed: &[],
                optional: &[],
                extra: ExtraFields::Ignore,
            },
            Stat::Bin(_) => StatInfo {
                needed: &["x"],
                optional: &["weight"],
                extra: ExtraFields::Group,
            },
            Stat::LinReg(_) | Stat::Smooth(_) => StatInfo {
                needed: &["x", "y"],
                optional: &["weight"],
                extra: ExtraFields::Group,
            },
            Stat::Label(_) => StatInfo {
                needed: &["x", "y", "value"],
                optional: &["color"],
                extra: ExtraFields::Ignore,
            },
            Stat::Function(_) => StatInfo {
                needed: &[],
                optional: &[],
                extra: ExtraFields::Ignore,
            },
            Stat::Boxplot(_) => StatInfo {
                needed: &["x", "y"],
                optional: &[],
                extra: ExtraFields::Group,
            },
        }
    }

    /// Run the raw transform. `None` means "nothing to show" (empty
    /// input, degenerate data); the owning layer is then skipped.
    /// Contract checks live in [`apply_with_policy`].
    pub fn apply(&self, data: &DataFrame, ctx: &StatContext) -> Result<Option<DataFrame>> {
        match self {
            Stat::Identity => Ok(Some(data.clone())),
            Stat::Bin(s) => s.apply(data),
            Stat::LinReg(s) => s.apply(data),
            Stat::Smooth(s) => s.apply(data),
            Stat::Label(s) => s.apply(data),
            Stat::Function(s) => s.apply(data, ctx),
            Stat::Boxplot(s) => s.apply(data),
        }
    }
}

impl std::fmt::Debug for Stat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Stat::{}", self.name())
    }
}

/// Apply `stat` to `data` honoring its declared contract: verify the
/// needed aesthetics, then dispatch per the extra-field policy.
pub fn apply_with_policy(
    stat: &Stat,
    data: &DataFrame,
    ctx: &StatContext,
) -> Result<Option<DataFrame>> {
    let info = stat.info();
    for aes in info.needed {
        if !data.has(aes) {
            return Err(PlotError::MissingRequiredAes {
                consumer: stat.name().to_string(),
                aes: aes.to_string(),
            });
        }
    }

    let used: Vec<&str> = info.needed.iter().chain(info.optional).copied().collect();
    let extras: Vec<String> = data
        .field_names()
        .into_iter()
        .filter(|f| !used.contains(&f.as_str()))
        .collect();

    match info.extra {
        ExtraFields::Ignore => stat.apply(data, ctx),
        ExtraFields::Fail => {
            if !extras.is_empty() {
                return Err(PlotError::ExcessFields {
                    stat: stat.name().to_string(),
                    fields: extras,
                });
            }
            stat.apply(data, ctx)
        }
        ExtraFields::Group => {
            for f in &extras {
                if !data.columns[f].discrete() {
                    return Err(PlotError::NotDiscreteExtraFields {
                        stat: stat.name().to_string(),
                        field: f.clone(),
                    });
                }
            }
            apply_grouped(stat, data, ctx, &extras)
        }
    }
}

/// Recursively partition `data` on `fields`, apply `stat` on each leaf,
/// re-attach the partitioning field as a constant column, and append
/// the results.
fn apply_grouped(
    stat: &Stat,
    data: &DataFrame,
    ctx: &StatContext,
    fields: &[String],
) -> Result<Option<DataFrame>> {
    let Some(field) = fields.first() else {
        return stat.apply(data, ctx);
    };

    let levels = data.levels(field)?;
    let parts = data.partition(field, &levels);
    let mut result: Option<DataFrame> = None;
    for (part, level) in parts.iter().zip(&levels) {
        let Some(mut leaf) = apply_grouped(stat, part, ctx, &fields[1..])? else {
            continue;
        };
        let constant = data.columns[field].constant(*level, leaf.n);
        leaf.columns.insert(field.clone(), constant);
        match &mut result {
            None => result = Some(leaf),
            Some(acc) => acc.append(&leaf)?,
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::sample_frame;

    #[test]
    fn test_identity_passthrough() {
        let df = sample_frame();
        let out = apply_with_policy(&Stat::Identity, &df, &StatContext::default())
            .unwrap()
            .unwrap();
        assert_eq!(out.n, df.n);
        assert_eq!(out.field_names(), df.field_names());
    }

    #[test]
    fn test_missing_needed_aes() {
        let df = sample_frame();
        let err = apply_with_policy(&Stat::bin(), &df, &StatContext::default()).unwrap_err();
        assert!(matches!(err, PlotError::MissingRequiredAes { .. }));
    }

    #[test]
    fn test_group_on_continuous_extra_fails() {
        let mut df = sample_frame();
        df.rename("Height", "x");
        df.rename("Weight", "y");
        // Age and BMI remain; BMI is continuous
        df.delete("Origin");
        df.delete("Group");
        df.delete("Age");
        let err = apply_with_policy(&Stat::lin_reg(), &df, &StatContext::default()).unwrap_err();
        assert!(matches!(err, PlotError::NotDiscreteExtraFields { .. }));
    }

    #[test]
    fn test_group_on_extra_partitions_and_reattaches() {
        let mut df = sample_frame();
        df.rename("Height", "x");
        df.rename("Weight", "y");
        df.delete("BMI");
        df.delete("Age");
        df.delete("Group");
        // One regression per Origin level, each with the level re-attached.
        let out = apply_with_policy(&Stat::lin_reg(), &df, &StatContext::default())
            .unwrap()
            .unwrap();
        assert_eq!(out.n, 3);
        assert!(out.has("Origin"));
        assert!(out.has("intercept"));
        assert!(out.has("slope"));
        let origins = out.levels("Origin").unwrap();
        assert_eq!(origins.len(), 3);
    }

    #[test]
    fn test_group_on_two_extras() {
        let mut df = sample_frame();
        df.rename("BMI", "x");
        df.delete("Height");
        df.delete("Weight");
        df.delete("Age");
        // Extras: Group (4 levels) and Origin (3 levels); only the
        // combinations present in the data produce leaves.
        let out = apply_with_policy(&Stat::bin(), &df, &StatContext::default())
            .unwrap()
            .unwrap();
        assert!(out.has("Group"));
        assert!(out.has("Origin"));
        assert!(out.has("count"));
        let total: f64 = out.columns["count"].data.iter().sum();
        assert_eq!(total, 20.0);
    }
}
