//! Scale transforms
//!
//! A transform re-expresses column data before training (log axes and
//! friends). Each carries its inverse and a label formatter consulted
//! when the finalized scale renders its break labels.

use serde::{Deserialize, Serialize};

/// Transform attached to a continuous scale.
///
/// Discrete and time scales cannot be transformed; the pipeline resets
/// such a transform to `Identity` and logs a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    #[default]
    Identity,
    Log10,
    /// Reciprocal, `x -> 1/x`.
    InvX,
    Sqrt,
}

impl Transform {
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Identity => "identity",
            Transform::Log10 => "log10",
            Transform::InvX => "1/x",
            Transform::Sqrt => "sqrt",
        }
    }

    /// Forward transform applied to column data.
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Transform::Identity => x,
            Transform::Log10 => x.log10(),
            Transform::InvX => 1.0 / x,
            Transform::Sqrt => x.sqrt(),
        }
    }

    /// Inverse of [`Transform::apply`].
    pub fn inverse(&self, y: f64) -> f64 {
        match self {
            Transform::Identity => y,
            Transform::Log10 => 10f64.powf(y),
            Transform::InvX => 1.0 / y,
            Transform::Sqrt => y * y,
        }
    }

    /// Decorate an already-formatted break label with the transform's
    /// notation.
    pub fn format(&self, y: f64, formatted: &str) -> String {
        match self {
            Transform::Identity => formatted.to_string(),
            Transform::Log10 => format!("10^{{{}}}", formatted),
            Transform::InvX => format!("1/{{{}}}", formatted),
            Transform::Sqrt => format!("{:.1}", y * y),
        }
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for t in [Transform::Identity, Transform::Log10, Transform::InvX, Transform::Sqrt] {
            for x in [0.5, 1.0, 7.0, 100.0] {
                assert!(
                    (t.inverse(t.apply(x)) - x).abs() < 1e-9,
                    "{} at {}",
                    t.name(),
                    x
                );
            }
        }
    }

    #[test]
    fn test_format() {
        assert_eq!(Transform::Identity.format(2.0, "2.0"), "2.0");
        assert_eq!(Transform::Log10.format(2.0, "2.0"), "10^{2.0}");
        assert_eq!(Transform::Sqrt.format(3.0, "3.0"), "9.0");
    }
}
