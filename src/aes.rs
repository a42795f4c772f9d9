//! Aesthetic mappings
//!
//! An [`AesMapping`] maps aesthetic names (x, y, color, fill, size,
//! shape, linetype, alpha, ...) to either a data-frame field name or a
//! literal `"fixed: <value>"`. Styles and themes share the same shape;
//! the merge functions below implement the first-wins layering used to
//! resolve them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Prefix marking a fixed (non-mapped) aesthetic value.
const FIXED_PREFIX: &str = "fixed:";

/// Mapping from aesthetic name to field name or fixed value.
///
/// An empty string value means "unset" and is treated like an absent
/// key by [`merge_aes`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AesMapping(pub HashMap<String, String>);

impl AesMapping {
    pub fn new() -> Self {
        AesMapping::default()
    }

    pub fn get(&self, aes: &str) -> Option<&str> {
        self.0.get(aes).map(|s| s.as_str())
    }

    pub fn set(&mut self, aes: &str, value: &str) {
        self.0.insert(aes.to_string(), value.to_string());
    }

    pub fn contains(&self, aes: &str) -> bool {
        self.0.contains_key(aes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The fixed literal for `aes`, if its value has the
    /// `"fixed: <literal>"` shape.
    pub fn fixed(&self, aes: &str) -> Option<&str> {
        let v = self.get(aes)?;
        v.strip_prefix(FIXED_PREFIX).map(|rest| rest.trim_start())
    }

    /// Aesthetic names and values, each sorted. With `include_all`
    /// false, only field-valued entries (no `":"`) are listed among the
    /// values.
    pub fn used(&self, include_all: bool) -> (Vec<String>, Vec<String>) {
        let mut aes: Vec<String> = self.0.keys().cloned().collect();
        let mut names: Vec<String> = self
            .0
            .values()
            .filter(|v| include_all || !v.contains(':'))
            .cloned()
            .collect();
        aes.sort();
        names.sort();
        (aes, names)
    }

    /// Merge `others` over `self` with last-wins semantics. Used by
    /// layer-level overrides.
    pub fn combine(&self, others: &[&AesMapping]) -> AesMapping {
        let mut merged = self.clone();
        for am in others {
            for (aes, value) in &am.0 {
                merged.0.insert(aes.clone(), value.clone());
            }
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for AesMapping {
    fn from(pairs: [(&str, &str); N]) -> Self {
        AesMapping(
            pairs
                .iter()
                .map(|(a, v)| (a.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Merge mappings first-wins: the value for a key is the first
/// non-empty value among `mappings`.
pub fn merge_styles(mappings: &[&AesMapping]) -> AesMapping {
    let mut result = AesMapping::new();
    for m in mappings {
        for (aes, value) in &m.0 {
            if value.is_empty() {
                continue;
            }
            result.0.entry(aes.clone()).or_insert_with(|| value.clone());
        }
    }
    result
}

/// Merge like [`merge_styles`] but drop keys whose merged value is
/// empty, so an empty-string entry in an earlier mapping masks a later
/// one.
pub fn merge_aes(mappings: &[&AesMapping]) -> AesMapping {
    let mut result = AesMapping::new();
    for m in mappings {
        for (aes, value) in &m.0 {
            result.0.entry(aes.clone()).or_insert_with(|| value.clone());
        }
    }
    result.0.retain(|_, v| !v.is_empty());
    result
}
