//! String interning pool
//!
//! Discrete string values live in data frames as `f64`-encoded indices
//! into a pool shared by the whole plot. Insertion is serialized so that
//! concurrent `add` calls never hand out duplicate indices; lookups see
//! a consistent index-to-string mapping.

use std::sync::Mutex;

/// Sentinel returned for out-of-range indices.
pub const NA: &str = "--NA--";

/// A bijection between strings and dense integer indices.
///
/// The pool is expected to stay small (tens to low thousands of
/// entries), so lookup is a linear scan.
#[derive(Debug, Default)]
pub struct StringPool {
    pool: Mutex<Vec<String>>,
}

impl StringPool {
    pub fn new() -> Self {
        StringPool {
            pool: Mutex::new(Vec::with_capacity(100)),
        }
    }

    /// Intern `s`, returning its index. Re-adding an interned string
    /// returns the existing index.
    pub fn add(&self, s: &str) -> usize {
        let mut pool = self.pool.lock().unwrap();
        if let Some(i) = pool.iter().position(|t| t == s) {
            return i;
        }
        pool.push(s.to_string());
        pool.len() - 1
    }

    /// Index of `s`, or `None` if it has not been interned.
    pub fn find(&self, s: &str) -> Option<usize> {
        self.pool.lock().unwrap().iter().position(|t| t == s)
    }

    /// String at index `i`, or the [`NA`] sentinel when out of range.
    pub fn get(&self, i: i64) -> String {
        let pool = self.pool.lock().unwrap();
        if i < 0 || i as usize >= pool.len() {
            return NA.to_string();
        }
        pool[i as usize].clone()
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.pool.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
