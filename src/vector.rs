//! Cosine similarity and a linear-scan vector index.
//!
//! [`VectorIndex`] holds `(key, vector)` pairs in insertion order and answers
//! top-k queries by scanning every entry. That is intentional: at the scale
//! this crate targets (an in-memory project knowledge base), a linear scan
//! beats the bookkeeping cost of an approximate index.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Cosine similarity: `dot(a, b) / (|a| * |b|)`, in `[-1, 1]`.
///
/// Fails with [`Error::DimensionMismatch`] when the lengths differ and
/// [`Error::DegenerateVector`] when either norm is exactly zero. A zero-norm
/// vector has no direction, so erroring is preferred over a silent `0.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(Error::DegenerateVector);
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// An insertion-ordered store of `(key, vector)` pairs with top-k search.
///
/// Vector dimensions are not validated at [`add`](Self::add) time; a
/// mismatched comparison fails fast during [`search`](Self::search) instead.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<(String, Vec<f32>)>,
    slots: HashMap<String, usize>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store or overwrite the vector for `key`.
    ///
    /// An overwrite keeps the key's original insertion position, so tie
    /// ordering in search results stays stable across replacement.
    pub fn add(&mut self, key: impl Into<String>, vector: Vec<f32>) {
        let key = key.into();
        match self.slots.get(&key) {
            Some(&slot) => self.entries[slot].1 = vector,
            None => {
                self.slots.insert(key.clone(), self.entries.len());
                self.entries.push((key, vector));
            }
        }
    }

    /// The stored vector for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&[f32]> {
        self.slots
            .get(key)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    /// Remove `key`. Returns `false` if it was not present.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(slot) = self.slots.remove(key) else {
            return false;
        };
        self.entries.remove(slot);
        // Entries after the removed slot shifted left by one.
        for (k, _) in self.entries.iter().skip(slot) {
            if let Some(s) = self.slots.get_mut(k) {
                *s -= 1;
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.slots.clear();
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Cosine score of the stored vector for `key` against `query`, or
    /// `None` when the key is absent.
    pub fn score(&self, key: &str, query: &[f32]) -> Result<Option<f32>> {
        match self.get(key) {
            Some(vector) => Ok(Some(cosine_similarity(query, vector)?)),
            None => Ok(None),
        }
    }

    /// Up to `k` `(key, score)` pairs by descending cosine similarity.
    ///
    /// The sort is stable, so equal scores keep insertion order. An empty
    /// index returns an empty list, never an error.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(String, f32)>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut scored = Vec::with_capacity(self.entries.len());
        for (key, vector) in &self.entries {
            scored.push((key.clone(), cosine_similarity(query, vector)?));
        }
        sort_by_score_desc(&mut scored);
        scored.truncate(k);
        Ok(scored)
    }
}

/// Stable descending sort by score. NaN cannot occur here (scores come from
/// non-degenerate cosine), but compare defensively as equal.
pub(crate) fn sort_by_score_desc<T>(scored: &mut [(T, f32)]) {
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(dim: usize, len: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; len];
        v[dim] = 1.0;
        v
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![0.3, -0.4, 0.5];
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let sim = cosine_similarity(&unit(0, 4), &unit(2, 4)).unwrap();
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn cosine_rejects_dimension_mismatch() {
        let err = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch { left: 2, right: 3 }
        ));
    }

    #[test]
    fn cosine_rejects_zero_norm() {
        let err = cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, Error::DegenerateVector));
    }

    #[test]
    fn search_returns_descending_scores() {
        let mut index = VectorIndex::new();
        index.add("a", vec![1.0, 0.0, 0.0]);
        index.add("b", vec![0.0, 1.0, 0.0]);
        index.add("c", vec![0.7, 0.7, 0.0]);

        let results = index.search(&[1.0, 0.0, 0.0], 10).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, "a");
        for pair in results.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn search_caps_results_at_k() {
        let mut index = VectorIndex::new();
        for i in 0..5 {
            index.add(format!("k{i}"), unit(i, 8));
        }
        let results = index.search(&unit(0, 8), 2).unwrap();
        assert_eq!(results.len(), 2);
        assert!(index.search(&unit(0, 8), 0).unwrap().is_empty());
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut index = VectorIndex::new();
        index.add("first", unit(1, 4));
        index.add("second", unit(2, 4));

        // Both candidates are orthogonal to the query, so they tie at 0.
        let results = index.search(&unit(0, 4), 10).unwrap();
        assert_eq!(results[0].0, "first");
        assert_eq!(results[1].0, "second");
    }

    #[test]
    fn overwrite_keeps_slot_and_updates_vector() {
        let mut index = VectorIndex::new();
        index.add("a", unit(0, 4));
        index.add("b", unit(1, 4));
        index.add("a", unit(2, 4));

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("a"), Some(unit(2, 4).as_slice()));
        let keys: Vec<&str> = index.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn remove_shifts_later_slots() {
        let mut index = VectorIndex::new();
        index.add("a", unit(0, 4));
        index.add("b", unit(1, 4));
        index.add("c", unit(2, 4));

        assert!(index.remove("a"));
        assert!(!index.remove("a"));
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("c"), Some(unit(2, 4).as_slice()));
    }

    #[test]
    fn empty_index_returns_empty_results() {
        let index = VectorIndex::new();
        assert!(index.search(&[1.0, 0.0], 5).unwrap().is_empty());
    }
}
