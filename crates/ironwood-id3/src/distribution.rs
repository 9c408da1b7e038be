use std::collections::HashMap;
use std::hash::Hash;

/// Insertion-ordered tally of weight per key.
///
/// Iteration follows first-seen order, which fixes tie-breaking for
/// [`Distribution::majority`] and the branch order of categorical splits.
#[derive(Debug, Clone)]
pub struct Distribution<K> {
    entries: Vec<(K, f64)>,
    positions: HashMap<K, usize>,
}

impl<K: Clone + Eq + Hash> Distribution<K> {
    /// Create an empty distribution.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Add `weight` to the entry for `key`, inserting it if unseen.
    pub fn add(&mut self, key: K, weight: f64) {
        match self.positions.get(&key) {
            Some(&pos) => self.entries[pos].1 += weight,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, weight));
            }
        }
    }

    /// Return the accumulated weight of `key`, or 0 when unseen.
    #[must_use]
    pub fn get(&self, key: &K) -> f64 {
        self.positions
            .get(key)
            .map_or(0.0, |&pos| self.entries[pos].1)
    }

    /// Return the total weight across all keys.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    /// Return the number of distinct keys, including zero-weight ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when no key has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the number of keys carrying positive weight.
    #[must_use]
    pub fn nonzero_len(&self) -> usize {
        self.entries.iter().filter(|(_, w)| *w > 0.0).count()
    }

    /// Iterate `(key, weight)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.entries.iter().map(|(k, w)| (k, *w))
    }

    /// Iterate the weights in first-seen order.
    pub fn weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, w)| *w)
    }

    /// Return the key with the strictly greatest weight.
    ///
    /// Ties keep the first-seen key. Returns `None` when no key carries
    /// positive weight.
    #[must_use]
    pub fn majority(&self) -> Option<&K> {
        let mut best: Option<&K> = None;
        let mut best_weight = 0.0;
        for (key, weight) in &self.entries {
            if *weight > best_weight {
                best_weight = *weight;
                best = Some(key);
            }
        }
        best
    }
}

impl<K: Clone + Eq + Hash> Default for Distribution<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash> FromIterator<(K, f64)> for Distribution<K> {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut dist = Self::new();
        for (key, weight) in iter {
            dist.add(key, weight);
        }
        dist
    }
}
