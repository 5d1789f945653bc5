// src/matching/cache.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A candidate exact-match identity for a commune in the upstream dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    pub department: String,
}

impl Variant {
    pub fn new(name: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            department: department.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub name: String,
    pub department: Option<String>,
}

impl CacheKey {
    pub fn new(name: &str, department: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            department: department.map(str::to_string),
        }
    }
}

/// Resolved variants per `(raw name, department)` for the lifetime of one
/// session. Entries are never evicted nor mutated once stored.
#[derive(Debug, Default)]
pub struct VariantCache {
    entries: HashMap<CacheKey, Vec<Variant>>,
    pub hits: usize,
    pub misses: usize,
}

impl VariantCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<&[Variant]> {
        match self.entries.get(key) {
            Some(variants) => {
                self.hits += 1;
                Some(variants.as_slice())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: CacheKey, variants: Vec<Variant>) {
        self.entries.entry(key).or_insert(variants);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_and_miss_counters() {
        let mut cache = VariantCache::new();
        let key = CacheKey::new("RENAGE", None);
        assert!(cache.get(&key).is_none());

        cache.insert(key.clone(), vec![Variant::new("RENAGE", "038")]);
        assert_eq!(cache.get(&key).unwrap(), &[Variant::new("RENAGE", "038")]);
        assert_eq!((cache.hits, cache.misses), (1, 1));
        assert_eq!(cache.hit_rate(), 0.5);
    }

    #[test]
    fn test_department_is_part_of_key() {
        let mut cache = VariantCache::new();
        cache.insert(CacheKey::new("RENAGE", Some("038")), vec![]);
        assert!(cache.get(&CacheKey::new("RENAGE", None)).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stored_entries_are_not_overwritten() {
        let mut cache = VariantCache::new();
        let key = CacheKey::new("RENAGE", None);
        cache.insert(key.clone(), vec![Variant::new("RENAGE", "038")]);
        cache.insert(key.clone(), vec![Variant::new("OTHER", "001")]);
        assert_eq!(cache.get(&key).unwrap()[0].name, "RENAGE");
    }
}
