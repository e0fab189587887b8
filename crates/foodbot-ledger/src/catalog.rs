//! In-process recall aid for product energy values.
//!
//! The catalog is built from persisted products at startup and kept in sync
//! by the caller on every insertion. It also keeps a bounded list of the
//! most recently added distinct pairs for quick re-entry.

use foodbot_common::{normalize, Product};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap, VecDeque};
use tracing::debug;

/// Known energy values per normalized product name, plus a recency cache.
#[derive(Debug)]
pub struct ProductCatalog {
    inner: RwLock<CatalogInner>,
}

#[derive(Debug)]
struct CatalogInner {
    known: HashMap<String, BTreeSet<u32>>,
    /// Oldest at the front, newest at the back.
    recent: VecDeque<Product>,
    capacity: usize,
}

impl CatalogInner {
    fn remember_recent(&mut self, product: Product) {
        if self.capacity == 0 || self.recent.contains(&product) {
            return;
        }
        self.recent.push_back(product);
        while self.recent.len() > self.capacity {
            self.recent.pop_front();
        }
    }
}

impl ProductCatalog {
    /// Creates an empty catalog whose recency cache holds `capacity` pairs.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(CatalogInner {
                known: HashMap::new(),
                recent: VecDeque::with_capacity(capacity),
                capacity,
            }),
        }
    }

    /// Builds a catalog from persisted products. The recency cache starts empty.
    pub fn from_products(products: impl IntoIterator<Item = Product>, capacity: usize) -> Self {
        let catalog = Self::new(capacity);
        {
            let mut inner = catalog.inner.write();
            for product in products {
                inner
                    .known
                    .entry(normalize(&product.name))
                    .or_default()
                    .insert(product.kcal_per_100g);
            }
            debug!("Product catalog loaded with {} names", inner.known.len());
        }
        catalog
    }

    /// Fills the recency cache from products ordered newest first.
    pub fn seed_recent(&self, newest_first: impl IntoIterator<Item = Product>) {
        let mut seeded: Vec<Product> = newest_first.into_iter().collect();
        seeded.reverse();

        let mut inner = self.inner.write();
        for product in seeded {
            let product = Product::new(normalize(&product.name), product.kcal_per_100g);
            inner
                .known
                .entry(product.name.clone())
                .or_default()
                .insert(product.kcal_per_100g);
            inner.remember_recent(product);
        }
    }

    /// Known energy values for `name`, ascending. Empty if the name was never seen.
    pub fn lookup(&self, name: &str) -> Vec<u32> {
        self.inner
            .read()
            .known
            .get(&normalize(name))
            .map(|values| values.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Records a (name, kcal) pair and marks it recently used.
    ///
    /// Returns `true` only the first time this exact pair is observed, which
    /// tells the caller to persist it. A pair already in the recency cache is
    /// neither duplicated nor moved.
    pub fn upsert(&self, name: &str, kcal_per_100g: u32) -> bool {
        let name = normalize(name);
        let mut inner = self.inner.write();
        let is_new = inner
            .known
            .entry(name.clone())
            .or_default()
            .insert(kcal_per_100g);
        inner.remember_recent(Product::new(name, kcal_per_100g));
        is_new
    }

    /// The recency cache, newest first.
    pub fn recent(&self) -> Vec<Product> {
        self.inner.read().recent.iter().rev().cloned().collect()
    }

    /// Number of distinct product names.
    pub fn len(&self) -> usize {
        self.inner.read().known.len()
    }

    /// Whether no product has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.inner.read().known.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodbot_common::test_utils::report_fixtures::sample_products;

    #[test]
    fn test_lookup_is_ascending_and_normalized() {
        let catalog = ProductCatalog::from_products(sample_products(), 5);

        assert_eq!(catalog.lookup("bread"), vec![240, 265]);
        assert_eq!(catalog.lookup("  BREAD.\n"), vec![240, 265]);
        assert!(catalog.lookup("pizza").is_empty());
        assert_eq!(catalog.len(), 4);
        assert!(catalog.recent().is_empty());
    }

    #[test]
    fn test_upsert_reports_new_pairs_once() {
        let catalog = ProductCatalog::new(5);

        assert!(catalog.upsert("Apple", 52));
        assert!(!catalog.upsert("apple.", 52));
        assert!(catalog.upsert("apple", 47));
        assert_eq!(catalog.lookup("apple"), vec![47, 52]);
    }

    #[test]
    fn test_recency_cache_evicts_oldest() {
        let catalog = ProductCatalog::new(2);
        catalog.upsert("apple", 52);
        catalog.upsert("bread", 265);
        catalog.upsert("cheese", 402);

        assert_eq!(
            catalog.recent(),
            vec![Product::new("cheese", 402), Product::new("bread", 265)]
        );
    }

    #[test]
    fn test_recency_cache_ignores_repeats() {
        let catalog = ProductCatalog::new(5);
        catalog.upsert("apple", 52);
        catalog.upsert("bread", 265);
        catalog.upsert("apple", 52);

        assert_eq!(
            catalog.recent(),
            vec![Product::new("bread", 265), Product::new("apple", 52)]
        );
    }

    #[test]
    fn test_evicted_pair_returns_to_recency() {
        let catalog = ProductCatalog::new(1);
        assert!(catalog.upsert("apple", 52));
        assert!(catalog.upsert("bread", 265));
        assert!(!catalog.upsert("apple", 52));

        assert_eq!(catalog.recent(), vec![Product::new("apple", 52)]);
    }

    #[test]
    fn test_seed_recent_keeps_newest_first_order() {
        let catalog = ProductCatalog::new(2);
        catalog.seed_recent(vec![
            Product::new("tea", 1),
            Product::new("apple", 52),
            Product::new("bread", 265),
        ]);

        assert_eq!(
            catalog.recent(),
            vec![Product::new("tea", 1), Product::new("apple", 52)]
        );
        assert_eq!(catalog.lookup("bread"), vec![265]);
    }

    proptest::proptest! {
        #[test]
        fn prop_recent_is_bounded_and_distinct(
            pairs in proptest::collection::vec(("[a-d]", 1u32..4), 0..40),
            capacity in 1usize..6,
        ) {
            let catalog = ProductCatalog::new(capacity);
            for (name, kcal) in &pairs {
                catalog.upsert(name, *kcal);
            }

            let recent = catalog.recent();
            proptest::prop_assert!(recent.len() <= capacity);
            for (i, product) in recent.iter().enumerate() {
                proptest::prop_assert!(!recent[i + 1..].contains(product));
            }
        }
    }
}
