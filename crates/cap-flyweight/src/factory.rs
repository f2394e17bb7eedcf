//! Shared instance factory
//!
//! [`FlyweightFactory`] owns a registry mapping each [`CacheKey`] to its one
//! canonical instance. The factory is an ordinary value: the caller creates
//! it, passes it by reference to consumers and tears it down with
//! [`clear`](FlyweightFactory::clear) or by dropping it.
//!
//! # Invariants
//! - At most one canonical instance per key is ever live in a registry.
//!   Lookup and insert-if-absent run under the same shard lock, so the shared
//!   builder runs at most once per key even under contention.
//! - Unshared instances never enter the registry.
//! - Nothing evicts an instance a caller may still hold: the size limit
//!   refuses new keys instead, and [`purge_unused`](FlyweightFactory::purge_unused)
//!   only drops entries the registry alone references.

use crate::error::CacheError;
use crate::key::CacheKey;
use cap_core::CacheConfig;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

type SharedBuilder<F> = Box<dyn Fn(&CacheKey) -> Result<Arc<F>, CacheError> + Send + Sync>;
type UnsharedBuilder<F> = Box<dyn Fn(&str) -> Arc<F> + Send + Sync>;

/// Registry counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Canonical instances currently registered
    pub entries: usize,
    /// Shared lookups answered from the registry
    pub hits: u64,
    /// Shared lookups that built a new canonical instance
    pub misses: u64,
    /// Unshared instances built
    pub unshared_built: u64,
}

/// Keyed registry of canonical instances
pub struct FlyweightFactory<F: ?Sized> {
    config: CacheConfig,
    registry: DashMap<CacheKey, Arc<F>>,
    entries: AtomicUsize,
    build_shared: SharedBuilder<F>,
    build_unshared: UnsharedBuilder<F>,
    hits: AtomicU64,
    misses: AtomicU64,
    unshared_built: AtomicU64,
}

impl<F: ?Sized> FlyweightFactory<F> {
    /// Create factory from its two builders
    ///
    /// `shared` receives the validated key on a registry miss; `unshared`
    /// receives the caller's description on every unshared request. Neither
    /// builder may call back into this factory.
    pub fn new<S, U>(shared: S, unshared: U) -> Self
    where
        S: Fn(&CacheKey) -> Result<Arc<F>, CacheError> + Send + Sync + 'static,
        U: Fn(&str) -> Arc<F> + Send + Sync + 'static,
    {
        Self {
            config: CacheConfig::default(),
            registry: DashMap::new(),
            entries: AtomicUsize::new(0),
            build_shared: Box::new(shared),
            build_unshared: Box::new(unshared),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            unshared_built: AtomicU64::new(0),
        }
    }

    /// With cache settings
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Active cache settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Canonical instance for the key built from `parts`
    ///
    /// Every call with an equal key returns the identical instance.
    ///
    /// # Errors
    /// - key validation errors from [`CacheKey::new`]
    /// - [`CacheError::CapacityExceeded`] when the key is new and the
    ///   registry is full
    /// - whatever the shared builder returns
    pub fn shared<I, S>(&self, parts: I) -> Result<Arc<F>, CacheError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = CacheKey::new(parts, &self.config)?;
        self.shared_for(key)
    }

    /// Canonical instance for an already built key
    ///
    /// The key is checked against this factory's config first, whatever
    /// config it was built or deserialized with.
    ///
    /// # Errors
    /// Same as [`shared`](Self::shared).
    pub fn shared_for(&self, key: CacheKey) -> Result<Arc<F>, CacheError> {
        key.validate(&self.config)?;

        if let Some(existing) = self.registry.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(existing.value()));
        }

        match self.registry.entry(key) {
            Entry::Occupied(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Arc::clone(entry.get()))
            }
            Entry::Vacant(entry) => {
                let slot = self.reserve_slot()?;
                let instance = (self.build_shared)(entry.key()).map_err(|e| {
                    tracing::warn!(key = %self.key_label(entry.key()), error = %e, "shared builder failed");
                    e
                })?;
                slot.commit();
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %self.key_label(entry.key()), "built canonical instance");
                entry.insert(Arc::clone(&instance));
                Ok(instance)
            }
        }
    }

    /// `key` rendered with the configured `key_separator`
    #[must_use]
    pub fn key_label(&self, key: &CacheKey) -> String {
        key.joined(&self.config.key_separator)
    }

    /// Fresh instance for `description`; the registry is never consulted
    pub fn unshared(&self, description: &str) -> Arc<F> {
        self.unshared_built.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(description, "built unshared instance");
        (self.build_unshared)(description)
    }

    /// Whether `key` has a canonical instance
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.registry.contains_key(key)
    }

    /// Registered keys, in no particular order
    #[must_use]
    pub fn keys(&self) -> Vec<CacheKey> {
        self.registry.iter().map(|e| e.key().clone()).collect()
    }

    /// Number of canonical instances
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether the registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Counter snapshot
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.registry.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            unshared_built: self.unshared_built.load(Ordering::Relaxed),
        }
    }

    /// Drop every registry entry
    ///
    /// Instances still held by callers stay alive but are no longer
    /// canonical; the next lookup of their key builds a new one.
    pub fn clear(&self) {
        let mut dropped = 0_usize;
        self.registry.retain(|_, _| {
            dropped += 1;
            false
        });
        self.entries.fetch_sub(dropped, Ordering::AcqRel);
        tracing::debug!(dropped, "cleared registry");
    }

    /// Drop entries no caller holds any more, returning how many went
    pub fn purge_unused(&self) -> usize {
        let mut purged = 0_usize;
        self.registry.retain(|_, instance| {
            let in_use = Arc::strong_count(instance) > 1;
            if !in_use {
                purged += 1;
            }
            in_use
        });
        self.entries.fetch_sub(purged, Ordering::AcqRel);
        tracing::debug!(purged, "purged unused instances");
        purged
    }

    fn reserve_slot(&self) -> Result<Slot<'_>, CacheError> {
        let Some(max) = self.config.max_entries else {
            self.entries.fetch_add(1, Ordering::AcqRel);
            return Ok(Slot::new(&self.entries));
        };

        self.entries
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < max).then_some(n + 1))
            .map(|_| Slot::new(&self.entries))
            .map_err(|_| {
                tracing::warn!(max, "registry full, refusing new key");
                CacheError::CapacityExceeded { max }
            })
    }
}

/// Reserved registry slot, released on drop unless committed
///
/// Covers both a builder error and a builder panic.
struct Slot<'a> {
    entries: &'a AtomicUsize,
    committed: bool,
}

impl<'a> Slot<'a> {
    fn new(entries: &'a AtomicUsize) -> Self {
        Self {
            entries,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.entries.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

impl<F: ?Sized> Debug for FlyweightFactory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlyweightFactory")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flyweight::Flyweight;

    #[derive(Debug)]
    struct Tile {
        label: String,
    }

    impl Flyweight<u32> for Tile {
        fn serve(&self, at: &u32) -> String {
            format!("{}@{at}", self.label)
        }
    }

    fn factory() -> FlyweightFactory<Tile> {
        FlyweightFactory::new(
            |key: &CacheKey| Ok(Arc::new(Tile { label: key.to_string() })),
            |description: &str| Arc::new(Tile { label: description.to_string() }),
        )
    }

    #[test]
    fn same_key_same_instance() {
        let f = factory();
        let a = f.shared(["grass", "green"]).unwrap();
        let b = f.shared(["grass", "green"]).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(f.len(), 1);

        let stats = f.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[test]
    fn different_key_different_instance() {
        let f = factory();
        let a = f.shared(["grass"]).unwrap();
        let b = f.shared(["water"]).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(f.len(), 2);
    }

    #[test]
    fn unshared_is_always_fresh() {
        let f = factory();
        let a = f.unshared("special");
        let b = f.unshared("special");
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(f.is_empty());
        assert_eq!(f.stats().unshared_built, 2);
    }

    #[test]
    fn serve_does_not_change_instance() {
        let f = factory();
        let tile = f.shared(["grass"]).unwrap();
        assert_eq!(tile.serve(&1), "grass@1");
        assert_eq!(tile.serve(&2), "grass@2");
        assert_eq!(f.shared(["grass"]).unwrap().serve(&3), "grass@3");
    }

    #[test]
    fn invalid_key_never_reaches_registry() {
        let f = factory();
        assert_eq!(f.shared(Vec::<String>::new()).unwrap_err(), CacheError::EmptyKey);
        assert_eq!(
            f.shared(["grass", ""]).unwrap_err(),
            CacheError::EmptySegment { index: 1 }
        );
        assert!(f.is_empty());
    }

    #[test]
    fn capacity_refuses_new_keys_only() {
        let f = factory().with_config(CacheConfig::default().with_max_entries(1));
        let grass = f.shared(["grass"]).unwrap();

        assert_eq!(
            f.shared(["water"]).unwrap_err(),
            CacheError::CapacityExceeded { max: 1 }
        );
        assert!(Arc::ptr_eq(&grass, &f.shared(["grass"]).unwrap()));
    }

    #[test]
    fn builder_failure_leaves_no_entry() {
        let f: FlyweightFactory<Tile> = FlyweightFactory::new(
            |key: &CacheKey| Err(CacheError::build(key.to_string(), "unsupported")),
            |description: &str| Arc::new(Tile { label: description.to_string() }),
        )
        .with_config(CacheConfig::default().with_max_entries(1));

        assert!(matches!(f.shared(["x"]), Err(CacheError::Build { .. })));
        assert!(f.is_empty());
        assert_eq!(f.stats().misses, 0);
    }

    #[test]
    fn builder_failures_release_their_slot() {
        let f: FlyweightFactory<Tile> = FlyweightFactory::new(
            |key: &CacheKey| match key.part(0) {
                Some("boom") => panic!("builder blew up"),
                Some("bad") => Err(CacheError::build(key.to_string(), "unsupported")),
                _ => Ok(Arc::new(Tile { label: key.to_string() })),
            },
            |description: &str| Arc::new(Tile { label: description.to_string() }),
        )
        .with_config(CacheConfig::default().with_max_entries(1));

        let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f.shared(["boom"])));
        assert!(panicked.is_err());
        assert!(f.shared(["bad"]).is_err());

        assert!(f.is_empty());
        assert_eq!(f.shared(["grass"]).unwrap().serve(&0), "grass@0");
    }

    #[test]
    fn shared_for_checks_key_against_own_config() {
        let f = factory();
        let lenient = CacheConfig::default().allowing_empty_segments();
        let key = CacheKey::new(["grass", ""], &lenient).unwrap();

        assert_eq!(
            f.shared_for(key.clone()).unwrap_err(),
            CacheError::EmptySegment { index: 1 }
        );
        assert!(f.is_empty());

        let lenient_factory = factory().with_config(lenient);
        assert!(lenient_factory.shared_for(key).is_ok());
    }

    #[test]
    fn key_label_uses_configured_separator() {
        let f = factory().with_config(CacheConfig::default().with_key_separator("/"));
        let key = CacheKey::new(["grass", "green"], f.config()).unwrap();

        assert_eq!(f.key_label(&key), "grass/green");
        assert_eq!(key.to_string(), "grass-green");
    }

    #[test]
    fn clear_releases_capacity() {
        let f = factory().with_config(CacheConfig::default().with_max_entries(1));
        let old = f.shared(["grass"]).unwrap();
        f.clear();
        assert!(f.is_empty());

        let new = f.shared(["water"]).unwrap();
        assert_eq!(new.serve(&0), "water@0");
        assert_eq!(old.serve(&0), "grass@0");
    }

    #[test]
    fn purge_keeps_held_instances() {
        let f = factory();
        let held = f.shared(["grass"]).unwrap();
        drop(f.shared(["water"]).unwrap());

        assert_eq!(f.purge_unused(), 1);
        assert_eq!(f.len(), 1);
        assert!(Arc::ptr_eq(&held, &f.shared(["grass"]).unwrap()));
    }

    #[test]
    fn keys_and_contains() {
        let f = factory();
        f.shared(["grass"]).unwrap();
        let key = CacheKey::new(["grass"], f.config()).unwrap();
        assert!(f.contains(&key));
        assert_eq!(f.keys(), vec![key]);
    }
}
