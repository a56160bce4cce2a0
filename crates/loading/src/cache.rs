use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::Cacheable;

/// Decoded objects of one type, keyed by full identifier.
///
/// Values go in and come out as copies so that a caller mutating what it got
/// can never change what the next caller receives. `get_const` is the one
/// exception: it hands out the stored instance for read-only use.
pub struct CachePool<T> {
    items: HashMap<String, Arc<T>>,
}

impl<T: Cacheable> CachePool<T> {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
        }
    }

    /// Private copy of the object stored under `id`.
    pub fn get(&self, id: &str) -> Option<T> {
        self.items.get(id).map(|item| T::clone(item))
    }

    /// The stored object itself. Never mutate through it (and `Arc` won't let you
    /// without cloning).
    pub fn get_const(&self, id: &str) -> Option<Arc<T>> {
        self.items.get(id).cloned()
    }

    /// Stores a copy of `item` under `id`, replacing any previous entry.
    pub fn add(&mut self, item: &T, id: &str) {
        self.items.insert(id.to_string(), Arc::new(item.clone()));
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.items.remove(id).is_some()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Cacheable> Default for CachePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-indexed set of `CachePool`s, one per `Cacheable` type, each created on
/// first insertion.
///
/// A `Cache` is shared between a manager and every manager it spawns, hence the
/// interior mutability: all operations take `&self`.
#[derive(Default)]
pub struct Cache {
    pools: Mutex<HashMap<TypeId, Box<dyn Any + Send>>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    fn pools(&self) -> MutexGuard<'_, HashMap<TypeId, Box<dyn Any + Send>>> {
        self.pools.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_pool<T: Cacheable, R>(&self, f: impl FnOnce(&CachePool<T>) -> R) -> Option<R> {
        let pools = self.pools();
        pools
            .get(&TypeId::of::<T>())
            .and_then(|pool| pool.downcast_ref::<CachePool<T>>())
            .map(f)
    }

    fn with_pool_mut<T: Cacheable, R>(&self, f: impl FnOnce(&mut CachePool<T>) -> R) -> Option<R> {
        let mut pools = self.pools();
        pools
            .get_mut(&TypeId::of::<T>())
            .and_then(|pool| pool.downcast_mut::<CachePool<T>>())
            .map(f)
    }

    /// Private copy of the `T` cached under `id`.
    pub fn get<T: Cacheable>(&self, id: &str) -> Option<T> {
        self.with_pool(|pool: &CachePool<T>| pool.get(id)).flatten()
    }

    /// Shared, read-only view of the `T` cached under `id`.
    pub fn get_const<T: Cacheable>(&self, id: &str) -> Option<Arc<T>> {
        self.with_pool(|pool: &CachePool<T>| pool.get_const(id))
            .flatten()
    }

    /// Stores a copy of `item` under `id`.
    pub fn add<T: Cacheable>(&self, item: &T, id: &str) {
        let mut pools = self.pools();
        let pool = pools
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(CachePool::<T>::new()));
        if let Some(pool) = pool.downcast_mut::<CachePool<T>>() {
            pool.add(item, id);
        }
    }

    /// Drops the `T` cached under `id`. Returns whether there was one.
    pub fn remove<T: Cacheable>(&self, id: &str) -> bool {
        self.with_pool_mut(|pool: &mut CachePool<T>| pool.remove(id))
            .unwrap_or(false)
    }

    /// Drops every cached `T`.
    pub fn clear<T: Cacheable>(&self) {
        self.with_pool_mut(|pool: &mut CachePool<T>| pool.clear());
    }

    pub fn contains<T: Cacheable>(&self, id: &str) -> bool {
        self.with_pool(|pool: &CachePool<T>| pool.contains(id))
            .unwrap_or(false)
    }

    /// Number of cached `T`s.
    pub fn len<T: Cacheable>(&self) -> usize {
        self.with_pool(|pool: &CachePool<T>| pool.len()).unwrap_or(0)
    }

    /// Drops every pool of every type.
    pub fn clear_all(&self) {
        self.pools().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Image, Model, PixelMode};

    fn image(fill: u8) -> Image {
        Image::new(2, 1, PixelMode::Luminance, vec![fill, fill])
    }

    #[test]
    fn added_object_is_copied() {
        let cache = Cache::new();
        let mut original = image(1);
        cache.add(&original, "x");

        original.data[0] = 9;
        assert_eq!(cache.get::<Image>("x").unwrap().data, vec![1, 1]);
    }

    #[test]
    fn every_get_returns_an_independent_copy() {
        let cache = Cache::new();
        cache.add(&image(1), "x");

        let mut first = cache.get::<Image>("x").unwrap();
        let second = cache.get::<Image>("x").unwrap();
        first.data[1] = 7;

        assert_eq!(second.data, vec![1, 1]);
        assert_eq!(cache.get::<Image>("x").unwrap().data, vec![1, 1]);
    }

    #[test]
    fn get_const_sees_the_latest_add() {
        let cache = Cache::new();
        cache.add(&image(1), "x");
        let before = cache.get_const::<Image>("x").unwrap();

        cache.add(&image(2), "x");
        let after = cache.get_const::<Image>("x").unwrap();

        assert_eq!(before.data, vec![1, 1]);
        assert_eq!(after.data, vec![2, 2]);
        // Same instance until the next add.
        assert!(Arc::ptr_eq(&after, &cache.get_const::<Image>("x").unwrap()));
    }

    #[test]
    fn pools_are_separated_by_type() {
        let cache = Cache::new();
        cache.add(&image(1), "x");

        assert!(cache.get::<Model>("x").is_none());
        assert!(cache.contains::<Image>("x"));
        assert!(!cache.contains::<Model>("x"));
        assert!(!cache.remove::<Model>("x"));
    }

    #[test]
    fn remove_and_clear() {
        let cache = Cache::new();
        cache.add(&image(1), "a");
        cache.add(&image(2), "b");
        cache.add(&Model::new("m"), "a");

        assert!(cache.remove::<Image>("a"));
        assert!(cache.get::<Image>("a").is_none());
        assert_eq!(cache.len::<Image>(), 1);

        cache.clear::<Image>();
        assert_eq!(cache.len::<Image>(), 0);
        assert!(cache.contains::<Model>("a"));

        cache.clear_all();
        assert!(!cache.contains::<Model>("a"));
    }
}
