use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use crate::{Cacheable, Loader};

/// Decoders for one data type, keyed by type tag.
///
/// A tag is bound at most once: the first registration wins and later ones are
/// refused. One decoder may be registered under any number of tags.
pub struct Registry<T> {
    loaders: HashMap<String, Arc<dyn Loader<T>>>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            loaders: HashMap::new(),
        }
    }

    /// Binds `tag` to `loader` unless the tag is already taken.
    pub fn register(&mut self, tag: impl Into<String>, loader: Arc<dyn Loader<T>>) -> bool {
        let tag = tag.into();
        if self.loaders.contains_key(&tag) {
            log::warn!("a loader is already registered for {tag:?}, ignoring the new one");
            return false;
        }
        self.loaders.insert(tag, loader);
        true
    }

    pub fn lookup(&self, tag: &str) -> Option<Arc<dyn Loader<T>>> {
        self.loaders.get(tag).cloned()
    }

    pub fn unregister(&mut self, tag: &str) -> bool {
        self.loaders.remove(tag).is_some()
    }

    pub fn clear(&mut self) {
        self.loaders.clear();
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.loaders.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.loaders.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One `Registry` per data type.
///
/// Populated once at startup (see `register_defaults`) and then shared read-only
/// by every manager through an `Arc`.
#[derive(Default)]
pub struct Registries {
    registries: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Registries {
    /// Empty registries: nothing can be loaded until decoders are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registries holding every built-in decoder.
    pub fn with_defaults() -> Self {
        let mut registries = Self::new();
        registries.register_defaults();
        registries
    }

    pub fn registry<T: Cacheable>(&self) -> Option<&Registry<T>> {
        self.registries
            .get(&TypeId::of::<T>())
            .and_then(|registry| registry.downcast_ref::<Registry<T>>())
    }

    /// Registry for `T`, created empty on first access.
    pub fn registry_mut<T: Cacheable>(&mut self) -> &mut Registry<T> {
        let registry = self
            .registries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Registry::<T>::new()));
        match registry.downcast_mut::<Registry<T>>() {
            Some(registry) => registry,
            None => unreachable!("registry stored under the TypeId of another type"),
        }
    }

    pub fn register<T: Cacheable>(
        &mut self,
        tag: impl Into<String>,
        loader: Arc<dyn Loader<T>>,
    ) -> bool {
        self.registry_mut::<T>().register(tag, loader)
    }

    pub fn lookup<T: Cacheable>(&self, tag: &str) -> Option<Arc<dyn Loader<T>>> {
        self.registry::<T>()?.lookup(tag)
    }

    pub fn unregister<T: Cacheable>(&mut self, tag: &str) -> bool {
        self.registries
            .get_mut(&TypeId::of::<T>())
            .and_then(|registry| registry.downcast_mut::<Registry<T>>())
            .is_some_and(|registry| registry.unregister(tag))
    }

    /// Drops every registry together with the decoders it holds.
    pub fn clear(&mut self) {
        self.registries.clear();
    }
}
