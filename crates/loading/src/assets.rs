use std::{path::Path, sync::Arc};

use crate::{ArchiveManager, Cache, Cacheable, FileManager, Registries, Result};

/// Loads a `T` from a plain file. Pass a cache to share decoded objects between
/// calls; without one every call decodes.
pub fn load_from_file<T: Cacheable>(
    path: &str,
    registries: Arc<Registries>,
    cache: Option<Arc<Cache>>,
) -> Result<T> {
    FileManager::new(registries, cache).load(path)
}

/// Loads a `T` stored at `path_in_archive` inside the zip archive `archive`.
pub fn load_from_archive<T: Cacheable>(
    archive: impl AsRef<Path>,
    path_in_archive: &str,
    registries: Arc<Registries>,
    cache: Option<Arc<Cache>>,
) -> Result<T> {
    ArchiveManager::open(archive, registries, cache)?.load(path_in_archive)
}

/// Entry point for applications: the registries every load uses plus an
/// optional cache shared by all of them.
///
/// ```no_run
/// use loading::{AssetLoader, Image, Model};
///
/// let assets = AssetLoader::default();
/// let ship: Model = assets.load_from_file("assets/ship.obj")?;
/// let logo: Image = assets.load_from_archive("assets/ui.zip", "logo.png")?;
/// # Ok::<(), loading::LoadError>(())
/// ```
#[derive(Clone)]
pub struct AssetLoader {
    registries: Arc<Registries>,
    cache: Option<Arc<Cache>>,
}

impl Default for AssetLoader {
    /// Built-in decoders and a fresh cache.
    fn default() -> Self {
        AssetLoader::new(Arc::new(Registries::with_defaults())).with_cache(Arc::new(Cache::new()))
    }
}

impl AssetLoader {
    /// Loader without cache.
    pub fn new(registries: Arc<Registries>) -> Self {
        AssetLoader {
            registries,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn registries(&self) -> &Arc<Registries> {
        &self.registries
    }

    pub fn cache(&self) -> Option<&Arc<Cache>> {
        self.cache.as_ref()
    }

    pub fn file_manager(&self) -> FileManager {
        FileManager::new(self.registries.clone(), self.cache.clone())
    }

    pub fn archive_manager(&self, archive: impl AsRef<Path>) -> Result<ArchiveManager> {
        ArchiveManager::open(archive, self.registries.clone(), self.cache.clone())
    }

    pub fn load_from_file<T: Cacheable>(&self, path: &str) -> Result<T> {
        load_from_file(path, self.registries.clone(), self.cache.clone())
    }

    pub fn load_from_archive<T: Cacheable>(
        &self,
        archive: impl AsRef<Path>,
        path_in_archive: &str,
    ) -> Result<T> {
        load_from_archive(archive, path_in_archive, self.registries.clone(), self.cache.clone())
    }
}
