use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{Cache, Cacheable, LoadError, Registries, Result, SourceManager, Stream};

/// Manager reading plain files from the OS filesystem.
///
/// Relative identifiers are resolved against `base_dir`, which follows the
/// resource being decoded: after opening `/assets/ship.obj` it is `/assets`, so
/// `ship.mtl` requested by the OBJ decoder resolves to `/assets/ship.mtl`.
pub struct FileManager {
    base_dir: Option<PathBuf>,
    cache: Option<Arc<Cache>>,
    registries: Arc<Registries>,
    busy: bool,
}

impl FileManager {
    /// Manager without a base directory yet; the first load establishes it.
    pub fn new(registries: Arc<Registries>, cache: Option<Arc<Cache>>) -> Self {
        FileManager {
            base_dir: None,
            cache,
            registries,
            busy: false,
        }
    }

    pub fn with_base_dir(
        base_dir: impl Into<PathBuf>,
        registries: Arc<Registries>,
        cache: Option<Arc<Cache>>,
    ) -> Self {
        FileManager {
            base_dir: Some(base_dir.into()),
            cache,
            registries,
            busy: false,
        }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Moves the base directory. A relative `dir` is resolved against the
    /// current one.
    pub fn set_base_dir(&mut self, dir: impl AsRef<Path>) {
        let dir = self.resolve_path(dir.as_ref());
        self.base_dir = Some(dir);
    }

    /// Loads a `T` from `path`, see `SourceManager::load`.
    pub fn load<T: Cacheable>(&mut self, path: &str) -> Result<T> {
        let manager: &mut dyn SourceManager = self;
        manager.load::<T>(path)
    }

    fn resolve_path(&self, rel: &Path) -> PathBuf {
        if rel.is_absolute() {
            return rel.to_path_buf();
        }
        match &self.base_dir {
            Some(base) => base.join(rel),
            None => std::path::absolute(rel).unwrap_or_else(|_| rel.to_path_buf()),
        }
    }
}

impl SourceManager for FileManager {
    fn full_id(&self, id: &str) -> Result<String> {
        Ok(self.resolve_path(Path::new(id)).to_string_lossy().into_owned())
    }

    fn create_stream(&mut self, full_id: &str) -> Result<Stream> {
        let path = Path::new(full_id);
        let file = File::open(path).map_err(|source| LoadError::Unresolvable {
            id: full_id.to_string(),
            source,
        })?;
        if let Some(parent) = path.parent() {
            self.base_dir = Some(parent.to_path_buf());
        }
        Ok(Box::new(BufReader::new(file)))
    }

    fn type_tag(&self, full_id: &str) -> String {
        Path::new(full_id)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    fn spawn(&self) -> Box<dyn SourceManager> {
        Box::new(FileManager {
            base_dir: self.base_dir.clone(),
            cache: self.cache.clone(),
            registries: self.registries.clone(),
            busy: false,
        })
    }

    fn is_busy(&self) -> bool {
        self.busy
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    fn cache(&self) -> Option<&Arc<Cache>> {
        self.cache.as_ref()
    }

    fn set_cache(&mut self, cache: Option<Arc<Cache>>) {
        self.cache = cache;
    }

    fn registries(&self) -> &Arc<Registries> {
        &self.registries
    }
}
