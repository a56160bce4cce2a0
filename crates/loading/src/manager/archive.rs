use std::{
    fs::File,
    io::{Cursor, Read},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use zip::{ZipArchive, result::ZipError};

use crate::{Cache, Cacheable, LoadError, Registries, Result, SourceManager, Stream, manager::extension_tag};

/// Separates the archive location from the in-archive path in a full id:
/// `assets/pack.zip?/models/ship.obj`.
pub const ARCHIVE_SEPARATOR: char = '?';

/// An opened zip archive, shared by a manager and every manager it spawns.
pub struct Archive {
    path: PathBuf,
    zip: Mutex<ZipArchive<File>>,
}

impl Archive {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let id = path.to_string_lossy().into_owned();
        let file = File::open(path).map_err(|source| LoadError::Unresolvable {
            id: id.clone(),
            source,
        })?;
        let zip = ZipArchive::new(file).map_err(|source| LoadError::Archive { id, source })?;
        Ok(Archive {
            path: path.to_path_buf(),
            zip: Mutex::new(zip),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decompresses the entry `name` (no leading `/`) into memory.
    pub fn read(&self, name: &str) -> Result<Vec<u8>, ZipError> {
        let mut zip = self.zip.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entry = zip.by_name(name)?;
        let mut data = Vec::with_capacity(capacity_hint(entry.size()));
        entry.read_to_end(&mut data)?;
        Ok(data)
    }

    pub fn len(&self) -> usize {
        self.zip.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Largest buffer reserved up front for an entry. The declared size comes from
/// the archive itself; bigger entries grow the buffer as they are read.
const MAX_PREALLOCATION: u64 = 1 << 20;

fn capacity_hint(declared_size: u64) -> usize {
    declared_size.min(MAX_PREALLOCATION) as usize
}

/// Manager reading entries of one zip archive.
///
/// It keeps a current in-archive directory (`/` at first) against which relative
/// ids are resolved, and which moves to the directory of every entry it opens.
pub struct ArchiveManager {
    archive: Arc<Archive>,
    archive_id: String,
    dir: String,
    cache: Option<Arc<Cache>>,
    registries: Arc<Registries>,
    busy: bool,
}

impl ArchiveManager {
    pub fn open(
        path: impl AsRef<Path>,
        registries: Arc<Registries>,
        cache: Option<Arc<Cache>>,
    ) -> Result<Self> {
        let archive = Archive::open(path)?;
        Ok(Self::from_archive(Arc::new(archive), registries, cache))
    }

    /// Manager over an already opened archive, rooted at `/`.
    pub fn from_archive(
        archive: Arc<Archive>,
        registries: Arc<Registries>,
        cache: Option<Arc<Cache>>,
    ) -> Self {
        let archive_id = archive.path().to_string_lossy().into_owned();
        ArchiveManager {
            archive,
            archive_id,
            dir: String::from("/"),
            cache,
            registries,
            busy: false,
        }
    }

    pub fn archive(&self) -> &Arc<Archive> {
        &self.archive
    }

    /// Current in-archive directory, always absolute.
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// Loads a `T` from the archive entry `path`, see `SourceManager::load`.
    pub fn load<T: Cacheable>(&mut self, path: &str) -> Result<T> {
        let manager: &mut dyn SourceManager = self;
        manager.load::<T>(path)
    }
}

/// Splits a full id into archive location and in-archive path.
pub fn split_full_id(full_id: &str) -> Option<(&str, &str)> {
    full_id.rsplit_once(ARCHIVE_SEPARATOR)
}

/// Resolves `.` and `..` in an absolute in-archive path. Refuses to climb above
/// the root.
pub fn normalize_archive_path(path: &str) -> Result<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(LoadError::ArchiveEscape {
                        path: path.to_string(),
                    });
                }
            }
            name => segments.push(name),
        }
    }
    Ok(format!("/{}", segments.join("/")))
}

fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(slash) => &path[..slash],
    }
}

impl SourceManager for ArchiveManager {
    fn full_id(&self, id: &str) -> Result<String> {
        if let Some((archive, inner)) = split_full_id(id) {
            return Ok(format!(
                "{archive}{ARCHIVE_SEPARATOR}{}",
                normalize_archive_path(inner)?
            ));
        }

        let path = id.replace('\\', "/");
        let absolute = if path.starts_with('/') {
            path
        } else {
            format!("{}/{}", self.dir, path)
        };
        Ok(format!(
            "{}{ARCHIVE_SEPARATOR}{}",
            self.archive_id,
            normalize_archive_path(&absolute)?
        ))
    }

    fn create_stream(&mut self, full_id: &str) -> Result<Stream> {
        let (archive, inner) =
            split_full_id(full_id).ok_or_else(|| LoadError::MalformedId(full_id.to_string()))?;
        if archive != self.archive_id {
            return Err(LoadError::Archive {
                id: full_id.to_string(),
                source: ZipError::FileNotFound,
            });
        }

        let data = self
            .archive
            .read(inner.trim_start_matches('/'))
            .map_err(|source| LoadError::Archive {
                id: full_id.to_string(),
                source,
            })?;
        self.dir = parent_dir(inner).to_string();
        Ok(Box::new(Cursor::new(data)))
    }

    fn type_tag(&self, full_id: &str) -> String {
        let inner = split_full_id(full_id).map_or(full_id, |(_, inner)| inner);
        extension_tag(inner)
    }

    fn spawn(&self) -> Box<dyn SourceManager> {
        Box::new(ArchiveManager {
            archive: self.archive.clone(),
            archive_id: self.archive_id.clone(),
            dir: self.dir.clone(),
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
