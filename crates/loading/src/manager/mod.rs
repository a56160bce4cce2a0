//! Source managers: where the bytes come from.
//!
//! A manager resolves identifiers, opens streams and drives the load protocol
//! (`load`). It serves one load at a time. When a decoder asks the manager it was
//! handed for another resource while that manager is still busy, the request is
//! redirected to a freshly spawned child which shares the cache and registries
//! and starts from the directory of the resource being decoded.
//!
//! Adding a new kind of source (network, packed files, ...) means implementing
//! `SourceManager`; decoders never change.

mod archive;
mod file;
mod recording;

pub use archive::*;
pub use file::*;
pub use recording::*;

use std::sync::Arc;

use crate::{Cache, Cacheable, LoadError, Registries, Result, Stream};

pub trait SourceManager {
    /// Canonical form of `id`, usable as a cache key.
    fn full_id(&self, id: &str) -> Result<String>;

    /// Opens the source named by a full identifier. On success also moves the
    /// manager's current location next to that source, so that children spawned
    /// while it is decoded resolve relative ids against it.
    fn create_stream(&mut self, full_id: &str) -> Result<Stream>;

    /// Type tag selecting the decoder, `""` when there is none.
    fn type_tag(&self, full_id: &str) -> String;

    /// Fresh, idle manager sharing this one's cache, registries and location.
    fn spawn(&self) -> Box<dyn SourceManager>;

    fn is_busy(&self) -> bool;

    fn set_busy(&mut self, busy: bool);

    fn cache(&self) -> Option<&Arc<Cache>>;

    fn set_cache(&mut self, cache: Option<Arc<Cache>>);

    fn registries(&self) -> &Arc<Registries>;
}

impl dyn SourceManager + '_ {
    /// Loads the `T` named by `id`: from the cache when it holds one, otherwise
    /// by decoding the source with the loader registered for its type tag.
    ///
    /// The returned object is always the caller's own copy.
    pub fn load<T: Cacheable>(&mut self, id: &str) -> Result<T> {
        let full_id = self.full_id(id)?;

        if self.is_busy() {
            log::debug!("manager busy, spawning a child to load {full_id:?}");
            let mut child = self.spawn();
            return child.load::<T>(&full_id);
        }

        self.set_busy(true);
        let mut busy = BusyGuard(self);
        busy.0.load_idle::<T>(&full_id)
    }

    fn load_idle<T: Cacheable>(&mut self, full_id: &str) -> Result<T> {
        if let Some(cached) = self.cache().and_then(|cache| cache.get::<T>(full_id)) {
            log::debug!("{full_id:?} found in cache");
            return Ok(cached);
        }

        let mut stream = self.create_stream(full_id)?;
        let tag = self.type_tag(full_id);
        let loader = self
            .registries()
            .lookup::<T>(&tag)
            .ok_or_else(|| LoadError::UnknownType {
                tag: tag.clone(),
                id: full_id.to_string(),
            })?;

        log::debug!("decoding {full_id:?} as {tag:?}");
        let loaded = loader.load(&mut *stream, self, &tag)?;

        if let Some(cache) = self.cache() {
            cache.add(&loaded, full_id);
        }
        Ok(loaded)
    }
}

/// Marks its manager idle again when dropped, including while unwinding out of
/// a panicking decoder.
struct BusyGuard<'a>(&'a mut dyn SourceManager);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set_busy(false);
    }
}

/// Lower-cased extension of the last component of a `/` separated path.
pub(crate) fn extension_tag(path: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) => name[dot + 1..].to_ascii_lowercase(),
        None => String::new(),
    }
}
