use std::{io, marker::PhantomData, sync::Arc};

use crate::{
    Animation, Cache, Cacheable, Image, Loader, MaterialLibrary, Model, Registries, Result,
    SoundTrack, SourceManager, Stream,
};

/// Type tag every id resolves to under a `RecordingManager`. No file extension
/// can produce it.
pub const RECORDING_TAG: &str = "?recorded?";

/// Decoder producing `T::default()` without reading its stream.
pub struct PlaceholderLoader<T>(PhantomData<fn() -> T>);

impl<T> PlaceholderLoader<T> {
    pub fn new() -> Self {
        PlaceholderLoader(PhantomData)
    }
}

impl<T> Default for PlaceholderLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Cacheable + Default> Loader<T> for PlaceholderLoader<T> {
    fn do_load(
        &self,
        _stream: &mut dyn io::BufRead,
        _manager: &mut dyn SourceManager,
        _type_tag: &str,
    ) -> Result<T> {
        Ok(T::default())
    }
}

/// Registries binding `RECORDING_TAG` to a `PlaceholderLoader` for every
/// built-in data type. Add your own types before handing them to
/// `RecordingManager::with_registries`.
pub fn placeholder_registries() -> Registries {
    let mut registries = Registries::new();
    registries.register::<Image>(RECORDING_TAG, Arc::new(PlaceholderLoader::<Image>::new()));
    registries.register::<Model>(RECORDING_TAG, Arc::new(PlaceholderLoader::<Model>::new()));
    registries.register::<MaterialLibrary>(
        RECORDING_TAG,
        Arc::new(PlaceholderLoader::<MaterialLibrary>::new()),
    );
    registries.register::<Animation>(
        RECORDING_TAG,
        Arc::new(PlaceholderLoader::<Animation>::new()),
    );
    registries.register::<SoundTrack>(
        RECORDING_TAG,
        Arc::new(PlaceholderLoader::<SoundTrack>::new()),
    );
    registries
}

/// Manager that reads nothing and remembers what it was asked for.
///
/// Hand it to a decoder driven by hand: every resource the decoder requests
/// comes back as an empty placeholder, and its id is kept (up to
/// `max_requests` of them) so the dependencies of a resource can be listed
/// and loaded afterwards. Ids are recorded exactly as requested. It has no
/// cache and is never busy, so it never spawns children.
pub struct RecordingManager {
    requests: Vec<String>,
    max_requests: usize,
    registries: Arc<Registries>,
}

impl Default for RecordingManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingManager {
    pub const DEFAULT_MAX_REQUESTS: usize = 100;

    pub fn new() -> Self {
        Self::with_registries(placeholder_registries())
    }

    pub fn with_registries(registries: Registries) -> Self {
        RecordingManager {
            requests: Vec::new(),
            max_requests: Self::DEFAULT_MAX_REQUESTS,
            registries: Arc::new(registries),
        }
    }

    pub fn requests(&self) -> &[String] {
        &self.requests
    }

    pub fn request(&self, index: usize) -> Option<&str> {
        self.requests.get(index).map(String::as_str)
    }

    pub fn clear_requests(&mut self) {
        self.requests.clear();
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Requests beyond the limit are dropped. Already recorded ones are kept.
    pub fn set_max_requests(&mut self, max_requests: usize) {
        self.max_requests = max_requests;
    }

    /// Records `id` and returns a placeholder `T`.
    pub fn load<T: Cacheable>(&mut self, id: &str) -> Result<T> {
        let manager: &mut dyn SourceManager = self;
        manager.load::<T>(id)
    }
}

impl SourceManager for RecordingManager {
    fn full_id(&self, id: &str) -> Result<String> {
        Ok(id.to_string())
    }

    fn create_stream(&mut self, full_id: &str) -> Result<Stream> {
        if self.requests.len() < self.max_requests {
            self.requests.push(full_id.to_string());
        } else {
            log::debug!("request limit reached, not recording {full_id:?}");
        }
        Ok(Box::new(io::empty()))
    }

    fn type_tag(&self, _full_id: &str) -> String {
        RECORDING_TAG.to_string()
    }

    fn spawn(&self) -> Box<dyn SourceManager> {
        Box::new(RecordingManager {
            requests: Vec::new(),
            max_requests: self.max_requests,
            registries: self.registries.clone(),
        })
    }

    fn is_busy(&self) -> bool {
        false
    }

    fn set_busy(&mut self, _busy: bool) {}

    fn cache(&self) -> Option<&Arc<Cache>> {
        None
    }

    fn set_cache(&mut self, _cache: Option<Arc<Cache>>) {}

    fn registries(&self) -> &Arc<Registries> {
        &self.registries
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::{MtlLoader, ObjLoader};

    const SHIP_OBJ: &[u8] = b"\
mtllib ship.mtl
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";

    const SHIP_MTL: &[u8] = b"\
newmtl paint
map_Kd textures/paint.png
map_Ks textures/shine.png
newmtl trim
map_Kd textures/paint.png
";

    #[test]
    fn lists_what_a_model_depends_on() {
        let mut recorder = RecordingManager::new();

        let model = ObjLoader
            .load(&mut Cursor::new(SHIP_OBJ), &mut recorder, "obj")
            .unwrap();
        assert_eq!(model.meshes.len(), 1);
        assert!(model.materials.is_empty());
        assert_eq!(recorder.requests(), ["ship.mtl"]);

        let library = MtlLoader
            .load(&mut Cursor::new(SHIP_MTL), &mut recorder, "mtl")
            .unwrap();
        assert_eq!(library.materials.len(), 2);
        assert_eq!(
            recorder.requests(),
            ["ship.mtl", "textures/paint.png", "textures/shine.png"]
        );
        assert_eq!(recorder.request(1), Some("textures/paint.png"));
        assert_eq!(recorder.request(3), None);
    }

    #[test]
    fn loads_return_placeholders_without_caching() {
        let mut recorder = RecordingManager::new();
        recorder.set_cache(Some(Arc::new(Cache::new())));

        let image: Image = recorder.load("any/where.png").unwrap();

        assert_eq!(image, Image::default());
        assert!(recorder.cache().is_none());
        assert!(!recorder.is_busy());
        assert_eq!(recorder.requests(), ["any/where.png"]);
    }

    #[test]
    fn stops_recording_at_the_limit() {
        let mut recorder = RecordingManager::new();
        recorder.set_max_requests(2);
        for id in ["a.png", "b.png", "c.png"] {
            recorder.load::<Image>(id).unwrap();
        }
        assert_eq!(recorder.requests(), ["a.png", "b.png"]);

        recorder.clear_requests();
        recorder.load::<Image>("d.png").unwrap();
        assert_eq!(recorder.requests(), ["d.png"]);
    }

    #[test]
    fn unregistered_types_are_unknown() {
        let mut recorder = RecordingManager::with_registries(Registries::new());
        let err = recorder.load::<Model>("ship.obj").unwrap_err();
        assert!(matches!(
            err,
            crate::LoadError::UnknownType { ref tag, .. } if tag == RECORDING_TAG
        ));
        // The stream was still requested before the lookup failed.
        assert_eq!(recorder.requests(), ["ship.obj"]);
    }
}
