//! Built-in decoders and their registration.

mod obj;
mod raster;

pub use obj::*;
pub use raster::*;

use std::sync::Arc;

use crate::{Image, Loader, MaterialLibrary, Model, Registries};

/// Type tags served by `ImageLoader`.
pub const IMAGE_TAGS: &[&str] = &[
    "bmp", "png", "jpg", "jpeg", "gif", "tga", "dds", "ico", "pbm", "pgm", "ppm", "pnm", "tif",
    "tiff", "webp", "hdr", "qoi",
];

impl Registries {
    /// Registers every built-in decoder. Tags that are already bound keep their
    /// decoder, so custom loaders registered beforehand take precedence.
    pub fn register_defaults(&mut self) {
        let images: Arc<dyn Loader<Image>> = Arc::new(ImageLoader);
        for tag in IMAGE_TAGS {
            self.register::<Image>(*tag, images.clone());
        }
        self.register::<Model>("obj", Arc::new(ObjLoader));
        self.register::<MaterialLibrary>("mtl", Arc::new(MtlLoader));

        log::info!(
            "registered default loaders: {} image formats, obj, mtl",
            IMAGE_TAGS.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_tags_share_one_decoder() {
        let registries = Registries::with_defaults();
        let png = registries.lookup::<Image>("png").unwrap();
        let jpg = registries.lookup::<Image>("jpg").unwrap();
        assert!(Arc::ptr_eq(&png, &jpg));
        assert_eq!(registries.registry::<Image>().unwrap().len(), IMAGE_TAGS.len());
        assert!(registries.lookup::<Model>("obj").is_some());
        assert!(registries.lookup::<MaterialLibrary>("mtl").is_some());
    }

    #[test]
    fn earlier_registrations_take_precedence() {
        let mut registries = Registries::new();
        let custom: Arc<dyn Loader<Model>> = Arc::new(ObjLoader);
        registries.register::<Model>("obj", custom.clone());
        registries.register_defaults();
        assert!(Arc::ptr_eq(&registries.lookup::<Model>("obj").unwrap(), &custom));
    }

    #[test]
    fn clear_drops_everything() {
        let mut registries = Registries::with_defaults();
        registries.clear();
        assert!(registries.lookup::<Image>("png").is_none());
        registries.register_defaults();
        assert!(registries.lookup::<Image>("png").is_some());
    }
}
