use std::{cell::RefCell, io::BufRead};

use crate::{
    Image, LoadError, Loader, Material, MaterialLibrary, Mesh, Model, Result, SourceManager,
};

/// Wavefront `.obj` models. Material libraries named by `mtllib` are loaded
/// through the manager, so they resolve next to the `.obj` and go through the
/// cache like any other resource.
pub struct ObjLoader;

impl Loader<Model> for ObjLoader {
    fn do_load(
        &self,
        mut stream: &mut dyn BufRead,
        manager: &mut dyn SourceManager,
        type_tag: &str,
    ) -> Result<Model> {
        let manager = RefCell::new(manager);
        let libraries = RefCell::new(Vec::<MaterialLibrary>::new());
        let nested_error = RefCell::new(None::<LoadError>);

        let (models, _) = tobj::load_obj_buf(&mut stream, &tobj::GPU_LOAD_OPTIONS, |mtl_path| {
            let path = mtl_path.to_string_lossy();
            match manager.borrow_mut().load::<MaterialLibrary>(&path) {
                Ok(library) => {
                    // Only the names matter to tobj, to number `usemtl` references.
                    let materials: Vec<tobj::Material> = library
                        .materials
                        .iter()
                        .map(|material| tobj::Material {
                            name: material.name.clone(),
                            ..Default::default()
                        })
                        .collect();
                    let names = materials
                        .iter()
                        .enumerate()
                        .map(|(index, material)| (material.name.clone(), index))
                        .collect();
                    libraries.borrow_mut().push(library);
                    Ok((materials, names))
                }
                Err(err) => {
                    log::debug!("material library {path:?} failed to load: {err}");
                    nested_error.borrow_mut().get_or_insert(err);
                    Err(tobj::LoadError::OpenFileFailed)
                }
            }
        })
        .map_err(|err| LoadError::decode(type_tag, err))?;

        if let Some(err) = nested_error.into_inner() {
            return Err(err);
        }

        let mut model = Model::new(models.first().map(|m| m.name.clone()).unwrap_or_default());
        for library in libraries.into_inner() {
            model.add_materials(library);
        }
        model.meshes = models
            .into_iter()
            .map(|m| Mesh {
                name: m.name,
                positions: m.mesh.positions,
                normals: m.mesh.normals,
                texcoords: m.mesh.texcoords,
                indices: m.mesh.indices,
                material: m.mesh.material_id,
            })
            .collect();
        model.drop_empty_meshes();
        model.sort_meshes_by_opacity();
        Ok(model)
    }
}

/// Wavefront `.mtl` material libraries. Diffuse, ambient and specular maps are
/// loaded through the manager, relative to the `.mtl` file, and kept by full
/// identifier. Only the diffuse map is bound to the material.
pub struct MtlLoader;

impl Loader<MaterialLibrary> for MtlLoader {
    fn do_load(
        &self,
        mut stream: &mut dyn BufRead,
        manager: &mut dyn SourceManager,
        type_tag: &str,
    ) -> Result<MaterialLibrary> {
        let (materials, _) =
            tobj::load_mtl_buf(&mut stream).map_err(|err| LoadError::decode(type_tag, err))?;

        let mut library = MaterialLibrary::default();
        for source in materials {
            let mut texture = None;
            for (slot, path) in [
                ("diffuse", &source.diffuse_texture),
                ("ambient", &source.ambient_texture),
                ("specular", &source.specular_texture),
            ] {
                let Some(path) = path.as_deref().filter(|path| !path.is_empty()) else {
                    continue;
                };
                let id = manager.full_id(path)?;
                if !library.images.contains_key(&id) {
                    let image = manager.load::<Image>(path)?;
                    library.images.insert(id.clone(), image);
                }
                if slot == "diffuse" {
                    texture = Some(id);
                }
            }

            let defaults = Material::default();
            let mut material = Material {
                name: source.name,
                ambient: source.ambient.unwrap_or(defaults.ambient),
                diffuse: source.diffuse.unwrap_or(defaults.diffuse),
                specular: source.specular.unwrap_or(defaults.specular),
                shininess: source.shininess.unwrap_or(defaults.shininess),
                opacity: defaults.opacity,
                texture,
            };
            if let Some(dissolve) = source.dissolve {
                material.set_opacity(dissolve);
            }
            library.materials.push(material);
        }
        Ok(library)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, atomic::Ordering};

    use super::*;
    use crate::{
        Cache, Registries,
        manager::tests::{MemoryManager, RawImageLoader},
    };

    const ROOM_OBJ: &[u8] = b"\
mtllib room.mtl
v 0 0 0
v 1 0 0
v 0 1 0
o window
usemtl glass
f 1 2 3
o wall
usemtl brick
f 1 2 3
";

    const ROOM_MTL: &[u8] = b"\
newmtl glass
d 0.25
newmtl brick
Kd 0.5 0.25 0.125
map_Kd brick.raw
map_Ka brick.raw
";

    fn manager(raw: Arc<RawImageLoader>, cache: Option<Arc<Cache>>) -> MemoryManager {
        let mut registries = Registries::new();
        registries.register::<Image>("raw", raw);
        registries.register::<Model>("obj", Arc::new(ObjLoader));
        registries.register::<MaterialLibrary>("mtl", Arc::new(MtlLoader));
        MemoryManager::new(registries, cache)
    }

    #[test]
    fn obj_pulls_in_materials_and_textures() {
        let raw = Arc::new(RawImageLoader::default());
        let cache = Arc::new(Cache::new());
        let mut manager = manager(raw.clone(), Some(cache.clone()));
        manager.add_file("/room/room.obj", ROOM_OBJ);
        manager.add_file("/room/room.mtl", ROOM_MTL);
        manager.add_file("/room/brick.raw", b"bricks");

        let model = manager.as_dyn().load::<Model>("/room/room.obj").unwrap();

        assert_eq!(model.materials.len(), 2);
        let brick = &model.materials[1];
        assert_eq!(brick.diffuse, [0.5, 0.25, 0.125]);
        assert_eq!(brick.texture.as_deref(), Some("/room/brick.raw"));
        assert!(model.materials[0].is_transparent());
        assert_eq!(model.materials[0].opacity, 0.25);

        // The same map used twice is decoded once.
        assert_eq!(model.images.len(), 1);
        assert_eq!(raw.decodes.load(Ordering::SeqCst), 1);

        // Opaque wall first, transparent window last.
        let names: Vec<_> = model.meshes.iter().map(|mesh| mesh.name.as_str()).collect();
        assert_eq!(names, ["wall", "window"]);
        assert_eq!(model.meshes[0].material, Some(1));

        assert!(cache.contains::<MaterialLibrary>("/room/room.mtl"));
        assert!(cache.contains::<Image>("/room/brick.raw"));
    }

    #[test]
    fn missing_material_library_fails_the_model() {
        let raw = Arc::new(RawImageLoader::default());
        let cache = Arc::new(Cache::new());
        let mut manager = manager(raw, Some(cache.clone()));
        manager.add_file("/room/room.obj", ROOM_OBJ);

        let err = manager.as_dyn().load::<Model>("/room/room.obj").unwrap_err();

        assert!(matches!(err, LoadError::Unresolvable { ref id, .. } if id == "/room/room.mtl"));
        assert_eq!(cache.len::<Model>(), 0);
    }
}
