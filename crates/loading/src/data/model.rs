use std::collections::BTreeMap;

use crate::{Animation, Image};

/// Indexed triangle mesh. Attribute arrays are flat (`positions` holds x, y, z
/// triples) and share the single index buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub texcoords: Vec<f32>,
    pub indices: Vec<u32>,
    /// Index into `Model::materials`.
    pub material: Option<usize>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    /// 1.0 is fully opaque.
    pub opacity: f32,
    /// Full identifier of the diffuse texture, looked up in `Model::images`.
    pub texture: Option<String>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: [0.2; 3],
            diffuse: [0.8; 3],
            specular: [0.0; 3],
            shininess: 0.0,
            opacity: 1.0,
            texture: None,
        }
    }
}

impl Material {
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Materials of one `.mtl` file together with the textures they reference,
/// keyed by full identifier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialLibrary {
    pub materials: Vec<Material>,
    pub images: BTreeMap<String, Image>,
}

/// A renderable model: meshes, their materials, every image the materials
/// reference and optional animations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub images: BTreeMap<String, Image>,
    pub animations: Vec<Animation>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn image(&self, id: &str) -> Option<&Image> {
        self.images.get(id)
    }

    /// Keeps the first image stored under `id`.
    pub fn add_image(&mut self, id: impl Into<String>, image: Image) {
        self.images.entry(id.into()).or_insert(image);
    }

    pub fn add_animation(&mut self, animation: Animation) {
        self.animations.push(animation);
    }

    pub fn animation(&self, index: usize) -> Option<&Animation> {
        self.animations.get(index)
    }

    /// Appends a material library and returns the index of its first material
    /// in the combined list.
    pub fn add_materials(&mut self, library: MaterialLibrary) -> usize {
        let offset = self.materials.len();
        self.materials.extend(library.materials);
        for (id, image) in library.images {
            self.add_image(id, image);
        }
        offset
    }

    pub fn drop_empty_meshes(&mut self) {
        self.meshes.retain(|mesh| !mesh.is_empty());
    }

    /// Moves meshes with transparent materials after the opaque ones, keeping
    /// the relative order inside each group.
    pub fn sort_meshes_by_opacity(&mut self) {
        let materials = &self.materials;
        self.meshes.sort_by_key(|mesh| {
            mesh.material
                .and_then(|index| materials.get(index))
                .is_some_and(Material::is_transparent)
        });
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
        self.materials.clear();
        self.images.clear();
        self.animations.clear();
    }
}
