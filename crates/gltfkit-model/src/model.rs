//! The scene graph arena

use std::collections::BTreeSet;

use gltfkit_core::SchemaVersion;
use serde::{Deserialize, Serialize};

use crate::accessor::AccessorModel;
use crate::animation::AnimationModel;
use crate::buffer::{BufferModel, BufferViewModel};
use crate::ids::*;
use crate::legacy::{ProgramModel, ShaderModel, TechniqueModel};
use crate::material::{ImageModel, MaterialModel, TextureModel};
use crate::mesh::MeshModel;
use crate::node::{CameraModel, NodeModel, SceneModel, SkinModel};

/// glTF asset metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub generator: Option<String>,
    pub copyright: Option<String>,
}

/// A complete glTF scene graph
///
/// Every element kind lives in its own insertion-ordered arena and is
/// addressed by a typed handle; `model[id]` resolves a handle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GltfModel {
    pub schema: SchemaVersion,
    pub asset: AssetInfo,
    pub accessors: Vec<AccessorModel>,
    pub animations: Vec<AnimationModel>,
    pub buffers: Vec<BufferModel>,
    pub buffer_views: Vec<BufferViewModel>,
    pub cameras: Vec<CameraModel>,
    pub images: Vec<ImageModel>,
    pub materials: Vec<MaterialModel>,
    pub meshes: Vec<MeshModel>,
    pub nodes: Vec<NodeModel>,
    pub scenes: Vec<SceneModel>,
    pub default_scene: Option<SceneId>,
    pub skins: Vec<SkinModel>,
    pub textures: Vec<TextureModel>,
    pub shaders: Vec<ShaderModel>,
    pub programs: Vec<ProgramModel>,
    pub techniques: Vec<TechniqueModel>,
}

macro_rules! arena {
    ($field:ident, $id:ident, $element:ty, $add:ident, $ids:ident, $get:ident) => {
        impl GltfModel {
            pub fn $add(&mut self, element: $element) -> $id {
                self.$field.push(element);
                $id(self.$field.len() - 1)
            }

            pub fn $ids(&self) -> impl Iterator<Item = $id> {
                (0..self.$field.len()).map($id)
            }

            pub fn $get(&self, id: $id) -> Option<&$element> {
                self.$field.get(id.0)
            }
        }

        impl std::ops::Index<$id> for GltfModel {
            type Output = $element;

            fn index(&self, id: $id) -> &$element {
                &self.$field[id.0]
            }
        }

        impl std::ops::IndexMut<$id> for GltfModel {
            fn index_mut(&mut self, id: $id) -> &mut $element {
                &mut self.$field[id.0]
            }
        }
    };
}

arena!(accessors, AccessorId, AccessorModel, add_accessor, accessor_ids, get_accessor);
arena!(animations, AnimationId, AnimationModel, add_animation, animation_ids, get_animation);
arena!(buffers, BufferId, BufferModel, add_buffer, buffer_ids, get_buffer);
arena!(buffer_views, BufferViewId, BufferViewModel, add_buffer_view, buffer_view_ids, get_buffer_view);
arena!(cameras, CameraId, CameraModel, add_camera, camera_ids, get_camera);
arena!(images, ImageId, ImageModel, add_image, image_ids, get_image);
arena!(materials, MaterialId, MaterialModel, add_material, material_ids, get_material);
arena!(meshes, MeshId, MeshModel, add_mesh, mesh_ids, get_mesh);
arena!(nodes, NodeId, NodeModel, add_node, node_ids, get_node);
arena!(scenes, SceneId, SceneModel, add_scene, scene_ids, get_scene);
arena!(skins, SkinId, SkinModel, add_skin, skin_ids, get_skin);
arena!(textures, TextureId, TextureModel, add_texture, texture_ids, get_texture);
arena!(shaders, ShaderId, ShaderModel, add_shader, shader_ids, get_shader);
arena!(programs, ProgramId, ProgramModel, add_program, program_ids, get_program);
arena!(techniques, TechniqueId, TechniqueModel, add_technique, technique_ids, get_technique);

impl GltfModel {
    /// Create an empty model for the given schema
    pub fn new(schema: SchemaVersion) -> Self {
        Self {
            schema,
            ..Default::default()
        }
    }

    /// Every URI currently used by an image, buffer or shader
    pub fn existing_uris(&self) -> BTreeSet<String> {
        let images = self.images.iter().filter_map(|i| i.uri.clone());
        let buffers = self.buffers.iter().filter_map(|b| b.uri.clone());
        let shaders = self.shaders.iter().filter_map(|s| s.uri.clone());
        images.chain(buffers).chain(shaders).collect()
    }
}
