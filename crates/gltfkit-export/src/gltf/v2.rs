//! glTF 2.0 records
//!
//! Elements reference each other by position in their top-level array.

use std::collections::BTreeMap;

use gltfkit_model::{
    AccessorId, CameraProjection, GltfModel, MaterialDefinition, MeshModel, NodeModel, PrimitiveModel,
    TextureRef,
};
use gltfkit_structure::BufferStructure;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// glTF 2.0 root structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gltf {
    pub asset: Asset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub scenes: Vec<Scene>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub nodes: Vec<Node>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub meshes: Vec<Mesh>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub materials: Vec<Material>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub textures: Vec<Texture>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub images: Vec<Image>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub samplers: Vec<Sampler>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub accessors: Vec<Accessor>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub buffer_views: Vec<BufferView>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub buffers: Vec<Buffer>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub skins: Vec<Skin>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub animations: Vec<Animation>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub cameras: Vec<Camera>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub nodes: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skin: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<[f32; 16]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub weights: Vec<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub weights: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub attributes: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<usize>,
    pub mode: u32,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub targets: Vec<BTreeMap<String, usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal_texture: Option<TextureInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occlusion_texture: Option<TextureInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissive_texture: Option<TextureInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissive_factor: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha_cutoff: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub double_sided: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    pub base_color_factor: [f32; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metallic_roughness_texture: Option<TextureInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureInfo {
    pub index: usize,
    #[serde(skip_serializing_if = "is_zero", default)]
    pub tex_coord: u32,
    /// Normal scale or occlusion strength
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampler: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sampler {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mag_filter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_filter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_s: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_t: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,
    #[serde(skip_serializing_if = "is_zero_usize", default)]
    pub byte_offset: usize,
    pub component_type: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub normalized: bool,
    pub count: usize,
    #[serde(rename = "type")]
    pub accessor_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub buffer: usize,
    #[serde(skip_serializing_if = "is_zero_usize", default)]
    pub byte_offset: usize,
    pub byte_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_stride: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    pub byte_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse_bind_matrices: Option<usize>,
    pub joints: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skeleton: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub channels: Vec<Channel>,
    pub samplers: Vec<AnimationSampler>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub sampler: usize,
    pub target: ChannelTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<usize>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSampler {
    pub input: usize,
    pub interpolation: String,
    pub output: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub camera_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perspective: Option<Perspective>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orthographic: Option<Orthographic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Perspective {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f32>,
    pub yfov: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zfar: Option<f32>,
    pub znear: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orthographic {
    pub xmag: f32,
    pub ymag: f32,
    pub zfar: f32,
    pub znear: f32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

fn is_zero_usize(value: &usize) -> bool {
    *value == 0
}

/// Builds glTF 2.0 records for a packed model
pub struct GltfCreatorV2<'a> {
    model: &'a GltfModel,
    structure: &'a BufferStructure,
}

impl<'a> GltfCreatorV2<'a> {
    pub fn new(model: &'a GltfModel, structure: &'a BufferStructure) -> Self {
        Self { model, structure }
    }

    /// Convenience for `GltfCreatorV2::new(model, structure).build()`
    pub fn create(model: &GltfModel, structure: &BufferStructure) -> Gltf {
        GltfCreatorV2::new(model, structure).build()
    }

    pub fn build(&self) -> Gltf {
        let model = self.model;
        Gltf {
            asset: Asset {
                version: "2.0".to_string(),
                generator: model.asset.generator.clone(),
                copyright: model.asset.copyright.clone(),
            },
            scene: model.default_scene.map(|s| s.0),
            scenes: model
                .scenes
                .iter()
                .map(|s| Scene {
                    name: s.name.clone(),
                    nodes: s.nodes.iter().map(|n| n.0).collect(),
                })
                .collect(),
            nodes: model.nodes.iter().map(node).collect(),
            meshes: model.meshes.iter().map(|m| self.mesh(m)).collect(),
            materials: model.materials.iter().map(material).collect(),
            textures: model
                .textures
                .iter()
                .enumerate()
                .map(|(index, t)| Texture {
                    name: t.name.clone(),
                    source: t.image.map(|i| i.0),
                    sampler: Some(index),
                })
                .collect(),
            images: model
                .images
                .iter()
                .map(|i| Image {
                    name: i.name.clone(),
                    uri: i.uri.clone(),
                    mime_type: i.mime_type.clone(),
                    buffer_view: i.buffer_view.and_then(|v| self.structure.buffer_view_index(v)),
                })
                .collect(),
            samplers: model
                .textures
                .iter()
                .map(|t| Sampler {
                    mag_filter: t.sampler.mag_filter,
                    min_filter: t.sampler.min_filter,
                    wrap_s: t.sampler.wrap_s,
                    wrap_t: t.sampler.wrap_t,
                })
                .collect(),
            accessors: self.accessors(),
            buffer_views: self.buffer_views(),
            buffers: self
                .structure
                .buffers()
                .iter()
                .map(|b| Buffer {
                    uri: b.uri.clone(),
                    byte_length: b.byte_length,
                })
                .collect(),
            skins: model
                .skins
                .iter()
                .map(|s| Skin {
                    name: s.name.clone(),
                    inverse_bind_matrices: s.inverse_bind_matrices.and_then(|a| self.accessor_index(a)),
                    joints: s.joints.iter().map(|j| j.0).collect(),
                    skeleton: s.skeleton.map(|n| n.0),
                })
                .collect(),
            animations: self.animations(),
            cameras: model.cameras.iter().map(camera).collect(),
        }
    }

    fn accessor_index(&self, accessor: AccessorId) -> Option<usize> {
        self.structure.accessor_index(accessor)
    }

    fn accessors(&self) -> Vec<Accessor> {
        self.structure
            .accessors()
            .iter()
            .map(|packed| {
                let source = &self.model[packed.accessor];
                Accessor {
                    name: source.name.clone(),
                    buffer_view: packed
                        .buffer_view
                        .and_then(|v| self.structure.buffer_view_index(v)),
                    byte_offset: packed.byte_offset,
                    component_type: source.component_type.gl_constant(),
                    normalized: source.normalized,
                    count: packed.count,
                    accessor_type: source.element_type.as_str().to_string(),
                    max: source.max.clone(),
                    min: source.min.clone(),
                }
            })
            .collect()
    }

    fn buffer_views(&self) -> Vec<BufferView> {
        self.structure
            .buffer_views()
            .iter()
            .map(|view| BufferView {
                buffer: view
                    .buffer
                    .and_then(|b| self.structure.buffer_index(b))
                    .unwrap_or_default(),
                byte_offset: view.byte_offset,
                byte_length: view.byte_length,
                byte_stride: view.byte_stride,
                target: view.target.map(|t| t.gl_constant()),
            })
            .collect()
    }

    fn attributes(&self, attributes: &BTreeMap<String, AccessorId>) -> BTreeMap<String, usize> {
        attributes
            .iter()
            .filter_map(|(semantic, &a)| Some((semantic.clone(), self.accessor_index(a)?)))
            .collect()
    }

    fn primitive(&self, primitive: &PrimitiveModel) -> Primitive {
        Primitive {
            attributes: self.attributes(&primitive.attributes),
            indices: primitive.indices.and_then(|a| self.accessor_index(a)),
            material: primitive.material.map(|m| m.0),
            mode: primitive.mode,
            targets: primitive.targets.iter().map(|t| self.attributes(t)).collect(),
        }
    }

    fn mesh(&self, mesh: &MeshModel) -> Mesh {
        Mesh {
            name: mesh.name.clone(),
            primitives: mesh.primitives.iter().map(|p| self.primitive(p)).collect(),
            weights: mesh.weights.clone(),
        }
    }

    fn animations(&self) -> Vec<Animation> {
        self.model
            .animations
            .iter()
            .map(|animation| {
                let mut channels = Vec::with_capacity(animation.channels.len());
                let mut samplers = Vec::with_capacity(animation.channels.len());
                for channel in &animation.channels {
                    let (Some(input), Some(output)) = (
                        self.accessor_index(channel.sampler.input),
                        self.accessor_index(channel.sampler.output),
                    ) else {
                        warn!(animation = ?animation.name, "Skipping channel with unpacked sampler accessors");
                        continue;
                    };
                    channels.push(Channel {
                        sampler: samplers.len(),
                        target: ChannelTarget {
                            node: channel.node.map(|n| n.0),
                            path: channel.path.as_str().to_string(),
                        },
                    });
                    samplers.push(AnimationSampler {
                        input,
                        interpolation: channel.sampler.interpolation.as_str().to_string(),
                        output,
                    });
                }
                Animation {
                    name: animation.name.clone(),
                    channels,
                    samplers,
                }
            })
            .collect()
    }
}

fn node(node: &NodeModel) -> Node {
    if node.meshes.len() > 1 {
        warn!(
            node = ?node.name,
            meshes = node.meshes.len(),
            "Node has more than one mesh, only the first one is written"
        );
    }
    Node {
        name: node.name.clone(),
        mesh: node.meshes.first().map(|m| m.0),
        skin: node.skin.map(|s| s.0),
        camera: node.camera.map(|c| c.0),
        matrix: node.matrix,
        translation: node.translation,
        rotation: node.rotation,
        scale: node.scale,
        weights: node.weights.clone(),
        children: node.children.iter().map(|c| c.0).collect(),
    }
}

fn texture_info(texture: &Option<TextureRef>, scale: Option<f32>) -> Option<TextureInfo> {
    texture.map(|t| TextureInfo {
        index: t.texture.0,
        tex_coord: t.tex_coord,
        scale,
    })
}

fn material(material: &gltfkit_model::MaterialModel) -> Material {
    let mut record = Material {
        name: material.name.clone(),
        pbr_metallic_roughness: None,
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: None,
        alpha_mode: None,
        alpha_cutoff: None,
        double_sided: false,
    };
    // technique materials have no 2.0 counterpart and are written by name only
    if let MaterialDefinition::Pbr(pbr) = &material.definition {
        record.pbr_metallic_roughness = Some(PbrMetallicRoughness {
            base_color_factor: pbr.base_color_factor,
            base_color_texture: texture_info(&pbr.base_color_texture, None),
            metallic_factor: pbr.metallic_factor,
            roughness_factor: pbr.roughness_factor,
            metallic_roughness_texture: texture_info(&pbr.metallic_roughness_texture, None),
        });
        record.normal_texture = texture_info(&pbr.normal_texture, Some(pbr.normal_scale));
        record.occlusion_texture = texture_info(&pbr.occlusion_texture, Some(pbr.occlusion_strength));
        record.emissive_texture = texture_info(&pbr.emissive_texture, None);
        record.emissive_factor = (pbr.emissive_factor != [0.0; 3]).then_some(pbr.emissive_factor);
        record.alpha_mode = Some(pbr.alpha_mode.as_str().to_string());
        record.alpha_cutoff = pbr.alpha_cutoff;
        record.double_sided = pbr.double_sided;
    }
    record
}

fn camera(camera: &gltfkit_model::CameraModel) -> Camera {
    let (perspective, orthographic) = match camera.projection {
        CameraProjection::Perspective {
            aspect_ratio,
            yfov,
            znear,
            zfar,
        } => (
            Some(Perspective {
                aspect_ratio,
                yfov,
                zfar,
                znear,
            }),
            None,
        ),
        CameraProjection::Orthographic { xmag, ymag, znear, zfar } => {
            (None, Some(Orthographic { xmag, ymag, zfar, znear }))
        }
    };
    Camera {
        name: camera.name.clone(),
        camera_type: camera.projection.type_name().to_string(),
        perspective,
        orthographic,
    }
}
