//! glTF 1.0 records
//!
//! Every top-level collection is a dictionary keyed by string IDs, and
//! elements reference each other by those IDs. Accessor, buffer view and
//! buffer IDs are taken from the [`BufferStructure`]; all other IDs are
//! derived from element names.

use std::collections::BTreeMap;

use gltfkit_model::{
    AccessorId, AttributeMap, CameraProjection, ElementId, GltfModel, MaterialDefinition, MaterialValue,
    NodeId, ShaderId,
};
use gltfkit_structure::{BufferStructure, IdGenerator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Extension carrying images stored in buffer views
pub const KHR_BINARY_GLTF: &str = "KHR_binary_glTF";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gltf {
    pub asset: Asset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub scenes: BTreeMap<String, Scene>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub nodes: BTreeMap<String, Node>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub meshes: BTreeMap<String, Mesh>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub materials: BTreeMap<String, Material>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub techniques: BTreeMap<String, Technique>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub programs: BTreeMap<String, Program>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub shaders: BTreeMap<String, Shader>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub textures: BTreeMap<String, Texture>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub images: BTreeMap<String, Image>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub samplers: BTreeMap<String, Sampler>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub accessors: BTreeMap<String, Accessor>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub buffer_views: BTreeMap<String, BufferView>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub buffers: BTreeMap<String, Buffer>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub skins: BTreeMap<String, Skin>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub animations: BTreeMap<String, Animation>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub cameras: BTreeMap<String, Camera>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub extensions_used: Vec<String>,
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
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub meshes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skin: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub skeletons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joint_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<[f32; 16]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    pub mode: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technique: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub values: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technique {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub program: String,
    pub parameters: BTreeMap<String, TechniqueParameter>,
    pub attributes: BTreeMap<String, String>,
    pub uniforms: BTreeMap<String, String>,
    pub states: TechniqueStates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueParameter {
    #[serde(rename = "type")]
    pub parameter_type: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechniqueStates {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub enable: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub attributes: Vec<String>,
    pub vertex_shader: String,
    pub fragment_shader: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shader {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub shader_type: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Texture {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub sampler: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_format: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub texel_type: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub extensions: BTreeMap<String, BinaryImage>,
}

/// Image stored in a buffer view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryImage {
    pub buffer_view: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
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
    pub buffer_view: String,
    pub byte_offset: usize,
    pub byte_stride: usize,
    pub component_type: u32,
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
    pub buffer: String,
    pub byte_offset: usize,
    pub byte_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    pub byte_length: usize,
    #[serde(rename = "type")]
    pub buffer_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_shape_matrix: Option<[f32; 16]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse_bind_matrices: Option<String>,
    pub joint_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub channels: Vec<Channel>,
    /// Parameter name to accessor ID
    pub parameters: BTreeMap<String, String>,
    pub samplers: BTreeMap<String, AnimationSampler>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub sampler: String,
    pub target: ChannelTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelTarget {
    pub id: String,
    pub path: String,
}

/// Input and output name animation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSampler {
    pub input: String,
    pub interpolation: String,
    pub output: String,
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

/// String IDs of the elements that are not packed, in arena order
#[derive(Debug, Default)]
struct ElementIds {
    nodes: Vec<String>,
    meshes: Vec<String>,
    materials: Vec<String>,
    techniques: Vec<String>,
    programs: Vec<String>,
    shaders: Vec<String>,
    textures: Vec<String>,
    samplers: Vec<String>,
    images: Vec<String>,
    skins: Vec<String>,
    animations: Vec<String>,
    cameras: Vec<String>,
    scenes: Vec<String>,
}

fn assign_ids<'a>(kind: &str, names: impl Iterator<Item = Option<&'a String>>) -> Vec<String> {
    let mut ids = IdGenerator::new();
    names
        .map(|name| ids.generate(name.map(String::as_str).unwrap_or(kind)))
        .collect()
}

fn lookup<I: ElementId>(ids: &[String], id: I) -> Option<String> {
    ids.get(id.index()).cloned()
}

/// Builds glTF 1.0 records for a packed model
pub struct GltfCreatorV1<'a> {
    model: &'a GltfModel,
    structure: &'a BufferStructure,
    ids: ElementIds,
}

impl<'a> GltfCreatorV1<'a> {
    pub fn new(model: &'a GltfModel, structure: &'a BufferStructure) -> Self {
        let ids = ElementIds {
            nodes: assign_ids("node", model.nodes.iter().map(|e| e.name.as_ref())),
            meshes: assign_ids("mesh", model.meshes.iter().map(|e| e.name.as_ref())),
            materials: assign_ids("material", model.materials.iter().map(|e| e.name.as_ref())),
            techniques: assign_ids("technique", model.techniques.iter().map(|e| e.name.as_ref())),
            programs: assign_ids("program", model.programs.iter().map(|e| e.name.as_ref())),
            shaders: assign_ids("shader", model.shaders.iter().map(|e| e.name.as_ref())),
            textures: assign_ids("texture", model.textures.iter().map(|e| e.name.as_ref())),
            samplers: assign_ids("sampler", model.textures.iter().map(|_| None)),
            images: assign_ids("image", model.images.iter().map(|e| e.name.as_ref())),
            skins: assign_ids("skin", model.skins.iter().map(|e| e.name.as_ref())),
            animations: assign_ids("animation", model.animations.iter().map(|e| e.name.as_ref())),
            cameras: assign_ids("camera", model.cameras.iter().map(|e| e.name.as_ref())),
            scenes: assign_ids("scene", model.scenes.iter().map(|e| e.name.as_ref())),
        };
        Self { model, structure, ids }
    }

    /// Convenience for `GltfCreatorV1::new(model, structure).build()`
    pub fn create(model: &GltfModel, structure: &BufferStructure) -> Gltf {
        GltfCreatorV1::new(model, structure).build()
    }

    pub fn build(&self) -> Gltf {
        let model = self.model;
        let ids = &self.ids;
        let images = self.images();
        let extensions_used = if images.values().any(|i| !i.extensions.is_empty()) {
            vec![KHR_BINARY_GLTF.to_string()]
        } else {
            Vec::new()
        };
        // the 1.0 schema requires both shaders, unresolved ones are written empty
        let shader_id = |shader: Option<ShaderId>| {
            shader.and_then(|s| lookup(&ids.shaders, s)).unwrap_or_default()
        };

        Gltf {
            asset: Asset {
                version: "1.0".to_string(),
                generator: model.asset.generator.clone(),
                copyright: model.asset.copyright.clone(),
            },
            scene: model.default_scene.and_then(|s| lookup(&ids.scenes, s)),
            scenes: model
                .scenes
                .iter()
                .zip(&ids.scenes)
                .map(|(scene, id)| {
                    let record = Scene {
                        name: scene.name.clone(),
                        nodes: self.node_ids(&scene.nodes),
                    };
                    (id.clone(), record)
                })
                .collect(),
            nodes: self.nodes(),
            meshes: self.meshes(),
            materials: self.materials(),
            techniques: self.techniques(),
            programs: model
                .programs
                .iter()
                .zip(&ids.programs)
                .map(|(program, id)| {
                    let record = Program {
                        name: program.name.clone(),
                        attributes: program.attributes.clone(),
                        vertex_shader: shader_id(program.vertex_shader),
                        fragment_shader: shader_id(program.fragment_shader),
                    };
                    (id.clone(), record)
                })
                .collect(),
            shaders: model
                .shaders
                .iter()
                .zip(&ids.shaders)
                .map(|(shader, id)| {
                    let record = Shader {
                        name: shader.name.clone(),
                        shader_type: shader.shader_type.gl_constant(),
                        uri: shader.uri.clone(),
                    };
                    (id.clone(), record)
                })
                .collect(),
            textures: model
                .textures
                .iter()
                .zip(ids.textures.iter().zip(&ids.samplers))
                .map(|(texture, (id, sampler))| {
                    let record = Texture {
                        name: texture.name.clone(),
                        source: texture.image.and_then(|i| lookup(&ids.images, i)),
                        sampler: sampler.clone(),
                        format: texture.format,
                        internal_format: texture.internal_format,
                        target: texture.target,
                        texel_type: texture.texel_type,
                    };
                    (id.clone(), record)
                })
                .collect(),
            images,
            samplers: model
                .textures
                .iter()
                .zip(&ids.samplers)
                .map(|(texture, id)| {
                    let record = Sampler {
                        mag_filter: texture.sampler.mag_filter,
                        min_filter: texture.sampler.min_filter,
                        wrap_s: texture.sampler.wrap_s,
                        wrap_t: texture.sampler.wrap_t,
                    };
                    (id.clone(), record)
                })
                .collect(),
            accessors: self.accessors(),
            buffer_views: self.buffer_views(),
            buffers: self
                .structure
                .buffers()
                .iter()
                .map(|b| {
                    let record = Buffer {
                        uri: b.uri.clone(),
                        byte_length: b.byte_length,
                        buffer_type: "arraybuffer".to_string(),
                    };
                    (b.id.clone(), record)
                })
                .collect(),
            skins: self.skins(),
            animations: self.animations(),
            cameras: self.cameras(),
            extensions_used,
        }
    }

    fn accessor_id(&self, accessor: AccessorId) -> Option<String> {
        self.structure.accessor_id(accessor).map(str::to_string)
    }

    fn node_ids(&self, nodes: &[NodeId]) -> Vec<String> {
        nodes.iter().filter_map(|&n| lookup(&self.ids.nodes, n)).collect()
    }

    fn value(&self, value: &MaterialValue) -> Value {
        match value {
            MaterialValue::Scalar(v) => Value::from(*v),
            MaterialValue::Vector(v) => Value::from(v.clone()),
            MaterialValue::Bool(v) => Value::from(*v),
            MaterialValue::Text(v) => Value::from(v.clone()),
            MaterialValue::Texture(t) => lookup(&self.ids.textures, *t).map(Value::from).unwrap_or(Value::Null),
        }
    }

    fn accessors(&self) -> BTreeMap<String, Accessor> {
        self.structure
            .accessors()
            .iter()
            .map(|packed| {
                let source = &self.model[packed.accessor];
                let record = Accessor {
                    name: source.name.clone(),
                    buffer_view: packed
                        .buffer_view
                        .and_then(|v| self.structure.buffer_view_id(v))
                        .unwrap_or_default()
                        .to_string(),
                    byte_offset: packed.byte_offset,
                    byte_stride: packed.byte_stride,
                    component_type: source.component_type.gl_constant(),
                    count: packed.count,
                    accessor_type: source.element_type.as_str().to_string(),
                    max: source.max.clone(),
                    min: source.min.clone(),
                };
                (packed.id.clone(), record)
            })
            .collect()
    }

    fn buffer_views(&self) -> BTreeMap<String, BufferView> {
        self.structure
            .buffer_views()
            .iter()
            .map(|view| {
                let record = BufferView {
                    buffer: view
                        .buffer
                        .and_then(|b| self.structure.buffer_id(b))
                        .unwrap_or_default()
                        .to_string(),
                    byte_offset: view.byte_offset,
                    byte_length: view.byte_length,
                    target: view.target.map(|t| t.gl_constant()),
                };
                (view.id.clone(), record)
            })
            .collect()
    }

    fn nodes(&self) -> BTreeMap<String, Node> {
        let ids = &self.ids;
        self.model
            .nodes
            .iter()
            .zip(&ids.nodes)
            .map(|(node, id)| {
                let skin = node.skin.and_then(|s| lookup(&ids.skins, s));
                let skeletons = node
                    .skin
                    .and_then(|s| self.model.get_skin(s))
                    .and_then(|s| s.skeleton)
                    .and_then(|n| lookup(&ids.nodes, n))
                    .into_iter()
                    .collect();
                let record = Node {
                    name: node.name.clone(),
                    children: self.node_ids(&node.children),
                    meshes: node.meshes.iter().filter_map(|&m| lookup(&ids.meshes, m)).collect(),
                    skin,
                    skeletons,
                    camera: node.camera.and_then(|c| lookup(&ids.cameras, c)),
                    joint_name: node.joint_name.clone(),
                    matrix: node.matrix,
                    translation: node.translation,
                    rotation: node.rotation,
                    scale: node.scale,
                };
                (id.clone(), record)
            })
            .collect()
    }

    fn attributes(&self, attributes: &AttributeMap) -> BTreeMap<String, String> {
        attributes
            .iter()
            .filter_map(|(semantic, &a)| Some((semantic.clone(), self.accessor_id(a)?)))
            .collect()
    }

    fn meshes(&self) -> BTreeMap<String, Mesh> {
        self.model
            .meshes
            .iter()
            .zip(&self.ids.meshes)
            .map(|(mesh, id)| {
                let primitives = mesh
                    .primitives
                    .iter()
                    .map(|p| Primitive {
                        attributes: self.attributes(&p.attributes),
                        indices: p.indices.and_then(|a| self.accessor_id(a)),
                        material: p.material.and_then(|m| lookup(&self.ids.materials, m)),
                        mode: p.mode,
                    })
                    .collect();
                let record = Mesh {
                    name: mesh.name.clone(),
                    primitives,
                };
                (id.clone(), record)
            })
            .collect()
    }

    fn materials(&self) -> BTreeMap<String, Material> {
        self.model
            .materials
            .iter()
            .zip(&self.ids.materials)
            .map(|(material, id)| {
                let (technique, values) = match &material.definition {
                    MaterialDefinition::Technique(t) => (
                        t.technique.and_then(|t| lookup(&self.ids.techniques, t)),
                        t.values
                            .iter()
                            .map(|(name, value)| (name.clone(), self.value(value)))
                            .collect(),
                    ),
                    MaterialDefinition::Pbr(pbr) => {
                        let diffuse = match pbr.base_color_texture {
                            Some(r) => self.value(&MaterialValue::Texture(r.texture)),
                            None => Value::from(pbr.base_color_factor.to_vec()),
                        };
                        (None, BTreeMap::from([("diffuse".to_string(), diffuse)]))
                    }
                };
                let record = Material {
                    name: material.name.clone(),
                    technique,
                    values,
                };
                (id.clone(), record)
            })
            .collect()
    }

    fn techniques(&self) -> BTreeMap<String, Technique> {
        self.model
            .techniques
            .iter()
            .zip(&self.ids.techniques)
            .map(|(technique, id)| {
                let parameters = technique
                    .parameters
                    .iter()
                    .map(|(name, p)| {
                        let parameter = TechniqueParameter {
                            parameter_type: p.parameter_type,
                            count: p.count,
                            semantic: p.semantic.clone(),
                            node: p.node.and_then(|n| lookup(&self.ids.nodes, n)),
                            value: p.value.as_ref().map(|v| self.value(v)),
                        };
                        (name.clone(), parameter)
                    })
                    .collect();
                let record = Technique {
                    name: technique.name.clone(),
                    program: technique
                        .program
                        .and_then(|p| lookup(&self.ids.programs, p))
                        .unwrap_or_default(),
                    parameters,
                    attributes: technique.attributes.clone(),
                    uniforms: technique.uniforms.clone(),
                    states: TechniqueStates {
                        enable: technique.enabled_states.clone(),
                    },
                };
                (id.clone(), record)
            })
            .collect()
    }

    fn images(&self) -> BTreeMap<String, Image> {
        self.model
            .images
            .iter()
            .zip(&self.ids.images)
            .map(|(image, id)| {
                let mut extensions = BTreeMap::new();
                if let Some(view) = image.buffer_view.and_then(|v| self.structure.buffer_view_id(v)) {
                    extensions.insert(
                        KHR_BINARY_GLTF.to_string(),
                        BinaryImage {
                            buffer_view: view.to_string(),
                            mime_type: image.mime_type.clone(),
                        },
                    );
                }
                let record = Image {
                    name: image.name.clone(),
                    uri: image.uri.clone(),
                    extensions,
                };
                (id.clone(), record)
            })
            .collect()
    }

    fn skins(&self) -> BTreeMap<String, Skin> {
        self.model
            .skins
            .iter()
            .zip(&self.ids.skins)
            .map(|(skin, id)| {
                // joints without a joint name are referred to by node ID
                let joint_names = skin
                    .joints
                    .iter()
                    .filter_map(|&joint| {
                        let node = self.model.get_node(joint)?;
                        node.joint_name.clone().or_else(|| lookup(&self.ids.nodes, joint))
                    })
                    .collect();
                let record = Skin {
                    name: skin.name.clone(),
                    bind_shape_matrix: skin.bind_shape_matrix,
                    inverse_bind_matrices: skin.inverse_bind_matrices.and_then(|a| self.accessor_id(a)),
                    joint_names,
                };
                (id.clone(), record)
            })
            .collect()
    }

    fn animations(&self) -> BTreeMap<String, Animation> {
        self.model
            .animations
            .iter()
            .zip(&self.ids.animations)
            .map(|(animation, id)| {
                let mut record = Animation {
                    name: animation.name.clone(),
                    channels: Vec::new(),
                    parameters: BTreeMap::new(),
                    samplers: BTreeMap::new(),
                };
                for (index, channel) in animation.channels.iter().enumerate() {
                    let (Some(input), Some(output), Some(node)) = (
                        self.accessor_id(channel.sampler.input),
                        self.accessor_id(channel.sampler.output),
                        channel.node.and_then(|n| lookup(&self.ids.nodes, n)),
                    ) else {
                        continue;
                    };
                    let sampler = format!("{}_sampler_{}", id, index);
                    let input_name = format!("input_{}", index);
                    let output_name = format!("{}_{}", channel.path.as_str(), index);
                    record.parameters.insert(input_name.clone(), input);
                    record.parameters.insert(output_name.clone(), output);
                    record.samplers.insert(
                        sampler.clone(),
                        AnimationSampler {
                            input: input_name,
                            interpolation: channel.sampler.interpolation.as_str().to_string(),
                            output: output_name,
                        },
                    );
                    record.channels.push(Channel {
                        sampler,
                        target: ChannelTarget {
                            id: node,
                            path: channel.path.as_str().to_string(),
                        },
                    });
                }
                (id.clone(), record)
            })
            .collect()
    }

    fn cameras(&self) -> BTreeMap<String, Camera> {
        self.model
            .cameras
            .iter()
            .zip(&self.ids.cameras)
            .map(|(camera, id)| {
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
                let record = Camera {
                    name: camera.name.clone(),
                    camera_type: camera.projection.type_name().to_string(),
                    perspective,
                    orthographic,
                };
                (id.clone(), record)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gltfkit_core::{ComponentType, ElementType, SchemaVersion};
    use gltfkit_model::*;
    use gltfkit_structure::GltfModelStructures;

    fn legacy_model() -> GltfModel {
        let mut model = GltfModel::new(SchemaVersion::Legacy);
        let positions = model.add_accessor(AccessorModel::from_elements(
            ComponentType::Float,
            ElementType::Vec3,
            &[[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        ));
        let vertex = model.add_shader(ShaderModel {
            name: Some("vs".into()),
            shader_type: ShaderType::Vertex,
            uri: Some("vs.glsl".into()),
        });
        let fragment = model.add_shader(ShaderModel {
            name: Some("fs".into()),
            shader_type: ShaderType::Fragment,
            uri: Some("fs.glsl".into()),
        });
        let program = model.add_program(ProgramModel {
            name: None,
            vertex_shader: Some(vertex),
            fragment_shader: Some(fragment),
            attributes: vec!["a_position".into()],
        });
        let technique = model.add_technique(TechniqueModel {
            name: Some("plain".into()),
            program: Some(program),
            parameters: BTreeMap::new(),
            attributes: BTreeMap::from([("a_position".to_string(), "position".to_string())]),
            uniforms: BTreeMap::new(),
            enabled_states: vec![2929],
        });
        let material = model.add_material(MaterialModel::technique(
            "flat",
            TechniqueMaterial {
                technique: Some(technique),
                values: BTreeMap::from([("shininess".to_string(), MaterialValue::Scalar(8.0))]),
            },
        ));
        let mesh = model.add_mesh(MeshModel::new("triangle").with_primitive(
            PrimitiveModel::new()
                .with_attribute("POSITION", positions)
                .with_material(material),
        ));
        let joint = model.add_node(NodeModel {
            joint_name: Some("hip".into()),
            ..NodeModel::new("joint")
        });
        let unnamed = model.add_node(NodeModel::default());
        model.add_skin(SkinModel {
            joints: vec![joint, unnamed],
            ..Default::default()
        });
        model.add_node(NodeModel::new("joint").with_mesh(mesh).with_child(joint));
        model
    }

    fn create() -> Gltf {
        let mut structures = GltfModelStructures::new();
        structures.prepare(&legacy_model());
        let packed = structures.pack_default().unwrap();
        GltfCreatorV1::create(&packed.model, &packed.structure)
    }

    #[test]
    fn test_ids_from_names() {
        let gltf = create();

        assert!(gltf.nodes.contains_key("joint"));
        assert!(gltf.nodes.contains_key("node"));
        assert!(gltf.nodes.contains_key("joint_0"));
        assert_eq!(gltf.nodes["joint_0"].children, vec!["joint".to_string()]);
        assert_eq!(gltf.nodes["joint_0"].meshes, vec!["triangle".to_string()]);
    }

    #[test]
    fn test_packed_ids_from_structure() {
        let gltf = create();

        let primitive = &gltf.meshes["triangle"].primitives[0];
        assert_eq!(primitive.attributes["POSITION"], "position");
        assert_eq!(primitive.material.as_deref(), Some("flat"));
        assert_eq!(gltf.accessors["position"].buffer_view, "attributes_view");
        assert_eq!(gltf.accessors["position"].byte_stride, 12);
        assert_eq!(gltf.buffer_views["attributes_view"].buffer, "buffer");
        assert_eq!(gltf.buffers["buffer"].buffer_type, "arraybuffer");
    }

    #[test]
    fn test_legacy_cross_references() {
        let gltf = create();

        assert_eq!(gltf.materials["flat"].technique.as_deref(), Some("plain"));
        assert_eq!(gltf.materials["flat"].values["shininess"], Value::from(8.0));
        assert_eq!(gltf.techniques["plain"].program, "program");
        assert_eq!(gltf.programs["program"].vertex_shader, "vs");
        assert_eq!(gltf.programs["program"].fragment_shader, "fs");
        assert_eq!(gltf.shaders["vs"].shader_type, 35633);
        assert_eq!(gltf.techniques["plain"].states.enable, vec![2929]);
    }

    #[test]
    fn test_skin_joint_names() {
        let gltf = create();

        assert_eq!(gltf.skins["skin"].joint_names, vec!["hip".to_string(), "node".to_string()]);
        assert_eq!(gltf.asset.version, "1.0");
    }
}
