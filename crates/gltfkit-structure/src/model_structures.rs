//! Graph-consistent copy of a model followed by a packing run
//!
//! [`GltfModelStructures::prepare`] allocates one target element for every
//! source element, recording the pairs in [`ElementMap`]s, and then rewires
//! every reference of the copy through those maps. Nothing is copied
//! recursively, so the shape of the source graph (including cycles between
//! nodes, which a valid asset never has) cannot make the copy loop.

use std::collections::BTreeMap;

use gltfkit_core::logging::instrument_pass;
use gltfkit_core::{Error, Result, ResultExt, SchemaVersion};
use gltfkit_model::*;
use tracing::{debug, warn};

use crate::strategy::{BufferBuilderConfig, PackingPreset, Strategies};
use crate::structure::BufferStructure;

/// Source handle to target handle for one element kind
#[derive(Debug, Clone)]
pub struct ElementMap<I> {
    targets: BTreeMap<I, I>,
}

impl<I> Default for ElementMap<I> {
    fn default() -> Self {
        Self {
            targets: BTreeMap::new(),
        }
    }
}

impl<I: ElementId> ElementMap<I> {
    fn insert(&mut self, source: I, target: I) {
        self.targets.insert(source, target);
    }

    pub fn get(&self, source: I) -> Option<I> {
        self.targets.get(&source).copied()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, I)> + '_ {
        self.targets.iter().map(|(&s, &t)| (s, t))
    }

    /// Translate a reference, warning if it points nowhere
    fn remap(&self, source: I) -> Option<I> {
        let target = self.get(source);
        if target.is_none() {
            warn!(kind = I::KIND, index = source.index(), "Dropping reference to missing element");
        }
        target
    }

    fn remap_option(&self, slot: &mut Option<I>) {
        *slot = slot.and_then(|source| self.remap(source));
    }

    fn remap_vec(&self, ids: &mut Vec<I>) {
        *ids = ids.iter().filter_map(|&source| self.remap(source)).collect();
    }
}

/// All source to target maps of one graph copy
#[derive(Debug, Clone, Default)]
pub struct ElementMaps {
    pub accessors: ElementMap<AccessorId>,
    pub animations: ElementMap<AnimationId>,
    pub cameras: ElementMap<CameraId>,
    pub images: ElementMap<ImageId>,
    pub materials: ElementMap<MaterialId>,
    pub meshes: ElementMap<MeshId>,
    pub nodes: ElementMap<NodeId>,
    pub scenes: ElementMap<SceneId>,
    pub skins: ElementMap<SkinId>,
    pub textures: ElementMap<TextureId>,
    pub shaders: ElementMap<ShaderId>,
    pub programs: ElementMap<ProgramId>,
    pub techniques: ElementMap<TechniqueId>,
}

/// Element kinds that are copied by [`GltfModelStructures::prepare`]
pub trait MappedElement: ElementId {
    fn element_map(maps: &ElementMaps) -> &ElementMap<Self>;
}

macro_rules! mapped_element {
    ($($id:ident => $field:ident),* $(,)?) => {
        $(
            impl MappedElement for $id {
                fn element_map(maps: &ElementMaps) -> &ElementMap<Self> {
                    &maps.$field
                }
            }
        )*
    };
}

mapped_element!(
    AccessorId => accessors,
    AnimationId => animations,
    CameraId => cameras,
    ImageId => images,
    MaterialId => materials,
    MeshId => meshes,
    NodeId => nodes,
    SceneId => scenes,
    SkinId => skins,
    TextureId => textures,
    ShaderId => shaders,
    ProgramId => programs,
    TechniqueId => techniques,
);

/// A restructured model and the layout of its buffers
#[derive(Debug, Clone)]
pub struct PackedModel {
    pub model: GltfModel,
    pub structure: BufferStructure,
}

/// Copies a model and packs the copy into fresh buffers
#[derive(Debug, Default)]
pub struct GltfModelStructures {
    target: Option<GltfModel>,
    maps: ElementMaps,
}

impl GltfModelStructures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the target graph for `source`
    ///
    /// Replaces the result of any earlier `prepare` call. Buffers and buffer
    /// views are not copied, packing creates new ones.
    pub fn prepare(&mut self, source: &GltfModel) {
        instrument_pass("prepare", || {
            let (target, maps) = copy_model(source);
            debug!(
                accessors = target.accessors.len(),
                nodes = target.nodes.len(),
                meshes = target.meshes.len(),
                "Prepared target model"
            );
            self.target = Some(target);
            self.maps = maps;
        });
    }

    pub fn is_prepared(&self) -> bool {
        self.target.is_some()
    }

    /// The prepared, not yet packed target graph
    pub fn target(&self) -> Option<&GltfModel> {
        self.target.as_ref()
    }

    pub fn element_maps(&self) -> Option<&ElementMaps> {
        self.target.as_ref().map(|_| &self.maps)
    }

    /// The target element created for `source`
    pub fn source_to_target<I: MappedElement>(&self, source: I) -> Option<I> {
        self.element_maps()
            .and_then(|maps| I::element_map(maps).get(source))
    }

    /// Pack the prepared target graph
    ///
    /// Consumes the prepared state; a further `pack` needs a new `prepare`.
    pub fn pack(&mut self, config: BufferBuilderConfig) -> Result<PackedModel> {
        let mut model = self.target.take().ok_or(Error::NotPrepared)?;
        self.maps = ElementMaps::default();

        instrument_pass("pack", move || {
            let mut strategy = Strategies::create(config);
            strategy.process(&mut model).context("packing target model")?;
            let structure = strategy.into_buffer_structure()?;
            structure.apply_to(&mut model);
            Ok(PackedModel { model, structure })
        })
    }

    pub fn pack_default(&mut self) -> Result<PackedModel> {
        self.pack(PackingPreset::Default.config())
    }

    pub fn pack_binary(&mut self) -> Result<PackedModel> {
        self.pack(PackingPreset::Binary.config())
    }

    pub fn pack_custom(&mut self) -> Result<PackedModel> {
        self.pack(PackingPreset::Custom.config())
    }
}

// ==================== Graph Copy ====================

fn copy_arena<I: ElementId, T: Clone>(source: &[T], target: &mut Vec<T>) -> ElementMap<I> {
    let mut map = ElementMap::default();
    for (index, element) in source.iter().enumerate() {
        target.push(element.clone());
        map.insert(I::from_index(index), I::from_index(target.len() - 1));
    }
    map
}

fn copy_model(source: &GltfModel) -> (GltfModel, ElementMaps) {
    let mut target = GltfModel::new(source.schema);
    target.asset = source.asset.clone();

    let mut maps = ElementMaps {
        accessors: copy_arena(&source.accessors, &mut target.accessors),
        animations: copy_arena(&source.animations, &mut target.animations),
        cameras: copy_arena(&source.cameras, &mut target.cameras),
        images: copy_arena(&source.images, &mut target.images),
        materials: copy_arena(&source.materials, &mut target.materials),
        meshes: copy_arena(&source.meshes, &mut target.meshes),
        nodes: copy_arena(&source.nodes, &mut target.nodes),
        scenes: copy_arena(&source.scenes, &mut target.scenes),
        skins: copy_arena(&source.skins, &mut target.skins),
        textures: copy_arena(&source.textures, &mut target.textures),
        ..Default::default()
    };
    if source.schema == SchemaVersion::Legacy {
        maps.shaders = copy_arena(&source.shaders, &mut target.shaders);
        maps.programs = copy_arena(&source.programs, &mut target.programs);
        maps.techniques = copy_arena(&source.techniques, &mut target.techniques);
    }

    for accessor in &mut target.accessors {
        accessor.buffer_view = None;
        accessor.byte_offset = 0;
    }
    for image in &mut target.images {
        image.buffer_view = None;
    }

    rewire(&mut target, &maps);
    (target, maps)
}

/// Point every reference of the copied elements at the copies
fn rewire(target: &mut GltfModel, maps: &ElementMaps) {
    maps.scenes.remap_option(&mut target.default_scene);

    for scene in &mut target.scenes {
        maps.nodes.remap_vec(&mut scene.nodes);
    }

    for node in &mut target.nodes {
        maps.nodes.remap_vec(&mut node.children);
        maps.meshes.remap_vec(&mut node.meshes);
        maps.skins.remap_option(&mut node.skin);
        maps.cameras.remap_option(&mut node.camera);
    }

    for mesh in &mut target.meshes {
        for primitive in &mut mesh.primitives {
            remap_attributes(&maps.accessors, &mut primitive.attributes);
            maps.accessors.remap_option(&mut primitive.indices);
            maps.materials.remap_option(&mut primitive.material);
            for morph_target in &mut primitive.targets {
                remap_attributes(&maps.accessors, morph_target);
            }
        }
    }

    for skin in &mut target.skins {
        maps.accessors.remap_option(&mut skin.inverse_bind_matrices);
        maps.nodes.remap_vec(&mut skin.joints);
        maps.nodes.remap_option(&mut skin.skeleton);
    }

    for animation in &mut target.animations {
        animation.channels.retain_mut(|channel| {
            maps.nodes.remap_option(&mut channel.node);
            let input = maps.accessors.remap(channel.sampler.input);
            let output = maps.accessors.remap(channel.sampler.output);
            match (input, output) {
                (Some(input), Some(output)) => {
                    channel.sampler.input = input;
                    channel.sampler.output = output;
                    true
                }
                _ => false,
            }
        });
    }

    for texture in &mut target.textures {
        maps.images.remap_option(&mut texture.image);
    }

    for material in &mut target.materials {
        match &mut material.definition {
            MaterialDefinition::Pbr(pbr) => {
                for slot in pbr.texture_refs_mut() {
                    *slot = slot.and_then(|r| {
                        maps.textures
                            .remap(r.texture)
                            .map(|texture| TextureRef { texture, ..r })
                    });
                }
            }
            MaterialDefinition::Technique(technique) => {
                maps.techniques.remap_option(&mut technique.technique);
                technique
                    .values
                    .retain(|_, value| remap_value(&maps.textures, value));
            }
        }
    }

    for program in &mut target.programs {
        maps.shaders.remap_option(&mut program.vertex_shader);
        maps.shaders.remap_option(&mut program.fragment_shader);
    }

    for technique in &mut target.techniques {
        maps.programs.remap_option(&mut technique.program);
        for parameter in technique.parameters.values_mut() {
            maps.nodes.remap_option(&mut parameter.node);
            if let Some(value) = &mut parameter.value {
                if !remap_value(&maps.textures, value) {
                    parameter.value = None;
                }
            }
        }
    }
}

fn remap_attributes(map: &ElementMap<AccessorId>, attributes: &mut AttributeMap) {
    attributes.retain(|_, accessor| match map.remap(*accessor) {
        Some(target) => {
            *accessor = target;
            true
        }
        None => false,
    });
}

/// Returns `false` if the value names a texture that was not copied
fn remap_value(map: &ElementMap<TextureId>, value: &mut MaterialValue) -> bool {
    match value {
        MaterialValue::Texture(texture) => match map.remap(*texture) {
            Some(target) => {
                *texture = target;
                true
            }
            None => false,
        },
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gltfkit_core::{ComponentType, ElementType};

    fn sample_model() -> GltfModel {
        let mut model = GltfModel::new(SchemaVersion::Current);
        let positions = model.add_accessor(AccessorModel::from_elements(
            ComponentType::Float,
            ElementType::Vec3,
            &[[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        ));
        let image = model.add_image(ImageModel::from_uri("albedo.png"));
        let texture = model.add_texture(TextureModel {
            image: Some(image),
            ..Default::default()
        });
        let material = model.add_material(MaterialModel::pbr(
            "painted",
            PbrMaterial {
                base_color_texture: Some(TextureRef::new(texture)),
                ..Default::default()
            },
        ));
        let mesh = model.add_mesh(MeshModel::new("triangle").with_primitive(
            PrimitiveModel::new()
                .with_attribute("POSITION", positions)
                .with_material(material),
        ));
        let root = model.add_node(NodeModel::new("root").with_mesh(mesh));
        let scene = model.add_scene(SceneModel {
            name: None,
            nodes: vec![root],
        });
        model.default_scene = Some(scene);
        model
    }

    #[test]
    fn test_pack_without_prepare() {
        let mut structures = GltfModelStructures::new();
        assert!(matches!(structures.pack_default(), Err(Error::NotPrepared)));
        assert_eq!(structures.source_to_target(NodeId(0)), None);
    }

    #[test]
    fn test_prepare_maps_every_element() {
        let source = sample_model();
        let mut structures = GltfModelStructures::new();
        structures.prepare(&source);

        assert_eq!(structures.source_to_target(AccessorId(0)), Some(AccessorId(0)));
        assert_eq!(structures.source_to_target(MaterialId(0)), Some(MaterialId(0)));
        assert_eq!(structures.source_to_target(NodeId(1)), None);

        let target = structures.target().unwrap();
        assert_eq!(target.accessors[0].data, source.accessors[0].data);
        assert_eq!(target.materials, source.materials);
        assert_eq!(target.default_scene, Some(SceneId(0)));
    }

    #[test]
    fn test_pack_consumes_prepared_state() {
        let source = sample_model();
        let mut structures = GltfModelStructures::new();
        structures.prepare(&source);

        let packed = structures.pack_default().unwrap();
        assert_eq!(packed.model.buffers.len(), 1);
        assert_eq!(packed.model.accessors[0].buffer_view, Some(BufferViewId(0)));
        assert!(!structures.is_prepared());
        assert!(matches!(structures.pack_default(), Err(Error::NotPrepared)));

        // the source is never touched
        assert!(source.buffers.is_empty());
        assert_eq!(source.accessors[0].buffer_view, None);
    }

    #[test]
    fn test_dangling_references_dropped() {
        let mut source = sample_model();
        source.nodes[0].children.push(NodeId(42));
        source.meshes[0].primitives[0]
            .attributes
            .insert("NORMAL".into(), AccessorId(7));
        if let MaterialDefinition::Pbr(pbr) = &mut source.materials[0].definition {
            pbr.normal_texture = Some(TextureRef::new(TextureId(3)));
        }

        let mut structures = GltfModelStructures::new();
        structures.prepare(&source);
        let target = structures.target().unwrap();

        assert!(target.nodes[0].children.is_empty());
        assert!(!target.meshes[0].primitives[0].attributes.contains_key("NORMAL"));
        let MaterialDefinition::Pbr(pbr) = &target.materials[0].definition else {
            panic!("material kind changed");
        };
        assert_eq!(pbr.normal_texture, None);
        assert!(pbr.base_color_texture.is_some());
    }

    #[test]
    fn test_cyclic_children_copied_verbatim() {
        let mut source = GltfModel::new(SchemaVersion::Current);
        let a = source.add_node(NodeModel::new("a"));
        let b = source.add_node(NodeModel::new("b").with_child(a));
        source[a].children.push(b);

        let mut structures = GltfModelStructures::new();
        structures.prepare(&source);
        let target = structures.target().unwrap();

        assert_eq!(target[a].children, vec![b]);
        assert_eq!(target[b].children, vec![a]);

        let packed = structures.pack_default().unwrap();
        assert!(packed.structure.buffers().is_empty());
    }

    #[test]
    fn test_legacy_elements_only_for_legacy_schema() {
        let mut source = GltfModel::new(SchemaVersion::Current);
        let vertex = source.add_shader(ShaderModel {
            name: None,
            shader_type: ShaderType::Vertex,
            uri: Some("a.vert".into()),
        });
        let fragment = source.add_shader(ShaderModel {
            name: None,
            shader_type: ShaderType::Fragment,
            uri: Some("a.frag".into()),
        });
        source.add_program(ProgramModel {
            name: None,
            vertex_shader: Some(vertex),
            fragment_shader: Some(fragment),
            attributes: vec!["a_position".into()],
        });

        let mut structures = GltfModelStructures::new();
        structures.prepare(&source);
        assert!(structures.target().unwrap().shaders.is_empty());

        source.schema = SchemaVersion::Legacy;
        structures.prepare(&source);
        let target = structures.target().unwrap();
        assert_eq!(target.shaders.len(), 2);
        assert_eq!(target.programs[0].fragment_shader, Some(fragment));
        assert_eq!(structures.source_to_target(ProgramId(0)), Some(ProgramId(0)));
    }

    #[test]
    fn test_dangling_shader_and_program_dropped() {
        let mut source = GltfModel::new(SchemaVersion::Legacy);
        let fragment = source.add_shader(ShaderModel {
            name: None,
            shader_type: ShaderType::Fragment,
            uri: Some("a.frag".into()),
        });
        source.add_program(ProgramModel {
            name: None,
            vertex_shader: Some(ShaderId(7)),
            fragment_shader: Some(fragment),
            attributes: Vec::new(),
        });
        source.add_technique(TechniqueModel {
            name: None,
            program: Some(ProgramId(4)),
            parameters: BTreeMap::new(),
            attributes: BTreeMap::new(),
            uniforms: BTreeMap::new(),
            enabled_states: Vec::new(),
        });

        let mut structures = GltfModelStructures::new();
        structures.prepare(&source);
        let target = structures.target().unwrap();

        // no reference may point outside the target graph
        assert_eq!(target.programs[0].vertex_shader, None);
        assert_eq!(target.programs[0].fragment_shader, Some(fragment));
        assert_eq!(target.techniques[0].program, None);
    }

    #[test]
    fn test_channel_with_missing_sampler_accessor_dropped() {
        let mut source = sample_model();
        source.add_animation(AnimationModel {
            name: None,
            channels: vec![ChannelModel {
                sampler: AnimationSamplerModel {
                    input: AccessorId(0),
                    output: AccessorId(5),
                    interpolation: Interpolation::Step,
                },
                node: Some(NodeId(0)),
                path: TargetPath::Scale,
            }],
        });

        let mut structures = GltfModelStructures::new();
        structures.prepare(&source);
        assert!(structures.target().unwrap().animations[0].channels.is_empty());
    }
}
