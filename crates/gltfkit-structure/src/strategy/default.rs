use std::collections::{BTreeMap, HashSet};

use gltfkit_core::{BufferViewTarget, Error, Result};
use gltfkit_model::{AccessorId, BufferViewId, GltfModel, ImageId, PrimitiveModel};
use tracing::{info, warn};

use super::{BufferBuilderConfig, BufferBuilderStrategy};
use crate::builder::BufferStructureBuilder;
use crate::structure::BufferStructure;
use crate::uri::{image_mime_type, UriGenerator};

/// The configurable bundling strategy
///
/// Categories are visited in a fixed order: meshes, animations, skins,
/// images and finally accessors nothing else referenced. Each distinct
/// accessor is packed exactly once, at its first use.
#[derive(Debug, Default)]
pub struct DefaultBufferBuilderStrategy {
    config: BufferBuilderConfig,
    structure: Option<BufferStructure>,
    image_views: BTreeMap<ImageId, BufferViewId>,
}

impl DefaultBufferBuilderStrategy {
    pub fn new(config: BufferBuilderConfig) -> Self {
        Self {
            config,
            structure: None,
            image_views: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &BufferBuilderConfig {
        &self.config
    }

    /// The buffer view an image was embedded into by the last run
    pub fn image_buffer_view(&self, image: ImageId) -> Option<BufferViewId> {
        self.image_views.get(&image).copied()
    }
}

impl BufferBuilderStrategy for DefaultBufferBuilderStrategy {
    fn process(&mut self, model: &mut GltfModel) -> Result<()> {
        self.structure = None;
        self.image_views.clear();

        let mut pass = PackingPass::new(self.config, model);
        pass.process_meshes(model)?;
        pass.process_animations(model)?;
        pass.process_skins(model)?;
        pass.process_images(model)?;
        pass.process_leftover_accessors(model)?;
        pass.commit_buffer()?;

        let PackingPass {
            builder,
            mut uris,
            image_views,
            ..
        } = pass;
        let structure = builder.build()?;
        resolve_images(model, &image_views, &mut uris);

        info!(
            accessors = structure.accessors().len(),
            buffer_views = structure.buffer_views().len(),
            buffers = structure.buffers().len(),
            "Packed buffer structure"
        );

        self.structure = Some(structure);
        self.image_views = image_views;
        Ok(())
    }

    fn buffer_structure(&self) -> Result<&BufferStructure> {
        self.structure.as_ref().ok_or(Error::NoInputProcessed)
    }

    fn into_buffer_structure(self: Box<Self>) -> Result<BufferStructure> {
        self.structure.ok_or(Error::NoInputProcessed)
    }
}

/// State of one `process` call
struct PackingPass {
    config: BufferBuilderConfig,
    builder: BufferStructureBuilder,
    processed: HashSet<AccessorId>,
    uris: UriGenerator,
    image_views: BTreeMap<ImageId, BufferViewId>,
}

impl PackingPass {
    fn new(config: BufferBuilderConfig, model: &GltfModel) -> Self {
        Self {
            config,
            builder: BufferStructureBuilder::new(),
            processed: HashSet::new(),
            uris: UriGenerator::new(model.existing_uris()),
            image_views: BTreeMap::new(),
        }
    }

    /// Close all pending buffer views into a buffer, if there are any
    fn commit_buffer(&mut self) -> Result<()> {
        if self.builder.has_pending_buffer_views() {
            let uri = self.uris.buffer_uri();
            self.builder.create_buffer("buffer", Some(uri))?;
        }
        Ok(())
    }

    fn commit_buffer_if(&mut self, flag: bool) -> Result<()> {
        if flag {
            self.commit_buffer()?;
        }
        Ok(())
    }

    /// Queue an accessor unless it was already packed
    ///
    /// Returns whether the accessor is now pending.
    fn add(&mut self, model: &GltfModel, id_prefix: &str, accessor: AccessorId) -> Result<bool> {
        if self.processed.contains(&accessor) {
            return Ok(false);
        }
        let Some(data) = model.get_accessor(accessor) else {
            warn!(%accessor, "Skipping reference to missing accessor");
            return Ok(false);
        };
        self.builder.add_accessor(id_prefix, accessor, data)?;
        self.processed.insert(accessor);
        Ok(true)
    }

    fn close_view(&mut self, id_prefix: &str, target: Option<BufferViewTarget>) -> Result<()> {
        if self.builder.has_pending_accessors() {
            self.builder.create_buffer_view(id_prefix, target)?;
        }
        Ok(())
    }

    // ==================== Categories ====================

    fn process_meshes(&mut self, model: &GltfModel) -> Result<()> {
        self.commit_buffer_if(self.config.buffer_for_meshes)?;
        for mesh in &model.meshes {
            self.commit_buffer_if(self.config.buffer_per_mesh)?;
            for primitive in &mesh.primitives {
                self.commit_buffer_if(self.config.buffer_per_mesh_primitive)?;
                self.process_primitive(model, primitive)?;
                self.commit_buffer_if(self.config.buffer_per_mesh_primitive)?;
            }
            self.commit_buffer_if(self.config.buffer_per_mesh)?;
        }
        self.commit_buffer_if(self.config.buffer_for_meshes)
    }

    fn process_primitive(&mut self, model: &GltfModel, primitive: &PrimitiveModel) -> Result<()> {
        if let Some(indices) = primitive.indices {
            if self.add(model, "indices", indices)? {
                self.builder.create_element_array_buffer_view("indices_view")?;
            }
        }

        for (semantic, &accessor) in &primitive.attributes {
            self.add(model, &semantic.to_lowercase(), accessor)?;
        }
        self.close_view("attributes_view", Some(BufferViewTarget::ArrayBuffer))?;

        for target in &primitive.targets {
            for (semantic, &accessor) in target {
                let prefix = format!("morph_{}", semantic.to_lowercase());
                self.add(model, &prefix, accessor)?;
            }
            self.close_view("morph_view", Some(BufferViewTarget::ArrayBuffer))?;
        }
        Ok(())
    }

    fn process_animations(&mut self, model: &GltfModel) -> Result<()> {
        self.commit_buffer_if(self.config.buffer_for_animations)?;
        for animation in &model.animations {
            self.commit_buffer_if(self.config.buffer_per_animation)?;
            for channel in &animation.channels {
                self.add(model, "animation_input", channel.sampler.input)?;
                self.add(model, "animation_output", channel.sampler.output)?;
            }
            self.close_view("animation_view", None)?;
            self.commit_buffer_if(self.config.buffer_per_animation)?;
        }
        self.commit_buffer_if(self.config.buffer_for_animations)
    }

    fn process_skins(&mut self, model: &GltfModel) -> Result<()> {
        self.commit_buffer_if(self.config.buffer_for_skins)?;
        for skin in &model.skins {
            self.commit_buffer_if(self.config.buffer_per_skin)?;
            if let Some(matrices) = skin.inverse_bind_matrices {
                if self.add(model, "inverse_bind_matrices", matrices)? {
                    self.builder.create_plain_buffer_view("skin_view")?;
                }
            }
            self.commit_buffer_if(self.config.buffer_per_skin)?;
        }
        self.commit_buffer_if(self.config.buffer_for_skins)
    }

    fn process_images(&mut self, model: &GltfModel) -> Result<()> {
        self.commit_buffer_if(self.config.buffer_for_images)?;
        for (index, image) in model.images.iter().enumerate() {
            self.commit_buffer_if(self.config.buffer_per_image)?;
            if self.config.images_in_buffer_views && !image.data.is_empty() {
                let view = self.builder.create_image_buffer_view("image_view", &image.data)?;
                self.image_views.insert(ImageId(index), view);
            }
            self.commit_buffer_if(self.config.buffer_per_image)?;
        }
        self.commit_buffer_if(self.config.buffer_for_images)
    }

    fn process_leftover_accessors(&mut self, model: &GltfModel) -> Result<()> {
        self.commit_buffer_if(self.config.buffer_for_additional_accessors)?;
        for accessor in model.accessor_ids() {
            if self.add(model, "accessor", accessor)? {
                self.builder.create_plain_buffer_view("accessor_view")?;
            }
        }
        self.commit_buffer_if(self.config.buffer_for_additional_accessors)
    }
}

/// Point every image either at its buffer view or at a URI
fn resolve_images(
    model: &mut GltfModel,
    image_views: &BTreeMap<ImageId, BufferViewId>,
    uris: &mut UriGenerator,
) {
    for (index, image) in model.images.iter_mut().enumerate() {
        match image_views.get(&ImageId(index)) {
            Some(&view) => {
                // embedded images are only identified by their MIME type
                if image.mime_type.is_none() {
                    image.mime_type = Some(image_mime_type(image).to_string());
                }
                image.uri = None;
                image.buffer_view = Some(view);
            }
            None => {
                image.buffer_view = None;
                if image.uri.is_none() {
                    let uri = uris.image_uri(image);
                    image.uri = Some(uri);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gltfkit_core::{ComponentType, ElementType, SchemaVersion};
    use gltfkit_model::{
        AccessorModel, AnimationModel, AnimationSamplerModel, AttributeMap, BufferId, ChannelModel,
        ImageModel, Interpolation, MeshId, MeshModel, NodeId, SkinModel, TargetPath,
    };

    fn vec3s(model: &mut GltfModel, count: usize) -> AccessorId {
        let data = vec![[1.0f32, 2.0, 3.0]; count];
        model.add_accessor(AccessorModel::from_elements(ComponentType::Float, ElementType::Vec3, &data))
    }

    fn triangle(model: &mut GltfModel) -> MeshId {
        let positions = vec3s(model, 3);
        let normals = vec3s(model, 3);
        let indices = model.add_accessor(AccessorModel::from_elements(
            ComponentType::UnsignedShort,
            ElementType::Scalar,
            &[0u16, 1, 2],
        ));
        model.add_mesh(
            MeshModel::new("triangle").with_primitive(
                PrimitiveModel::new()
                    .with_attribute("POSITION", positions)
                    .with_attribute("NORMAL", normals)
                    .with_indices(indices),
            ),
        )
    }

    fn animation(model: &mut GltfModel) {
        let input = model.add_accessor(AccessorModel::from_elements(
            ComponentType::Float,
            ElementType::Scalar,
            &[0.0f32, 1.0],
        ));
        let output = vec3s(model, 2);
        model.add_animation(AnimationModel {
            name: Some("move".into()),
            channels: vec![ChannelModel {
                sampler: AnimationSamplerModel {
                    input,
                    output,
                    interpolation: Interpolation::Linear,
                },
                node: Some(NodeId(0)),
                path: TargetPath::Translation,
            }],
        });
    }

    fn pack(config: BufferBuilderConfig, model: &mut GltfModel) -> BufferStructure {
        let mut strategy = Box::new(DefaultBufferBuilderStrategy::new(config));
        strategy.process(model).unwrap();
        strategy.into_buffer_structure().unwrap()
    }

    #[test]
    fn test_getters_before_process() {
        let strategy = DefaultBufferBuilderStrategy::default();
        assert!(matches!(strategy.buffer_structure(), Err(Error::NoInputProcessed)));

        let boxed: Box<dyn BufferBuilderStrategy> = Box::new(strategy);
        assert!(matches!(boxed.into_buffer_structure(), Err(Error::NoInputProcessed)));
    }

    #[test]
    fn test_single_mesh_layout() {
        let mut model = GltfModel::new(SchemaVersion::Current);
        triangle(&mut model);
        let structure = pack(BufferBuilderConfig::default(), &mut model);

        assert_eq!(structure.buffers().len(), 1);
        assert_eq!(structure.buffer_views().len(), 2);
        assert_eq!(structure.buffer_views()[0].id, "indices_view");
        assert_eq!(structure.buffer_views()[0].target, Some(BufferViewTarget::ElementArrayBuffer));
        assert_eq!(structure.buffer_views()[1].id, "attributes_view");
        assert_eq!(structure.buffer_views()[1].byte_offset, 8);
        assert_eq!(structure.buffer_views()[1].byte_stride, Some(12));

        // attributes are visited in name order
        assert_eq!(structure.accessor_id(AccessorId(1)), Some("normal"));
        assert_eq!(structure.accessor_id(AccessorId(0)), Some("position"));
        assert_eq!(structure.accessor_id(AccessorId(2)), Some("indices"));

        let buffer = structure.buffer(BufferId(0)).unwrap();
        assert_eq!(buffer.uri.as_deref(), Some("buffer0.bin"));
        assert_eq!(buffer.byte_length, 8 + 72);
        assert_eq!(buffer.padding.iter().copied().collect::<Vec<_>>(), vec![6, 7]);
    }

    #[test]
    fn test_shared_accessor_packed_once() {
        let mut model = GltfModel::new(SchemaVersion::Current);
        let positions = vec3s(&mut model, 4);
        let primitive = PrimitiveModel::new().with_attribute("POSITION", positions);
        model.add_mesh(MeshModel::new("a").with_primitive(primitive.clone()));
        model.add_mesh(MeshModel::new("b").with_primitive(primitive));
        let structure = pack(BufferBuilderConfig::default(), &mut model);

        assert_eq!(structure.accessors().len(), 1);
        assert_eq!(structure.buffer_views().len(), 1);
        assert_eq!(structure.accessor_index(positions), Some(0));
    }

    #[test]
    fn test_buffer_per_mesh() {
        let mut model = GltfModel::new(SchemaVersion::Current);
        triangle(&mut model);
        triangle(&mut model);
        let config = BufferBuilderConfig {
            buffer_per_mesh: true,
            ..Default::default()
        };
        let structure = pack(config, &mut model);

        assert_eq!(structure.buffers().len(), 2);
        assert_eq!(structure.buffers()[1].uri.as_deref(), Some("buffer1.bin"));
        assert_eq!(structure.buffers()[1].id, "buffer_0");
        assert_eq!(structure.buffer_views_of(BufferId(1)).map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_buffer_for_animations() {
        let mut model = GltfModel::new(SchemaVersion::Current);
        triangle(&mut model);
        animation(&mut model);

        let single = pack(BufferBuilderConfig::default(), &mut model.clone());
        assert_eq!(single.buffers().len(), 1);

        let config = BufferBuilderConfig {
            buffer_for_animations: true,
            ..Default::default()
        };
        let split = pack(config, &mut model);
        assert_eq!(split.buffers().len(), 2);
        let animation_views = split.buffer_views_of(BufferId(1)).unwrap();
        assert_eq!(animation_views.len(), 1);
        assert_eq!(split.buffer_view_id(animation_views[0]), Some("animation_view"));
        assert_eq!(split.accessor_id(AccessorId(3)), Some("animation_input"));
        assert_eq!(split.accessor_id(AccessorId(4)), Some("animation_output"));
    }

    #[test]
    fn test_morph_targets_get_own_view() {
        let mut model = GltfModel::new(SchemaVersion::Current);
        let positions = vec3s(&mut model, 3);
        let displacement = vec3s(&mut model, 3);
        let mut target = AttributeMap::new();
        target.insert("POSITION".into(), displacement);
        model.add_mesh(MeshModel::new("morph").with_primitive(
            PrimitiveModel::new()
                .with_attribute("POSITION", positions)
                .with_target(target),
        ));
        let structure = pack(BufferBuilderConfig::default(), &mut model);

        assert_eq!(structure.buffer_views().len(), 2);
        assert_eq!(structure.buffer_views()[1].id, "morph_view");
        assert_eq!(structure.accessor_id(displacement), Some("morph_position"));
    }

    #[test]
    fn test_skin_and_leftover_accessors() {
        let mut model = GltfModel::new(SchemaVersion::Current);
        let matrices = model.add_accessor(AccessorModel::new(ComponentType::Float, ElementType::Mat4, 2));
        let unused = vec3s(&mut model, 1);
        model.add_skin(SkinModel {
            inverse_bind_matrices: Some(matrices),
            ..Default::default()
        });
        let structure = pack(BufferBuilderConfig::default(), &mut model);

        assert_eq!(structure.accessor_id(matrices), Some("inverse_bind_matrices"));
        assert_eq!(structure.accessor_id(unused), Some("accessor"));
        assert_eq!(structure.buffer_views()[0].id, "skin_view");
        assert_eq!(structure.buffer_views()[1].id, "accessor_view");
        assert_eq!(structure.buffer_views()[1].byte_offset, 128);
    }

    #[test]
    fn test_missing_accessor_reference_skipped() {
        let mut model = GltfModel::new(SchemaVersion::Current);
        model.add_mesh(
            MeshModel::new("broken").with_primitive(PrimitiveModel::new().with_attribute("POSITION", AccessorId(9))),
        );
        let structure = pack(BufferBuilderConfig::default(), &mut model);

        assert!(structure.accessors().is_empty());
        assert!(structure.buffers().is_empty());
    }

    #[test]
    fn test_images_embedded_or_referenced() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3];
        let mut model = GltfModel::new(SchemaVersion::Current);
        let embedded = model.add_image(ImageModel::from_data(png.clone(), None));
        let external = model.add_image(ImageModel::from_uri("existing.jpg"));

        let mut referenced = model.clone();
        pack(BufferBuilderConfig::default(), &mut referenced);
        assert_eq!(referenced[embedded].uri.as_deref(), Some("image0.png"));
        assert_eq!(referenced[embedded].buffer_view, None);
        assert_eq!(referenced[external].uri.as_deref(), Some("existing.jpg"));

        let config = BufferBuilderConfig {
            images_in_buffer_views: true,
            ..Default::default()
        };
        let mut strategy = DefaultBufferBuilderStrategy::new(config);
        strategy.process(&mut model).unwrap();
        let view = strategy.image_buffer_view(embedded).unwrap();
        let structure = strategy.buffer_structure().unwrap();

        assert_eq!(model[embedded].uri, None);
        assert_eq!(model[embedded].buffer_view, Some(view));
        assert_eq!(structure.buffer_view(view).unwrap().byte_length, png.len());
        assert!(structure.buffer_view(view).unwrap().is_image);
        // nothing to embed for a URI-only image
        assert_eq!(strategy.image_buffer_view(external), None);
        assert_eq!(model[external].uri.as_deref(), Some("existing.jpg"));
    }

    /// One mesh, one animation, two skins, two images and two leftover
    /// accessors: nine views in category order 2, 1, 2, 2, 2
    fn every_category() -> GltfModel {
        let mut model = GltfModel::new(SchemaVersion::Current);
        triangle(&mut model);
        animation(&mut model);
        for _ in 0..2 {
            let matrices = model.add_accessor(AccessorModel::new(ComponentType::Float, ElementType::Mat4, 1));
            model.add_skin(SkinModel {
                inverse_bind_matrices: Some(matrices),
                ..Default::default()
            });
        }
        for _ in 0..2 {
            model.add_image(ImageModel::from_data(vec![0xff, 0xd8, 0xff, 0xe0], None));
        }
        vec3s(&mut model, 1);
        vec3s(&mut model, 2);
        model
    }

    fn views_per_buffer(config: BufferBuilderConfig) -> Vec<usize> {
        let config = BufferBuilderConfig {
            images_in_buffer_views: true,
            ..config
        };
        let structure = pack(config, &mut every_category());
        structure.buffers().iter().map(|b| b.buffer_views.len()).collect()
    }

    #[test]
    fn test_no_flags_single_buffer() {
        assert_eq!(views_per_buffer(BufferBuilderConfig::default()), vec![9]);
    }

    #[test]
    fn test_buffer_for_meshes() {
        let config = BufferBuilderConfig {
            buffer_for_meshes: true,
            ..Default::default()
        };
        assert_eq!(views_per_buffer(config), vec![2, 7]);
    }

    #[test]
    fn test_buffer_per_animation() {
        let config = BufferBuilderConfig {
            buffer_per_animation: true,
            ..Default::default()
        };
        assert_eq!(views_per_buffer(config), vec![2, 1, 6]);
    }

    #[test]
    fn test_buffer_per_skin() {
        let config = BufferBuilderConfig {
            buffer_per_skin: true,
            ..Default::default()
        };
        assert_eq!(views_per_buffer(config), vec![3, 1, 1, 4]);
    }

    #[test]
    fn test_buffer_for_skins() {
        let config = BufferBuilderConfig {
            buffer_for_skins: true,
            ..Default::default()
        };
        assert_eq!(views_per_buffer(config), vec![3, 2, 4]);
    }

    #[test]
    fn test_buffer_per_image() {
        let config = BufferBuilderConfig {
            buffer_per_image: true,
            ..Default::default()
        };
        assert_eq!(views_per_buffer(config), vec![5, 1, 1, 2]);
    }

    #[test]
    fn test_buffer_for_images() {
        let config = BufferBuilderConfig {
            buffer_for_images: true,
            ..Default::default()
        };
        assert_eq!(views_per_buffer(config), vec![5, 2, 2]);
    }

    #[test]
    fn test_buffer_for_additional_accessors() {
        let config = BufferBuilderConfig {
            buffer_for_additional_accessors: true,
            ..Default::default()
        };
        assert_eq!(views_per_buffer(config), vec![7, 2]);
    }

    #[test]
    fn test_embedded_image_gets_mime_type() {
        let mut model = every_category();
        let config = BufferBuilderConfig {
            images_in_buffer_views: true,
            ..Default::default()
        };
        pack(config, &mut model);

        assert_eq!(model.images[0].mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(model.images[0].uri, None);
    }
}
