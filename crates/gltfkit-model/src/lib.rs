//! gltfkit-model
//!
//! The in-memory glTF scene graph consumed and produced by the packing
//! pipeline. A [`GltfModel`] owns every element in per-kind arenas; elements
//! point at each other through typed handles such as [`AccessorId`].
//!
//! # Example
//!
//! ```rust
//! use gltfkit_core::{ComponentType, ElementType, SchemaVersion};
//! use gltfkit_model::{AccessorModel, GltfModel, MeshModel, PrimitiveModel};
//!
//! let mut model = GltfModel::new(SchemaVersion::Current);
//! let positions = model.add_accessor(AccessorModel::from_elements(
//!     ComponentType::Float,
//!     ElementType::Vec3,
//!     &[[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
//! ));
//! let mesh = model.add_mesh(
//!     MeshModel::new("triangle")
//!         .with_primitive(PrimitiveModel::new().with_attribute("POSITION", positions)),
//! );
//!
//! assert_eq!(model[mesh].primitives[0].attributes["POSITION"], positions);
//! ```

pub mod accessor;
pub mod animation;
pub mod buffer;
pub mod ids;
pub mod legacy;
pub mod material;
pub mod mesh;
pub mod model;
pub mod node;

pub use accessor::AccessorModel;
pub use animation::{AnimationModel, AnimationSamplerModel, ChannelModel, Interpolation, TargetPath};
pub use buffer::{BufferModel, BufferViewModel};
pub use ids::*;
pub use legacy::{ProgramModel, ShaderModel, ShaderType, TechniqueModel, TechniqueParameter};
pub use material::{
    AlphaMode, ImageModel, MaterialDefinition, MaterialModel, MaterialValue, PbrMaterial,
    SamplerSettings, TechniqueMaterial, TextureModel, TextureRef,
};
pub use mesh::{AttributeMap, MeshModel, PrimitiveModel, MODE_TRIANGLES};
pub use model::{AssetInfo, GltfModel};
pub use node::{CameraModel, CameraProjection, NodeModel, SceneModel, SkinModel};
