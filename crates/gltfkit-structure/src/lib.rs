//! gltfkit-structure
//!
//! Decides how the accessors of a [`GltfModel`](gltfkit_model::GltfModel)
//! are laid out in buffer views and buffers.
//!
//! - [`alignment`]: alignment and stride arithmetic
//! - [`BufferStructureBuilder`] / [`BufferStructure`]: incremental layout and
//!   its sealed result
//! - [`strategy`]: bundling policies driving the builder
//! - [`GltfModelStructures`]: copy a model and pack the copy
//!
//! # Example
//!
//! ```rust
//! use gltfkit_core::{ComponentType, ElementType, SchemaVersion};
//! use gltfkit_model::{AccessorModel, GltfModel, MeshModel, PrimitiveModel};
//! use gltfkit_structure::GltfModelStructures;
//!
//! let mut source = GltfModel::new(SchemaVersion::Current);
//! let positions = source.add_accessor(AccessorModel::from_elements(
//!     ComponentType::Float,
//!     ElementType::Vec3,
//!     &[[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
//! ));
//! source.add_mesh(
//!     MeshModel::new("triangle")
//!         .with_primitive(PrimitiveModel::new().with_attribute("POSITION", positions)),
//! );
//!
//! let mut structures = GltfModelStructures::new();
//! structures.prepare(&source);
//! let packed = structures.pack_default().unwrap();
//!
//! assert_eq!(packed.model.buffers[0].byte_length, 36);
//! assert_eq!(packed.structure.accessor_id(positions), Some("position"));
//! ```

pub mod alignment;
pub mod builder;
pub mod ids;
pub mod model_structures;
pub mod strategy;
pub mod structure;
pub mod uri;

pub use alignment::AccessorLayout;
pub use builder::BufferStructureBuilder;
pub use ids::IdGenerator;
pub use model_structures::{ElementMap, ElementMaps, GltfModelStructures, MappedElement, PackedModel};
pub use strategy::{
    BufferBuilderConfig, BufferBuilderStrategy, DefaultBufferBuilderStrategy, PackingPreset, Strategies,
};
pub use structure::{BufferStructure, PackedAccessor, PackedBuffer, PackedBufferView};
pub use uri::UriGenerator;
