//! gltfkit - glTF restructuring and buffer packing
//!
//! Re-exports the workspace crates and offers one-call entry points:
//!
//! ```rust
//! use gltfkit::prelude::*;
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
//! let packed = gltfkit::restructure(&source, PackingPreset::Binary).unwrap();
//! let (document, buffers) = gltfkit::export(&packed).unwrap();
//!
//! assert!(matches!(document, Document::V2(_)));
//! assert_eq!(buffers[0].len(), 36);
//! ```

pub use gltfkit_core;
pub use gltfkit_export;
pub use gltfkit_model;
pub use gltfkit_structure;

pub use gltfkit_core::{Error, Result};
pub use gltfkit_export::{Document, ExportError, ExportResult};
pub use gltfkit_structure::{PackedModel, PackingPreset};

use gltfkit_model::GltfModel;
use gltfkit_structure::GltfModelStructures;

/// Copy `source` and pack the copy with one of the preset bundling policies
///
/// `source` is left untouched.
pub fn restructure(source: &GltfModel, preset: PackingPreset) -> Result<PackedModel> {
    let mut structures = GltfModelStructures::new();
    structures.prepare(source);
    let packed = structures.pack(preset.config())?;
    tracing::info!(
        preset = ?preset,
        buffers = packed.structure.buffers().len(),
        "Restructured model"
    );
    Ok(packed)
}

/// Wire records and buffer contents of a packed model
pub fn export(packed: &PackedModel) -> ExportResult<(Document, Vec<Vec<u8>>)> {
    let document = Document::create(&packed.model, &packed.structure);
    let buffers = gltfkit_export::assemble_buffers(&packed.model, &packed.structure)?;
    Ok((document, buffers))
}

/// Re-export commonly used items
pub mod prelude {
    pub use gltfkit_core::prelude::*;
    pub use gltfkit_export::{Document, GltfCreatorV1, GltfCreatorV2};
    pub use gltfkit_model::{
        AccessorId, AccessorModel, GltfModel, ImageModel, MeshModel, NodeModel, PrimitiveModel, SceneModel,
    };
    pub use gltfkit_structure::{
        BufferBuilderConfig, BufferStructure, GltfModelStructures, PackedModel, PackingPreset, Strategies,
    };
}
