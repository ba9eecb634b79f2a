//! glTF wire records
//!
//! [`v1`] holds the dictionary-keyed records of glTF 1.0, [`v2`] the
//! index-array records of glTF 2.0. [`Document`] picks one of them from
//! the schema of the model.

pub mod v1;
pub mod v2;

use gltfkit_core::SchemaVersion;
use gltfkit_model::GltfModel;
use gltfkit_structure::BufferStructure;
use serde::Serialize;

pub use v1::GltfCreatorV1;
pub use v2::GltfCreatorV2;

/// A glTF document of either schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    V1(v1::Gltf),
    V2(v2::Gltf),
}

impl Document {
    /// Build the records matching `model.schema`
    pub fn create(model: &GltfModel, structure: &BufferStructure) -> Self {
        match model.schema {
            SchemaVersion::Legacy => Document::V1(GltfCreatorV1::create(model, structure)),
            SchemaVersion::Current => Document::V2(GltfCreatorV2::create(model, structure)),
        }
    }

    pub fn schema(&self) -> SchemaVersion {
        match self {
            Document::V1(_) => SchemaVersion::Legacy,
            Document::V2(_) => SchemaVersion::Current,
        }
    }
}
