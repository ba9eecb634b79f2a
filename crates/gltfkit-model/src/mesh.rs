//! Meshes and mesh primitives

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{AccessorId, MaterialId};

/// Attribute semantic (e.g. `"POSITION"`) to accessor
pub type AttributeMap = BTreeMap<String, AccessorId>;

/// Primitive mode constant for triangle lists
pub const MODE_TRIANGLES: u32 = 4;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshModel {
    pub name: Option<String>,
    pub primitives: Vec<PrimitiveModel>,
    /// Default morph target weights
    pub weights: Vec<f32>,
}

impl MeshModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_primitive(mut self, primitive: PrimitiveModel) -> Self {
        self.primitives.push(primitive);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveModel {
    pub attributes: AttributeMap,
    pub indices: Option<AccessorId>,
    pub material: Option<MaterialId>,
    pub mode: u32,
    /// Morph targets, each mapping attribute semantics to displacement accessors
    pub targets: Vec<AttributeMap>,
}

impl Default for PrimitiveModel {
    fn default() -> Self {
        Self {
            attributes: AttributeMap::new(),
            indices: None,
            material: None,
            mode: MODE_TRIANGLES,
            targets: Vec::new(),
        }
    }
}

impl PrimitiveModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, semantic: impl Into<String>, accessor: AccessorId) -> Self {
        self.attributes.insert(semantic.into(), accessor);
        self
    }

    pub fn with_indices(mut self, accessor: AccessorId) -> Self {
        self.indices = Some(accessor);
        self
    }

    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_target(mut self, target: AttributeMap) -> Self {
        self.targets.push(target);
        self
    }
}
