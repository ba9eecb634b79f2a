//! Common types used across gltfkit
//!
//! This module provides the shared enumerations of the glTF data model:
//! accessor component types and element shapes, buffer view targets and
//! the wire schema version.

use serde::{Deserialize, Serialize};

/// Datatype of the individual components of an accessor element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Float,
    Double,
}

impl ComponentType {
    /// All component types, in GL constant order
    pub const ALL: [ComponentType; 8] = [
        ComponentType::Byte,
        ComponentType::UnsignedByte,
        ComponentType::Short,
        ComponentType::UnsignedShort,
        ComponentType::Int,
        ComponentType::UnsignedInt,
        ComponentType::Float,
        ComponentType::Double,
    ];

    /// Size of one component in bytes
    pub fn size_in_bytes(&self) -> usize {
        match self {
            ComponentType::Byte | ComponentType::UnsignedByte => 1,
            ComponentType::Short | ComponentType::UnsignedShort => 2,
            ComponentType::Int | ComponentType::UnsignedInt | ComponentType::Float => 4,
            ComponentType::Double => 8,
        }
    }

    /// The GL constant used for this type on the wire
    pub fn gl_constant(&self) -> u32 {
        match self {
            ComponentType::Byte => 5120,
            ComponentType::UnsignedByte => 5121,
            ComponentType::Short => 5122,
            ComponentType::UnsignedShort => 5123,
            ComponentType::Int => 5124,
            ComponentType::UnsignedInt => 5125,
            ComponentType::Float => 5126,
            ComponentType::Double => 5130,
        }
    }

    /// Look up a component type by its GL constant
    pub fn from_gl_constant(value: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.gl_constant() == value)
    }
}

/// Shape of a single accessor element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ElementType {
    /// Number of components per element
    pub fn component_count(&self) -> usize {
        match self {
            ElementType::Scalar => 1,
            ElementType::Vec2 => 2,
            ElementType::Vec3 => 3,
            ElementType::Vec4 | ElementType::Mat2 => 4,
            ElementType::Mat3 => 9,
            ElementType::Mat4 => 16,
        }
    }

    /// Number of matrix columns, or `None` for scalars and vectors
    pub fn matrix_columns(&self) -> Option<usize> {
        match self {
            ElementType::Mat2 => Some(2),
            ElementType::Mat3 => Some(3),
            ElementType::Mat4 => Some(4),
            _ => None,
        }
    }

    /// The name used for this shape on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Scalar => "SCALAR",
            ElementType::Vec2 => "VEC2",
            ElementType::Vec3 => "VEC3",
            ElementType::Vec4 => "VEC4",
            ElementType::Mat2 => "MAT2",
            ElementType::Mat3 => "MAT3",
            ElementType::Mat4 => "MAT4",
        }
    }

    /// Parse a wire name such as `"VEC3"`
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "SCALAR" => Some(ElementType::Scalar),
            "VEC2" => Some(ElementType::Vec2),
            "VEC3" => Some(ElementType::Vec3),
            "VEC4" => Some(ElementType::Vec4),
            "MAT2" => Some(ElementType::Mat2),
            "MAT3" => Some(ElementType::Mat3),
            "MAT4" => Some(ElementType::Mat4),
            _ => None,
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usage hint of a buffer view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferViewTarget {
    /// Vertex attribute data
    ArrayBuffer,
    /// Vertex index data
    ElementArrayBuffer,
}

impl BufferViewTarget {
    pub fn gl_constant(&self) -> u32 {
        match self {
            BufferViewTarget::ArrayBuffer => 34962,
            BufferViewTarget::ElementArrayBuffer => 34963,
        }
    }
}

/// Wire schema a model is read from and written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SchemaVersion {
    /// glTF 1.0: elements live in dictionaries keyed by string IDs
    Legacy,
    /// glTF 2.0: elements live in arrays addressed by index
    #[default]
    Current,
}

impl SchemaVersion {
    /// The `asset.version` string of this schema
    pub fn version_string(&self) -> &'static str {
        match self {
            SchemaVersion::Legacy => "1.0",
            SchemaVersion::Current => "2.0",
        }
    }
}
