//! Typed handles into a [`GltfModel`](crate::GltfModel)
//!
//! Elements reference each other through these handles rather than through
//! pointers, so two references to the same handle are the same element.

use serde::{Deserialize, Serialize};

/// Common behaviour of all element handles
pub trait ElementId: Copy + Eq + Ord + std::hash::Hash + std::fmt::Debug {
    /// Human readable element kind, e.g. `"accessor"`
    const KIND: &'static str;

    /// Create a handle for the element at `index` of its arena
    fn from_index(index: usize) -> Self;

    /// Position of the element in its arena
    fn index(&self) -> usize;
}

macro_rules! element_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub usize);

        impl ElementId for $name {
            const KIND: &'static str = $kind;

            fn from_index(index: usize) -> Self {
                Self(index)
            }

            fn index(&self) -> usize {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{} {}", $kind, self.0)
            }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                Self(value)
            }
        }
    };
}

element_id!(
    /// Handle of an accessor
    AccessorId, "accessor"
);
element_id!(AnimationId, "animation");
element_id!(
    /// Handle of a buffer produced by packing
    BufferId, "buffer"
);
element_id!(
    /// Handle of a buffer view produced by packing
    BufferViewId, "buffer view"
);
element_id!(CameraId, "camera");
element_id!(ImageId, "image");
element_id!(MaterialId, "material");
element_id!(MeshId, "mesh");
element_id!(NodeId, "node");
element_id!(SceneId, "scene");
element_id!(SkinId, "skin");
element_id!(TextureId, "texture");
element_id!(ShaderId, "shader");
element_id!(ProgramId, "program");
element_id!(TechniqueId, "technique");
