//! Bundling policies that decide how accessors are grouped into buffers
//!
//! A strategy walks a model, feeds every accessor into a
//! [`BufferStructureBuilder`](crate::BufferStructureBuilder) and decides
//! where buffer views and buffers begin and end.

mod default;
mod presets;

pub use default::DefaultBufferBuilderStrategy;
pub use presets::{PackingPreset, Strategies};

use gltfkit_core::Result;
use gltfkit_model::GltfModel;
use serde::{Deserialize, Serialize};

use crate::structure::BufferStructure;

/// Where buffer boundaries are placed
///
/// A `*_per_*` flag gives each element of a category its own buffer, a
/// `*_for_*` flag gives the whole category its own buffer. With every flag
/// off, all data ends up in a single buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferBuilderConfig {
    pub buffer_per_mesh_primitive: bool,
    pub buffer_per_mesh: bool,
    pub buffer_for_meshes: bool,
    pub buffer_per_animation: bool,
    pub buffer_for_animations: bool,
    pub buffer_per_skin: bool,
    pub buffer_for_skins: bool,
    pub buffer_per_image: bool,
    pub buffer_for_images: bool,
    pub buffer_for_additional_accessors: bool,
    /// Store image bytes in buffer views instead of external files
    pub images_in_buffer_views: bool,
}

/// Packs the accessors of a model into buffers
pub trait BufferBuilderStrategy {
    /// Pack `model` and record the image placement decisions in it
    ///
    /// The model's own buffer lists are not touched; use
    /// [`BufferStructure::apply_to`] for that.
    fn process(&mut self, model: &mut GltfModel) -> Result<()>;

    /// The structure built by the last [`process`](Self::process) call
    fn buffer_structure(&self) -> Result<&BufferStructure>;

    fn into_buffer_structure(self: Box<Self>) -> Result<BufferStructure>;
}
