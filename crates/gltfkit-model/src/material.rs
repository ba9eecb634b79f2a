//! Images, textures and materials
//!
//! Materials come in two shapes: the metallic-roughness model of the
//! current schema and the technique-driven model of the legacy schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{BufferViewId, ImageId, TechniqueId, TextureId};

/// An image, either referenced by URI or stored in a buffer view
///
/// `data` holds the encoded image file (PNG, JPEG, ...) when it is
/// available in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageModel {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub mime_type: Option<String>,
    pub buffer_view: Option<BufferViewId>,
    pub data: Vec<u8>,
}

impl ImageModel {
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Default::default()
        }
    }

    pub fn from_data(data: Vec<u8>, mime_type: Option<String>) -> Self {
        Self {
            mime_type,
            data,
            ..Default::default()
        }
    }
}

/// Sampling parameters of a texture (GL constants)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SamplerSettings {
    pub mag_filter: Option<u32>,
    pub min_filter: Option<u32>,
    pub wrap_s: Option<u32>,
    pub wrap_t: Option<u32>,
}

impl SamplerSettings {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureModel {
    pub name: Option<String>,
    pub image: Option<ImageId>,
    pub sampler: SamplerSettings,
    /// Legacy pixel format fields
    pub format: Option<u32>,
    pub internal_format: Option<u32>,
    pub target: Option<u32>,
    pub texel_type: Option<u32>,
}

/// Reference from a material to a texture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureRef {
    pub texture: TextureId,
    pub tex_coord: u32,
}

impl TextureRef {
    pub fn new(texture: TextureId) -> Self {
        Self { texture, tex_coord: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

impl AlphaMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlphaMode::Opaque => "OPAQUE",
            AlphaMode::Mask => "MASK",
            AlphaMode::Blend => "BLEND",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PbrMaterial {
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<TextureRef>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub metallic_roughness_texture: Option<TextureRef>,
    pub normal_texture: Option<TextureRef>,
    pub normal_scale: f32,
    pub occlusion_texture: Option<TextureRef>,
    pub occlusion_strength: f32,
    pub emissive_texture: Option<TextureRef>,
    pub emissive_factor: [f32; 3],
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: Option<f32>,
    pub double_sided: bool,
}

impl Default for PbrMaterial {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
            normal_texture: None,
            normal_scale: 1.0,
            occlusion_texture: None,
            occlusion_strength: 1.0,
            emissive_texture: None,
            emissive_factor: [0.0, 0.0, 0.0],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: None,
            double_sided: false,
        }
    }
}

impl PbrMaterial {
    /// Mutable access to every texture slot, in wire order
    pub fn texture_refs_mut(&mut self) -> [&mut Option<TextureRef>; 5] {
        [
            &mut self.base_color_texture,
            &mut self.metallic_roughness_texture,
            &mut self.normal_texture,
            &mut self.occlusion_texture,
            &mut self.emissive_texture,
        ]
    }
}

/// A material or technique parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MaterialValue {
    Scalar(f64),
    Vector(Vec<f64>),
    Bool(bool),
    Text(String),
    /// `sampler2D` parameters name a texture
    Texture(TextureId),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechniqueMaterial {
    pub technique: Option<TechniqueId>,
    pub values: BTreeMap<String, MaterialValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MaterialDefinition {
    Pbr(PbrMaterial),
    Technique(TechniqueMaterial),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialModel {
    pub name: Option<String>,
    pub definition: MaterialDefinition,
}

impl MaterialModel {
    pub fn pbr(name: impl Into<String>, pbr: PbrMaterial) -> Self {
        Self {
            name: Some(name.into()),
            definition: MaterialDefinition::Pbr(pbr),
        }
    }

    pub fn technique(name: impl Into<String>, material: TechniqueMaterial) -> Self {
        Self {
            name: Some(name.into()),
            definition: MaterialDefinition::Technique(material),
        }
    }
}
