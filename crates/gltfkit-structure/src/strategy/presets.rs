use serde::{Deserialize, Serialize};

use super::{BufferBuilderConfig, BufferBuilderStrategy, DefaultBufferBuilderStrategy};

/// Named bundling configurations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackingPreset {
    /// Everything in one buffer, images as external files
    #[default]
    Default,
    /// Everything in one buffer, images embedded
    Binary,
    /// One buffer per mesh primitive and one for all animations
    Custom,
}

impl PackingPreset {
    pub fn config(&self) -> BufferBuilderConfig {
        match self {
            PackingPreset::Default => BufferBuilderConfig::default(),
            PackingPreset::Binary => BufferBuilderConfig {
                images_in_buffer_views: true,
                ..Default::default()
            },
            PackingPreset::Custom => BufferBuilderConfig {
                buffer_per_mesh_primitive: true,
                buffer_per_mesh: true,
                buffer_for_animations: true,
                ..Default::default()
            },
        }
    }
}

/// Factory for boxed strategies
pub struct Strategies;

impl Strategies {
    pub fn create(config: BufferBuilderConfig) -> Box<dyn BufferBuilderStrategy> {
        Box::new(DefaultBufferBuilderStrategy::new(config))
    }

    pub fn from_preset(preset: PackingPreset) -> Box<dyn BufferBuilderStrategy> {
        Self::create(preset.config())
    }
}
