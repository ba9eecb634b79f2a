//! Keyframe animations

use serde::{Deserialize, Serialize};

use crate::ids::{AccessorId, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

impl Interpolation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interpolation::Linear => "LINEAR",
            Interpolation::Step => "STEP",
            Interpolation::CubicSpline => "CUBICSPLINE",
        }
    }
}

/// Node property driven by a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

impl TargetPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetPath::Translation => "translation",
            TargetPath::Rotation => "rotation",
            TargetPath::Scale => "scale",
            TargetPath::Weights => "weights",
        }
    }
}

/// Keyframe times (`input`) and values (`output`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSamplerModel {
    pub input: AccessorId,
    pub output: AccessorId,
    pub interpolation: Interpolation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelModel {
    pub sampler: AnimationSamplerModel,
    pub node: Option<NodeId>,
    pub path: TargetPath,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationModel {
    pub name: Option<String>,
    pub channels: Vec<ChannelModel>,
}

impl AnimationModel {
    /// Every sampler input and output accessor, in channel order
    ///
    /// Accessors shared between channels appear once per use.
    pub fn sampler_accessors(&self) -> impl Iterator<Item = AccessorId> + '_ {
        self.channels
            .iter()
            .flat_map(|c| [c.sampler.input, c.sampler.output])
    }
}
