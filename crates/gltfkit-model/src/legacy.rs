//! Shaders, programs and techniques of the legacy schema
//!
//! Only the identity and cross references of these elements matter here;
//! shader sources are carried as opaque URIs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{NodeId, ProgramId, ShaderId};
use crate::material::MaterialValue;

pub const FRAGMENT_SHADER: u32 = 35632;
pub const VERTEX_SHADER: u32 = 35633;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderType {
    Vertex,
    Fragment,
}

impl ShaderType {
    pub fn gl_constant(&self) -> u32 {
        match self {
            ShaderType::Vertex => VERTEX_SHADER,
            ShaderType::Fragment => FRAGMENT_SHADER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderModel {
    pub name: Option<String>,
    pub shader_type: ShaderType,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramModel {
    pub name: Option<String>,
    pub vertex_shader: Option<ShaderId>,
    pub fragment_shader: Option<ShaderId>,
    pub attributes: Vec<String>,
}

/// A typed technique parameter
///
/// A parameter bound to a node reads its value (e.g. a model matrix) from
/// that node instead of from the material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueParameter {
    pub parameter_type: u32,
    pub count: Option<u32>,
    pub semantic: Option<String>,
    pub node: Option<NodeId>,
    pub value: Option<MaterialValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueModel {
    pub name: Option<String>,
    pub program: Option<ProgramId>,
    pub parameters: BTreeMap<String, TechniqueParameter>,
    /// GLSL attribute name to parameter name
    pub attributes: BTreeMap<String, String>,
    /// GLSL uniform name to parameter name
    pub uniforms: BTreeMap<String, String>,
    pub enabled_states: Vec<u32>,
}
