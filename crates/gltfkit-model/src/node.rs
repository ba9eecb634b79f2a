//! Nodes, scenes, skins and cameras

use serde::{Deserialize, Serialize};

use crate::ids::{AccessorId, CameraId, MeshId, NodeId, SkinId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeModel {
    pub name: Option<String>,
    pub children: Vec<NodeId>,
    /// The current schema allows one mesh per node, the legacy schema several
    pub meshes: Vec<MeshId>,
    pub skin: Option<SkinId>,
    pub camera: Option<CameraId>,
    pub matrix: Option<[f32; 16]>,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    pub weights: Vec<f32>,
    /// Legacy skins refer to their joints by this name
    pub joint_name: Option<String>,
}

impl NodeModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_child(mut self, child: NodeId) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_mesh(mut self, mesh: MeshId) -> Self {
        self.meshes.push(mesh);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneModel {
    pub name: Option<String>,
    pub nodes: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinModel {
    pub name: Option<String>,
    /// Legacy only
    pub bind_shape_matrix: Option<[f32; 16]>,
    pub inverse_bind_matrices: Option<AccessorId>,
    pub joints: Vec<NodeId>,
    pub skeleton: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CameraProjection {
    Perspective {
        aspect_ratio: Option<f32>,
        yfov: f32,
        znear: f32,
        zfar: Option<f32>,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        znear: f32,
        zfar: f32,
    },
}

impl CameraProjection {
    /// The `type` string of the camera on the wire
    pub fn type_name(&self) -> &'static str {
        match self {
            CameraProjection::Perspective { .. } => "perspective",
            CameraProjection::Orthographic { .. } => "orthographic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraModel {
    pub name: Option<String>,
    pub projection: CameraProjection,
}
