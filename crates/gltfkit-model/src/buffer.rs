//! Buffers and buffer views as attached to a packed model

use gltfkit_core::BufferViewTarget;
use serde::{Deserialize, Serialize};

use crate::ids::BufferId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferViewModel {
    pub name: Option<String>,
    pub buffer: BufferId,
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: Option<usize>,
    pub target: Option<BufferViewTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferModel {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub byte_length: usize,
}
