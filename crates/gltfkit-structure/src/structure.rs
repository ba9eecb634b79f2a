//! The sealed result of a packing run
//!
//! A [`BufferStructure`] records, for every packed accessor, buffer view and
//! buffer, its string ID, its index and its byte layout. It is produced by
//! [`BufferStructureBuilder::build`](crate::BufferStructureBuilder::build)
//! and never changes afterwards.

use std::collections::{BTreeSet, HashMap};
use std::ops::Range;

use gltfkit_core::BufferViewTarget;
use gltfkit_model::{AccessorId, BufferId, BufferModel, BufferViewId, BufferViewModel, GltfModel};

use crate::alignment::AccessorLayout;

/// Layout of one packed accessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedAccessor {
    pub accessor: AccessorId,
    pub id: String,
    pub buffer_view: Option<BufferViewId>,
    /// Offset inside the buffer view
    pub byte_offset: usize,
    pub byte_stride: usize,
    pub count: usize,
    pub component_size: usize,
    pub padded_element_size: usize,
    pub requested_byte_stride: usize,
}

impl PackedAccessor {
    /// Bytes occupied inside the buffer view
    pub fn byte_length(&self) -> usize {
        self.byte_stride * self.count
    }

    /// Byte range occupied inside the buffer view
    pub fn byte_range(&self) -> Range<usize> {
        self.byte_offset..self.byte_offset + self.byte_length()
    }
}

impl AccessorLayout for PackedAccessor {
    fn component_size_in_bytes(&self) -> usize {
        self.component_size
    }

    fn padded_element_size_in_bytes(&self) -> usize {
        self.padded_element_size
    }

    fn requested_byte_stride(&self) -> usize {
        self.requested_byte_stride
    }
}

/// Layout of one packed buffer view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBufferView {
    pub id: String,
    pub buffer: Option<BufferId>,
    /// Offset inside the buffer
    pub byte_offset: usize,
    pub byte_length: usize,
    /// Only set for vertex attribute views
    pub byte_stride: Option<usize>,
    pub target: Option<BufferViewTarget>,
    pub accessors: Vec<AccessorId>,
    /// Alignment of the view start inside its buffer
    pub alignment: usize,
    /// True for views holding raw image bytes instead of accessors
    pub is_image: bool,
    /// Padding between accessors, relative to the view start
    pub(crate) internal_padding: Vec<Range<usize>>,
}

impl PackedBufferView {
    /// Byte range occupied inside the buffer
    pub fn byte_range(&self) -> Range<usize> {
        self.byte_offset..self.byte_offset + self.byte_length
    }
}

/// Layout of one packed buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBuffer {
    pub id: String,
    pub uri: Option<String>,
    pub byte_length: usize,
    pub buffer_views: Vec<BufferViewId>,
    pub padding: BTreeSet<usize>,
}

/// Immutable mapping of accessors into buffer views and buffers
#[derive(Debug, Clone, Default)]
pub struct BufferStructure {
    pub(crate) accessors: Vec<PackedAccessor>,
    pub(crate) accessor_lookup: HashMap<AccessorId, usize>,
    pub(crate) buffer_views: Vec<PackedBufferView>,
    pub(crate) buffers: Vec<PackedBuffer>,
}

impl BufferStructure {
    // ==================== Accessors ====================

    /// Packed accessors in index order
    pub fn accessors(&self) -> &[PackedAccessor] {
        &self.accessors
    }

    pub fn accessor_index(&self, accessor: AccessorId) -> Option<usize> {
        self.accessor_lookup.get(&accessor).copied()
    }

    pub fn accessor_id(&self, accessor: AccessorId) -> Option<&str> {
        self.packed_accessor(accessor).map(|a| a.id.as_str())
    }

    pub fn packed_accessor(&self, accessor: AccessorId) -> Option<&PackedAccessor> {
        self.accessor_index(accessor).map(|i| &self.accessors[i])
    }

    // ==================== Buffer Views ====================

    /// Packed buffer views in index order
    pub fn buffer_views(&self) -> &[PackedBufferView] {
        &self.buffer_views
    }

    pub fn buffer_view(&self, view: BufferViewId) -> Option<&PackedBufferView> {
        self.buffer_views.get(view.0)
    }

    pub fn buffer_view_index(&self, view: BufferViewId) -> Option<usize> {
        self.buffer_view(view).map(|_| view.0)
    }

    pub fn buffer_view_id(&self, view: BufferViewId) -> Option<&str> {
        self.buffer_view(view).map(|v| v.id.as_str())
    }

    /// Accessors stored in a buffer view, in insertion order
    pub fn accessors_of(&self, view: BufferViewId) -> Option<&[AccessorId]> {
        self.buffer_view(view).map(|v| v.accessors.as_slice())
    }

    // ==================== Buffers ====================

    /// Packed buffers in index order
    pub fn buffers(&self) -> &[PackedBuffer] {
        &self.buffers
    }

    pub fn buffer(&self, buffer: BufferId) -> Option<&PackedBuffer> {
        self.buffers.get(buffer.0)
    }

    pub fn buffer_index(&self, buffer: BufferId) -> Option<usize> {
        self.buffer(buffer).map(|_| buffer.0)
    }

    pub fn buffer_id(&self, buffer: BufferId) -> Option<&str> {
        self.buffer(buffer).map(|b| b.id.as_str())
    }

    /// Buffer views stored in a buffer, in insertion order
    pub fn buffer_views_of(&self, buffer: BufferId) -> Option<&[BufferViewId]> {
        self.buffer(buffer).map(|b| b.buffer_views.as_slice())
    }

    /// Whether the byte at `index` of `buffer` only exists for alignment
    pub fn is_padding_byte(&self, buffer: BufferId, index: usize) -> bool {
        self.buffer(buffer)
            .map(|b| b.padding.contains(&index))
            .unwrap_or(false)
    }

    pub fn padding_bytes(&self, buffer: BufferId) -> Option<&BTreeSet<usize>> {
        self.buffer(buffer).map(|b| &b.padding)
    }

    /// Offset of an accessor's first byte inside its buffer
    pub fn absolute_byte_offset(&self, accessor: AccessorId) -> Option<usize> {
        let packed = self.packed_accessor(accessor)?;
        let view = self.buffer_view(packed.buffer_view?)?;
        Some(view.byte_offset + packed.byte_offset)
    }

    // ==================== Model Conversion ====================

    pub fn buffer_view_models(&self) -> Vec<BufferViewModel> {
        self.buffer_views
            .iter()
            .map(|view| BufferViewModel {
                name: None,
                buffer: view.buffer.unwrap_or(BufferId(0)),
                byte_offset: view.byte_offset,
                byte_length: view.byte_length,
                byte_stride: view.byte_stride,
                target: view.target,
            })
            .collect()
    }

    pub fn buffer_models(&self) -> Vec<BufferModel> {
        self.buffers
            .iter()
            .map(|buffer| BufferModel {
                name: None,
                uri: buffer.uri.clone(),
                byte_length: buffer.byte_length,
            })
            .collect()
    }

    /// Attach the packed buffer views, buffers and accessor layouts to a model
    ///
    /// Accessors keep a nonzero `byte_stride` only where the packed stride
    /// differs from their padded element size.
    pub fn apply_to(&self, model: &mut GltfModel) {
        model.buffer_views = self.buffer_view_models();
        model.buffers = self.buffer_models();
        for packed in &self.accessors {
            if let Some(accessor) = model.accessors.get_mut(packed.accessor.0) {
                accessor.buffer_view = packed.buffer_view;
                accessor.byte_offset = packed.byte_offset;
                accessor.byte_stride = if packed.byte_stride == packed.padded_element_size {
                    0
                } else {
                    packed.byte_stride
                };
            }
        }
    }
}
