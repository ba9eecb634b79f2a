//! Incremental construction of a [`BufferStructure`]
//!
//! Accessors are added one by one and become *pending*. Creating a buffer
//! view closes all pending accessors into that view, and creating a buffer
//! closes all pending buffer views into that buffer. Offsets and padding
//! are computed at the moment a group is closed.

use std::collections::{BTreeSet, HashMap};
use std::ops::Range;

use gltfkit_core::{BufferViewTarget, Error, Result};
use gltfkit_model::{AccessorId, AccessorModel, BufferId, BufferViewId};
use tracing::debug;

use crate::alignment::{
    common_alignment, common_vertex_attribute_byte_stride, lcm, padding,
};
use crate::ids::IdGenerator;
use crate::structure::{BufferStructure, PackedAccessor, PackedBuffer, PackedBufferView};

/// Mutable builder for one packing run
#[derive(Debug, Default)]
pub struct BufferStructureBuilder {
    accessors: Vec<PackedAccessor>,
    accessor_lookup: HashMap<AccessorId, usize>,
    accessor_ids: IdGenerator,
    pending_accessors: Vec<usize>,

    buffer_views: Vec<PackedBufferView>,
    buffer_view_ids: IdGenerator,
    pending_buffer_views: Vec<BufferViewId>,

    buffers: Vec<PackedBuffer>,
    buffer_ids: IdGenerator,
}

impl BufferStructureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an accessor and return its index
    ///
    /// The accessor stays pending until the next buffer view is created.
    pub fn add_accessor(&mut self, id_prefix: &str, accessor: AccessorId, model: &AccessorModel) -> Result<usize> {
        if self.accessor_lookup.contains_key(&accessor) {
            return Err(Error::DuplicateAccessor { index: accessor.0 });
        }
        let index = self.accessors.len();
        self.accessors.push(PackedAccessor {
            accessor,
            id: self.accessor_ids.generate(id_prefix),
            buffer_view: None,
            byte_offset: 0,
            byte_stride: 0,
            count: model.count,
            component_size: model.component_size_in_bytes(),
            padded_element_size: model.padded_element_size_in_bytes(),
            requested_byte_stride: model.byte_stride,
        });
        self.accessor_lookup.insert(accessor, index);
        self.pending_accessors.push(index);
        Ok(index)
    }

    pub fn contains_accessor(&self, accessor: AccessorId) -> bool {
        self.accessor_lookup.contains_key(&accessor)
    }

    pub fn has_pending_accessors(&self) -> bool {
        !self.pending_accessors.is_empty()
    }

    pub fn has_pending_buffer_views(&self) -> bool {
        !self.pending_buffer_views.is_empty()
    }

    pub fn accessor_count(&self) -> usize {
        self.accessors.len()
    }

    pub fn buffer_view_count(&self) -> usize {
        self.buffer_views.len()
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Close the pending accessors into a view without a target
    pub fn create_plain_buffer_view(&mut self, id_prefix: &str) -> Result<BufferViewId> {
        self.create_buffer_view(id_prefix, None)
    }

    /// Close the pending accessors into a vertex attribute view
    pub fn create_array_buffer_view(&mut self, id_prefix: &str) -> Result<BufferViewId> {
        self.create_buffer_view(id_prefix, Some(BufferViewTarget::ArrayBuffer))
    }

    /// Close the pending accessors into an index view
    pub fn create_element_array_buffer_view(&mut self, id_prefix: &str) -> Result<BufferViewId> {
        self.create_buffer_view(id_prefix, Some(BufferViewTarget::ElementArrayBuffer))
    }

    /// Close the pending accessors into a new buffer view
    ///
    /// Vertex attribute views share one stride, rounded up to 4 bytes, which
    /// is recorded on the view. In all other views each accessor is tightly
    /// packed. Each accessor starts at a multiple of its component size.
    pub fn create_buffer_view(&mut self, id_prefix: &str, target: Option<BufferViewTarget>) -> Result<BufferViewId> {
        if self.pending_accessors.is_empty() {
            return Err(Error::EmptyBufferView {
                prefix: id_prefix.to_string(),
            });
        }
        let view = BufferViewId(self.buffer_views.len());
        let pending = std::mem::take(&mut self.pending_accessors);

        let is_vertex_attribute = target == Some(BufferViewTarget::ArrayBuffer);
        let members = pending.iter().map(|&i| &self.accessors[i]);
        let mut alignment = common_alignment(members.clone());
        let view_stride = if is_vertex_attribute {
            alignment = lcm(alignment, 4);
            Some(common_vertex_attribute_byte_stride(members))
        } else {
            None
        };

        let mut offset = 0;
        let mut internal_padding = Vec::new();
        let mut accessors = Vec::with_capacity(pending.len());
        for &index in &pending {
            let packed = &mut self.accessors[index];
            let skipped = padding(offset, packed.component_size);
            if skipped > 0 {
                internal_padding.push(offset..offset + skipped);
            }
            offset += skipped;

            packed.buffer_view = Some(view);
            packed.byte_offset = offset;
            packed.byte_stride = view_stride.unwrap_or(packed.padded_element_size);
            offset += packed.byte_length();
            accessors.push(packed.accessor);
        }

        let id = self.buffer_view_ids.generate(id_prefix);
        debug!(view = %id, accessors = accessors.len(), byte_length = offset, "Created buffer view");

        self.buffer_views.push(PackedBufferView {
            id,
            buffer: None,
            byte_offset: 0,
            byte_length: offset,
            byte_stride: view_stride,
            target,
            accessors,
            alignment,
            is_image: false,
            internal_padding,
        });
        self.pending_buffer_views.push(view);
        Ok(view)
    }

    /// Store raw image bytes in a view of their own
    ///
    /// The returned handle is what the caller associates with the image.
    pub fn create_image_buffer_view(&mut self, id_prefix: &str, data: &[u8]) -> Result<BufferViewId> {
        let view = BufferViewId(self.buffer_views.len());
        let id = self.buffer_view_ids.generate(id_prefix);
        debug!(view = %id, byte_length = data.len(), "Created image buffer view");

        self.buffer_views.push(PackedBufferView {
            id,
            buffer: None,
            byte_offset: 0,
            byte_length: data.len(),
            byte_stride: None,
            target: None,
            accessors: Vec::new(),
            alignment: 1,
            is_image: true,
            internal_padding: Vec::new(),
        });
        self.pending_buffer_views.push(view);
        Ok(view)
    }

    /// Close the pending buffer views into a new buffer
    ///
    /// Views are laid out in creation order. The bytes skipped to align a
    /// view, and the padding inside each view, are recorded as padding.
    pub fn create_buffer(&mut self, id_prefix: &str, uri: Option<String>) -> Result<BufferId> {
        if self.pending_buffer_views.is_empty() {
            return Err(Error::EmptyBuffer {
                prefix: id_prefix.to_string(),
            });
        }
        let buffer = BufferId(self.buffers.len());
        let views = std::mem::take(&mut self.pending_buffer_views);

        let mut offset = 0;
        let mut padding_ranges: Vec<Range<usize>> = Vec::new();
        for &view in &views {
            let packed = &mut self.buffer_views[view.0];
            let skipped = padding(offset, packed.alignment);
            if skipped > 0 {
                padding_ranges.push(offset..offset + skipped);
            }
            offset += skipped;

            packed.buffer = Some(buffer);
            packed.byte_offset = offset;
            padding_ranges.extend(
                packed
                    .internal_padding
                    .iter()
                    .map(|r| offset + r.start..offset + r.end),
            );
            offset += packed.byte_length;
        }

        let id = self.buffer_ids.generate(id_prefix);
        debug!(buffer = %id, views = views.len(), byte_length = offset, "Created buffer");

        self.buffers.push(PackedBuffer {
            id,
            uri,
            byte_length: offset,
            buffer_views: views,
            padding: BTreeSet::new(),
        });
        for range in padding_ranges {
            self.add_padding_byte_indices(buffer, range.start, range.len())?;
        }
        Ok(buffer)
    }

    /// Mark `count` bytes starting at `start` of `buffer` as padding
    pub fn add_padding_byte_indices(&mut self, buffer: BufferId, start: usize, count: usize) -> Result<()> {
        let packed = self
            .buffers
            .get_mut(buffer.0)
            .ok_or_else(|| Error::unknown("buffer", buffer.0))?;
        packed.padding.extend(start..start + count);
        Ok(())
    }

    /// Seal the builder
    ///
    /// Every accessor must have been closed into a view and every view into
    /// a buffer.
    pub fn build(self) -> Result<BufferStructure> {
        if self.has_pending_accessors() || self.has_pending_buffer_views() {
            return Err(Error::UncommittedElements {
                accessors: self.pending_accessors.len(),
                buffer_views: self.pending_buffer_views.len(),
            });
        }
        Ok(BufferStructure {
            accessors: self.accessors,
            accessor_lookup: self.accessor_lookup,
            buffer_views: self.buffer_views,
            buffers: self.buffers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gltfkit_core::{ComponentType, ElementType};

    fn accessor(component_type: ComponentType, element_type: ElementType, count: usize) -> AccessorModel {
        AccessorModel::new(component_type, element_type, count)
    }

    #[test]
    fn test_ids_for_shared_prefix() {
        let mut builder = BufferStructureBuilder::new();
        let model = accessor(ComponentType::Float, ElementType::Vec3, 3);
        for i in 0..5 {
            builder.add_accessor("attribute", AccessorId(i), &model).unwrap();
        }
        builder.create_array_buffer_view("view").unwrap();
        builder.create_buffer("buffer", None).unwrap();
        let structure = builder.build().unwrap();

        let ids: Vec<_> = (0..5)
            .map(|i| structure.accessor_id(AccessorId(i)).unwrap().to_string())
            .collect();
        assert_eq!(
            ids,
            vec!["attribute", "attribute_0", "attribute_1", "attribute_2", "attribute_3"]
        );
        assert_eq!(structure.accessor_index(AccessorId(3)), Some(3));
    }

    #[test]
    fn test_duplicate_accessor_rejected() {
        let mut builder = BufferStructureBuilder::new();
        let model = accessor(ComponentType::Float, ElementType::Scalar, 1);
        builder.add_accessor("a", AccessorId(0), &model).unwrap();

        let err = builder.add_accessor("a", AccessorId(0), &model).unwrap_err();
        assert!(matches!(err, Error::DuplicateAccessor { index: 0 }));
    }

    #[test]
    fn test_array_view_stride() {
        let mut builder = BufferStructureBuilder::new();
        let positions = accessor(ComponentType::Float, ElementType::Vec3, 4);
        let texcoords = accessor(ComponentType::Float, ElementType::Vec2, 4);
        builder.add_accessor("position", AccessorId(0), &positions).unwrap();
        builder.add_accessor("texcoord_0", AccessorId(1), &texcoords).unwrap();
        let view = builder.create_array_buffer_view("attributes").unwrap();
        builder.create_buffer("buffer", None).unwrap();
        let structure = builder.build().unwrap();

        let packed_view = structure.buffer_view(view).unwrap();
        assert_eq!(packed_view.byte_stride, Some(12));
        assert_eq!(packed_view.byte_length, 96);
        assert_eq!(structure.packed_accessor(AccessorId(1)).unwrap().byte_offset, 48);
        assert_eq!(structure.packed_accessor(AccessorId(1)).unwrap().byte_stride, 12);
    }

    #[test]
    fn test_array_view_requested_stride() {
        let mut builder = BufferStructureBuilder::new();
        let positions = accessor(ComponentType::Float, ElementType::Vec3, 2);
        let texcoords = accessor(ComponentType::Float, ElementType::Vec2, 2).with_byte_stride(24);
        builder.add_accessor("position", AccessorId(0), &positions).unwrap();
        builder.add_accessor("texcoord_0", AccessorId(1), &texcoords).unwrap();
        let view = builder.create_array_buffer_view("attributes").unwrap();
        builder.create_buffer("buffer", None).unwrap();
        let structure = builder.build().unwrap();

        assert_eq!(structure.buffer_view(view).unwrap().byte_stride, Some(24));
    }

    #[test]
    fn test_plain_view_is_tightly_packed() {
        let mut builder = BufferStructureBuilder::new();
        let times = accessor(ComponentType::Float, ElementType::Scalar, 3);
        let rotations = accessor(ComponentType::Float, ElementType::Vec4, 3);
        builder.add_accessor("animation_input", AccessorId(0), &times).unwrap();
        builder.add_accessor("animation_output", AccessorId(1), &rotations).unwrap();
        let view = builder.create_plain_buffer_view("animation_view").unwrap();
        builder.create_buffer("buffer", None).unwrap();
        let structure = builder.build().unwrap();

        let packed_view = structure.buffer_view(view).unwrap();
        assert_eq!(packed_view.byte_stride, None);
        assert_eq!(packed_view.byte_length, 12 + 48);
        assert_eq!(structure.packed_accessor(AccessorId(0)).unwrap().byte_stride, 4);
        assert_eq!(structure.packed_accessor(AccessorId(1)).unwrap().byte_offset, 12);
    }

    #[test]
    fn test_padding_between_views() {
        let mut builder = BufferStructureBuilder::new();
        let bytes = accessor(ComponentType::UnsignedByte, ElementType::Scalar, 13);
        let floats = accessor(ComponentType::Float, ElementType::Scalar, 2);
        builder.add_accessor("bytes", AccessorId(0), &bytes).unwrap();
        builder.create_plain_buffer_view("view").unwrap();
        builder.add_accessor("floats", AccessorId(1), &floats).unwrap();
        let second = builder.create_plain_buffer_view("view").unwrap();
        let buffer = builder.create_buffer("buffer", None).unwrap();
        let structure = builder.build().unwrap();

        let padding: Vec<_> = structure.padding_bytes(buffer).unwrap().iter().copied().collect();
        assert_eq!(padding, vec![13, 14, 15]);
        assert_eq!(structure.buffer_view(second).unwrap().byte_offset, 16);
        assert_eq!(structure.buffer(buffer).unwrap().byte_length, 24);
        assert!(!structure.is_padding_byte(buffer, 12));
        assert!(!structure.is_padding_byte(buffer, 16));
        assert_eq!(structure.buffer_view_id(second), Some("view_0"));
    }

    #[test]
    fn test_padding_inside_view() {
        let mut builder = BufferStructureBuilder::new();
        let bytes = accessor(ComponentType::UnsignedByte, ElementType::Vec3, 1);
        let shorts = accessor(ComponentType::UnsignedShort, ElementType::Scalar, 2);
        builder.add_accessor("bytes", AccessorId(0), &bytes).unwrap();
        builder.add_accessor("shorts", AccessorId(1), &shorts).unwrap();
        builder.create_plain_buffer_view("view").unwrap();
        let buffer = builder.create_buffer("buffer", None).unwrap();
        let structure = builder.build().unwrap();

        assert_eq!(structure.packed_accessor(AccessorId(1)).unwrap().byte_offset, 4);
        assert!(structure.is_padding_byte(buffer, 3));
        assert_eq!(structure.padding_bytes(buffer).unwrap().len(), 1);
    }

    #[test]
    fn test_padding_indices_idempotent() {
        let mut builder = BufferStructureBuilder::new();
        builder.create_image_buffer_view("image", &[1, 2, 3]).unwrap();
        let buffer = builder.create_buffer("buffer", None).unwrap();
        builder.add_padding_byte_indices(buffer, 0, 2).unwrap();
        builder.add_padding_byte_indices(buffer, 1, 2).unwrap();
        let structure = builder.build().unwrap();

        assert_eq!(structure.padding_bytes(buffer).unwrap().len(), 3);
    }

    #[test]
    fn test_unknown_buffer_padding() {
        let mut builder = BufferStructureBuilder::new();
        let err = builder.add_padding_byte_indices(BufferId(4), 0, 1).unwrap_err();
        assert!(matches!(err, Error::UnknownElement { kind: "buffer", index: 4 }));
    }

    #[test]
    fn test_empty_groups_rejected() {
        let mut builder = BufferStructureBuilder::new();
        assert!(matches!(
            builder.create_plain_buffer_view("view"),
            Err(Error::EmptyBufferView { .. })
        ));
        assert!(matches!(
            builder.create_buffer("buffer", None),
            Err(Error::EmptyBuffer { .. })
        ));
    }

    #[test]
    fn test_build_with_pending_elements() {
        let mut builder = BufferStructureBuilder::new();
        let model = accessor(ComponentType::Float, ElementType::Scalar, 1);
        builder.add_accessor("a", AccessorId(0), &model).unwrap();
        builder.create_plain_buffer_view("view").unwrap();

        let err = builder.build().unwrap_err();
        assert!(matches!(
            err,
            Error::UncommittedElements {
                accessors: 0,
                buffer_views: 1
            }
        ));
    }

    #[test]
    fn test_views_grouped_per_buffer() {
        let mut builder = BufferStructureBuilder::new();
        let model = accessor(ComponentType::Float, ElementType::Scalar, 1);
        builder.add_accessor("a", AccessorId(0), &model).unwrap();
        let v0 = builder.create_plain_buffer_view("view").unwrap();
        let b0 = builder.create_buffer("buffer", Some("buffer0.bin".into())).unwrap();
        builder.add_accessor("a", AccessorId(1), &model).unwrap();
        let v1 = builder.create_plain_buffer_view("view").unwrap();
        let v2 = builder.create_image_buffer_view("image", &[0; 5]).unwrap();
        let b1 = builder.create_buffer("buffer", Some("buffer1.bin".into())).unwrap();
        let structure = builder.build().unwrap();

        assert_eq!(structure.buffer_views_of(b0), Some(&[v0][..]));
        assert_eq!(structure.buffer_views_of(b1), Some(&[v1, v2][..]));
        assert_eq!(structure.accessors_of(v1), Some(&[AccessorId(1)][..]));
        assert_eq!(structure.accessors_of(v2), Some(&[][..]));
        assert_eq!(structure.buffer_id(b1), Some("buffer_0"));
        assert_eq!(structure.buffer(b1).unwrap().uri.as_deref(), Some("buffer1.bin"));
        assert_eq!(structure.buffer_view_index(BufferViewId(9)), None);
        assert_eq!(structure.accessor_id(AccessorId(7)), None);
    }
}
