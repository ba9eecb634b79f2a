//! Buffer contents of a packed model

use gltfkit_core::{Error, Result};
use gltfkit_model::{AccessorId, GltfModel};
use gltfkit_structure::BufferStructure;
use tracing::{debug, warn};

/// Produce the bytes of every buffer of `structure`
///
/// Accessor elements are written at their packed stride, images are copied
/// into their buffer views and all remaining bytes stay zero. Accessor or
/// image data shorter than the packed layout is copied as far as it goes.
pub fn assemble_buffers(model: &GltfModel, structure: &BufferStructure) -> Result<Vec<Vec<u8>>> {
    let mut buffers: Vec<Vec<u8>> = structure
        .buffers()
        .iter()
        .map(|b| vec![0; b.byte_length])
        .collect();

    for packed in structure.accessors() {
        let Some(view_id) = packed.buffer_view else {
            continue;
        };
        let view = structure
            .buffer_view(view_id)
            .ok_or_else(|| Error::unknown("buffer view", view_id.0))?;
        let buffer_id = view
            .buffer
            .ok_or_else(|| Error::invalid_data(format!("{} is not part of a buffer", view.id)))?;
        let buffer = buffers
            .get_mut(buffer_id.0)
            .ok_or_else(|| Error::unknown("buffer", buffer_id.0))?;
        let source = model
            .get_accessor(packed.accessor)
            .ok_or_else(|| Error::unknown("accessor", packed.accessor.0))?;

        let element_size = packed.padded_element_size;
        let expected = packed.count * element_size;
        if source.data.len() < expected {
            warn!(
                accessor = %packed.id,
                available = source.data.len(),
                expected,
                "Accessor data is shorter than its element count"
            );
        }

        let start = view.byte_offset + packed.byte_offset;
        for (index, element) in source.data.chunks(element_size).take(packed.count).enumerate() {
            let offset = start + index * packed.byte_stride;
            let target = buffer
                .get_mut(offset..offset + element.len())
                .ok_or_else(|| Error::invalid_data(format!("{} exceeds its buffer", packed.id)))?;
            target.copy_from_slice(element);
        }
    }

    for image in &model.images {
        let Some(view_id) = image.buffer_view else {
            continue;
        };
        let Some(view) = structure.buffer_view(view_id) else {
            warn!(view = %view_id, "Image refers to an unknown buffer view");
            continue;
        };
        let Some(buffer) = view.buffer.and_then(|b| buffers.get_mut(b.0)) else {
            continue;
        };
        let length = image.data.len().min(view.byte_length);
        if length < view.byte_length {
            warn!(view = %view.id, available = image.data.len(), "Image data is shorter than its buffer view");
        }
        let range = view.byte_offset..view.byte_offset + length;
        let target = buffer
            .get_mut(range)
            .ok_or_else(|| Error::invalid_data(format!("{} exceeds its buffer", view.id)))?;
        target.copy_from_slice(&image.data[..length]);
    }

    debug!(buffers = buffers.len(), "Assembled buffer data");
    Ok(buffers)
}

/// Read the elements of an accessor back out of assembled buffers
///
/// The result is tightly packed at the padded element size, the same layout
/// as [`AccessorModel::data`](gltfkit_model::AccessorModel::data).
pub fn extract_accessor_data(
    structure: &BufferStructure,
    buffers: &[Vec<u8>],
    accessor: AccessorId,
) -> Result<Vec<u8>> {
    let packed = structure
        .packed_accessor(accessor)
        .ok_or_else(|| Error::unknown("accessor", accessor.0))?;
    let view_id = packed
        .buffer_view
        .ok_or_else(|| Error::invalid_data(format!("{} is not part of a buffer view", packed.id)))?;
    let view = structure
        .buffer_view(view_id)
        .ok_or_else(|| Error::unknown("buffer view", view_id.0))?;
    let buffer = view
        .buffer
        .and_then(|b| buffers.get(b.0))
        .ok_or_else(|| Error::invalid_data(format!("no data for the buffer of {}", view.id)))?;

    let element_size = packed.padded_element_size;
    let start = view.byte_offset + packed.byte_offset;
    let mut data = Vec::with_capacity(packed.count * element_size);
    for index in 0..packed.count {
        let offset = start + index * packed.byte_stride;
        let element = buffer
            .get(offset..offset + element_size)
            .ok_or_else(|| Error::invalid_data(format!("{} exceeds its buffer", packed.id)))?;
        data.extend_from_slice(element);
    }
    Ok(data)
}
