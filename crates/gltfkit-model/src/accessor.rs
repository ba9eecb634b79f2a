//! Accessors: typed arrays of numeric elements

use gltfkit_core::{ComponentType, ElementType};
use serde::{Deserialize, Serialize};

use crate::ids::BufferViewId;

/// A typed, strided array of elements
///
/// `data` always holds the elements tightly packed at
/// [`padded_element_size_in_bytes`](Self::padded_element_size_in_bytes).
/// `byte_offset`, `byte_stride` and `buffer_view` describe where the
/// elements live once the accessor has been packed into a buffer view;
/// a nonzero `byte_stride` on an unpacked accessor is a requested stride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessorModel {
    pub name: Option<String>,
    pub component_type: ComponentType,
    pub element_type: ElementType,
    pub count: usize,
    pub normalized: bool,
    pub byte_offset: usize,
    /// 0 means tightly packed
    pub byte_stride: usize,
    pub buffer_view: Option<BufferViewId>,
    pub min: Option<Vec<f64>>,
    pub max: Option<Vec<f64>>,
    pub data: Vec<u8>,
}

impl AccessorModel {
    /// Create an accessor of `count` zeroed elements
    pub fn new(component_type: ComponentType, element_type: ElementType, count: usize) -> Self {
        let mut accessor = Self::from_data(component_type, element_type, Vec::new());
        accessor.data = vec![0; count * accessor.padded_element_size_in_bytes()];
        accessor.count = count;
        accessor
    }

    /// Create an accessor over raw element bytes
    ///
    /// The element count is derived from the data length.
    pub fn from_data(component_type: ComponentType, element_type: ElementType, data: Vec<u8>) -> Self {
        let mut accessor = Self {
            name: None,
            component_type,
            element_type,
            count: 0,
            normalized: false,
            byte_offset: 0,
            byte_stride: 0,
            buffer_view: None,
            min: None,
            max: None,
            data,
        };
        let element_size = accessor.padded_element_size_in_bytes();
        accessor.count = accessor.data.len() / element_size;
        accessor
    }

    /// Create an accessor from plain-old-data elements, e.g. `&[[f32; 3]]`
    pub fn from_elements<T: bytemuck::Pod>(
        component_type: ComponentType,
        element_type: ElementType,
        elements: &[T],
    ) -> Self {
        Self::from_data(
            component_type,
            element_type,
            bytemuck::cast_slice(elements).to_vec(),
        )
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Request a byte stride for the packed layout
    pub fn with_byte_stride(mut self, byte_stride: usize) -> Self {
        self.byte_stride = byte_stride;
        self
    }

    pub fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    pub fn component_size_in_bytes(&self) -> usize {
        self.component_type.size_in_bytes()
    }

    /// Unpadded size of one element
    pub fn element_size_in_bytes(&self) -> usize {
        self.element_type.component_count() * self.component_size_in_bytes()
    }

    /// Size of one element with every matrix column padded to 4 bytes
    pub fn padded_element_size_in_bytes(&self) -> usize {
        match self.element_type.matrix_columns() {
            Some(columns) => {
                let column_size = columns * self.component_size_in_bytes();
                let padded_column_size = (column_size + 3) / 4 * 4;
                padded_column_size * columns
            }
            None => self.element_size_in_bytes(),
        }
    }

    /// Distance between two elements in the packed layout
    pub fn effective_byte_stride(&self) -> usize {
        if self.byte_stride == 0 {
            self.padded_element_size_in_bytes()
        } else {
            self.byte_stride
        }
    }

    /// The bytes of element `index` in `data`
    pub fn element_bytes(&self, index: usize) -> Option<&[u8]> {
        let size = self.padded_element_size_in_bytes();
        let start = index.checked_mul(size)?;
        self.data.get(start..start + size)
    }
}
