//! Alignment arithmetic for packing accessors into buffer views
//!
//! Every accessor must start at a multiple of its component size, both
//! inside its buffer view and inside its buffer. A buffer view holding
//! several accessors therefore has to be aligned to the least common
//! multiple of their component sizes.

use gltfkit_model::AccessorModel;

/// Size information the alignment rules need from an accessor
pub trait AccessorLayout {
    fn component_size_in_bytes(&self) -> usize;

    fn padded_element_size_in_bytes(&self) -> usize;

    /// Stride requested by the accessor itself, 0 for none
    fn requested_byte_stride(&self) -> usize;
}

impl AccessorLayout for AccessorModel {
    fn component_size_in_bytes(&self) -> usize {
        AccessorModel::component_size_in_bytes(self)
    }

    fn padded_element_size_in_bytes(&self) -> usize {
        AccessorModel::padded_element_size_in_bytes(self)
    }

    fn requested_byte_stride(&self) -> usize {
        self.byte_stride
    }
}

impl<T: AccessorLayout + ?Sized> AccessorLayout for &T {
    fn component_size_in_bytes(&self) -> usize {
        (**self).component_size_in_bytes()
    }

    fn padded_element_size_in_bytes(&self) -> usize {
        (**self).padded_element_size_in_bytes()
    }

    fn requested_byte_stride(&self) -> usize {
        (**self).requested_byte_stride()
    }
}

/// Required alignment of a single accessor
pub fn alignment_of<A: AccessorLayout + ?Sized>(accessor: &A) -> usize {
    accessor.component_size_in_bytes()
}

/// Alignment satisfying every given accessor
///
/// This is the least common multiple of the individual alignments, and 1
/// for no accessors.
pub fn common_alignment<A, I>(accessors: I) -> usize
where
    A: AccessorLayout,
    I: IntoIterator<Item = A>,
{
    accessors
        .into_iter()
        .fold(1, |acc, accessor| lcm(acc, alignment_of(&accessor)))
}

/// Byte stride shared by all given accessors
pub fn common_byte_stride<A, I>(accessors: I) -> usize
where
    A: AccessorLayout,
    I: IntoIterator<Item = A>,
{
    accessors.into_iter().fold(1, |acc, accessor| {
        acc.max(accessor.padded_element_size_in_bytes())
            .max(accessor.requested_byte_stride())
    })
}

/// Byte stride shared by vertex attributes, a multiple of 4
pub fn common_vertex_attribute_byte_stride<A, I>(accessors: I) -> usize
where
    A: AccessorLayout,
    I: IntoIterator<Item = A>,
{
    pad(common_byte_stride(accessors), 4)
}

/// Bytes to add to `size` to reach a multiple of `alignment`
pub fn padding(size: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return 0;
    }
    (alignment - size % alignment) % alignment
}

/// `size` rounded up to a multiple of `alignment`
pub fn pad(size: usize, alignment: usize) -> usize {
    size + padding(size, alignment)
}

pub fn gcd(a: usize, b: usize) -> usize {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Least common multiple, with `lcm(0, n) == n`
pub fn lcm(a: usize, b: usize) -> usize {
    if a == 0 {
        return b;
    }
    if b == 0 {
        return a;
    }
    a / gcd(a, b) * b
}
