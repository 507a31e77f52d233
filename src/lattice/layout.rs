//! Offset and count arithmetic over a row-major shape.
//!
//! Both file formats address data the same way: fixing `k` leading indices of
//! a shape `[d0, .., dn-1]` selects a contiguous block of `stride[k-1]`
//! elements. Only the container offset differs between the formats.

use std::io;

use crate::lattice::types::error::{LatticeError, Result};

/// Row-major strides for a fixed shape and element width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StridedLayout {
    shape: Vec<usize>,
    stride: Vec<usize>,
    element_bytes: usize,
}

impl StridedLayout {
    /// Builds the layout; `stride[last] = 1` and `stride[i] = shape[i+1] * stride[i+1]`.
    ///
    /// # Errors
    /// [`LatticeError::InvalidShape`] if the total byte size does not fit in `usize`.
    pub fn new(shape: &[usize], element_bytes: usize) -> Result<Self> {
        let too_large = || LatticeError::InvalidShape(format!("shape {:?} is too large to address", shape));

        let mut stride = vec![1usize; shape.len()];
        for i in (0..shape.len().saturating_sub(1)).rev() {
            stride[i] = shape[i + 1].checked_mul(stride[i + 1]).ok_or_else(too_large)?;
        }
        // Every offset and count derived later is bounded by this product.
        let total = match shape.first() {
            Some(&d) => d.checked_mul(stride[0]),
            None => Some(1),
        };
        total
            .and_then(|n| n.checked_mul(element_bytes))
            .ok_or_else(too_large)?;

        Ok(Self {
            shape: shape.to_vec(),
            stride,
            element_bytes,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn stride(&self) -> &[usize] {
        &self.stride
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn element_bytes(&self) -> usize {
        self.element_bytes
    }

    pub fn total_elements(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn total_bytes(&self) -> u64 {
        (self.total_elements() * self.element_bytes) as u64
    }

    /// Number of elements in the sub-array left after fixing `index.len()` leading axes.
    ///
    /// # Errors
    /// [`LatticeError::InvalidIndex`] unless `1 <= index.len() <= ndim`.
    pub fn element_count(&self, index: &[usize]) -> Result<usize> {
        self.check_rank(index)?;
        Ok(self.stride[index.len() - 1])
    }

    /// Byte offset of the selected sub-array relative to the start of the data region.
    ///
    /// Index values are not checked against the shape.
    ///
    /// # Errors
    /// - [`LatticeError::InvalidIndex`] unless `1 <= index.len() <= ndim`.
    /// - An `InvalidInput` I/O error if the offset does not fit in a `u64`.
    pub fn byte_offset(&self, index: &[usize]) -> Result<u64> {
        self.check_rank(index)?;
        index
            .iter()
            .zip(&self.stride)
            .try_fold(0u64, |acc, (&i, &s)| {
                (i as u64)
                    .checked_mul(s as u64)
                    .and_then(|n| n.checked_mul(self.element_bytes as u64))
                    .and_then(|n| acc.checked_add(n))
            })
            .ok_or_else(|| offset_overflow(index))
    }

    /// Number of bytes spanned by the selected sub-array.
    pub fn byte_count(&self, index: &[usize]) -> Result<usize> {
        Ok(self.element_count(index)? * self.element_bytes)
    }

    /// Shape of the selected sub-array: the axes not fixed by `index`.
    pub fn sub_shape(&self, index: &[usize]) -> Result<&[usize]> {
        self.check_rank(index)?;
        Ok(&self.shape[index.len()..])
    }

    /// Checks every index component against its axis extent.
    pub fn check_bounds(&self, index: &[usize]) -> Result<()> {
        self.check_rank(index)?;
        match index
            .iter()
            .zip(&self.shape)
            .position(|(i, len)| i >= len)
        {
            Some(axis) => Err(LatticeError::IndexOutOfBounds {
                axis,
                index: index[axis],
                len: self.shape[axis],
            }),
            None => Ok(()),
        }
    }

    fn check_rank(&self, index: &[usize]) -> Result<()> {
        if index.is_empty() || index.len() > self.shape.len() {
            return Err(LatticeError::InvalidIndex {
                len: index.len(),
                ndim: self.shape.len(),
            });
        }
        Ok(())
    }
}

/// The error for an index whose byte offset cannot be represented.
pub(crate) fn offset_overflow(index: &[usize]) -> LatticeError {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("index {:?} addresses a byte offset beyond u64::MAX", index),
    )
    .into()
}
