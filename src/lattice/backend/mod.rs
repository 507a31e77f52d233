//! Array backends: turning located bytes into caller-facing arrays.
//!
//! The readers only compute *where* data lives. A [`Backend`] decides how the
//! bytes are fetched and what array type comes back.
//!
//! - [`NdarrayBackend`]: decodes into typed `ndarray` arrays ([`ElementArray`]).
//! - [`BytesBackend`]: returns the undecoded bytes with their shape ([`RawArray`]).

use std::io;
use std::path::Path;

use crate::lattice::layout::StridedLayout;
use crate::lattice::storage;
use crate::lattice::types::element::Dtype;
use crate::lattice::types::error::{LatticeError, Result};

mod bytes;
mod typed;

pub use bytes::{BytesBackend, RawArray};
pub use typed::{Element, ElementArray, NdarrayBackend};

/// Capability interface for array construction.
///
/// Implementors provide decoding; memory-mapped and positioned access come
/// with default implementations on top of [`storage`](crate::lattice::storage).
pub trait Backend {
    /// The array type handed back to callers.
    type Array;

    /// Builds an array of `shape` from exactly `product(shape) * dtype.width()` bytes.
    fn from_bytes(&self, bytes: &[u8], dtype: Dtype, shape: &[usize]) -> Result<Self::Array>;

    /// Size in bytes of the array's element data.
    fn nbytes(&self, array: &Self::Array) -> usize;

    /// Maps `path` as a read-only array of `layout`'s full shape and returns the
    /// sub-array selected by `index`.
    ///
    /// # Errors
    /// - `Io(UnexpectedEof)` if the file is smaller than the declared shape.
    /// - [`LatticeError::IndexOutOfBounds`] for an index outside the shape.
    fn map_slice(&self, path: &Path, dtype: Dtype, layout: &StridedLayout, index: &[usize]) -> Result<Self::Array> {
        let map = storage::map_readonly(path)?;
        if (map.len() as u64) < layout.total_bytes() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "{} holds {} bytes but the declared shape {:?} needs {}",
                    path.display(),
                    map.len(),
                    layout.shape(),
                    layout.total_bytes()
                ),
            )
            .into());
        }
        layout.check_bounds(index)?;

        let start = layout.byte_offset(index)? as usize;
        let end = start + layout.byte_count(index)?;
        self.from_bytes(&map[start..end], dtype, layout.sub_shape(index)?)
    }

    /// Reads `product(shape)` elements starting at absolute byte `offset` and
    /// shapes them as `shape`. Each call opens and closes the file.
    fn read_at(&self, path: &Path, dtype: Dtype, offset: u64, shape: &[usize]) -> Result<Self::Array> {
        let count: usize = shape.iter().product();
        let bytes = storage::read_exact_at(path, offset, count * dtype.width())?;
        self.from_bytes(&bytes, dtype, shape)
    }
}

/// Checks that `bytes` holds exactly the elements `shape` calls for.
pub(crate) fn check_byte_len(bytes: &[u8], dtype: Dtype, shape: &[usize]) -> Result<()> {
    let expected = shape.iter().product::<usize>() * dtype.width();
    if bytes.len() != expected {
        return Err(LatticeError::SizeMismatch {
            context: "array buffer",
            expected: expected as u64,
            found: bytes.len() as u64,
        });
    }
    Ok(())
}
