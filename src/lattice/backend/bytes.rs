use crate::lattice::types::element::Dtype;
use crate::lattice::types::error::Result;

use super::{Backend, check_byte_len};

/// Undecoded element bytes, in file byte order, with their logical shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArray {
    pub dtype: Dtype,
    pub shape: Vec<usize>,
    pub bytes: Vec<u8>,
}

/// Backend that skips decoding and hands back the stored bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesBackend;

impl Backend for BytesBackend {
    type Array = RawArray;

    fn from_bytes(&self, bytes: &[u8], dtype: Dtype, shape: &[usize]) -> Result<RawArray> {
        check_byte_len(bytes, dtype, shape)?;
        Ok(RawArray {
            dtype,
            shape: shape.to_vec(),
            bytes: bytes.to_vec(),
        })
    }

    fn nbytes(&self, array: &RawArray) -> usize {
        array.bytes.len()
    }
}
