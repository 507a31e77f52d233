//! Typed decoding into `ndarray` arrays.

use std::mem::size_of;

use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian};
use ndarray::{ArrayD, IxDyn};
use num_complex::{Complex, Complex32, Complex64};

use crate::lattice::types::element::{Dtype, Endianness, ScalarKind};
use crate::lattice::types::error::{LatticeError, Result};

use super::{Backend, check_byte_len};

/// A decoded array whose element type is only known at runtime.
///
/// Values are always in host byte order; the dtype's byte order only affects decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementArray {
    I8(ArrayD<i8>),
    I16(ArrayD<i16>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    U32(ArrayD<u32>),
    U64(ArrayD<u64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    C64(ArrayD<Complex32>),
    C128(ArrayD<Complex64>),
}

macro_rules! each_variant {
    ($array:expr, $a:ident => $body:expr) => {
        match $array {
            ElementArray::I8($a) => $body,
            ElementArray::I16($a) => $body,
            ElementArray::I32($a) => $body,
            ElementArray::I64($a) => $body,
            ElementArray::U8($a) => $body,
            ElementArray::U16($a) => $body,
            ElementArray::U32($a) => $body,
            ElementArray::U64($a) => $body,
            ElementArray::F32($a) => $body,
            ElementArray::F64($a) => $body,
            ElementArray::C64($a) => $body,
            ElementArray::C128($a) => $body,
        }
    };
}

fn nbytes_of<T>(array: &ArrayD<T>) -> usize {
    array.len() * size_of::<T>()
}

impl ElementArray {
    pub fn shape(&self) -> &[usize] {
        each_variant!(self, a => a.shape())
    }

    pub fn len(&self) -> usize {
        each_variant!(self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the element data in bytes.
    pub fn nbytes(&self) -> usize {
        each_variant!(self, a => nbytes_of(a))
    }

    /// Borrows the array as `ArrayD<T>` if `T` is its element type.
    pub fn view<T: Element>(&self) -> Option<&ArrayD<T>> {
        T::from_array(self)
    }

    /// Unwraps into `ArrayD<T>`, or gives the array back on a type mismatch.
    pub fn into_typed<T: Element>(self) -> std::result::Result<ArrayD<T>, Self> {
        T::into_array(self)
    }
}

/// Scalar types an [`ElementArray`] can hold.
pub trait Element: Sized {
    fn from_array(array: &ElementArray) -> Option<&ArrayD<Self>>;
    fn into_array(array: ElementArray) -> std::result::Result<ArrayD<Self>, ElementArray>;
}

macro_rules! impl_element {
    ($($variant:ident => $t:ty),* $(,)?) => {
        $(
            impl Element for $t {
                fn from_array(array: &ElementArray) -> Option<&ArrayD<Self>> {
                    match array {
                        ElementArray::$variant(a) => Some(a),
                        _ => None,
                    }
                }

                fn into_array(array: ElementArray) -> std::result::Result<ArrayD<Self>, ElementArray> {
                    match array {
                        ElementArray::$variant(a) => Ok(a),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_element! {
    I8 => i8,
    I16 => i16,
    I32 => i32,
    I64 => i64,
    U8 => u8,
    U16 => u16,
    U32 => u32,
    U64 => u64,
    F32 => f32,
    F64 => f64,
    C64 => Complex32,
    C128 => Complex64,
}

/// Backend decoding into [`ElementArray`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NdarrayBackend;

impl Backend for NdarrayBackend {
    type Array = ElementArray;

    fn from_bytes(&self, bytes: &[u8], dtype: Dtype, shape: &[usize]) -> Result<ElementArray> {
        check_byte_len(bytes, dtype, shape)?;
        match dtype.endianness {
            Endianness::Big => decode::<BigEndian>(bytes, dtype, shape),
            Endianness::Little => decode::<LittleEndian>(bytes, dtype, shape),
            Endianness::Native => decode::<NativeEndian>(bytes, dtype, shape),
        }
    }

    fn nbytes(&self, array: &ElementArray) -> usize {
        array.nbytes()
    }
}

fn decode<O: ByteOrder>(bytes: &[u8], dtype: Dtype, shape: &[usize]) -> Result<ElementArray> {
    let n = bytes.len() / dtype.width();
    let array = match (dtype.kind, dtype.width()) {
        (ScalarKind::Int, 1) => ElementArray::I8(shaped(shape, bytes.iter().map(|&b| b as i8).collect())?),
        (ScalarKind::Int, 2) => ElementArray::I16(shaped(shape, read_into(bytes, n, O::read_i16_into))?),
        (ScalarKind::Int, 4) => ElementArray::I32(shaped(shape, read_into(bytes, n, O::read_i32_into))?),
        (ScalarKind::Int, 8) => ElementArray::I64(shaped(shape, read_into(bytes, n, O::read_i64_into))?),
        (ScalarKind::UInt, 1) => ElementArray::U8(shaped(shape, bytes.to_vec())?),
        (ScalarKind::UInt, 2) => ElementArray::U16(shaped(shape, read_into(bytes, n, O::read_u16_into))?),
        (ScalarKind::UInt, 4) => ElementArray::U32(shaped(shape, read_into(bytes, n, O::read_u32_into))?),
        (ScalarKind::UInt, 8) => ElementArray::U64(shaped(shape, read_into(bytes, n, O::read_u64_into))?),
        (ScalarKind::Float, 4) => ElementArray::F32(shaped(shape, read_into(bytes, n, O::read_f32_into))?),
        (ScalarKind::Float, 8) => ElementArray::F64(shaped(shape, read_into(bytes, n, O::read_f64_into))?),
        // Complex elements are (re, im) float pairs.
        (ScalarKind::Complex, 8) => {
            ElementArray::C64(shaped(shape, pairs(read_into(bytes, 2 * n, O::read_f32_into)))?)
        }
        (ScalarKind::Complex, 16) => {
            ElementArray::C128(shaped(shape, pairs(read_into(bytes, 2 * n, O::read_f64_into)))?)
        }
        _ => return Err(LatticeError::InvalidDtype(dtype.to_string())),
    };
    Ok(array)
}

fn read_into<T: Copy + Default>(bytes: &[u8], n: usize, read: fn(&[u8], &mut [T])) -> Vec<T> {
    let mut out = vec![T::default(); n];
    read(bytes, &mut out);
    out
}

fn pairs<T: Copy>(flat: Vec<T>) -> Vec<Complex<T>> {
    flat.chunks_exact(2).map(|c| Complex::new(c[0], c[1])).collect()
}

fn shaped<T>(shape: &[usize], data: Vec<T>) -> Result<ArrayD<T>> {
    ArrayD::from_shape_vec(IxDyn(shape), data).map_err(|e| LatticeError::InvalidShape(e.to_string()))
}
