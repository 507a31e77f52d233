//! Element metadata: the out-of-band description of how one stored array is laid out.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use super::error::{LatticeError, Result};
use crate::lattice::layout::StridedLayout;

/// Compiled dtype pattern: optional byte-order marker, kind character, byte width.
static DTYPE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn dtype_regex() -> &'static Regex {
    DTYPE_PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<order>[<>=])?(?P<kind>[iufc])(?P<bytes>\d+)$").expect("Invalid dtype regex pattern")
    })
}

/// Byte order of the stored scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
    /// No marker, or `=`: the byte order of the host.
    Native,
}

/// Numeric kind of a stored element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Int,
    UInt,
    Float,
    /// A pair of floats, each half the element width.
    Complex,
}

/// A parsed dtype code such as `">c16"` or `"f4"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dtype {
    pub endianness: Endianness,
    pub kind: ScalarKind,
    width: usize,
}

impl Dtype {
    /// Parses a dtype code.
    ///
    /// # Errors
    /// Returns [`LatticeError::InvalidDtype`] if the code does not match
    /// `[<>=]?[iufc]<digits>` or names a width this crate cannot decode.
    pub fn parse(code: &str) -> Result<Self> {
        let caps = dtype_regex()
            .captures(code)
            .ok_or_else(|| LatticeError::InvalidDtype(code.to_string()))?;

        let endianness = match caps.name("order").map(|m| m.as_str()) {
            Some("<") => Endianness::Little,
            Some(">") => Endianness::Big,
            _ => Endianness::Native,
        };
        let kind = match &caps["kind"] {
            "i" => ScalarKind::Int,
            "u" => ScalarKind::UInt,
            "f" => ScalarKind::Float,
            _ => ScalarKind::Complex,
        };
        let width: usize = caps["bytes"]
            .parse()
            .map_err(|_| LatticeError::InvalidDtype(code.to_string()))?;

        let supported = match kind {
            ScalarKind::Int | ScalarKind::UInt => matches!(width, 1 | 2 | 4 | 8),
            ScalarKind::Float => matches!(width, 4 | 8),
            ScalarKind::Complex => matches!(width, 8 | 16),
        };
        if !supported {
            return Err(LatticeError::InvalidDtype(code.to_string()));
        }

        Ok(Self { endianness, kind, width })
    }

    /// Size of one element in bytes.
    pub fn width(&self) -> usize {
        self.width
    }
}

impl FromStr for Dtype {
    type Err = LatticeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = match self.endianness {
            Endianness::Little => "<",
            Endianness::Big => ">",
            Endianness::Native => "=",
        };
        let kind = match self.kind {
            ScalarKind::Int => 'i',
            ScalarKind::UInt => 'u',
            ScalarKind::Float => 'f',
            ScalarKind::Complex => 'c',
        };
        write!(f, "{}{}{}", order, kind, self.width)
    }
}

/// Describes one logical array stored in a file: its shape, element dtype and
/// a format-specific local offset.
///
/// Construction validates eagerly, so a bad dtype is reported before any I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementMetaData {
    shape: Vec<usize>,
    dtype: Dtype,
    /// Local displacement. Carried for completeness; no reader consumes it.
    offset: u64,
}

impl ElementMetaData {
    /// # Errors
    /// - [`LatticeError::InvalidDtype`] if `dtype` cannot be parsed.
    /// - [`LatticeError::InvalidShape`] if `shape` is empty, has a zero extent,
    ///   or spans more bytes than can be addressed.
    pub fn new(shape: impl Into<Vec<usize>>, dtype: &str, offset: u64) -> Result<Self> {
        let dtype = Dtype::parse(dtype)?;
        let shape = shape.into();
        if shape.is_empty() {
            return Err(LatticeError::InvalidShape("shape must have at least one dimension".to_string()));
        }
        if let Some(axis) = shape.iter().position(|&d| d == 0) {
            return Err(LatticeError::InvalidShape(format!("axis {} has zero extent", axis)));
        }
        StridedLayout::new(&shape, dtype.width())?;
        Ok(Self { shape, dtype, offset })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}
