//! Small value types shared by the readers.

use std::time::Duration;

/// A partial multidimensional index: values for the leading axes of a layout.
///
/// A single integer is treated as a one-element index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index(Vec<usize>);

impl Index {
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<usize> for Index {
    fn from(i: usize) -> Self {
        Self(vec![i])
    }
}

impl From<Vec<usize>> for Index {
    fn from(v: Vec<usize>) -> Self {
        Self(v)
    }
}

impl From<&[usize]> for Index {
    fn from(v: &[usize]) -> Self {
        Self(v.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Index {
    fn from(v: [usize; N]) -> Self {
        Self(v.to_vec())
    }
}

/// Cumulative read instrumentation for one opened file.
///
/// Informational only; nothing in the crate branches on these values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Wall-clock time spent inside reads.
    pub elapsed: Duration,
    /// Bytes returned to the caller.
    pub bytes: u64,
    pub reads: u64,
}

impl ReadStats {
    pub(crate) fn record(&mut self, elapsed: Duration, bytes: usize) {
        self.elapsed += elapsed;
        self.bytes += bytes as u64;
        self.reads += 1;
    }
}
