use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, trace};

use super::backend::{Backend, ElementArray, NdarrayBackend};
use super::format::ildg::{self, IldgFormat};
use super::format::raw;
use super::layout::{StridedLayout, offset_overflow};
use super::types::element::{Dtype, ElementMetaData};
use super::types::error::Result;
use super::types::models::{Index, ReadStats};

/// A file layout a [`Reader`] can open.
pub trait FileFormat {
    /// A short name used for logging.
    const DEBUG_NAME: &'static str;

    /// Opens `path` without caching, returning a handle the caller owns.
    fn open(path: &Path, element: &ElementMetaData) -> Result<OpenedFile>;
}

/// Zero-cost marker for headerless raw files, read through a memory map.
#[derive(Debug)]
pub struct Raw;

impl FileFormat for Raw {
    const DEBUG_NAME: &'static str = "raw";

    fn open(path: &Path, element: &ElementMetaData) -> Result<OpenedFile> {
        raw::open(path, element)
    }
}

/// Zero-cost marker for ILDG/LIME containers, read with positioned reads.
#[derive(Debug)]
pub struct Ildg;

impl FileFormat for Ildg {
    const DEBUG_NAME: &'static str = "ILDG";

    fn open(path: &Path, element: &ElementMetaData) -> Result<OpenedFile> {
        ildg::open(path, element)
    }
}

/// How an opened file's data region is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The whole file is the array; each read maps it.
    Mapped,
    /// The array starts at `payload_offset`; each read opens, seeks and reads.
    Positioned { payload_offset: u64 },
}

/// The parsed layout of one file plus its read instrumentation.
#[derive(Debug)]
pub struct OpenedFile {
    path: PathBuf,
    layout: StridedLayout,
    dtype: Dtype,
    access: Access,
    descriptor: Option<IldgFormat>,
    stats: ReadStats,
}

impl OpenedFile {
    pub(crate) fn mapped(path: &Path, layout: StridedLayout, dtype: Dtype) -> Self {
        Self {
            path: path.to_path_buf(),
            layout,
            dtype,
            access: Access::Mapped,
            descriptor: None,
            stats: ReadStats::default(),
        }
    }

    pub(crate) fn positioned(
        path: &Path,
        layout: StridedLayout,
        dtype: Dtype,
        payload_offset: u64,
        descriptor: IldgFormat,
    ) -> Self {
        Self {
            path: path.to_path_buf(),
            layout,
            dtype,
            access: Access::Positioned { payload_offset },
            descriptor: Some(descriptor),
            stats: ReadStats::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> &StridedLayout {
        &self.layout
    }

    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    pub fn stride(&self) -> &[usize] {
        self.layout.stride()
    }

    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    pub fn element_bytes(&self) -> usize {
        self.layout.element_bytes()
    }

    pub fn access(&self) -> Access {
        self.access
    }

    /// Byte offset of the data region inside the file; zero for raw files.
    pub fn payload_offset(&self) -> u64 {
        match self.access {
            Access::Mapped => 0,
            Access::Positioned { payload_offset } => payload_offset,
        }
    }

    /// The ILDG format descriptor, for files opened as ILDG.
    pub fn descriptor(&self) -> Option<&IldgFormat> {
        self.descriptor.as_ref()
    }

    pub fn stats(&self) -> ReadStats {
        self.stats
    }

    /// Reads the sub-array selected by `index` as a typed `ndarray` array.
    ///
    /// See [`read_with`](Self::read_with).
    pub fn read(&mut self, index: impl Into<Index>) -> Result<ElementArray> {
        self.read_with(&NdarrayBackend, index)
    }

    /// Reads the sub-array selected by `index` through `backend`.
    ///
    /// `index` fixes the leading axes; the result has shape
    /// `shape[index.len()..]`. Elapsed time and returned bytes are added to
    /// [`stats`](Self::stats).
    ///
    /// # Errors
    /// - [`InvalidIndex`](crate::LatticeError::InvalidIndex) unless `1 <= index.len() <= ndim`.
    /// - Raw files: [`IndexOutOfBounds`](crate::LatticeError::IndexOutOfBounds) from the mapped slice.
    /// - ILDG files: index values are not checked; reading past the end of the
    ///   file fails with an `UnexpectedEof` I/O error, and an index whose byte
    ///   offset overflows with an `InvalidInput` one.
    pub fn read_with<B: Backend>(&mut self, backend: &B, index: impl Into<Index>) -> Result<B::Array> {
        let index = index.into();
        let index = index.as_slice();
        let started = Instant::now();

        let array = match self.access {
            Access::Mapped => backend.map_slice(&self.path, self.dtype, &self.layout, index)?,
            Access::Positioned { payload_offset } => {
                let offset = payload_offset
                    .checked_add(self.layout.byte_offset(index)?)
                    .ok_or_else(|| offset_overflow(index))?;
                backend.read_at(&self.path, self.dtype, offset, self.layout.sub_shape(index)?)?
            }
        };

        let elapsed = started.elapsed();
        let nbytes = backend.nbytes(&array);
        self.stats.record(elapsed, nbytes);
        trace!(
            "Read {:?} from {}: {} bytes in {:?}",
            index,
            self.path.display(),
            nbytes,
            elapsed
        );
        Ok(array)
    }
}

/// A reader holding at most one opened file.
///
/// Opening the path that is already held returns the held handle untouched,
/// even if different element metadata is passed. Opening any other path drops
/// the held handle first.
#[derive(Debug)]
pub struct Reader<F: FileFormat> {
    current: Option<OpenedFile>,
    _format: PhantomData<F>,
}

/// Reader for headerless raw files.
pub type RawFile = Reader<Raw>;
/// Reader for ILDG/LIME containers.
pub type IldgFile = Reader<Ildg>;

impl<F: FileFormat> Default for Reader<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FileFormat> Reader<F> {
    pub fn new() -> Self {
        Self {
            current: None,
            _format: PhantomData,
        }
    }

    /// Returns the handle for `path`, opening it unless it is already held.
    ///
    /// On a cache hit `element` is ignored. If opening fails the reader is
    /// left holding nothing.
    pub fn open(&mut self, path: impl AsRef<Path>, element: &ElementMetaData) -> Result<&mut OpenedFile> {
        let path = path.as_ref();
        let file = match self.current.take() {
            Some(file) if file.path() == path => {
                trace!("{} cache hit: {}", F::DEBUG_NAME, path.display());
                file
            }
            stale => {
                if let Some(old) = stale {
                    debug!("{} cache: replacing {} with {}", F::DEBUG_NAME, old.path().display(), path.display());
                }
                F::open(path, element)?
            }
        };
        Ok(self.current.insert(file))
    }

    /// The currently held handle, if any.
    pub fn current(&self) -> Option<&OpenedFile> {
        self.current.as_ref()
    }

    /// Releases the held handle to the caller.
    pub fn close(&mut self) -> Option<OpenedFile> {
        self.current.take()
    }
}
