//! # lattice-reader
//!
//! Random-access readers for lattice field data stored either as headerless
//! raw binary files or as ILDG/LIME containers.
//!
//! A caller declares the shape and dtype of the stored array, opens a file,
//! and reads sub-arrays by fixing leading indices:
//!
//! ```no_run
//! use lattice_reader::{ElementMetaData, IldgFile};
//!
//! let element = ElementMetaData::new(vec![128, 4096, 4, 3, 3], ">c16", 0)?;
//! let mut reader = IldgFile::new();
//! let file = reader.open("conf/cfg_1000.lime", &element)?;
//! let timeslice = file.read(3usize)?; // shape [4096, 4, 3, 3]
//! # Ok::<(), lattice_reader::LatticeError>(())
//! ```
pub mod lattice;

// Re-export the main types for convenience
pub use lattice::{
    backend::{Backend, BytesBackend, Element, ElementArray, NdarrayBackend, RawArray},
    format::{
        ildg::{IldgFormat, ILDG_BINARY_DATA, ILDG_FORMAT},
        lime::{LimeContainer, LimeRecord, LIME_MAGIC},
    },
    gauge::{GaugeField, GaugeFieldConfig},
    layout::StridedLayout,
    reader::{Access, FileFormat, Ildg, IldgFile, OpenedFile, Raw, RawFile, Reader},
    types::{
        element::{Dtype, ElementMetaData, Endianness, ScalarKind},
        error::{ErrorKind, LatticeError, Result},
        models::{Index, ReadStats},
    },
};
