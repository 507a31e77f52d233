//! Raw binary files: no header, row-major elements of an out-of-band shape and dtype.

use std::path::Path;

use log::info;

use crate::lattice::layout::StridedLayout;
use crate::lattice::reader::OpenedFile;
use crate::lattice::types::element::ElementMetaData;
use crate::lattice::types::error::Result;

/// Builds the handle for a raw file. No I/O happens until the first read,
/// which maps the file.
pub(crate) fn open(path: &Path, element: &ElementMetaData) -> Result<OpenedFile> {
    info!(
        "Opening raw file: {} (shape {:?}, dtype {})",
        path.display(),
        element.shape(),
        element.dtype()
    );
    let layout = StridedLayout::new(element.shape(), element.dtype().width())?;
    Ok(OpenedFile::mapped(path, layout, element.dtype()))
}
