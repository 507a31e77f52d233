//! Low-level storage primitives: read-only memory maps and positioned reads.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use log::trace;
use memmap2::Mmap;

use crate::lattice::types::error::Result;

/// Maps the whole file read-only.
///
/// The returned map is only sound while no other process truncates or
/// rewrites the file.
pub fn map_readonly(path: &Path) -> Result<Mmap> {
    let file = File::open(path)?;
    // SAFETY: the file is opened read-only and the map never outlives a single
    // read call; files are assumed not to be modified while being read.
    let map = unsafe { Mmap::map(&file)? };
    trace!("Mapped {} ({} bytes)", path.display(), map.len());
    Ok(map)
}

/// Opens `path`, reads exactly `len` bytes at `offset` and closes it again.
///
/// A read past the end of the file surfaces as `io::ErrorKind::UnexpectedEof`.
pub fn read_exact_at(path: &Path, offset: u64, len: usize) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; len];
    file.read_exact(&mut buf)?;
    Ok(buf)
}

/// Fills `buf` as far as the stream allows and returns how many bytes were read.
///
/// Unlike `read_exact`, hitting end-of-stream is not an error; callers decide
/// whether a short read is a clean end or a truncation.
pub fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
