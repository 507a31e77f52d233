//! ILDG files: a LIME container holding an XML format descriptor and one binary payload.
//!
//! Of the descriptor only `precision` is required; it must agree with the
//! declared element width, and the payload must hold exactly the declared
//! number of elements.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::{debug, info, warn};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::lattice::format::lime::{self, LimeContainer, LimeRecord};
use crate::lattice::layout::StridedLayout;
use crate::lattice::reader::OpenedFile;
use crate::lattice::types::element::ElementMetaData;
use crate::lattice::types::error::{LatticeError, Result};

/// Name of the record carrying the XML format descriptor.
pub const ILDG_FORMAT: &str = "ildg-format";
/// Name of the record carrying the lattice data.
pub const ILDG_BINARY_DATA: &str = "ildg-binary-data";

/// The parsed `ildg-format` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IldgFormat {
    pub version: Option<String>,
    /// Field type, e.g. `su3gauge`.
    pub field: Option<String>,
    /// Bits per floating-point component.
    pub precision: u32,
    /// Lattice extents `[lx, ly, lz, lt]`, when all four are present.
    pub lattice: Option<[usize; 4]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Version,
    Field,
    Precision,
    Lx,
    Ly,
    Lz,
    Lt,
}

impl Tag {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"version" => Some(Self::Version),
            b"field" => Some(Self::Field),
            b"precision" => Some(Self::Precision),
            b"lx" => Some(Self::Lx),
            b"ly" => Some(Self::Ly),
            b"lz" => Some(Self::Lz),
            b"lt" => Some(Self::Lt),
            _ => None,
        }
    }
}

impl IldgFormat {
    /// Parses the descriptor XML.
    ///
    /// An element is read only if it lives in the same namespace as the root
    /// element, whatever prefix the document uses for it.
    ///
    /// # Errors
    /// - [`LatticeError::Xml`] for malformed XML.
    /// - [`LatticeError::InvalidFormat`] if `precision` is missing or not an integer.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut root_ns: Option<Option<Vec<u8>>> = None;
        let mut current: Option<Tag> = None;
        let mut values: Vec<(Tag, String)> = Vec::new();

        loop {
            let (ns, event) = reader.read_resolved_event()?;
            match event {
                Event::Start(e) => {
                    let ns = owned_namespace(ns)?;
                    if root_ns.is_none() {
                        root_ns = Some(ns);
                    } else if root_ns.as_ref() == Some(&ns) {
                        current = Tag::from_local_name(e.local_name().as_ref());
                    } else {
                        current = None;
                    }
                }
                Event::Empty(_) if root_ns.is_none() => root_ns = Some(owned_namespace(ns)?),
                Event::Text(t) => {
                    if let Some(tag) = current {
                        values.push((tag, t.unescape()?.trim().to_string()));
                    }
                }
                Event::End(_) => current = None,
                Event::Eof => break,
                _ => {}
            }
        }

        let value = |tag: Tag| {
            values
                .iter()
                .rev()
                .find(|(t, _)| *t == tag)
                .map(|(_, v)| v.as_str())
        };

        let precision = value(Tag::Precision)
            .ok_or_else(|| LatticeError::InvalidFormat("ILDG format descriptor has no precision element".to_string()))?;
        let precision: u32 = precision
            .parse()
            .map_err(|_| LatticeError::InvalidFormat(format!("Invalid ILDG precision '{}'", precision)))?;

        let extent = |tag: Tag| value(tag).and_then(|v| v.parse::<usize>().ok());
        let lattice = match (extent(Tag::Lx), extent(Tag::Ly), extent(Tag::Lz), extent(Tag::Lt)) {
            (Some(lx), Some(ly), Some(lz), Some(lt)) => Some([lx, ly, lz, lt]),
            _ => None,
        };

        Ok(Self {
            version: value(Tag::Version).map(str::to_string),
            field: value(Tag::Field).map(str::to_string),
            precision,
            lattice,
        })
    }

    /// Bytes per complex element: two floats of `precision` bits.
    pub fn element_bytes(&self) -> usize {
        (self.precision / 8 * 2) as usize
    }

    /// Number of lattice sites, if the extents are known.
    pub fn sites(&self) -> Option<usize> {
        self.lattice
            .and_then(|l| l.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d)))
    }
}

fn owned_namespace(ns: ResolveResult<'_>) -> Result<Option<Vec<u8>>> {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => Ok(Some(uri.to_vec())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(LatticeError::InvalidFormat(format!(
            "Undeclared namespace prefix '{}' in ILDG format descriptor",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

/// Everything an ILDG open needs from the container.
#[derive(Debug, Clone)]
pub struct IldgMetadata {
    pub container: LimeContainer,
    pub format: IldgFormat,
    pub data: LimeRecord,
}

/// Scans the container and parses the format descriptor.
///
/// # Errors
/// Any scan error, [`LatticeError::MissingRecord`] if either ILDG record is
/// absent, or a descriptor parse error.
pub fn read_metadata<R: Read + Seek>(reader: &mut R) -> Result<IldgMetadata> {
    let container = lime::scan(reader)?;
    let data = container.require(ILDG_BINARY_DATA)?.clone();
    let xml = lime::read_payload_text(reader, container.require(ILDG_FORMAT)?)?;
    let format = IldgFormat::parse(&xml)?;
    debug!(
        "ILDG descriptor: field={:?}, precision={}, lattice={:?}",
        format.field, format.precision, format.lattice
    );
    Ok(IldgMetadata { container, format, data })
}

/// Checks the descriptor and payload against the declared layout.
///
/// # Errors
/// - [`LatticeError::PrecisionMismatch`] if `precision / 8 * 2` differs from the element width.
/// - [`LatticeError::SizeMismatch`] if the declared payload length differs from the layout size.
pub fn validate(format: &IldgFormat, data: &LimeRecord, layout: &StridedLayout) -> Result<()> {
    if format.element_bytes() != layout.element_bytes() {
        return Err(LatticeError::PrecisionMismatch {
            precision: format.precision,
            element_bytes: layout.element_bytes(),
        });
    }
    if layout.total_bytes() != data.data_length {
        return Err(LatticeError::SizeMismatch {
            context: "ildg-binary-data payload",
            expected: layout.total_bytes(),
            found: data.data_length,
        });
    }
    if let Some(sites) = format.sites()
        && !spans_sites(layout.shape(), sites)
    {
        warn!(
            "No leading axes of the declared shape {:?} span the {:?} lattice in the descriptor",
            layout.shape(),
            format.lattice
        );
    }
    Ok(())
}

/// Whether some prefix of `shape` multiplies out to `sites`, as `[lt, lx*ly*lz, ..]` does.
fn spans_sites(shape: &[usize], sites: usize) -> bool {
    if sites == 0 {
        return false;
    }
    let mut volume = 1usize;
    for &d in shape {
        match volume.checked_mul(d) {
            Some(v) if v <= sites => volume = v,
            _ => return false,
        }
        if volume == sites {
            return true;
        }
    }
    false
}

/// Opens an ILDG file: scan, parse, validate.
pub(crate) fn open(path: &Path, element: &ElementMetaData) -> Result<OpenedFile> {
    info!("Opening ILDG file: {}", path.display());
    let mut file = BufReader::new(File::open(path)?);
    let metadata = read_metadata(&mut file)?;

    let layout = StridedLayout::new(element.shape(), element.dtype().width())?;
    validate(&metadata.format, &metadata.data, &layout)?;

    info!(
        "ILDG file opened: {} records, payload at {} ({} bytes)",
        metadata.container.len(),
        metadata.data.payload_start,
        metadata.data.data_length
    );
    Ok(OpenedFile::positioned(
        path,
        layout,
        element.dtype(),
        metadata.data.payload_start,
        metadata.format,
    ))
}
