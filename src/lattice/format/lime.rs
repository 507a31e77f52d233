//! LIME record scanner.
//!
//! A LIME container is a flat sequence of records, each 8-byte aligned:
//!
//! ```text
//! [6 bytes]   magic 45 67 89 AB 00 01 (magic + format version 1)
//! [2 bytes]   flags, big-endian; bit 15 = message begin, bit 14 = message end
//! [8 bytes]   payload length, big-endian u64 (unpadded)
//! [128 bytes] record name, UTF-8, null-padded
//! [N bytes]   payload, padded with zeros to a multiple of 8
//! ```
//!
//! The scan reads only headers and seeks over payloads.

use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ByteOrder};
use log::{debug, info, trace};

use crate::lattice::storage;
use crate::lattice::types::error::{LatticeError, Result};

/// Magic number and version that open every record header.
pub const LIME_MAGIC: [u8; 6] = [0x45, 0x67, 0x89, 0xAB, 0x00, 0x01];

/// Size of the magic + flags block.
pub const HEADER_PREFIX_LEN: usize = 8;
pub const NAME_FIELD_LEN: usize = 128;
/// Total bytes between a record's start and its payload.
pub const RECORD_HEADER_LEN: u64 = (HEADER_PREFIX_LEN + 8 + NAME_FIELD_LEN) as u64;

const MESSAGE_BEGIN_BIT: u16 = 1 << 15;
const MESSAGE_END_BIT: u16 = 1 << 14;

/// Location of one record inside a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimeRecord {
    pub name: String,
    /// Offset of the record's magic bytes.
    pub header_offset: u64,
    /// Offset of the first payload byte.
    pub payload_start: u64,
    /// Declared payload length, as stored in the header.
    pub data_length: u64,
    /// Declared length rounded up to the 8-byte record alignment.
    pub payload_length: u64,
    pub message_begin: bool,
    pub message_end: bool,
}

/// Every record of a container, in file order, plus a lookup by name.
///
/// When a name occurs more than once, lookups resolve to the last occurrence.
#[derive(Debug, Clone, Default)]
pub struct LimeContainer {
    records: Vec<LimeRecord>,
    by_name: HashMap<String, usize>,
}

impl LimeContainer {
    fn push(&mut self, record: LimeRecord) {
        self.by_name.insert(record.name.clone(), self.records.len());
        self.records.push(record);
    }

    pub fn get(&self, name: &str) -> Option<&LimeRecord> {
        self.by_name.get(name).map(|&i| &self.records[i])
    }

    /// Like [`get`](Self::get), but a missing record is a format error.
    pub fn require(&self, name: &str) -> Result<&LimeRecord> {
        self.get(name)
            .ok_or_else(|| LatticeError::MissingRecord(name.to_string()))
    }

    /// All records in file order, duplicates included.
    pub fn records(&self) -> &[LimeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Rounds a payload length up to the record alignment, saturating at the
/// largest aligned `u64`.
pub fn padded_len(len: u64) -> u64 {
    len.checked_next_multiple_of(8).unwrap_or(u64::MAX & !7)
}

/// Scans every record header from the start of `reader` to end-of-stream.
///
/// # Errors
/// - [`LatticeError::BadMagic`] if a header does not start with [`LIME_MAGIC`].
/// - [`LatticeError::Truncated`] if the stream ends inside a header or inside a
///   record's declared payload.
/// - [`LatticeError::InvalidFormat`] if a record name is not UTF-8.
///
/// Nothing is returned on error; a container is either fully scanned or rejected.
pub fn scan<R: Read + Seek>(reader: &mut R) -> Result<LimeContainer> {
    let stream_len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    let mut container = LimeContainer::default();
    let mut prefix = [0u8; HEADER_PREFIX_LEN];

    loop {
        let header_offset = reader.stream_position()?;
        match storage::read_up_to(reader, &mut prefix)? {
            0 => break,
            HEADER_PREFIX_LEN => {}
            _ => {
                return Err(LatticeError::Truncated {
                    context: "record header",
                    offset: header_offset,
                });
            }
        }

        if prefix[..6] != LIME_MAGIC {
            let mut found = [0u8; 6];
            found.copy_from_slice(&prefix[..6]);
            return Err(LatticeError::BadMagic {
                offset: header_offset,
                found,
            });
        }
        let flags = BigEndian::read_u16(&prefix[6..8]);

        let mut length_field = [0u8; 8];
        read_field(reader, &mut length_field, "record length", header_offset)?;
        let data_length = BigEndian::read_u64(&length_field);

        let mut name_field = [0u8; NAME_FIELD_LEN];
        read_field(reader, &mut name_field, "record name", header_offset)?;
        let name = decode_name(&name_field, header_offset)?;

        let payload_start = reader.stream_position()?;
        // Checked first: a hostile length must not overflow the padding below.
        if payload_start
            .checked_add(data_length)
            .is_none_or(|end| end > stream_len)
        {
            return Err(LatticeError::Truncated {
                context: "record payload",
                offset: header_offset,
            });
        }
        let payload_length = padded_len(data_length);

        debug!(
            "LIME record '{}' at {}: payload {}..{} ({} bytes declared)",
            name,
            header_offset,
            payload_start,
            payload_start.saturating_add(payload_length),
            data_length
        );

        container.push(LimeRecord {
            name,
            header_offset,
            payload_start,
            data_length,
            payload_length,
            message_begin: flags & MESSAGE_BEGIN_BIT != 0,
            message_end: flags & MESSAGE_END_BIT != 0,
        });

        reader.seek(SeekFrom::Start(payload_start.saturating_add(payload_length)))?;
    }

    info!("LIME scan complete: {} records", container.len());
    Ok(container)
}

/// Reads a record's declared payload bytes.
pub fn read_payload<R: Read + Seek>(reader: &mut R, record: &LimeRecord) -> Result<Vec<u8>> {
    trace!("Reading payload of '{}' ({} bytes)", record.name, record.data_length);
    reader.seek(SeekFrom::Start(record.payload_start))?;
    let mut buf = vec![0u8; record.data_length as usize];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Reads a record's payload as text with surrounding null bytes removed.
pub fn read_payload_text<R: Read + Seek>(reader: &mut R, record: &LimeRecord) -> Result<String> {
    let bytes = read_payload(reader, record)?;
    let text = String::from_utf8(bytes).map_err(|e| {
        LatticeError::InvalidFormat(format!("Record '{}' is not valid UTF-8: {}", record.name, e))
    })?;
    Ok(text.trim_matches('\0').to_string())
}

fn read_field<R: Read>(reader: &mut R, buf: &mut [u8], context: &'static str, offset: u64) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => LatticeError::Truncated { context, offset },
        _ => LatticeError::Io(e),
    })
}

fn decode_name(field: &[u8], offset: u64) -> Result<String> {
    let name = std::str::from_utf8(field).map_err(|e| {
        LatticeError::InvalidFormat(format!("Record name at offset {} is not valid UTF-8: {}", offset, e))
    })?;
    Ok(name.trim_matches('\0').to_string())
}
