#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const MAGIC: [u8; 6] = [0x45, 0x67, 0x89, 0xAB, 0x00, 0x01];
pub const ILDG_NS: &str = "http://www.lqcd.org/ildg";

/// Builds LIME containers byte by byte.
#[derive(Default)]
pub struct LimeBuilder {
    bytes: Vec<u8>,
}

impl LimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns the offset of its header.
    pub fn record(&mut self, name: &str, payload: &[u8]) -> u64 {
        self.record_with(MAGIC, 0, name, payload)
    }

    pub fn record_with(&mut self, magic: [u8; 6], flags: u16, name: &str, payload: &[u8]) -> u64 {
        let start = self.bytes.len() as u64;
        self.bytes.extend_from_slice(&magic);
        self.bytes.extend_from_slice(&flags.to_be_bytes());
        self.bytes.extend_from_slice(&(payload.len() as u64).to_be_bytes());
        let mut name_field = [0u8; 128];
        name_field[..name.len()].copy_from_slice(name.as_bytes());
        self.bytes.extend_from_slice(&name_field);
        self.bytes.extend_from_slice(payload);
        while self.bytes.len() % 8 != 0 {
            self.bytes.push(0);
        }
        start
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write(self, path: &Path) -> PathBuf {
        fs::write(path, &self.bytes).expect("write lime fixture");
        path.to_path_buf()
    }
}

/// An ILDG format descriptor in the default ILDG namespace.
pub fn format_xml(precision: u32) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <ildgFormat xmlns=\"{ILDG_NS}\">\
         <version>1.0</version>\
         <field>su3gauge</field>\
         <precision>{precision}</precision>\
         <lx>4</lx><ly>4</ly><lz>4</lz><lt>8</lt>\
         </ildgFormat>"
    )
}

/// Big-endian complex doubles: element `i` is `(i, -i)`.
pub fn complex_payload(elements: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(elements * 16);
    for i in 0..elements {
        out.extend_from_slice(&(i as f64).to_be_bytes());
        out.extend_from_slice(&(-(i as f64)).to_be_bytes());
    }
    out
}

/// Writes a complete ILDG file with the given descriptor and payload.
pub fn write_ildg(path: &Path, xml: &str, payload: &[u8]) -> PathBuf {
    let mut lime = LimeBuilder::new();
    lime.record_with(MAGIC, 0x8000, "ildg-format", xml.as_bytes());
    lime.record("ildg-binary-data", payload);
    lime.write(path)
}
