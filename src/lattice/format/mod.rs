//! File format parsing layer.
//!
//! Bridges raw file I/O and the [`Reader`](crate::lattice::reader::Reader).
//!
//! # Module Organization
//!
//! - [`lime`]: Scans LIME record headers into a name → payload span map
//! - [`ildg`]: Parses the ILDG format descriptor and validates the payload
//! - [`raw`]: Headerless files, laid out entirely by the caller's metadata
//!
//! # ILDG Layout
//!
//! ```text
//! ┌──────────────────────────┐
//! │ LIME record              │ ← lime::scan()
//! │   "ildg-format" (XML)    │ ← ildg::IldgFormat::parse()
//! ├──────────────────────────┤
//! │ LIME record              │
//! │   "ildg-binary-data"     │ ← positioned reads at payload_start
//! ├──────────────────────────┤
//! │ ... other records ...    │
//! └──────────────────────────┘
//! ```

pub mod ildg;
pub mod lime;
pub mod raw;
