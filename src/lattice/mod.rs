//! Core lattice file reader module.

pub mod backend;
pub mod format;
pub mod gauge;
pub mod layout;
pub mod reader;
pub mod storage;
pub mod types;
