//! Foundational data structures, error types, and element metadata.

pub mod element;
pub mod error;
pub mod models;
