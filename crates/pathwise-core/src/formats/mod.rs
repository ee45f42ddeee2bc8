//! # Formats
//!
//! Byte-level encodings of engine state. File and database I/O live in the
//! storage module and the app layer.

pub mod persistence;

pub use persistence::{PersistenceHeader, session_from_bytes, session_to_bytes};
